//! Autoloaded Commands
//!
//! An extension may define many commands but want to pay for each one only when a
//! script first uses it.  It registers, for each command, an [`AutoloadStub`] naming the
//! class that implements it.  The first invocation of the stub asks the interpreter's
//! [`ClassLoader`] for an instance of the class, replaces the stub with the loaded
//! command, and then runs it; later invocations go straight to the loaded command.
//!
//! ```
//! use rejacl::autoload::ClassLoader;
//! use rejacl::{tcl_ok, Command, Interp, TclResult, Value};
//!
//! #[derive(Default)]
//! struct Hello;
//!
//! impl Command for Hello {
//!     fn execute(&self, _: &Interp, _: &[Value]) -> TclResult {
//!         tcl_ok!("hello")
//!     }
//! }
//!
//! let interp = Interp::new();
//! interp.class_loader().register_command::<Hello>("demo.Hello");
//! interp.add_autoload("hello", "demo.Hello");
//!
//! assert_eq!(interp.command_type("hello").unwrap().as_str(), "autoload");
//! assert_eq!(interp.eval_command("hello").unwrap().as_str(), "hello");
//! assert_eq!(interp.command_type("hello").unwrap().as_str(), "object");
//! ```
//!
//! [`AutoloadStub`]: struct.AutoloadStub.html
//! [`ClassLoader`]: struct.ClassLoader.html

use crate::command::{Command, CommandKind, WrappedCommand};
use crate::error::LoadError;
use crate::interp::Interp;
use crate::types::*;
use crate::value::Value;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::cell::RefCell;
use indexmap::IndexMap;
use tracing::debug;

/// A factory that produces an instance of a class.
pub type ClassFactory = Rc<dyn Fn() -> Result<Box<dyn Any>, String>>;

/// The registry of loadable classes, by name.
///
/// Class names are dotted paths such as `tcl.lang.StringCmd`.  Packages can be
/// restricted: a safe interpreter may not load any class whose name lies in a restricted
/// package.
#[derive(Default)]
pub struct ClassLoader {
    classes: RefCell<IndexMap<String, ClassFactory, TclHasher>>,
    restricted: RefCell<Vec<String>>,
    loaded: RefCell<Vec<String>>,
}

impl ClassLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory for the named class, replacing any previous one.
    pub fn register(
        &self,
        class: &str,
        factory: impl Fn() -> Result<Box<dyn Any>, String> + 'static,
    ) {
        self.classes
            .borrow_mut()
            .insert(class.into(), Rc::new(factory));
    }

    /// Registers a command type under the named class.  Each load produces a new
    /// `C::default()`.
    pub fn register_command<C>(&self, class: &str)
    where
        C: Command + Default + 'static,
    {
        self.register(class, || {
            let cmd: Rc<dyn Command> = Rc::new(C::default());
            Ok(Box::new(cmd))
        });
    }

    /// Forbids safe interpreters to load classes from the named package and its
    /// subpackages.
    pub fn restrict_package(&self, package: &str) {
        let mut restricted = self.restricted.borrow_mut();
        if !restricted.iter().any(|p| p == package) {
            restricted.push(package.into());
        }
    }

    pub fn is_registered(&self, class: &str) -> bool {
        self.classes.borrow().contains_key(class)
    }

    fn is_restricted(&self, class: &str) -> bool {
        self.restricted.borrow().iter().any(|package| {
            class.len() > package.len()
                && class.starts_with(package.as_str())
                && class[package.len()..].starts_with('.')
        })
    }

    /// Produces an instance of the named class.
    pub fn load_class(&self, class: &str, safe: bool) -> Result<Box<dyn Any>, LoadError> {
        if !is_valid_class_name(class) || (safe && self.is_restricted(class)) {
            return Err(LoadError::PackageName(class.into()));
        }

        let factory = self.classes.borrow().get(class).cloned();
        let factory = factory.ok_or_else(|| LoadError::NotFound(class.into()))?;

        factory().map_err(|reason| LoadError::Instantiation {
            class: class.into(),
            reason,
        })
    }

    /// Produces an instance of the named class, which must be a command.
    pub fn load_command(&self, class: &str, safe: bool) -> Result<Rc<dyn Command>, LoadError> {
        let instance = self.load_class(class, safe)?;
        let cmd = instance
            .downcast::<Rc<dyn Command>>()
            .map(|cmd| *cmd)
            .map_err(|_| LoadError::NotACommand(class.into()))?;

        let mut loaded = self.loaded.borrow_mut();
        if !loaded.iter().any(|c| c == class) {
            loaded.push(class.into());
        }
        Ok(cmd)
    }

    /// The classes from which commands have been loaded, in load order.
    pub fn loaded_classes(&self) -> Vec<String> {
        self.loaded.borrow().clone()
    }
}

fn is_valid_class_name(class: &str) -> bool {
    !class.is_empty()
        && class.split('.').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        })
}

/// A placeholder command that loads its real implementation on first use.
#[derive(Debug, Clone)]
pub struct AutoloadStub {
    class_name: String,
}

impl AutoloadStub {
    pub fn new(class_name: &str) -> Self {
        Self {
            class_name: class_name.into(),
        }
    }

    /// The name of the class implementing the command.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Loads the command's class and binds an instance of it to `qualified_name` in
    /// place of the stub.  Returns the instance; it is not invoked.
    pub fn load(&self, interp: &Interp, qualified_name: &str) -> Result<Rc<dyn Command>, Exception> {
        let cmd = interp
            .class_loader()
            .load_command(&self.class_name, interp.is_safe())?;

        interp.create_command(qualified_name, CommandKind::Object(cmd.clone()));
        debug!(
            command = qualified_name,
            class = %self.class_name,
            "autoloaded command"
        );

        Ok(cmd)
    }

    /// Loads the command and executes it with the original arguments.
    pub(crate) fn invoke(
        &self,
        interp: &Interp,
        binding: &Rc<WrappedCommand>,
        argv: &[Value],
    ) -> TclResult {
        let cmd = self.load(interp, &binding.full_name())?;
        cmd.execute(interp, argv)
    }
}
