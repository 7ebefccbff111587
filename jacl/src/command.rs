//! Command bindings.
//!
//! A command name in a namespace is bound to a [`WrappedCommand`].  The binding, not the
//! name, is the command's identity: `rename` moves the binding to a new name without
//! changing it, so anything that holds the binding (an import, an alias's target table
//! entry) keeps working.  Each binding wraps a [`CommandKind`], the closed set of ways a
//! command can be implemented, and records which other bindings import it so that
//! deleting it can delete them too.
//!
//! Application commands are supplied through the [`Command`] trait, or as plain Rust
//! functions.
//!
//! [`WrappedCommand`]: struct.WrappedCommand.html
//! [`CommandKind`]: enum.CommandKind.html
//! [`Command`]: trait.Command.html

use crate::alias::InterpAliasCmd;
use crate::autoload::AutoloadStub;
use crate::import::ImportedCmdData;
use crate::interp::Interp;
use crate::namespace::Namespace;
use crate::slave::InterpSlaveCmd;
use crate::tcl_err;
use crate::types::*;
use crate::value::Value;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::sync::atomic::{AtomicU64, Ordering};
use indexmap::IndexMap;
use tracing::trace;

/// The capability every application-defined command object provides.
///
/// `execute` is given the interpreter and the complete argument vector, with the name
/// by which the command was invoked in `argv[0]`.  `dispose` is called exactly once,
/// when the command's binding is deleted; commands holding resources that must be
/// released explicitly override it.
pub trait Command {
    /// Executes the command.
    fn execute(&self, interp: &Interp, argv: &[Value]) -> TclResult;

    /// Called when the command is deleted from its interpreter.
    fn dispose(&self) {}
}

/// A unique identifier for a command binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CmdId(u64);

impl CmdId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        CmdId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The implementation behind a command binding.
#[derive(Clone)]
pub enum CommandKind {
    /// A binary command implemented as a Rust `CommandFunc`.
    Native(CommandFunc),

    /// A binary command implemented as a Rust closure.
    #[cfg(feature = "closure-commands")]
    Closure(CommandClosure),

    /// An application command object.
    Object(Rc<dyn Command>),

    /// A command imported from another namespace.
    Imported(Rc<ImportedCmdData>),

    /// An alias for a command in another (or the same) interpreter.
    Alias(Rc<InterpAliasCmd>),

    /// A placeholder that loads the real command on first use.
    Autoload(Rc<AutoloadStub>),

    /// The control command of a slave interpreter.
    Slave(Rc<InterpSlaveCmd>),
}

impl CommandKind {
    /// Execute the command according to its kind.
    fn execute(&self, interp: &Interp, binding: &Rc<WrappedCommand>, argv: &[Value]) -> TclResult {
        match self {
            CommandKind::Native(func) => Ok(func(interp, argv)?.unwrap_or_default()),
            #[cfg(feature = "closure-commands")]
            CommandKind::Closure(func) => Ok(func(interp, argv)?.unwrap_or_default()),
            CommandKind::Object(cmd) => cmd.execute(interp, argv),
            CommandKind::Imported(data) => data.invoke(interp, argv),
            CommandKind::Alias(alias) => alias.invoke(interp, argv),
            CommandKind::Autoload(stub) => stub.invoke(interp, binding, argv),
            CommandKind::Slave(slave) => slave.invoke(interp, argv),
        }
    }

    /// Runs the dispose hook of kinds that have one.
    fn dispose(&self) {
        match self {
            CommandKind::Object(cmd) => cmd.dispose(),
            CommandKind::Imported(data) => data.dispose(),
            CommandKind::Alias(alias) => alias.dispose(),
            CommandKind::Slave(slave) => slave.dispose(),
            _ => (),
        }
    }

    /// Returns a value naming the command type.
    pub fn cmdtype(&self) -> Value {
        match self {
            CommandKind::Native(_) => Value::from("native"),
            #[cfg(feature = "closure-commands")]
            CommandKind::Closure(_) => Value::from("closure"),
            CommandKind::Object(_) => Value::from("object"),
            CommandKind::Imported(_) => Value::from("import"),
            CommandKind::Alias(_) => Value::from("alias"),
            CommandKind::Autoload(_) => Value::from("autoload"),
            CommandKind::Slave(_) => Value::from("interp"),
        }
    }

    /// The alias record, if this is an alias.
    pub fn as_alias(&self) -> Option<&Rc<InterpAliasCmd>> {
        match self {
            CommandKind::Alias(alias) => Some(alias),
            _ => None,
        }
    }

    /// The import record, if this is an imported command.
    pub fn as_imported(&self) -> Option<&Rc<ImportedCmdData>> {
        match self {
            CommandKind::Imported(data) => Some(data),
            _ => None,
        }
    }
}

/// The binding of a name in a namespace to a command.
///
/// A `WrappedCommand` keeps its identity for as long as the command exists: renaming the
/// command changes its name and perhaps its namespace, but not the binding.  Once
/// deleted, a binding can no longer be invoked.
pub struct WrappedCommand {
    id: CmdId,
    ns: RefCell<Weak<Namespace>>,
    name: RefCell<String>,
    kind: RefCell<CommandKind>,
    deleted: Cell<bool>,
    importers: RefCell<IndexMap<CmdId, Weak<WrappedCommand>, TclHasher>>,
}

impl WrappedCommand {
    pub(crate) fn new(ns: &Rc<Namespace>, name: &str, kind: CommandKind) -> Rc<Self> {
        Rc::new(Self {
            id: CmdId::next(),
            ns: RefCell::new(Rc::downgrade(ns)),
            name: RefCell::new(name.into()),
            kind: RefCell::new(kind),
            deleted: Cell::new(false),
            importers: RefCell::new(IndexMap::default()),
        })
    }

    /// The binding's unique ID.
    pub fn id(&self) -> CmdId {
        self.id
    }

    /// The command's current name within its namespace.
    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    /// The namespace that currently holds the binding, if it still exists.
    pub fn namespace(&self) -> Option<Rc<Namespace>> {
        self.ns.borrow().upgrade()
    }

    /// The command's fully-qualified name, e.g., `::foo::bar`.
    pub fn full_name(&self) -> String {
        match self.namespace() {
            Some(ns) => ns.qualify(&self.name.borrow()),
            None => self.name(),
        }
    }

    /// The implementation currently behind the binding.
    pub fn kind(&self) -> CommandKind {
        self.kind.borrow().clone()
    }

    /// Whether the binding has been deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted.get()
    }

    /// Invokes the command.  The argument vector includes the command's name.
    pub fn invoke(self: &Rc<Self>, interp: &Interp, argv: &[Value]) -> TclResult {
        if self.deleted.get() {
            let name = argv.first().cloned().unwrap_or_else(|| Value::from(self.name()));
            return tcl_err!("invalid command name \"{}\"", name);
        }

        let kind = self.kind();
        kind.execute(interp, self, argv)
    }

    /// Moves the binding to a new namespace and name.  The caller updates the namespace
    /// tables.
    pub(crate) fn rebind(&self, ns: &Rc<Namespace>, name: &str) {
        *self.ns.borrow_mut() = Rc::downgrade(ns);
        *self.name.borrow_mut() = name.into();
    }

    //--------------------------------------------------------------------------------------
    // Importers

    pub(crate) fn add_importer(&self, importer: &Rc<WrappedCommand>) {
        self.importers
            .borrow_mut()
            .insert(importer.id, Rc::downgrade(importer));
    }

    pub(crate) fn remove_importer(&self, id: CmdId) {
        self.importers.borrow_mut().shift_remove(&id);
    }

    /// The live bindings that import this command.
    pub fn importers(&self) -> Vec<Rc<WrappedCommand>> {
        self.importers
            .borrow()
            .values()
            .filter_map(|w| w.upgrade())
            .collect()
    }

    pub(crate) fn take_importers(&self) -> Vec<Rc<WrappedCommand>> {
        let drained: Vec<_> = self.importers.borrow_mut().drain(..).collect();
        drained.into_iter().filter_map(|(_, w)| w.upgrade()).collect()
    }

    //--------------------------------------------------------------------------------------
    // Deletion

    /// Deletes the binding: marks it deleted, removes it from its namespace, runs the
    /// command's dispose hook, and deletes every command that imports it.  Deleting an
    /// already-deleted binding does nothing.
    pub(crate) fn delete(self: &Rc<Self>) {
        if self.deleted.replace(true) {
            return;
        }

        trace!(command = %self.full_name(), "deleting command");

        if let Some(ns) = self.namespace() {
            ns.unlink_command(&self.name.borrow(), self);
        }

        let kind = self.kind();
        kind.dispose();

        for importer in self.take_importers() {
            trace!(
                command = %importer.full_name(),
                origin = %self.full_name(),
                "deleting importer"
            );
            importer.delete();
        }
    }
}

impl core::fmt::Debug for WrappedCommand {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("WrappedCommand")
            .field("id", &self.id)
            .field("name", &self.full_name())
            .field("type", &self.kind.borrow().cmdtype())
            .field("deleted", &self.deleted.get())
            .finish()
    }
}
