//! Imported Commands
//!
//! `namespace import` makes a command exported by one namespace callable under the same
//! simple name in another.  The imported binding is a [`WrappedCommand`] of kind
//! `Imported`, whose [`ImportedCmdData`] refers to the _real_ binding it forwards to.
//! The real binding records its importers, so that:
//!
//! * Deleting the real command deletes every import of it.
//! * Deleting an import unlinks it from the real command.
//! * Replacing the real command with a new command of the same name moves the imports
//!   to the new command.
//!
//! Because the import refers to the binding rather than to a name, renaming the real
//! command doesn't break the import.
//!
//! [`WrappedCommand`]: ../command/struct.WrappedCommand.html
//! [`ImportedCmdData`]: struct.ImportedCmdData.html

use crate::command::{CmdId, CommandKind, WrappedCommand};
use crate::interp::Interp;
use crate::namespace::{split_name, Namespace};
use crate::tcl_err;
use crate::types::*;
use crate::util::glob_match;
use crate::value::Value;
use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};
use tracing::debug;

/// The link from an imported binding to the real command it forwards to.
pub struct ImportedCmdData {
    real: RefCell<Rc<WrappedCommand>>,
    self_cmd: RefCell<Weak<WrappedCommand>>,
    self_id: Cell<Option<CmdId>>,
}

impl ImportedCmdData {
    pub(crate) fn new(real: &Rc<WrappedCommand>) -> Rc<Self> {
        Rc::new(Self {
            real: RefCell::new(real.clone()),
            self_cmd: RefCell::new(Weak::new()),
            self_id: Cell::new(None),
        })
    }

    /// The real command this import forwards to.
    pub fn real_cmd(&self) -> Rc<WrappedCommand> {
        self.real.borrow().clone()
    }

    /// The imported binding itself.
    pub fn self_cmd(&self) -> Option<Rc<WrappedCommand>> {
        self.self_cmd.borrow().upgrade()
    }

    pub(crate) fn link(&self, binding: &Rc<WrappedCommand>) {
        *self.self_cmd.borrow_mut() = Rc::downgrade(binding);
        self.self_id.set(Some(binding.id()));
    }

    /// Points the import at a new real command.
    pub(crate) fn retarget(&self, real: &Rc<WrappedCommand>) {
        *self.real.borrow_mut() = real.clone();
    }

    /// Forwards the invocation, argument vector and all, to the real command.
    pub(crate) fn invoke(&self, interp: &Interp, argv: &[Value]) -> TclResult {
        let real = self.real_cmd();
        real.invoke(interp, argv)
    }

    /// Unlinks the import from the real command.  If the real command is already gone,
    /// its importer set has been emptied and there is nothing to do.
    pub(crate) fn dispose(&self) {
        if let Some(id) = self.self_id.get() {
            self.real_cmd().remove_importer(id);
        }
    }
}

/// Follows a chain of imports to the command that actually implements it.
pub fn origin(cmd: &Rc<WrappedCommand>) -> Rc<WrappedCommand> {
    let mut link = cmd.clone();
    loop {
        let next = match link.kind().as_imported() {
            Some(data) => data.real_cmd(),
            None => return link,
        };
        link = next;
    }
}

/// Imports the commands matching a qualified pattern into the target namespace.
///
/// Only commands exported by the source namespace are imported.  An existing command of
/// the same name is an error unless `force` is set, in which case it is replaced;
/// re-importing the same command is a no-op.
pub(crate) fn import(
    interp: &Interp,
    target: &Rc<Namespace>,
    pattern: &str,
    force: bool,
) -> Result<(), Exception> {
    if pattern.is_empty() {
        return tcl_err!("empty import pattern");
    }

    let (quals, simple) = split_name(pattern);
    let quals = match quals {
        Some(quals) => quals,
        None => {
            return tcl_err!(
                "import pattern \"{}\" doesn't specify a namespace",
                pattern
            )
        }
    };

    let source = match interp.find_namespace(quals) {
        Some(ns) => ns,
        None => return tcl_err!("unknown namespace in import pattern \"{}\"", pattern),
    };

    if Rc::ptr_eq(&source, target) {
        return tcl_err!(
            "import pattern \"{}\" tries to import from namespace \"{}\" into itself",
            pattern,
            source.name()
        );
    }

    for cmd in source.commands() {
        let name = cmd.name();
        if !glob_match(simple, &name) || !source.is_exported(&name) {
            continue;
        }

        if let Some(existing) = target.find_command(&name) {
            let same = existing
                .kind()
                .as_imported()
                .map(|data| Rc::ptr_eq(&data.real_cmd(), &cmd))
                .unwrap_or(false);
            if same {
                continue;
            }
            if !force {
                return tcl_err!("can't import command \"{}\": already exists", name);
            }
        }

        check_import_loop(target, &cmd, pattern)?;

        let data = ImportedCmdData::new(&cmd);
        let binding = interp.create_command_in(target, &name, CommandKind::Imported(data.clone()));
        data.link(&binding);
        cmd.add_importer(&binding);

        debug!(
            command = %binding.full_name(),
            origin = %cmd.full_name(),
            "imported command"
        );
    }

    Ok(())
}

// An import chain that leads back into the target namespace would forward forever.
fn check_import_loop(
    target: &Rc<Namespace>,
    cmd: &Rc<WrappedCommand>,
    pattern: &str,
) -> Result<(), Exception> {
    let mut link = cmd.clone();
    loop {
        let in_target = link
            .namespace()
            .map(|ns| Rc::ptr_eq(&ns, target))
            .unwrap_or(false);
        if in_target {
            return tcl_err!(
                "import pattern \"{}\" would create a loop containing command \"{}\"",
                pattern,
                target.qualify(&cmd.name())
            );
        }

        let next = match link.kind().as_imported() {
            Some(data) => data.real_cmd(),
            None => return Ok(()),
        };
        link = next;
    }
}

/// Deletes the imported commands in the target namespace that match the pattern.  A
/// qualified pattern forgets only imports from that namespace.
pub(crate) fn forget(interp: &Interp, target: &Rc<Namespace>, pattern: &str) -> Result<(), Exception> {
    let (quals, simple) = split_name(pattern);

    let source = match quals {
        Some(quals) => match interp.find_namespace(quals) {
            Some(ns) => Some(ns),
            None => return tcl_err!("unknown namespace in namespace forget pattern \"{}\"", pattern),
        },
        None => None,
    };

    for cmd in target.commands() {
        let data = match cmd.kind().as_imported() {
            Some(data) => data.clone(),
            None => continue,
        };

        if !glob_match(simple, &cmd.name()) {
            continue;
        }

        if let Some(source) = &source {
            let from_source = data
                .real_cmd()
                .namespace()
                .map(|ns| Rc::ptr_eq(&ns, source))
                .unwrap_or(false);
            if !from_source {
                continue;
            }
        }

        interp.delete_command_from_token(&cmd);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tcl_ok;

    fn setup() -> Interp {
        let interp = Interp::empty();
        let util = interp.create_namespace("::util");
        interp.add_command("::util::greet", |_, argv| {
            Ok(Some(Value::from(format!("hello from {}", argv[0]))))
        });
        interp.add_command("::util::hidden", |_, _| Ok(None));
        util.export(&["greet"], false);
        interp
    }

    #[test]
    fn test_import_forwards_with_own_name() {
        let interp = setup();
        interp.import("::util::*", false).expect("import");

        assert!(interp.has_command("greet"));
        assert!(!interp.has_command("hidden"));
        assert_eq!(
            interp.eval_command("greet"),
            tcl_ok!("hello from greet")
        );
    }

    #[test]
    fn test_delete_real_deletes_import() {
        let interp = setup();
        interp.import("::util::greet", false).expect("import");
        let real = interp.command("::util::greet").expect("real");
        assert_eq!(real.importers().len(), 1);

        interp.remove_command("::util::greet");
        assert!(!interp.has_command("greet"));
    }

    #[test]
    fn test_delete_import_unlinks() {
        let interp = setup();
        interp.import("::util::greet", false).expect("import");
        let real = interp.command("::util::greet").expect("real");

        interp.remove_command("greet");
        assert!(real.importers().is_empty());
        assert!(interp.has_command("::util::greet"));
    }

    #[test]
    fn test_rename_real_keeps_import() {
        let interp = setup();
        interp.import("::util::greet", false).expect("import");
        interp
            .rename_command("::util::greet", "::util::salute")
            .expect("rename");

        assert_eq!(interp.eval_command("greet"), tcl_ok!("hello from greet"));
        let import = interp.command("greet").expect("import");
        let real = interp.command("::util::salute").expect("real");
        assert!(Rc::ptr_eq(&origin(&import), &real));
    }

    #[test]
    fn test_redefine_real_moves_imports() {
        let interp = setup();
        interp.import("::util::greet", false).expect("import");
        interp.add_command("::util::greet", |_, _| Ok(Some(Value::from("new"))));

        assert_eq!(interp.eval_command("greet"), tcl_ok!("new"));
        let real = interp.command("::util::greet").expect("real");
        assert_eq!(real.importers().len(), 1);
    }

    #[test]
    fn test_import_conflicts() {
        let interp = setup();
        interp.add_command("greet", |_, _| Ok(None));

        assert_eq!(
            interp.import("::util::greet", false),
            Err(Exception::tcl_err(Value::from(
                "can't import command \"greet\": already exists"
            )))
        );
        interp.import("::util::greet", true).expect("forced import");
        assert_eq!(interp.eval_command("greet"), tcl_ok!("hello from greet"));

        // Importing the same command again is harmless.
        interp.import("::util::greet", false).expect("re-import");
    }

    #[test]
    fn test_import_into_self() {
        let interp = setup();
        let err = interp
            .with_namespace("::util", || interp.import("::util::greet", false))
            .expect("namespace")
            .unwrap_err();
        assert!(err.value().as_str().contains("into itself"));
    }

    #[test]
    fn test_import_loop() {
        let interp = setup();
        interp.create_namespace("::other");
        interp
            .with_namespace("::other", || interp.import("::util::greet", false))
            .expect("namespace")
            .expect("import");
        interp
            .find_namespace("::other")
            .expect("other")
            .export(&["greet"], false);

        let err = interp
            .with_namespace("::util", || interp.import("::other::greet", true))
            .expect("namespace")
            .unwrap_err();
        assert_eq!(
            err.value().as_str(),
            "import pattern \"::other::greet\" would create a loop containing command \"::util::greet\""
        );
        assert_eq!(interp.eval_command("::other::greet"), tcl_ok!("hello from ::other::greet"));
    }

    #[test]
    fn test_forget() {
        let interp = setup();
        interp.import("::util::greet", false).expect("import");
        interp.forget("::util::*").expect("forget");
        assert!(!interp.has_command("greet"));
        assert!(interp.has_command("::util::greet"));
    }
}
