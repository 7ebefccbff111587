//! Interpreter Aliases
//!
//! An alias is a command in one interpreter, the _slave_ (the interpreter the alias is
//! defined in), that forwards its invocations to a command in another interpreter, the
//! _target_, which may be the same interpreter.  The alias has a prefix: the target
//! command's name followed by zero or more bound arguments.  Invoking the alias
//! invokes the prefix, followed by the alias's own arguments, at the global level of the
//! target interpreter; the result, or error, is transferred back to the caller.
//!
//! ```
//! use rejacl::Interp;
//! use rejacl::Value;
//!
//! let interp = Interp::new();
//! interp
//!     .create_alias(&interp, &Value::from("twice"), &Value::from("list"), &[Value::from("x"), Value::from("x")])
//!     .unwrap();
//! assert_eq!(interp.eval_command("twice y").unwrap().as_str(), "x x y");
//! # interp.dispose();
//! ```
//!
//! Each interpreter keeps two tables:
//!
//! * Its _alias table_, keyed by the name each alias was created with, so that aliases
//!   can be described and deleted by that name even after being renamed.
//! * Its _target table_, recording every alias (in any interpreter) that targets it, so
//!   that those aliases can be deleted when the interpreter is disposed.
//!
//! Aliases can't form loops: creating or renaming an alias so that following alias
//! targets from it leads back to it is an error.

use crate::command::{CmdId, CommandKind, WrappedCommand};
use crate::import::origin;
use crate::interp::{Interp, InvokeFlags, WeakInterp};
use crate::list::list_to_string;
use crate::tcl_err;
use crate::types::*;
use crate::value::Value;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use tracing::debug;

/// An alias command.  See the [module level documentation](index.html).
pub struct InterpAliasCmd {
    // The name the alias was created with.
    name: Value,
    target_interp: Interp,
    prefix: TclList,
    slave_interp: WeakInterp,
    slave_cmd: RefCell<Weak<WrappedCommand>>,
    slave_cmd_id: Cell<Option<CmdId>>,
    alias_entry: RefCell<Option<String>>,
}

/// An entry in an interpreter's target table: an alias in some interpreter that
/// targets this one.
#[derive(Clone)]
pub(crate) struct TargetEntry {
    pub(crate) slave: WeakInterp,
    pub(crate) cmd: Weak<WrappedCommand>,
}

impl InterpAliasCmd {
    /// The name the alias was created with.
    pub fn name(&self) -> Value {
        self.name.clone()
    }

    /// The alias's prefix: the target command name and the bound arguments.
    pub fn prefix(&self) -> &[Value] {
        &self.prefix
    }

    /// The interpreter the alias forwards to.
    pub fn target_interp(&self) -> &Interp {
        &self.target_interp
    }

    /// The interpreter the alias is defined in, if it still exists.
    pub fn slave_interp(&self) -> Option<Interp> {
        self.slave_interp.upgrade()
    }

    /// The alias's own binding, if it still exists.
    pub fn slave_cmd(&self) -> Option<Rc<WrappedCommand>> {
        self.slave_cmd.borrow().upgrade()
    }

    /// The command in the target interpreter that the alias currently resolves to.
    pub fn target_cmd(&self) -> Option<Rc<WrappedCommand>> {
        self.target_interp
            .find_command_global(self.prefix[0].as_str())
    }

    //--------------------------------------------------------------------------------------
    // Invocation

    /// Invokes the prefix, followed by `argv[1..]`, in the target interpreter.
    pub(crate) fn invoke(&self, interp: &Interp, argv: &[Value]) -> TclResult {
        // The target can't be torn down until the call returns.
        let target = self.target_interp.clone();
        let _preserve = target.preserve();

        let mut cmdv: TclList = self.prefix.clone();
        cmdv.extend_from_slice(argv.get(1..).unwrap_or(&[]));

        let result = {
            let _nest = target.enter_nest();
            target.allow_exceptions();
            target.invoke_global(&cmdv, InvokeFlags::NO_TRACEBACK)
        };

        let result = if target.nest_level() == 0 {
            target.resolve_top_level(result)
        } else {
            result
        };

        interp.transfer_result(&target, result)
    }

    //--------------------------------------------------------------------------------------
    // Lifecycle

    /// Creates an alias named `name` in `slave` that forwards to `target_name` in
    /// `target`, with the given bound arguments.  An existing alias created with the
    /// same name is replaced.
    pub(crate) fn create(
        slave: &Interp,
        target: &Interp,
        name: &Value,
        target_name: &Value,
        args: &[Value],
    ) -> TclResult {
        // Redefining the control command of an interpreter would delete the interpreter.
        if let Some(existing) = slave.command(name.as_str()) {
            let controls_target = target
                .slave_cmd()
                .map(|cmd| Rc::ptr_eq(&cmd, &existing))
                .unwrap_or(false);
            if controls_target {
                slave.delete_command_from_token(&existing);
                return tcl_err!(
                    "cannot define or rename alias \"{}\": interpreter deleted",
                    name
                );
            }
        }

        let mut prefix: TclList = Vec::with_capacity(args.len() + 1);
        prefix.push(target_name.clone());
        prefix.extend_from_slice(args);

        let alias = Rc::new(InterpAliasCmd {
            name: name.clone(),
            target_interp: target.clone(),
            prefix,
            slave_interp: slave.downgrade(),
            slave_cmd: RefCell::new(Weak::new()),
            slave_cmd_id: Cell::new(None),
            alias_entry: RefCell::new(None),
        });

        let binding = slave.create_command(name.as_str(), CommandKind::Alias(alias.clone()));
        *alias.slave_cmd.borrow_mut() = Rc::downgrade(&binding);
        alias.slave_cmd_id.set(Some(binding.id()));

        if let Err(err) = prevent_alias_loop(&binding) {
            slave.delete_command_from_token(&binding);
            return Err(err);
        }

        // A previous alias created with this name goes away, wherever it now lives.
        let previous = slave.alias_entry(name.as_str());
        if let Some(previous) = previous {
            if let Some(cmd) = previous.slave_cmd() {
                slave.delete_command_from_token(&cmd);
            }
        }

        *alias.alias_entry.borrow_mut() = Some(name.as_str().into());
        slave.alias_table_insert(name.as_str(), alias.clone());
        target.target_table_insert(
            binding.id(),
            TargetEntry {
                slave: slave.downgrade(),
                cmd: Rc::downgrade(&binding),
            },
        );

        debug!(
            alias = %name,
            target = %list_to_string(&alias.prefix),
            "alias created"
        );

        Ok(name.clone())
    }

    /// Deletes the alias created with the given name.
    pub(crate) fn delete(slave: &Interp, name: &Value) -> Result<(), Exception> {
        let alias = match slave.alias_entry(name.as_str()) {
            Some(alias) => alias,
            None => return tcl_err!("alias \"{}\" not found", name),
        };

        match alias.slave_cmd() {
            Some(cmd) => slave.delete_command_from_token(&cmd),
            None => slave.alias_table_remove(name.as_str(), &alias),
        }

        Ok(())
    }

    /// The prefix of the alias created with the given name, if there is one.
    pub(crate) fn describe(slave: &Interp, name: &Value) -> Option<TclList> {
        slave
            .alias_entry(name.as_str())
            .map(|alias| alias.prefix.clone())
    }

    /// The names of the aliases defined in the interpreter.
    pub(crate) fn list(slave: &Interp) -> TclList {
        slave.alias_entries().iter().map(|alias| alias.name()).collect()
    }

    /// Removes the alias's bookkeeping when its binding is deleted.
    pub(crate) fn dispose(&self) {
        let entry = self.alias_entry.borrow_mut().take();
        if let Some(entry) = entry {
            if let Some(slave) = self.slave_interp.upgrade() {
                slave.alias_table_remove(&entry, self);
            }
        }

        if let Some(id) = self.slave_cmd_id.get() {
            self.target_interp.target_table_remove(id);
        }
    }
}

impl core::fmt::Debug for InterpAliasCmd {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("InterpAliasCmd")
            .field("name", &self.name)
            .field("prefix", &list_to_string(&self.prefix))
            .finish()
    }
}

/// Checks that following alias targets, and the imports they name, from the given alias
/// binding never leads back to it.  A chain that ends at a missing command or at a
/// non-alias is fine.
pub(crate) fn prevent_alias_loop(binding: &Rc<WrappedCommand>) -> Result<(), Exception> {
    let alias = match binding.kind().as_alias() {
        Some(alias) => alias.clone(),
        None => return Ok(()),
    };

    let mut visited: Vec<CmdId> = vec![binding.id()];
    let mut next = alias;

    loop {
        let target = match next.target_cmd() {
            Some(cmd) => origin(&cmd),
            None => return Ok(()),
        };

        if target.id() == binding.id() {
            return tcl_err!(
                "cannot define or rename alias \"{}\": would create a loop",
                binding.name()
            );
        }

        // A cycle not through this alias was created some other way; stop here.
        if visited.contains(&target.id()) {
            return Ok(());
        }
        visited.push(target.id());

        next = match target.kind().as_alias() {
            Some(alias) => alias.clone(),
            None => return Ok(()),
        };
    }
}

/// Whether `alias` is the alias record behind the given table entry.
pub(crate) fn is_same(entry: &Rc<InterpAliasCmd>, alias: &InterpAliasCmd) -> bool {
    core::ptr::eq(Rc::as_ptr(entry), alias)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tcl_ok;

    fn v(s: &str) -> Value {
        Value::from(s)
    }

    #[test]
    fn test_alias_forwards_prefix() {
        let master = Interp::new();
        let slave = master.create_slave("s", false).expect("slave");

        slave
            .create_alias(&master, &v("cat"), &v("list"), &[v("a"), v("b")])
            .expect("alias");
        assert_eq!(slave.eval_command("cat c d"), tcl_ok!("a b c d"));
        assert_eq!(slave.command_type("cat"), Some(v("alias")));

        master.dispose();
    }

    #[test]
    fn test_alias_error_transfers() {
        let master = Interp::new();
        let slave = master.create_slave("s", false).expect("slave");
        master.add_command("fail", |_, _| Err(Exception::tcl_err(Value::from("nope"))));

        slave
            .create_alias(&master, &v("f"), &v("fail"), &[])
            .expect("alias");
        let err = slave.eval_command("f").unwrap_err();
        assert_eq!(err.value().as_str(), "nope");

        master.dispose();
    }

    #[test]
    fn test_describe_and_list() {
        let interp = Interp::new();
        interp
            .create_alias(&interp, &v("a1"), &v("list"), &[v("x")])
            .expect("alias");
        interp
            .create_alias(&interp, &v("a2"), &v("set"), &[])
            .expect("alias");

        assert_eq!(interp.describe_alias(&v("a1")), Some(vec![v("list"), v("x")]));
        assert_eq!(interp.describe_alias(&v("nope")), None);
        assert_eq!(interp.alias_names(), vec![v("a1"), v("a2")]);

        interp.dispose();
    }

    #[test]
    fn test_delete_by_original_name_after_rename() {
        let interp = Interp::new();
        interp
            .create_alias(&interp, &v("orig"), &v("list"), &[])
            .expect("alias");
        interp.rename_command("orig", "moved").expect("rename");

        assert_eq!(interp.describe_alias(&v("orig")), Some(vec![v("list")]));
        interp.delete_alias(&v("orig")).expect("delete");
        assert!(!interp.has_command("moved"));
        assert!(interp.alias_names().is_empty());

        assert_eq!(
            interp.delete_alias(&v("orig")),
            Err(Exception::tcl_err(v("alias \"orig\" not found")))
        );

        interp.dispose();
    }

    #[test]
    fn test_self_loop_rejected() {
        let interp = Interp::new();
        let err = interp
            .create_alias(&interp, &v("a"), &v("a"), &[])
            .unwrap_err();
        assert_eq!(
            err.value().as_str(),
            "cannot define or rename alias \"a\": would create a loop"
        );
        assert!(!interp.has_command("a"));
        assert!(interp.alias_names().is_empty());

        interp.dispose();
    }

    #[test]
    fn test_loop_through_rename_rejected() {
        let interp = Interp::new();
        interp
            .create_alias(&interp, &v("a"), &v("b"), &[])
            .expect("a -> b");
        interp
            .create_alias(&interp, &v("c"), &v("d"), &[])
            .expect("c -> d");

        // a -> b; renaming c to b gives b -> d: fine.
        interp.rename_command("c", "b").expect("rename");

        // Now d -> a would close a -> b -> d -> a.
        let err = interp
            .create_alias(&interp, &v("d"), &v("a"), &[])
            .unwrap_err();
        assert!(err.value().as_str().contains("would create a loop"));

        // Renaming e to d would close the loop as well; the rename is undone.
        interp
            .create_alias(&interp, &v("e"), &v("a"), &[])
            .expect("e -> a");
        let err = interp.rename_command("e", "d").unwrap_err();
        assert!(err.value().as_str().contains("would create a loop"));
        assert!(interp.has_command("e"));
        assert!(!interp.has_command("d"));

        interp.dispose();
    }

    #[test]
    fn test_redefinition_replaces_renamed_alias() {
        let interp = Interp::new();
        interp
            .create_alias(&interp, &v("x"), &v("list"), &[v("old")])
            .expect("alias");
        interp.rename_command("x", "y").expect("rename");

        interp
            .create_alias(&interp, &v("x"), &v("list"), &[v("new")])
            .expect("alias");

        assert!(!interp.has_command("y"));
        assert_eq!(interp.eval_command("x"), tcl_ok!("new"));
        assert_eq!(interp.alias_names(), vec![v("x")]);

        interp.dispose();
    }

    #[test]
    fn test_target_deleted_with_interp() {
        let master = Interp::new();
        let slave = master.create_slave("s", false).expect("slave");
        master
            .create_alias(&slave, &v("inner"), &v("list"), &[])
            .expect("alias");
        assert!(master.has_command("inner"));

        master.delete_slave(&v("s")).expect("delete slave");
        assert!(!master.has_command("inner"));
        assert!(master.alias_names().is_empty());

        master.dispose();
    }

    #[test]
    fn test_alias_over_control_command() {
        let master = Interp::new();
        let slave = master.create_slave("s", false).expect("slave");

        let err = master
            .create_alias(&slave, &v("s"), &v("list"), &[])
            .unwrap_err();
        assert_eq!(
            err.value().as_str(),
            "cannot define or rename alias \"s\": interpreter deleted"
        );
        assert!(slave.is_deleted());
        assert!(master.slave_names().is_empty());

        master.dispose();
    }
}
