//! Slave Interpreters
//!
//! An interpreter can create _slave_ interpreters, each owned by its _master_.  A slave
//! is known to its master by name, and has a _control command_ of the same name in the
//! master; deleting the control command deletes the slave, and deleting the slave
//! deletes the control command.  Disposing of a master disposes of all of its slaves.
//!
//! Interpreters are named by _paths_: lists of slave names, relative to some
//! interpreter.  The empty list names the interpreter itself; `{a b}` names the slave
//! `b` of the slave `a`.
//!
//! A _safe_ interpreter may only create safe slaves, and may not load classes from
//! restricted packages.
//!
//! This module also defines the `interp` command, the script-level interface to slaves
//! and aliases.

use crate::alias::InterpAliasCmd;
use crate::check_args;
use crate::interp::{Interp, WeakInterp};
use crate::list::list_to_string;
use crate::tcl_err;
use crate::tcl_opt_ok;
use crate::types::*;
use crate::value::Value;
use alloc::vec::Vec;

const SLAVE_OPTIONS: [&str; 5] = ["alias", "aliases", "eval", "issafe", "recursionlimit"];

/// The control command of a slave interpreter.
pub struct InterpSlaveCmd {
    slave: WeakInterp,
}

impl InterpSlaveCmd {
    pub(crate) fn new(slave: &Interp) -> Self {
        Self {
            slave: slave.downgrade(),
        }
    }

    /// The slave interpreter, if it still exists.
    pub fn slave_interp(&self) -> Option<Interp> {
        self.slave.upgrade()
    }

    /// Executes `slave option ?arg ...?`.
    pub(crate) fn invoke(&self, interp: &Interp, argv: &[Value]) -> TclResult {
        check_args(1, argv, 2, 0, "cmd ?arg ...?")?;

        let slave = match self.slave.upgrade() {
            Some(slave) => slave,
            None => return tcl_err!("interpreter \"{}\" has been deleted", argv[0]),
        };

        let result = match argv[1].as_str() {
            "alias" => {
                check_args(2, argv, 3, 0, "aliasName ?targetName? ?args..?")?;
                alias_op(&slave, &argv[2], interp, &argv[3..])
            }
            "aliases" => {
                check_args(2, argv, 2, 2, "")?;
                tcl_opt_ok!(InterpAliasCmd::list(&slave))
            }
            "eval" => {
                check_args(2, argv, 3, 0, "arg ?arg ...?")?;
                let _preserve = slave.preserve();
                let result = slave.eval_words(&argv[2..]);
                interp.transfer_result(&slave, result).map(Some)
            }
            "issafe" => {
                check_args(2, argv, 2, 2, "")?;
                tcl_opt_ok!(slave.is_safe())
            }
            "recursionlimit" => {
                check_args(2, argv, 2, 3, "?newlimit?")?;
                recursion_limit_op(&slave, argv.get(2))
            }
            other => tcl_err!(
                "bad option \"{}\": must be {}",
                other,
                one_of(&SLAVE_OPTIONS)
            ),
        };

        Ok(result?.unwrap_or_default())
    }

    /// Disposes of the slave when its control command is deleted.
    pub(crate) fn dispose(&self) {
        if let Some(slave) = self.slave.upgrade() {
            slave.dispose();
        }
    }
}

//------------------------------------------------------------------------------------------
// Paths

/// Finds the interpreter named by a path relative to `interp`.
pub fn resolve_path(interp: &Interp, path: &Value) -> Result<Interp, Exception> {
    let names = path.as_list()?;
    let mut current = interp.clone();

    for name in &names {
        current = match current.slave(name.as_str()) {
            Some(slave) => slave,
            None => return tcl_err!("could not find interpreter \"{}\"", path),
        };
    }

    Ok(current)
}

/// The path from `from` to `to`, if `to` is `from` or one of its descendants.
pub fn relative_path(from: &Interp, to: &Interp) -> Option<TclList> {
    let mut names = Vec::new();
    let mut current = to.clone();

    while !current.ptr_eq(from) {
        names.push(Value::from(current.name_in_master()));
        current = current.master()?;
    }

    names.reverse();
    Some(names)
}

//------------------------------------------------------------------------------------------
// Operations shared by the `interp` command and slave control commands

// `alias name` describes, `alias name {}` deletes, and `alias name target ?arg ...?`
// creates an alias in `slave` targeting `target`.
fn alias_op(slave: &Interp, name: &Value, target: &Interp, rest: &[Value]) -> TclOptResult {
    match rest {
        [] => Ok(Some(
            InterpAliasCmd::describe(slave, name)
                .map(Value::from)
                .unwrap_or_default(),
        )),
        [target_name] if target_name.is_empty() => {
            InterpAliasCmd::delete(slave, name)?;
            Ok(None)
        }
        [target_name, args @ ..] => {
            InterpAliasCmd::create(slave, target, name, target_name, args)?;
            tcl_opt_ok!(name.clone())
        }
    }
}

fn recursion_limit_op(interp: &Interp, limit: Option<&Value>) -> TclOptResult {
    if let Some(limit) = limit {
        let value = limit.as_int()?;
        if value <= 0 {
            return tcl_err!("recursion limit must be > 0");
        }
        if (value as usize) <= interp.nest_level() {
            return tcl_err!(
                "falling back due to new recursion limit {} (nesting level {})",
                value,
                interp.nest_level()
            );
        }
        interp.set_recursion_limit(value as usize);
    }

    tcl_opt_ok!(interp.recursion_limit() as TclInt)
}

//------------------------------------------------------------------------------------------
// The `interp` command

/// # interp *subcommand* ?*arg* ...?
pub fn cmd_interp(interp: &Interp, argv: &[Value]) -> TclOptResult {
    interp.call_subcommand(argv, 1, &INTERP_SUBCOMMANDS)
}

const INTERP_SUBCOMMANDS: [Subcommand; 10] = [
    Subcommand("alias", cmd_interp_alias),
    Subcommand("aliases", cmd_interp_aliases),
    Subcommand("create", cmd_interp_create),
    Subcommand("delete", cmd_interp_delete),
    Subcommand("eval", cmd_interp_eval),
    Subcommand("exists", cmd_interp_exists),
    Subcommand("issafe", cmd_interp_issafe),
    Subcommand("recursionlimit", cmd_interp_recursionlimit),
    Subcommand("slaves", cmd_interp_slaves),
    Subcommand("target", cmd_interp_target),
];

/// # interp alias *srcPath* *srcCmd* ?*targetPath* *targetCmd* ?*arg* ...??
///
/// With no target, describes the alias; with an empty target, deletes it.
fn cmd_interp_alias(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(
        2,
        argv,
        4,
        0,
        "slavePath slaveCmd ?masterPath masterCmd? ?args ..?",
    )?;

    let slave = resolve_path(interp, &argv[2])?;

    match &argv[4..] {
        [] => alias_op(&slave, &argv[3], interp, &[]),
        [empty] if empty.is_empty() => alias_op(&slave, &argv[3], interp, &argv[4..]),
        [target_path, rest @ ..] => {
            if rest.is_empty() {
                return tcl_err!(
                    "wrong # args: should be \"{} slavePath slaveCmd ?masterPath masterCmd? ?args ..?\"",
                    list_to_string(&argv[..2])
                );
            }
            let target = resolve_path(interp, target_path)?;
            alias_op(&slave, &argv[3], &target, rest)
        }
    }
}

/// # interp aliases ?*path*?
fn cmd_interp_aliases(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 2, 3, "?path?")?;
    let target = path_arg(interp, argv.get(2))?;
    tcl_opt_ok!(InterpAliasCmd::list(&target))
}

/// # interp create ?-safe? ?--? ?*path*?
fn cmd_interp_create(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 2, 5, "?-safe? ?--? ?path?")?;

    let mut safe = false;
    let mut path: Option<&Value> = None;
    let mut opts = true;

    for arg in &argv[2..] {
        match arg.as_str() {
            "-safe" if opts => safe = true,
            "--" if opts => opts = false,
            s if opts && s.starts_with('-') => {
                return tcl_err!("bad option \"{}\": must be -safe or --", s);
            }
            _ => {
                if path.is_some() {
                    return tcl_err!("wrong # args: should be \"interp create ?-safe? ?--? ?path?\"");
                }
                path = Some(arg);
                opts = false;
            }
        }
    }

    let (master, name) = match path {
        Some(path) => {
            let mut names = path.as_list()?;
            let name = match names.pop() {
                Some(name) => name,
                None => return tcl_err!("could not find interpreter \"{}\"", path),
            };
            (resolve_path(interp, &Value::from(names))?, name)
        }
        None => (interp.clone(), Value::from(unique_slave_name(interp))),
    };

    let slave = master.create_slave(name.as_str(), safe)?;
    let path = relative_path(interp, &slave).unwrap_or_default();
    tcl_opt_ok!(path)
}

fn unique_slave_name(interp: &Interp) -> String {
    let mut i = 0;
    loop {
        let name = format!("interp{}", i);
        if interp.slave(&name).is_none() && !interp.has_command(&name) {
            return name;
        }
        i += 1;
    }
}

/// # interp delete ?*path* ...?
fn cmd_interp_delete(interp: &Interp, argv: &[Value]) -> TclOptResult {
    for path in &argv[2..] {
        interp.delete_slave(path)?;
    }
    Ok(None)
}

/// # interp eval *path* *arg* ?*arg* ...?
fn cmd_interp_eval(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 4, 0, "path arg ?arg ...?")?;
    let slave = resolve_path(interp, &argv[2])?;
    let _preserve = slave.preserve();
    let result = slave.eval_words(&argv[3..]);
    interp.transfer_result(&slave, result).map(Some)
}

/// # interp exists *path*
fn cmd_interp_exists(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 2, 3, "?path?")?;
    let exists = match argv.get(2) {
        Some(path) => resolve_path(interp, path).is_ok(),
        None => true,
    };
    tcl_opt_ok!(exists)
}

/// # interp issafe ?*path*?
fn cmd_interp_issafe(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 2, 3, "?path?")?;
    let target = path_arg(interp, argv.get(2))?;
    tcl_opt_ok!(target.is_safe())
}

/// # interp recursionlimit *path* ?*newlimit*?
fn cmd_interp_recursionlimit(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 3, 4, "path ?newlimit?")?;
    let target = resolve_path(interp, &argv[2])?;
    recursion_limit_op(&target, argv.get(3))
}

/// # interp slaves ?*path*?
fn cmd_interp_slaves(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 2, 3, "?path?")?;
    let target = path_arg(interp, argv.get(2))?;
    let names: TclList = target.slave_names().into_iter().map(Value::from).collect();
    tcl_opt_ok!(names)
}

/// # interp target *path* *alias*
///
/// Returns the path of the alias's target interpreter, relative to this one.
fn cmd_interp_target(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 4, 4, "path alias")?;
    let slave = resolve_path(interp, &argv[2])?;

    let target = match slave.alias_target_interp(&argv[3]) {
        Some(target) => target,
        None => {
            return tcl_err!(
                "alias \"{}\" in path \"{}\" not found",
                argv[3],
                argv[2]
            )
        }
    };

    match relative_path(interp, &target) {
        Some(path) => tcl_opt_ok!(path),
        None => tcl_err!(
            "target interpreter for alias \"{}\" in path \"{}\" is not my descendant",
            argv[3],
            argv[2]
        ),
    }
}

fn path_arg(interp: &Interp, path: Option<&Value>) -> Result<Interp, Exception> {
    match path {
        Some(path) => resolve_path(interp, path),
        None => Ok(interp.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tcl_ok;

    #[test]
    fn test_create_and_eval() {
        let interp = Interp::new();
        assert_eq!(interp.eval_command("interp create a"), tcl_ok!("a"));
        assert_eq!(interp.eval_command("interp create {a b}"), tcl_ok!("a b"));
        assert_eq!(interp.eval_command("interp exists {a b}"), tcl_ok!(true));
        assert_eq!(interp.eval_command("interp exists {a c}"), tcl_ok!(false));
        assert_eq!(interp.eval_command("interp slaves"), tcl_ok!("a"));

        assert_eq!(interp.eval_command("interp eval a set x 5"), tcl_ok!("5"));
        assert_eq!(interp.eval_command("a eval set x"), tcl_ok!("5"));
        assert!(interp.scalar("x").is_err());

        interp.dispose();
    }

    #[test]
    fn test_generated_names() {
        let interp = Interp::new();
        assert_eq!(interp.eval_command("interp create"), tcl_ok!("interp0"));
        assert_eq!(interp.eval_command("interp create"), tcl_ok!("interp1"));
        interp.dispose();
    }

    #[test]
    fn test_safe_slaves() {
        let interp = Interp::new();
        interp.eval_command("interp create -safe s").expect("create");
        assert_eq!(interp.eval_command("interp issafe s"), tcl_ok!(true));
        assert_eq!(interp.eval_command("interp issafe"), tcl_ok!(false));

        // A safe interpreter only creates safe slaves.
        interp.eval_command("interp eval s interp create t").expect("create");
        assert_eq!(interp.eval_command("interp issafe {s t}"), tcl_ok!(true));

        interp.dispose();
    }

    #[test]
    fn test_delete_via_control_command() {
        let interp = Interp::new();
        let slave = interp.create_slave("s", false).expect("slave");
        interp.remove_command("s");

        assert!(slave.is_deleted());
        assert!(interp.slave("s").is_none());

        let slave = interp.create_slave("s", false).expect("slave");
        interp.eval_command("interp delete s").expect("delete");
        assert!(slave.is_deleted());
        assert!(!interp.has_command("s"));

        interp.dispose();
    }

    #[test]
    fn test_alias_subcommands() {
        let interp = Interp::new();
        interp.eval_command("interp create s").expect("create");
        interp
            .eval_command("interp alias s hello {} list hi")
            .expect("alias");

        assert_eq!(interp.eval_command("s eval hello there"), tcl_ok!("hi there"));
        assert_eq!(interp.eval_command("interp alias s hello"), tcl_ok!("list hi"));
        assert_eq!(interp.eval_command("interp aliases s"), tcl_ok!("hello"));
        assert_eq!(interp.eval_command("interp target s hello"), tcl_ok!(""));

        interp.eval_command("s alias bye list bye").expect("alias");
        assert_eq!(interp.eval_command("s aliases"), tcl_ok!("hello bye"));

        interp.eval_command("interp alias s hello {}").expect("delete");
        assert_eq!(interp.eval_command("s aliases"), tcl_ok!("bye"));

        interp.dispose();
    }

    #[test]
    fn test_target_not_descendant() {
        let interp = Interp::new();
        interp.eval_command("interp create a").expect("create");
        interp.eval_command("interp create b").expect("create");
        interp
            .eval_command("interp alias {a} x {b} list")
            .expect("alias");

        assert_eq!(interp.eval_command("interp target a x"), tcl_ok!("b"));
        let err = interp
            .eval_command("interp eval a interp target {} x")
            .unwrap_err();
        assert_eq!(
            err.value().as_str(),
            "target interpreter for alias \"x\" in path \"\" is not my descendant"
        );

        interp.dispose();
    }

    #[test]
    fn test_bad_option() {
        let interp = Interp::new();
        interp.create_slave("s", false).expect("slave");
        let err = interp.eval_command("s bogus").unwrap_err();
        assert_eq!(
            err.value().as_str(),
            "bad option \"bogus\": must be alias, aliases, eval, issafe, or recursionlimit"
        );
        interp.dispose();
    }
}
