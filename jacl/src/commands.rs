//! Standard Command Definitions
//!
//! These are the commands an [`Interp`](../interp/struct.Interp.html) created with
//! `Interp::new` starts with: the clients of the command and event core.  The `interp`
//! command lives with the slave interpreters, in the [`slave`](../slave/index.html)
//! module.

use crate::check_args;
use crate::import::origin;
use crate::interp::{Interp, InvokeFlags};
use crate::list::get_list;
use crate::namespace::{qualifiers, tail};
use crate::notifier::EventFlags;
use crate::tcl_err;
use crate::tcl_opt_ok;
use crate::types::*;
use crate::util::glob_match;
use crate::value::Value;
use alloc::vec::Vec;
use tracing::warn;

//------------------------------------------------------------------------------------------
// after

const AFTER_SUBCOMMANDS: [Subcommand; 3] = [
    Subcommand("cancel", cmd_after_cancel),
    Subcommand("idle", cmd_after_idle),
    Subcommand("info", cmd_after_info),
];

/// # after *subcommand* ?*arg* ...?
///
/// Schedules scripts to run when the thread's notifier is next idle.
pub fn cmd_after(interp: &Interp, argv: &[Value]) -> TclOptResult {
    interp.call_subcommand(argv, 1, &AFTER_SUBCOMMANDS)
}

/// # after idle *script* ?*script* ...?
///
/// Returns the ID of the scheduled callback.
fn cmd_after_idle(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 3, 0, "script ?script ...?")?;

    let script = concat(&argv[2..]);
    let id = interp.after_next_id();

    let weak = interp.downgrade();
    let callback_id = id.clone();
    let callback_script = script.clone();
    let handler = interp.notifier().idle(move || {
        if let Some(interp) = weak.upgrade() {
            run_after_script(&interp, &callback_id, &callback_script);
        }
    });

    interp.after_insert(&id, handler, script);
    tcl_opt_ok!(id)
}

/// # after cancel *id*
/// # after cancel *script* ?*script* ...?
///
/// Cancelling a callback that has already run, or never existed, does nothing.
fn cmd_after_cancel(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 3, 0, "id|command")?;

    let key = concat(&argv[2..]);
    let id = interp
        .after_entries()
        .into_iter()
        .find(|(id, script)| id == key.as_str() || script == &key)
        .map(|(id, _)| id);

    if let Some(id) = id {
        if let Some(handler) = interp.after_remove(&id) {
            handler.cancel();
        }
    }

    Ok(None)
}

/// # after info ?*id*?
fn cmd_after_info(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 2, 3, "?id?")?;

    match argv.get(2) {
        None => {
            let ids: TclList = interp
                .after_entries()
                .into_iter()
                .map(|(id, _)| Value::from(id))
                .collect();
            tcl_opt_ok!(ids)
        }
        Some(id) => match interp.after_script(id.as_str()) {
            Some(script) => tcl_opt_ok!(vec![script, Value::from("idle")]),
            None => tcl_err!("event \"{}\" doesn't exist", id),
        },
    }
}

// Runs the script of an `after` callback, unless it was cancelled.
fn run_after_script(interp: &Interp, id: &str, script: &Value) {
    if interp.after_remove(id).is_none() {
        return;
    }

    let result = match get_list(script.as_str()) {
        Ok(words) => interp.invoke_global(&words, InvokeFlags::NONE),
        Err(exception) => Err(exception),
    };

    if let Err(exception) = interp.resolve_top_level(result) {
        background_error(interp, id, &exception);
    }
}

// Reports an error in a script run from the event loop: to the `bgerror` command if
// there is one, and otherwise to the log.
fn background_error(interp: &Interp, id: &str, exception: &Exception) {
    if interp.has_command("bgerror") {
        let argv = [Value::from("bgerror"), exception.value()];
        match interp.invoke_global(&argv, InvokeFlags::NONE) {
            Ok(_) => return,
            Err(err) => {
                warn!(id, error = %err.value(), "bgerror failed");
            }
        }
    }

    warn!(id, error = %exception.value(), "error in background script");
}

// Joins words into a single script, as TCL's `concat` does.
fn concat(words: &[Value]) -> Value {
    match words {
        [word] => word.clone(),
        _ => {
            let parts: Vec<&str> = words
                .iter()
                .map(|w| w.as_str().trim())
                .filter(|w| !w.is_empty())
                .collect();
            Value::from(parts.join(" "))
        }
    }
}

//------------------------------------------------------------------------------------------
// Control flow

/// # break
pub fn cmd_break(_interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(1, argv, 1, 1, "")?;
    Err(Exception::tcl_break())
}

/// # continue
pub fn cmd_continue(_interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(1, argv, 1, 1, "")?;
    Err(Exception::tcl_continue())
}

/// # error *message* ?*info*? ?*code*?
///
/// Throws an error.  A non-empty `info` starts the error's stack trace; `code` becomes
/// its `errorCode`.
pub fn cmd_error(_interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(1, argv, 2, 4, "message ?errorInfo? ?errorCode?")?;

    let msg = argv[1].clone();
    let code = argv.get(3).cloned().unwrap_or_else(|| Value::from("NONE"));

    match argv.get(2) {
        Some(info) if !info.is_empty() => {
            Err(Exception::tcl_rethrow(msg, code, info.as_str()))
        }
        _ => Err(Exception::tcl_err2(code, msg)),
    }
}

/// # return ?-code *code*? ?-level *level*? ?*value*?
pub fn cmd_return(_interp: &Interp, argv: &[Value]) -> TclOptResult {
    let args = &argv[1..];
    let (options, value) = if args.len() % 2 == 1 {
        (&args[..args.len() - 1], args[args.len() - 1].clone())
    } else {
        (args, Value::empty())
    };

    let mut code = ResultCode::Okay;
    let mut level: usize = 1;

    for pair in options.chunks(2) {
        match pair[0].as_str() {
            "-code" => code = ResultCode::from_value(&pair[1])?,
            "-level" => {
                level = match pair[1].as_int() {
                    Ok(n) if n >= 0 => n as usize,
                    _ => {
                        return tcl_err!(
                            "bad -level value: expected non-negative integer but got \"{}\"",
                            pair[1]
                        )
                    }
                }
            }
            other => return tcl_err!("bad option \"{}\": must be -code or -level", other),
        }
    }

    if level == 0 {
        return match code {
            ResultCode::Okay => Ok(Some(value)),
            code => Err(Exception::with_code(value, code)),
        };
    }

    if code == ResultCode::Okay && level == 1 {
        Err(Exception::tcl_return(value))
    } else {
        Err(Exception::tcl_return_ext(value, level, code))
    }
}

//------------------------------------------------------------------------------------------
// info

const INFO_SUBCOMMANDS: [Subcommand; 4] = [
    Subcommand("cmdtype", cmd_info_cmdtype),
    Subcommand("commands", cmd_info_commands),
    Subcommand("exists", cmd_info_exists),
    Subcommand("loaded", cmd_info_loaded),
];

/// # info *subcommand* ?*arg* ...?
pub fn cmd_info(interp: &Interp, argv: &[Value]) -> TclOptResult {
    interp.call_subcommand(argv, 1, &INFO_SUBCOMMANDS)
}

/// # info cmdtype *command*
fn cmd_info_cmdtype(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 3, 3, "command")?;
    match interp.command_type(argv[2].as_str()) {
        Some(cmdtype) => Ok(Some(cmdtype)),
        None => tcl_err!("invalid command name \"{}\"", argv[2]),
    }
}

/// # info commands ?*pattern*?
fn cmd_info_commands(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 2, 3, "?pattern?")?;
    let names = interp.command_names();
    let names: TclList = match argv.get(2) {
        Some(pattern) => names
            .into_iter()
            .filter(|name| glob_match(pattern.as_str(), name.as_str()))
            .collect(),
        None => names,
    };
    tcl_opt_ok!(names)
}

/// # info exists *varName*
fn cmd_info_exists(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 3, 3, "varName")?;
    tcl_opt_ok!(interp.var_exists(argv[2].as_str()))
}

/// # info loaded
///
/// The classes autoloaded commands have been loaded from.
fn cmd_info_loaded(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 2, 2, "")?;
    let classes: TclList = interp
        .class_loader()
        .loaded_classes()
        .into_iter()
        .map(Value::from)
        .collect();
    tcl_opt_ok!(classes)
}

//------------------------------------------------------------------------------------------
// namespace

const NAMESPACE_SUBCOMMANDS: [Subcommand; 12] = [
    Subcommand("children", cmd_namespace_children),
    Subcommand("current", cmd_namespace_current),
    Subcommand("delete", cmd_namespace_delete),
    Subcommand("eval", cmd_namespace_eval),
    Subcommand("exists", cmd_namespace_exists),
    Subcommand("export", cmd_namespace_export),
    Subcommand("forget", cmd_namespace_forget),
    Subcommand("import", cmd_namespace_import),
    Subcommand("origin", cmd_namespace_origin),
    Subcommand("qualifiers", cmd_namespace_qualifiers),
    Subcommand("tail", cmd_namespace_tail),
    Subcommand("which", cmd_namespace_which),
];

/// # namespace *subcommand* ?*arg* ...?
pub fn cmd_namespace(interp: &Interp, argv: &[Value]) -> TclOptResult {
    interp.call_subcommand(argv, 1, &NAMESPACE_SUBCOMMANDS)
}

/// # namespace children ?*namespace*? ?*pattern*?
fn cmd_namespace_children(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 2, 4, "?name? ?pattern?")?;

    let ns = match argv.get(2) {
        Some(name) => match interp.find_namespace(name.as_str()) {
            Some(ns) => ns,
            None => return tcl_err!("namespace \"{}\" not found", name),
        },
        None => interp.current_namespace(),
    };

    let children: TclList = ns
        .children()
        .iter()
        .map(|child| child.full_name())
        .filter(|name| match argv.get(3) {
            Some(pattern) => glob_match(pattern.as_str(), name),
            None => true,
        })
        .map(Value::from)
        .collect();
    tcl_opt_ok!(children)
}

/// # namespace current
fn cmd_namespace_current(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 2, 2, "")?;
    tcl_opt_ok!(interp.current_namespace().full_name())
}

/// # namespace delete ?*namespace* ...?
fn cmd_namespace_delete(interp: &Interp, argv: &[Value]) -> TclOptResult {
    for name in &argv[2..] {
        interp.delete_namespace(name.as_str())?;
    }
    Ok(None)
}

/// # namespace eval *namespace* *arg* ?*arg* ...?
///
/// Creates the namespace if need be.
fn cmd_namespace_eval(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 4, 0, "name arg ?arg...?")?;
    let ns = interp.create_namespace(argv[2].as_str());
    let value = interp.with_namespace(ns.full_name(), || interp.eval_words(&argv[3..]))??;
    Ok(Some(value))
}

/// # namespace exists *namespace*
fn cmd_namespace_exists(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 3, 3, "name")?;
    tcl_opt_ok!(interp.find_namespace(argv[2].as_str()).is_some())
}

/// # namespace export ?-clear? ?*pattern* ...?
///
/// With no patterns, returns the current namespace's export list.
fn cmd_namespace_export(interp: &Interp, argv: &[Value]) -> TclOptResult {
    let ns = interp.current_namespace();
    let mut args = &argv[2..];

    if args.is_empty() {
        let patterns: TclList = ns.export_patterns().into_iter().map(Value::from).collect();
        return tcl_opt_ok!(patterns);
    }

    let clear = args[0].as_str() == "-clear";
    if clear {
        args = &args[1..];
    }

    for pattern in args {
        if pattern.as_str().contains("::") {
            return tcl_err!("invalid export pattern \"{}\": pattern can't specify a namespace", pattern);
        }
    }

    let patterns: Vec<&str> = args.iter().map(|p| p.as_str()).collect();
    ns.export(&patterns, clear);
    Ok(None)
}

/// # namespace forget ?*pattern* ...?
fn cmd_namespace_forget(interp: &Interp, argv: &[Value]) -> TclOptResult {
    for pattern in &argv[2..] {
        interp.forget(pattern.as_str())?;
    }
    Ok(None)
}

/// # namespace import ?-force? ?*pattern* ...?
fn cmd_namespace_import(interp: &Interp, argv: &[Value]) -> TclOptResult {
    let mut args = &argv[2..];
    let force = args.first().map(|a| a.as_str() == "-force").unwrap_or(false);
    if force {
        args = &args[1..];
    }

    for pattern in args {
        interp.import(pattern.as_str(), force)?;
    }
    Ok(None)
}

/// # namespace origin *command*
///
/// The fully-qualified name of the command an import chain ends at.
fn cmd_namespace_origin(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 3, 3, "name")?;
    match interp.command(argv[2].as_str()) {
        Some(cmd) => tcl_opt_ok!(origin(&cmd).full_name()),
        None => tcl_err!("invalid command name \"{}\"", argv[2]),
    }
}

/// # namespace qualifiers *string*
fn cmd_namespace_qualifiers(_interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 3, 3, "string")?;
    tcl_opt_ok!(qualifiers(argv[2].as_str()))
}

/// # namespace tail *string*
fn cmd_namespace_tail(_interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 3, 3, "string")?;
    tcl_opt_ok!(tail(argv[2].as_str()))
}

/// # namespace which ?-command? *name*
///
/// The fully-qualified name of the command, or the empty string if there is none.
fn cmd_namespace_which(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(2, argv, 3, 4, "?-command? name")?;

    let name = match &argv[2..] {
        [name] => name,
        [opt, name] if opt.as_str() == "-command" => name,
        [opt, _] => return tcl_err!("bad option \"{}\": must be -command", opt),
        _ => unreachable!(),
    };

    match interp.command(name.as_str()) {
        Some(cmd) => tcl_opt_ok!(cmd.full_name()),
        None => Ok(None),
    }
}

//------------------------------------------------------------------------------------------
// Commands and variables

/// # list ?*arg* ...?
pub fn cmd_list(_interp: &Interp, argv: &[Value]) -> TclOptResult {
    tcl_opt_ok!(&argv[1..])
}

/// # puts ?-nonewline? *string*
pub fn cmd_puts(_interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(1, argv, 2, 3, "?-nonewline? string")?;

    match &argv[1..] {
        [text] => println!("{}", text),
        [opt, text] if opt.as_str() == "-nonewline" => print!("{}", text),
        [opt, _] => return tcl_err!("bad option \"{}\": must be -nonewline", opt),
        _ => unreachable!(),
    }

    Ok(None)
}

/// # rename *oldName* *newName*
pub fn cmd_rename(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(1, argv, 3, 3, "oldName newName")?;
    interp.rename_command(argv[1].as_str(), argv[2].as_str())?;
    Ok(None)
}

/// # set *varName* ?*newValue*?
pub fn cmd_set(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(1, argv, 2, 3, "varName ?newValue?")?;

    if let Some(value) = argv.get(2) {
        interp.set_scalar_return(argv[1].as_str(), value.clone()).map(Some)
    } else {
        interp.scalar(argv[1].as_str()).map(Some)
    }
}

/// # unset ?-nocomplain? ?--? ?*varName* ...?
pub fn cmd_unset(interp: &Interp, argv: &[Value]) -> TclOptResult {
    let mut args = &argv[1..];
    let mut complain = true;

    while let Some(first) = args.first() {
        match first.as_str() {
            "-nocomplain" => complain = false,
            "--" => {
                args = &args[1..];
                break;
            }
            _ => break,
        }
        args = &args[1..];
    }

    for name in args {
        if complain && !interp.var_exists(name.as_str()) {
            return tcl_err!("can't unset \"{}\": no such variable", name);
        }
        interp.unset(name.as_str());
    }

    Ok(None)
}

//------------------------------------------------------------------------------------------
// The event loop

/// # update ?idletasks?
///
/// Services events, or only idle callbacks, until there is nothing left to do.
pub fn cmd_update(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(1, argv, 1, 2, "?idletasks?")?;

    let flags = match argv.get(1) {
        None => EventFlags::ALL_EVENTS | EventFlags::DONT_WAIT,
        Some(opt) if opt.as_str() == "idletasks" => EventFlags::IDLE_EVENTS | EventFlags::DONT_WAIT,
        Some(opt) => return tcl_err!("bad option \"{}\": must be idletasks", opt),
    };

    let notifier = interp.notifier();
    while notifier.do_one_event(flags, None) {}

    Ok(None)
}

/// # vwait *varName*
///
/// Services events until the variable is written.
pub fn cmd_vwait(interp: &Interp, argv: &[Value]) -> TclOptResult {
    check_args(1, argv, 2, 2, "name")?;

    let name = argv[1].as_str();
    let done = interp.watch_var(name);
    let notifier = interp.notifier();

    while !done.get() {
        if !notifier.has_event_sources() {
            return tcl_err!("can't wait for variable \"{}\": would wait forever", name);
        }
        notifier.do_one_event(EventFlags::ALL_EVENTS, None);
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tcl_ok;

    fn err_msg(result: TclResult) -> String {
        match result {
            Ok(value) => panic!("expected error, got {:?}", value),
            Err(exception) => exception.value().as_str().into(),
        }
    }

    #[test]
    fn test_set_unset() {
        let interp = Interp::new();
        assert_eq!(interp.eval_command("set a 1"), tcl_ok!("1"));
        assert_eq!(interp.eval_command("set a"), tcl_ok!("1"));
        assert_eq!(interp.eval_command("info exists a"), tcl_ok!(true));

        interp.eval_command("unset a").expect("unset");
        assert_eq!(interp.eval_command("info exists a"), tcl_ok!(false));
        assert_eq!(
            err_msg(interp.eval_command("unset a")),
            "can't unset \"a\": no such variable"
        );
        assert_eq!(interp.eval_command("unset -nocomplain a"), tcl_ok!());
    }

    #[test]
    fn test_return() {
        let interp = Interp::new();
        assert_eq!(interp.eval_command("return"), tcl_ok!());
        assert_eq!(interp.eval_command("return -level 0 x"), tcl_ok!("x"));
        assert_eq!(
            interp.eval_command("return -code error oops").unwrap_err().value(),
            Value::from("oops")
        );

        interp.allow_exceptions();
        let err = interp.eval_command("return -level 2 -code break").unwrap_err();
        assert_eq!(err.code(), ResultCode::Return);
        assert_eq!(err.level(), 2);
        assert_eq!(err.next_code(), ResultCode::Break);
    }

    #[test]
    fn test_error() {
        let interp = Interp::new();
        let err = interp.eval_command("error oops {saved trace} {POSIX ENOENT}").unwrap_err();
        assert_eq!(err.value().as_str(), "oops");
        assert_eq!(
            interp.scalar("errorInfo").unwrap().as_str(),
            "saved trace\n    invoked from within\n\"error oops {saved trace} {POSIX ENOENT}\""
        );
        assert_eq!(interp.scalar("errorCode").unwrap().as_str(), "POSIX ENOENT");
    }

    #[test]
    fn test_rename_and_info() {
        let interp = Interp::new();
        interp.eval_command("rename list L").expect("rename");
        assert_eq!(interp.eval_command("info commands L"), tcl_ok!("L"));
        assert_eq!(interp.eval_command("info commands lis*"), tcl_ok!(""));
        assert_eq!(interp.eval_command("info cmdtype L"), tcl_ok!("native"));
        assert_eq!(
            err_msg(interp.eval_command("info cmdtype list")),
            "invalid command name \"list\""
        );
    }

    #[test]
    fn test_namespace() {
        let interp = Interp::new();
        assert_eq!(interp.eval_command("namespace current"), tcl_ok!("::"));
        assert_eq!(
            interp.eval_command("namespace eval util namespace current"),
            tcl_ok!("::util")
        );
        assert_eq!(interp.eval_command("namespace exists util"), tcl_ok!(true));
        assert_eq!(interp.eval_command("namespace children"), tcl_ok!("::util"));
        assert_eq!(interp.eval_command("namespace qualifiers ::a::b::c"), tcl_ok!("::a::b"));
        assert_eq!(interp.eval_command("namespace tail ::a::b::c"), tcl_ok!("c"));

        interp.add_command("::util::greet", |_, _| tcl_opt_ok!("hi"));
        interp
            .eval_command("namespace eval util {namespace export gr*}")
            .expect("export");
        assert_eq!(
            interp.eval_command("namespace eval util namespace export"),
            tcl_ok!("gr*")
        );

        interp.eval_command("namespace import ::util::*").expect("import");
        assert_eq!(interp.eval_command("greet"), tcl_ok!("hi"));
        assert_eq!(interp.eval_command("namespace origin greet"), tcl_ok!("::util::greet"));
        assert_eq!(interp.eval_command("namespace which greet"), tcl_ok!("::greet"));
        assert_eq!(interp.eval_command("namespace which -command nonesuch"), tcl_ok!(""));

        interp.eval_command("namespace forget ::util::greet").expect("forget");
        assert!(!interp.has_command("::greet"));

        interp.eval_command("namespace delete util").expect("delete");
        assert_eq!(interp.eval_command("namespace exists util"), tcl_ok!(false));
    }

    #[test]
    fn test_after_idle() {
        let interp = Interp::new();
        let id = interp.eval_command("after idle {set x done}").expect("after");
        assert_eq!(interp.eval_command("after info"), Ok(id.clone()));
        assert_eq!(
            interp.eval_command(&format!("after info {}", id)),
            tcl_ok!("{set x done} idle")
        );

        interp.eval_command("update idletasks").expect("update");
        assert_eq!(interp.scalar("x"), tcl_ok!("done"));
        assert_eq!(interp.eval_command("after info"), tcl_ok!(""));
        assert_eq!(
            err_msg(interp.eval_command(&format!("after info {}", id))),
            format!("event \"{}\" doesn't exist", id)
        );
        interp.dispose();
    }

    #[test]
    fn test_after_cancel() {
        let interp = Interp::new();
        let id = interp.eval_command("after idle set x 1").expect("after");
        interp.eval_command("after idle set y 2").expect("after");

        interp.eval_command(&format!("after cancel {}", id)).expect("cancel");
        interp.eval_command("after cancel set y 2").expect("cancel");
        interp.eval_command("update").expect("update");

        assert!(!interp.var_exists("x"));
        assert!(!interp.var_exists("y"));
        interp.dispose();
    }

    #[test]
    fn test_background_error() {
        let interp = Interp::new();
        interp.add_command("bgerror", |interp, argv| {
            interp.set_scalar_return("caught", argv[1].clone()).map(Some)
        });

        interp.eval_command("after idle error oops").expect("after");
        interp.eval_command("update").expect("update");
        assert_eq!(interp.scalar("caught"), tcl_ok!("oops"));
        interp.dispose();
    }

    #[test]
    fn test_vwait() {
        let interp = Interp::new();
        interp.eval_command("after idle set done 1").expect("after");
        assert_eq!(interp.eval_command("vwait done"), tcl_ok!());
        assert_eq!(interp.scalar("done"), tcl_ok!("1"));

        assert_eq!(
            err_msg(interp.eval_command("vwait never")),
            "can't wait for variable \"never\": would wait forever"
        );
        interp.dispose();
    }

    #[test]
    fn test_break_continue() {
        let interp = Interp::new();
        interp.allow_exceptions();
        assert_eq!(
            interp.eval_command("break").unwrap_err().code(),
            ResultCode::Break
        );
        interp.allow_exceptions();
        assert_eq!(
            interp.eval_command("continue").unwrap_err().code(),
            ResultCode::Continue
        );
        assert_eq!(
            err_msg(interp.eval_command("break x")),
            "wrong # args: should be \"break\""
        );
    }
}
