//! Command identity, import, and alias behavior across the public API.

use rejacl::types::*;
use rejacl::{tcl_ok, tcl_opt_ok, Command, Interp, Value};
use std::rc::Rc;

fn v(s: &str) -> Value {
    Value::from(s)
}

fn err_msg(result: TclResult) -> String {
    match result {
        Ok(value) => panic!("expected error, got {:?}", value),
        Err(exception) => exception.value().as_str().into(),
    }
}

// ::util::greet, exported and imported into the global namespace.
fn setup() -> Interp {
    let interp = Interp::new();
    interp.add_command("::util::greet", |_, argv| {
        tcl_opt_ok!(format!("hello {}", argv.len()))
    });
    interp
        .eval_command("namespace eval util {namespace export *}")
        .expect("export");
    interp.import("::util::greet", false).expect("import");
    interp
}

#[test]
fn rename_preserves_identity() {
    let interp = setup();
    let real = interp.command("::util::greet").expect("real");

    interp
        .rename_command("::util::greet", "::util::hello")
        .expect("rename");
    assert!(Rc::ptr_eq(&interp.command("::util::hello").expect("moved"), &real));
    assert_eq!(interp.eval_command("greet a b"), tcl_ok!("hello 3"));

    // Moving it to another namespace doesn't break the import either.
    interp.create_namespace("::elsewhere");
    interp
        .rename_command("::util::hello", "::elsewhere::hi")
        .expect("rename");
    assert_eq!(interp.eval_command("greet"), tcl_ok!("hello 1"));
    assert_eq!(
        interp.eval_command("namespace origin greet"),
        tcl_ok!("::elsewhere::hi")
    );
}

#[test]
fn deletion_cascades_through_imports() {
    let interp = setup();
    interp.create_namespace("::b");
    interp
        .with_namespace("::b", || interp.import("::util::greet", false))
        .expect("namespace")
        .expect("import");

    let first = interp.command("::greet").expect("import");
    let second = interp.command("::b::greet").expect("import");
    let real = interp.command("::util::greet").expect("real");
    assert_eq!(real.importers().len(), 2);

    interp.remove_command("::util::greet");

    assert!(first.is_deleted());
    assert!(second.is_deleted());
    assert!(!interp.has_command("::greet"));
    assert_eq!(
        err_msg(interp.eval_command("greet")),
        "invalid command name \"greet\""
    );
    assert_eq!(
        err_msg(first.invoke(&interp, &[v("greet")])),
        "invalid command name \"greet\""
    );
}

#[test]
fn imports_survive_redefinition() {
    let interp = setup();
    interp.add_command("::util::greet", |_, _| tcl_opt_ok!("redefined"));
    assert_eq!(interp.eval_command("greet"), tcl_ok!("redefined"));
}

#[derive(Default)]
struct Loaded;

impl Command for Loaded {
    fn execute(&self, _: &Interp, argv: &[Value]) -> TclResult {
        tcl_ok!(format!("loaded {}", argv[1..].len()))
    }
}

#[test]
fn imported_autoload_stub() {
    let interp = Interp::new();
    interp.class_loader().register_command::<Loaded>("demo.Loaded");
    interp.add_autoload("::lazy::cmd", "demo.Loaded");
    interp
        .eval_command("namespace eval lazy {namespace export cmd}")
        .expect("export");
    interp.import("::lazy::cmd", false).expect("import");

    assert_eq!(interp.command_type("::lazy::cmd"), Some(v("autoload")));
    assert_eq!(interp.eval_command("cmd x y"), tcl_ok!("loaded 2"));

    // The stub was replaced, and the import follows the loaded command.
    assert_eq!(interp.command_type("::lazy::cmd"), Some(v("object")));
    assert_eq!(interp.eval_command("cmd"), tcl_ok!("loaded 0"));
    assert_eq!(interp.eval_command("info loaded"), tcl_ok!("demo.Loaded"));
}

#[test]
fn alias_loop_rejected() {
    let interp = Interp::new();

    assert_eq!(
        err_msg(interp.create_alias(&interp, &v("foo"), &v("foo"), &[])),
        "cannot define or rename alias \"foo\": would create a loop"
    );
    assert!(!interp.has_command("foo"));

    interp
        .create_alias(&interp, &v("bar"), &v("foo"), &[])
        .expect("bar");
    assert_eq!(
        err_msg(interp.create_alias(&interp, &v("foo"), &v("bar"), &[])),
        "cannot define or rename alias \"foo\": would create a loop"
    );
    assert!(!interp.has_command("foo"));
    assert_eq!(interp.alias_names(), vec![v("bar")]);
    assert_eq!(interp.target_aliases().len(), 1);

    interp.dispose();
}

#[test]
fn alias_redefinition() {
    let master = Interp::new();
    let slave = master.create_slave("s", false).expect("slave");

    slave
        .create_alias(&master, &v("foo"), &v("list"), &[v("target1")])
        .expect("alias");
    slave
        .create_alias(&master, &v("foo"), &v("list"), &[v("target2")])
        .expect("alias");

    assert_eq!(slave.alias_names(), vec![v("foo")]);
    assert_eq!(slave.describe_alias(&v("foo")), Some(vec![v("list"), v("target2")]));

    let targets = master.target_aliases();
    assert_eq!(targets.len(), 1);
    assert!(Rc::ptr_eq(&targets[0], &slave.command("foo").expect("alias")));
    assert_eq!(slave.eval_command("foo x"), tcl_ok!("target2 x"));

    master.dispose();
}

#[test]
fn nested_aliases_return_to_zero() {
    let root = Interp::new();
    let s1 = root.create_slave("s1", false).expect("slave");
    let s2 = root.create_slave("s2", false).expect("slave");
    let s3 = root.create_slave("s3", false).expect("slave");

    s3.add_command("real", |_, argv| match argv.get(1).map(|a| a.as_str()) {
        Some("fail") => Err(Exception::tcl_err2(v("DEMO"), v("real failed"))),
        Some("break") => Err(Exception::tcl_break()),
        _ => tcl_opt_ok!("real result"),
    });

    root.create_alias(&s1, &v("a"), &v("b"), &[]).expect("a");
    s1.create_alias(&s2, &v("b"), &v("c"), &[]).expect("b");
    s2.create_alias(&s3, &v("c"), &v("real"), &[]).expect("c");

    assert_eq!(root.eval_command("a"), tcl_ok!("real result"));

    let err = root.eval_command("a fail").unwrap_err();
    assert!(err.is_error());
    assert_eq!(err.value(), v("real failed"));
    assert_eq!(root.scalar("errorCode"), tcl_ok!("DEMO"));

    // An unexpected code is resolved where the chain enters each interpreter.
    assert_eq!(
        err_msg(root.eval_command("a break")),
        "invoked \"break\" outside of a loop"
    );

    for interp in [&root, &s1, &s2, &s3] {
        assert_eq!(interp.nest_level(), 0);
    }

    root.dispose();
}

#[test]
fn dispose_deletes_aliases_into_interp() {
    let root = Interp::new();
    let target = root.create_slave("t", false).expect("slave");
    root.create_alias(&target, &v("fwd"), &v("list"), &[v("x")])
        .expect("alias");
    assert_eq!(root.eval_command("fwd y"), tcl_ok!("x y"));

    root.eval_command("interp delete t").expect("delete");
    assert!(target.is_deleted());
    assert!(!root.has_command("fwd"));
    assert!(root.alias_names().is_empty());

    root.dispose();
}

#[test]
fn slave_deleted_during_alias_call_survives_until_return() {
    let root = Interp::new();
    let slave = root.create_slave("s", false).expect("slave");

    root.add_command("kill", |interp, _| {
        interp.delete_slave(&Value::from("s"))?;
        tcl_opt_ok!()
    });

    slave.add_command("body", |interp, _| {
        interp.eval_command("k")?;
        assert!(interp.is_dispose_pending());
        assert!(!interp.is_deleted());
        interp.eval_command("set x 1")?;
        let x = interp.scalar("x")?;
        tcl_opt_ok!(x)
    });

    root.create_alias(&slave, &v("run"), &v("body"), &[]).expect("run");
    slave.create_alias(&root, &v("k"), &v("kill"), &[]).expect("k");

    assert_eq!(root.eval_command("run"), tcl_ok!("1"));

    // The disposal completes once the alias call returns.
    assert!(slave.is_deleted());
    assert!(!slave.is_dispose_pending());
    assert!(root.slave("s").is_none());
    assert!(!root.has_command("s"));
    assert!(!root.has_command("run"));

    root.dispose();
}
