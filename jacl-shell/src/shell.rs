//! Console frameworks for the Jacl command core.
//!
//! The core executes commands given as TCL lists; it has no script parser.  The
//! frameworks here therefore treat each input line as one command.

use rejacl::{Interp, TclList, Value};
use rustyline::{error::ReadlineError, history::MemHistory, Config, Editor};
use std::fs;
use tracing::{debug, warn};

/// Invokes an interactive REPL for the given interpreter, using `rustyline` line editing.
///
/// The REPL will display a default prompt to the user.  Press `^C` to terminate
/// the REPL, returning control to the caller.
///
/// To change the prompt, set the `tcl_prompt1` TCL variable to a command that returns
/// the desired prompt.
///
/// See [`rejacl::interp`](../rejacl/interp/index.html) for details on how to configure and
/// add commands to an interpreter.
///
/// # Example
///
/// ```no_run
/// use rejacl::Interp;
///
/// // FIRST, create and initialize the interpreter.
/// let interp = Interp::new();
///
/// // NOTE: commands can be added to the interpreter here.
///
/// // NEXT, invoke the REPL.
/// rejacl_shell::repl(&interp);
/// ```
pub fn repl(interp: &Interp) {
    let mut rl = match Editor::<(), MemHistory>::with_history(Config::default(), MemHistory::new())
    {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("failed to initialize line editing: {}", err);
            return;
        }
    };

    loop {
        let readline = if let Ok(pcommand) = interp.scalar("tcl_prompt1") {
            match interp.eval_command(pcommand.as_str()) {
                Ok(prompt) => rl.readline(prompt.as_str()),
                Err(exception) => {
                    println!("{}", exception.value());
                    rl.readline("% ")
                }
            }
        } else {
            rl.readline("% ")
        };

        match readline {
            Ok(line) => {
                let line = line.trim();
                if !line.is_empty() {
                    match interp.eval_command(line) {
                        Ok(value) => {
                            if let Err(e) = rl.add_history_entry(line) {
                                warn!(error = %e, "history error");
                            }

                            // Don't output empty values.
                            if !value.as_str().is_empty() {
                                println!("{}", value);
                            }
                        }
                        Err(exception) => {
                            println!("{}", exception.value());
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("I/O Error: {:?}", err);
                break;
            }
        }
    }
}

/// Executes a command file from a set of command line arguments.
///
/// `args[0]` is presumed to be the name of a file of commands, one per line, with any
/// subsequent arguments being arguments to pass to it.  Blank lines and lines beginning
/// with `#` are skipped.  The commands are executed in the context of the given
/// interpreter.
///
/// # Variables
///
/// The calling information will be passed to the interpreter in the form of TCL
/// variables:
///
/// * The variable `arg0` will be set to the `arg0` value.
/// * The variable `argv` will be set to a TCL list containing the remainder of the
///   `argv` array.
///
/// # Example
///
/// ```no_run
/// use rejacl::Interp;
/// use std::env;
///
/// // FIRST, get the command line arguments.
/// let args: Vec<String> = env::args().collect();
///
/// // NEXT, create and initialize the interpreter.
/// let interp = Interp::new();
///
/// // NEXT, evaluate the file, if any.
/// if args.len() > 1 {
///     rejacl_shell::script(&interp, &args[1..]);
/// } else {
///     eprintln!("Usage: myshell *filename*");
/// }
/// ```
pub fn script(interp: &Interp, args: &[String]) {
    let arg0 = &args[0];
    let argv = &args[1..];
    match fs::read_to_string(arg0) {
        Ok(script) => execute_script(interp, &script, arg0, argv),
        Err(e) => println!("{}", e),
    }
}

/// Executes the commands read from a file, with any command-line arguments, in
/// the context of the given interpreter.  Exits the process on the first error.
fn execute_script(interp: &Interp, script: &str, arg0: &str, argv: &[String]) {
    let argv: TclList = argv.iter().map(Value::from).collect();
    interp.set_scalar("arg0", Value::from(arg0));
    interp.set_scalar("argv", Value::from(argv));

    debug!(file = arg0, "executing script");

    for (number, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Err(exception) = interp.eval_command(line) {
            let info = interp
                .scalar("errorInfo")
                .unwrap_or_else(|_| exception.value());
            eprintln!("{}\n    (file \"{}\" line {})", info, arg0, number + 1);
            std::process::exit(1);
        }
    }
}
