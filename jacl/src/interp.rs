//! The Jacl Interpreter
//!
//! The [`Interp`] struct is the primary API for embedding the Jacl core into a Rust
//! application.  Given an `Interp`, the application may:
//!
//! * Invoke commands
//! * Extend the language by defining new commands in Rust
//! * Organize commands into namespaces, and import them from one namespace to another
//! * Create slave interpreters, and aliases between interpreters
//! * Set and get variables
//! * Schedule work on the thread's event notifier
//!
//! The following describes the features of the [`Interp`] in general; follow the links for
//! specifics of the various types and methods.
//!
//! # Interp is not Send!
//!
//! An [`Interp`] is a cheaply-clonable handle to interpreter state that lives on one thread.
//! Commands, aliases, and slave interpreters all hold such handles, and all are used from
//! that thread only.  Work arriving from other threads goes through the thread's
//! [`Notifier`], which runs it on the interpreter's thread; see the
//! [`notifier`](../notifier/index.html) module.
//!
//! # Creating an Interpreter
//!
//! There are two ways to create an interpreter.  The usual way is to call
//! [`Interp::new`](struct.Interp.html#method.new), which creates an interpreter and populates
//! it with all of the standard commands.  The application can then add any
//! application-specific commands.
//!
//! Alternatively, [`Interp::empty`](struct.Interp.html#method.empty) creates an interpreter
//! with no built-in commands, allowing the application to define only those commands it needs.
//!
//! ```
//! use rejacl::Interp;
//! let interp = Interp::new();
//!
//! // add commands, invoke them, etc.
//! # interp.dispose();
//! ```
//!
//! # Disposing of an Interpreter
//!
//! Interpreters refer to one another: an alias holds a handle to its target, and a
//! master holds handles to its slaves.  Call [`Interp::dispose`](struct.Interp.html#method.dispose)
//! when done with an interpreter.  Disposal deletes all of its commands, disposes of its
//! slaves, deletes the aliases in other interpreters that target it, and cancels its
//! pending `after` callbacks; afterwards the handle's memory is released as usual.
//!
//! # Invoking Commands
//!
//! The script parser lives outside this crate; the core executes commands given their
//! words.  [`Interp::invoke`](struct.Interp.html#method.invoke) takes the words as a slice
//! of [`Value`]s, the first of which names the command.
//! [`Interp::eval_command`](struct.Interp.html#method.eval_command) takes a single command
//! written as a TCL list, which is convenient at a console.
//!
//! ```
//! use rejacl::Interp;
//! use rejacl::Value;
//! use rejacl::tcl_ok;
//! use rejacl::types::*;
//!
//! let _ = my_func();
//!
//! fn my_func() -> TclResult {
//!     let interp = Interp::new();
//!
//!     let val = interp.invoke(&[Value::from("set"), Value::from("a"), Value::from("1")])?;
//!     assert_eq!(val.as_str(), "1");
//!
//!     let val = interp.eval_command("list a {b c}")?;
//!     assert_eq!(val.as_str(), "a {b c}");
//!
//!     tcl_ok!()
//! }
//! ```
//!
//! When called at the top level (i.e., not from within another command), the invoke methods
//! resolve `return` and convert the `break` and `continue` return codes (and any
//! application-defined return codes) to errors; otherwise they are propagated to the caller
//! for handling.
//!
//! All of these methods return [`TclResult`]:
//!
//! ```ignore
//! pub type TclResult = Result<Value, Exception>;
//! ```
//!
//! [`Value`] is the type of all TCL values.  [`Exception`] is a struct that encompasses all
//! of the kinds of exceptional return from a command, including errors, `return`, `break`,
//! and `continue`.
//!
//! # Defining New Commands
//!
//! The usual reason for embedding the interpreter in an application is to extend it with
//! application-specific commands.  There are several ways to do this.
//!
//! The simplest method, and the one used by most of the built-in commands, is to define a
//! [`CommandFunc`] and register it with the interpreter using the
//! [`Interp::add_command`](struct.Interp.html#method.add_command) method. A `CommandFunc` is
//! simply a Rust function that returns a [`TclOptResult`] given an interpreter and a slice of
//! [`Value`] objects representing the command name and its arguments.
//!
//! The following example defines a command called `square` that squares an integer value.
//!
//! ```
//! use rejacl::Interp;
//! use rejacl::Value;
//! use rejacl::check_args;
//! use rejacl::{tcl_opt_ok, tcl_ok};
//! use rejacl::types::*;
//!
//! # let _ = dummy();
//! # fn dummy() -> TclResult {
//! let interp = Interp::new();
//! interp.add_command("square", cmd_square);
//!
//! let val = interp.eval_command("square 5")?;
//! assert_eq!(val.as_str(), "25");
//! # tcl_ok!()
//! # }
//!
//! // The command: square intValue
//! fn cmd_square(_: &Interp, argv: &[Value]) -> TclOptResult {
//!     check_args(1, argv, 2, 2, "intValue")?;
//!     let int_value = argv[1].as_int()?;
//!     tcl_opt_ok!(int_value * int_value)
//! }
//! ```
//!
//! Commands that carry state implement the [`Command`] trait and are registered with
//! [`Interp::add_command_object`](struct.Interp.html#method.add_command_object); the
//! trait's `dispose` method is called when the command is deleted.  Commands that should
//! be loaded only when first used are registered with
//! [`Interp::add_autoload`](struct.Interp.html#method.add_autoload); see the
//! [`autoload`](../autoload/index.html) module.
//!
//! # Command Identity
//!
//! Every command is a binding of a name to a [`WrappedCommand`].  Renaming a command moves
//! its binding; deleting it marks the binding deleted and deletes every command that
//! imports it.  See the [`command`](../command/index.html) module.
//!
//! # Accessing Variables
//!
//! The core keeps a table of global scalar variables, accessed with
//! [`Interp::scalar`](struct.Interp.html#method.scalar),
//! [`Interp::set_scalar`](struct.Interp.html#method.set_scalar), and
//! [`Interp::set_scalar_return`](struct.Interp.html#method.set_scalar_return).  When an
//! error reaches the interpreter, its stack trace and error code are saved in the
//! `errorInfo` and `errorCode` variables.
//!
//! # Ensemble Commands
//!
//! An _ensemble command_ is simply a command with subcommands, like the standard `interp`
//! and `namespace` commands.  At the Rust level, it is simply a command that looks up its
//! subcommand (e.g., `argv[1]`) in an array of `Subcommand` structs and executes it as a
//! command.
//!
//! The [`Interp::call_subcommand`](struct.Interp.html#method.call_subcommand) method is used
//! to look up and call the relevant command function, handling all relevant errors in the
//! TCL-standard way.
//!
//! ```ignore
//! const AFTER_SUBCOMMANDS: [Subcommand; 3] = [
//!     Subcommand("cancel", cmd_after_cancel),
//!     Subcommand("idle", cmd_after_idle),
//!     Subcommand("info", cmd_after_info),
//! ];
//!
//! pub fn cmd_after(interp: &Interp, argv: &[Value]) -> TclOptResult {
//!     interp.call_subcommand(argv, 1, &AFTER_SUBCOMMANDS)
//! }
//! ```
//!
//! [`TclResult`]: ../types/type.TclResult.html
//! [`TclOptResult`]: ../types/type.TclOptResult.html
//! [`Exception`]: ../types/struct.Exception.html
//! [`CommandFunc`]: ../types/type.CommandFunc.html
//! [`Command`]: ../command/trait.Command.html
//! [`WrappedCommand`]: ../command/struct.WrappedCommand.html
//! [`Notifier`]: ../notifier/struct.Notifier.html
//! [`Value`]: ../value/index.html
//! [`Interp`]: struct.Interp.html

use crate::alias::{is_same, prevent_alias_loop, InterpAliasCmd, TargetEntry};
use crate::autoload::{AutoloadStub, ClassLoader};
use crate::check_args;
use crate::command::{CmdId, Command, CommandKind, WrappedCommand};
use crate::commands;
use crate::import;
use crate::list::{get_list, list_to_string};
use crate::namespace::{is_absolute, split_name, Namespace};
use crate::notifier::{IdleHandler, Notifier};
use crate::slave::{self, InterpSlaveCmd};
use crate::tcl_err;
use crate::tcl_ok;
use crate::types::*;
use crate::value::Value;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use indexmap::IndexMap;
use tracing::{debug, trace};

/// The Jacl Interpreter.
///
/// The `Interp` struct is the primary API for embedding the Jacl core into a Rust
/// application.  The application creates an instance of `Interp`, configures it with the
/// required set of application-specific and standard commands, and then uses it to
/// invoke commands.  See the [module level documentation](index.html) for an overview.
///
/// `Interp` is a handle: cloning it produces another handle to the same interpreter.
///
/// # Example
///
/// By default, the `Interp` comes configured with the full set of standard commands.
///
/// ```
/// use rejacl::types::*;
/// use rejacl::Interp;
/// use rejacl::Value;
/// use rejacl::tcl_ok;
/// # fn dummy() -> TclResult {
/// let interp = Interp::new();
/// let list = interp.eval_command("list a b")?;
/// assert_eq!(list, Value::from("a b"));
/// # tcl_ok!()
/// # }
/// ```
///
/// # Memory
///
/// Aliases, `after` callbacks, and slave interpreters link interpreters in reference
/// cycles, so dropping the last handle does not free an interpreter; embedders must call
/// [`dispose`](#method.dispose) when they are done with it.
#[derive(Clone)]
pub struct Interp {
    inner: Rc<InterpInner>,
}

/// A weak handle to an interpreter, which does not keep it alive.
#[derive(Clone, Default)]
pub struct WeakInterp(Weak<InterpInner>);

impl WeakInterp {
    pub fn upgrade(&self) -> Option<Interp> {
        self.0.upgrade().map(|inner| Interp { inner })
    }
}

struct InterpInner {
    // Namespaces
    global_ns: Rc<Namespace>,
    current_ns: RefCell<Rc<Namespace>>,

    // Variable Table
    vars: RefCell<IndexMap<String, Value, TclHasher>>,

    // Flags set when the named variable is written, for `vwait`.
    var_watches: RefCell<IndexMap<String, Vec<Weak<Cell<bool>>>, TclHasher>>,

    // Defines the recursion limit for Interp::invoke().
    recursion_limit: Cell<usize>,

    // Current number of nested invocations.
    nest_level: Cell<usize>,

    // Set to pass exceptional codes through the next invocation unchanged.
    allow_exceptions: Cell<bool>,

    safe: bool,
    deleted: Cell<bool>,

    // Calls in progress that need the interpreter to stay intact, and whether a disposal
    // is waiting on them.
    preserved: Cell<usize>,
    dispose_pending: Cell<bool>,

    // Aliases defined in this interpreter, by the name they were created with.
    alias_table: RefCell<IndexMap<String, Rc<InterpAliasCmd>, TclHasher>>,

    // Aliases in any interpreter that target this one.
    target_table: RefCell<IndexMap<CmdId, TargetEntry, TclHasher>>,

    // Slave interpreters, by name.
    slaves: RefCell<IndexMap<String, Interp, TclHasher>>,
    master: RefCell<WeakInterp>,
    name_in_master: RefCell<String>,
    slave_cmd: RefCell<Weak<WrappedCommand>>,

    class_loader: Rc<ClassLoader>,
    notifier: Notifier,

    // Pending `after` callbacks and their scripts, by ID.
    after: RefCell<IndexMap<String, (Arc<IdleHandler>, Value), TclHasher>>,
    after_counter: Cell<u64>,
}

/// Options for [`Interp::invoke_with`](struct.Interp.html#method.invoke_with).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InvokeFlags {
    no_traceback: bool,
}

impl InvokeFlags {
    /// The default options.
    pub const NONE: Self = Self {
        no_traceback: false,
    };

    /// Don't add the invoked command to the `errorInfo` stack trace of an error.
    pub const NO_TRACEBACK: Self = Self { no_traceback: true };
}

/// Decrements an interpreter's nesting level when dropped.
pub(crate) struct NestGuard<'a> {
    interp: &'a Interp,
}

impl Drop for NestGuard<'_> {
    fn drop(&mut self) {
        let level = self.interp.inner.nest_level.get();
        self.interp.inner.nest_level.set(level.saturating_sub(1));
    }
}

/// Keeps an interpreter intact while a call runs in it.  If the interpreter was disposed of
/// meanwhile, the last guard to drop completes the disposal.
pub(crate) struct PreserveGuard {
    interp: Interp,
}

impl Drop for PreserveGuard {
    fn drop(&mut self) {
        let count = self.interp.inner.preserved.get().saturating_sub(1);
        self.interp.inner.preserved.set(count);
        if count == 0 && self.interp.inner.dispose_pending.replace(false) {
            self.interp.teardown();
        }
    }
}

// Restores the current namespace when dropped.
struct NamespaceGuard<'a> {
    interp: &'a Interp,
    saved: Option<Rc<Namespace>>,
}

impl Drop for NamespaceGuard<'_> {
    fn drop(&mut self) {
        if let Some(ns) = self.saved.take() {
            *self.interp.inner.current_ns.borrow_mut() = ns;
        }
    }
}

// NOTE: The order of methods in the generated RustDoc depends on the order in this block.
// Consequently, methods are ordered pedagogically.
impl Interp {
    //--------------------------------------------------------------------------------------------
    // Constructors

    /// Creates a new interpreter with no commands defined.  Use this when crafting
    /// command languages that shouldn't include the normal TCL commands, or as a base
    /// to which specific command sets can be added.
    ///
    /// # Example
    ///
    /// ```
    /// # use rejacl::interp::Interp;
    /// let interp = Interp::empty();
    /// assert!(interp.command_names().is_empty());
    /// ```
    pub fn empty() -> Self {
        Self::build(Rc::new(ClassLoader::new()), false)
    }

    /// Creates a new interpreter that is pre-populated with the standard commands.
    /// Use [`command_names`](#method.command_names) (or the `info commands` command)
    /// to retrieve the full list, and the [`add_command`](#method.add_command) family of
    /// methods to extend the interpreter with new commands.
    ///
    /// ```
    /// # use rejacl::types::*;
    /// # use rejacl::Interp;
    /// # use rejacl::Value;
    /// # use rejacl::tcl_ok;
    /// # fn dummy() -> TclResult {
    /// let interp = Interp::new();
    /// let val = interp.eval_command("set x 4")?;
    /// assert_eq!(val, Value::from(4));
    /// # tcl_ok!()
    /// # }
    /// ```
    pub fn new() -> Self {
        let interp = Self::empty();
        interp.install_standard_commands();
        interp
    }

    /// Creates a new _safe_ interpreter with the standard commands.  A safe interpreter
    /// only creates safe slaves, may not load classes from restricted packages, and has no
    /// `puts` command.
    pub fn new_safe() -> Self {
        let interp = Self::build(Rc::new(ClassLoader::new()), true);
        interp.install_standard_commands();
        interp
    }

    fn build(class_loader: Rc<ClassLoader>, safe: bool) -> Self {
        let global_ns = Namespace::global();

        let interp = Self {
            inner: Rc::new(InterpInner {
                current_ns: RefCell::new(global_ns.clone()),
                global_ns,
                vars: RefCell::new(IndexMap::default()),
                var_watches: RefCell::new(IndexMap::default()),
                recursion_limit: Cell::new(1000),
                nest_level: Cell::new(0),
                allow_exceptions: Cell::new(false),
                safe,
                deleted: Cell::new(false),
                preserved: Cell::new(0),
                dispose_pending: Cell::new(false),
                alias_table: RefCell::new(IndexMap::default()),
                target_table: RefCell::new(IndexMap::default()),
                slaves: RefCell::new(IndexMap::default()),
                master: RefCell::new(WeakInterp::default()),
                name_in_master: RefCell::new(String::new()),
                slave_cmd: RefCell::new(Weak::new()),
                class_loader,
                notifier: Notifier::for_current_thread(),
                after: RefCell::new(IndexMap::default()),
                after_counter: Cell::new(0),
            }),
        };

        interp.set_scalar("errorInfo", Value::empty());
        interp
    }

    fn install_standard_commands(&self) {
        let new_commands: &[(&'static str, CommandFunc)] = &[
            ("after", commands::cmd_after),
            ("break", commands::cmd_break),
            ("continue", commands::cmd_continue),
            ("error", commands::cmd_error),
            ("info", commands::cmd_info),
            ("interp", slave::cmd_interp),
            ("list", commands::cmd_list),
            ("namespace", commands::cmd_namespace),
            ("rename", commands::cmd_rename),
            ("return", commands::cmd_return),
            ("set", commands::cmd_set),
            ("unset", commands::cmd_unset),
            ("update", commands::cmd_update),
            ("vwait", commands::cmd_vwait),
        ];

        for &(name, func) in new_commands {
            self.add_command(name, func);
        }

        if !self.is_safe() {
            self.add_command("puts", commands::cmd_puts);
        }
    }

    /// Returns a weak handle to the interpreter.
    pub fn downgrade(&self) -> WeakInterp {
        WeakInterp(Rc::downgrade(&self.inner))
    }

    /// Whether two handles refer to the same interpreter.
    pub fn ptr_eq(&self, other: &Interp) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    //--------------------------------------------------------------------------------------------
    // Command Invocation

    /// Invokes a command given its words, the first of which names the command.  Returns
    /// the command's result, or any error it throws.  At the top level, other exceptions
    /// are resolved as described in the [module level documentation](index.html).
    ///
    /// # Example
    ///
    /// ```
    /// # use rejacl::types::*;
    /// # use rejacl::Interp;
    /// # use rejacl::Value;
    /// let interp = Interp::new();
    ///
    /// match interp.invoke(&[Value::from("error"), Value::from("oops")]) {
    ///     Ok(val) => println!("Value: {}", val),
    ///     Err(exception) => {
    ///         assert!(exception.is_error());
    ///         assert_eq!(exception.value().as_str(), "oops");
    ///     }
    /// }
    /// ```
    pub fn invoke(&self, argv: &[Value]) -> TclResult {
        self.invoke_with(argv, InvokeFlags::NONE)
    }

    /// Invokes a command given its words, with the given options.
    pub fn invoke_with(&self, argv: &[Value], flags: InvokeFlags) -> TclResult {
        let allow_exceptions = self.inner.allow_exceptions.replace(false);

        if argv.is_empty() {
            return tcl_ok!();
        }

        // FIRST, check the number of nesting levels
        if self.inner.nest_level.get() >= self.inner.recursion_limit.get() {
            return tcl_err!("too many nested evaluations (infinite loop?)");
        }

        // NEXT, find and invoke the command.
        let mut result = {
            let _nest = self.enter_nest();
            match self.find_command(argv[0].as_str()) {
                Some(cmd) => cmd.invoke(self, argv),
                None => tcl_err!("invalid command name \"{}\"", argv[0]),
            }
        };

        if !flags.no_traceback {
            add_traceback(&mut result, argv);
        }

        // NEXT, translate the result at the top level.
        if self.nest_level() == 0 && !allow_exceptions {
            result = self.resolve_top_level(result);
        }

        if let Err(exception) = &result {
            if exception.is_error() {
                self.set_error_globals(exception);
            }
        }

        result
    }

    /// Invokes a command at the global level: in the global namespace, whatever the
    /// current namespace is.
    pub fn invoke_global(&self, argv: &[Value], flags: InvokeFlags) -> TclResult {
        let global = self.inner.global_ns.clone();
        let _guard = self.enter_namespace(global);
        self.invoke_with(argv, flags)
    }

    /// Invokes a single command written as a TCL list.
    ///
    /// ```
    /// # use rejacl::Interp;
    /// let interp = Interp::new();
    /// assert_eq!(interp.eval_command("set a {hello world}").unwrap().as_str(), "hello world");
    /// ```
    pub fn eval_command(&self, command: &str) -> TclResult {
        let words = get_list(command)?;
        self.invoke(&words)
    }

    /// Invokes a command given as words.  A single word is taken to be a command written
    /// as a TCL list; otherwise the words are the command's words.
    pub fn eval_words(&self, words: &[Value]) -> TclResult {
        if words.len() == 1 {
            self.eval_command(words[0].as_str())
        } else {
            self.invoke(words)
        }
    }

    /// Lets the next invocation return `break`, `continue`, and other exceptional codes
    /// unchanged, even at the top level.
    pub fn allow_exceptions(&self) {
        self.inner.allow_exceptions.set(true);
    }

    /// Resolves a `return` exception by decrementing its level: when it reaches zero, the
    /// exception takes on its `-code`, which for a normal `return` is `Ok`.
    pub fn update_return_info(&self, exception: Exception) -> TclResult {
        let mut exception = exception;
        if exception.code() == ResultCode::Return {
            exception.decrement_level();
        }

        match exception.code() {
            ResultCode::Okay => Ok(exception.value()),
            _ => Err(exception),
        }
    }

    /// Converts an exceptional code that reached the top level to the standard error.
    pub fn process_unexpected_result(&self, exception: Exception) -> Exception {
        match exception.code() {
            ResultCode::Break => {
                Exception::tcl_err(Value::from("invoked \"break\" outside of a loop"))
            }
            ResultCode::Continue => {
                Exception::tcl_err(Value::from("invoked \"continue\" outside of a loop"))
            }
            code => Exception::tcl_err(Value::from(format!(
                "command returned bad code: {}",
                code.as_int()
            ))),
        }
    }

    /// The top-level treatment of a result: `return` is resolved, and any other code but
    /// `Ok` and `Error` becomes an error.
    pub(crate) fn resolve_top_level(&self, result: TclResult) -> TclResult {
        match result {
            Ok(value) => Ok(value),
            Err(exception) => match self.update_return_info(exception) {
                Ok(value) => Ok(value),
                Err(exception) if exception.is_error() => Err(exception),
                Err(exception) => Err(self.process_unexpected_result(exception)),
            },
        }
    }

    /// Takes on the result of a command executed in another interpreter: an error's
    /// `errorInfo` and `errorCode` are copied into this interpreter.
    pub fn transfer_result(&self, source: &Interp, result: TclResult) -> TclResult {
        if !self.ptr_eq(source) {
            if let Err(exception) = &result {
                if exception.is_error() {
                    self.set_error_globals(exception);
                }
            }
        }
        result
    }

    /// Saves the error exception data
    fn set_error_globals(&self, exception: &Exception) {
        if let Some(data) = exception.error_data() {
            self.set_scalar("errorInfo", data.error_info());
            self.set_scalar("errorCode", data.error_code());
        }
    }

    /// The current number of nested invocations.
    pub fn nest_level(&self) -> usize {
        self.inner.nest_level.get()
    }

    pub(crate) fn enter_nest(&self) -> NestGuard<'_> {
        let level = self.inner.nest_level.get();
        self.inner.nest_level.set(level + 1);
        NestGuard { interp: self }
    }

    /// Holds the interpreter intact until the guard drops; see
    /// [`dispose`](#method.dispose).
    pub(crate) fn preserve(&self) -> PreserveGuard {
        self.inner.preserved.set(self.inner.preserved.get() + 1);
        PreserveGuard {
            interp: self.clone(),
        }
    }

    //--------------------------------------------------------------------------------------------
    // Command Definition and Handling

    /// Adds a binary command with no related context to the interpreter.  This is the
    /// normal way to add most commands.  The name may be qualified; namespaces are created
    /// as needed.  An existing command of the same name is replaced.
    pub fn add_command(&self, name: &str, func: CommandFunc) {
        self.create_command(name, CommandKind::Native(func));
    }

    /// Adds a command implemented as a Rust closure.
    #[cfg(feature = "closure-commands")]
    pub fn add_command_closure(
        &self,
        name: &str,
        func: impl (Fn(&Interp, &[Value]) -> TclOptResult) + 'static,
    ) {
        self.create_command(name, CommandKind::Closure(Rc::new(func)));
    }

    /// Adds a command object.  Its `dispose` method is called when the command is deleted.
    pub fn add_command_object(&self, name: &str, command: impl Command + 'static) {
        self.create_command(name, CommandKind::Object(Rc::new(command)));
    }

    /// Adds a command that loads the named class from the interpreter's
    /// [`ClassLoader`](../autoload/struct.ClassLoader.html) when first invoked.
    pub fn add_autoload(&self, name: &str, class_name: &str) {
        self.create_command(name, CommandKind::Autoload(Rc::new(AutoloadStub::new(class_name))));
    }

    /// Binds a name to a new command of the given kind, returning the binding.  A relative
    /// name is taken relative to the current namespace; namespaces are created as needed.
    pub fn create_command(&self, name: &str, kind: CommandKind) -> Rc<WrappedCommand> {
        let (quals, tail) = split_name(name);
        let ns = match quals {
            None => self.current_namespace(),
            Some(quals) if is_absolute(quals) => self.inner.global_ns.ensure_path(quals),
            Some(quals) => self.current_namespace().ensure_path(quals),
        };
        self.create_command_in(&ns, tail, kind)
    }

    /// Binds a simple name in the given namespace to a new command.  If the name is already
    /// bound, the commands importing the old command now import the new one, and the old
    /// command is deleted.
    pub(crate) fn create_command_in(
        &self,
        ns: &Rc<Namespace>,
        name: &str,
        kind: CommandKind,
    ) -> Rc<WrappedCommand> {
        let binding = WrappedCommand::new(ns, name, kind);

        if let Some(old) = ns.find_command(name) {
            for importer in old.take_importers() {
                if let Some(data) = importer.kind().as_imported() {
                    data.retarget(&binding);
                }
                binding.add_importer(&importer);
            }
            old.delete();
        }

        ns.insert_command(name, binding.clone());
        trace!(command = %binding.full_name(), "command created");
        binding
    }

    /// Looks up a command by name, as seen from the current namespace.
    pub fn command(&self, name: &str) -> Option<Rc<WrappedCommand>> {
        self.find_command(name)
    }

    pub(crate) fn find_command(&self, name: &str) -> Option<Rc<WrappedCommand>> {
        let current = self.current_namespace();
        self.resolve_command(&current, name)
    }

    /// Looks up a command by name, as seen from the global namespace.
    pub(crate) fn find_command_global(&self, name: &str) -> Option<Rc<WrappedCommand>> {
        let global = self.inner.global_ns.clone();
        self.resolve_command(&global, name)
    }

    fn resolve_command(&self, from: &Rc<Namespace>, name: &str) -> Option<Rc<WrappedCommand>> {
        let (quals, tail) = split_name(name);
        match quals {
            None => from
                .find_command(tail)
                .or_else(|| self.inner.global_ns.find_command(tail)),
            Some(quals) => self.resolve_namespace(from, quals)?.find_command(tail),
        }
    }

    /// Determines whether or not the interpreter contains a command with the given
    /// name.
    pub fn has_command(&self, name: &str) -> bool {
        self.find_command(name).is_some()
    }

    /// Renames the command.  An empty new name deletes the command.
    ///
    /// The command keeps its identity: imports of it, and aliases that refer to it, keep
    /// working.  Renaming an alias so that it would form a loop of aliases is an error,
    /// and leaves the alias where it was.
    ///
    /// # Example
    ///
    /// ```
    /// use rejacl::Interp;
    /// use rejacl::types::*;
    /// use rejacl::tcl_ok;
    /// # fn dummy() -> TclResult {
    /// let interp = Interp::new();
    ///
    /// interp.rename_command("list", "L")?;
    /// assert_eq!(interp.eval_command("L a b")?.as_str(), "a b");
    /// # tcl_ok!()
    /// # }
    /// ```
    pub fn rename_command(&self, old_name: &str, new_name: &str) -> Result<(), Exception> {
        let cmd = match self.find_command(old_name) {
            Some(cmd) => cmd,
            None => {
                if new_name.is_empty() {
                    return tcl_err!("can't delete \"{}\": command doesn't exist", old_name);
                }
                return tcl_err!("can't rename \"{}\": command doesn't exist", old_name);
            }
        };

        if new_name.is_empty() {
            self.delete_command_from_token(&cmd);
            return Ok(());
        }

        let (quals, tail) = split_name(new_name);
        let new_ns = match quals {
            None => Some(self.current_namespace()),
            Some(quals) => self.find_namespace(quals),
        };
        let new_ns = match new_ns {
            Some(ns) if !tail.is_empty() => ns,
            _ => return tcl_err!("can't rename to \"{}\": bad command name", new_name),
        };

        if new_ns.find_command(tail).is_some() {
            return tcl_err!("can't rename to \"{}\": command already exists", new_name);
        }

        let old_ns = match cmd.namespace() {
            Some(ns) => ns,
            None => return tcl_err!("can't rename \"{}\": command doesn't exist", old_name),
        };
        let old_tail = cmd.name();

        old_ns.unlink_command(&old_tail, &cmd);
        cmd.rebind(&new_ns, tail);
        new_ns.insert_command(tail, cmd.clone());

        if let Err(err) = prevent_alias_loop(&cmd) {
            new_ns.unlink_command(tail, &cmd);
            cmd.rebind(&old_ns, &old_tail);
            old_ns.insert_command(&old_tail, cmd.clone());
            return Err(err);
        }

        trace!(from = old_name, to = %cmd.full_name(), "command renamed");
        Ok(())
    }

    /// Removes the command with the given name, if it exists.
    ///
    /// # Example
    ///
    /// ```
    /// use rejacl::Interp;
    ///
    /// let interp = Interp::new();
    ///
    /// interp.remove_command("set");  // You'll be sorry....
    ///
    /// assert!(!interp.has_command("set"));
    /// ```
    pub fn remove_command(&self, name: &str) {
        if let Some(cmd) = self.find_command(name) {
            self.delete_command_from_token(&cmd);
        }
    }

    /// Deletes the command with the given name.
    pub fn delete_command(&self, name: &str) -> Result<(), Exception> {
        match self.find_command(name) {
            Some(cmd) => {
                self.delete_command_from_token(&cmd);
                Ok(())
            }
            None => tcl_err!("can't delete \"{}\": command doesn't exist", name),
        }
    }

    /// Deletes a command given its binding.  Deleting a deleted binding does nothing.
    pub fn delete_command_from_token(&self, cmd: &Rc<WrappedCommand>) {
        cmd.delete();
    }

    /// Gets the names of the commands visible from the current namespace: those in the
    /// current namespace, followed by those in the global namespace.
    ///
    /// # Example
    ///
    /// ```
    /// use rejacl::Interp;
    ///
    /// let interp = Interp::new();
    ///
    /// for name in interp.command_names() {
    ///     println!("Found command: {}", name);
    /// }
    /// ```
    pub fn command_names(&self) -> TclList {
        let current = self.current_namespace();
        let mut names: Vec<String> = current.command_names();

        if !Rc::ptr_eq(&current, &self.inner.global_ns) {
            for name in self.inner.global_ns.command_names() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }

        names.into_iter().map(Value::from).collect()
    }

    /// Returns a value naming the command's type, or `None` if there is no such command.
    pub fn command_type(&self, command: &str) -> Option<Value> {
        self.find_command(command).map(|cmd| cmd.kind().cmdtype())
    }

    /// Calls a subcommand of the current command, looking up its name in an array of
    /// `Subcommand` tuples.
    ///
    /// The subcommand, if found, is called with the same `interp` and `argv` as its
    /// parent ensemble.  `subc` is the index of the subcommand's name in the `argv` array;
    /// in most cases it will be `1`, but it is possible to define subcommands with
    /// subcommands of their own.  If the subcommand name is not found in the array, the
    /// standard TCL error message is returned.
    pub fn call_subcommand(
        &self,
        argv: &[Value],
        subc: usize,
        subcommands: &[Subcommand],
    ) -> TclOptResult {
        check_args(subc, argv, subc + 1, 0, "subcommand ?arg ...?")?;
        let rec = Subcommand::find(subcommands, argv[subc].as_str())?;
        (rec.1)(self, argv)
    }

    //--------------------------------------------------------------------------------------------
    // Namespaces

    /// The global namespace, `::`.
    pub fn global_namespace(&self) -> Rc<Namespace> {
        self.inner.global_ns.clone()
    }

    /// The namespace commands are currently resolved in.
    pub fn current_namespace(&self) -> Rc<Namespace> {
        self.inner.current_ns.borrow().clone()
    }

    /// Calls `f` with the named namespace as the current namespace.
    pub fn with_namespace<R>(&self, name: &str, f: impl FnOnce() -> R) -> Result<R, Exception> {
        let ns = match self.find_namespace(name) {
            Some(ns) => ns,
            None => return tcl_err!("namespace \"{}\" not found", name),
        };

        let _guard = self.enter_namespace(ns);
        Ok(f())
    }

    fn enter_namespace(&self, ns: Rc<Namespace>) -> NamespaceGuard<'_> {
        let saved = core::mem::replace(&mut *self.inner.current_ns.borrow_mut(), ns);
        NamespaceGuard {
            interp: self,
            saved: Some(saved),
        }
    }

    /// Returns the named namespace, creating it and any missing parents.
    pub fn create_namespace(&self, name: &str) -> Rc<Namespace> {
        if is_absolute(name) {
            self.inner.global_ns.ensure_path(name)
        } else {
            self.current_namespace().ensure_path(name)
        }
    }

    /// Finds a namespace by name.  A relative name is looked up in the current namespace
    /// and then in the global namespace.
    pub fn find_namespace(&self, name: &str) -> Option<Rc<Namespace>> {
        let current = self.current_namespace();
        self.resolve_namespace(&current, name)
    }

    fn resolve_namespace(&self, from: &Rc<Namespace>, name: &str) -> Option<Rc<Namespace>> {
        if is_absolute(name) {
            self.inner.global_ns.descend(name)
        } else {
            from.descend(name)
                .or_else(|| self.inner.global_ns.descend(name))
        }
    }

    /// Deletes a namespace, its commands, and its descendants.
    pub fn delete_namespace(&self, name: &str) -> Result<(), Exception> {
        let ns = match self.find_namespace(name) {
            Some(ns) => ns,
            None => return tcl_err!("unknown namespace \"{}\" in namespace delete command", name),
        };

        if ns.is_global() {
            return tcl_err!("can't delete the global namespace");
        }

        // The current namespace can't be left pointing into the deleted tree.
        let mut current = Some(self.current_namespace());
        while let Some(ns_in_path) = current {
            if Rc::ptr_eq(&ns_in_path, &ns) {
                *self.inner.current_ns.borrow_mut() = self.inner.global_ns.clone();
                break;
            }
            current = ns_in_path.parent();
        }

        debug!(namespace = ns.full_name(), "deleting namespace");
        ns.teardown();
        Ok(())
    }

    /// Imports the commands matching a qualified pattern into the current namespace.
    pub fn import(&self, pattern: &str, force: bool) -> Result<(), Exception> {
        let current = self.current_namespace();
        import::import(self, &current, pattern, force)
    }

    /// Deletes the imported commands in the current namespace that match the pattern.
    pub fn forget(&self, pattern: &str) -> Result<(), Exception> {
        let current = self.current_namespace();
        import::forget(self, &current, pattern)
    }

    //--------------------------------------------------------------------------------------------
    // Variable Handling

    fn var_key(name: &str) -> &str {
        name.trim_start_matches("::")
    }

    /// Retrieves the value of the named scalar variable.
    ///
    /// ```
    /// # use rejacl::types::*;
    /// # use rejacl::Interp;
    /// # use rejacl::Value;
    /// let interp = Interp::new();
    /// interp.set_scalar("a", Value::from(1));
    /// assert_eq!(interp.scalar("a").unwrap().as_int().unwrap(), 1);
    /// assert!(interp.scalar("b").is_err());
    /// ```
    pub fn scalar(&self, name: &str) -> TclResult {
        match self.inner.vars.borrow().get(Self::var_key(name)) {
            Some(value) => Ok(value.clone()),
            None => tcl_err!("can't read \"{}\": no such variable", name),
        }
    }

    /// Sets the value of the named scalar variable, creating it if need be.
    pub fn set_scalar(&self, name: &str, value: Value) {
        let key = Self::var_key(name);
        self.inner.vars.borrow_mut().insert(key.into(), value);
        self.fire_watches(key);
    }

    /// Sets the value of the named scalar variable, returning the value.
    pub fn set_scalar_return(&self, name: &str, value: Value) -> TclResult {
        self.set_scalar(name, value.clone());
        Ok(value)
    }

    /// Unsets the named variable.  Unsetting a variable that doesn't exist does nothing.
    pub fn unset(&self, name: &str) {
        let key = Self::var_key(name);
        let removed = self.inner.vars.borrow_mut().shift_remove(key);
        if removed.is_some() {
            self.fire_watches(key);
        }
    }

    /// Whether the named variable exists.
    pub fn var_exists(&self, name: &str) -> bool {
        self.inner.vars.borrow().contains_key(Self::var_key(name))
    }

    /// The names of the variables, in creation order.
    pub fn var_names(&self) -> TclList {
        self.inner
            .vars
            .borrow()
            .keys()
            .map(|name| Value::from(name.as_str()))
            .collect()
    }

    /// Returns a flag that is set whenever the named variable is written or unset.  The
    /// watch lasts as long as the flag is held.
    pub fn watch_var(&self, name: &str) -> Rc<Cell<bool>> {
        let flag = Rc::new(Cell::new(false));
        self.inner
            .var_watches
            .borrow_mut()
            .entry(Self::var_key(name).into())
            .or_default()
            .push(Rc::downgrade(&flag));
        flag
    }

    fn fire_watches(&self, key: &str) {
        let mut watches = self.inner.var_watches.borrow_mut();
        if let Some(flags) = watches.get_mut(key) {
            flags.retain(|flag| match flag.upgrade() {
                Some(flag) => {
                    flag.set(true);
                    true
                }
                None => false,
            });
            if flags.is_empty() {
                watches.shift_remove(key);
            }
        }
    }

    //--------------------------------------------------------------------------------------------
    // Aliases

    /// Creates an alias named `name` in this interpreter that forwards to the command
    /// `target_name`, with the bound arguments `args`, in the `target` interpreter.
    /// Returns the alias's name.  See the [`alias`](../alias/index.html) module.
    pub fn create_alias(
        &self,
        target: &Interp,
        name: &Value,
        target_name: &Value,
        args: &[Value],
    ) -> TclResult {
        InterpAliasCmd::create(self, target, name, target_name, args)
    }

    /// Deletes the alias that was created with the given name, wherever it has since been
    /// renamed to.
    pub fn delete_alias(&self, name: &Value) -> Result<(), Exception> {
        InterpAliasCmd::delete(self, name)
    }

    /// The prefix of the alias that was created with the given name: the target command
    /// and the bound arguments.
    pub fn describe_alias(&self, name: &Value) -> Option<TclList> {
        InterpAliasCmd::describe(self, name)
    }

    /// The names with which this interpreter's aliases were created.
    pub fn alias_names(&self) -> TclList {
        InterpAliasCmd::list(self)
    }

    /// The target interpreter of the alias that was created with the given name.
    pub fn alias_target_interp(&self, name: &Value) -> Option<Interp> {
        self.alias_entry(name.as_str())
            .map(|alias| alias.target_interp().clone())
    }

    /// The command the alias that was created with the given name currently resolves to.
    pub fn alias_target_cmd(&self, name: &Value) -> Option<Rc<WrappedCommand>> {
        self.alias_entry(name.as_str())?.target_cmd()
    }

    /// The alias bindings, in this or any other interpreter, that target this
    /// interpreter.
    pub fn target_aliases(&self) -> Vec<Rc<WrappedCommand>> {
        self.inner
            .target_table
            .borrow()
            .values()
            .filter_map(|entry| entry.cmd.upgrade())
            .collect()
    }

    pub(crate) fn alias_entry(&self, name: &str) -> Option<Rc<InterpAliasCmd>> {
        self.inner.alias_table.borrow().get(name).cloned()
    }

    pub(crate) fn alias_entries(&self) -> Vec<Rc<InterpAliasCmd>> {
        self.inner.alias_table.borrow().values().cloned().collect()
    }

    pub(crate) fn alias_table_insert(&self, name: &str, alias: Rc<InterpAliasCmd>) {
        self.inner.alias_table.borrow_mut().insert(name.into(), alias);
    }

    /// Removes the named entry, provided it is still the given alias.
    pub(crate) fn alias_table_remove(&self, name: &str, alias: &InterpAliasCmd) {
        let mut table = self.inner.alias_table.borrow_mut();
        if table.get(name).map(|a| is_same(a, alias)).unwrap_or(false) {
            table.shift_remove(name);
        }
    }

    pub(crate) fn target_table_insert(&self, id: CmdId, entry: TargetEntry) {
        self.inner.target_table.borrow_mut().insert(id, entry);
    }

    pub(crate) fn target_table_remove(&self, id: CmdId) {
        self.inner.target_table.borrow_mut().shift_remove(&id);
    }

    //--------------------------------------------------------------------------------------------
    // Slave Interpreters

    /// Creates a slave interpreter with the standard commands, and its control command
    /// in this interpreter.  A safe interpreter only creates safe slaves.
    pub fn create_slave(&self, name: &str, safe: bool) -> Result<Interp, Exception> {
        if self.inner.slaves.borrow().contains_key(name) {
            return tcl_err!(
                "interpreter named \"{}\" already exists, cannot create",
                name
            );
        }

        let slave = Self::build(self.inner.class_loader.clone(), safe || self.is_safe());
        slave.install_standard_commands();
        *slave.inner.master.borrow_mut() = self.downgrade();
        *slave.inner.name_in_master.borrow_mut() = name.into();

        let control = CommandKind::Slave(Rc::new(InterpSlaveCmd::new(&slave)));
        let global = self.inner.global_ns.clone();
        let cmd = self.create_command_in(&global, name, control);
        *slave.inner.slave_cmd.borrow_mut() = Rc::downgrade(&cmd);

        self.inner
            .slaves
            .borrow_mut()
            .insert(name.into(), slave.clone());

        debug!(
            master = %self.path_name(),
            slave = name,
            safe = slave.is_safe(),
            "slave interpreter created"
        );
        Ok(slave)
    }

    /// Disposes of the slave interpreter with the given path.
    pub fn delete_slave(&self, path: &Value) -> Result<(), Exception> {
        let slave = slave::resolve_path(self, path)?;
        if slave.ptr_eq(self) {
            return tcl_err!("cannot delete the current interpreter");
        }
        slave.dispose();
        Ok(())
    }

    /// The named slave interpreter.
    pub fn slave(&self, name: &str) -> Option<Interp> {
        self.inner.slaves.borrow().get(name).cloned()
    }

    /// The names of the slave interpreters, in creation order.
    pub fn slave_names(&self) -> Vec<String> {
        self.inner.slaves.borrow().keys().cloned().collect()
    }

    /// The interpreter's master, if it is a slave.
    pub fn master(&self) -> Option<Interp> {
        self.inner.master.borrow().upgrade()
    }

    /// The interpreter's name in its master; empty if it has no master.
    pub fn name_in_master(&self) -> String {
        self.inner.name_in_master.borrow().clone()
    }

    /// The interpreter's control command in its master.
    pub fn slave_cmd(&self) -> Option<Rc<WrappedCommand>> {
        self.inner.slave_cmd.borrow().upgrade()
    }

    /// Whether this is a safe interpreter.
    pub fn is_safe(&self) -> bool {
        self.inner.safe
    }

    // The interpreter's path from the root of its hierarchy, for logging.
    fn path_name(&self) -> String {
        let mut names = Vec::new();
        let mut current = self.clone();
        while let Some(master) = current.master() {
            names.push(Value::from(current.name_in_master()));
            current = master;
        }
        names.reverse();
        format!("{{{}}}", list_to_string(&names))
    }

    //--------------------------------------------------------------------------------------------
    // Interpreter Configuration

    /// Gets the interpreter's recursion limit: how deep the stack of nested invocations
    /// may be.
    ///
    /// # Example
    /// ```
    /// # use rejacl::interp::Interp;
    /// let interp = Interp::new();
    /// assert_eq!(interp.recursion_limit(), 1000);
    /// ```
    pub fn recursion_limit(&self) -> usize {
        self.inner.recursion_limit.get()
    }

    /// Sets the interpreter's recursion limit.  The default is 1000.
    ///
    /// # Example
    /// ```
    /// # use rejacl::interp::Interp;
    /// let interp = Interp::new();
    /// interp.set_recursion_limit(100);
    /// assert_eq!(interp.recursion_limit(), 100);
    /// ```
    pub fn set_recursion_limit(&self, limit: usize) {
        self.inner.recursion_limit.set(limit);
    }

    /// The loader used to instantiate autoloaded commands.  Slaves share their master's
    /// loader.
    pub fn class_loader(&self) -> Rc<ClassLoader> {
        self.inner.class_loader.clone()
    }

    /// The notifier of the thread the interpreter lives on.
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    //--------------------------------------------------------------------------------------------
    // After Callbacks

    pub(crate) fn after_next_id(&self) -> String {
        let id = self.inner.after_counter.get();
        self.inner.after_counter.set(id + 1);
        format!("after#{}", id)
    }

    pub(crate) fn after_insert(&self, id: &str, handler: Arc<IdleHandler>, script: Value) {
        self.inner
            .after
            .borrow_mut()
            .insert(id.into(), (handler, script));
    }

    pub(crate) fn after_script(&self, id: &str) -> Option<Value> {
        self.inner.after.borrow().get(id).map(|(_, script)| script.clone())
    }

    pub(crate) fn after_remove(&self, id: &str) -> Option<Arc<IdleHandler>> {
        self.inner
            .after
            .borrow_mut()
            .shift_remove(id)
            .map(|(handler, _)| handler)
    }

    /// The pending `after` callbacks: their IDs and scripts.
    pub(crate) fn after_entries(&self) -> Vec<(String, Value)> {
        self.inner
            .after
            .borrow()
            .iter()
            .map(|(id, (_, script))| (id.clone(), script.clone()))
            .collect()
    }

    //--------------------------------------------------------------------------------------------
    // Disposal

    /// Whether the interpreter has been disposed of.
    pub fn is_deleted(&self) -> bool {
        self.inner.deleted.get()
    }

    /// Whether the interpreter has been disposed of while a call was running in it, and
    /// will be torn down when the call returns.
    pub fn is_dispose_pending(&self) -> bool {
        self.inner.dispose_pending.get()
    }

    /// Disposes of the interpreter: unlinks it from its master, disposes of its slaves,
    /// deletes the aliases that target it, cancels its `after` callbacks, and deletes all
    /// of its commands.  Disposing twice does nothing.
    ///
    /// If an alias call or a slave `eval` is running in the interpreter, only the unlinking
    /// happens now; the rest is done when the last such call returns.
    pub fn dispose(&self) {
        if self.inner.deleted.get() || self.inner.dispose_pending.get() {
            return;
        }

        if self.inner.preserved.get() > 0 {
            debug!(interp = %self.path_name(), "interpreter in use; disposal deferred");
            self.inner.dispose_pending.set(true);
            self.unlink_from_master();
            return;
        }

        self.teardown();
    }

    fn unlink_from_master(&self) {
        if let Some(master) = self.master() {
            let name = self.name_in_master();
            let removed = master.inner.slaves.borrow_mut().shift_remove(&name);
            drop(removed);
        }
        let control = self.slave_cmd();
        if let Some(control) = control {
            control.delete();
        }
    }

    fn teardown(&self) {
        if self.inner.deleted.replace(true) {
            return;
        }

        debug!(interp = %self.path_name(), "disposing interpreter");

        // FIRST, unlink from the master and delete the control command.
        self.unlink_from_master();

        // NEXT, dispose of the slaves.
        let slaves: Vec<Interp> = self
            .inner
            .slaves
            .borrow_mut()
            .drain(..)
            .map(|(_, slave)| slave)
            .collect();
        for slave in slaves {
            slave.dispose();
        }

        // NEXT, delete the aliases that target this interpreter.
        let targets: Vec<TargetEntry> = self
            .inner
            .target_table
            .borrow_mut()
            .drain(..)
            .map(|(_, entry)| entry)
            .collect();
        for entry in targets {
            if let Some(cmd) = entry.cmd.upgrade() {
                match entry.slave.upgrade() {
                    Some(slave) => slave.delete_command_from_token(&cmd),
                    None => cmd.delete(),
                }
            }
        }

        // NEXT, cancel pending callbacks.
        let handlers: Vec<Arc<IdleHandler>> = self
            .inner
            .after
            .borrow_mut()
            .drain(..)
            .map(|(_, (handler, _))| handler)
            .collect();
        for handler in handlers {
            handler.cancel();
        }

        // NEXT, delete the commands.
        *self.inner.current_ns.borrow_mut() = self.inner.global_ns.clone();
        self.inner.global_ns.teardown();
        self.inner.alias_table.borrow_mut().clear();
        self.inner.var_watches.borrow_mut().clear();
        self.inner.vars.borrow_mut().clear();
    }
}

impl Default for Interp {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Interp {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Interp")
            .field("path", &self.path_name())
            .field("safe", &self.inner.safe)
            .field("deleted", &self.inner.deleted.get())
            .finish()
    }
}

// Adds the invoked command to the stack trace of an error.
#[cfg(feature = "error-stack-trace")]
fn add_traceback(result: &mut TclResult, argv: &[Value]) {
    if let Err(exception) = result {
        if exception.is_error() {
            if exception.is_new_error() {
                exception.add_error_info("    while executing");
            } else {
                exception.add_error_info("    invoked from within");
            }
            exception.add_error_info(&format!("\"{}\"", list_to_string(argv)));
        }
    }
}

#[cfg(not(feature = "error-stack-trace"))]
fn add_traceback(_result: &mut TclResult, _argv: &[Value]) {}
