//! Public Type Declarations
//!
//! This module defines a number of types used throughout the Jacl runtime core: the
//! result types returned by commands, the [`Exception`] struct that carries every kind
//! of exceptional return, and the function types used to define commands in Rust.
//!
//! # Result Codes
//!
//! Every command completes with a [`ResultCode`].  A normal return is `Ok(value)`; every
//! other code travels in the `Err` side of a [`TclResult`] as an [`Exception`]:
//!
//! * `Error` -- a script error, recoverable by the caller.
//! * `Return` -- the `return` command; carries a `-level` and the code to adopt when the
//!   level reaches zero.
//! * `Break`, `Continue` -- loop control.
//! * `Other(n)` -- any application-defined code.
//!
//! [`Exception`]: struct.Exception.html
//! [`ResultCode`]: enum.ResultCode.html
//! [`TclResult`]: type.TclResult.html

use crate::interp::Interp;
use crate::tcl_err;
use crate::value::Value;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

cfg_if::cfg_if! {
    if #[cfg(feature = "fnv-hash")] {
        /// The hasher used by every name table in the runtime.
        pub type TclHasher = fnv::FnvBuildHasher;
    } else {
        /// The hasher used by every name table in the runtime.
        pub type TclHasher = std::collections::hash_map::RandomState;
    }
}

/// The standard integer type for Jacl code.
pub type TclInt = i64;

/// A list of Jacl values.
pub type TclList = Vec<Value>;

/// The standard result type for Jacl commands and evaluation methods.
pub type TclResult = Result<Value, Exception>;

/// The result type for Rust command functions, which frequently have nothing to return.
/// `Ok(None)` is converted to the empty value.
pub type TclOptResult = Result<Option<Value>, Exception>;

/// A function used to implement a binary Jacl command.
///
/// The command is passed the interpreter and the complete argument vector, including the
/// command's name in `argv[0]`.
pub type CommandFunc = fn(&Interp, &[Value]) -> TclOptResult;

/// A closure used to implement a binary Jacl command.
#[cfg(feature = "closure-commands")]
pub type CommandClosure = Rc<dyn Fn(&Interp, &[Value]) -> TclOptResult>;

/// The completion code of a Jacl command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Okay,
    Error,
    Return,
    Break,
    Continue,
    Other(TclInt),
}

impl ResultCode {
    /// Parses a result code given by name or by number, as the `return -code` option
    /// accepts it.
    pub fn from_value(value: &Value) -> Result<Self, Exception> {
        match value.as_str() {
            "ok" => Ok(ResultCode::Okay),
            "error" => Ok(ResultCode::Error),
            "return" => Ok(ResultCode::Return),
            "break" => Ok(ResultCode::Break),
            "continue" => Ok(ResultCode::Continue),
            _ => match value.as_int() {
                Ok(num) => Ok(ResultCode::from_int(num)),
                Err(_) => tcl_err!(
                    "bad completion code \"{}\": must be ok, error, return, break, continue, or an integer",
                    value
                ),
            },
        }
    }

    /// Converts a numeric completion code to a `ResultCode`.
    pub fn from_int(num: TclInt) -> Self {
        match num {
            0 => ResultCode::Okay,
            1 => ResultCode::Error,
            2 => ResultCode::Return,
            3 => ResultCode::Break,
            4 => ResultCode::Continue,
            n => ResultCode::Other(n),
        }
    }

    /// Returns the numeric completion code.
    pub fn as_int(&self) -> TclInt {
        match self {
            ResultCode::Okay => 0,
            ResultCode::Error => 1,
            ResultCode::Return => 2,
            ResultCode::Break => 3,
            ResultCode::Continue => 4,
            ResultCode::Other(n) => *n,
        }
    }
}

/// Error data attached to an `Error` exception: the `errorCode` value and the
/// accumulated `errorInfo` stack trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorData {
    error_code: Value,
    error_info: String,
    is_new: bool,
}

impl ErrorData {
    /// Creates error data for a brand-new error.
    pub fn new(error_code: Value, error_info: &str) -> Self {
        Self {
            error_code,
            error_info: error_info.into(),
            is_new: true,
        }
    }

    /// Creates error data for an error being rethrown from elsewhere; its stack trace
    /// is complete as far as it goes.
    pub fn rethrow(error_code: Value, error_info: &str) -> Self {
        Self {
            error_code,
            error_info: error_info.into(),
            is_new: false,
        }
    }

    /// The `errorCode` value.
    pub fn error_code(&self) -> Value {
        self.error_code.clone()
    }

    /// The accumulated `errorInfo` stack trace.
    pub fn error_info(&self) -> Value {
        Value::from(self.error_info.as_str())
    }

    /// Whether nothing has been added to the stack trace yet.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub(crate) fn add_info(&mut self, info: &str) {
        self.error_info.push('\n');
        self.error_info.push_str(info);
        self.is_new = false;
    }
}

/// An exceptional return from a Jacl command: an error, a `return`, a `break`, a
/// `continue`, or an application-defined code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exception {
    code: ResultCode,
    value: Value,
    level: usize,
    next_code: ResultCode,
    error_data: Option<ErrorData>,
}

impl Exception {
    /// Creates an `Error` exception with the given message and an `errorCode` of `NONE`.
    pub fn tcl_err(msg: Value) -> Self {
        let data = ErrorData::new(Value::from("NONE"), msg.as_str());

        Self {
            code: ResultCode::Error,
            value: msg,
            level: 0,
            next_code: ResultCode::Error,
            error_data: Some(data),
        }
    }

    /// Creates an `Error` exception with an explicit `errorCode`.
    pub fn tcl_err2(error_code: Value, msg: Value) -> Self {
        let data = ErrorData::new(error_code, msg.as_str());

        Self {
            code: ResultCode::Error,
            value: msg,
            level: 0,
            next_code: ResultCode::Error,
            error_data: Some(data),
        }
    }

    /// Creates an `Error` exception that continues an existing stack trace, as the
    /// `error` command does when given an `info` argument.
    pub fn tcl_rethrow(msg: Value, error_code: Value, error_info: &str) -> Self {
        Self {
            code: ResultCode::Error,
            value: msg,
            level: 0,
            next_code: ResultCode::Error,
            error_data: Some(ErrorData::rethrow(error_code, error_info)),
        }
    }

    /// Creates a plain `return` of the given value.
    pub fn tcl_return(value: Value) -> Self {
        Self {
            code: ResultCode::Return,
            value,
            level: 1,
            next_code: ResultCode::Okay,
            error_data: None,
        }
    }

    /// Creates a `return` with explicit `-level` and `-code` options.  A level of zero
    /// produces the next code directly.
    pub fn tcl_return_ext(value: Value, level: usize, next_code: ResultCode) -> Self {
        let error_data = if next_code == ResultCode::Error {
            Some(ErrorData::new(Value::from("NONE"), value.as_str()))
        } else {
            None
        };

        let code = if level == 0 {
            next_code
        } else {
            ResultCode::Return
        };

        Self {
            code,
            value,
            level,
            next_code,
            error_data,
        }
    }

    /// Creates a `break` exception.
    pub fn tcl_break() -> Self {
        Self {
            code: ResultCode::Break,
            value: Value::empty(),
            level: 0,
            next_code: ResultCode::Break,
            error_data: None,
        }
    }

    /// Creates a `continue` exception.
    pub fn tcl_continue() -> Self {
        Self {
            code: ResultCode::Continue,
            value: Value::empty(),
            level: 0,
            next_code: ResultCode::Continue,
            error_data: None,
        }
    }

    /// Creates an exception with an arbitrary completion code.
    ///
    /// # Panics
    ///
    /// `ResultCode::Okay` is reserved for normal completion and can never be used as
    /// the code of an exception.
    pub fn with_code(value: Value, code: ResultCode) -> Self {
        assert!(
            code != ResultCode::Okay,
            "the reserved completion code Okay cannot be used in an exception"
        );

        match code {
            ResultCode::Error => Self::tcl_err(value),
            ResultCode::Return => Self::tcl_return(value),
            _ => Self {
                code,
                value,
                level: 0,
                next_code: code,
                error_data: None,
            },
        }
    }

    /// The exception's completion code.
    pub fn code(&self) -> ResultCode {
        self.code
    }

    /// The exception's value: the error message, or the returned value.
    pub fn value(&self) -> Value {
        self.value.clone()
    }

    /// The `-level` of a `return` exception.
    pub fn level(&self) -> usize {
        self.level
    }

    /// The code a `return` exception adopts when its level reaches zero.
    pub fn next_code(&self) -> ResultCode {
        self.next_code
    }

    /// The error data, if this is (or will become) an error.
    pub fn error_data(&self) -> Option<&ErrorData> {
        self.error_data.as_ref()
    }

    /// Whether this is an `Error` exception.
    pub fn is_error(&self) -> bool {
        self.code == ResultCode::Error
    }

    /// Whether this is an error with nothing yet added to its stack trace.
    pub fn is_new_error(&self) -> bool {
        self.error_data.as_ref().map(|d| d.is_new()).unwrap_or(false)
    }

    /// Appends a line to the `errorInfo` stack trace of an error.
    pub fn add_error_info(&mut self, info: &str) {
        if let Some(data) = &mut self.error_data {
            data.add_info(info);
        }
    }

    /// Decrements the `-level` of a `return`; when it reaches zero the exception takes on
    /// its next code.
    pub fn decrement_level(&mut self) {
        assert!(
            self.code == ResultCode::Return && self.level > 0,
            "decrement_level on a non-return exception"
        );

        self.level -= 1;

        if self.level == 0 {
            self.code = self.next_code;
        }
    }
}

/// A subcommand of an ensemble command: its name and its implementation.
///
/// See [`Interp::call_subcommand`](../interp/struct.Interp.html#method.call_subcommand).
pub struct Subcommand(pub &'static str, pub CommandFunc);

impl Subcommand {
    /// Looks up a subcommand by name, producing the standard error if it isn't found.
    pub fn find<'a>(ensemble: &'a [Subcommand], sub_name: &str) -> Result<&'a Subcommand, Exception> {
        for subcmd in ensemble {
            if subcmd.0 == sub_name {
                return Ok(subcmd);
            }
        }

        let names: Vec<&str> = ensemble.iter().map(|sub| sub.0).collect();

        tcl_err!(
            "unknown or ambiguous subcommand \"{}\": must be {}",
            sub_name,
            one_of(&names)
        )
    }
}

/// Formats a list of names as "a, b, or c".
pub(crate) fn one_of(names: &[&str]) -> String {
    match names.len() {
        0 => String::new(),
        1 => names[0].into(),
        2 => format!("{} or {}", names[0], names[1]),
        n => format!("{}, or {}", names[..n - 1].join(", "), names[n - 1]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_code_from_value() {
        assert_eq!(
            ResultCode::from_value(&Value::from("break")),
            Ok(ResultCode::Break)
        );
        assert_eq!(
            ResultCode::from_value(&Value::from("1")),
            Ok(ResultCode::Error)
        );
        assert_eq!(
            ResultCode::from_value(&Value::from("7")),
            Ok(ResultCode::Other(7))
        );
        assert!(ResultCode::from_value(&Value::from("nonesuch")).is_err());
    }

    #[test]
    fn test_decrement_level() {
        let mut ex = Exception::tcl_return_ext(Value::from("x"), 2, ResultCode::Break);
        assert_eq!(ex.code(), ResultCode::Return);

        ex.decrement_level();
        assert_eq!(ex.code(), ResultCode::Return);
        ex.decrement_level();
        assert_eq!(ex.code(), ResultCode::Break);
        assert_eq!(ex.value().as_str(), "x");
    }

    #[test]
    fn test_error_info() {
        let mut ex = Exception::tcl_err(Value::from("oops"));
        assert!(ex.is_new_error());

        ex.add_error_info("    while executing");
        assert!(!ex.is_new_error());
        assert_eq!(
            ex.error_data().map(|d| d.error_info()),
            Some(Value::from("oops\n    while executing"))
        );
    }

    #[test]
    #[should_panic(expected = "reserved completion code")]
    fn test_with_code_okay_panics() {
        let _ = Exception::with_code(Value::from("x"), ResultCode::Okay);
    }

    #[test]
    fn test_one_of() {
        assert_eq!(one_of(&["a"]), "a");
        assert_eq!(one_of(&["a", "b"]), "a or b");
        assert_eq!(one_of(&["a", "b", "c"]), "a, b, or c");
    }
}
