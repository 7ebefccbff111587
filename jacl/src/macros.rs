//! Convenience macros for returning command results.

/// Returns an `Ok` [`TclResult`](types/type.TclResult.html).
///
/// With no arguments, the result is the empty value; with one argument, the argument is
/// converted to a `Value`; with more, they are formatted as by `format!`.
///
/// ```
/// use rejacl::tcl_ok;
/// use rejacl::types::*;
///
/// fn answer() -> TclResult {
///     tcl_ok!("{} + {} = {}", 2, 2, 4)
/// }
/// assert_eq!(answer().unwrap().as_str(), "2 + 2 = 4");
/// ```
#[macro_export]
macro_rules! tcl_ok {
    () => (
        Ok($crate::Value::empty())
    );
    ($arg:expr) => (
        Ok($crate::Value::from($arg))
    );
    ($($arg:tt)*) => (
        Ok($crate::Value::from(format!($($arg)*)))
    )
}

/// Returns an `Ok(Some(...))` [`TclOptResult`](types/type.TclOptResult.html), for use in
/// Rust command functions.
#[macro_export]
macro_rules! tcl_opt_ok {
    () => (
        Ok(None)
    );
    ($arg:expr) => (
        Ok(Some($crate::Value::from($arg)))
    );
    ($($arg:tt)*) => (
        Ok(Some($crate::Value::from(format!($($arg)*))))
    )
}

/// Returns an `Err` result containing an `Error` exception with the given message.
///
/// ```
/// use rejacl::tcl_err;
/// use rejacl::types::*;
///
/// fn oops(name: &str) -> TclResult {
///     tcl_err!("invalid command name \"{}\"", name)
/// }
/// assert_eq!(oops("x").unwrap_err().value().as_str(), "invalid command name \"x\"");
/// ```
#[macro_export]
macro_rules! tcl_err {
    ($arg:expr) => (
        Err($crate::Exception::tcl_err($crate::Value::from($arg)))
    );
    ($($arg:tt)*) => (
        Err($crate::Exception::tcl_err($crate::Value::from(format!($($arg)*))))
    )
}

/// Returns an `Err` result containing an `Error` exception with an explicit error code.
#[macro_export]
macro_rules! tcl_throw {
    ($code:expr, $msg:expr) => (
        Err($crate::Exception::tcl_err2($crate::Value::from($code), $crate::Value::from($msg)))
    );
    ($code:expr, $($arg:tt)*) => (
        Err($crate::Exception::tcl_err2($crate::Value::from($code), $crate::Value::from(format!($($arg)*))))
    )
}
