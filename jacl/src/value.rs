//! The Value Type
//!
//! A [`Value`] is the type of every Jacl datum: command arguments, command results,
//! variable values.  Every value is a string; a value can be viewed as an integer, a
//! boolean, or a list on demand.  The string is immutable and shared, so cloning a `Value`
//! is cheap.
//!
//! The richer dual string/internal representation of full TCL values belongs to the
//! value subsystem proper; the runtime core only needs cheap sharing and a few
//! conversions.
//!
//! ```
//! use rejacl::Value;
//!
//! let val = Value::from(42);
//! assert_eq!(val.as_str(), "42");
//! assert_eq!(val.as_int(), Ok(42));
//!
//! let list = Value::from(vec![Value::from("a b"), Value::from("c")]);
//! assert_eq!(list.as_str(), "{a b} c");
//! ```
//!
//! [`Value`]: struct.Value.html

use crate::list;
use crate::tcl_err;
use crate::types::*;
use alloc::rc::Rc;
use alloc::string::String;
use core::fmt;

/// The Jacl value type.  See the [module level documentation](index.html).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Value(Rc<str>);

impl Value {
    /// Returns the empty value.
    pub fn empty() -> Self {
        Value(Rc::from(""))
    }

    /// Returns the value's string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the value is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Interprets the value as an integer.
    pub fn as_int(&self) -> Result<TclInt, Exception> {
        let text = self.0.trim();

        let parsed = if let Some(hex) = text.strip_prefix("0x") {
            TclInt::from_str_radix(hex, 16).ok()
        } else if let Some(hex) = text.strip_prefix("-0x") {
            TclInt::from_str_radix(hex, 16).ok().map(|n| -n)
        } else {
            text.parse::<TclInt>().ok()
        };

        match parsed {
            Some(num) => Ok(num),
            None => tcl_err!("expected integer but got \"{}\"", self.0),
        }
    }

    /// Interprets the value as a boolean.
    pub fn as_bool(&self) -> Result<bool, Exception> {
        match self.0.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => match self.as_int() {
                Ok(num) => Ok(num != 0),
                Err(_) => tcl_err!("expected boolean value but got \"{}\"", self.0),
            },
        }
    }

    /// Interprets the value as a list.
    pub fn as_list(&self) -> Result<TclList, Exception> {
        list::get_list(&self.0)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::empty()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Value({:?})", &*self.0)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value(Rc::from(s))
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value(Rc::from(s.as_str()))
    }
}

impl From<TclInt> for Value {
    fn from(num: TclInt) -> Self {
        Value::from(num.to_string())
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::from(if flag { "1" } else { "0" })
    }
}

impl From<TclList> for Value {
    fn from(list: TclList) -> Self {
        Value::from(list::list_to_string(&list))
    }
}

impl From<&[Value]> for Value {
    fn from(list: &[Value]) -> Self {
        Value::from(list::list_to_string(list))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_as_int() {
        assert_eq!(Value::from("12").as_int(), Ok(12));
        assert_eq!(Value::from(" -7 ").as_int(), Ok(-7));
        assert_eq!(Value::from("0x10").as_int(), Ok(16));
        assert_eq!(
            Value::from("abc").as_int(),
            tcl_err!("expected integer but got \"abc\"")
        );
    }

    #[test]
    fn test_as_bool() {
        assert_eq!(Value::from("yes").as_bool(), Ok(true));
        assert_eq!(Value::from("off").as_bool(), Ok(false));
        assert_eq!(Value::from("5").as_bool(), Ok(true));
        assert!(Value::from("maybe").as_bool().is_err());
    }

    #[test]
    fn test_from_list() {
        let list = vec![Value::from("a"), Value::empty(), Value::from("b c")];
        assert_eq!(Value::from(list).as_str(), "a {} {b c}");
    }

    #[test]
    fn test_default_is_empty() {
        assert!(Value::default().is_empty());
    }
}
