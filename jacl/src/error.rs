//! Typed errors raised below the script level.
//!
//! Script-visible failures travel as [`Exception`](../types/struct.Exception.html)
//! values.  The errors here come from the runtime's own machinery (class loading and
//! the notifier) and are converted to exceptions wherever they surface in a script.

use crate::types::Exception;
use crate::value::Value;
use thiserror::Error;

/// A failure to load the implementation of an autoloaded command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// No implementation is registered under the class name.
    #[error("class \"{0}\" not found")]
    NotFound(String),

    /// The class lives in a package the interpreter may not load from.
    #[error("can't load class \"{0}\": package name not permitted")]
    PackageName(String),

    /// The implementation's factory failed.
    #[error("can't instantiate class \"{class}\": {reason}")]
    Instantiation { class: String, reason: String },

    /// The factory produced something other than a command.
    #[error("class \"{0}\" does not implement a command")]
    NotACommand(String),
}

impl LoadError {
    /// The class name the error is about.
    pub fn class_name(&self) -> &str {
        match self {
            LoadError::NotFound(class)
            | LoadError::PackageName(class)
            | LoadError::NotACommand(class) => class,
            LoadError::Instantiation { class, .. } => class,
        }
    }
}

impl From<LoadError> for Exception {
    fn from(err: LoadError) -> Self {
        Exception::tcl_err2(
            Value::from(format!("TCL LOOKUP CLASS {}", err.class_name())),
            Value::from(err.to_string()),
        )
    }
}

/// A failure reported by the event notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NotifierError {
    /// The notifier has been torn down; queued work was discarded.
    #[error("notifier has been disposed")]
    Disposed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResultCode;

    #[test]
    fn test_load_error_to_exception() {
        let ex: Exception = LoadError::NotFound("demo.Missing".into()).into();
        assert_eq!(ex.code(), ResultCode::Error);
        assert_eq!(ex.value().as_str(), "class \"demo.Missing\" not found");
        assert_eq!(
            ex.error_data().map(|d| d.error_code()),
            Some(Value::from("TCL LOOKUP CLASS demo.Missing"))
        );
    }

    #[test]
    fn test_instantiation_message() {
        let err = LoadError::Instantiation {
            class: "demo.Cmd".into(),
            reason: "no database".into(),
        };
        assert_eq!(
            err.to_string(),
            "can't instantiate class \"demo.Cmd\": no database"
        );
    }
}
