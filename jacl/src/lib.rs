//! # Rejacl: The Command and Event Core of an Embeddable TCL Interpreter
//!
//! Rejacl is the runtime core of a TCL-compatible interpreter: the parts that must get
//! identity, lifecycle, and concurrency exactly right.
//!
//! * **Command dispatch** ([`command`]): every command name in a namespace is bound to a
//!   [`WrappedCommand`], whose identity survives `rename` and which knows who imports
//!   it.  The command behind a binding may be a plain Rust function, an imported
//!   command ([`import`]), a cross-interpreter alias ([`alias`]), a lazily-loaded stub
//!   ([`autoload`]), or a slave interpreter's control command ([`slave`]).
//! * **The notifier** ([`notifier`]): a per-thread event queue and idle-callback list.
//!   Any thread may queue events or register idle handlers; only the notifier's primary
//!   thread runs them.
//!
//! The script parser, the full value representation, and the built-in command library
//! are collaborators of this core; it needs only a way to invoke commands given an
//! argument vector, and so the [`Interp`] here invokes commands directly.  See the
//! [`interp`] module for an overview.
//!
//! ```
//! use rejacl::Interp;
//! use rejacl::Value;
//!
//! let interp = Interp::new();
//! let child = interp.create_slave("child", false).unwrap();
//!
//! // An alias in the child that forwards to "list" in the parent, with a bound argument.
//! child
//!     .create_alias(&interp, &Value::from("greet"), &Value::from("list"), &[Value::from("hello")])
//!     .unwrap();
//!
//! let result = child.eval_command("greet world").unwrap();
//! assert_eq!(result.as_str(), "hello world");
//! # interp.dispose();
//! ```
//!
//! [`command`]: command/index.html
//! [`import`]: import/index.html
//! [`alias`]: alias/index.html
//! [`autoload`]: autoload/index.html
//! [`slave`]: slave/index.html
//! [`notifier`]: notifier/index.html
//! [`interp`]: interp/index.html
//! [`Interp`]: interp/struct.Interp.html
//! [`WrappedCommand`]: command/struct.WrappedCommand.html

#![doc(html_root_url = "https://docs.rs/rejacl/0.1.0")]

extern crate alloc;

pub use crate::command::Command;
pub use crate::command::WrappedCommand;
pub use crate::error::LoadError;
pub use crate::error::NotifierError;
pub use crate::interp::Interp;
pub use crate::notifier::EventFlags;
pub use crate::notifier::IdleHandler;
pub use crate::notifier::Notifier;
pub use crate::notifier::NotifierHandle;
pub use crate::notifier::QueuePosition;
pub use crate::notifier::TclEvent;
pub use crate::types::*;
pub use crate::util::check_args;
pub use crate::value::Value;

mod macros;

pub mod alias;
pub mod autoload;
pub mod command;
pub mod commands;
pub mod error;
pub mod import;
pub mod interp;
pub mod list;
pub mod namespace;
pub mod notifier;
pub mod slave;
pub mod types;
pub mod util;
pub mod value;
