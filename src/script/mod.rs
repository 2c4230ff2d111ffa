//! A small interpreter for the JavaScript subset used in lesson snippets.
//!
//! Every lesson language is lowered to this subset by the runner and then
//! executed here. The interpreter has no access to the host: no filesystem,
//! no network, no timers. Runs are bounded by [`Limits`] so that a looping
//! snippet ends in an error instead of hanging the caller.

mod ast;
mod builtins;
mod capture;
mod environment;
mod error;
mod interpreter;
mod lexer;
mod parser;
mod value;

pub use capture::OutputAccumulator;
pub use error::{ErrorKind, ScriptError};
pub use interpreter::{execute, Limits, MAX_CALL_DEPTH};
pub use value::Value;
