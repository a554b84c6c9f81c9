//! Argv tokenizing and parsing.
//!
//! Raw arguments go through two stages:
//! - [`Tokenizer`] turns argv into typed [`Token`]s (options, values, the `--`
//!   escape, and `[ ... ]` variadic groups)
//! - [`Parser`] matches tokens against declared arguments and options, coerces
//!   them into [`Value`]s and validates required parameters
//!
//! Built-in `-h|--help`, `-V|--version` and `-v|--verbosity` options are
//! registered on every [`Parser`].

pub mod case;
pub mod error;
pub mod help;
pub mod io;
pub mod messages;
pub mod normalize;
pub mod parameter;
pub mod parser;
pub mod token;
pub mod tokenizer;
pub mod value;

pub use error::{ParseError, RegistrationError};
pub use help::{DefaultHelp, HelpContext, HelpRenderer};
pub use io::{BufferWriter, ExitHook, ProcessExit, RecordingExit, StdoutWriter, Writer};
pub use messages::{DefaultMessages, Messages};
pub use parameter::{ArgumentDef, Filter, OptionDef, Parameter};
pub use parser::{Emit, OptionHandle, Outcome, Parser};
pub use token::{Side, Token, TokenKind, TokenValue};
pub use tokenizer::{TokenizeError, Tokenizer};
pub use value::{Key, Value, Values};
