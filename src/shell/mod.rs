//! Shell - Command interpreter
//!
//! A small interpreter for browsing a content site:
//! - Command parsing with quotes and numeric fallbacks
//! - A static command table with typed handlers
//! - A session loop that echoes, dispatches and re-arms the prompt
//!
//! Not a full shell: no pipes, variables, history recall or jobs.

pub mod commands;
pub mod parser;
pub mod registry;
pub mod session;

pub use commands::{CommandError, CommandResult, Context, dispatch};
pub use parser::{Command, parse};
pub use registry::{COMMANDS, CommandKind, CommandSpec};
pub use session::{Session, SessionError, SessionState};
