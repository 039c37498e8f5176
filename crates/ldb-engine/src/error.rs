//! Engine errors.

use smol_str::SmolStr;
use thiserror::Error;

/// Errors that end a command loop.
///
/// None of these are fatal to the host: the debugger detaches and the
/// debuggee keeps running.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Underlying stream failure.
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    /// A remote command never delivered its terminating newline.
    #[error("could not get full command string after {attempts} reads")]
    UnterminatedCommand {
        /// Reads performed before giving up.
        attempts: usize,
    },

    /// The peer (or stdin) closed the stream.
    #[error("session channel closed")]
    ChannelClosed,
}

/// Syntax errors in operator input.
///
/// The `Display` text is sent back to the operator verbatim; the command loop
/// keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// `list` bounds that are zero, not numeric or out of order.
    #[error("invalid command")]
    InvalidRange,

    /// `break`/`clear` without a usable line number.
    #[error("Syntax error, invalid or no line number")]
    InvalidLine,

    /// `print` with an unknown or missing target.
    #[error("Syntax error for print command. Don't know how to print {0}")]
    UnknownPrintTarget(SmolStr),

    /// `var` without a variable name.
    #[error("Syntax error, usage: var frame name")]
    MissingVariable,
}
