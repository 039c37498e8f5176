//! Host errors and process exit codes.

#![allow(missing_docs)]

use std::path::PathBuf;

use smol_str::SmolStr;
use thiserror::Error;

/// Errors that end an `ldb` process.
#[derive(Debug, Error)]
pub enum HostError {
    /// Missing or invalid parameters, from the command line or `ldb.toml`.
    #[error("invalid config: {0}")]
    InvalidConfig(SmolStr),

    /// Binding or accepting the remote connections failed.
    #[error("transport error: {0}")]
    Transport(SmolStr),

    /// The script file could not be read.
    #[error("cannot read script {path}: {source}")]
    ReadScript {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The script failed to compile.
    #[error("{0}")]
    Syntax(String),

    /// The script raised an error while running.
    #[error("{message}")]
    Runtime {
        message: String,
        traceback: String,
    },

    /// The runtime ran out of memory.
    #[error("{0}")]
    OutOfMemory(String),

    /// Runtime setup failure.
    #[error("lua error: {0}")]
    Lua(SmolStr),
}

impl From<mlua::Error> for HostError {
    fn from(err: mlua::Error) -> Self {
        Self::Lua(err.to_string().into())
    }
}

impl HostError {
    /// Process exit code: 1 for parameter and setup problems, otherwise the
    /// runtime's status code for the failure (2 run, 3 syntax, 4 memory).
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfig(_) | Self::Transport(_) | Self::ReadScript { .. } => 1,
            Self::Runtime { .. } | Self::Lua(_) => 2,
            Self::Syntax(_) => 3,
            Self::OutOfMemory(_) => 4,
        }
    }

    /// Whether the error came from loading or running the script itself.
    #[must_use]
    pub fn is_script_failure(&self) -> bool {
        matches!(
            self,
            Self::Syntax(_) | Self::Runtime { .. } | Self::OutOfMemory(_)
        )
    }
}
