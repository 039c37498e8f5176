//! Debug a script from start to finish.

#![allow(missing_docs)]

use std::path::PathBuf;
use std::sync::Arc;

use ldb_engine::{Debugger, ScriptId};
use parking_lot::Mutex;

use crate::error::HostError;
use crate::lua::LuaHost;

/// The script under debug.
#[derive(Debug, Clone)]
pub struct Script {
    /// Name the debugger and runtime report it under.
    pub id: ScriptId,
    pub path: PathBuf,
    /// Load into a buffer first (`true`) or run it as a file chunk.
    pub buffer: bool,
}

impl Script {
    /// A script named by its path, as given on the command line.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>, buffer: bool) -> Self {
        let path = path.into();
        Self {
            id: ScriptId::new(path.to_string_lossy().as_ref()),
            path,
            buffer,
        }
    }

    /// Chunk name handed to the runtime. File chunks carry the `@` marker.
    fn chunk_name(&self) -> String {
        if self.buffer {
            self.id.to_string()
        } else {
            format!("@{}", self.id)
        }
    }
}

/// Cache the script's lines and run it under `debugger`.
///
/// A script that fails to compile or run is reported on the debugger's event
/// stream before the error is returned.
pub fn run_script(debugger: &Arc<Mutex<Debugger>>, script: &Script) -> Result<(), HostError> {
    let code = std::fs::read_to_string(&script.path).map_err(|source| HostError::ReadScript {
        path: script.path.clone(),
        source,
    })?;
    {
        let mut debugger = debugger.lock();
        let sources = debugger.sources_mut();
        let lines = if script.buffer {
            sources.load_from_buffer(&script.id, &code)
        } else {
            sources
                .load_from_file(&script.id, &script.path)
                .map_err(|source| HostError::ReadScript {
                    path: script.path.clone(),
                    source,
                })?
        };
        tracing::info!(script = %script.id, lines, buffer = script.buffer, "running script");
    }

    let host = LuaHost::new()?;
    host.attach(Arc::clone(debugger));
    let result = host.run(&script.chunk_name(), &code);
    host.lua().remove_hook();

    if let Err(err) = &result {
        if err.is_script_failure() {
            let message = match err {
                HostError::Runtime { message, .. } => message.clone(),
                other => other.to_string(),
            };
            debugger.lock().report_load_error(&script.id, &message);
        }
    }
    result
}
