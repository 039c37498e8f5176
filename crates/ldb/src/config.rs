//! `ldb.toml` loading.

#![allow(missing_docs)]

use std::path::Path;

use serde::Deserialize;
use smol_str::SmolStr;
use tracing::Level;

use crate::error::HostError;

pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Which front end drives the debugger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebuggerKind {
    /// Interactive console on stdin/stdout (`ldb`).
    #[default]
    Console,
    /// Remote IDE over a command and an event connection (`ide`).
    Ide,
}

impl DebuggerKind {
    pub fn parse(text: &str) -> Result<Self, HostError> {
        match text.trim().to_ascii_lowercase().as_str() {
            "ldb" | "console" => Ok(Self::Console),
            "ide" => Ok(Self::Ide),
            _ => Err(HostError::InvalidConfig(
                format!("invalid debugger.mode '{text}'").into(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdbConfig {
    pub mode: DebuggerKind,
    /// Load the script into a buffer first (`true`) or run it from its file.
    pub buffer: bool,
    pub bind: SmolStr,
    pub command_port: Option<u16>,
    pub event_port: Option<u16>,
    pub log_level: Level,
}

impl Default for LdbConfig {
    fn default() -> Self {
        Self {
            mode: DebuggerKind::Console,
            buffer: true,
            bind: SmolStr::new_inline(DEFAULT_BIND),
            command_port: None,
            event_port: None,
            log_level: Level::INFO,
        }
    }
}

impl LdbConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|err| HostError::InvalidConfig(format!("ldb.toml: {err}").into()))?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, HostError> {
        let raw: LdbToml = toml::from_str(text)
            .map_err(|err| HostError::InvalidConfig(format!("ldb.toml: {err}").into()))?;
        raw.into_config()
    }

    /// Remote ports, required in IDE mode.
    pub fn remote_ports(&self) -> Result<(u16, u16), HostError> {
        match (self.command_port, self.event_port) {
            (Some(command), Some(event)) => Ok((command, event)),
            _ => Err(HostError::InvalidConfig(
                "ide mode requires both a command port (-c) and an event port (-e)".into(),
            )),
        }
    }

    pub fn validate(&self) -> Result<(), HostError> {
        if self.mode == DebuggerKind::Ide {
            let (command, event) = self.remote_ports()?;
            if command == event {
                return Err(HostError::InvalidConfig(
                    format!("command and event ports must differ (both {command})").into(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct LdbToml {
    debugger: Option<DebuggerSection>,
    log: Option<LogSection>,
}

#[derive(Debug, Deserialize)]
struct DebuggerSection {
    mode: Option<String>,
    buffer: Option<bool>,
    bind: Option<String>,
    command_port: Option<u16>,
    event_port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct LogSection {
    level: String,
}

impl LdbToml {
    fn into_config(self) -> Result<LdbConfig, HostError> {
        let mut config = LdbConfig::default();
        if let Some(debugger) = self.debugger {
            if let Some(mode) = debugger.mode {
                config.mode = DebuggerKind::parse(&mode)?;
            }
            if let Some(buffer) = debugger.buffer {
                config.buffer = buffer;
            }
            if let Some(bind) = debugger.bind {
                config.bind = SmolStr::new(bind);
            }
            config.command_port = debugger.command_port;
            config.event_port = debugger.event_port;
        }
        if let Some(log) = self.log {
            config.log_level = parse_level(&log.level)?;
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn parse_level(text: &str) -> Result<Level, HostError> {
    text.trim()
        .parse::<Level>()
        .map_err(|_| HostError::InvalidConfig(format!("invalid log.level '{text}'").into()))
}
