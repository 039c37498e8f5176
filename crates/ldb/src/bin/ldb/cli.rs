//! CLI definitions for ldb.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use ldb::{DebuggerKind, HostError, LdbConfig, Script};
use smol_str::SmolStr;

#[derive(Debug, Parser)]
#[command(
    name = "ldb",
    version,
    about = "Source-level debugger for Lua scripts",
    after_help = "Examples:\n  ldb -n script.lua                         # console debugger\n  ldb -n script.lua -b false                # run from the file\n  ldb -n script.lua -t ide -c 3000 -e 3001  # wait for an IDE"
)]
pub struct Cli {
    /// Script to debug.
    #[arg(short = 'n', long = "name")]
    pub script: Option<PathBuf>,
    /// Load the script into a buffer (true) or run it from its file (false).
    #[arg(short = 'b', long = "buffer", action = ArgAction::Set)]
    pub buffer: Option<bool>,
    /// Debugger front end: ldb (console) or ide.
    #[arg(short = 't', long = "type")]
    pub mode: Option<String>,
    /// Port for IDE commands and replies.
    #[arg(short = 'c', long = "command-port")]
    pub command_port: Option<u16>,
    /// Port for IDE events.
    #[arg(short = 'e', long = "event-port")]
    pub event_port: Option<u16>,
    /// Address the IDE ports bind to.
    #[arg(long)]
    pub bind: Option<String>,
    /// Configuration file (ldb.toml).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// File values first, then command-line overrides.
    pub fn resolve(&self) -> Result<(LdbConfig, Script), HostError> {
        let mut config = match &self.config {
            Some(path) => LdbConfig::load(path)?,
            None => LdbConfig::default(),
        };
        if let Some(mode) = &self.mode {
            config.mode = DebuggerKind::parse(mode)?;
        }
        if let Some(buffer) = self.buffer {
            config.buffer = buffer;
        }
        if let Some(bind) = &self.bind {
            config.bind = SmolStr::new(bind);
        }
        if self.command_port.is_some() {
            config.command_port = self.command_port;
        }
        if self.event_port.is_some() {
            config.event_port = self.event_port;
        }
        config.validate()?;
        let path = self
            .script
            .clone()
            .ok_or_else(|| HostError::InvalidConfig("missing script name (-n)".into()))?;
        let script = Script::from_path(path, config.buffer);
        Ok((config, script))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ldb").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn original_flag_set_parses() {
        let cli = parse(&[
            "-n", "t.lua", "-b", "false", "-t", "ide", "-c", "3000", "-e", "3001",
        ]);
        let (config, script) = cli.resolve().unwrap();
        assert_eq!(config.mode, DebuggerKind::Ide);
        assert_eq!(config.remote_ports().unwrap(), (3000, 3001));
        assert!(!script.buffer);
        assert_eq!(script.id.as_str(), "t.lua");
    }

    #[test]
    fn missing_script_is_a_parameter_error() {
        let err = parse(&["-t", "ldb"]).resolve().unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn ide_without_ports_is_rejected() {
        let err = parse(&["-n", "t.lua", "-t", "ide", "-c", "3000"])
            .resolve()
            .unwrap_err();
        assert!(matches!(err, HostError::InvalidConfig(_)));
    }

    #[test]
    fn defaults_to_buffered_console() {
        let (config, script) = parse(&["-n", "t.lua"]).resolve().unwrap();
        assert_eq!(config.mode, DebuggerKind::Console);
        assert!(script.buffer);
    }
}
