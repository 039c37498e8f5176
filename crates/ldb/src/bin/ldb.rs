//! CLI entrypoint for ldb.

#[path = "ldb/cli.rs"]
mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use ldb::{run_script, DebuggerKind, HostError, LdbConfig, RemoteListeners, Script};
use ldb_engine::{Debugger, SessionChannel};
use parking_lot::Mutex;
use tracing::info;

use cli::Cli;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    };
    let (config, script) = match cli.resolve() {
        Ok(resolved) => resolved,
        Err(err) => {
            eprintln!("ldb error: {err}");
            std::process::exit(err.exit_code());
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&config, &script) {
        let code = err.downcast_ref::<HostError>().map_or(1, HostError::exit_code);
        match err.downcast_ref::<HostError>() {
            Some(HostError::Runtime { traceback, .. }) => eprintln!("{traceback}"),
            _ => eprintln!("ldb error: {err:#}"),
        }
        std::process::exit(code);
    }
}

fn run(config: &LdbConfig, script: &Script) -> anyhow::Result<()> {
    info!(
        script = %script.id,
        buffer = script.buffer,
        mode = ?config.mode,
        "starting ldb"
    );
    let channel = match config.mode {
        DebuggerKind::Console => SessionChannel::stdio(),
        DebuggerKind::Ide => {
            let (command_port, event_port) = config.remote_ports()?;
            let listeners = RemoteListeners::bind(&config.bind, command_port, event_port)?;
            info!(command_port, event_port, "waiting for the IDE");
            listeners.accept()?
        }
    };
    let mut debugger = Debugger::new(channel);
    if let Err(err) = debugger.started() {
        tracing::warn!(%err, "failed to announce the session");
    }
    let debugger = Arc::new(Mutex::new(debugger));
    run_script(&debugger, script).with_context(|| format!("debugging {}", script.id))?;
    info!("script finished");
    Ok(())
}
