//! Remote IDE transport (TCP).
//! - command connection: commands in, replies out
//! - event connection: lifecycle events out

use std::net::{SocketAddr, TcpListener, TcpStream};

use ldb_engine::SessionChannel;

use crate::error::HostError;

/// Listening sockets for the two IDE connections.
#[derive(Debug)]
pub struct RemoteListeners {
    commands: TcpListener,
    events: TcpListener,
}

impl RemoteListeners {
    /// Bind the command and event ports on `bind`. Port 0 picks a free port.
    pub fn bind(bind: &str, command_port: u16, event_port: u16) -> Result<Self, HostError> {
        Ok(Self {
            commands: listen(bind, command_port)?,
            events: listen(bind, event_port)?,
        })
    }

    /// Address the IDE sends commands to.
    pub fn command_addr(&self) -> Result<SocketAddr, HostError> {
        local_addr(&self.commands)
    }

    /// Address the IDE reads events from.
    pub fn event_addr(&self) -> Result<SocketAddr, HostError> {
        local_addr(&self.events)
    }

    /// Wait for the IDE: the command connection first, then the event one.
    pub fn accept(self) -> Result<SessionChannel, HostError> {
        let commands = accept(&self.commands, "command")?;
        let events = accept(&self.events, "event")?;
        let replies = commands
            .try_clone()
            .map_err(|err| HostError::Transport(format!("clone command socket: {err}").into()))?;
        Ok(SessionChannel::remote(commands, replies, events))
    }
}

fn listen(bind: &str, port: u16) -> Result<TcpListener, HostError> {
    TcpListener::bind((bind, port))
        .map_err(|err| HostError::Transport(format!("bind {bind}:{port}: {err}").into()))
}

fn local_addr(listener: &TcpListener) -> Result<SocketAddr, HostError> {
    listener
        .local_addr()
        .map_err(|err| HostError::Transport(format!("local address: {err}").into()))
}

fn accept(listener: &TcpListener, role: &str) -> Result<TcpStream, HostError> {
    let (stream, peer) = listener
        .accept()
        .map_err(|err| HostError::Transport(format!("accept {role} connection: {err}").into()))?;
    // Replies are small and latency-bound.
    let _ = stream.set_nodelay(true);
    tracing::info!(%peer, role, "accepted connection");
    Ok(stream)
}
