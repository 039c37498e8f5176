//! `ldb` - source-level debugger for Lua scripts.
//!
//! Hosts a Lua 5.4 runtime, forwards its line events to an
//! [`ldb_engine::Debugger`] and connects the debugger to either the
//! interactive console or a remote IDE.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

/// `ldb.toml` configuration.
pub mod config;
/// Host errors and exit codes.
pub mod error;
/// Lua runtime adapter and stack inspector.
pub mod lua;
/// Script loading and the debugged run.
pub mod runner;
/// Remote IDE transport.
pub mod transport;

pub use config::{DebuggerKind, LdbConfig};
pub use error::HostError;
pub use lua::{LuaHost, LuaStack};
pub use runner::{run_script, Script};
pub use transport::RemoteListeners;
