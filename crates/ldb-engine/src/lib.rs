//! `ldb-engine` - source-level debugging engine for Lua scripts.
//!
//! The engine sits behind a runtime's per-line hook and provides:
//!
//! - **Execution control**: stepping/continuing state machine with per-script breakpoints
//! - **Source cache**: numbered source lines per script
//! - **Introspection**: locals, upvalues, globals and stack traces over a [`StackInspector`]
//! - **Command protocol**: prefix-matched operator verbs and the IDE wire format
//! - **Session channels**: interactive console or a remote command/event socket pair
//!
//! The runtime itself is not a dependency: a host implements [`StackInspector`]
//! and forwards line events to a [`Debugger`] through [`LineHook`].
//!
//! # Example
//!
//! ```ignore
//! use ldb_engine::{Debugger, LineHook, ScriptId, SessionChannel};
//!
//! let mut debugger = Debugger::new(SessionChannel::stdio());
//! let script = ScriptId::new("t.lua");
//! debugger.sources_mut().load_from_buffer(&script, source);
//! // from the runtime's line hook:
//! let action = debugger.on_line(&inspector, &script, line);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

/// Breakpoint storage and matching.
pub mod breakpoints;
/// Session transports.
pub mod channel;
/// Operator and IDE command parsing.
pub mod command;
/// Execution control state machine.
pub mod controller;
/// Engine errors.
pub mod error;
/// Line hook trait.
pub mod hook;
/// Runtime stack introspection.
pub mod inspect;
/// Command loop and console renderings.
pub mod protocol;
/// Debugger session facade.
pub mod session;
/// Per-script source line cache.
pub mod source;
/// Debug data types.
pub mod types;
/// Runtime value snapshots.
pub mod value;
/// IDE wire format and lifecycle events.
pub mod wire;

pub use breakpoints::Breakpoints;
pub use channel::{ChannelKind, SessionChannel};
pub use command::{Command, PrintTarget};
pub use controller::{ControlAction, ControlOutcome, DebugMode, ExecutionController, StopReason};
pub use error::{CommandError, EngineError};
pub use hook::{HookAction, LineHook};
pub use inspect::{describe_frame, traceback, Introspection, Resolved, StackInspector};
pub use session::Debugger;
pub use source::{LineLookup, SourceLines};
pub use types::{FrameInfo, FrameKind, NameKind, ScriptId, StackFrameView, Variable};
pub use value::{RuntimeValue, TableEntry, TableView};
pub use wire::{EngineEvent, ResumeReason, SuspendReason};
