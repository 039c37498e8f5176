//! Debugger session facade.

#![allow(missing_docs)]

use crate::breakpoints::Breakpoints;
use crate::channel::{ChannelKind, SessionChannel};
use crate::controller::{ControlAction, DebugMode, ExecutionController, StopReason};
use crate::error::EngineError;
use crate::hook::{HookAction, LineHook};
use crate::inspect::StackInspector;
use crate::protocol::Suspension;
use crate::source::SourceLines;
use crate::types::ScriptId;
use crate::wire::EngineEvent;

/// One debugging session: the stores, the state machine and the channel.
///
/// Each session owns its state, so independent runtimes never share
/// breakpoints or cached sources.
#[derive(Debug)]
pub struct Debugger {
    sources: SourceLines,
    breakpoints: Breakpoints,
    controller: ExecutionController,
    channel: SessionChannel,
}

impl Debugger {
    /// A session in stepping mode over `channel`.
    #[must_use]
    pub fn new(channel: SessionChannel) -> Self {
        Self {
            sources: SourceLines::new(),
            breakpoints: Breakpoints::new(),
            controller: ExecutionController::new(),
            channel,
        }
    }

    #[must_use]
    pub fn sources(&self) -> &SourceLines {
        &self.sources
    }

    pub fn sources_mut(&mut self) -> &mut SourceLines {
        &mut self.sources
    }

    #[must_use]
    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    pub fn breakpoints_mut(&mut self) -> &mut Breakpoints {
        &mut self.breakpoints
    }

    #[must_use]
    pub fn mode(&self) -> DebugMode {
        self.controller.mode()
    }

    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.controller.is_detached()
    }

    #[must_use]
    pub fn channel_kind(&self) -> ChannelKind {
        self.channel.kind()
    }

    /// Apply a control action outside of a suspension (e.g. start continuing).
    pub fn apply(&mut self, action: ControlAction) {
        self.controller.apply(action);
    }

    /// Announce that the session is up.
    pub fn started(&mut self) -> Result<(), EngineError> {
        tracing::info!(channel = ?self.channel.kind(), "debug session started");
        self.channel.event(&EngineEvent::Started)
    }

    /// Report a script that failed to load or run. No command loop follows.
    pub fn report_load_error(&mut self, script: &ScriptId, message: &str) {
        let event = EngineEvent::SyntaxError {
            script: script.clone(),
            message: message.to_string(),
        };
        if let Err(err) = self.channel.event(&event) {
            tracing::warn!(%err, "failed to send syntax error event");
        }
    }

    fn suspend(
        &mut self,
        inspector: &dyn StackInspector,
        script: &ScriptId,
        line: u32,
        reason: StopReason,
    ) -> Result<ControlAction, EngineError> {
        tracing::debug!(%script, line, ?reason, "suspended");
        let mut suspension = Suspension {
            script,
            line,
            inspector,
            sources: &self.sources,
            breakpoints: &mut self.breakpoints,
            channel: &mut self.channel,
        };
        suspension.announce(reason)?;
        suspension.run()
    }
}

impl LineHook for Debugger {
    fn on_line(
        &mut self,
        inspector: &dyn StackInspector,
        script: &ScriptId,
        line: u32,
    ) -> HookAction {
        if let Some(reason) = self.controller.on_line(&self.breakpoints, script, line) {
            match self.suspend(inspector, script, line, reason) {
                Ok(action) => {
                    self.controller.apply(action);
                }
                Err(err) => {
                    tracing::warn!(%err, "debug session ended, releasing the debuggee");
                    self.controller.detach();
                }
            }
        }
        if self.controller.is_detached() {
            HookAction::Detach
        } else {
            HookAction::Continue
        }
    }
}
