//! Execution control state machine.

#![allow(missing_docs)]

use crate::breakpoints::Breakpoints;
use crate::types::ScriptId;

/// Debugger execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugMode {
    /// Suspend on every line.
    #[default]
    Stepping,
    /// Suspend only on breakpoint lines.
    Continuing,
}

/// Control actions requested by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    /// Run one line, then suspend.
    Step,
    /// Run until a breakpoint.
    Continue,
    /// Run to completion and stop debugging.
    Quit,
}

/// Outcome of applying a control action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// The action changed the debug state.
    Applied,
    /// The action was ignored because it had no effect.
    Ignored,
}

/// Why a line event suspended execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Step,
    Breakpoint(u32),
}

/// Stepping/continuing state machine consulted on every line event.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionController {
    mode: DebugMode,
    detached: bool,
}

impl ExecutionController {
    /// A controller in stepping mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mode(&self) -> DebugMode {
        self.mode
    }

    /// Whether `quit` (or a dead transport) ended the session.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Decide whether a line event suspends execution.
    #[must_use]
    pub fn on_line(
        &self,
        breakpoints: &Breakpoints,
        script: &ScriptId,
        line: u32,
    ) -> Option<StopReason> {
        if self.detached {
            return None;
        }
        match self.mode {
            DebugMode::Stepping => Some(StopReason::Step),
            DebugMode::Continuing if breakpoints.contains(script, line) => {
                Some(StopReason::Breakpoint(line))
            }
            DebugMode::Continuing => None,
        }
    }

    /// Apply a requested control action.
    pub fn apply(&mut self, action: ControlAction) -> ControlOutcome {
        let previous = (self.mode, self.detached);
        match action {
            ControlAction::Step => {
                if !self.detached {
                    self.mode = DebugMode::Stepping;
                }
            }
            ControlAction::Continue => self.mode = DebugMode::Continuing,
            ControlAction::Quit => {
                self.mode = DebugMode::Continuing;
                self.detached = true;
            }
        }
        let outcome = if previous == (self.mode, self.detached) {
            ControlOutcome::Ignored
        } else {
            ControlOutcome::Applied
        };
        tracing::debug!(
            ?action,
            ?outcome,
            "mode {:?}->{:?}",
            previous.0,
            self.mode
        );
        outcome
    }

    /// Stop suspending for the rest of the run.
    pub fn detach(&mut self) {
        self.apply(ControlAction::Quit);
    }
}
