//! Line hook trait.

#![allow(missing_docs)]

use crate::inspect::StackInspector;
use crate::types::ScriptId;

/// What the host should do with its hook after a line event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    /// Keep delivering line events.
    Continue,
    /// Remove the hook; no further events are wanted.
    Detach,
}

/// Receiver of the runtime's per-line events.
pub trait LineHook {
    /// Called before `line` of `script` executes. May block while the
    /// debuggee is suspended.
    fn on_line(
        &mut self,
        inspector: &dyn StackInspector,
        script: &ScriptId,
        line: u32,
    ) -> HookAction;
}
