//! Breakpoint storage and matching.

#![allow(missing_docs)]

use indexmap::IndexMap;

use crate::types::ScriptId;

/// Active breakpoint lines per script, in insertion order.
///
/// Setting the same line twice keeps both entries, so `add` followed by
/// `remove` always restores the previous listing.
#[derive(Debug, Clone, Default)]
pub struct Breakpoints {
    scripts: IndexMap<ScriptId, Vec<u32>>,
}

impl Breakpoints {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: &ScriptId, line: u32) {
        self.scripts.entry(id.clone()).or_default().push(line);
        tracing::debug!(script = %id, line, "breakpoint set");
    }

    /// Remove the first entry for `line`. Returns `false` when there was none.
    pub fn remove(&mut self, id: &ScriptId, line: u32) -> bool {
        let Some(lines) = self.scripts.get_mut(id) else {
            return false;
        };
        let Some(index) = lines.iter().position(|candidate| *candidate == line) else {
            return false;
        };
        lines.remove(index);
        tracing::debug!(script = %id, line, "breakpoint cleared");
        true
    }

    /// Breakpoint lines for a script, empty when none are set.
    #[must_use]
    pub fn list(&self, id: &ScriptId) -> &[u32] {
        self.scripts.get(id).map_or(&[][..], Vec::as_slice)
    }

    /// Whether execution should stop at `line` of `id`.
    #[must_use]
    pub fn contains(&self, id: &ScriptId, line: u32) -> bool {
        self.list(id).contains(&line)
    }

    /// Scripts with at least one breakpoint, with their lines.
    pub fn iter(&self) -> impl Iterator<Item = (&ScriptId, &[u32])> {
        self.scripts
            .iter()
            .filter(|(_, lines)| !lines.is_empty())
            .map(|(id, lines)| (id, lines.as_slice()))
    }

    /// Total number of breakpoint entries across scripts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scripts.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
