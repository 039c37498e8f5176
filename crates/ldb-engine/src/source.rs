//! Per-script source line cache.

#![allow(missing_docs)]

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use indexmap::IndexMap;

use crate::types::ScriptId;

/// Text shown when a script has no cached lines.
pub const LINES_NOT_AVAILABLE: &str = "lines not available";

/// Result of looking up one cached line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineLookup<'a> {
    /// The numbered line text.
    Found(&'a str),
    /// Nothing is cached for the script.
    NotAvailable,
    /// The script is cached but has no such line.
    OutOfRange {
        /// Requested line.
        line: u32,
        /// Number of cached lines.
        len: usize,
    },
}

impl LineLookup<'_> {
    /// Display text for the lookup, as shown to the operator.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Found(text) => (*text).to_string(),
            Self::NotAvailable => LINES_NOT_AVAILABLE.to_string(),
            Self::OutOfRange { line, len } => {
                format!("line {line} out of range (script has {len} lines)")
            }
        }
    }
}

/// Numbered source lines, keyed by script.
///
/// Line `n` lives at offset `n - 1` and is stored pre-formatted as
/// `"{n}  {text}"`. Lines are only ever appended.
#[derive(Debug, Clone, Default)]
pub struct SourceLines {
    scripts: IndexMap<ScriptId, Vec<String>>,
}

impl SourceLines {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one already-numbered line to the script.
    pub fn load(&mut self, id: &ScriptId, text: impl Into<String>) {
        self.scripts.entry(id.clone()).or_default().push(text.into());
    }

    /// Read a file line by line and cache every line under `id`.
    ///
    /// Returns the number of lines loaded.
    pub fn load_from_file(&mut self, id: &ScriptId, path: &Path) -> io::Result<usize> {
        let reader = BufReader::new(File::open(path)?);
        let mut count = 0;
        for line in reader.lines() {
            let line = line?;
            self.push_numbered(id, line.trim_end_matches('\r'));
            count += 1;
        }
        tracing::debug!(script = %id, lines = count, "cached source file");
        Ok(count)
    }

    /// Split an in-memory buffer on `\n` and cache every line under `id`.
    ///
    /// A trailing newline does not produce an extra empty line.
    pub fn load_from_buffer(&mut self, id: &ScriptId, buffer: &str) -> usize {
        if buffer.is_empty() {
            return 0;
        }
        let body = buffer.strip_suffix('\n').unwrap_or(buffer);
        let mut count = 0;
        for line in body.split('\n') {
            self.push_numbered(id, line.trim_end_matches('\r'));
            count += 1;
        }
        tracing::debug!(script = %id, lines = count, "cached source buffer");
        count
    }

    fn push_numbered(&mut self, id: &ScriptId, text: &str) {
        let number = self.len(id) + 1;
        self.load(id, format!("{number}  {text}"));
    }

    /// Look up line `line` (1-based) of a script.
    #[must_use]
    pub fn line(&self, id: &ScriptId, line: u32) -> LineLookup<'_> {
        let Some(lines) = self.scripts.get(id) else {
            return LineLookup::NotAvailable;
        };
        let index = usize::try_from(line).ok().and_then(|n| n.checked_sub(1));
        match index.and_then(|index| lines.get(index)) {
            Some(text) => LineLookup::Found(text),
            None => LineLookup::OutOfRange {
                line,
                len: lines.len(),
            },
        }
    }

    /// Number of cached lines for a script (0 when unknown).
    #[must_use]
    pub fn len(&self, id: &ScriptId) -> usize {
        self.scripts.get(id).map_or(0, Vec::len)
    }

    /// Whether the store has no scripts at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &ScriptId) -> bool {
        self.scripts.contains_key(id)
    }

    /// Cached lines `first..=last` of a script, clamped to what is cached.
    pub fn window(&self, id: &ScriptId, first: u32, last: u32) -> impl Iterator<Item = &str> {
        let lines = self.scripts.get(id).map_or(&[][..], Vec::as_slice);
        let start = usize::try_from(first.saturating_sub(1)).unwrap_or(usize::MAX);
        let end = usize::try_from(last).unwrap_or(usize::MAX).min(lines.len());
        lines
            .get(start..end.max(start))
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
    }
}
