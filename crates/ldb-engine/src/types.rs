//! Debug data types.

#![allow(missing_docs)]

use std::fmt;

use smol_str::SmolStr;

use crate::value::RuntimeValue;

/// Canonical name of a script (file path or buffer tag).
///
/// This is the only key into the per-script maps, so it must match what the
/// runtime reports as the source of the running chunk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptId(SmolStr);

impl ScriptId {
    /// Create a script id from a name.
    #[must_use]
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self(name.into())
    }

    /// Create a script id from a runtime chunk name, dropping the `@` (file)
    /// or `=` (literal) marker the runtime puts in front of it.
    #[must_use]
    pub fn from_chunk_name(chunk: &str) -> Self {
        let name = chunk
            .strip_prefix('@')
            .or_else(|| chunk.strip_prefix('='))
            .unwrap_or(chunk);
        Self(name.into())
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScriptId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ScriptId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// How the runtime found the name of a called function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Global,
    Local,
    Method,
    Field,
    Upvalue,
    Metamethod,
    Constant,
    ForIterator,
    Hook,
}

impl NameKind {
    /// Parse the runtime's `namewhat` text. Empty text means "no name".
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "global" => Some(Self::Global),
            "local" => Some(Self::Local),
            "method" => Some(Self::Method),
            "field" => Some(Self::Field),
            "upvalue" => Some(Self::Upvalue),
            "metamethod" => Some(Self::Metamethod),
            "constant" => Some(Self::Constant),
            "for iterator" => Some(Self::ForIterator),
            "hook" => Some(Self::Hook),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Local => "local",
            Self::Method => "method",
            Self::Field => "field",
            Self::Upvalue => "upvalue",
            Self::Metamethod => "metamethod",
            Self::Constant => "constant",
            Self::ForIterator => "for iterator",
            Self::Hook => "hook",
        }
    }

    /// Whether the name identifies a user-visible function binding.
    #[must_use]
    pub fn is_binding(self) -> bool {
        matches!(self, Self::Global | Self::Local | Self::Field | Self::Method)
    }
}

/// What kind of function a frame runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// A Lua function.
    Lua,
    /// The main chunk of a script.
    Main,
    /// A host (C) function.
    Native,
}

impl FrameKind {
    /// Parse the runtime's `what` text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text {
            "main" => Self::Main,
            "C" => Self::Native,
            _ => Self::Lua,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lua => "Lua",
            Self::Main => "main",
            Self::Native => "C",
        }
    }
}

/// Frame facts reported by the runtime for one stack level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub name: Option<SmolStr>,
    pub name_kind: Option<NameKind>,
    pub kind: FrameKind,
    /// Script the frame's code comes from, chunk marker stripped.
    pub source: SmolStr,
    pub current_line: Option<u32>,
    pub line_defined: Option<u32>,
}

/// Ephemeral projection of one call-stack level.
///
/// Only valid while the debuggee is suspended at the hook that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrameView {
    /// Runtime level, 0 is the innermost frame.
    pub level: usize,
    pub info: FrameInfo,
    /// Visible local names, temporaries excluded.
    pub locals: Vec<SmolStr>,
}

/// A named runtime value (local, upvalue or global).
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: SmolStr,
    pub value: RuntimeValue,
}

impl Variable {
    #[must_use]
    pub fn new(name: impl Into<SmolStr>, value: RuntimeValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Runtime-internal slots such as `(temporary)` or `(for state)`.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        is_temporary_name(&self.name)
    }
}

pub(crate) fn is_temporary_name(name: &str) -> bool {
    name.starts_with('(')
}
