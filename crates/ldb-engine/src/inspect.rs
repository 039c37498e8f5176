//! Runtime stack introspection.
//! - StackInspector: capability the host runtime provides while suspended
//! - Introspection: locals/upvalues/globals queries and name resolution
//! - describe_frame/traceback: human-readable frame rendering

#![allow(missing_docs)]

use std::fmt::Write as _;

use crate::types::{FrameInfo, FrameKind, StackFrameView, Variable};
use crate::value::RuntimeValue;

/// Leading levels kept by [`traceback`] before eliding.
pub const TRACEBACK_HEAD: usize = 12;
/// Trailing levels kept by [`traceback`] after eliding.
pub const TRACEBACK_TAIL: usize = 10;

/// Stack introspection provided by the host runtime.
///
/// Only meaningful while the debuggee is suspended inside a line hook. Level 0
/// is the innermost frame (the one executing the current line).
pub trait StackInspector {
    /// Number of active stack levels.
    fn depth(&self) -> usize;

    /// Frame facts for `level`, or `None` past the end of the stack.
    fn frame(&self, level: usize) -> Option<FrameInfo>;

    /// Every active local slot of `level` in slot order, temporaries included.
    fn locals(&self, level: usize) -> Vec<Variable>;

    /// Upvalues of the function running at `level`.
    fn upvalues(&self, level: usize) -> Vec<Variable>;

    /// Entries of the global table.
    fn globals(&self) -> Vec<Variable>;

    /// Raw value slots of the innermost frame.
    fn value_stack(&self) -> Vec<RuntimeValue>;
}

/// Outcome of resolving a single symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Local(Variable),
    Global(Variable),
    NotFound,
}

impl Resolved {
    #[must_use]
    pub fn variable(&self) -> Option<&Variable> {
        match self {
            Self::Local(variable) | Self::Global(variable) => Some(variable),
            Self::NotFound => None,
        }
    }
}

/// Queries over the live stack of a suspended runtime.
///
/// Nothing is cached: every call goes back to the inspector.
#[derive(Clone, Copy)]
pub struct Introspection<'a> {
    inspector: &'a dyn StackInspector,
}

impl<'a> Introspection<'a> {
    #[must_use]
    pub fn new(inspector: &'a dyn StackInspector) -> Self {
        Self { inspector }
    }

    /// Visible locals of `level`, temporaries skipped.
    #[must_use]
    pub fn locals(&self, level: usize) -> Vec<Variable> {
        self.inspector
            .locals(level)
            .into_iter()
            .filter(|variable| !variable.is_temporary())
            .collect()
    }

    #[must_use]
    pub fn upvalues(&self, level: usize) -> Vec<Variable> {
        self.inspector.upvalues(level)
    }

    /// The visible local named `name` at `level`.
    ///
    /// When an inner block redeclares a name, the later slot is the one in
    /// scope, so the last match wins.
    #[must_use]
    pub fn local(&self, level: usize, name: &str) -> Option<Variable> {
        self.locals(level)
            .into_iter()
            .rev()
            .find(|variable| variable.name == name)
    }

    /// Globals worth displaying: function values are skipped.
    #[must_use]
    pub fn globals(&self) -> Vec<Variable> {
        self.inspector
            .globals()
            .into_iter()
            .filter(|variable| !variable.value.is_function())
            .collect()
    }

    /// The global named `name`, whatever its kind.
    #[must_use]
    pub fn global(&self, name: &str) -> Option<Variable> {
        self.inspector
            .globals()
            .into_iter()
            .find(|variable| variable.name == name)
    }

    /// Resolve a symbol: locals of `level` first, then globals.
    #[must_use]
    pub fn resolve(&self, level: usize, name: &str) -> Resolved {
        if let Some(variable) = self.local(level, name) {
            return Resolved::Local(variable);
        }
        match self.global(name) {
            Some(variable) => Resolved::Global(variable),
            None => Resolved::NotFound,
        }
    }

    /// Projection of one stack level.
    #[must_use]
    pub fn frame(&self, level: usize) -> Option<StackFrameView> {
        let info = self.inspector.frame(level)?;
        let locals = self
            .locals(level)
            .into_iter()
            .map(|variable| variable.name)
            .collect();
        Some(StackFrameView {
            level,
            info,
            locals,
        })
    }

    /// All stack levels, outermost first.
    #[must_use]
    pub fn stack_trace(&self) -> Vec<StackFrameView> {
        (0..self.inspector.depth())
            .rev()
            .filter_map(|level| self.frame(level))
            .collect()
    }

    /// Frame facts for every level, innermost first.
    #[must_use]
    pub fn frames(&self) -> Vec<FrameInfo> {
        (0..self.inspector.depth())
            .filter_map(|level| self.inspector.frame(level))
            .collect()
    }

    #[must_use]
    pub fn value_stack(&self) -> Vec<RuntimeValue> {
        self.inspector.value_stack()
    }
}

/// Where a frame's code lives, e.g. ``in function `f'`` or `in main chunk`.
#[must_use]
pub fn describe_frame(info: &FrameInfo) -> String {
    if let (Some(name), Some(kind)) = (&info.name, info.name_kind) {
        if kind.is_binding() {
            return format!("in function `{name}'");
        }
    }
    match info.kind {
        FrameKind::Main => "in main chunk".to_string(),
        FrameKind::Native => "in native function".to_string(),
        FrameKind::Lua => format!(
            "in function <{}:{}>",
            info.source,
            info.line_defined.unwrap_or_default()
        ),
    }
}

/// Render an error message followed by a stack traceback.
///
/// `frames` is innermost first. Deep stacks keep the first
/// [`TRACEBACK_HEAD`] and last [`TRACEBACK_TAIL`] levels.
#[must_use]
pub fn traceback(message: &str, frames: &[FrameInfo]) -> String {
    let mut out = String::new();
    out.push_str(message);
    out.push_str("\nstack traceback:\n");
    let total = frames.len();
    let elide = total > TRACEBACK_HEAD + TRACEBACK_TAIL;
    for (level, info) in frames.iter().enumerate() {
        if elide && level >= TRACEBACK_HEAD && level < total - TRACEBACK_TAIL {
            if level == TRACEBACK_HEAD {
                out.push_str("       ...\n");
            }
            continue;
        }
        let _ = write!(out, "{level:4}-  {}:", info.source);
        if let Some(line) = info.current_line {
            let _ = write!(out, "{line}:");
        }
        let _ = writeln!(out, " {}", describe_frame(info));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NameKind;

    struct OneFrame {
        locals: Vec<Variable>,
        globals: Vec<Variable>,
    }

    impl StackInspector for OneFrame {
        fn depth(&self) -> usize {
            1
        }

        fn frame(&self, level: usize) -> Option<FrameInfo> {
            (level == 0).then(|| frame_info(None, FrameKind::Main, Some(3)))
        }

        fn locals(&self, level: usize) -> Vec<Variable> {
            if level == 0 {
                self.locals.clone()
            } else {
                Vec::new()
            }
        }

        fn upvalues(&self, _level: usize) -> Vec<Variable> {
            Vec::new()
        }

        fn globals(&self) -> Vec<Variable> {
            self.globals.clone()
        }

        fn value_stack(&self) -> Vec<RuntimeValue> {
            self.locals.iter().map(|v| v.value.clone()).collect()
        }
    }

    fn frame_info(name: Option<&str>, kind: FrameKind, line: Option<u32>) -> FrameInfo {
        FrameInfo {
            name: name.map(Into::into),
            name_kind: name.map(|_| NameKind::Global),
            kind,
            source: "s.lua".into(),
            current_line: line,
            line_defined: Some(0),
        }
    }

    fn sample() -> OneFrame {
        OneFrame {
            locals: vec![
                Variable::new("x", RuntimeValue::Integer(1)),
                Variable::new("(temporary)", RuntimeValue::Integer(9)),
                Variable::new("y", RuntimeValue::String("a".into())),
                Variable::new("x", RuntimeValue::Integer(2)),
            ],
            globals: vec![
                Variable::new("x", RuntimeValue::Integer(100)),
                Variable::new("g", RuntimeValue::Boolean(true)),
                Variable::new("print", RuntimeValue::Function),
            ],
        }
    }

    #[test]
    fn locals_skip_temporaries() {
        let inspector = sample();
        let names: Vec<_> = Introspection::new(&inspector)
            .locals(0)
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["x", "y", "x"]);
    }

    #[test]
    fn locals_shadow_globals() {
        let inspector = sample();
        let introspection = Introspection::new(&inspector);

        let resolved = introspection.resolve(0, "x");
        assert_eq!(
            resolved,
            Resolved::Local(Variable::new("x", RuntimeValue::Integer(2)))
        );
        assert_eq!(
            introspection.resolve(0, "g"),
            Resolved::Global(Variable::new("g", RuntimeValue::Boolean(true)))
        );
        assert_eq!(introspection.resolve(0, "missing"), Resolved::NotFound);
        assert_eq!(introspection.resolve(0, "(temporary)"), Resolved::NotFound);
    }

    #[test]
    fn function_globals_are_not_listed() {
        let inspector = sample();
        let introspection = Introspection::new(&inspector);
        let names: Vec<_> = introspection.globals().into_iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["x", "g"]);
        assert!(introspection.global("print").is_some());
    }

    #[test]
    fn frames_are_described_by_kind() {
        assert_eq!(
            describe_frame(&frame_info(Some("f"), FrameKind::Lua, None)),
            "in function `f'"
        );
        assert_eq!(
            describe_frame(&frame_info(None, FrameKind::Main, None)),
            "in main chunk"
        );
        let mut anonymous = frame_info(None, FrameKind::Lua, None);
        anonymous.line_defined = Some(7);
        assert_eq!(describe_frame(&anonymous), "in function <s.lua:7>");
    }

    #[test]
    fn traceback_elides_middle_levels() {
        let frames: Vec<_> = (0..30)
            .map(|_| frame_info(Some("f"), FrameKind::Lua, Some(2)))
            .collect();
        let text = traceback("boom", &frames);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "boom");
        assert_eq!(lines[1], "stack traceback:");
        assert_eq!(lines.len(), 2 + TRACEBACK_HEAD + 1 + TRACEBACK_TAIL);
        assert_eq!(lines[2 + TRACEBACK_HEAD], "       ...");
        assert_eq!(lines[2], "   0-  s.lua:2: in function `f'");
        assert!(lines.last().unwrap().starts_with("  29-  "));
    }

    #[test]
    fn short_traceback_keeps_every_level() {
        let frames = vec![
            frame_info(Some("f"), FrameKind::Lua, Some(2)),
            frame_info(None, FrameKind::Main, Some(5)),
        ];
        expect_test::expect![[r#"
            err
            stack traceback:
               0-  s.lua:2: in function `f'
               1-  s.lua:5: in main chunk
        "#]]
        .assert_eq(&traceback("err", &frames));
    }
}
