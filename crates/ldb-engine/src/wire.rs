//! IDE wire format.
//! - globals/var/stack/value-stack dumps: `|`-delimited text
//! - EngineEvent: lifecycle notifications for the event stream

#![allow(missing_docs)]

use std::fmt;

use smol_str::SmolStr;

use crate::inspect::Resolved;
use crate::types::{FrameKind, ScriptId, StackFrameView, Variable};
use crate::value::RuntimeValue;

/// Opens a table global in the globals dump.
pub const GLOBAL_TABLE_START: &str = "startglobaltable=startglobaltable|";
/// Closes a table global in the globals dump.
pub const GLOBAL_TABLE_END: &str = "endglobaltable=endglobaltable|";
/// Reply to a `var` query that matches nothing.
pub const NOT_FOUND: &str = "notFound";

/// Lifecycle notification pushed on the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Started,
    Resumed(ResumeReason),
    Suspended(SuspendReason),
    /// The script failed to load or run.
    SyntaxError {
        script: ScriptId,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeReason {
    Client,
    Step,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendReason {
    Step,
    Client,
    Breakpoint(u32),
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => f.write_str("started"),
            Self::Resumed(ResumeReason::Client) => f.write_str("resumed client"),
            Self::Resumed(ResumeReason::Step) => f.write_str("resumed step"),
            Self::Suspended(SuspendReason::Step) => f.write_str("suspended step"),
            Self::Suspended(SuspendReason::Client) => f.write_str("suspended client"),
            Self::Suspended(SuspendReason::Breakpoint(line)) => {
                write!(f, "suspended breakpoint {line}")
            }
            Self::SyntaxError { script, message } => {
                write!(f, "syntaxerror | {script} | {message}")
            }
        }
    }
}

fn has_line_break(text: &str) -> bool {
    text.contains(['\n', '\r'])
}

/// Append `name[key]=value|` for every table entry without line breaks.
fn push_table_entries(out: &mut String, name: &str, value: &RuntimeValue) {
    let Some(table) = value.as_table() else {
        return;
    };
    for (key, value) in table.rendered() {
        let entry = format!("{name}[{key}]={value}|");
        if !has_line_break(&entry) {
            out.push_str(&entry);
        }
    }
}

/// Globals dump: `name=value|` per scalar, table globals bracketed by the
/// start/end markers with their entries in between.
#[must_use]
pub fn globals(variables: &[Variable]) -> String {
    let mut out = String::new();
    for variable in variables {
        if matches!(variable.value, RuntimeValue::Table(_)) {
            out.push_str(GLOBAL_TABLE_START);
            push_table_entries(&mut out, &variable.name, &variable.value);
            out.push_str(GLOBAL_TABLE_END);
            continue;
        }
        let entry = format!("{}={}|", variable.name, variable.value.render());
        if !has_line_break(&entry) {
            out.push_str(&entry);
        }
    }
    out
}

/// Reply to a `var frame name` query.
#[must_use]
pub fn var_value(resolved: &Resolved) -> String {
    let Some(variable) = resolved.variable() else {
        return NOT_FOUND.to_string();
    };
    match &variable.value {
        RuntimeValue::Nil
        | RuntimeValue::Boolean(_)
        | RuntimeValue::Integer(_)
        | RuntimeValue::Number(_)
        | RuntimeValue::String(_) => variable.value.render().replace(['\n', '\r'], " "),
        value @ RuntimeValue::Table(_) => {
            let mut out = String::new();
            push_table_entries(&mut out, &variable.name, value);
            out
        }
        other => format!("type {} not yet displayable", other.type_name()),
    }
}

/// Function column of a stack block: the name, else `main`, else the kind.
fn function_label(frame: &StackFrameView) -> SmolStr {
    if let Some(name) = &frame.info.name {
        return name.clone();
    }
    match frame.info.kind {
        FrameKind::Main => SmolStr::new_inline("main"),
        kind => SmolStr::new(kind.as_str()),
    }
}

/// Stack dump: `source|line|function|local|...#` per frame, in the order given.
#[must_use]
pub fn stack_trace(frames: &[StackFrameView]) -> String {
    let mut out = String::new();
    for frame in frames {
        out.push_str(&frame.info.source);
        out.push('|');
        let line = frame
            .info
            .current_line
            .map_or_else(|| "-1".to_string(), |line| line.to_string());
        out.push_str(&line);
        out.push('|');
        out.push_str(&function_label(frame));
        out.push('|');
        for local in &frame.locals {
            out.push_str(local);
            out.push('|');
        }
        out.push('#');
    }
    out
}

/// Value-stack dump: `value|` per slot.
#[must_use]
pub fn value_stack(values: &[RuntimeValue]) -> String {
    let mut out = String::new();
    for value in values {
        out.push_str(&value.render().replace(['\n', '\r'], " "));
        out.push('|');
    }
    out
}
