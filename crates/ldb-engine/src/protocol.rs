//! Command loop run while the debuggee is suspended.
//! - announce: tell the operator/IDE why execution stopped
//! - run: read, parse and dispatch until a resuming command
//! - console renderings for display/print output

#![allow(missing_docs)]

use crate::breakpoints::Breakpoints;
use crate::channel::{ChannelKind, SessionChannel};
use crate::command::{Command, PrintTarget, HELP_HINT, HELP_TEXT};
use crate::controller::{ControlAction, StopReason};
use crate::error::EngineError;
use crate::inspect::{Introspection, Resolved, StackInspector};
use crate::source::{LineLookup, SourceLines};
use crate::types::{ScriptId, Variable};
use crate::value::RuntimeValue;
use crate::wire::{self, EngineEvent, ResumeReason, SuspendReason};

/// Lines shown past `first` by `list` without an explicit end.
pub const LIST_WINDOW: u32 = 5;

/// Header of the console `print trace` output.
pub const TRACE_HEADER: &str = "level# name,type,language,source,currentline,linedefinedat";

/// Everything a command may touch while execution is suspended at one line.
pub struct Suspension<'a> {
    pub script: &'a ScriptId,
    pub line: u32,
    pub inspector: &'a dyn StackInspector,
    pub sources: &'a SourceLines,
    pub breakpoints: &'a mut Breakpoints,
    pub channel: &'a mut SessionChannel,
}

impl Suspension<'_> {
    fn introspection(&self) -> Introspection<'_> {
        Introspection::new(self.inspector)
    }

    fn is_remote(&self) -> bool {
        self.channel.kind() == ChannelKind::Remote
    }

    fn event(&mut self, event: EngineEvent) -> Result<(), EngineError> {
        self.channel.event(&event)
    }

    /// Console output goes out line by line. A remote client reads exactly
    /// one reply per command, so there the lines are joined with `|`.
    fn reply_lines<I>(&mut self, lines: I) -> Result<(), EngineError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        if self.is_remote() {
            let joined = lines
                .into_iter()
                .map(|line| single_line(line.as_ref()))
                .collect::<Vec<_>>()
                .join("|");
            return self.channel.reply(&joined);
        }
        for line in lines {
            self.channel.reply(line.as_ref())?;
        }
        Ok(())
    }

    /// Report the suspension: the current line on the console, a
    /// resumed/suspended event pair on the remote channel.
    pub fn announce(&mut self, reason: StopReason) -> Result<(), EngineError> {
        if self.is_remote() {
            let (resumed, suspended) = match reason {
                StopReason::Step => (ResumeReason::Step, SuspendReason::Step),
                StopReason::Breakpoint(line) => {
                    (ResumeReason::Client, SuspendReason::Breakpoint(line))
                }
            };
            self.event(EngineEvent::Resumed(resumed))?;
            return self.event(EngineEvent::Suspended(suspended));
        }
        if let StopReason::Breakpoint(line) = reason {
            let notice = format!("stopping at breakpoint in {} line {line}", self.script);
            self.channel.reply(&notice)?;
        }
        let text = self.sources.line(self.script, self.line).text();
        self.channel.reply(&text)
    }

    /// Read and dispatch commands until one resumes execution.
    pub fn run(&mut self) -> Result<ControlAction, EngineError> {
        loop {
            let line = self.channel.read_command()?;
            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(err) => {
                    tracing::debug!(%err, "rejected command");
                    self.channel.reply(&err.to_string())?;
                    continue;
                }
            };
            tracing::debug!(?command, script = %self.script, line = self.line, "command");
            if let Some(action) = self.dispatch(command)? {
                return Ok(action);
            }
        }
    }

    /// Execute one command. Returns the action for commands that resume.
    pub fn dispatch(&mut self, command: Command) -> Result<Option<ControlAction>, EngineError> {
        match command {
            Command::List { first, last } => self.list(first, last)?,
            Command::SetBreak(line) => {
                self.breakpoints.add(self.script, line);
                let reply = format!("setting breakpoint at {} line {line}", self.script);
                self.channel.reply(&reply)?;
            }
            Command::ClearBreak(line) => {
                let removed = self.breakpoints.remove(self.script, line);
                let reply = if self.is_remote() {
                    "ok clear".to_string()
                } else if removed {
                    format!("removing breakpoint at {} line {line}", self.script)
                } else {
                    format!("no breakpoint at {} line {line}", self.script)
                };
                self.channel.reply(&reply)?;
            }
            Command::Display(None) => {
                let lines = display_all(&self.introspection());
                self.reply_lines(lines)?;
            }
            Command::Display(Some(name)) => {
                let resolved = self.introspection().resolve(0, &name);
                let lines = display_resolved(&name, &resolved);
                self.reply_lines(lines)?;
            }
            Command::Assign => self.channel.reply("assign command not implemented")?,
            Command::Step => {
                self.channel.reply("ok")?;
                return Ok(Some(ControlAction::Step));
            }
            Command::Continue => {
                if self.is_remote() {
                    self.channel.reply("ok resume")?;
                    self.event(EngineEvent::Resumed(ResumeReason::Client))?;
                } else {
                    self.channel.reply("ok")?;
                }
                return Ok(Some(ControlAction::Continue));
            }
            Command::Quit => {
                self.channel.reply("ok")?;
                return Ok(Some(ControlAction::Quit));
            }
            Command::Print(target) => {
                let lines = match target {
                    PrintTarget::Stack => print_value_stack(&self.introspection().value_stack()),
                    PrintTarget::Trace => print_trace(&self.introspection()),
                    PrintTarget::Breakpoints => {
                        print_breakpoints(self.script, self.breakpoints.list(self.script))
                    }
                };
                self.reply_lines(lines)?;
            }
            Command::Suspend => {
                self.channel.reply("ok")?;
                if self.is_remote() {
                    self.event(EngineEvent::Suspended(SuspendReason::Client))?;
                }
            }
            Command::IdeStackTrace => {
                let reply = wire::stack_trace(&self.introspection().stack_trace());
                self.channel.reply(&reply)?;
            }
            Command::IdeVar { frame, name } => {
                let resolved = self.introspection().resolve(frame, &name);
                self.channel.reply(&wire::var_value(&resolved))?;
            }
            Command::IdeStackDump => {
                let reply = wire::value_stack(&self.introspection().value_stack());
                self.channel.reply(&reply)?;
            }
            Command::IdeGlobals => {
                let reply = wire::globals(&self.introspection().globals());
                self.channel.reply(&reply)?;
            }
            Command::Help => {
                self.reply_lines(std::iter::once(HELP_HINT).chain(HELP_TEXT.lines()))?;
            }
            Command::Unknown(verb) => {
                self.channel
                    .reply(&format!("ERROR, command not found: {verb}"))?;
            }
        }
        Ok(None)
    }

    fn list(&mut self, first: u32, last: Option<u32>) -> Result<(), EngineError> {
        if !self.sources.contains(self.script) {
            return self
                .channel
                .reply(&LineLookup::NotAvailable.text());
        }
        let len = u32::try_from(self.sources.len(self.script)).unwrap_or(u32::MAX);
        if first > len {
            let lookup = self.sources.line(self.script, first);
            return self.channel.reply(&lookup.text());
        }
        let last = match last {
            Some(last) => last.min(len),
            None if first.saturating_add(LIST_WINDOW) < len => first + LIST_WINDOW,
            None => len,
        };
        let lines: Vec<String> = self
            .sources
            .window(self.script, first, last)
            .map(str::to_string)
            .collect();
        self.reply_lines(lines)
    }
}

fn single_line(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

fn variable_line(variable: &Variable) -> String {
    format!(
        "{} {}={}",
        variable.value.type_name(),
        variable.name,
        variable.value.summary()
    )
}

fn push_section(lines: &mut Vec<String>, title: &str, empty: &str, variables: &[Variable]) {
    lines.push(format!("Finding {title}:"));
    if variables.is_empty() {
        lines.push(empty.to_string());
    }
    lines.extend(variables.iter().map(variable_line));
}

/// `display` without a name: locals, upvalues and globals of the current frame.
#[must_use]
pub fn display_all(introspection: &Introspection<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    push_section(&mut lines, "locals", "No locals found", &introspection.locals(0));
    push_section(
        &mut lines,
        "upvalues",
        "No upvalues found",
        &introspection.upvalues(0),
    );
    push_section(
        &mut lines,
        "globals",
        "No globals found",
        &introspection.globals(),
    );
    lines
}

/// `display name`: the resolved variable, tables expanded one level.
#[must_use]
pub fn display_resolved(name: &str, resolved: &Resolved) -> Vec<String> {
    let Some(variable) = resolved.variable() else {
        return vec![format!("Did not find {name}")];
    };
    match &variable.value {
        RuntimeValue::Table(view) => {
            let mut lines = vec![format!("table {} {{", variable.name)];
            if let Some(view) = view {
                lines.extend(
                    view.rendered()
                        .map(|(key, value)| format!("  {}[{key}]={value},", variable.name)),
                );
            }
            lines.push("}".to_string());
            lines
        }
        value => vec![format!(
            "{} {}={}",
            value.type_name(),
            variable.name,
            value.render()
        )],
    }
}

/// `print stack`: value slots from the top down.
#[must_use]
pub fn print_value_stack(values: &[RuntimeValue]) -> Vec<String> {
    if values.is_empty() {
        return vec!["value stack is empty".to_string()];
    }
    values
        .iter()
        .enumerate()
        .rev()
        .map(|(index, value)| match value {
            RuntimeValue::String(_) => format!("{}: `{}'", index + 1, value.render()),
            other => format!("{}: {}", index + 1, other.render()),
        })
        .collect()
}

/// `print trace`: one row per level, innermost first.
#[must_use]
pub fn print_trace(introspection: &Introspection<'_>) -> Vec<String> {
    let mut lines = vec![TRACE_HEADER.to_string()];
    for (level, info) in introspection.frames().iter().enumerate() {
        let line = info.current_line.map_or(-1, i64::from);
        let defined = info.line_defined.map_or(-1, i64::from);
        lines.push(format!(
            "{level}# {},{},{},{},{line},{defined}",
            info.name.as_deref().unwrap_or_default(),
            info.name_kind.map(|kind| kind.as_str()).unwrap_or_default(),
            info.kind.as_str(),
            info.source,
        ));
    }
    lines
}

/// `print breakpoints` for one script.
#[must_use]
pub fn print_breakpoints(script: &ScriptId, lines: &[u32]) -> Vec<String> {
    if lines.is_empty() {
        return vec!["no breakpoints set".to_string()];
    }
    let mut out = vec!["breakpoints:".to_string()];
    out.extend(lines.iter().map(|line| format!(" {script} line {line}")));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{TableEntry, TableView};

    #[test]
    fn display_expands_a_named_table() {
        let table = RuntimeValue::Table(Some(TableView::new(vec![
            TableEntry::new(RuntimeValue::String("a".into()), RuntimeValue::Integer(1)),
            TableEntry::new(RuntimeValue::Integer(2), RuntimeValue::Table(None)),
        ])));
        let resolved = Resolved::Global(Variable::new("t", table));
        expect_test::expect![[r#"
            table t {
              t[a]=1,
              t[2]=table,
            }"#]]
        .assert_eq(&display_resolved("t", &resolved).join("\n"));

        assert_eq!(
            display_resolved("nope", &Resolved::NotFound),
            vec!["Did not find nope"]
        );
        let scalar = Resolved::Local(Variable::new("x", RuntimeValue::Integer(4)));
        assert_eq!(display_resolved("x", &scalar), vec!["number x=4"]);
    }

    #[test]
    fn value_stack_prints_top_down() {
        let values = [RuntimeValue::Integer(1), RuntimeValue::String("s".into())];
        assert_eq!(print_value_stack(&values), vec!["2: `s'", "1: 1"]);
        assert_eq!(print_value_stack(&[]), vec!["value stack is empty"]);
    }

    #[test]
    fn breakpoint_listing() {
        let script = ScriptId::new("t.lua");
        assert_eq!(print_breakpoints(&script, &[]), vec!["no breakpoints set"]);
        assert_eq!(
            print_breakpoints(&script, &[2, 7]),
            vec!["breakpoints:", " t.lua line 2", " t.lua line 7"]
        );
    }
}
