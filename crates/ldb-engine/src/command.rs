//! Operator and IDE command parsing.
//!
//! Verbs are matched by minimum prefix: the first token must start with the
//! verb's shortest accepted spelling, so `ste`, `step` and `stepping` are all
//! `step`. Verbs are tried in a fixed order, which is what keeps `sta`
//! (stack for IDE) and `su` (suspend) from shadowing each other.

#![allow(missing_docs)]

use smol_str::SmolStr;

use crate::error::CommandError;

/// Summary printed by `help`.
pub const HELP_TEXT: &str = "list firstline [lastline]\nbreak line\nclear line\ndisplay [varname]\nstep\ncontinue\nprint stack|trace|breakpoints\nquit\nhelp\n";

/// First line of the `help` reply.
pub const HELP_HINT: &str = "commands can be shortened to 1 or 2 letters, e.g. l for list";

/// What `print` dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintTarget {
    /// Raw value slots of the current frame.
    Stack,
    /// Call-stack trace.
    Trace,
    /// Breakpoints of the current script.
    Breakpoints,
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List { first: u32, last: Option<u32> },
    SetBreak(u32),
    ClearBreak(u32),
    Display(Option<SmolStr>),
    Assign,
    Step,
    Continue,
    Print(PrintTarget),
    Suspend,
    IdeStackTrace,
    IdeVar { frame: usize, name: SmolStr },
    IdeStackDump,
    IdeGlobals,
    Quit,
    Help,
    Unknown(SmolStr),
}

#[derive(Debug, Clone, Copy)]
enum Verb {
    Globals,
    Data,
    Var,
    StackForIde,
    Suspend,
    List,
    Break,
    Clear,
    Display,
    Assign,
    Step,
    Continue,
    Resume,
    Print,
    Quit,
    Help,
}

/// Minimum prefixes, in matching order.
const VERBS: &[(&str, Verb)] = &[
    ("getglobals", Verb::Globals),
    ("data", Verb::Data),
    ("var", Verb::Var),
    ("sta", Verb::StackForIde),
    ("su", Verb::Suspend),
    ("l", Verb::List),
    ("b", Verb::Break),
    ("cl", Verb::Clear),
    ("d", Verb::Display),
    ("a", Verb::Assign),
    ("ste", Verb::Step),
    ("co", Verb::Continue),
    ("resume", Verb::Resume),
    ("p", Verb::Print),
    ("q", Verb::Quit),
    ("help", Verb::Help),
];

fn match_verb(token: &str) -> Option<Verb> {
    VERBS
        .iter()
        .find(|(prefix, _)| token.starts_with(prefix))
        .map(|(_, verb)| *verb)
}

impl Command {
    /// Parse one input line.
    ///
    /// Returns `Ok(None)` for a blank line. Unknown verbs parse to
    /// [`Command::Unknown`]; bad arguments are a [`CommandError`].
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut tokens = line.split_whitespace();
        let Some(token) = tokens.next() else {
            return Ok(None);
        };
        let Some(verb) = match_verb(token) else {
            return Ok(Some(Self::Unknown(token.into())));
        };
        let command = match verb {
            Verb::Globals => Self::IdeGlobals,
            Verb::Data => Self::IdeStackDump,
            Verb::StackForIde => Self::IdeStackTrace,
            Verb::Suspend => Self::Suspend,
            Verb::Var => {
                let frame = tokens.next().and_then(|t| t.parse().ok()).unwrap_or(0);
                let name = tokens.next().ok_or(CommandError::MissingVariable)?;
                Self::IdeVar {
                    frame,
                    name: name.into(),
                }
            }
            Verb::List => {
                let first = match tokens.next() {
                    Some(text) => positive(text).ok_or(CommandError::InvalidRange)?,
                    None => 1,
                };
                let last = tokens
                    .next()
                    .map(|text| positive(text).ok_or(CommandError::InvalidRange))
                    .transpose()?;
                if last.is_some_and(|last| last < first) {
                    return Err(CommandError::InvalidRange);
                }
                Self::List { first, last }
            }
            Verb::Break => Self::SetBreak(line_argument(tokens.next())?),
            Verb::Clear => Self::ClearBreak(line_argument(tokens.next())?),
            Verb::Display => Self::Display(tokens.next().map(SmolStr::from)),
            Verb::Assign => Self::Assign,
            Verb::Step => Self::Step,
            Verb::Continue | Verb::Resume => Self::Continue,
            Verb::Print => {
                let target = tokens.next().unwrap_or_default();
                match target {
                    "stack" => Self::Print(PrintTarget::Stack),
                    "trace" => Self::Print(PrintTarget::Trace),
                    "breakpoints" => Self::Print(PrintTarget::Breakpoints),
                    other => return Err(CommandError::UnknownPrintTarget(other.into())),
                }
            }
            Verb::Quit => Self::Quit,
            Verb::Help => Self::Help,
        };
        Ok(Some(command))
    }

    /// Whether the command hands execution back to the debuggee.
    #[must_use]
    pub fn resumes(&self) -> bool {
        matches!(self, Self::Step | Self::Continue | Self::Quit)
    }
}

fn positive(text: &str) -> Option<u32> {
    text.parse::<u32>().ok().filter(|value| *value > 0)
}

fn line_argument(token: Option<&str>) -> Result<u32, CommandError> {
    token.and_then(positive).ok_or(CommandError::InvalidLine)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        Command::parse(line).unwrap().unwrap()
    }

    #[test]
    fn step_matches_from_minimum_prefix() {
        assert_eq!(parse("ste"), Command::Step);
        assert_eq!(parse("step"), Command::Step);
        assert_eq!(parse("stepping"), Command::Step);
        assert_eq!(parse("s"), Command::Unknown("s".into()));
        assert_eq!(parse("c"), Command::Unknown("c".into()));
        assert_eq!(parse("h"), Command::Unknown("h".into()));
    }

    #[test]
    fn ide_verbs_win_over_shorter_prefixes() {
        assert_eq!(parse("data"), Command::IdeStackDump);
        assert_eq!(parse("display"), Command::Display(None));
        assert_eq!(parse("stackforide"), Command::IdeStackTrace);
        assert_eq!(parse("suspend"), Command::Suspend);
        assert_eq!(parse("getglobals"), Command::IdeGlobals);
        assert_eq!(parse("resume"), Command::Continue);
        assert_eq!(parse("co"), Command::Continue);
        assert_eq!(parse("cl 4"), Command::ClearBreak(4));
        assert_eq!(parse("help"), Command::Help);
        assert_eq!(parse("q"), Command::Quit);
    }

    #[test]
    fn list_arguments() {
        assert_eq!(parse("l"), Command::List { first: 1, last: None });
        assert_eq!(
            parse("list 3 8\r\n"),
            Command::List {
                first: 3,
                last: Some(8)
            }
        );
        assert_eq!(Command::parse("l 0"), Err(CommandError::InvalidRange));
        assert_eq!(Command::parse("l x"), Err(CommandError::InvalidRange));
        assert_eq!(Command::parse("l 2 0"), Err(CommandError::InvalidRange));
        assert_eq!(Command::parse("l 5 3"), Err(CommandError::InvalidRange));
    }

    #[test]
    fn breakpoint_lines_must_be_positive() {
        assert_eq!(parse("b 12"), Command::SetBreak(12));
        assert_eq!(Command::parse("break"), Err(CommandError::InvalidLine));
        assert_eq!(Command::parse("break zero"), Err(CommandError::InvalidLine));
        assert_eq!(Command::parse("clear 0"), Err(CommandError::InvalidLine));
    }

    #[test]
    fn print_and_var_arguments() {
        assert_eq!(parse("p trace"), Command::Print(PrintTarget::Trace));
        assert_eq!(
            Command::parse("print heap"),
            Err(CommandError::UnknownPrintTarget("heap".into()))
        );
        assert_eq!(
            parse("var 1 total"),
            Command::IdeVar {
                frame: 1,
                name: "total".into()
            }
        );
        assert_eq!(Command::parse("var 0"), Err(CommandError::MissingVariable));
        assert_eq!(parse("d x"), Command::Display(Some("x".into())));
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(Command::parse(""), Ok(None));
        assert_eq!(Command::parse("  \r\n"), Ok(None));
    }

    #[test]
    fn only_execution_commands_resume() {
        assert!(Command::Step.resumes());
        assert!(Command::Continue.resumes());
        assert!(Command::Quit.resumes());
        assert!(!Command::Help.resumes());
        assert!(!Command::Suspend.resumes());
    }
}
