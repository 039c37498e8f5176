#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use ldb_engine::{
    FrameInfo, FrameKind, NameKind, RuntimeValue, StackInspector, TableEntry, TableView, Variable,
};

/// Writer whose bytes stay readable after it is moved into a channel.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct FakeFrame {
    pub info: FrameInfo,
    pub locals: Vec<Variable>,
    pub upvalues: Vec<Variable>,
}

impl FakeFrame {
    pub fn main(source: &str, line: u32) -> Self {
        Self {
            info: FrameInfo {
                name: None,
                name_kind: None,
                kind: FrameKind::Main,
                source: source.into(),
                current_line: Some(line),
                line_defined: Some(0),
            },
            locals: Vec::new(),
            upvalues: Vec::new(),
        }
    }

    pub fn function(name: &str, source: &str, line: u32, defined: u32) -> Self {
        Self {
            info: FrameInfo {
                name: Some(name.into()),
                name_kind: Some(NameKind::Global),
                kind: FrameKind::Lua,
                source: source.into(),
                current_line: Some(line),
                line_defined: Some(defined),
            },
            locals: Vec::new(),
            upvalues: Vec::new(),
        }
    }

    pub fn with_local(mut self, name: &str, value: RuntimeValue) -> Self {
        self.locals.push(Variable::new(name, value));
        self
    }

    pub fn with_upvalue(mut self, name: &str, value: RuntimeValue) -> Self {
        self.upvalues.push(Variable::new(name, value));
        self
    }
}

/// Scripted call stack, innermost frame first.
#[derive(Default)]
pub struct FakeStack {
    pub frames: Vec<FakeFrame>,
    pub globals: Vec<Variable>,
}

impl FakeStack {
    pub fn new(frames: Vec<FakeFrame>) -> Self {
        Self {
            frames,
            globals: Vec::new(),
        }
    }

    pub fn with_global(mut self, name: &str, value: RuntimeValue) -> Self {
        self.globals.push(Variable::new(name, value));
        self
    }
}

impl StackInspector for FakeStack {
    fn depth(&self) -> usize {
        self.frames.len()
    }

    fn frame(&self, level: usize) -> Option<FrameInfo> {
        self.frames.get(level).map(|frame| frame.info.clone())
    }

    fn locals(&self, level: usize) -> Vec<Variable> {
        self.frames
            .get(level)
            .map(|frame| frame.locals.clone())
            .unwrap_or_default()
    }

    fn upvalues(&self, level: usize) -> Vec<Variable> {
        self.frames
            .get(level)
            .map(|frame| frame.upvalues.clone())
            .unwrap_or_default()
    }

    fn globals(&self) -> Vec<Variable> {
        self.globals.clone()
    }

    fn value_stack(&self) -> Vec<RuntimeValue> {
        self.frames
            .first()
            .map(|frame| frame.locals.iter().map(|v| v.value.clone()).collect())
            .unwrap_or_default()
    }
}

pub fn string(text: &str) -> RuntimeValue {
    RuntimeValue::String(text.to_string())
}

pub fn table(entries: &[(RuntimeValue, RuntimeValue)]) -> RuntimeValue {
    RuntimeValue::Table(Some(TableView::new(
        entries
            .iter()
            .map(|(key, value)| TableEntry::new(key.clone(), value.clone()))
            .collect(),
    )))
}

/// `x = 1`, `x = 2`, ... one assignment per line.
pub fn numbered_script(lines: u32) -> String {
    (1..=lines).map(|n| format!("x = {n}\n")).collect()
}
