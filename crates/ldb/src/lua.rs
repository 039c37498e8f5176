//! Lua runtime adapter.
//! - LuaHost: runtime with the debug library, line hook, protected runs
//! - LuaStack: StackInspector over the live Lua stack
//! - value snapshots: Lua values to RuntimeValue, tables one level deep

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use ldb_engine::{
    traceback, FrameInfo, FrameKind, HookAction, Introspection, LineHook, NameKind,
    RuntimeValue, ScriptId, StackInspector, TableEntry, TableView, Variable,
};
use mlua::{DebugEvent, Function, HookTriggers, Lua, Table, Value, VmState};
use parking_lot::Mutex;
use smol_str::SmolStr;

use crate::error::HostError;

/// The `debug` library functions the inspector calls.
///
/// Captured once when the runtime is created so a script that reassigns the
/// `debug` global cannot blind the debugger.
#[derive(Clone)]
pub struct DebugLibrary {
    getlocal: Function,
    getupvalue: Function,
    getinfo: Function,
}

impl DebugLibrary {
    fn capture(lua: &Lua) -> Result<Self, HostError> {
        let debug: Table = lua.globals().get("debug")?;
        Ok(Self {
            getlocal: debug.get("getlocal")?,
            getupvalue: debug.get("getupvalue")?,
            getinfo: debug.get("getinfo")?,
        })
    }
}

/// A Lua 5.4 runtime prepared for debugging.
pub struct LuaHost {
    lua: Lua,
    debug: DebugLibrary,
}

impl LuaHost {
    /// A fresh runtime with the standard libraries, `debug` included.
    pub fn new() -> Result<Self, HostError> {
        // SAFETY: the debug library is the only unsafe library loaded and it is
        // only reached through the inspector and the script itself; no C
        // modules are loaded and the state never leaves this thread.
        #[allow(unsafe_code)]
        let lua = unsafe { Lua::unsafe_new() };
        let debug = DebugLibrary::capture(&lua)?;
        Ok(Self { lua, debug })
    }

    /// The underlying runtime.
    #[must_use]
    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// Forward every line event to `hook`.
    ///
    /// When the hook detaches, the runtime hook is removed and the script runs
    /// on at full speed.
    pub fn attach<H>(&self, hook: Arc<Mutex<H>>)
    where
        H: LineHook + 'static,
    {
        let library = self.debug.clone();
        self.lua
            .set_hook(HookTriggers::new().every_line(), move |lua, debug| {
                if !matches!(debug.event(), DebugEvent::Line) {
                    return Ok(VmState::Continue);
                }
                let Ok(line) = u32::try_from(debug.curr_line()) else {
                    return Ok(VmState::Continue);
                };
                let script = {
                    let source = debug.source();
                    ScriptId::from_chunk_name(source.source.as_deref().unwrap_or("?"))
                };
                let stack = LuaStack::new(lua, &library, 0);
                let action = hook.lock().on_line(&stack, &script, line);
                if action == HookAction::Detach {
                    tracing::debug!(%script, line, "detaching line hook");
                    lua.remove_hook();
                }
                Ok(VmState::Continue)
            });
    }

    /// Compile `code` under `chunk_name` and run it with a traceback handler.
    pub fn run(&self, chunk_name: &str, code: &str) -> Result<(), HostError> {
        let chunk = self
            .lua
            .load(code)
            .set_name(chunk_name)
            .into_function()
            .map_err(|err| HostError::Syntax(lua_message(&err)))?;

        let handled = Rc::new(Cell::new(false));
        let handler = {
            let handled = Rc::clone(&handled);
            let library = self.debug.clone();
            self.lua.create_function(move |lua, message: Value| {
                handled.set(true);
                // Level 0 is this handler; the error was raised one level up.
                let stack = LuaStack::new(lua, &library, 1);
                let frames = Introspection::new(&stack).frames();
                Ok(traceback(&error_text(&message), &frames))
            })?
        };

        let xpcall: Function = self.lua.globals().get("xpcall")?;
        match xpcall.call::<(bool, Value)>((chunk, handler)) {
            Ok((true, _)) => Ok(()),
            Ok((false, result)) => {
                let text = error_text(&result);
                if !handled.get() {
                    return Err(HostError::OutOfMemory(text));
                }
                let message = text.lines().next().unwrap_or_default().to_string();
                Err(HostError::Runtime {
                    message,
                    traceback: text,
                })
            }
            Err(mlua::Error::MemoryError(message)) => Err(HostError::OutOfMemory(message)),
            Err(err) => Err(HostError::Runtime {
                message: lua_message(&err),
                traceback: err.to_string(),
            }),
        }
    }
}

/// Readable text of a Lua error, without mlua's wrapping.
fn lua_message(err: &mlua::Error) -> String {
    match err {
        mlua::Error::SyntaxError { message, .. } | mlua::Error::RuntimeError(message) => {
            message.clone()
        }
        other => other.to_string(),
    }
}

fn error_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.to_string_lossy().to_string(),
        Value::Integer(_) | Value::Number(_) => snapshot(value, false).render(),
        Value::Error(err) => err.to_string(),
        other => format!("(error object is a {} value)", other.type_name()),
    }
}

/// [`StackInspector`] over the Lua stack as seen from inside a hook or
/// error handler.
pub struct LuaStack<'a> {
    lua: &'a Lua,
    library: &'a DebugLibrary,
    /// Runtime levels hidden below level 0 (the handler frame, if any).
    base: usize,
}

impl<'a> LuaStack<'a> {
    /// Inspector whose level 0 is runtime level `base`.
    #[must_use]
    pub fn new(lua: &'a Lua, library: &'a DebugLibrary, base: usize) -> Self {
        Self { lua, library, base }
    }

    fn inspect_level(&self, level: usize) -> usize {
        level + self.base
    }

    /// Level as seen by a `debug.*` function, which is itself level 0.
    fn library_level(&self, level: usize) -> usize {
        level + self.base + 1
    }

    fn is_native(&self, level: usize) -> bool {
        self.lua
            .inspect_stack(self.inspect_level(level))
            .is_some_and(|debug| debug.source().what == "C")
    }

    fn function_at(&self, level: usize) -> Option<Function> {
        let info: Option<Table> = self
            .library
            .getinfo
            .call((self.library_level(level), "f"))
            .ok()?;
        info?.get("func").ok()
    }
}

impl StackInspector for LuaStack<'_> {
    fn depth(&self) -> usize {
        let mut depth = 0;
        while self.lua.inspect_stack(self.inspect_level(depth)).is_some() {
            depth += 1;
        }
        // The bottom level is the native `xpcall` the chunk runs under.
        if depth > 0 && self.is_native(depth - 1) {
            depth - 1
        } else {
            depth
        }
    }

    fn frame(&self, level: usize) -> Option<FrameInfo> {
        let debug = self.lua.inspect_stack(self.inspect_level(level))?;
        let names = debug.names();
        let source = debug.source();
        let chunk = source.source.as_deref().unwrap_or("?");
        Some(FrameInfo {
            name: names.name.as_deref().map(SmolStr::new),
            name_kind: names.name_what.as_deref().and_then(NameKind::parse),
            kind: FrameKind::parse(source.what),
            source: SmolStr::new(ScriptId::from_chunk_name(chunk).as_str()),
            current_line: u32::try_from(debug.curr_line()).ok(),
            line_defined: source
                .line_defined
                .and_then(|line| u32::try_from(line).ok()),
        })
    }

    fn locals(&self, level: usize) -> Vec<Variable> {
        let mut locals = Vec::new();
        for index in 1.. {
            let slot = self
                .library
                .getlocal
                .call::<(Option<String>, Value)>((self.library_level(level), index));
            match slot {
                Ok((Some(name), value)) => locals.push(Variable::new(name, snapshot(&value, true))),
                Ok((None, _)) => break,
                Err(err) => {
                    tracing::debug!(%err, level, "getlocal failed");
                    break;
                }
            }
        }
        locals
    }

    fn upvalues(&self, level: usize) -> Vec<Variable> {
        let Some(function) = self.function_at(level) else {
            return Vec::new();
        };
        let mut upvalues = Vec::new();
        for index in 1.. {
            let slot = self
                .library
                .getupvalue
                .call::<(Option<String>, Value)>((function.clone(), index));
            match slot {
                Ok((Some(name), value)) => {
                    upvalues.push(Variable::new(name, snapshot(&value, true)));
                }
                Ok((None, _)) => break,
                Err(err) => {
                    tracing::debug!(%err, level, "getupvalue failed");
                    break;
                }
            }
        }
        upvalues
    }

    fn globals(&self) -> Vec<Variable> {
        let globals = self.lua.globals();
        globals
            .pairs::<Value, Value>()
            .filter_map(Result::ok)
            .map(|(key, value)| {
                Variable::new(snapshot(&key, false).render(), snapshot(&value, true))
            })
            .collect()
    }

    fn value_stack(&self) -> Vec<RuntimeValue> {
        self.locals(0)
            .into_iter()
            .map(|variable| variable.value)
            .collect()
    }
}

/// Snapshot a Lua value. Tables are listed one level deep when `expand` is
/// set; nested tables are only named.
#[must_use]
pub fn snapshot(value: &Value, expand: bool) -> RuntimeValue {
    match value {
        Value::Nil => RuntimeValue::Nil,
        Value::Boolean(value) => RuntimeValue::Boolean(*value),
        Value::Integer(value) => RuntimeValue::Integer(*value),
        Value::Number(value) => RuntimeValue::Number(*value),
        Value::String(text) => RuntimeValue::String(text.to_string_lossy().to_string()),
        Value::Table(table) if expand => RuntimeValue::Table(Some(table_view(table))),
        Value::Table(_) => RuntimeValue::Table(None),
        Value::Function(_) => RuntimeValue::Function,
        other => RuntimeValue::Other(SmolStr::new(other.type_name())),
    }
}

fn table_view(table: &Table) -> TableView {
    let entries = table
        .clone()
        .pairs::<Value, Value>()
        .filter_map(Result::ok)
        .map(|(key, value)| TableEntry::new(snapshot(&key, false), snapshot(&value, false)))
        .collect();
    TableView::new(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshots_keep_tables_shallow() {
        let host = LuaHost::new().unwrap();
        let value: Value = host
            .lua()
            .load("return { n = 1, inner = { 2 } }")
            .eval()
            .unwrap();
        let RuntimeValue::Table(Some(view)) = snapshot(&value, true) else {
            panic!("expected an expanded table");
        };
        let mut rendered: Vec<_> = view.rendered().collect();
        rendered.sort();
        assert_eq!(
            rendered,
            vec![
                ("inner".to_string(), "table".to_string()),
                ("n".to_string(), "1".to_string()),
            ]
        );
        assert_eq!(snapshot(&value, false), RuntimeValue::Table(None));
    }

    #[test]
    fn scalars_keep_their_runtime_types() {
        let host = LuaHost::new().unwrap();
        let values: mlua::MultiValue = host
            .lua()
            .load("return 3, 2.5, 'txt', true, nil, print")
            .eval()
            .unwrap();
        let snapshots: Vec<_> = values.iter().map(|value| snapshot(value, true)).collect();
        assert_eq!(
            snapshots,
            vec![
                RuntimeValue::Integer(3),
                RuntimeValue::Number(2.5),
                RuntimeValue::String("txt".into()),
                RuntimeValue::Boolean(true),
                RuntimeValue::Nil,
                RuntimeValue::Function,
            ]
        );
    }

    #[test]
    fn syntax_errors_are_reported_before_running() {
        let host = LuaHost::new().unwrap();
        let err = host.run("bad.lua", "x = = 1").unwrap_err();
        assert!(matches!(err, HostError::Syntax(_)));
        assert!(err.to_string().contains("bad.lua"));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn runtime_errors_carry_a_traceback() {
        let host = LuaHost::new().unwrap();
        let err = host
            .run("@boom.lua", "local t = nil\nlocal x = t.field\n")
            .unwrap_err();
        let HostError::Runtime { message, traceback } = &err else {
            panic!("expected a runtime error, got {err:?}");
        };
        assert!(message.contains("boom.lua:2:"), "{message}");
        assert!(traceback.contains("stack traceback:"), "{traceback}");
        assert!(traceback.contains("boom.lua:2: in main chunk"), "{traceback}");
        assert!(!traceback.contains("[C]"), "{traceback}");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn debug_library_survives_script_reassignment() {
        let host = LuaHost::new().unwrap();
        host.run("clear.lua", "debug = nil").unwrap();
        assert!(host.lua().globals().get::<Value>("debug").unwrap().is_nil());
    }
}
