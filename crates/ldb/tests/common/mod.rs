#![allow(dead_code)]

use std::io::{self, Cursor, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use ldb::Script;
use ldb_engine::{Debugger, ScriptId, SessionChannel};

/// Writer whose bytes stay readable after it is moved into a channel.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
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

/// Write `source` to a fresh temp file and describe it as script `name`.
pub fn script(test: &str, name: &str, source: &str, buffer: bool) -> Script {
    let dir = std::env::temp_dir().join(format!("ldb-{}-{test}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path: PathBuf = dir.join(name);
    std::fs::write(&path, source).unwrap();
    Script {
        id: ScriptId::new(name),
        path,
        buffer,
    }
}

pub fn cleanup(script: &Script) {
    if let Some(dir) = script.path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

pub fn console(input: &str) -> (Debugger, SharedBuffer) {
    let output = SharedBuffer::default();
    let channel = SessionChannel::console(Cursor::new(input.to_string()), output.clone());
    (Debugger::new(channel), output)
}

pub struct Remote {
    pub debugger: Debugger,
    pub replies: SharedBuffer,
    pub events: SharedBuffer,
}

pub fn remote(commands: &str) -> Remote {
    let replies = SharedBuffer::default();
    let events = SharedBuffer::default();
    let channel = SessionChannel::remote(
        Cursor::new(commands.as_bytes().to_vec()),
        replies.clone(),
        events.clone(),
    );
    Remote {
        debugger: Debugger::new(channel),
        replies,
        events,
    }
}
