//! Session transport.
//! - Console: prompt + line reads, replies on one output stream
//! - Remote: command stream with reassembly, separate event stream

#![allow(missing_docs)]

use std::io::{self, BufRead, BufReader, Read, Write};

use crate::error::EngineError;
use crate::wire::EngineEvent;

/// Prompt printed before each console read.
pub const PROMPT: &str = "ldb> ";

/// Reads allowed to complete one remote command.
pub const MAX_COMMAND_READS: usize = 5;

const READ_CHUNK: usize = 512;

/// Which transport a channel uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Console,
    Remote,
}

/// Interactive console: one input, one output, no event stream.
pub struct Console {
    input: Box<dyn BufRead + Send>,
    output: Box<dyn Write + Send>,
}

/// Remote IDE: commands and replies on one stream, events on another.
pub struct RemotePair {
    commands: Box<dyn Read + Send>,
    replies: Box<dyn Write + Send>,
    events: Box<dyn Write + Send>,
    /// Bytes received past the last newline.
    pending: Vec<u8>,
}

/// The one transport owned by a debugger session.
pub enum SessionChannel {
    Console(Console),
    Remote(RemotePair),
}

impl std::fmt::Debug for SessionChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionChannel")
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}

impl SessionChannel {
    /// Console over arbitrary streams.
    pub fn console(
        input: impl BufRead + Send + 'static,
        output: impl Write + Send + 'static,
    ) -> Self {
        Self::Console(Console {
            input: Box::new(input),
            output: Box::new(output),
        })
    }

    /// Console over the process's stdin/stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::console(BufReader::new(io::stdin()), io::stdout())
    }

    /// Remote pair. `commands`/`replies` are usually two handles of one socket.
    pub fn remote(
        commands: impl Read + Send + 'static,
        replies: impl Write + Send + 'static,
        events: impl Write + Send + 'static,
    ) -> Self {
        Self::Remote(RemotePair {
            commands: Box::new(commands),
            replies: Box::new(replies),
            events: Box::new(events),
            pending: Vec::new(),
        })
    }

    #[must_use]
    pub fn kind(&self) -> ChannelKind {
        match self {
            Self::Console(_) => ChannelKind::Console,
            Self::Remote(_) => ChannelKind::Remote,
        }
    }

    /// Block until one full command line is available.
    ///
    /// The returned line still carries its line terminator.
    pub fn read_command(&mut self) -> Result<String, EngineError> {
        match self {
            Self::Console(console) => console.read_line(),
            Self::Remote(remote) => remote.read_line(),
        }
    }

    /// Send one reply line (a newline is appended).
    pub fn reply(&mut self, text: &str) -> Result<(), EngineError> {
        let output = match self {
            Self::Console(console) => &mut console.output,
            Self::Remote(remote) => &mut remote.replies,
        };
        writeln!(output, "{text}")?;
        output.flush()?;
        Ok(())
    }

    /// Push a lifecycle event. The console has no event stream, so events
    /// only reach the log there.
    pub fn event(&mut self, event: &EngineEvent) -> Result<(), EngineError> {
        match self {
            Self::Console(_) => {
                tracing::debug!(%event, "session event");
                Ok(())
            }
            Self::Remote(remote) => {
                tracing::debug!(%event, "sending event");
                writeln!(remote.events, "{event}")?;
                remote.events.flush()?;
                Ok(())
            }
        }
    }
}

impl Console {
    fn read_line(&mut self) -> Result<String, EngineError> {
        self.output.write_all(PROMPT.as_bytes())?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(EngineError::ChannelClosed);
        }
        Ok(line)
    }
}

impl RemotePair {
    fn take_line(&mut self) -> Option<String> {
        let end = self.pending.iter().position(|byte| *byte == b'\n')?;
        let line: Vec<u8> = self.pending.drain(..=end).collect();
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    fn read_line(&mut self) -> Result<String, EngineError> {
        let mut attempts = 0;
        loop {
            if let Some(line) = self.take_line() {
                return Ok(line);
            }
            if attempts >= MAX_COMMAND_READS {
                return Err(EngineError::UnterminatedCommand { attempts });
            }
            let mut chunk = [0u8; READ_CHUNK];
            let read = match self.commands.read(&mut chunk) {
                Ok(read) => read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };
            attempts += 1;
            if read == 0 {
                return Err(EngineError::ChannelClosed);
            }
            self.pending.extend_from_slice(&chunk[..read]);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::wire::{ResumeReason, SuspendReason};

    /// Reader that hands out one chunk per `read` call.
    struct Chunks(VecDeque<Vec<u8>>);

    impl Read for Chunks {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let Some(chunk) = self.0.pop_front() else {
                return Ok(0);
            };
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    fn chunks(parts: &[&str]) -> Chunks {
        Chunks(parts.iter().map(|part| part.as_bytes().to_vec()).collect())
    }

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Shared {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn remote_reassembles_split_commands() {
        let mut channel = SessionChannel::remote(
            chunks(&["bre", "ak ", "5\nste", "p\n"]),
            io::sink(),
            io::sink(),
        );
        assert_eq!(channel.read_command().unwrap(), "break 5\n");
        assert_eq!(channel.read_command().unwrap(), "step\n");
        assert!(matches!(
            channel.read_command(),
            Err(EngineError::ChannelClosed)
        ));
    }

    #[test]
    fn remote_gives_up_after_bounded_reads() {
        let mut channel = SessionChannel::remote(
            chunks(&["a", "b", "c", "d", "e", "f\n"]),
            io::sink(),
            io::sink(),
        );
        let err = channel.read_command().unwrap_err();
        assert!(matches!(
            err,
            EngineError::UnterminatedCommand {
                attempts: MAX_COMMAND_READS
            }
        ));
        assert_eq!(
            err.to_string(),
            "could not get full command string after 5 reads"
        );
    }

    #[test]
    fn remote_replies_and_events_use_separate_streams() {
        let replies = Shared::default();
        let events = Shared::default();
        let mut channel =
            SessionChannel::remote(chunks(&[]), replies.clone(), events.clone());

        channel.reply("ok").unwrap();
        channel
            .event(&EngineEvent::Resumed(ResumeReason::Step))
            .unwrap();
        channel
            .event(&EngineEvent::Suspended(SuspendReason::Step))
            .unwrap();

        assert_eq!(replies.text(), "ok\n");
        assert_eq!(events.text(), "resumed step\nsuspended step\n");
        assert_eq!(channel.kind(), ChannelKind::Remote);
    }

    #[test]
    fn console_prompts_and_drops_events() {
        let output = Shared::default();
        let mut channel = SessionChannel::console(Cursor::new("list\n"), output.clone());

        assert_eq!(channel.read_command().unwrap(), "list\n");
        channel.event(&EngineEvent::Started).unwrap();
        channel.reply("done").unwrap();
        assert!(matches!(
            channel.read_command(),
            Err(EngineError::ChannelClosed)
        ));

        assert_eq!(output.text(), "ldb> done\nldb> ");
        assert_eq!(channel.kind(), ChannelKind::Console);
    }
}
