use std::thread;
use std::time::Duration;

use log::{debug, trace};

use crate::engine_bound::Command;
use crate::error::Result;
use crate::transport::Transport;
use crate::uci::{CommunicationDirection, UciMove};

pub const READY_OK: &str = "readyok";
pub const INFO_PREFIX: &str = "info";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Speaks UCI over a [`Transport`], one request at a time.
#[derive(Debug)]
pub struct ProtocolDriver<T> {
    transport: T,
    debug: bool,
    poll_interval: Duration,
}

/// Terminates `text` with a single newline unless it already ends with one.
pub fn frame(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{}\n", text)
    }
}

fn is_info(line: &str) -> bool {
    line.split_whitespace().next() == Some(INFO_PREFIX)
}

impl<T: Transport> ProtocolDriver<T> {
    pub fn new(transport: T) -> Self {
        ProtocolDriver {
            transport,
            debug: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// When on, `info` lines are traced instead of silently dropped.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Writes one line to the engine.
    pub fn send_line(&mut self, text: &str) -> Result<()> {
        debug!(
            "{}: '{}'",
            CommunicationDirection::GuiToEngine.speaker(),
            text.trim_end()
        );
        self.transport.write(&frame(text))
    }

    pub fn send_command(&mut self, command: &Command) -> Result<()> {
        self.send_line(&command.serialize())
    }

    /// Next non-`info` line, if one has arrived. Never waits.
    pub fn poll_line(&mut self) -> Result<Option<String>> {
        while let Some(raw) = self.transport.try_read_line()? {
            let line = raw.trim_end_matches(&['\r', '\n'][..]);

            if is_info(line) {
                if self.debug {
                    trace!(
                        "{}: '{}'",
                        CommunicationDirection::EngineToGui.speaker(),
                        line
                    );
                }
                continue;
            }

            debug!(
                "{}: '{}'",
                CommunicationDirection::EngineToGui.speaker(),
                line
            );
            return Ok(Some(line.to_string()));
        }

        Ok(None)
    }

    /// Sends `isready` and checks the first line already available.
    ///
    /// Returns `false` right away when the engine has not answered yet. Every
    /// call sends another `isready`, so a caller that polls this in a loop may
    /// leave late `readyok` lines behind; [`ProtocolDriver::poll_ready`] waits
    /// on an outstanding request without sending a new one.
    pub fn is_ready(&mut self) -> Result<bool> {
        self.send_command(&Command::IsReady)?;
        self.poll_ready()
    }

    /// Checks the next available line for `readyok` without sending anything.
    pub fn poll_ready(&mut self) -> Result<bool> {
        Ok(self.poll_line()?.as_deref() == Some(READY_OK))
    }

    /// Asks the engine to think for `movetime` milliseconds and waits for its answer.
    ///
    /// Blank lines and late `readyok` replies to earlier `isready` checks are
    /// skipped. There is no timeout: the engine is trusted to answer eventually.
    pub fn request_best_move(&mut self, movetime: u64) -> Result<String> {
        self.send_command(&Command::Go { movetime })?;

        loop {
            match self.poll_line()? {
                Some(line) if line == READY_OK => {
                    debug!("dropping late '{}'", READY_OK);
                }
                Some(line) if !line.trim().is_empty() => return Ok(line),
                _ => thread::sleep(self.poll_interval),
            }
        }
    }

    /// Sends the position as a start (the initial position when `fen` is `None`)
    /// plus the moves played from it.
    pub fn send_position(&mut self, fen: Option<&str>, moves: &[UciMove]) -> Result<()> {
        self.send_command(&Command::Position {
            fen: fen.map(|f| f.to_string()),
            moves: moves.to_vec(),
        })
    }
}
