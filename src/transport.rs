//! Line channels between the driver and an engine.

use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use log::{debug, warn};

use crate::error::{Result, UciError};

/// A bidirectional text channel to a running engine.
pub trait Transport {
    /// Writes `text` as is. Framing is the caller's job.
    fn write(&mut self, text: &str) -> Result<()>;

    /// Returns the next complete line if one has already arrived, without waiting.
    fn try_read_line(&mut self) -> Result<Option<String>>;
}

fn disconnected() -> UciError {
    UciError::EngineIo(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "engine closed its output",
    ))
}

/// In-process transport backed by two mpsc channels.
#[derive(Debug)]
pub struct ChannelTransport {
    outbound: Sender<String>,
    inbound: Receiver<String>,
}

/// The engine's end of a [`ChannelTransport`].
#[derive(Debug)]
pub struct EngineHandle {
    outbound: Sender<String>,
    inbound: Receiver<String>,
}

impl ChannelTransport {
    pub fn pair() -> (ChannelTransport, EngineHandle) {
        let (to_engine, from_driver) = mpsc::channel();
        let (to_driver, from_engine) = mpsc::channel();

        (
            ChannelTransport {
                outbound: to_engine,
                inbound: from_engine,
            },
            EngineHandle {
                outbound: to_driver,
                inbound: from_driver,
            },
        )
    }
}

impl Transport for ChannelTransport {
    fn write(&mut self, text: &str) -> Result<()> {
        self.outbound.send(text.to_string()).map_err(|_| {
            UciError::EngineIo(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "engine end of the channel is gone",
            ))
        })
    }

    fn try_read_line(&mut self) -> Result<Option<String>> {
        match self.inbound.try_recv() {
            Ok(line) => Ok(Some(line)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(disconnected()),
        }
    }
}

impl EngineHandle {
    /// Queues a line for the driver to read.
    pub fn send(&self, line: &str) {
        // A dropped driver simply never reads it.
        let _ = self.outbound.send(line.to_string());
    }

    /// Everything the driver wrote since the last call, one entry per line.
    pub fn received(&self) -> Vec<String> {
        self.inbound
            .try_iter()
            .flat_map(|text| {
                text.lines()
                    .map(|l| l.to_string())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Unsplit writes, newlines included.
    pub fn received_raw(&self) -> Vec<String> {
        self.inbound.try_iter().collect()
    }
}

/// An engine running as a child process, spoken to over its stdin and stdout.
///
/// Stdout is read on a background thread so reading never blocks the caller.
/// Dropping the transport kills the engine.
#[derive(Debug)]
pub struct ProcessTransport {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<String>,
}

impl ProcessTransport {
    pub fn spawn(path: &Path) -> Result<ProcessTransport> {
        check_engine(path)?;

        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        debug!("spawned engine {} (pid {})", path.display(), child.id());

        let stdin = child.stdin.take().ok_or_else(|| {
            UciError::EngineIo(io::Error::new(io::ErrorKind::BrokenPipe, "engine has no stdin"))
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            UciError::EngineIo(io::Error::new(io::ErrorKind::BrokenPipe, "engine has no stdout"))
        })?;

        let (tx, lines) = mpsc::channel();
        thread::Builder::new()
            .name("uci-engine-stdout".to_string())
            .spawn(move || {
                for line in BufReader::new(stdout).lines() {
                    match line {
                        Ok(line) => {
                            if tx.send(line).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("error reading from engine: {}", e);
                            break;
                        }
                    }
                }
            })?;

        Ok(ProcessTransport { child, stdin, lines })
    }
}

fn check_engine(path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|_| UciError::EngineNotFound(path.to_path_buf()))?;
    if !metadata.is_file() {
        return Err(UciError::EngineNotFound(path.to_path_buf()));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(UciError::EngineNotExecutable(path.to_path_buf()));
        }
    }

    Ok(())
}

impl Transport for ProcessTransport {
    fn write(&mut self, text: &str) -> Result<()> {
        self.stdin.write_all(text.as_bytes())?;
        self.stdin.flush()?;
        Ok(())
    }

    fn try_read_line(&mut self) -> Result<Option<String>> {
        match self.lines.try_recv() {
            Ok(line) => Ok(Some(line)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(disconnected()),
        }
    }
}

impl Drop for ProcessTransport {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_round_trip() {
        let (mut transport, engine) = ChannelTransport::pair();

        transport.write("isready\n").unwrap();
        assert_eq!(engine.received(), vec!["isready".to_string()]);
        assert!(engine.received().is_empty());

        assert_eq!(transport.try_read_line().unwrap(), None);
        engine.send("readyok");
        assert_eq!(transport.try_read_line().unwrap(), Some("readyok".to_string()));
        assert_eq!(transport.try_read_line().unwrap(), None);
    }

    #[test]
    fn test_channel_disconnect() {
        let (mut transport, engine) = ChannelTransport::pair();
        engine.send("bestmove e2e4");
        drop(engine);

        assert_eq!(
            transport.try_read_line().unwrap(),
            Some("bestmove e2e4".to_string())
        );
        assert!(matches!(
            transport.try_read_line(),
            Err(UciError::EngineIo(_))
        ));
        assert!(transport.write("quit\n").is_err());
    }

    #[test]
    fn test_spawn_missing_engine() {
        let path = Path::new("/definitely/not/an/engine");
        assert!(matches!(
            ProcessTransport::spawn(path),
            Err(UciError::EngineNotFound(p)) if p == path
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_not_executable() {
        let path = std::env::temp_dir().join(format!("uci-driver-not-exec-{}", std::process::id()));
        std::fs::write(&path, "not an engine").unwrap();

        let result = ProcessTransport::spawn(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(UciError::EngineNotExecutable(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_cat_echoes_lines() {
        let cat = Path::new("/bin/cat");
        if !cat.exists() {
            return;
        }

        let mut transport = ProcessTransport::spawn(cat).unwrap();
        transport.write("readyok\n").unwrap();

        let mut line = None;
        for _ in 0..200 {
            line = transport.try_read_line().unwrap();
            if line.is_some() {
                break;
            }
            thread::sleep(std::time::Duration::from_millis(10));
        }
        assert_eq!(line, Some("readyok".to_string()));
    }
}
