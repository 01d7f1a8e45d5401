//! A game against an engine, one turn at a time.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use log::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::driver::{ProtocolDriver, DEFAULT_POLL_INTERVAL};
use crate::engine_bound::Command;
use crate::error::{Result, UciError};
use crate::fen::Fen;
use crate::parser::{classify, Outcome};
use crate::transport::{ProcessTransport, Transport};
use crate::uci::{Color, PieceKind, Square, UciMove};

/// Setup values for a [`GameSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionOptions {
    /// Engine executable. Required by [`GameSession::connect`].
    pub engine_path: Option<PathBuf>,
    /// Thinking time per move in milliseconds.
    pub movetime: u64,
    /// Trace the engine's `info` lines.
    pub debug: bool,
    /// Sleep between polls that found nothing to read.
    pub poll_interval: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            engine_path: None,
            movetime: 100,
            debug: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl SessionOptions {
    pub fn new<P: Into<PathBuf>>(engine_path: P) -> Self {
        Self {
            engine_path: Some(engine_path.into()),
            ..Default::default()
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SessionState {
    AwaitingReady,
    InGame,
    GameOver,
}

impl Display for SessionState {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match *self {
            SessionState::AwaitingReady => write!(f, "awaiting ready"),
            SessionState::InGame => write!(f, "in game"),
            SessionState::GameOver => write!(f, "game over"),
        }
    }
}

/// Why a session reached [`SessionState::GameOver`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GameOutcome {
    Resigned,
    NoMove,
    Quit,
}

/// Plays a game against one engine and keeps a board in step with it.
#[derive(Debug)]
pub struct GameSession<T: Transport = ProcessTransport> {
    driver: ProtocolDriver<T>,
    board: Board,
    state: SessionState,
    outcome: Option<GameOutcome>,
    movetime: u64,
    ready: bool,
    /// Position the game was loaded from, if not the initial one.
    start: Option<Fen>,
    /// History entries that precede `start` and are not replayed to the engine.
    seeded: usize,
}

impl GameSession<ProcessTransport> {
    /// Launches the engine named in `options`.
    ///
    /// The session starts out awaiting readiness; poll [`GameSession::is_ready`]
    /// or call [`GameSession::wait_until_ready`], then [`GameSession::new_game`].
    pub fn connect(options: &SessionOptions) -> Result<Self> {
        let path = options
            .engine_path
            .as_deref()
            .ok_or(UciError::MissingConfiguration("engine_path"))?;
        let transport = ProcessTransport::spawn(path)?;
        Ok(GameSession::new(transport, options))
    }
}

impl<T: Transport> GameSession<T> {
    /// Wraps an already running engine. `engine_path` is not consulted.
    pub fn new(transport: T, options: &SessionOptions) -> Self {
        let driver = ProtocolDriver::new(transport)
            .with_debug(options.debug)
            .with_poll_interval(options.poll_interval);

        GameSession {
            driver,
            board: Board::new(),
            state: SessionState::AwaitingReady,
            outcome: None,
            movetime: options.movetime,
            ready: false,
            start: None,
            seeded: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Set once the session is over.
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn movetime(&self) -> u64 {
        self.movetime
    }

    pub fn set_movetime(&mut self, movetime: u64) {
        self.movetime = movetime;
    }

    fn require(&self, operation: &'static str, allowed: &[SessionState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(UciError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// One `isready` round trip; see [`ProtocolDriver::is_ready`].
    ///
    /// Every call sends another `isready`. [`GameSession::wait_until_ready`]
    /// sends one and waits for its answer instead; replies left over from a loop
    /// on this method are skipped by [`GameSession::play_turn`].
    pub fn is_ready(&mut self) -> Result<bool> {
        let ready = self.driver.is_ready()?;
        self.ready |= ready;
        Ok(ready)
    }

    /// Sends one `isready` and polls for its answer up to `max_attempts` times.
    pub fn wait_until_ready(&mut self, max_attempts: u32) -> Result<()> {
        if max_attempts == 0 {
            return Err(UciError::NotReady { attempts: 0 });
        }

        if self.is_ready()? {
            return Ok(());
        }
        for _ in 1..max_attempts {
            thread::sleep(self.driver.poll_interval());
            if self.driver.poll_ready()? {
                self.ready = true;
                return Ok(());
            }
        }

        Err(UciError::NotReady {
            attempts: max_attempts,
        })
    }

    /// Starts a fresh game from the initial position.
    ///
    /// The first game needs an affirmed readiness check beforehand.
    pub fn new_game(&mut self) -> Result<()> {
        self.require("start a new game", &[SessionState::AwaitingReady, SessionState::InGame])?;
        if !self.ready {
            return Err(UciError::InvalidState {
                operation: "start a new game before the engine is ready",
                state: self.state,
            });
        }

        self.driver.send_command(&Command::UciNewGame)?;
        self.board.reset();
        self.start = None;
        self.seeded = 0;
        self.state = SessionState::InGame;
        info!("new game");
        Ok(())
    }

    pub fn is_new_game(&self) -> bool {
        self.board.history().is_empty()
    }

    /// True once the board was loaded with [`GameSession::set_board`] in this game.
    pub fn is_board_locked(&self) -> bool {
        self.start.is_some()
    }

    /// Continues the current game from a full six-field position.
    ///
    /// `last_move` is recorded in the history as the move that led to the
    /// position; it is not applied to the board nor sent to the engine. The
    /// board stays locked against manual edits until the next new game.
    pub fn set_board(&mut self, fen: &str, last_move: Option<UciMove>) -> Result<()> {
        self.require("set the board", &[SessionState::InGame])?;
        if self.is_board_locked() {
            return Err(UciError::BoardLocked);
        }

        let fen: Fen = fen.parse()?;
        self.board.load_fen(&fen)?;
        if let Some(mv) = last_move {
            self.board.record(mv);
        }
        self.seeded = self.board.history().len();
        self.start = Some(fen);

        self.send_position()
    }

    /// Asks the engine for a move and plays it on the local board.
    ///
    /// A resigning engine or one without a move ends the session with
    /// [`UciError::EngineResigned`] or [`UciError::NoMove`]; the board is left
    /// as it was. Unrecognised replies leave the session untouched.
    pub fn play_turn(&mut self) -> Result<UciMove> {
        self.require("play a turn", &[SessionState::InGame])?;

        let raw = self.driver.request_best_move(self.movetime)?;
        match classify(&raw) {
            Outcome::Move(mv) => {
                self.board.play(mv)?;
                debug!("move {}: {}", self.move_count(), mv);
                self.send_position()?;
                Ok(mv)
            }
            Outcome::Resigned => {
                self.finish(GameOutcome::Resigned);
                Err(UciError::EngineResigned(raw))
            }
            Outcome::NoMove => {
                self.finish(GameOutcome::NoMove);
                Err(UciError::NoMove(raw))
            }
            Outcome::Malformed => Err(UciError::MalformedBestMove(raw)),
            Outcome::Unexpected => Err(UciError::UnexpectedResponse(raw)),
        }
    }

    /// Tells the engine to exit. The session is over afterwards.
    pub fn quit(&mut self) -> Result<()> {
        if self.state != SessionState::GameOver {
            self.finish(GameOutcome::Quit);
        }
        self.driver.send_command(&Command::Quit)
    }

    fn finish(&mut self, outcome: GameOutcome) {
        info!("game over after {} moves: {:?}", self.move_count(), outcome);
        self.state = SessionState::GameOver;
        self.outcome = Some(outcome);
    }

    fn send_position(&mut self) -> Result<()> {
        let fen = self.start.as_ref().map(|f| f.to_string());
        let moves = &self.board.history()[self.seeded..];
        self.driver.send_position(fen.as_deref(), moves)
    }

    pub fn move_count(&self) -> usize {
        self.board.history().len()
    }

    pub fn moves(&self) -> &[UciMove] {
        self.board.history()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn placement(&self) -> String {
        self.board.to_placement()
    }

    pub fn render(&self, empty: char) -> String {
        self.board.render(empty)
    }

    pub fn piece_at(&self, square: Square) -> Result<(PieceKind, Color)> {
        let piece = self.board.piece_at(square)?;
        Ok((piece.kind, piece.color))
    }

    pub fn is_occupied(&self, square: Square) -> bool {
        self.board.is_occupied(square)
    }

    pub fn has_castled(&self, color: Color) -> bool {
        self.board.has_castled(color)
    }

    /// Edits the local board. Refused while the board is locked.
    pub fn place(&mut self, color: Color, kind: PieceKind, square: Square) -> Result<()> {
        if self.is_board_locked() {
            return Err(UciError::BoardLocked);
        }
        self.board.place(color, kind, square);
        Ok(())
    }

    pub fn clear(&mut self, square: Square) -> Result<()> {
        if self.is_board_locked() {
            return Err(UciError::BoardLocked);
        }
        self.board.clear(square);
        Ok(())
    }
}
