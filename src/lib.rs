//! This is documentation for the `uci-driver` crate.
//!
//! `uci-driver` plays a game against a chess engine speaking the
//! [Universal Chess Interface (UCI) protocol](https://en.wikipedia.org/wiki/Universal_Chess_Interface).
//! It frames the commands, waits for the engine's replies, understands the
//! `bestmove` dialects of the common engines and mirrors every move on a local
//! board that can be printed or exported as FEN.
//!
//! ```no_run
//! use uci_driver::{GameSession, SessionOptions};
//!
//! # fn main() -> uci_driver::Result<()> {
//! let mut session = GameSession::connect(&SessionOptions::new("/usr/bin/stockfish"))?;
//! session.wait_until_ready(20)?;
//! session.new_game()?;
//!
//! loop {
//!     println!("{}", session.render('.'));
//!     match session.play_turn() {
//!         Ok(_) => {}
//!         Err(e) if e.is_no_legal_move() => break,
//!         Err(e) => return Err(e),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

extern crate pest;
#[macro_use]
extern crate pest_derive;

pub mod board;
pub mod driver;
pub mod engine_bound;
pub mod error;
pub mod fen;
pub mod parser;
pub mod session;
pub mod transport;
pub mod uci;

pub use crate::board::{Board, CastlingFlags};
pub use crate::driver::ProtocolDriver;
pub use crate::engine_bound::Command;
pub use crate::error::{Result, UciError};
pub use crate::fen::Fen;
pub use crate::parser::{classify, Outcome};
pub use crate::session::{GameOutcome, GameSession, SessionOptions, SessionState};
pub use crate::transport::{ChannelTransport, EngineHandle, ProcessTransport, Transport};
pub use crate::uci::{Color, Piece, PieceKind, Square, UciMove};
