use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::session::SessionState;
use crate::uci::Square;

pub type Result<T> = std::result::Result<T, UciError>;

/// Everything that can go wrong while driving an engine.
#[derive(Error, Debug)]
pub enum UciError {
    /// A required setup value was not supplied.
    #[error("missing required option '{0}'")]
    MissingConfiguration(&'static str),

    #[error("engine not found at {}", .0.display())]
    EngineNotFound(PathBuf),

    #[error("engine at {} is not executable", .0.display())]
    EngineNotExecutable(PathBuf),

    #[error("engine I/O failed: {0}")]
    EngineIo(#[from] io::Error),

    /// The engine answered with something that is not a best-move response.
    #[error("expected a 'bestmove' response, got '{0}'")]
    UnexpectedResponse(String),

    /// A best-move response none of the known engine dialects produce.
    #[error("engine returned a 'bestmove' that is not understood: '{0}'")]
    MalformedBestMove(String),

    #[error("engine did not report ready after {attempts} attempts")]
    NotReady { attempts: u32 },

    #[error("engine resigns: '{0}'")]
    EngineResigned(String),

    #[error("engine has no move: '{0}'")]
    NoMove(String),

    #[error("no piece at {0}")]
    NoPieceAtPosition(Square),

    #[error("cannot {operation} while the session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("board was loaded from a position and is locked until a new game")]
    BoardLocked,

    #[error("invalid square '{0}'")]
    InvalidSquare(String),

    #[error("invalid move '{0}'")]
    InvalidMove(String),

    #[error("unknown promotion piece '{0}'")]
    UnknownPromotion(char),

    #[error("unknown piece '{0}'")]
    UnknownPiece(String),

    #[error("invalid FEN: {0}")]
    Fen(String),
}

impl UciError {
    /// The engine process is missing or could not be talked to.
    pub fn is_engine_unavailable(&self) -> bool {
        matches!(
            self,
            UciError::EngineNotFound(_) | UciError::EngineNotExecutable(_) | UciError::EngineIo(_)
        )
    }

    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            UciError::UnexpectedResponse(_)
                | UciError::MalformedBestMove(_)
                | UciError::NotReady { .. }
        )
    }

    /// Resignation or no move: a finished game, not a failure.
    pub fn is_no_legal_move(&self) -> bool {
        matches!(self, UciError::EngineResigned(_) | UciError::NoMove(_))
    }

    pub fn is_illegal_local_state(&self) -> bool {
        matches!(
            self,
            UciError::NoPieceAtPosition(_) | UciError::InvalidState { .. } | UciError::BoardLocked
        )
    }

    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            UciError::InvalidSquare(_)
                | UciError::InvalidMove(_)
                | UciError::UnknownPromotion(_)
                | UciError::UnknownPiece(_)
                | UciError::Fen(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_groups() {
        assert!(UciError::MalformedBestMove("bestmove zz".into()).is_protocol_violation());
        assert!(UciError::NotReady { attempts: 3 }.is_protocol_violation());
        assert!(UciError::EngineResigned("bestmove a1a1".into()).is_no_legal_move());
        assert!(UciError::NoMove("bestmove NULL".into()).is_no_legal_move());
        assert!(UciError::BoardLocked.is_illegal_local_state());
        assert!(UciError::Fen("short".into()).is_format_error());
        assert!(UciError::EngineNotFound(PathBuf::from("/nope")).is_engine_unavailable());
        assert!(!UciError::MissingConfiguration("engine_path").is_engine_unavailable());
    }

    #[test]
    fn test_error_messages() {
        let sq: Square = "a3".parse().unwrap();
        assert_eq!(UciError::NoPieceAtPosition(sq).to_string(), "no piece at a3");
        assert_eq!(
            UciError::MissingConfiguration("engine_path").to_string(),
            "missing required option 'engine_path'"
        );
    }
}
