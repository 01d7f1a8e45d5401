use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::uci::UciMove;

/// A command sent from the driver to the engine.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Command {
    IsReady,
    UciNewGame,
    /// `position startpos` when `fen` is `None`, otherwise `position fen <fen>`.
    Position {
        fen: Option<String>,
        moves: Vec<UciMove>,
    },
    /// Search for a fixed number of milliseconds.
    Go {
        movetime: u64,
    },
    Quit,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match *self {
            Command::IsReady => "isready",
            Command::UciNewGame => "ucinewgame",
            Command::Position { .. } => "position",
            Command::Go { .. } => "go",
            Command::Quit => "quit",
        }
    }

    pub fn serialize(&self) -> String {
        match self {
            Command::Position { fen, moves } => {
                let mut s = String::from("position ");
                match fen {
                    Some(fen) => s += format!("fen {}", fen).as_str(),
                    None => s += "startpos",
                }

                if !moves.is_empty() {
                    s += " moves";
                    for m in moves {
                        s += format!(" {}", m).as_str();
                    }
                }

                s
            }
            Command::Go { movetime } => format!("go movetime {}", movetime),
            _ => self.name().to_string(),
        }
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.serialize())
    }
}
