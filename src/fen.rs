//! Forsyth–Edwards notation.
//!
//! Only the piece placement field drives the board; the remaining five fields
//! are checked for shape and kept so the position can be handed back to an engine.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::{Result, UciError};
use crate::uci::{Color, Piece, Square};

/// Pieces indexed by `[rank][file]`, rank 0 being White's back rank.
pub type Grid = [[Option<Piece>; 8]; 8];

pub const STARTING_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// Serializes the grid as the placement field, rank 8 first.
pub fn encode_placement(grid: &Grid) -> String {
    let mut ranks = Vec::with_capacity(8);

    for row in grid.iter().rev() {
        let mut rank = String::new();
        let mut empties = 0;

        for cell in row.iter() {
            match cell {
                None => empties += 1,
                Some(piece) => {
                    if empties > 0 {
                        rank += &empties.to_string();
                        empties = 0;
                    }
                    rank.push(piece.as_char());
                }
            }
        }
        if empties > 0 {
            rank += &empties.to_string();
        }

        ranks.push(rank);
    }

    ranks.join("/")
}

/// Inverse of [`encode_placement`]. Every rank must describe exactly eight files.
pub fn decode_placement(placement: &str) -> Result<Grid> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(UciError::Fen(format!(
            "expected 8 ranks, found {} in '{}'",
            ranks.len(),
            placement
        )));
    }

    let mut grid: Grid = [[None; 8]; 8];

    for (i, text) in ranks.iter().enumerate() {
        let rank = 7 - i;
        let mut file = 0usize;

        for c in text.chars() {
            if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                file += skip as usize;
            } else if let Some(piece) = Piece::from_char(c) {
                if file < 8 {
                    grid[rank][file] = Some(piece);
                }
                file += 1;
            } else {
                return Err(UciError::Fen(format!(
                    "invalid character '{}' in rank {}",
                    c,
                    rank + 1
                )));
            }

            if file > 8 {
                break;
            }
        }

        if file != 8 {
            return Err(UciError::Fen(format!(
                "rank {} describes {} files, expected 8",
                rank + 1,
                file
            )));
        }
    }

    Ok(grid)
}

/// A complete six-field position.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Fen {
    pub placement: String,
    pub side_to_move: Color,
    pub castling: String,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Fen {
    /// Decodes the placement field into a grid.
    pub fn grid(&self) -> Result<Grid> {
        decode_placement(&self.placement)
    }
}

impl FromStr for Fen {
    type Err = UciError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.len() != 6 {
            return Err(UciError::Fen(format!(
                "expected 6 fields, found {} in '{}'",
                parts.len(),
                s
            )));
        }

        let placement = parts[0].to_string();
        decode_placement(&placement)?;

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(UciError::Fen(format!(
                    "side to move must be 'w' or 'b', found '{}'",
                    other
                )))
            }
        };

        let castling = parts[2];
        let castling_ok = castling == "-"
            || (castling.len() <= 4
                && castling.chars().all(|c| "KQkq".contains(c))
                && castling
                    .chars()
                    .enumerate()
                    .all(|(i, c)| !castling[i + 1..].contains(c)));
        if !castling_ok {
            return Err(UciError::Fen(format!("invalid castling rights '{}'", castling)));
        }

        let en_passant = match parts[3] {
            "-" => None,
            sq => Some(
                sq.parse::<Square>()
                    .ok()
                    .filter(|s| s.rank() == 2 || s.rank() == 5)
                    .ok_or_else(|| UciError::Fen(format!("invalid en passant square '{}'", sq)))?,
            ),
        };

        let halfmove_clock = parts[4]
            .parse()
            .map_err(|_| UciError::Fen(format!("invalid halfmove clock '{}'", parts[4])))?;
        let fullmove_number = parts[5]
            .parse()
            .map_err(|_| UciError::Fen(format!("invalid fullmove number '{}'", parts[5])))?;

        Ok(Fen {
            placement,
            side_to_move,
            castling: castling.to_string(),
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }
}

impl Display for Fen {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let side = match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        };
        write!(f, "{} {} {} ", self.placement, side, self.castling)?;
        match self.en_passant {
            Some(sq) => write!(f, "{}", sq)?,
            None => write!(f, "-")?,
        }
        write!(f, " {} {}", self.halfmove_clock, self.fullmove_number)
    }
}
