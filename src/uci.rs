use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::UciError;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CommunicationDirection {
    GuiToEngine,
    EngineToGui,
}

impl CommunicationDirection {
    /// The speaker tag used when a line is written to the log.
    pub fn speaker(self) -> &'static str {
        match self {
            CommunicationDirection::GuiToEngine => "ME",
            CommunicationDirection::EngineToGui => "ENGINE",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    /// The rank (0-based) holding this color's king and rooks at the start of a game.
    pub fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match *self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    King,
    Queen,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::King,
        PieceKind::Queen,
    ];

    /// The lowercase single-letter code.
    pub fn as_char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Rook => 'r',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
        }
    }

    /// Case-insensitive inverse of [`PieceKind::as_char`].
    pub fn from_char(c: char) -> Option<PieceKind> {
        let c = c.to_ascii_lowercase();
        PieceKind::ALL.iter().copied().find(|kind| kind.as_char() == c)
    }

    /// The long-form name, e.g. `"knight"`.
    pub fn name(self) -> &'static str {
        match self {
            PieceKind::Pawn => "pawn",
            PieceKind::Rook => "rook",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::King => "king",
            PieceKind::Queen => "queen",
        }
    }

    pub fn from_name(name: &str) -> Option<PieceKind> {
        PieceKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Kinds a pawn may be promoted to.
    pub fn is_promotable(self) -> bool {
        matches!(
            self,
            PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop | PieceKind::Knight
        )
    }
}

impl Display for PieceKind {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.name())
    }
}

impl FromStr for PieceKind {
    type Err = UciError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PieceKind::from_name(s).ok_or_else(|| UciError::UnknownPiece(s.to_string()))
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    pub fn new(color: Color, kind: PieceKind) -> Piece {
        Piece { kind, color }
    }

    /// Board letter: uppercase for white, lowercase for black.
    pub fn as_char(self) -> char {
        let c = self.kind.as_char();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub fn from_char(c: char) -> Option<Piece> {
        let kind = PieceKind::from_char(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece { kind, color })
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{} {}", self.color, self.kind)
    }
}

/// A board square. Both coordinates are 0-based: file `a` is 0, rank `1` is 0.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    pub const FILES: [char; 8] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];

    pub fn new(file: u8, rank: u8) -> Result<Square, UciError> {
        if file < 8 && rank < 8 {
            Ok(Square { file, rank })
        } else {
            Err(UciError::InvalidSquare(format!("file {file}, rank {rank}")))
        }
    }

    #[inline]
    pub fn file(self) -> u8 {
        self.file
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self.rank
    }

    pub fn file_char(self) -> char {
        Square::FILES[self.file as usize]
    }

    /// Same rank, different file.
    pub fn with_file(self, file: u8) -> Result<Square, UciError> {
        Square::new(file, self.rank)
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}{}", self.file_char(), self.rank + 1)
    }
}

impl FromStr for Square {
    type Err = UciError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (file, rank) = match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => (file.to_ascii_lowercase(), rank),
            _ => return Err(UciError::InvalidSquare(s.to_string())),
        };

        let file = Square::FILES.iter().position(|&f| f == file);
        let rank = rank.to_digit(10).filter(|r| (1..=8).contains(r));

        match (file, rank) {
            (Some(file), Some(rank)) => Square::new(file as u8, rank as u8 - 1),
            _ => Err(UciError::InvalidSquare(s.to_string())),
        }
    }
}

/// A move in long algebraic form as spoken by UCI, e.g. `e2e4` or `e7e8q`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UciMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl UciMove {
    pub fn new(from: Square, to: Square, promotion: Option<PieceKind>) -> Result<UciMove, UciError> {
        if from == to {
            return Err(UciError::InvalidMove(format!("{from}{to}")));
        }
        if let Some(kind) = promotion {
            if !kind.is_promotable() {
                return Err(UciError::UnknownPromotion(kind.as_char()));
            }
        }
        Ok(UciMove { from, to, promotion })
    }

    /// Number of files crossed between start and end square.
    pub fn file_distance(&self) -> u8 {
        (self.from.file() as i8 - self.to.file() as i8).unsigned_abs()
    }
}

impl Display for UciMove {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}{}", self.from, self.to)?;

        if let Some(p) = self.promotion {
            write!(f, "{}", p.as_char())?;
        }

        Ok(())
    }
}

impl FromStr for UciMove {
    type Err = UciError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(UciError::InvalidMove(s.to_string()));
        }

        let from: Square = s[0..2].parse()?;
        let to: Square = s[2..4].parse()?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => Some(
                PieceKind::from_char(c)
                    .filter(|kind| kind.is_promotable() && c.is_ascii_lowercase())
                    .ok_or(UciError::UnknownPromotion(c))?,
            ),
        };

        UciMove::new(from, to, promotion)
    }
}
