//! The local mirror of the engine's game.
//!
//! The board trusts the engine: moves are not checked for legality, only their
//! effect on the squares is reproduced.

use log::debug;

use crate::error::{Result, UciError};
use crate::fen::{self, Fen, Grid};
use crate::uci::{Color, Piece, PieceKind, Square, UciMove};

/// Whether each side has castled during the current game. Informational only.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct CastlingFlags {
    castled: [bool; 2],
}

impl CastlingFlags {
    pub fn has_castled(&self, color: Color) -> bool {
        self.castled[color.index()]
    }

    fn set(&mut self, color: Color) {
        self.castled[color.index()] = true;
    }
}

/// An 8×8 grid of pieces plus the moves that led to it.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Board {
    grid: Grid,
    castling: CastlingFlags,
    history: Vec<UciMove>,
}

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

impl Default for Board {
    fn default() -> Self {
        let mut board = Board::empty();
        board.reset();
        board
    }
}

impl Board {
    /// A board in the standard starting arrangement.
    pub fn new() -> Board {
        Board::default()
    }

    /// A board without any pieces.
    pub fn empty() -> Board {
        Board {
            grid: [[None; 8]; 8],
            castling: CastlingFlags::default(),
            history: Vec::new(),
        }
    }

    /// Restores the starting arrangement and forgets flags and history.
    pub fn reset(&mut self) {
        self.grid = [[None; 8]; 8];

        for color in [Color::White, Color::Black].iter().copied() {
            let back = color.back_rank() as usize;
            let pawns = match color {
                Color::White => 1,
                Color::Black => 6,
            };
            for (file, kind) in BACK_RANK.iter().copied().enumerate() {
                self.grid[back][file] = Some(Piece::new(color, kind));
                self.grid[pawns][file] = Some(Piece::new(color, PieceKind::Pawn));
            }
        }

        self.castling = CastlingFlags::default();
        self.history.clear();
    }

    pub fn piece_at(&self, square: Square) -> Result<Piece> {
        self.get(square).ok_or(UciError::NoPieceAtPosition(square))
    }

    pub fn get(&self, square: Square) -> Option<Piece> {
        self.grid[square.rank() as usize][square.file() as usize]
    }

    pub fn is_occupied(&self, square: Square) -> bool {
        self.get(square).is_some()
    }

    /// Puts a piece on a square, replacing whatever was there.
    pub fn place(&mut self, color: Color, kind: PieceKind, square: Square) {
        self.grid[square.rank() as usize][square.file() as usize] = Some(Piece::new(color, kind));
    }

    pub fn clear(&mut self, square: Square) {
        self.grid[square.rank() as usize][square.file() as usize] = None;
    }

    /// Moves the piece on the start square to the end square.
    ///
    /// A king crossing more than one file is a castle: the rook on the corner
    /// in the direction of travel is moved next to the king. Whether a rook
    /// actually stands on that corner is not checked. Promotion suffixes are
    /// ignored here; see [`Board::play`].
    pub fn apply_move(&mut self, mv: &UciMove) -> Result<()> {
        let piece = self.piece_at(mv.from)?;

        if piece.kind == PieceKind::King && mv.file_distance() > 1 {
            self.castling.set(piece.color);

            let (corner, post) = if mv.to.file() > mv.from.file() {
                (7, 5)
            } else {
                (0, 3)
            };
            debug!("{} castles with {}", piece.color, mv);
            let rook_from = mv.from.with_file(corner)?;
            let rook_to = mv.from.with_file(post)?;
            self.place(piece.color, PieceKind::Rook, rook_to);
            self.clear(rook_from);
        }

        self.place(piece.color, piece.kind, mv.to);
        self.clear(mv.from);

        Ok(())
    }

    /// Applies a move, performs its promotion and records it in the history.
    pub fn play(&mut self, mv: UciMove) -> Result<()> {
        self.apply_move(&mv)?;

        if let Some(kind) = mv.promotion {
            let mover = self.piece_at(mv.to)?;
            debug!("{} promotes to {} on {}", mover.color, kind, mv.to);
            self.place(mover.color, kind, mv.to);
        }

        self.history.push(mv);
        Ok(())
    }

    /// Appends a move to the history without touching the squares.
    pub fn record(&mut self, mv: UciMove) {
        self.history.push(mv);
    }

    pub fn history(&self) -> &[UciMove] {
        &self.history
    }

    pub fn has_castled(&self, color: Color) -> bool {
        self.castling.has_castled(color)
    }

    pub fn castling(&self) -> CastlingFlags {
        self.castling
    }

    pub fn to_placement(&self) -> String {
        fen::encode_placement(&self.grid)
    }

    /// Replaces every square with the given placement field.
    ///
    /// History and castling flags belong to the game and are kept. On error the
    /// board is left untouched.
    pub fn load_placement(&mut self, placement: &str) -> Result<()> {
        let grid = fen::decode_placement(placement)?;
        self.replace(grid);
        Ok(())
    }

    /// Replaces the whole board with the placement of a full position.
    pub fn load_fen(&mut self, fen: &Fen) -> Result<()> {
        let grid = fen.grid()?;
        self.replace(grid);
        Ok(())
    }

    fn replace(&mut self, grid: Grid) {
        self.grid = grid;
    }

    /// ASCII diagram with rank 8 on top and `empty` marking vacant squares.
    pub fn render(&self, empty: char) -> String {
        let mut s: String = Square::FILES
            .iter()
            .fold(String::from("  "), |mut acc, f| {
                acc.push(f.to_ascii_uppercase());
                acc
            });
        s.push('\n');

        for (rank, row) in self.grid.iter().enumerate().rev() {
            s += format!("{} ", rank + 1).as_str();
            for cell in row.iter() {
                s.push(cell.map(Piece::as_char).unwrap_or(empty));
            }
            s.push('\n');
        }

        s
    }
}
