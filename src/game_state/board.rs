//! Mailbox board model.
//!
//! An 8x8 grid indexed `[rank][file]` where each cell owns at most one
//! `Piece`. Boards are plain values: `clone()` yields an independent grid.
//! Occupancy bitboards are derived on demand so the attack tables in
//! `moves` can be shared with the move generator.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::game_state::chess_rules::BACK_RANK;
use crate::game_state::chess_types::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    rows: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl Board {
    pub fn empty() -> Self {
        Self {
            rows: [[None; 8]; 8],
        }
    }

    /// Standard starting arrangement.
    pub fn standard() -> Self {
        let mut board = Self::empty();
        for (file, kind) in BACK_RANK.iter().enumerate() {
            let file = file as u8;
            board.set(square_at(file, 0), Some(Piece::new(*kind, Color::Light)));
            board.set(square_at(file, 1), Some(Piece::new(PieceKind::Pawn, Color::Light)));
            board.set(square_at(file, 6), Some(Piece::new(PieceKind::Pawn, Color::Dark)));
            board.set(square_at(file, 7), Some(Piece::new(*kind, Color::Dark)));
        }
        board
    }

    /// Build a board from externally supplied JSON.
    ///
    /// Anything that is not exactly 8 rows of 8 cells, each `null` or a
    /// piece object, yields the standard starting board instead of an error.
    pub fn sanitize(value: &Value) -> Self {
        match Self::parse_grid(value) {
            Some(board) => board,
            None => {
                warn!("malformed board input; rebuilding the starting position");
                Self::standard()
            }
        }
    }

    fn parse_grid(value: &Value) -> Option<Self> {
        let rows = value.as_array()?;
        if rows.len() != 8 {
            return None;
        }

        let mut board = Self::empty();
        for (rank, row) in rows.iter().enumerate() {
            let cells = row.as_array()?;
            if cells.len() != 8 {
                return None;
            }
            for (file, cell) in cells.iter().enumerate() {
                if cell.is_null() {
                    continue;
                }
                let piece: Piece = serde_json::from_value(cell.clone()).ok()?;
                board.rows[rank][file] = Some(piece);
            }
        }
        Some(board)
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        debug_assert!(square < 64, "square out of bounds: {square}");
        self.rows[rank_of(square) as usize][file_of(square) as usize]
    }

    #[inline]
    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        debug_assert!(square < 64, "square out of bounds: {square}");
        self.rows[rank_of(square) as usize][file_of(square) as usize] = piece;
    }

    #[inline]
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        let piece = self.piece_at(square);
        self.set(square, None);
        piece
    }

    #[inline]
    pub fn is_empty_square(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    /// All occupied squares with their pieces, a1 first.
    pub fn occupied(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        (0..64u8).filter_map(move |sq| self.piece_at(sq).map(|piece| (sq, piece)))
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.occupied().filter(move |(_, piece)| piece.color == color)
    }

    pub fn occupancy(&self) -> u64 {
        self.occupied().fold(0u64, |acc, (sq, _)| acc | (1u64 << sq))
    }

    pub fn occupancy_of(&self, color: Color) -> u64 {
        self.pieces_of(color)
            .fold(0u64, |acc, (sq, _)| acc | (1u64 << sq))
    }

    /// First king of `color`; boards without one are valid in this variant.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|(_, piece)| piece.is_king())
            .map(|(sq, _)| sq)
    }

    pub fn rows(&self) -> &[[Option<Piece>; 8]; 8] {
        &self.rows
    }
}
