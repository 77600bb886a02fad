//! Pluggable board evaluation interfaces and a material baseline.
//!
//! Search delegates static scoring to `BoardScorer` so heuristics can be
//! swapped without touching the search loop. Held powers are worth a share
//! of the borrowed piece, since they add movement without adding a body.

use crate::game_state::chess_types::*;

pub const MATE_SCORE: i32 = 30000;

pub trait BoardScorer: Send + Sync {
    /// Score from the perspective of `turn`.
    fn score(&self, board: &Board, turn: Color) -> i32;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialScorer;

impl MaterialScorer {
    #[inline]
    pub const fn piece_value(piece: PieceKind) -> i32 {
        match piece {
            PieceKind::Pawn => 100,
            PieceKind::Knight => 320,
            PieceKind::Bishop => 330,
            PieceKind::Rook => 500,
            PieceKind::Queen => 900,
            PieceKind::King => 5000,
        }
    }

    /// A borrowed king step is worth about a pawn.
    #[inline]
    pub const fn power_value(power: PieceKind) -> i32 {
        match power {
            PieceKind::King => 100,
            other => Self::piece_value(other) / 2,
        }
    }

    fn material_balance_light_minus_dark(board: &Board) -> i32 {
        board
            .occupied()
            .map(|(_, piece)| {
                let value = Self::piece_value(piece.kind) + piece.power.map_or(0, Self::power_value);
                match piece.color {
                    Color::Light => value,
                    Color::Dark => -value,
                }
            })
            .sum()
    }
}

impl BoardScorer for MaterialScorer {
    fn score(&self, board: &Board, turn: Color) -> i32 {
        let light_minus_dark = Self::material_balance_light_minus_dark(board);
        match turn {
            Color::Light => light_minus_dark,
            Color::Dark => -light_minus_dark,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::board::Board;

    #[test]
    fn start_position_is_balanced() {
        let board = Board::standard();
        assert_eq!(MaterialScorer.score(&board, Color::Light), 0);
        assert_eq!(MaterialScorer.score(&board, Color::Dark), 0);
    }

    #[test]
    fn power_is_worth_something() {
        let mut board = Board::standard();
        let bishop = board.piece_at(2).expect("c1 bishop");
        board.set(2, Some(bishop.with_power(PieceKind::Rook)));
        assert_eq!(MaterialScorer.score(&board, Color::Light), 250);
        assert_eq!(MaterialScorer.score(&board, Color::Dark), -250);
    }
}
