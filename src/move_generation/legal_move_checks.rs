//! Attack and check detection.
//!
//! Attacks include borrowed powers: a rook holding a knight power gives
//! check like a knight as well.

use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_generator::{attack_targets, valid_move_mask};
use crate::move_generation::legal_move_shared::bit;

pub fn is_square_attacked(board: &Board, square: Square, attacker_color: Color) -> bool {
    let target = bit(square);
    board
        .pieces_of(attacker_color)
        .any(|(from, _)| (attack_targets(board, from) & target) != 0)
}

pub fn attackers_to_square(board: &Board, square: Square, attacker_color: Color) -> Vec<(Square, Piece)> {
    let target = bit(square);
    board
        .pieces_of(attacker_color)
        .filter(|(from, _)| (attack_targets(board, *from) & target) != 0)
        .collect()
}

/// False when `color` has no king on the board.
#[inline]
pub fn is_king_in_check(board: &Board, color: Color) -> bool {
    let Some(king_sq) = board.king_square(color) else {
        return false;
    };
    is_square_attacked(board, king_sq, color.opposite())
}

/// True iff some legal move of `color` lands on the opposing king.
pub fn can_capture_king(board: &Board, color: Color) -> bool {
    let Some(king_sq) = board.king_square(color.opposite()) else {
        return false;
    };
    let target = bit(king_sq);
    board
        .pieces_of(color)
        .any(|(from, _)| (valid_move_mask(board, from, None, true) & target) != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::board::Board;

    #[test]
    fn power_gives_check() {
        let mut board = Board::empty();
        board.set(4, Some(Piece::new(PieceKind::King, Color::Light)));
        board.set(60, Some(Piece::new(PieceKind::King, Color::Dark)));
        // Dark rook on d3 with a knight power hits e1 via the jump.
        board.set(19, Some(Piece::new(PieceKind::Rook, Color::Dark).with_power(PieceKind::Knight)));
        assert!(is_king_in_check(&board, Color::Light));
        assert_eq!(attackers_to_square(&board, 4, Color::Dark).len(), 1);
        assert!(can_capture_king(&board, Color::Dark));
    }

    #[test]
    fn missing_king_is_never_in_check() {
        let mut board = Board::empty();
        board.set(0, Some(Piece::new(PieceKind::Queen, Color::Dark)));
        assert!(!is_king_in_check(&board, Color::Light));
        assert!(!can_capture_king(&board, Color::Dark));
    }

    #[test]
    fn start_position_has_no_checks() {
        let board = Board::standard();
        assert!(!is_king_in_check(&board, Color::Light));
        assert!(!is_king_in_check(&board, Color::Dark));
        assert!(is_square_attacked(&board, 20, Color::Light));
        assert!(!is_square_attacked(&board, 28, Color::Light));
    }
}
