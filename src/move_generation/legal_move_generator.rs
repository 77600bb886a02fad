//! Destination generation with the power overlay.
//!
//! A piece reaches the union of the squares its own movement rule allows
//! and, if it holds a power, the squares the borrowed rule allows. With
//! legality filtering on, destinations that leave the mover's king attacked
//! are dropped; the attack test runs the same generator unfiltered for the
//! opponent.

use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_apply::{apply_board_move, MoveResolution};
use crate::move_generation::legal_move_checks::{is_king_in_check, is_square_attacked};
use crate::move_generation::legal_move_shared::{bit, en_passant_victim_present, squares_of};
use crate::moves::leaper_moves::{king_targets, knight_targets};
use crate::moves::pawn_moves::{pawn_captures, pawn_pushes};
use crate::moves::slider_moves::{bishop_targets, queen_targets, rook_targets, squares_between};

/// Whether targets are wanted for moving or for attack detection. Pawn
/// pushes never attack, and pawn diagonals attack even when empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetScope {
    Moves,
    Attacks,
}

/// Targets reachable by `piece` on `from` using the movement rule of `rule`.
pub fn rule_targets(
    board: &Board,
    from: Square,
    piece: &Piece,
    rule: PieceKind,
    en_passant_target: Option<Square>,
    scope: TargetScope,
) -> u64 {
    let occupancy = board.occupancy();
    let own = board.occupancy_of(piece.color);
    let enemy = occupancy & !own;

    let targets = match rule {
        PieceKind::Pawn => match scope {
            TargetScope::Attacks => pawn_captures(piece.color, from),
            TargetScope::Moves => {
                let mut targets = pawn_pushes(piece.color, from, occupancy, piece.has_moved)
                    | (pawn_captures(piece.color, from) & enemy);
                // Only real pawns capture en passant.
                if let Some(ep) = en_passant_target {
                    if piece.kind == PieceKind::Pawn
                        && (pawn_captures(piece.color, from) & bit(ep)) != 0
                        && board.is_empty_square(ep)
                        && en_passant_victim_present(board, ep, piece.color)
                    {
                        targets |= bit(ep);
                    }
                }
                targets
            }
        },
        PieceKind::Knight => knight_targets(from),
        PieceKind::Bishop => bishop_targets(from, occupancy),
        PieceKind::Rook => rook_targets(from, occupancy),
        PieceKind::Queen => queen_targets(from, occupancy),
        PieceKind::King => king_targets(from),
    };

    targets & !own
}

/// Squares reachable under the piece's own rules, castling included.
pub fn native_targets(board: &Board, from: Square, en_passant_target: Option<Square>) -> u64 {
    let Some(piece) = board.piece_at(from) else {
        return 0;
    };
    let mut targets = rule_targets(
        board,
        from,
        &piece,
        piece.kind,
        en_passant_target,
        TargetScope::Moves,
    );
    if piece.is_king() {
        targets |= castling_targets(board, from, &piece);
    }
    targets
}

/// Squares reachable only through the borrowed power, or 0 without one.
pub fn power_targets(board: &Board, from: Square, en_passant_target: Option<Square>) -> u64 {
    match board.piece_at(from) {
        Some(piece) => match piece.power {
            Some(power) => rule_targets(
                board,
                from,
                &piece,
                power,
                en_passant_target,
                TargetScope::Moves,
            ),
            None => 0,
        },
        None => 0,
    }
}

/// Squares the piece on `from` attacks, powers included.
pub fn attack_targets(board: &Board, from: Square) -> u64 {
    let Some(piece) = board.piece_at(from) else {
        return 0;
    };
    let mut targets = rule_targets(board, from, &piece, piece.kind, None, TargetScope::Attacks);
    if let Some(power) = piece.power {
        targets |= rule_targets(board, from, &piece, power, None, TargetScope::Attacks);
    }
    targets
}

fn castling_targets(board: &Board, from: Square, king: &Piece) -> u64 {
    let rank = king.color.home_rank();
    if king.has_moved || from != square_at(4, rank) {
        return 0;
    }

    let occupancy = board.occupancy();
    let mut targets = 0u64;
    for (rook_file, king_file) in [(7u8, 6u8), (0u8, 2u8)] {
        let rook_sq = square_at(rook_file, rank);
        let rook_ready = matches!(
            board.piece_at(rook_sq),
            Some(rook) if rook.kind == PieceKind::Rook && rook.color == king.color && !rook.has_moved
        );
        if rook_ready && (squares_between(from, rook_sq) & occupancy) == 0 {
            targets |= bit(square_at(king_file, rank));
        }
    }
    targets
}

/// True when the king on `from` moving to `to` is a castling move.
pub fn is_castling_move(board: &Board, from: Square, to: Square) -> bool {
    match board.piece_at(from) {
        Some(piece) if piece.is_king() => {
            rank_of(from) == rank_of(to)
                && file_of(from).abs_diff(file_of(to)) == 2
                && (castling_targets(board, from, &piece) & bit(to)) != 0
        }
        _ => false,
    }
}

/// Destination mask for the piece on `from`.
pub fn valid_move_mask(
    board: &Board,
    from: Square,
    en_passant_target: Option<Square>,
    filter_for_legality: bool,
) -> u64 {
    let Some(piece) = board.piece_at(from) else {
        return 0;
    };
    let candidates =
        native_targets(board, from, en_passant_target) | power_targets(board, from, en_passant_target);
    if !filter_for_legality {
        return candidates;
    }

    squares_of(candidates)
        .filter(|&to| is_legal_destination(board, from, to, &piece, en_passant_target))
        .fold(0u64, |acc, to| acc | bit(to))
}

/// Destinations for the piece on `from`, lowest square first.
pub fn valid_moves(
    board: &Board,
    from: Square,
    en_passant_target: Option<Square>,
    filter_for_legality: bool,
) -> Vec<Square> {
    squares_of(valid_move_mask(board, from, en_passant_target, filter_for_legality)).collect()
}

fn is_legal_destination(
    board: &Board,
    from: Square,
    to: Square,
    piece: &Piece,
    en_passant_target: Option<Square>,
) -> bool {
    let enemy = piece.color.opposite();

    if is_castling_move(board, from, to) && !is_power_move(board, from, to, en_passant_target) {
        let passing = squares_between(from, to);
        if is_king_in_check(board, piece.color)
            || squares_of(passing).any(|sq| is_square_attacked(board, sq, enemy))
        {
            return false;
        }
    }

    if is_ambiguous_en_passant(board, from, to, en_passant_target) {
        return !legal_en_passant_readings(board, from, to, en_passant_target).is_empty();
    }

    match apply_board_move(board, from, to, en_passant_target, &MoveResolution::default()) {
        Ok(applied) => !is_king_in_check(&applied.board, piece.color),
        Err(_) => false,
    }
}

/// True iff `from -> to` is reachable only through the borrowed power.
pub fn is_power_move(
    board: &Board,
    from: Square,
    to: Square,
    en_passant_target: Option<Square>,
) -> bool {
    let target = bit(to);
    (native_targets(board, from, en_passant_target) & target) == 0
        && (power_targets(board, from, en_passant_target) & target) != 0
}

/// True iff any piece of `color` has at least one legal destination.
pub fn has_legal_moves(board: &Board, color: Color, en_passant_target: Option<Square>) -> bool {
    board
        .pieces_of(color)
        .any(|(from, _)| valid_move_mask(board, from, en_passant_target, true) != 0)
}

/// Every legal `(from, to)` pair for `color`.
pub fn legal_moves_for(
    board: &Board,
    color: Color,
    en_passant_target: Option<Square>,
) -> Vec<(Square, Square)> {
    board
        .pieces_of(color)
        .flat_map(|(from, _)| {
            squares_of(valid_move_mask(board, from, en_passant_target, true)).map(move |to| (from, to))
        })
        .collect()
}

/// Legal `(from, to)` pairs for the side to move of `game_state`.
pub fn legal_moves(game_state: &GameState) -> Vec<(Square, Square)> {
    if game_state.status.is_over() {
        return Vec::new();
    }
    legal_moves_for(
        &game_state.board,
        game_state.turn,
        game_state.en_passant_target,
    )
}

/// A pawn holding a diagonal-moving power stepping onto the empty en-passant
/// square can be read as a plain power move or as an en-passant capture.
pub fn is_ambiguous_en_passant(
    board: &Board,
    from: Square,
    to: Square,
    en_passant_target: Option<Square>,
) -> bool {
    let Some(piece) = board.piece_at(from) else {
        return false;
    };
    piece.kind == PieceKind::Pawn
        && piece.power.is_some_and(PieceKind::moves_diagonally)
        && en_passant_target == Some(to)
        && board.is_empty_square(to)
        && (pawn_captures(piece.color, from) & bit(to)) != 0
        && en_passant_victim_present(board, to, piece.color)
}

/// Readings of an ambiguous en passant that leave the mover's king safe,
/// plain move first. Each reading is checked on its own board: the capture
/// removes the passed pawn, the plain move leaves it standing.
pub fn legal_en_passant_readings(
    board: &Board,
    from: Square,
    to: Square,
    en_passant_target: Option<Square>,
) -> Vec<EnPassantChoice> {
    let Some(piece) = board.piece_at(from) else {
        return Vec::new();
    };
    [EnPassantChoice::Move, EnPassantChoice::Capture]
        .into_iter()
        .filter(|&choice| {
            let reading = MoveResolution {
                en_passant: Some(choice),
                ..MoveResolution::default()
            };
            apply_board_move(board, from, to, en_passant_target, &reading)
                .is_ok_and(|applied| !is_king_in_check(&applied.board, piece.color))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::board::Board;

    fn place(board: &mut Board, square: Square, piece: Piece) {
        board.set(square, Some(piece));
    }

    fn kings(board: &mut Board) {
        place(board, 4, Piece::new(PieceKind::King, Color::Light));
        place(board, 60, Piece::new(PieceKind::King, Color::Dark));
    }

    #[test]
    fn start_position_has_twenty_moves() {
        let board = Board::standard();
        assert_eq!(legal_moves_for(&board, Color::Light, None).len(), 20);
        assert_eq!(legal_moves_for(&board, Color::Dark, None).len(), 20);
    }

    #[test]
    fn power_adds_to_native_movement() {
        let mut board = Board::empty();
        kings(&mut board);
        // Bishop on d4 holding a knight power.
        place(
            &mut board,
            27,
            Piece::new(PieceKind::Bishop, Color::Light).with_power(PieceKind::Knight).moved(),
        );
        let mask = valid_move_mask(&board, 27, None, true);
        let diagonals = bishop_targets(27, board.occupancy());
        assert_eq!(mask & diagonals, diagonals);
        assert_ne!(mask & bit(44), 0, "knight jump d4-e6 should be available");
        assert!(is_power_move(&board, 27, 44, None));
        assert!(!is_power_move(&board, 27, 36, None), "d4-e5 is a native bishop move");
    }

    #[test]
    fn pinned_piece_cannot_leave_the_line() {
        let mut board = Board::empty();
        kings(&mut board);
        place(&mut board, 12, Piece::new(PieceKind::Knight, Color::Light));
        place(&mut board, 36, Piece::new(PieceKind::Rook, Color::Dark));
        assert_eq!(valid_move_mask(&board, 12, None, true), 0);
        assert_ne!(valid_move_mask(&board, 12, None, false), 0);
    }

    #[test]
    fn castling_requires_safe_passage() {
        let mut board = Board::empty();
        place(&mut board, 4, Piece::new(PieceKind::King, Color::Light));
        place(&mut board, 7, Piece::new(PieceKind::Rook, Color::Light));
        place(&mut board, 0, Piece::new(PieceKind::Rook, Color::Light));
        place(&mut board, 60, Piece::new(PieceKind::King, Color::Dark));
        let moves = valid_moves(&board, 4, None, true);
        assert!(moves.contains(&6));
        assert!(moves.contains(&2));

        // Dark rook controls f1: kingside castling through check is illegal.
        place(&mut board, 61, Piece::new(PieceKind::Rook, Color::Dark));
        let moves = valid_moves(&board, 4, None, true);
        assert!(!moves.contains(&6));
        assert!(moves.contains(&2));
    }

    #[test]
    fn moved_king_cannot_castle() {
        let mut board = Board::empty();
        place(&mut board, 4, Piece::new(PieceKind::King, Color::Light).moved());
        place(&mut board, 7, Piece::new(PieceKind::Rook, Color::Light));
        place(&mut board, 60, Piece::new(PieceKind::King, Color::Dark));
        assert!(!valid_moves(&board, 4, None, true).contains(&6));
    }

    #[test]
    fn ambiguous_en_passant_needs_a_diagonal_power() {
        let mut board = Board::empty();
        kings(&mut board);
        // Light pawn e5, dark pawn just double-stepped to d5, target d6.
        place(&mut board, 35, Piece::new(PieceKind::Pawn, Color::Dark).moved());
        place(&mut board, 36, Piece::new(PieceKind::Pawn, Color::Light).moved());
        assert!(!is_ambiguous_en_passant(&board, 36, 43, Some(43)));
        assert!(valid_moves(&board, 36, Some(43), true).contains(&43));

        place(
            &mut board,
            36,
            Piece::new(PieceKind::Pawn, Color::Light).moved().with_power(PieceKind::Bishop),
        );
        assert!(is_ambiguous_en_passant(&board, 36, 43, Some(43)));
        assert!(!is_power_move(&board, 36, 43, Some(43)));
    }

    #[test]
    fn en_passant_reading_that_opens_a_rank_is_dropped() {
        let mut board = Board::empty();
        place(&mut board, 32, Piece::new(PieceKind::King, Color::Light).moved());
        place(&mut board, 62, Piece::new(PieceKind::King, Color::Dark).moved());
        place(&mut board, 39, Piece::new(PieceKind::Rook, Color::Dark).moved());
        place(&mut board, 35, Piece::new(PieceKind::Pawn, Color::Dark).moved());
        place(
            &mut board,
            36,
            Piece::new(PieceKind::Pawn, Color::Light).moved().with_power(PieceKind::Bishop),
        );

        // Taking d5 clears the fifth rank for the h5 rook; stepping past it does not.
        assert_eq!(
            legal_en_passant_readings(&board, 36, 43, Some(43)),
            vec![EnPassantChoice::Move]
        );
        assert!(valid_moves(&board, 36, Some(43), true).contains(&43));
    }

    #[test]
    fn en_passant_reading_that_ignores_check_is_dropped() {
        let mut board = Board::empty();
        place(&mut board, 26, Piece::new(PieceKind::King, Color::Light).moved());
        place(&mut board, 62, Piece::new(PieceKind::King, Color::Dark).moved());
        place(&mut board, 35, Piece::new(PieceKind::Pawn, Color::Dark).moved());
        place(
            &mut board,
            36,
            Piece::new(PieceKind::Pawn, Color::Light).moved().with_power(PieceKind::Queen),
        );

        // The d5 pawn gives check; only removing it answers that.
        assert!(is_king_in_check(&board, Color::Light));
        assert_eq!(
            legal_en_passant_readings(&board, 36, 43, Some(43)),
            vec![EnPassantChoice::Capture]
        );
        assert!(valid_moves(&board, 36, Some(43), true).contains(&43));
    }

    #[test]
    fn lone_king_has_moves_but_no_king_capture() {
        let mut board = Board::empty();
        kings(&mut board);
        assert!(has_legal_moves(&board, Color::Light, None));
    }
}
