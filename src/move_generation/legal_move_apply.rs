//! Board-level move application.
//!
//! Produces the board after a move together with the facts the transition
//! engine needs: what was captured, whether the move consumed a power,
//! whether it was castling or en passant, and whether a promotion or an
//! en-passant interpretation is still missing. Callers validate legality
//! first; this function only refuses an empty origin or a bad promotion.

use crate::chess_errors::MoveRejection;
use crate::game_state::chess_rules::PROMOTION_CHOICES;
use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_generator::{
    is_ambiguous_en_passant, is_castling_move, is_power_move, native_targets,
};
use crate::move_generation::legal_move_shared::{bit, en_passant_victim_square};

/// Answers supplied for a move: promotion piece, en-passant reading, and
/// whether power mode is forced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveResolution {
    pub promotion: Option<PieceKind>,
    pub en_passant: Option<EnPassantChoice>,
    pub force_power_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    pub board: Board,
    /// The mover as it stood before the move.
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub power_move: bool,
    pub en_passant_capture: bool,
    pub castling: bool,
    pub double_step: bool,
    /// Promotion piece actually applied.
    pub promotion: Option<PieceKind>,
    /// The move reaches the last rank and needs a promotion piece.
    pub needs_promotion: bool,
    /// The move is an ambiguous en passant and no reading was supplied.
    pub needs_en_passant_choice: bool,
}

pub fn apply_board_move(
    board: &Board,
    from: Square,
    to: Square,
    en_passant_target: Option<Square>,
    resolution: &MoveResolution,
) -> Result<AppliedMove, MoveRejection> {
    let piece = board.piece_at(from).ok_or(MoveRejection::NoPieceAt(from))?;
    if let Some(promotion) = resolution.promotion {
        if !PROMOTION_CHOICES.contains(&promotion) {
            return Err(MoveRejection::InvalidPromotionChoice(promotion));
        }
    }

    let ambiguous = is_ambiguous_en_passant(board, from, to, en_passant_target);
    let (power_move, en_passant_capture, needs_en_passant_choice) = if ambiguous {
        let choice = match (resolution.en_passant, resolution.force_power_mode) {
            (Some(choice), _) => Some(choice),
            (None, true) => Some(EnPassantChoice::Move),
            (None, false) => None,
        };
        match choice {
            Some(EnPassantChoice::Move) => (true, false, false),
            Some(EnPassantChoice::Capture) => (false, true, false),
            // Read as a capture until the player decides.
            None => (false, true, true),
        }
    } else {
        let natively = (native_targets(board, from, en_passant_target) & bit(to)) != 0;
        let en_passant_capture = natively
            && piece.kind == PieceKind::Pawn
            && en_passant_target == Some(to)
            && file_of(from) != file_of(to)
            && board.is_empty_square(to);
        (
            is_power_move(board, from, to, en_passant_target),
            en_passant_capture,
            false,
        )
    };

    let castling = !power_move && is_castling_move(board, from, to);
    let double_step = piece.kind == PieceKind::Pawn
        && !power_move
        && file_of(from) == file_of(to)
        && rank_of(from).abs_diff(rank_of(to)) == 2;

    let needs_promotion = rank_of(to) == piece.color.promotion_rank()
        && (piece.kind == PieceKind::Pawn
            || (power_move && !piece.is_king() && piece.power == Some(PieceKind::Pawn)));

    let mut next = board.clone();
    let mut moving = next.take(from).ok_or(MoveRejection::NoPieceAt(from))?;
    let captured = if en_passant_capture {
        next.take(en_passant_victim_square(to, piece.color))
    } else {
        next.take(to)
    };

    moving.has_moved = true;
    if power_move || resolution.force_power_mode {
        moving.power = None;
    }
    if let Some(victim) = captured {
        if !victim.is_king() {
            moving.power = Some(victim.original_kind);
        }
    }

    // A promoted piece keeps whatever power survived the rules above.
    let promotion = if needs_promotion { resolution.promotion } else { None };
    if let Some(kind) = promotion {
        moving.kind = kind;
    }
    next.set(to, Some(moving));

    if castling {
        let rank = rank_of(from);
        let (rook_from, rook_to) = if file_of(to) == 6 {
            (square_at(7, rank), square_at(5, rank))
        } else {
            (square_at(0, rank), square_at(3, rank))
        };
        if let Some(rook) = next.take(rook_from) {
            next.set(rook_to, Some(rook.moved()));
        }
    }

    Ok(AppliedMove {
        board: next,
        piece,
        captured,
        power_move,
        en_passant_capture,
        castling,
        double_step,
        promotion,
        needs_promotion,
        needs_en_passant_choice,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::board::Board;

    fn resolve(promotion: Option<PieceKind>) -> MoveResolution {
        MoveResolution {
            promotion,
            ..MoveResolution::default()
        }
    }

    #[test]
    fn capture_grants_the_original_kind_as_power() {
        let mut board = Board::empty();
        board.set(2, Some(Piece::new(PieceKind::Bishop, Color::Light)));
        let mut promoted = Piece::new(PieceKind::Pawn, Color::Dark);
        promoted.kind = PieceKind::Queen;
        board.set(20, Some(promoted));

        let applied = apply_board_move(&board, 2, 20, None, &MoveResolution::default())
            .expect("capture should apply");
        let bishop = applied.board.piece_at(20).expect("bishop should land on e3");
        assert_eq!(bishop.power, Some(PieceKind::Pawn));
        assert_eq!(applied.captured.map(|p| p.kind), Some(PieceKind::Queen));
        assert!(!applied.power_move);
    }

    #[test]
    fn capturing_a_king_grants_no_power() {
        let mut board = Board::empty();
        board.set(0, Some(Piece::new(PieceKind::Rook, Color::Light)));
        board.set(56, Some(Piece::new(PieceKind::King, Color::Dark)));
        let applied = apply_board_move(&board, 0, 56, None, &MoveResolution::default())
            .expect("king capture should apply");
        assert_eq!(applied.board.piece_at(56).and_then(|p| p.power), None);
        assert!(applied.captured.is_some_and(|p| p.is_king()));
    }

    #[test]
    fn power_move_consumes_the_power() {
        let mut board = Board::empty();
        board.set(
            27,
            Some(Piece::new(PieceKind::Bishop, Color::Light).with_power(PieceKind::Knight)),
        );
        let applied = apply_board_move(&board, 27, 44, None, &MoveResolution::default())
            .expect("power move should apply");
        assert!(applied.power_move);
        assert_eq!(applied.board.piece_at(44).and_then(|p| p.power), None);
    }

    #[test]
    fn native_move_keeps_the_power_unless_forced() {
        let mut board = Board::empty();
        board.set(
            27,
            Some(Piece::new(PieceKind::Bishop, Color::Light).with_power(PieceKind::Knight)),
        );
        let applied = apply_board_move(&board, 27, 36, None, &MoveResolution::default())
            .expect("native move should apply");
        assert_eq!(applied.board.piece_at(36).and_then(|p| p.power), Some(PieceKind::Knight));

        let forced = MoveResolution {
            force_power_mode: true,
            ..MoveResolution::default()
        };
        let applied = apply_board_move(&board, 27, 36, None, &forced).expect("forced move should apply");
        assert_eq!(applied.board.piece_at(36).and_then(|p| p.power), None);
    }

    #[test]
    fn castling_moves_the_rook() {
        let mut board = Board::empty();
        board.set(4, Some(Piece::new(PieceKind::King, Color::Light)));
        board.set(0, Some(Piece::new(PieceKind::Rook, Color::Light)));
        let applied = apply_board_move(&board, 4, 2, None, &MoveResolution::default())
            .expect("castling should apply");
        assert!(applied.castling);
        assert!(applied.board.is_empty_square(0));
        assert_eq!(applied.board.piece_at(3).map(|p| p.kind), Some(PieceKind::Rook));
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let mut board = Board::empty();
        board.set(36, Some(Piece::new(PieceKind::Pawn, Color::Light).moved()));
        board.set(35, Some(Piece::new(PieceKind::Pawn, Color::Dark).moved()));
        let applied = apply_board_move(&board, 36, 43, Some(43), &MoveResolution::default())
            .expect("en passant should apply");
        assert!(applied.en_passant_capture);
        assert!(applied.board.is_empty_square(35));
        assert_eq!(applied.board.piece_at(43).and_then(|p| p.power), Some(PieceKind::Pawn));
    }

    #[test]
    fn promotion_power_prefers_the_captured_piece() {
        let mut board = Board::empty();
        board.set(
            54,
            Some(Piece::new(PieceKind::Pawn, Color::Light).moved().with_power(PieceKind::Knight)),
        );
        board.set(63, Some(Piece::new(PieceKind::Rook, Color::Dark)));

        let capture = apply_board_move(&board, 54, 63, None, &resolve(Some(PieceKind::Queen)))
            .expect("capture-promotion should apply");
        let queen = capture.board.piece_at(63).expect("promoted piece on h8");
        assert_eq!(queen.kind, PieceKind::Queen);
        assert_eq!(queen.original_kind, PieceKind::Pawn);
        assert_eq!(queen.power, Some(PieceKind::Rook));

        let push = apply_board_move(&board, 54, 62, None, &resolve(Some(PieceKind::Knight)))
            .expect("push-promotion should apply");
        assert_eq!(push.board.piece_at(62).and_then(|p| p.power), Some(PieceKind::Knight));
    }

    #[test]
    fn promotion_without_choice_is_flagged() {
        let mut board = Board::empty();
        board.set(52, Some(Piece::new(PieceKind::Pawn, Color::Light).moved()));
        let applied = apply_board_move(&board, 52, 60, None, &MoveResolution::default())
            .expect("push should apply");
        assert!(applied.needs_promotion);
        assert_eq!(applied.promotion, None);

        let err = apply_board_move(&board, 52, 60, None, &resolve(Some(PieceKind::King)))
            .expect_err("king is not a promotion choice");
        assert_eq!(err, MoveRejection::InvalidPromotionChoice(PieceKind::King));
    }
}
