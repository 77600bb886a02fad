//! Canonical rule constants.
//!
//! Starting layout, promotion choices, and the draw thresholds consulted by
//! the transition engine and draw claims.

use crate::game_state::chess_types::PieceKind;

/// Back-rank layout from the a-file to the h-file.
pub const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Pieces a pawn may promote to.
pub const PROMOTION_CHOICES: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

/// Occurrences of one repetition key that make a threefold draw claimable.
pub const THREEFOLD_COUNT: u32 = 3;

/// Half-moves without a pawn move or capture that make a fifty-move draw claimable.
pub const FIFTY_MOVE_HALFMOVES: u16 = 100;
