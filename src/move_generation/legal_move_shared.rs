use crate::game_state::chess_types::*;

pub const ALL_PIECE_KINDS: [PieceKind; 6] = [
    PieceKind::Pawn,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
    PieceKind::King,
];

#[inline]
pub const fn bit(square: Square) -> u64 {
    1u64 << square
}

/// Iterate the set squares of a mask, lowest first.
pub fn squares_of(mut mask: u64) -> impl Iterator<Item = Square> {
    std::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let sq = mask.trailing_zeros() as Square;
        mask &= mask - 1;
        Some(sq)
    })
}

/// Square of the pawn removed by an en-passant capture onto `target`.
#[inline]
pub fn en_passant_victim_square(target: Square, capturer: Color) -> Square {
    match capturer {
        Color::Light => target - 8,
        Color::Dark => target + 8,
    }
}

/// True if an enemy pawn actually sits behind `target` for `capturer`.
pub fn en_passant_victim_present(board: &Board, target: Square, capturer: Color) -> bool {
    let target_rank = match capturer {
        Color::Light => 5,
        Color::Dark => 2,
    };
    if rank_of(target) != target_rank {
        return false;
    }
    matches!(
        board.piece_at(en_passant_victim_square(target, capturer)),
        Some(piece) if piece.color != capturer && piece.kind == PieceKind::Pawn
    )
}
