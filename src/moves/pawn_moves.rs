//! Pawn movement: diagonal capture tables plus push generation.
//!
//! Pushes depend on the mover's color and on whether the mover has moved,
//! so the same rule serves real pawns and pieces holding a pawn power.

use crate::game_state::chess_types::Color;

pub const LIGHT_PAWN_CAPTURES: [u64; 64] = generate_capture_table(1);
pub const DARK_PAWN_CAPTURES: [u64; 64] = generate_capture_table(-1);

#[inline]
pub const fn pawn_captures(color: Color, square: u8) -> u64 {
    match color {
        Color::Light => LIGHT_PAWN_CAPTURES[square as usize],
        Color::Dark => DARK_PAWN_CAPTURES[square as usize],
    }
}

/// Forward pushes onto empty squares. The double step needs an unmoved
/// mover on its color's pawn start rank and both squares empty.
pub fn pawn_pushes(color: Color, square: u8, occupancy: u64, has_moved: bool) -> u64 {
    let rank = (square / 8) as i32;
    let step: i32 = match color {
        Color::Light => 8,
        Color::Dark => -8,
    };

    let one = square as i32 + step;
    if !(0..64).contains(&one) || (occupancy & (1u64 << one)) != 0 {
        return 0;
    }
    let mut pushes = 1u64 << one;

    if !has_moved && rank == color.pawn_start_rank() as i32 {
        let two = one + step;
        if (occupancy & (1u64 << two)) == 0 {
            pushes |= 1u64 << two;
        }
    }

    pushes
}

const fn generate_capture_table(direction: i32) -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let file = (sq % 8) as i32;
        let rank = (sq / 8) as i32 + direction;
        let mut captures = 0u64;

        if rank >= 0 && rank < 8 {
            if file > 0 {
                captures |= 1u64 << (rank * 8 + file - 1);
            }
            if file < 7 {
                captures |= 1u64 << (rank * 8 + file + 1);
            }
        }

        table[sq] = captures;
        sq += 1;
    }

    table
}
