//! Zobrist repetition keys.
//!
//! The key covers, for every occupied square, piece kind, color, and held
//! power, plus side to move and en-passant availability. Keys come from a
//! fixed seed so they are stable across runs and safe to persist inside
//! `positionHistory`.

use std::sync::OnceLock;

use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_shared::{bit, en_passant_victim_present};
use crate::moves::pawn_moves::pawn_captures;

#[derive(Debug)]
struct ZobristTables {
    piece_square: [[[u64; 64]; 6]; 2],
    power_square: [[[u64; 64]; 6]; 2],
    side_to_move: u64,
    en_passant_file: [u64; 8],
}

static TABLES: OnceLock<ZobristTables> = OnceLock::new();

#[inline]
fn tables() -> &'static ZobristTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> ZobristTables {
    let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;

    let mut piece_square = [[[0u64; 64]; 6]; 2];
    let mut power_square = [[[0u64; 64]; 6]; 2];
    for table in [&mut piece_square, &mut power_square] {
        for color in table.iter_mut() {
            for kind in color.iter_mut() {
                for sq in kind.iter_mut() {
                    *sq = next_random_u64(&mut seed);
                }
            }
        }
    }

    let side_to_move = next_random_u64(&mut seed);

    let mut en_passant_file = [0u64; 8];
    for key in &mut en_passant_file {
        *key = next_random_u64(&mut seed);
    }

    ZobristTables {
        piece_square,
        power_square,
        side_to_move,
        en_passant_file,
    }
}

#[inline]
fn next_random_u64(state: &mut u64) -> u64 {
    // splitmix64
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[inline]
fn piece_square_key(color: Color, kind: PieceKind, square: Square) -> u64 {
    tables().piece_square[color.index()][kind.index()][square as usize]
}

#[inline]
fn power_square_key(color: Color, power: PieceKind, square: Square) -> u64 {
    tables().power_square[color.index()][power.index()][square as usize]
}

/// En passant only counts when a pawn of the side to move can take it.
fn en_passant_available(board: &Board, turn: Color, target: Square) -> bool {
    if !board.is_empty_square(target) || !en_passant_victim_present(board, target, turn) {
        return false;
    }
    board.pieces_of(turn).any(|(sq, piece)| {
        piece.kind == PieceKind::Pawn && (pawn_captures(turn, sq) & bit(target)) != 0
    })
}

/// Repetition key for `(board, turn, en_passant_target)`.
pub fn repetition_key(board: &Board, turn: Color, en_passant_target: Option<Square>) -> u64 {
    let mut key = 0u64;

    for (sq, piece) in board.occupied() {
        key ^= piece_square_key(piece.color, piece.kind, sq);
        if let Some(power) = piece.power {
            key ^= power_square_key(piece.color, power, sq);
        }
    }

    if turn == Color::Dark {
        key ^= tables().side_to_move;
    }

    if let Some(target) = en_passant_target {
        if en_passant_available(board, turn, target) {
            key ^= tables().en_passant_file[file_of(target) as usize];
        }
    }

    key
}
