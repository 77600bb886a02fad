//! Move text for resolved moves.
//!
//! Standard algebraic shape with two variant additions: a power move is
//! suffixed with `^` and the letter of the power it spent (`Be6^N`), and
//! disambiguation considers every same-kind piece that can legally reach
//! the destination, powers included.

use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_apply::AppliedMove;
use crate::move_generation::legal_move_generator::valid_move_mask;
use crate::move_generation::legal_move_shared::bit;
use crate::utils::algebraic::{file_char, rank_char, square_to_algebraic};

/// Format `from -> to` as played on `board` (the position before the move).
pub fn notate(
    board: &Board,
    en_passant_target: Option<Square>,
    from: Square,
    to: Square,
    applied: &AppliedMove,
    force_power_mode: bool,
) -> String {
    let piece = applied.piece;

    if applied.castling {
        return if file_of(to) == 6 { "O-O".to_owned() } else { "O-O-O".to_owned() };
    }

    let mut text = String::new();
    if let Some(letter) = piece.kind.letter() {
        text.push(letter);
    }

    let capture = applied.captured.is_some();
    if piece.kind == PieceKind::Pawn && capture {
        text.push(file_char(from));
    } else {
        text.push_str(&disambiguation(board, en_passant_target, from, to, &piece));
    }

    if capture {
        text.push('x');
    }
    text.push_str(&square_to_algebraic(to));

    if let Some(promotion) = applied.promotion {
        text.push('=');
        text.push(promotion.power_letter());
    }

    if applied.power_move || force_power_mode {
        if let Some(power) = piece.power {
            text.push('^');
            text.push(power.power_letter());
        }
    }

    text
}

fn disambiguation(
    board: &Board,
    en_passant_target: Option<Square>,
    from: Square,
    to: Square,
    piece: &Piece,
) -> String {
    let rivals: Vec<Square> = board
        .pieces_of(piece.color)
        .filter(|(sq, other)| *sq != from && other.kind == piece.kind)
        .filter(|(sq, _)| (valid_move_mask(board, *sq, en_passant_target, true) & bit(to)) != 0)
        .map(|(sq, _)| sq)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }
    if rivals.iter().all(|sq| file_of(*sq) != file_of(from)) {
        return file_char(from).to_string();
    }
    if rivals.iter().all(|sq| rank_of(*sq) != rank_of(from)) {
        return rank_char(from).to_string();
    }
    square_to_algebraic(from)
}
