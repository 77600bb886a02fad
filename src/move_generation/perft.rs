//! Perft node counting over the power-absorption rules.
//!
//! Each pending choice is expanded into its answers: a promotion counts once
//! per promotion piece and an ambiguous en passant once per reading. Nodes
//! where a king was captured are terminal.

use std::thread;

use crate::game_state::chess_rules::PROMOTION_CHOICES;
use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_apply::{apply_board_move, AppliedMove, MoveResolution};
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::move_generation::legal_move_generator::{
    is_ambiguous_en_passant, legal_en_passant_readings, legal_moves_for,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: usize,
    pub captures: usize,
    pub en_passant: usize,
    pub castles: usize,
    pub promotions: usize,
    pub power_moves: usize,
    pub checks: usize,
    pub king_captures: usize,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.power_moves += rhs.power_moves;
        self.checks += rhs.checks;
        self.king_captures += rhs.king_captures;
    }

    fn record_leaf(&mut self, applied: &AppliedMove, mover: Color) {
        self.nodes += 1;
        if applied.captured.is_some() {
            self.captures += 1;
        }
        if applied.en_passant_capture {
            self.en_passant += 1;
        }
        if applied.castling {
            self.castles += 1;
        }
        if applied.promotion.is_some() {
            self.promotions += 1;
        }
        if applied.power_move {
            self.power_moves += 1;
        }
        if applied.captured.is_some_and(|p| p.is_king()) {
            self.king_captures += 1;
        } else if is_king_in_check(&applied.board, mover.opposite()) {
            self.checks += 1;
        }
    }
}

/// Every fully resolved outcome of `from -> to`.
pub fn resolved_moves(
    board: &Board,
    from: Square,
    to: Square,
    en_passant_target: Option<Square>,
) -> Vec<AppliedMove> {
    let readings: Vec<MoveResolution> = if is_ambiguous_en_passant(board, from, to, en_passant_target) {
        legal_en_passant_readings(board, from, to, en_passant_target)
            .into_iter()
            .map(|choice| MoveResolution {
                en_passant: Some(choice),
                ..MoveResolution::default()
            })
            .collect()
    } else {
        vec![MoveResolution::default()]
    };

    let mut out = Vec::new();
    for reading in readings {
        let Ok(applied) = apply_board_move(board, from, to, en_passant_target, &reading) else {
            continue;
        };
        if !applied.needs_promotion {
            out.push(applied);
            continue;
        }
        for promotion in PROMOTION_CHOICES {
            let choice = MoveResolution {
                promotion: Some(promotion),
                ..reading
            };
            if let Ok(promoted) = apply_board_move(board, from, to, en_passant_target, &choice) {
                out.push(promoted);
            }
        }
    }
    out
}

fn next_en_passant(applied: &AppliedMove, from: Square, to: Square) -> Option<Square> {
    applied.double_step.then(|| (from + to) / 2)
}

pub fn perft(game_state: &GameState, depth: u8) -> PerftCounts {
    perft_position(
        &game_state.board,
        game_state.turn,
        game_state.en_passant_target,
        depth,
    )
}

pub fn perft_position(
    board: &Board,
    turn: Color,
    en_passant_target: Option<Square>,
    depth: u8,
) -> PerftCounts {
    let mut total = PerftCounts::default();
    if depth == 0 {
        total.nodes = 1;
        return total;
    }
    perft_recurse(board, turn, en_passant_target, depth, &mut total);
    total
}

/// Root moves are split across threads, one per move.
pub fn perft_multi_threaded(game_state: &GameState, depth: u8) -> PerftCounts {
    if depth <= 1 {
        return perft(game_state, depth);
    }

    let turn = game_state.turn;
    let ep = game_state.en_passant_target;
    let mut handles = Vec::new();
    for (from, to) in legal_moves_for(&game_state.board, turn, ep) {
        for applied in resolved_moves(&game_state.board, from, to, ep) {
            handles.push(thread::spawn(move || {
                let mut local = PerftCounts::default();
                if !applied.captured.is_some_and(|p| p.is_king()) {
                    perft_recurse(
                        &applied.board,
                        turn.opposite(),
                        next_en_passant(&applied, from, to),
                        depth - 1,
                        &mut local,
                    );
                }
                local
            }));
        }
    }

    let mut total = PerftCounts::default();
    for handle in handles {
        match handle.join() {
            Ok(local) => total.merge(local),
            Err(_) => tracing::warn!("perft worker thread panicked"),
        }
    }
    total
}

fn perft_recurse(
    board: &Board,
    turn: Color,
    en_passant_target: Option<Square>,
    depth: u8,
    counts: &mut PerftCounts,
) {
    for (from, to) in legal_moves_for(board, turn, en_passant_target) {
        for applied in resolved_moves(board, from, to, en_passant_target) {
            if depth == 1 {
                counts.record_leaf(&applied, turn);
                continue;
            }
            if applied.captured.is_some_and(|p| p.is_king()) {
                continue;
            }
            perft_recurse(
                &applied.board,
                turn.opposite(),
                next_en_passant(&applied, from, to),
                depth - 1,
                counts,
            );
        }
    }
}
