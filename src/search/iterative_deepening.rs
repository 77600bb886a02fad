//! Iterative deepening search with negamax alpha-beta pruning.
//!
//! Runs depth 1, 2, ... up to the configured limit, reporting the best move
//! after each completed depth. A raised stop flag aborts the depth in
//! progress; the result of the last completed depth is kept.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::game_state::chess_types::*;
use crate::game_state::game_end::{check_suffix, classify_position};
use crate::move_generation::legal_move_apply::AppliedMove;
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::move_generation::legal_move_generator::legal_moves_for;
use crate::move_generation::perft::resolved_moves;
use crate::search::board_scoring::{BoardScorer, MaterialScorer, MATE_SCORE};
use crate::utils::notation::notate;

#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    pub max_depth: u8,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_depth: 3 }
    }
}

/// A fully resolved suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
    pub en_passant: Option<EnPassantChoice>,
    pub notation: String,
}

impl SearchMove {
    pub fn from_applied(
        board: &Board,
        en_passant_target: Option<Square>,
        from: Square,
        to: Square,
        applied: &AppliedMove,
    ) -> Self {
        let en_passant = if applied.en_passant_capture {
            Some(EnPassantChoice::Capture)
        } else if applied.power_move && en_passant_target == Some(to) && applied.piece.kind == PieceKind::Pawn {
            Some(EnPassantChoice::Move)
        } else {
            None
        };
        let mover = applied.piece.color;
        let next_ep = applied.double_step.then(|| (from + to) / 2);
        let king_captured = applied.captured.is_some_and(|p| p.is_king());
        let (status, _) = classify_position(&applied.board, mover, next_ep, king_captured);
        let mut notation = notate(board, en_passant_target, from, to, applied, false);
        notation.extend(check_suffix(status, &applied.board, mover.opposite()));
        Self {
            from,
            to,
            promotion: applied.promotion,
            en_passant,
            notation,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Option<SearchMove>,
    pub best_score: i32,
    pub reached_depth: u8,
    pub nodes: u64,
    pub stopped: bool,
}

struct Child {
    from: Square,
    to: Square,
    applied: AppliedMove,
    en_passant_target: Option<Square>,
    king_captured: bool,
    order_key: i32,
}

fn children(board: &Board, turn: Color, en_passant_target: Option<Square>) -> Vec<Child> {
    let mut out = Vec::new();
    for (from, to) in legal_moves_for(board, turn, en_passant_target) {
        for applied in resolved_moves(board, from, to, en_passant_target) {
            let order_key = applied
                .captured
                .map_or(0, |victim| MaterialScorer::piece_value(victim.kind));
            out.push(Child {
                from,
                to,
                en_passant_target: applied.double_step.then(|| (from + to) / 2),
                king_captured: applied.captured.is_some_and(|p| p.is_king()),
                applied,
                order_key,
            });
        }
    }
    out.sort_by(|a, b| b.order_key.cmp(&a.order_key));
    out
}

/// Search `game_state` and call `on_depth` after every completed depth.
pub fn iterative_deepening_search<S: BoardScorer>(
    game_state: &GameState,
    scorer: &S,
    config: SearchConfig,
    stop: &AtomicBool,
    mut on_depth: impl FnMut(&SearchResult),
) -> SearchResult {
    let board = &game_state.board;
    let turn = game_state.turn;

    if config.max_depth == 0 {
        return SearchResult {
            best_score: scorer.score(board, turn),
            nodes: 1,
            ..SearchResult::default()
        };
    }

    let mut result = SearchResult::default();
    let root_children = children(board, turn, game_state.en_passant_target);
    if root_children.is_empty() {
        result.best_score = terminal_score(board, turn, 0);
        result.nodes = 1;
        return result;
    }

    for depth in 1..=config.max_depth {
        let mut nodes = 0u64;
        let Some((best_child, best_score)) =
            negamax_root(&root_children, turn, scorer, depth, stop, &mut nodes)
        else {
            result.stopped = true;
            break;
        };

        result.best_move = Some(SearchMove::from_applied(
            board,
            game_state.en_passant_target,
            best_child.from,
            best_child.to,
            &best_child.applied,
        ));
        result.best_score = best_score;
        result.reached_depth = depth;
        result.nodes = nodes;
        on_depth(&result);
    }

    result
}

fn negamax_root<'a, S: BoardScorer>(
    root_children: &'a [Child],
    turn: Color,
    scorer: &S,
    depth: u8,
    stop: &AtomicBool,
    nodes: &mut u64,
) -> Option<(&'a Child, i32)> {
    let mut alpha = -MATE_SCORE;
    let beta = MATE_SCORE;
    let mut best: Option<(&Child, i32)> = None;

    for child in root_children {
        let score = if child.king_captured {
            MATE_SCORE - 1
        } else {
            -negamax(
                &child.applied.board,
                turn.opposite(),
                child.en_passant_target,
                scorer,
                depth.saturating_sub(1),
                -beta,
                -alpha,
                1,
                stop,
                nodes,
            )?
        };

        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((child, score));
        }
        alpha = alpha.max(score);
    }

    best
}

#[allow(clippy::too_many_arguments)]
fn negamax<S: BoardScorer>(
    board: &Board,
    turn: Color,
    en_passant_target: Option<Square>,
    scorer: &S,
    depth: u8,
    mut alpha: i32,
    beta: i32,
    ply: u8,
    stop: &AtomicBool,
    nodes: &mut u64,
) -> Option<i32> {
    if stop.load(Ordering::Relaxed) {
        return None;
    }
    *nodes += 1;

    if depth == 0 {
        return Some(scorer.score(board, turn));
    }

    let moves = children(board, turn, en_passant_target);
    if moves.is_empty() {
        return Some(terminal_score(board, turn, ply));
    }

    let mut best = -MATE_SCORE;
    for child in &moves {
        let score = if child.king_captured {
            MATE_SCORE - i32::from(ply) - 1
        } else {
            -negamax(
                &child.applied.board,
                turn.opposite(),
                child.en_passant_target,
                scorer,
                depth - 1,
                -beta,
                -alpha,
                ply.saturating_add(1),
                stop,
                nodes,
            )?
        };

        best = best.max(score);
        alpha = alpha.max(score);
        if alpha >= beta {
            break;
        }
    }

    Some(best)
}

fn terminal_score(board: &Board, turn: Color, ply: u8) -> i32 {
    if is_king_in_check(board, turn) {
        -MATE_SCORE + i32::from(ply)
    } else {
        0
    }
}
