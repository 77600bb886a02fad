//! Turn transition state machine.
//!
//! `attempt_move` validates a move for the side to move and either commits a
//! new `GameState` or parks the pre-move state in a pending phase when the
//! player still has to pick a promotion piece or an en-passant reading. The
//! `resolve_*` functions finish a parked move with the stored context.

use tracing::{debug, info};

use crate::chess_errors::MoveRejection;
use crate::game_state::chess_rules::PROMOTION_CHOICES;
use crate::game_state::chess_types::*;
use crate::game_state::game_end::{check_suffix, claimable_draw, classify_position, end_event};
use crate::game_state::game_state::MoveOptions;
use crate::move_generation::legal_move_apply::{apply_board_move, AppliedMove, MoveResolution};
use crate::move_generation::legal_move_generator::{
    is_ambiguous_en_passant, legal_en_passant_readings, valid_move_mask,
};
use crate::move_generation::legal_move_shared::bit;
use crate::search::zobrist::repetition_key;
use crate::utils::notation::notate;

/// Outcome of a move attempt or a choice resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// A new snapshot with the events the move produced.
    Committed {
        state: GameState,
        events: Vec<GameEvent>,
    },
    /// The move waits for player input; `phase` says which.
    Pending(GameState),
}

impl Transition {
    #[inline]
    pub fn state(&self) -> &GameState {
        match self {
            Transition::Committed { state, .. } | Transition::Pending(state) => state,
        }
    }

    #[inline]
    pub fn into_state(self) -> GameState {
        match self {
            Transition::Committed { state, .. } | Transition::Pending(state) => state,
        }
    }

    #[inline]
    pub fn is_committed(&self) -> bool {
        matches!(self, Transition::Committed { .. })
    }
}

pub fn attempt_move(
    game_state: &GameState,
    from: Square,
    to: Square,
    options: MoveOptions,
) -> Result<Transition, MoveRejection> {
    if game_state.status.is_over() {
        return Err(MoveRejection::GameOver);
    }
    if game_state.is_awaiting_choice() {
        return Err(MoveRejection::AwaitingChoice);
    }

    let piece = game_state
        .board
        .piece_at(from)
        .ok_or(MoveRejection::NoPieceAt(from))?;
    if piece.color != game_state.turn {
        return Err(MoveRejection::NotYourTurn(game_state.turn));
    }
    let legal = valid_move_mask(&game_state.board, from, game_state.en_passant_target, true);
    if (legal & bit(to)) == 0 {
        return Err(MoveRejection::IllegalDestination(from, to));
    }

    let pending = PendingMove { from, to, options };
    let resolution = MoveResolution {
        force_power_mode: options.force_power_mode,
        ..MoveResolution::default()
    };
    advance(game_state, pending, resolution)
}

/// Finish a move parked in `AwaitingPromotionChoice`.
pub fn resolve_promotion(
    game_state: &GameState,
    promotion: PieceKind,
) -> Result<Transition, MoveRejection> {
    let TurnPhase::AwaitingPromotionChoice(pending) = game_state.phase else {
        return Err(MoveRejection::NoPendingChoice);
    };
    if !PROMOTION_CHOICES.contains(&promotion) {
        return Err(MoveRejection::InvalidPromotionChoice(promotion));
    }
    let resolution = MoveResolution {
        promotion: Some(promotion),
        en_passant: None,
        force_power_mode: pending.options.force_power_mode,
    };
    advance(game_state, pending, resolution)
}

/// Finish a move parked in `AwaitingEnPassantChoice`.
pub fn resolve_en_passant(
    game_state: &GameState,
    choice: EnPassantChoice,
) -> Result<Transition, MoveRejection> {
    let TurnPhase::AwaitingEnPassantChoice(pending) = game_state.phase else {
        return Err(MoveRejection::NoPendingChoice);
    };
    let resolution = MoveResolution {
        promotion: None,
        en_passant: Some(choice),
        force_power_mode: pending.options.force_power_mode,
    };
    advance(game_state, pending, resolution)
}

/// Drop a pending choice without committing anything.
pub fn cancel_pending(game_state: &GameState) -> Result<GameState, MoveRejection> {
    if !game_state.is_awaiting_choice() {
        return Err(MoveRejection::NoPendingChoice);
    }
    let mut next = game_state.clone();
    next.phase = TurnPhase::Normal;
    debug!("pending choice cancelled");
    Ok(next)
}

fn advance(
    game_state: &GameState,
    pending: PendingMove,
    mut resolution: MoveResolution,
) -> Result<Transition, MoveRejection> {
    let PendingMove { from, to, options } = pending;
    let ep = game_state.en_passant_target;
    if is_ambiguous_en_passant(&game_state.board, from, to, ep) {
        // Readings are checked separately; one that leaves the king attacked is never applied.
        let legal = legal_en_passant_readings(&game_state.board, from, to, ep);
        let choice = match resolution.en_passant {
            Some(choice) => Some(choice),
            None if options.force_power_mode || legal.len() == 1 => legal.first().copied(),
            None => None,
        };
        if let Some(choice) = choice {
            if !legal.contains(&choice) {
                return Err(MoveRejection::IllegalDestination(from, to));
            }
            resolution.en_passant = Some(choice);
        }
    }

    let applied = apply_board_move(&game_state.board, from, to, ep, &resolution)?;

    if applied.needs_promotion && applied.promotion.is_none() {
        debug!(from, to, "awaiting promotion choice");
        return Ok(Transition::Pending(parked(
            game_state,
            TurnPhase::AwaitingPromotionChoice(pending),
        )));
    }
    if applied.needs_en_passant_choice {
        debug!(from, to, "awaiting en passant choice");
        return Ok(Transition::Pending(parked(
            game_state,
            TurnPhase::AwaitingEnPassantChoice(pending),
        )));
    }

    Ok(finalize(game_state, pending, applied))
}

fn parked(game_state: &GameState, phase: TurnPhase) -> GameState {
    let mut next = game_state.clone();
    next.phase = phase;
    next
}

fn finalize(game_state: &GameState, pending: PendingMove, applied: AppliedMove) -> Transition {
    let PendingMove { from, to, options } = pending;
    let mover = game_state.turn;
    let next_turn = mover.opposite();
    let piece = applied.piece;
    let power_move = applied.power_move || (options.force_power_mode && piece.power.is_some());

    let mut notation = notate(
        &game_state.board,
        game_state.en_passant_target,
        from,
        to,
        &applied,
        options.force_power_mode,
    );

    let mut events = Vec::new();
    let mut next = game_state.clone();
    next.phase = TurnPhase::Normal;
    next.board = applied.board;
    next.turn = next_turn;

    if let Some(victim) = applied.captured {
        next.captured_pieces.push(victim);
        events.push(GameEvent::CaptureMade {
            captured: victim.kind,
            by: mover,
        });
        if !victim.is_king() {
            events.push(GameEvent::PowerGained {
                square: to,
                power: victim.original_kind,
            });
        }
    }

    next.halfmove_clock = if piece.kind == PieceKind::Pawn || applied.captured.is_some() {
        0
    } else {
        game_state.halfmove_clock.saturating_add(1)
    };
    if mover == Color::Dark {
        next.fullmove_number = game_state.fullmove_number.saturating_add(1);
    }
    next.en_passant_target = if applied.double_step {
        Some((from + to) / 2)
    } else {
        None
    };

    let key = repetition_key(&next.board, next_turn, next.en_passant_target);
    *next.position_history.entry(key).or_insert(0) += 1;

    let king_captured = applied.captured.is_some_and(|victim| victim.is_king());
    let (status, winner) =
        classify_position(&next.board, mover, next.en_passant_target, king_captured);
    next.status = status;
    next.winner = winner;
    if options.auto_draws && !next.status.is_over() {
        if let Some(draw) = claimable_draw(&next) {
            next.status = draw;
        }
    }

    notation.extend(check_suffix(next.status, &next.board, next_turn));

    let record = ChessMove {
        from,
        to,
        piece: piece.kind,
        color: mover,
        captured: applied.captured.map(|victim| victim.kind),
        promotion: applied.promotion,
        power_move,
        notation: notation.clone(),
    };
    next.move_history.push(record.clone());
    next.last_move = Some(record);

    events.insert(0, GameEvent::MoveMade { notation });
    if let Some(event) = end_event(&next) {
        info!(status = ?next.status, winner = ?next.winner, "game over");
        events.push(event);
    }
    debug!(
        from,
        to,
        power_move,
        halfmove = next.halfmove_clock,
        repetitions = next.position_history.get(&key).copied().unwrap_or(0),
        "move committed"
    );

    Transition::Committed {
        state: next,
        events,
    }
}
