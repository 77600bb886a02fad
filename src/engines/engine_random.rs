//! Random-move engine.
//!
//! Selects uniformly from fully resolved legal moves and is primarily used
//! for diagnostics, integration testing, and low-strength hints.

use rand::prelude::IndexedRandom;

use crate::chess_errors::AdvisorError;
use crate::engines::engine_trait::{Engine, EngineOutput, GoParams};
use crate::game_state::chess_types::Piece;
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_generator::legal_moves;
use crate::move_generation::perft::resolved_moves;
use crate::search::iterative_deepening::SearchMove;

#[derive(Debug, Default)]
pub struct RandomEngine;

impl RandomEngine {
    pub fn new() -> Self {
        Self
    }
}

/// Every resolved move available to the side to move, with its capture.
pub(crate) fn candidate_moves(game_state: &GameState) -> Vec<(SearchMove, Option<Piece>)> {
    let board = &game_state.board;
    let ep = game_state.en_passant_target;
    legal_moves(game_state)
        .into_iter()
        .flat_map(|(from, to)| {
            resolved_moves(board, from, to, ep)
                .into_iter()
                .map(move |applied| {
                    (
                        SearchMove::from_applied(board, ep, from, to, &applied),
                        applied.captured,
                    )
                })
        })
        .collect()
}

impl Engine for RandomEngine {
    fn name(&self) -> &str {
        "PowerChess Random"
    }

    fn choose_move(
        &mut self,
        game_state: &GameState,
        params: &GoParams,
        progress: &mut dyn FnMut(u8, &SearchMove),
    ) -> Result<EngineOutput, AdvisorError> {
        let candidates = candidate_moves(game_state);

        let mut out = EngineOutput::default();
        out.info_lines
            .push(format!("random_engine legal_moves {}", candidates.len()));
        if let Some(depth) = params.depth {
            out.info_lines
                .push(format!("random_engine requested_depth {depth}"));
        }

        if candidates.is_empty() {
            return Ok(out);
        }

        let mut rng = rand::rng();
        let (picked, _) = candidates
            .as_slice()
            .choose(&mut rng)
            .ok_or_else(|| AdvisorError::Search("failed to choose a random move".to_owned()))?;

        progress(1, picked);
        out.best_move = Some(picked.clone());
        Ok(out)
    }
}
