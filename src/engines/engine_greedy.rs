use rand::prelude::IndexedRandom;

use crate::chess_errors::AdvisorError;
use crate::engines::engine_random::candidate_moves;
use crate::engines::engine_trait::{Engine, EngineOutput, GoParams};
use crate::game_state::chess_types::PieceKind;
use crate::game_state::game_state::GameState;
use crate::search::iterative_deepening::SearchMove;

/// Takes the most valuable piece on offer; a king capture beats everything.
#[derive(Debug, Default)]
pub struct GreedyEngine;

impl GreedyEngine {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn piece_value(piece: PieceKind) -> i32 {
        match piece {
            PieceKind::Pawn => 100,
            PieceKind::Knight => 320,
            PieceKind::Bishop => 330,
            PieceKind::Rook => 500,
            PieceKind::Queen => 900,
            PieceKind::King => 20000,
        }
    }
}

impl Engine for GreedyEngine {
    fn name(&self) -> &str {
        "PowerChess Greedy"
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
            .push(format!("greedy_engine legal_moves {}", candidates.len()));
        if let Some(depth) = params.depth {
            out.info_lines
                .push(format!("greedy_engine requested_depth {depth}"));
        }

        if candidates.is_empty() {
            return Ok(out);
        }

        let mut best_value = i32::MIN;
        let mut best_moves = Vec::new();
        for (mv, captured) in &candidates {
            // Capturing the original kind also hands over its power.
            let capture_value = captured.map_or(0, |victim| {
                Self::piece_value(victim.kind).max(Self::piece_value(victim.original_kind))
            });

            if capture_value > best_value {
                best_value = capture_value;
                best_moves.clear();
                best_moves.push(mv);
            } else if capture_value == best_value {
                best_moves.push(mv);
            }
        }

        let mut rng = rand::rng();
        let picked = best_moves
            .as_slice()
            .choose(&mut rng)
            .ok_or_else(|| AdvisorError::Search("failed to choose greedy best move".to_owned()))?;

        out.info_lines
            .push(format!("greedy_engine capture_score {best_value}"));
        progress(1, picked);
        out.best_move = Some((*picked).clone());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::board::Board;
    use crate::game_state::chess_types::*;

    #[test]
    fn greedy_prefers_the_king() {
        let mut board = Board::empty();
        board.set(0, Some(Piece::new(PieceKind::Rook, Color::Light).moved()));
        board.set(56, Some(Piece::new(PieceKind::King, Color::Dark).moved()));
        board.set(7, Some(Piece::new(PieceKind::Queen, Color::Dark).moved()));
        board.set(27, Some(Piece::new(PieceKind::King, Color::Light).moved()));
        let game = GameState::from_board(board, Color::Light);

        let out = GreedyEngine::new()
            .choose_move(&game, &GoParams::default(), &mut |_, _| {})
            .expect("greedy engine should not fail");
        let best = out.best_move.expect("captures are available");
        assert_eq!((best.from, best.to), (0, 56));
    }
}
