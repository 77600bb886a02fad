use crate::chess_errors::AdvisorError;
use crate::engines::engine_trait::{Engine, EngineOutput, GoParams};
use crate::game_state::game_state::GameState;
use crate::search::board_scoring::MaterialScorer;
use crate::search::iterative_deepening::{iterative_deepening_search, SearchConfig, SearchMove};

pub struct IterativeEngine {
    default_depth: u8,
    scorer: MaterialScorer,
}

impl IterativeEngine {
    pub fn new(default_depth: u8) -> Self {
        Self {
            default_depth,
            scorer: MaterialScorer,
        }
    }
}

impl Engine for IterativeEngine {
    fn name(&self) -> &str {
        "PowerChess Iterative"
    }

    fn choose_move(
        &mut self,
        game_state: &GameState,
        params: &GoParams,
        progress: &mut dyn FnMut(u8, &SearchMove),
    ) -> Result<EngineOutput, AdvisorError> {
        let depth = params.depth.unwrap_or(self.default_depth).max(1);

        let result = iterative_deepening_search(
            game_state,
            &self.scorer,
            SearchConfig { max_depth: depth },
            &params.stop,
            |partial| {
                if let Some(mv) = &partial.best_move {
                    progress(partial.reached_depth, mv);
                }
            },
        );

        let mut out = EngineOutput {
            best_move: result.best_move,
            ..EngineOutput::default()
        };
        out.info_lines.push(format!(
            "depth {} score cp {} nodes {}",
            result.reached_depth, result.best_score, result.nodes
        ));
        if result.stopped {
            out.info_lines.push("iterative_engine stopped".to_owned());
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_progress_per_depth() {
        let mut engine = IterativeEngine::new(2);
        let mut depths = Vec::new();
        let out = engine
            .choose_move(&GameState::new_game(), &GoParams::default(), &mut |depth, _| depths.push(depth))
            .expect("search should not fail");
        assert_eq!(depths, vec![1, 2]);
        assert!(out.best_move.is_some());
    }
}
