//! Engine abstraction layer used by the move advisor.
//!
//! Defines common input parameters and output payloads so different engine
//! strategies can be selected at runtime behind a single trait interface.

use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::chess_errors::{AdvisorError, ConfigError};
use crate::engines::engine_greedy::GreedyEngine;
use crate::engines::engine_iterative::IterativeEngine;
use crate::engines::engine_random::RandomEngine;
use crate::game_state::game_state::GameState;
use crate::search::iterative_deepening::SearchMove;

#[derive(Debug, Clone, Default)]
pub struct GoParams {
    pub depth: Option<u8>,
    /// Raised by the session to abandon the search.
    pub stop: Arc<AtomicBool>,
}

#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    pub best_move: Option<SearchMove>,
    pub info_lines: Vec<String>,
}

pub trait Engine: Send {
    fn name(&self) -> &str;

    fn new_game(&mut self) {}

    /// `progress` receives the best move found so far with the depth it
    /// was found at.
    fn choose_move(
        &mut self,
        game_state: &GameState,
        params: &GoParams,
        progress: &mut dyn FnMut(u8, &SearchMove),
    ) -> Result<EngineOutput, AdvisorError>;
}

/// Engine selection for the advisor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EngineKind {
    Random,
    Greedy,
    #[default]
    Iterative,
}

impl EngineKind {
    pub fn build(self, default_depth: u8) -> Box<dyn Engine> {
        match self {
            EngineKind::Random => Box::new(RandomEngine::new()),
            EngineKind::Greedy => Box::new(GreedyEngine::new()),
            EngineKind::Iterative => Box::new(IterativeEngine::new(default_depth)),
        }
    }
}

impl FromStr for EngineKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(EngineKind::Random),
            "greedy" => Ok(EngineKind::Greedy),
            "iterative" => Ok(EngineKind::Iterative),
            _ => Err(ConfigError::InvalidValue("POWER_CHESS_ADVISOR_ENGINE", s.to_owned())),
        }
    }
}
