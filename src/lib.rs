//! Crate root module declarations for the Power Chess rule engine.
//!
//! This file exposes the subsystems (game state and turn transitions, move
//! generation with borrowed powers, search and the hint advisor, engines,
//! the analysis tree with its persistence, and utility helpers) so the
//! console binary, tests, and benches can import stable module paths.

pub mod game_state {
    pub mod board;
    pub mod chess_rules;
    pub mod chess_types;
    pub mod game_end;
    pub mod game_state;
    pub mod turn_transition;
}

pub mod moves {
    pub mod leaper_moves;
    pub mod pawn_moves;
    pub mod slider_moves;
}

pub mod move_generation {
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod legal_move_shared;
    pub mod perft;
}

pub mod search {
    pub mod advisor_protocol;
    pub mod board_scoring;
    pub mod iterative_deepening;
    pub mod search_session;
    pub mod zobrist;
}

pub mod engines {
    pub mod engine_greedy;
    pub mod engine_iterative;
    pub mod engine_random;
    pub mod engine_trait;
}

pub mod analysis {
    pub mod analysis_session;
    pub mod analysis_store;
    pub mod analysis_tree;
}

pub mod utils {
    pub mod algebraic;
    pub mod notation;
    pub mod render_game_state;
}

pub mod chess_errors;
pub mod config;
