//! Error types used throughout the crate.
//!
//! Each subsystem gets its own enum so callers can match on the failures
//! that concern them:
//! - `MoveRejection` for move attempts and choice resolution. A rejection
//!   never changes game state; the caller re-prompts.
//! - `TreeError` for analysis tree lookups and snapshot loading.
//! - `PersistenceError` for the analysis store. Always recoverable: the
//!   in-memory tree is untouched by a failed save or load.
//! - `AdvisorError` for the background search session.
//! - `ConfigError` for environment configuration.

use thiserror::Error;

use crate::game_state::chess_types::{Color, PieceKind, Square};

/// Why a move attempt or pending-choice resolution was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveRejection {
    /// The game already has a final status.
    #[error("the game is over")]
    GameOver,

    /// Payload: the origin square that held no piece.
    #[error("no piece on square {0}")]
    NoPieceAt(Square),

    /// The origin piece belongs to the side not on move.
    #[error("it is {0:?}'s turn")]
    NotYourTurn(Color),

    /// The destination is not among the piece's legal destinations.
    ///
    /// Payload: (from, to).
    #[error("illegal destination {1} for the piece on {0}")]
    IllegalDestination(Square, Square),

    /// A promotion or en-passant prompt must be answered first.
    #[error("a pending choice must be resolved before another move")]
    AwaitingChoice,

    /// A resolution call arrived while no matching choice was pending.
    #[error("no pending choice of this kind")]
    NoPendingChoice,

    /// Payload: the rejected promotion piece.
    #[error("cannot promote to {0:?}")]
    InvalidPromotionChoice(PieceKind),

    /// A draw claim was made without threefold repetition or fifty moves.
    #[error("no draw is claimable in this position")]
    NothingToClaim,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("unknown analysis node {0}")]
    UnknownNode(u32),

    #[error("malformed tree snapshot: {0}")]
    MalformedSnapshot(String),
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("analysis document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("analysis {analysis_id} not found for owner {owner_id}")]
    NotFound {
        owner_id: String,
        analysis_id: String,
    },

    #[error(transparent)]
    Tree(#[from] TreeError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdvisorError {
    #[error("search worker is not running")]
    WorkerUnavailable,

    #[error("search failed: {0}")]
    Search(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Payload: (variable name, offending value).
    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(&'static str, String),
}
