//! Messages exchanged with the background move advisor.
//!
//! Requests are tagged by `command`, responses by `type`. Every message
//! carries the request id it belongs to; the session drops responses whose
//! id is not the latest one it issued.

use serde::{Deserialize, Serialize};

use crate::game_state::chess_types::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AdvisorRequest {
    #[serde(rename_all = "camelCase")]
    Start {
        board: Board,
        turn: Color,
        max_depth: u8,
        request_id: u64,
        #[serde(default)]
        en_passant_target: Option<Square>,
    },
    #[serde(rename_all = "camelCase")]
    Stop { request_id: u64 },
}

impl AdvisorRequest {
    #[inline]
    pub fn request_id(&self) -> u64 {
        match self {
            AdvisorRequest::Start { request_id, .. } | AdvisorRequest::Stop { request_id } => *request_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdvisorResponse {
    #[serde(rename_all = "camelCase")]
    Progress {
        request_id: u64,
        move_notation: String,
        depth: u8,
    },
    #[serde(rename_all = "camelCase")]
    Complete {
        request_id: u64,
        move_notation: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Failed { request_id: u64 },
}

impl AdvisorResponse {
    #[inline]
    pub fn request_id(&self) -> u64 {
        match self {
            AdvisorResponse::Progress { request_id, .. }
            | AdvisorResponse::Complete { request_id, .. }
            | AdvisorResponse::Failed { request_id } => *request_id,
        }
    }
}
