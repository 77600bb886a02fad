//! Immutable game snapshot.
//!
//! A `GameState` is produced once per committed move and never mutated in
//! place afterwards. While a move waits for player input the snapshot keeps
//! the pre-move board and records the pending request in `phase`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::search::zobrist::repetition_key;

/// Flags that change how a move attempt is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveOptions {
    /// Treat the move as power-consuming regardless of how it was reached.
    pub force_power_mode: bool,
    /// Declare threefold / fifty-move draws as soon as they become claimable.
    pub auto_draws: bool,
}

/// Pre-move context stored while waiting for a player choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingMove {
    pub from: Square,
    pub to: Square,
    pub options: MoveOptions,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum TurnPhase {
    #[default]
    Normal,
    AwaitingPromotionChoice(PendingMove),
    AwaitingEnPassantChoice(PendingMove),
}

impl TurnPhase {
    #[inline]
    pub fn pending(&self) -> Option<&PendingMove> {
        match self {
            TurnPhase::Normal => None,
            TurnPhase::AwaitingPromotionChoice(pending)
            | TurnPhase::AwaitingEnPassantChoice(pending) => Some(pending),
        }
    }
}

/// Captured pieces grouped by the color of the piece that was lost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedPieces {
    pub light: Vec<Piece>,
    pub dark: Vec<Piece>,
}

impl CapturedPieces {
    pub fn of(&self, color: Color) -> &[Piece] {
        match color {
            Color::Light => &self.light,
            Color::Dark => &self.dark,
        }
    }

    pub fn push(&mut self, piece: Piece) {
        match piece.color {
            Color::Light => self.light.push(piece),
            Color::Dark => self.dark.push(piece),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub board: Board,
    pub turn: Color,
    pub status: GameStatus,
    pub winner: Option<Color>,
    pub captured_pieces: CapturedPieces,
    pub en_passant_target: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
    /// Repetition key -> number of times the position has occurred.
    pub position_history: BTreeMap<u64, u32>,
    pub move_history: Vec<ChessMove>,
    pub last_move: Option<ChessMove>,
    #[serde(default)]
    pub phase: TurnPhase,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new_game()
    }
}

impl GameState {
    #[inline]
    pub fn new_game() -> Self {
        Self::from_board(Board::standard(), Color::Light)
    }

    /// Start a game from an arbitrary arrangement. The initial position is
    /// counted once in the repetition history.
    pub fn from_board(board: Board, turn: Color) -> Self {
        let mut position_history = BTreeMap::new();
        position_history.insert(repetition_key(&board, turn, None), 1);
        Self {
            board,
            turn,
            status: GameStatus::Playing,
            winner: None,
            captured_pieces: CapturedPieces::default(),
            en_passant_target: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            position_history,
            move_history: Vec::new(),
            last_move: None,
            phase: TurnPhase::Normal,
        }
    }

    #[inline]
    pub fn current_key(&self) -> u64 {
        repetition_key(&self.board, self.turn, self.en_passant_target)
    }

    /// How often the current position has occurred, this one included.
    pub fn repetition_count(&self) -> u32 {
        self.position_history
            .get(&self.current_key())
            .copied()
            .unwrap_or(0)
    }

    #[inline]
    pub fn is_awaiting_choice(&self) -> bool {
        !matches!(self.phase, TurnPhase::Normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_game_counts_the_start_position_once() {
        let game = GameState::new_game();
        assert_eq!(game.turn, Color::Light);
        assert_eq!(game.status, GameStatus::Playing);
        assert_eq!(game.repetition_count(), 1);
        assert_eq!(game.position_history.len(), 1);
    }

    #[test]
    fn game_state_survives_json() {
        let mut game = GameState::new_game();
        game.phase = TurnPhase::AwaitingPromotionChoice(PendingMove {
            from: 52,
            to: 60,
            options: MoveOptions::default(),
        });
        let text = serde_json::to_string(&game).expect("state should serialize");
        let back: GameState = serde_json::from_str(&text).expect("state should deserialize");
        assert_eq!(back, game);
    }
}
