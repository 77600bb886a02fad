//! Core value types shared by the rule engine, notation, and analysis tree.
//!
//! Squares follow the `0 == a1`, `7 == h1`, `63 == h8` convention used by the
//! attack tables in `moves`.

use serde::{Deserialize, Serialize};

pub use crate::game_state::board::Board;
pub use crate::game_state::game_state::{GameState, PendingMove, TurnPhase};

/// Board square index (`0..=63`).
pub type Square = u8;

#[inline]
pub const fn file_of(square: Square) -> u8 {
    square % 8
}

#[inline]
pub const fn rank_of(square: Square) -> u8 {
    square / 8
}

#[inline]
pub fn square_at(file: u8, rank: u8) -> Square {
    debug_assert!(file < 8 && rank < 8, "square out of bounds: file {file} rank {rank}");
    rank * 8 + file
}

/// Side to move. `Light` moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Light,
    Dark,
}

impl Color {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Color::Light => 0,
            Color::Dark => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::Light => Color::Dark,
            Color::Dark => Color::Light,
        }
    }

    /// Rank a pawn of this color promotes on.
    #[inline]
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Color::Light => 7,
            Color::Dark => 0,
        }
    }

    /// Rank the king and rooks start on.
    #[inline]
    pub const fn home_rank(self) -> u8 {
        match self {
            Color::Light => 0,
            Color::Dark => 7,
        }
    }

    #[inline]
    pub const fn pawn_start_rank(self) -> u8 {
        match self {
            Color::Light => 1,
            Color::Dark => 6,
        }
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Color::Light => "white",
            Color::Dark => "black",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PieceKind::Pawn => 0,
            PieceKind::Knight => 1,
            PieceKind::Bishop => 2,
            PieceKind::Rook => 3,
            PieceKind::Queen => 4,
            PieceKind::King => 5,
        }
    }

    /// Upper-case letter used in move text; pawns have none.
    #[inline]
    pub const fn letter(self) -> Option<char> {
        match self {
            PieceKind::Pawn => None,
            PieceKind::Knight => Some('N'),
            PieceKind::Bishop => Some('B'),
            PieceKind::Rook => Some('R'),
            PieceKind::Queen => Some('Q'),
            PieceKind::King => Some('K'),
        }
    }

    /// Letter used when naming a power (pawns included).
    #[inline]
    pub const fn power_letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'P' => Some(PieceKind::Pawn),
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }

    /// True for powers that can move a pawn diagonally onto an empty square.
    #[inline]
    pub const fn moves_diagonally(self) -> bool {
        matches!(self, PieceKind::Bishop | PieceKind::Queen | PieceKind::King)
    }
}

/// A piece on the board.
///
/// `original_kind` never changes, even through promotion; it is what a
/// capturer inherits as `power`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub original_kind: PieceKind,
    #[serde(default)]
    pub power: Option<PieceKind>,
    #[serde(default)]
    pub has_moved: bool,
}

impl Piece {
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self {
            kind,
            color,
            original_kind: kind,
            power: None,
            has_moved: false,
        }
    }

    pub const fn with_power(mut self, power: PieceKind) -> Self {
        self.power = Some(power);
        self
    }

    pub const fn moved(mut self) -> Self {
        self.has_moved = true;
        self
    }

    #[inline]
    pub const fn is_king(&self) -> bool {
        matches!(self.kind, PieceKind::King)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Playing,
    Checkmate,
    Stalemate,
    #[serde(rename = "kingCaptured")]
    KingCaptured,
    DrawThreefold,
    #[serde(rename = "draw_fiftyMove")]
    DrawFiftyMove,
    DrawAgreement,
    Resignation,
    Timeout,
    OpponentDisconnected,
}

impl GameStatus {
    #[inline]
    pub const fn is_over(self) -> bool {
        !matches!(self, GameStatus::Playing)
    }

    #[inline]
    pub const fn is_draw(self) -> bool {
        matches!(
            self,
            GameStatus::Stalemate
                | GameStatus::DrawThreefold
                | GameStatus::DrawFiftyMove
                | GameStatus::DrawAgreement
        )
    }
}

/// A resolved, committed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessMove {
    pub from: Square,
    pub to: Square,
    pub piece: PieceKind,
    pub color: Color,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    pub power_move: bool,
    pub notation: String,
}

/// Player answer to an ambiguous en-passant prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnPassantChoice {
    /// Plain power move onto the empty square; nothing is captured.
    Move,
    /// En-passant capture of the passed pawn.
    Capture,
}

/// Semantic events emitted by a committed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    MoveMade { notation: String },
    CaptureMade { captured: PieceKind, by: Color },
    PowerGained { square: Square, power: PieceKind },
    GameWon { winner: Color, status: GameStatus },
    GameDrawn { status: GameStatus },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_helpers_agree() {
        let e4 = square_at(4, 3);
        assert_eq!(e4, 28);
        assert_eq!(file_of(e4), 4);
        assert_eq!(rank_of(e4), 3);
    }

    #[test]
    fn promotion_keeps_original_kind_in_serialized_form() {
        let mut piece = Piece::new(PieceKind::Pawn, Color::Dark);
        piece.kind = PieceKind::Queen;
        let json = serde_json::to_value(piece).expect("piece should serialize");
        assert_eq!(json["kind"], "queen");
        assert_eq!(json["originalKind"], "pawn");
        assert_eq!(json["power"], serde_json::Value::Null);
    }

    #[test]
    fn status_names_match_the_stored_vocabulary() {
        let json = serde_json::to_string(&GameStatus::DrawThreefold).expect("status should serialize");
        assert_eq!(json, "\"draw_threefold\"");
        let json = serde_json::to_string(&GameStatus::DrawFiftyMove).expect("status should serialize");
        assert_eq!(json, "\"draw_fiftyMove\"");
        let back: GameStatus = serde_json::from_str("\"draw_fiftyMove\"").expect("status should parse");
        assert_eq!(back, GameStatus::DrawFiftyMove);
        let json = serde_json::to_string(&GameStatus::KingCaptured).expect("status should serialize");
        assert_eq!(json, "\"kingCaptured\"");
    }
}
