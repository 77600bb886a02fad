//! End-of-game classification and declarations.
//!
//! `classify_position` decides the status after a move in the order king
//! captured, checkmate, stalemate, playing. The remaining functions end a
//! game by claim or declaration and are refused on a finished game.

use tracing::info;

use crate::chess_errors::MoveRejection;
use crate::game_state::chess_rules::{FIFTY_MOVE_HALFMOVES, THREEFOLD_COUNT};
use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_checks::{can_capture_king, is_king_in_check};
use crate::move_generation::legal_move_generator::has_legal_moves;

/// Status and winner of the position reached by a move of `mover`.
pub fn classify_position(
    board: &Board,
    mover: Color,
    en_passant_target: Option<Square>,
    king_captured: bool,
) -> (GameStatus, Option<Color>) {
    if king_captured {
        return (GameStatus::KingCaptured, Some(mover));
    }

    let defender = mover.opposite();
    if has_legal_moves(board, defender, en_passant_target) || can_capture_king(board, defender) {
        return (GameStatus::Playing, None);
    }

    if is_king_in_check(board, defender) {
        (GameStatus::Checkmate, Some(mover))
    } else {
        (GameStatus::Stalemate, None)
    }
}

/// Notation suffix for a move that left `defender` facing `status`:
/// `#` for mate, `+` for check, nothing once the king is gone.
pub fn check_suffix(status: GameStatus, board: &Board, defender: Color) -> Option<char> {
    match status {
        GameStatus::Checkmate => Some('#'),
        GameStatus::KingCaptured => None,
        _ if is_king_in_check(board, defender) => Some('+'),
        _ => None,
    }
}

/// The draw `game_state` qualifies for, threefold first.
pub fn claimable_draw(game_state: &GameState) -> Option<GameStatus> {
    if game_state.repetition_count() >= THREEFOLD_COUNT {
        Some(GameStatus::DrawThreefold)
    } else if game_state.halfmove_clock >= FIFTY_MOVE_HALFMOVES {
        Some(GameStatus::DrawFiftyMove)
    } else {
        None
    }
}

/// Event announcing the final status, if the game is over.
pub fn end_event(game_state: &GameState) -> Option<GameEvent> {
    if !game_state.status.is_over() {
        return None;
    }
    Some(match game_state.winner {
        Some(winner) => GameEvent::GameWon {
            winner,
            status: game_state.status,
        },
        None => GameEvent::GameDrawn {
            status: game_state.status,
        },
    })
}

fn finish(
    game_state: &GameState,
    status: GameStatus,
    winner: Option<Color>,
) -> Result<GameState, MoveRejection> {
    if game_state.status.is_over() {
        return Err(MoveRejection::GameOver);
    }
    let mut next = game_state.clone();
    next.status = status;
    next.winner = winner;
    next.phase = TurnPhase::Normal;
    info!(?status, ?winner, "game ended by declaration");
    Ok(next)
}

/// Claim a threefold or fifty-move draw for the current position.
pub fn claim_draw(game_state: &GameState) -> Result<GameState, MoveRejection> {
    if game_state.status.is_over() {
        return Err(MoveRejection::GameOver);
    }
    let status = claimable_draw(game_state).ok_or(MoveRejection::NothingToClaim)?;
    finish(game_state, status, None)
}

pub fn agree_draw(game_state: &GameState) -> Result<GameState, MoveRejection> {
    finish(game_state, GameStatus::DrawAgreement, None)
}

pub fn resign(game_state: &GameState, loser: Color) -> Result<GameState, MoveRejection> {
    finish(game_state, GameStatus::Resignation, Some(loser.opposite()))
}

pub fn flag_timeout(game_state: &GameState, loser: Color) -> Result<GameState, MoveRejection> {
    finish(game_state, GameStatus::Timeout, Some(loser.opposite()))
}

/// `disconnected` left the game; the other side wins.
pub fn opponent_disconnected(
    game_state: &GameState,
    disconnected: Color,
) -> Result<GameState, MoveRejection> {
    finish(
        game_state,
        GameStatus::OpponentDisconnected,
        Some(disconnected.opposite()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::board::Board;

    #[test]
    fn back_rank_mate_is_checkmate() {
        let mut board = Board::empty();
        board.set(62, Some(Piece::new(PieceKind::King, Color::Dark).moved()));
        board.set(53, Some(Piece::new(PieceKind::Pawn, Color::Dark).moved()));
        board.set(54, Some(Piece::new(PieceKind::Pawn, Color::Dark).moved()));
        board.set(55, Some(Piece::new(PieceKind::Pawn, Color::Dark).moved()));
        board.set(56, Some(Piece::new(PieceKind::Rook, Color::Light).moved()));
        board.set(6, Some(Piece::new(PieceKind::King, Color::Light).moved()));
        assert_eq!(
            classify_position(&board, Color::Light, None, false),
            (GameStatus::Checkmate, Some(Color::Light))
        );
    }

    #[test]
    fn cornered_king_without_moves_is_stalemate() {
        let mut board = Board::empty();
        board.set(56, Some(Piece::new(PieceKind::King, Color::Dark).moved()));
        board.set(50, Some(Piece::new(PieceKind::Queen, Color::Light).moved()));
        board.set(4, Some(Piece::new(PieceKind::King, Color::Light).moved()));
        assert_eq!(
            classify_position(&board, Color::Light, None, false),
            (GameStatus::Stalemate, None)
        );
    }

    #[test]
    fn king_capture_outranks_everything() {
        let board = Board::empty();
        assert_eq!(
            classify_position(&board, Color::Dark, None, true),
            (GameStatus::KingCaptured, Some(Color::Dark))
        );
    }

    #[test]
    fn suffix_follows_the_status() {
        let mut board = Board::empty();
        board.set(60, Some(Piece::new(PieceKind::King, Color::Dark).moved()));
        board.set(4, Some(Piece::new(PieceKind::Rook, Color::Light).moved()));
        assert_eq!(check_suffix(GameStatus::Playing, &board, Color::Dark), Some('+'));
        assert_eq!(check_suffix(GameStatus::Checkmate, &board, Color::Dark), Some('#'));
        assert_eq!(check_suffix(GameStatus::KingCaptured, &board, Color::Dark), None);
        assert_eq!(check_suffix(GameStatus::Playing, &board, Color::Light), None);
    }

    #[test]
    fn claim_needs_a_reason() {
        let game = GameState::new_game();
        assert_eq!(claim_draw(&game), Err(MoveRejection::NothingToClaim));

        let mut tired = game.clone();
        tired.halfmove_clock = FIFTY_MOVE_HALFMOVES;
        let drawn = claim_draw(&tired).expect("fifty-move claim should succeed");
        assert_eq!(drawn.status, GameStatus::DrawFiftyMove);
        assert_eq!(end_event(&drawn), Some(GameEvent::GameDrawn { status: GameStatus::DrawFiftyMove }));
    }

    #[test]
    fn resignation_hands_the_win_over_once() {
        let game = GameState::new_game();
        let over = resign(&game, Color::Dark).expect("resignation should succeed");
        assert_eq!(over.status, GameStatus::Resignation);
        assert_eq!(over.winner, Some(Color::Light));
        assert_eq!(agree_draw(&over), Err(MoveRejection::GameOver));
    }

    #[test]
    fn timeout_and_disconnect_name_the_other_side() {
        let game = GameState::new_game();
        let flagged = flag_timeout(&game, Color::Light).expect("flag should fall");
        assert_eq!(flagged.status, GameStatus::Timeout);
        assert_eq!(flagged.winner, Some(Color::Dark));

        let left = opponent_disconnected(&game, Color::Dark).expect("disconnect should end the game");
        assert_eq!(left.status, GameStatus::OpponentDisconnected);
        assert_eq!(
            end_event(&left),
            Some(GameEvent::GameWon {
                winner: Color::Light,
                status: GameStatus::OpponentDisconnected
            })
        );
        assert!(!left.status.is_draw());
        assert_eq!(flag_timeout(&left, Color::Light), Err(MoveRejection::GameOver));
    }
}
