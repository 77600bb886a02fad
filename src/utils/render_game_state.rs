//! Terminal-oriented Unicode board renderer.
//!
//! Each square takes two columns: the piece glyph and, when the piece holds
//! a power, that power's letter in lower case.

use crate::game_state::{chess_types::*, game_state::GameState};

/// Render the board to a Unicode string for terminal output.
///
/// Assumes square indexing where `0 == a1`, `7 == h1`, and `63 == h8`.
pub fn render_game_state(game_state: &GameState) -> String {
    render_with_targets(game_state, &[])
}

/// Same as `render_game_state`, with `targets` shown as `*` (empty) or with
/// a `x` marker (occupied).
pub fn render_with_targets(game_state: &GameState, targets: &[Square]) -> String {
    let mut out = String::new();

    out.push_str("  a  b  c  d  e  f  g  h\n");

    for rank in (0..8u8).rev() {
        out.push(char::from(b'1' + rank));
        out.push(' ');

        for file in 0..8u8 {
            let sq = square_at(file, rank);
            let targeted = targets.contains(&sq);
            match game_state.board.piece_at(sq) {
                Some(piece) => {
                    out.push(piece_to_unicode(piece.color, piece.kind));
                    out.push(match piece.power {
                        _ if targeted => 'x',
                        Some(power) => power.power_letter().to_ascii_lowercase(),
                        None => ' ',
                    });
                }
                None => {
                    out.push(if targeted { '*' } else { '·' });
                    out.push(' ');
                }
            }

            if file < 7 {
                out.push(' ');
            }
        }

        out.push(' ');
        out.push(char::from(b'1' + rank));
        out.push('\n');
    }

    out.push_str("  a  b  c  d  e  f  g  h\n");
    out.push_str(&status_line(game_state));

    out
}

/// One-line summary of whose turn it is or how the game ended.
pub fn status_line(game_state: &GameState) -> String {
    if !game_state.status.is_over() {
        let mut line = format!(
            "move {}, {} to play",
            game_state.fullmove_number,
            game_state.turn.name()
        );
        if game_state.is_awaiting_choice() {
            line.push_str(" (choice pending)");
        }
        return line;
    }
    match game_state.winner {
        Some(winner) => format!("{:?}: {} wins", game_state.status, winner.name()),
        None if game_state.status.is_draw() => format!("{:?}: draw", game_state.status),
        None => format!("{:?}", game_state.status),
    }
}

fn piece_to_unicode(color: Color, piece: PieceKind) -> char {
    match (color, piece) {
        (Color::Light, PieceKind::Pawn) => '♙',
        (Color::Light, PieceKind::Knight) => '♘',
        (Color::Light, PieceKind::Bishop) => '♗',
        (Color::Light, PieceKind::Rook) => '♖',
        (Color::Light, PieceKind::Queen) => '♕',
        (Color::Light, PieceKind::King) => '♔',
        (Color::Dark, PieceKind::Pawn) => '♟',
        (Color::Dark, PieceKind::Knight) => '♞',
        (Color::Dark, PieceKind::Bishop) => '♝',
        (Color::Dark, PieceKind::Rook) => '♜',
        (Color::Dark, PieceKind::Queen) => '♛',
        (Color::Dark, PieceKind::King) => '♚',
    }
}
