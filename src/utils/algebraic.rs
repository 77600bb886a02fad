//! Square conversions between indices and coordinates such as `e4`.

use crate::game_state::chess_types::{file_of, rank_of, Square};

/// Convert a coordinate (for example: "e4") to a square index.
#[inline]
pub fn algebraic_to_square(square: &str) -> Option<Square> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return None;
    }

    let (file, rank) = (bytes[0].to_ascii_lowercase(), bytes[1]);
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }

    Some((rank - b'1') * 8 + (file - b'a'))
}

/// Convert a square index (`0..=63`) to its coordinate (for example: "e4").
#[inline]
pub fn square_to_algebraic(square: Square) -> String {
    debug_assert!(square < 64, "square out of bounds: {square}");
    format!("{}{}", file_char(square), rank_char(square))
}

#[inline]
pub fn file_char(square: Square) -> char {
    char::from(b'a' + file_of(square))
}

#[inline]
pub fn rank_char(square: Square) -> char {
    char::from(b'1' + rank_of(square))
}

/// Parse a coordinate move such as `e2e4` into `(from, to)`.
pub fn parse_coordinate_move(text: &str) -> Option<(Square, Square)> {
    let text = text.trim();
    if text.len() != 4 || !text.is_ascii() {
        return None;
    }
    Some((algebraic_to_square(&text[..2])?, algebraic_to_square(&text[2..])?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_squares_convert_both_ways() {
        assert_eq!(algebraic_to_square("a1"), Some(0));
        assert_eq!(algebraic_to_square("h8"), Some(63));
        assert_eq!(square_to_algebraic(0), "a1");
        assert_eq!(square_to_algebraic(63), "h8");
    }

    #[test]
    fn bad_coordinates_are_refused() {
        assert_eq!(algebraic_to_square("i1"), None);
        assert_eq!(algebraic_to_square("a9"), None);
        assert_eq!(algebraic_to_square("e"), None);
    }

    #[test]
    fn coordinate_move_parses() {
        assert_eq!(parse_coordinate_move("e2e4"), Some((12, 28)));
        assert_eq!(parse_coordinate_move("e2-e4"), None);
    }
}
