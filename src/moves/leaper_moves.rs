//! Precomputed target tables for fixed-offset movers (knight and king).
//!
//! Tables are built at compile time from offset lists so both native
//! movement and borrowed powers index the same data.

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

pub const KNIGHT_TARGETS: [u64; 64] = generate_leaper_table(&KNIGHT_OFFSETS);
pub const KING_TARGETS: [u64; 64] = generate_leaper_table(&KING_OFFSETS);

#[inline]
pub const fn knight_targets(square: u8) -> u64 {
    KNIGHT_TARGETS[square as usize]
}

#[inline]
pub const fn king_targets(square: u8) -> u64 {
    KING_TARGETS[square as usize]
}

const fn generate_leaper_table(offsets: &[(i32, i32); 8]) -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let file = (sq % 8) as i32;
        let rank = (sq / 8) as i32;
        let mut targets = 0u64;
        let mut i = 0usize;

        while i < offsets.len() {
            targets |= set_if_valid(file + offsets[i].0, rank + offsets[i].1);
            i += 1;
        }

        table[sq] = targets;
        sq += 1;
    }

    table
}

const fn set_if_valid(file: i32, rank: i32) -> u64 {
    if file < 0 || file > 7 || rank < 0 || rank > 7 {
        return 0;
    }

    1u64 << ((rank as usize) * 8 + (file as usize))
}
