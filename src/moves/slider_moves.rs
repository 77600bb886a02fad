//! Occupancy-aware ray tracing for bishops, rooks, and queens.
//!
//! A ray includes the first blocker it meets; callers mask out their own
//! pieces afterwards.

const DIAGONAL_STEPS: [(i32, i32); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
const ORTHOGONAL_STEPS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

#[inline]
pub fn bishop_targets(square: u8, occupancy: u64) -> u64 {
    trace_rays(square, &DIAGONAL_STEPS, occupancy)
}

#[inline]
pub fn rook_targets(square: u8, occupancy: u64) -> u64 {
    trace_rays(square, &ORTHOGONAL_STEPS, occupancy)
}

#[inline]
pub fn queen_targets(square: u8, occupancy: u64) -> u64 {
    bishop_targets(square, occupancy) | rook_targets(square, occupancy)
}

/// Squares strictly between `a` and `b` when they share a line, else 0.
pub fn squares_between(a: u8, b: u8) -> u64 {
    let (af, ar) = ((a % 8) as i32, (a / 8) as i32);
    let (bf, br) = ((b % 8) as i32, (b / 8) as i32);
    let (df, dr) = (bf - af, br - ar);

    let aligned = df == 0 || dr == 0 || df.abs() == dr.abs();
    if !aligned || (df == 0 && dr == 0) {
        return 0;
    }

    let (step_f, step_r) = (df.signum(), dr.signum());
    let mut between = 0u64;
    let mut file = af + step_f;
    let mut rank = ar + step_r;
    while file != bf || rank != br {
        between |= 1u64 << (rank * 8 + file);
        file += step_f;
        rank += step_r;
    }
    between
}

fn trace_rays(square: u8, steps: &[(i32, i32); 4], occupancy: u64) -> u64 {
    let mut targets = 0u64;
    for &(file_step, rank_step) in steps {
        let mut file = (square % 8) as i32 + file_step;
        let mut rank = (square / 8) as i32 + rank_step;

        while (0..8).contains(&file) && (0..8).contains(&rank) {
            let bit = 1u64 << (rank * 8 + file);
            targets |= bit;

            if (occupancy & bit) != 0 {
                break;
            }

            file += file_step;
            rank += rank_step;
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_board_ray_counts_from_d4() {
        assert_eq!(bishop_targets(27, 0).count_ones(), 13);
        assert_eq!(rook_targets(27, 0).count_ones(), 14);
        assert_eq!(queen_targets(27, 0).count_ones(), 27);
    }

    #[test]
    fn blocker_is_included_and_stops_the_ray() {
        let blocker_on_a4 = 1u64 << 24;
        let targets = rook_targets(0, blocker_on_a4);
        assert_ne!(targets & (1u64 << 24), 0);
        assert_eq!(targets & (1u64 << 32), 0);
    }

    #[test]
    fn between_squares_on_a_rank() {
        // e1..h1 -> f1, g1
        assert_eq!(squares_between(4, 7), (1u64 << 5) | (1u64 << 6));
        assert_eq!(squares_between(4, 13), 0);
        assert_eq!(squares_between(0, 17), 0);
    }
}
