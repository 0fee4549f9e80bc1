//! Attack tables.
//!
//! Leaper attacks (knight, king, pawn) are looked up directly. Slider
//! attacks walk precomputed rays: each ray is cut just past the first
//! occupied square in its direction.

use crate::Bitboard;
use chess_core::{Color, Square};

const KNIGHT_STEPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_STEPS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Ray directions. The first four increase the square index, the last four
/// decrease it; the nearest blocker is the lowest or highest set bit
/// accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
enum Direction {
    North = 0,
    NorthEast = 1,
    East = 2,
    NorthWest = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    SouthEast = 7,
}

const DIRECTION_STEPS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (-1, 1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (1, -1),
];

const KNIGHT_ATTACKS: [Bitboard; 64] = leaper_table(&KNIGHT_STEPS);
const KING_ATTACKS: [Bitboard; 64] = leaper_table(&KING_STEPS);
const PAWN_ATTACKS: [[Bitboard; 64]; 2] = [
    leaper_table(&[(-1, 1), (1, 1)]),
    leaper_table(&[(-1, -1), (1, -1)]),
];
const RAYS: [[Bitboard; 64]; 8] = ray_table();

/// Bitboard of `sq` shifted by `(df, dr)`, or empty when off the board.
const fn step(sq: u8, df: i8, dr: i8) -> u64 {
    let file = (sq % 8) as i8 + df;
    let rank = (sq / 8) as i8 + dr;
    if file < 0 || file > 7 || rank < 0 || rank > 7 {
        0
    } else {
        1u64 << (rank * 8 + file)
    }
}

const fn leaper_table(steps: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut sq = 0u8;
    while sq < 64 {
        let mut bits = 0u64;
        let mut i = 0;
        while i < steps.len() {
            bits |= step(sq, steps[i].0, steps[i].1);
            i += 1;
        }
        table[sq as usize] = Bitboard(bits);
        sq += 1;
    }
    table
}

const fn ray_table() -> [[Bitboard; 64]; 8] {
    let mut table = [[Bitboard::EMPTY; 64]; 8];
    let mut dir = 0;
    while dir < 8 {
        let (df, dr) = DIRECTION_STEPS[dir];
        let mut sq = 0u8;
        while sq < 64 {
            let mut bits = 0u64;
            let mut file = (sq % 8) as i8 + df;
            let mut rank = (sq / 8) as i8 + dr;
            while file >= 0 && file <= 7 && rank >= 0 && rank <= 7 {
                bits |= 1u64 << (rank * 8 + file);
                file += df;
                rank += dr;
            }
            table[dir][sq as usize] = Bitboard(bits);
            sq += 1;
        }
        dir += 1;
    }
    table
}

#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index() as usize]
}

#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index() as usize]
}

/// Squares a `color` pawn on `sq` attacks.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.index() as usize]
}

fn ray_attacks(sq: Square, dir: Direction, occupied: Bitboard) -> Bitboard {
    let ray = RAYS[dir as usize][sq.index() as usize];
    let blockers = ray & occupied;
    let nearest = if (dir as usize) < 4 {
        blockers.lsb()
    } else {
        blockers.msb()
    };
    match nearest {
        Some(blocker) => ray ^ RAYS[dir as usize][blocker.index() as usize],
        None => ray,
    }
}

/// Diagonal attacks from `sq`, stopping at (and including) blockers.
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attacks(sq, Direction::NorthEast, occupied)
        | ray_attacks(sq, Direction::NorthWest, occupied)
        | ray_attacks(sq, Direction::SouthEast, occupied)
        | ray_attacks(sq, Direction::SouthWest, occupied)
}

/// Orthogonal attacks from `sq`, stopping at (and including) blockers.
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attacks(sq, Direction::North, occupied)
        | ray_attacks(sq, Direction::South, occupied)
        | ray_attacks(sq, Direction::East, occupied)
        | ray_attacks(sq, Direction::West, occupied)
}

#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}
