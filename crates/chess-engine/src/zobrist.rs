//! Zobrist keys for position identity.
//!
//! The key of a position is the XOR of one constant per man on the board,
//! one per castling right held, one for the en passant file when a target
//! square is set, and one when Black is to move. Move counters never take
//! part, so positions that differ only in their clocks share a key.

use crate::Position;
use chess_core::{Color, FenError, Piece, Square};

/// Random constants, generated at compile time from a fixed seed.
pub struct ZobristKeys {
    /// Indexed by `color * 6 + piece`, then square.
    pieces: [[u64; 64]; 12],
    black_to_move: u64,
    castling: [u64; 4],
    en_passant: [u64; 8],
}

impl ZobristKeys {
    const SEED: u64 = 0x9E37_79B9_7F4A_7C15;

    const fn xorshift(mut x: u64) -> u64 {
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        x
    }

    const fn generate() -> Self {
        let mut state = Self::SEED;

        let mut pieces = [[0u64; 64]; 12];
        let mut kind = 0;
        while kind < 12 {
            let mut sq = 0;
            while sq < 64 {
                state = Self::xorshift(state);
                pieces[kind][sq] = state;
                sq += 1;
            }
            kind += 1;
        }

        state = Self::xorshift(state);
        let black_to_move = state;

        let mut castling = [0u64; 4];
        let mut i = 0;
        while i < 4 {
            state = Self::xorshift(state);
            castling[i] = state;
            i += 1;
        }

        let mut en_passant = [0u64; 8];
        let mut i = 0;
        while i < 8 {
            state = Self::xorshift(state);
            en_passant[i] = state;
            i += 1;
        }

        ZobristKeys {
            pieces,
            black_to_move,
            castling,
            en_passant,
        }
    }

    #[inline]
    pub const fn piece(&self, piece: Piece, color: Color, sq: Square) -> u64 {
        self.pieces[color.index() * 6 + piece.index()][sq.index() as usize]
    }

    /// Key for castling bit `bit` (0-3, in [`crate::CastlingRights`] order).
    #[inline]
    pub const fn castling(&self, bit: usize) -> u64 {
        self.castling[bit & 3]
    }

    #[inline]
    pub const fn en_passant_file(&self, file: u8) -> u64 {
        self.en_passant[(file & 7) as usize]
    }

    #[inline]
    pub const fn black_to_move(&self) -> u64 {
        self.black_to_move
    }
}

/// Process-wide key table.
pub static ZOBRIST: ZobristKeys = ZobristKeys::generate();

/// Computes the key of `position` from scratch.
pub fn hash(position: &Position) -> u64 {
    let mut key = position
        .board
        .iter()
        .fold(0u64, |acc, (sq, piece, color)| acc ^ ZOBRIST.piece(piece, color, sq));

    let rights = position.castling.raw();
    for bit in 0..4 {
        if rights & (1 << bit) != 0 {
            key ^= ZOBRIST.castling(bit);
        }
    }

    if let Some(ep) = position.en_passant {
        key ^= ZOBRIST.en_passant_file(ep.file_index());
    }

    if position.side_to_move == Color::Black {
        key ^= ZOBRIST.black_to_move();
    }

    key
}

/// Parses `fen` and returns its key.
pub fn hash_fen(fen: &str) -> Result<u64, FenError> {
    Position::from_fen(fen).map(|position| hash(&position))
}
