//! Piece placement.
//!
//! A [`Board`] stores one bitboard per piece kind and one per color. Every
//! mutation goes through [`Board::put`] or [`Board::remove`], which keep the
//! two families of masks in agreement: a square is set in a kind mask exactly
//! when it is set in one color mask.

use crate::Bitboard;
use chess_core::{parse_placement, Color, FenError, Piece, Square};
use std::fmt;
use thiserror::Error;

/// Errors produced when decoding the binary board form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardCodecError {
    #[error("binary board must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unknown piece code {code} on {square}")]
    UnknownCode { square: Square, code: u8 },
}

/// Axis for [`Board::flip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipAxis {
    /// Mirror ranks: a1 <-> a8.
    UpDown,
    /// Mirror files: a1 <-> h1.
    LeftRight,
}

/// Placement of the men on the 64 squares.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    pieces: [Bitboard; 6],
    colors: [Bitboard; 2],
}

impl Board {
    /// Size of the binary form produced by [`Board::to_bytes`].
    pub const ENCODED_LEN: usize = 32;

    const BACK_RANK: [Piece; 8] = [
        Piece::Rook,
        Piece::Knight,
        Piece::Bishop,
        Piece::Queen,
        Piece::King,
        Piece::Bishop,
        Piece::Knight,
        Piece::Rook,
    ];

    pub const fn empty() -> Self {
        Board {
            pieces: [Bitboard::EMPTY; 6],
            colors: [Bitboard::EMPTY; 2],
        }
    }

    /// The standard initial arrangement.
    pub fn startpos() -> Self {
        let mut board = Board::empty();
        for color in Color::ALL {
            let back = color.back_rank();
            let pawns = (back as i8 + color.pawn_direction()) as u8;
            for (file, piece) in Self::BACK_RANK.iter().enumerate() {
                let file = file as u8;
                if let Some(sq) = Square::from_coords(file, back) {
                    board.put(sq, *piece, color);
                }
                if let Some(sq) = Square::from_coords(file, pawns) {
                    board.put(sq, Piece::Pawn, color);
                }
            }
        }
        board
    }

    pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        let color = if self.colors[Color::White.index()].contains(sq) {
            Color::White
        } else if self.colors[Color::Black.index()].contains(sq) {
            Color::Black
        } else {
            return None;
        };
        Piece::ALL
            .into_iter()
            .find(|piece| self.pieces[piece.index()].contains(sq))
            .map(|piece| (piece, color))
    }

    /// Places a man on `sq`, replacing whatever stood there.
    pub fn put(&mut self, sq: Square, piece: Piece, color: Color) {
        self.remove(sq);
        self.pieces[piece.index()].set(sq);
        self.colors[color.index()].set(sq);
    }

    /// Clears `sq`, returning the man that stood there.
    pub fn remove(&mut self, sq: Square) -> Option<(Piece, Color)> {
        let found = self.piece_at(sq)?;
        self.pieces[found.0.index()].clear(sq);
        self.colors[found.1.index()].clear(sq);
        Some(found)
    }

    /// Copy of this board with a man placed on `sq`.
    #[must_use]
    pub fn with_piece(&self, sq: Square, piece: Piece, color: Color) -> Board {
        let mut board = self.clone();
        board.put(sq, piece, color);
        board
    }

    /// Copy of this board with `sq` emptied.
    #[must_use]
    pub fn without_piece(&self, sq: Square) -> Board {
        let mut board = self.clone();
        board.remove(sq);
        board
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.colors[0] | self.colors[1]
    }

    #[inline]
    pub fn occupancy_of(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    /// Squares holding `piece` of either color.
    #[inline]
    pub fn pieces(&self, piece: Piece) -> Bitboard {
        self.pieces[piece.index()]
    }

    #[inline]
    pub fn pieces_of(&self, piece: Piece, color: Color) -> Bitboard {
        self.pieces[piece.index()] & self.colors[color.index()]
    }

    /// The square of `color`'s king, or the lowest one if there are several.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(Piece::King, color).lsb()
    }

    /// Iterates over every man on the board in square order.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece, Color)> + '_ {
        self.occupied()
            .into_iter()
            .filter_map(move |sq| self.piece_at(sq).map(|(piece, color)| (sq, piece, color)))
    }

    /// Encodes the placement field of a FEN record.
    pub fn to_fen_placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for rank in (0..8u8).rev() {
            let mut empty = 0u8;
            for file in 0..8u8 {
                let man = Square::from_coords(file, rank).and_then(|sq| self.piece_at(sq));
                match man {
                    Some((piece, color)) => {
                        if empty > 0 {
                            out.push((b'0' + empty) as char);
                            empty = 0;
                        }
                        out.push(piece.to_fen_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push((b'0' + empty) as char);
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }

    /// Decodes the placement field of a FEN record.
    pub fn from_fen_placement(placement: &str) -> Result<Board, FenError> {
        let mut board = Board::empty();
        for (sq, piece, color) in parse_placement(placement)? {
            board.put(sq, piece, color);
        }
        Ok(board)
    }

    /// Packs the board into 32 bytes, four bits per square.
    ///
    /// Byte `i` holds square `2i` in its low nibble and `2i + 1` in its high
    /// nibble. A nibble is 0 for an empty square, `1 + kind` for a white man
    /// and `9 + kind` for a black one, with kinds indexed pawn to king.
    pub fn to_bytes(&self) -> [u8; Self::ENCODED_LEN] {
        let mut bytes = [0u8; Self::ENCODED_LEN];
        for (sq, piece, color) in self.iter() {
            let code = piece.index() as u8 + 1 + 8 * color.index() as u8;
            let idx = sq.index() as usize;
            bytes[idx / 2] |= code << (4 * (idx % 2));
        }
        bytes
    }

    /// Inverse of [`Board::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Board, BoardCodecError> {
        if bytes.len() != Self::ENCODED_LEN {
            return Err(BoardCodecError::InvalidLength {
                expected: Self::ENCODED_LEN,
                actual: bytes.len(),
            });
        }

        let mut board = Board::empty();
        for sq in Square::all() {
            let idx = sq.index() as usize;
            let code = (bytes[idx / 2] >> (4 * (idx % 2))) & 0x0F;
            if code == 0 {
                continue;
            }
            let color = if code & 8 == 0 {
                Color::White
            } else {
                Color::Black
            };
            let piece = Piece::from_index(((code & 7) as usize).wrapping_sub(1))
                .ok_or(BoardCodecError::UnknownCode { square: sq, code })?;
            board.put(sq, piece, color);
        }
        Ok(board)
    }

    /// Mirrors the board along `axis`.
    #[must_use]
    pub fn flip(&self, axis: FlipAxis) -> Board {
        self.remap(|file, rank| match axis {
            FlipAxis::UpDown => (file, 7 - rank),
            FlipAxis::LeftRight => (7 - file, rank),
        })
    }

    /// Mirrors the board along the a1-h8 diagonal.
    #[must_use]
    pub fn transpose(&self) -> Board {
        self.remap(|file, rank| (rank, file))
    }

    /// Rotates the board 90 degrees clockwise as seen from White's side.
    #[must_use]
    pub fn rotate(&self) -> Board {
        self.remap(|file, rank| (rank, 7 - file))
    }

    fn remap(&self, f: impl Fn(u8, u8) -> (u8, u8)) -> Board {
        let mut board = Board::empty();
        for (sq, piece, color) in self.iter() {
            let (file, rank) = f(sq.file_index(), sq.rank_index());
            if let Some(target) = Square::from_coords(file, rank) {
                board.put(target, piece, color);
            }
        }
        board
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::startpos()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self.to_fen_placement())
    }
}

/// Text diagram with rank 8 on top; empty squares print as `.`.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8u8 {
                let c = Square::from_coords(file, rank)
                    .and_then(|sq| self.piece_at(sq))
                    .map_or('.', |(piece, color)| piece.to_fen_char(color));
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}
