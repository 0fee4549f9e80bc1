//! Piece kinds.
//!
//! A [`Piece`] is only the kind; the owning side travels alongside it as a
//! `(Piece, Color)` pair wherever a concrete man on the board is meant.

use crate::Color;
use std::fmt;

/// The six kinds of chess men.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Piece {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl Piece {
    /// All kinds in index order.
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// Kinds a pawn may promote to, strongest first.
    pub const PROMOTIONS: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Creates a kind from its index (0-5).
    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < 6 {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Lowercase letter used by FEN and UCI promotion suffixes.
    pub const fn to_char(self) -> char {
        match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        }
    }

    /// FEN letter: uppercase for White, lowercase for Black.
    pub const fn to_fen_char(self, color: Color) -> char {
        let c = self.to_char();
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Parses a FEN letter into kind and side.
    pub const fn from_fen_char(c: char) -> Option<(Piece, Color)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        match Self::from_char(c.to_ascii_lowercase()) {
            Some(piece) => Some((piece, color)),
            None => None,
        }
    }

    /// Parses a lowercase kind letter (`p n b r q k`).
    pub const fn from_char(c: char) -> Option<Piece> {
        match c {
            'p' => Some(Piece::Pawn),
            'n' => Some(Piece::Knight),
            'b' => Some(Piece::Bishop),
            'r' => Some(Piece::Rook),
            'q' => Some(Piece::Queen),
            'k' => Some(Piece::King),
            _ => None,
        }
    }

    /// Uppercase letter used by SAN.
    #[inline]
    pub const fn san_char(self) -> char {
        self.to_char().to_ascii_uppercase()
    }

    /// Parses an uppercase SAN piece letter.
    #[inline]
    pub const fn from_san_char(c: char) -> Option<Piece> {
        if c.is_ascii_uppercase() {
            Self::from_char(c.to_ascii_lowercase())
        } else {
            None
        }
    }

    /// True for bishop, rook and queen.
    #[inline]
    pub const fn is_slider(self) -> bool {
        matches!(self, Piece::Bishop | Piece::Rook | Piece::Queen)
    }

    /// True for the kinds a pawn may become.
    #[inline]
    pub const fn is_promotion_target(self) -> bool {
        matches!(self, Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Piece::Pawn => "Pawn",
            Piece::Knight => "Knight",
            Piece::Bishop => "Bishop",
            Piece::Rook => "Rook",
            Piece::Queen => "Queen",
            Piece::King => "King",
        };
        f.write_str(name)
    }
}
