//! Move representation.

use crate::{Piece, Square};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Classification of a move.
///
/// Promotion is carried separately on [`Move`], so a capturing promotion is
/// `Capture` with a promotion piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveFlag {
    /// Quiet move to an empty square.
    Normal = 0,
    /// Captures the piece standing on the destination square.
    Capture = 1,
    /// Pawn double push from its starting rank.
    DoublePush = 2,
    /// En passant capture; the captured pawn is not on the destination.
    EnPassant = 3,
    /// Kingside castling (O-O).
    CastleKingside = 4,
    /// Queenside castling (O-O-O).
    CastleQueenside = 5,
}

impl MoveFlag {
    /// True for ordinary and en passant captures.
    #[inline]
    pub const fn is_capture(self) -> bool {
        matches!(self, MoveFlag::Capture | MoveFlag::EnPassant)
    }

    #[inline]
    pub const fn is_castling(self) -> bool {
        matches!(self, MoveFlag::CastleKingside | MoveFlag::CastleQueenside)
    }
}

/// A chess move.
///
/// Two moves are equal when origin, destination and promotion agree; the
/// flag is derived information and does not take part in comparison or
/// hashing. Ordering follows origin index, destination index, then
/// promotion kind.
#[derive(Clone, Copy)]
pub struct Move {
    from: Square,
    to: Square,
    promotion: Option<Piece>,
    flag: MoveFlag,
}

impl Move {
    /// Creates a move without promotion.
    #[inline]
    pub const fn new(from: Square, to: Square, flag: MoveFlag) -> Self {
        Move {
            from,
            to,
            promotion: None,
            flag,
        }
    }

    /// Creates a quiet move.
    #[inline]
    pub const fn normal(from: Square, to: Square) -> Self {
        Self::new(from, to, MoveFlag::Normal)
    }

    /// Creates a promotion; `flag` is `Normal` for a push, `Capture` otherwise.
    #[inline]
    pub const fn promotion(from: Square, to: Square, piece: Piece, flag: MoveFlag) -> Self {
        Move {
            from,
            to,
            promotion: Some(piece),
            flag,
        }
    }

    #[inline]
    pub const fn from(self) -> Square {
        self.from
    }

    #[inline]
    pub const fn to(self) -> Square {
        self.to
    }

    #[inline]
    pub const fn flag(self) -> MoveFlag {
        self.flag
    }

    /// The piece a pawn becomes, if this is a promotion.
    #[inline]
    pub const fn promotion_piece(self) -> Option<Piece> {
        self.promotion
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        self.promotion.is_some()
    }

    #[inline]
    pub const fn is_capture(self) -> bool {
        self.flag.is_capture()
    }

    #[inline]
    pub const fn is_castling(self) -> bool {
        self.flag.is_castling()
    }

    /// Long algebraic (UCI) notation, e.g. `e2e4` or `e7e8q`.
    pub fn to_uci(self) -> String {
        match self.promotion {
            Some(piece) => format!("{}{}{}", self.from, self.to, piece.to_char()),
            None => format!("{}{}", self.from, self.to),
        }
    }

    /// Parses UCI notation.
    ///
    /// The result carries `MoveFlag::Normal`; the real flag depends on the
    /// position and is recovered by matching against the legal moves.
    pub fn from_uci(s: &str) -> Option<Self> {
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => match Piece::from_char(c.to_ascii_lowercase()) {
                Some(piece) if piece.is_promotion_target() => Some(piece),
                _ => return None,
            },
        };
        Some(Move {
            from,
            to,
            promotion,
            flag: MoveFlag::Normal,
        })
    }

    fn sort_key(self) -> (u8, u8, u8) {
        let promo = self.promotion.map_or(0, |p| p.index() as u8 + 1);
        (self.from.index(), self.to.index(), promo)
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to && self.promotion == other.promotion
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from.hash(state);
        self.to.hash(state);
        self.promotion.hash(state);
    }
}

impl PartialOrd for Move {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Move {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({}, {:?})", self.to_uci(), self.flag)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}
