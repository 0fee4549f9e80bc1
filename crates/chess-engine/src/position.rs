//! Full position state: placement plus side to move, castling rights,
//! en passant target and move counters.

use crate::movegen::{self, MoveList};
use crate::{zobrist, Board};
use chess_core::{Color, FenError, FenFields, Move, Piece, Square};
use std::fmt;
use thiserror::Error;

/// A move that is not legal in the position it was applied to.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("illegal move {uci} in {fen}")]
pub struct MoveError {
    pub uci: String,
    pub fen: String,
}

/// Castling availability, one bit per right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    const fn kingside_bit(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        }
    }

    const fn queenside_bit(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        }
    }

    #[inline]
    pub const fn can_castle_kingside(self, color: Color) -> bool {
        self.0 & Self::kingside_bit(color) != 0
    }

    #[inline]
    pub const fn can_castle_queenside(self, color: Color) -> bool {
        self.0 & Self::queenside_bit(color) != 0
    }

    #[inline]
    pub fn remove_kingside(&mut self, color: Color) {
        self.0 &= !Self::kingside_bit(color);
    }

    #[inline]
    pub fn remove_queenside(&mut self, color: Color) {
        self.0 &= !Self::queenside_bit(color);
    }

    #[inline]
    pub fn remove_color(&mut self, color: Color) {
        self.remove_kingside(color);
        self.remove_queenside(color);
    }

    /// Drops every right tied to a king or rook home square.
    ///
    /// Called with both the origin and destination of each move, so a right
    /// is lost when its king or rook moves away or is captured at home.
    pub fn remove_for_square(&mut self, sq: Square) {
        match sq {
            Square::E1 => self.remove_color(Color::White),
            Square::E8 => self.remove_color(Color::Black),
            Square::H1 => self.remove_kingside(Color::White),
            Square::A1 => self.remove_queenside(Color::White),
            Square::H8 => self.remove_kingside(Color::Black),
            Square::A8 => self.remove_queenside(Color::Black),
            _ => {}
        }
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Reads a validated FEN castling field (`KQkq` subset or `-`).
    pub fn from_fen_field(field: &str) -> Self {
        let flags = field.chars().fold(0u8, |acc, c| {
            acc | match c {
                'K' => Self::WHITE_KINGSIDE,
                'Q' => Self::WHITE_QUEENSIDE,
                'k' => Self::BLACK_KINGSIDE,
                'q' => Self::BLACK_QUEENSIDE,
                _ => 0,
            }
        });
        CastlingRights(flags)
    }

    pub fn to_fen_field(self) -> String {
        if self.0 == 0 {
            return "-".to_string();
        }
        [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ]
        .into_iter()
        .filter(|(bit, _)| self.0 & bit != 0)
        .map(|(_, c)| c)
        .collect()
    }
}

/// Complete chess position.
///
/// Positions are values: [`Position::apply_move`] returns a new position and
/// never touches the receiver, so earlier positions stay valid for history
/// and repetition checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub board: Board,
    pub side_to_move: Color,
    pub castling: CastlingRights,
    /// Square a pawn skipped over on the previous move, if any.
    pub en_passant: Option<Square>,
    /// Half-moves since the last pawn move or capture.
    pub halfmove_clock: u32,
    /// Starts at 1 and increments after each Black move.
    pub fullmove_number: u32,
}

impl Position {
    /// A position with no men, White to move.
    pub fn empty() -> Self {
        Position {
            board: Board::empty(),
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn startpos() -> Self {
        Position {
            board: Board::startpos(),
            castling: CastlingRights::ALL,
            ..Position::empty()
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields = FenFields::parse(fen)?;
        Ok(Position {
            board: Board::from_fen_placement(&fields.placement)?,
            side_to_move: fields.side_to_move,
            castling: CastlingRights::from_fen_field(&fields.castling),
            en_passant: fields.en_passant,
            halfmove_clock: fields.halfmove_clock,
            fullmove_number: fields.fullmove_number,
        })
    }

    pub fn to_fen(&self) -> String {
        FenFields {
            placement: self.board.to_fen_placement(),
            side_to_move: self.side_to_move,
            castling: self.castling.to_fen_field(),
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
        .to_fen()
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        self.board.piece_at(sq)
    }

    /// Zobrist key of placement, side to move, castling and en passant file.
    pub fn zobrist_hash(&self) -> u64 {
        zobrist::hash(self)
    }

    /// Legal moves for the side to move, in ascending move order.
    pub fn legal_moves(&self) -> MoveList {
        movegen::generate_moves(self)
    }

    /// True when the side to move is in check.
    pub fn is_check(&self) -> bool {
        movegen::is_king_attacked(self, self.side_to_move)
    }

    /// Plays `m` without checking legality.
    ///
    /// # Panics
    ///
    /// Panics if no piece stands on the origin square.
    #[must_use]
    pub fn apply_move(&self, m: Move) -> Position {
        movegen::make_move(self, m)
    }

    /// Plays `m` after confirming it is legal here.
    ///
    /// The returned position is built from the generator's copy of the move,
    /// so a move parsed from UCI text gets its proper flag.
    pub fn play(&self, m: Move) -> Result<Position, MoveError> {
        match self.legal_moves().iter().find(|legal| **legal == m) {
            Some(legal) => Ok(movegen::make_move(self, *legal)),
            None => Err(MoveError {
                uci: m.to_uci(),
                fen: self.to_fen(),
            }),
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.board)?;
        write!(f, "{}", self.to_fen())
    }
}
