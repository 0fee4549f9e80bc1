//! FEN (Forsyth-Edwards Notation) field parsing and validation.
//!
//! [`FenFields`] splits a FEN record into its six fields and validates each
//! one. Building a board out of the placement field is left to the engine,
//! which consumes [`parse_placement`].

use crate::{Color, Piece, Square};
use thiserror::Error;

/// Errors produced by malformed FEN text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 6 fields, got {0}")]
    InvalidFieldCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid side to move: expected 'w' or 'b', got '{0}'")]
    InvalidSideToMove(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),
}

/// The six validated fields of a FEN record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenFields {
    /// Piece placement, ranks 8 to 1 separated by `/`.
    pub placement: String,
    pub side_to_move: Color,
    /// Castling availability as written (`KQkq` subset or `-`).
    pub castling: String,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl FenFields {
    /// The standard starting position.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Splits and validates a FEN string.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        let [placement, side, castling, en_passant, halfmove, fullmove] = fields[..] else {
            return Err(FenError::InvalidFieldCount(fields.len()));
        };

        parse_placement(placement)?;

        let side_to_move = match side {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidSideToMove(other.to_string())),
        };

        validate_castling(castling)?;
        let en_passant = parse_en_passant(en_passant, side_to_move)?;

        let halfmove_clock = halfmove
            .parse::<u32>()
            .map_err(|_| FenError::InvalidHalfmoveClock(halfmove.to_string()))?;
        let fullmove_number = fullmove
            .parse::<u32>()
            .ok()
            .filter(|&n| n >= 1)
            .ok_or_else(|| FenError::InvalidFullmoveNumber(fullmove.to_string()))?;

        Ok(FenFields {
            placement: placement.to_string(),
            side_to_move,
            castling: castling.to_string(),
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Joins the fields back into a FEN string.
    pub fn to_fen(&self) -> String {
        let en_passant = self
            .en_passant
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());
        format!(
            "{} {} {} {} {} {}",
            self.placement,
            self.side_to_move.fen_char(),
            self.castling,
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

impl Default for FenFields {
    fn default() -> Self {
        FenFields {
            placement: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR".to_string(),
            side_to_move: Color::White,
            castling: "KQkq".to_string(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }
}

/// Decodes a placement field into the occupied squares, in FEN order.
///
/// Ranks run 8 to 1 and files a to h; digits 1-8 encode runs of empty
/// squares. Every rank must cover exactly eight squares.
pub fn parse_placement(placement: &str) -> Result<Vec<(Square, Piece, Color)>, FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::InvalidPiecePlacement(format!(
            "expected 8 ranks, got {}",
            ranks.len()
        )));
    }

    let mut pieces = Vec::with_capacity(32);
    for (i, rank_text) in ranks.iter().enumerate() {
        let rank = 7 - i as u8;
        let mut file = 0u8;
        for c in rank_text.chars() {
            if let Some(run) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                file += run as u8;
            } else if let Some((piece, color)) = Piece::from_fen_char(c) {
                if let Some(sq) = Square::from_coords(file, rank) {
                    pieces.push((sq, piece, color));
                }
                file += 1;
            } else {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "invalid character '{}' in rank {}",
                    c,
                    rank + 1
                )));
            }
            if file > 8 {
                break;
            }
        }
        if file != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "rank {} covers {} squares, expected 8",
                rank + 1,
                file
            )));
        }
    }

    Ok(pieces)
}

fn validate_castling(castling: &str) -> Result<(), FenError> {
    if castling == "-" {
        return Ok(());
    }
    if castling.is_empty() {
        return Err(FenError::InvalidCastlingRights(castling.to_string()));
    }

    let mut seen = [false; 4];
    for c in castling.chars() {
        let slot = match c {
            'K' => 0,
            'Q' => 1,
            'k' => 2,
            'q' => 3,
            _ => {
                return Err(FenError::InvalidCastlingRights(format!(
                    "invalid character '{}' in '{}'",
                    c, castling
                )))
            }
        };
        if seen[slot] {
            return Err(FenError::InvalidCastlingRights(format!(
                "duplicate '{}' in '{}'",
                c, castling
            )));
        }
        seen[slot] = true;
    }

    Ok(())
}

/// The target square lies behind a pawn the opponent just pushed two squares,
/// so it must sit on rank 6 with White to move and rank 3 with Black to move.
fn parse_en_passant(ep: &str, side_to_move: Color) -> Result<Option<Square>, FenError> {
    if ep == "-" {
        return Ok(None);
    }
    let target_rank = match side_to_move {
        Color::White => 5,
        Color::Black => 2,
    };
    match Square::from_algebraic(ep) {
        Some(sq) if sq.rank_index() == target_rank => Ok(Some(sq)),
        _ => Err(FenError::InvalidEnPassantSquare(ep.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_startpos() {
        let fen = FenFields::parse(FenFields::STARTPOS).unwrap();
        assert_eq!(fen.side_to_move, Color::White);
        assert_eq!(fen.castling, "KQkq");
        assert_eq!(fen.en_passant, None);
        assert_eq!(fen.halfmove_clock, 0);
        assert_eq!(fen.fullmove_number, 1);
        assert_eq!(fen, FenFields::default());
    }

    #[test]
    fn round_trip_with_en_passant() {
        let original = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let parsed = FenFields::parse(original).unwrap();
        assert_eq!(parsed.en_passant, Square::from_algebraic("e3"));
        assert_eq!(parsed.to_fen(), original);
    }

    #[test]
    fn extra_whitespace_is_tolerated() {
        let parsed = FenFields::parse("  8/8/8/8/8/8/8/K6k   w - -  3 40 ").unwrap();
        assert_eq!(parsed.halfmove_clock, 3);
        assert_eq!(parsed.fullmove_number, 40);
    }

    #[test]
    fn wrong_field_count() {
        assert_eq!(
            FenFields::parse("invalid"),
            Err(FenError::InvalidFieldCount(1))
        );
        assert!(matches!(
            FenFields::parse("8/8/8/8/8/8/8/8 w - -"),
            Err(FenError::InvalidFieldCount(4))
        ));
        assert!(matches!(
            FenFields::parse("8/8/8/8/8/8/8/8 w - - 0 1 extra"),
            Err(FenError::InvalidFieldCount(7))
        ));
    }

    #[test]
    fn bad_side_to_move() {
        assert!(matches!(
            FenFields::parse("8/8/8/8/8/8/8/8 x KQkq - 0 1"),
            Err(FenError::InvalidSideToMove(_))
        ));
        assert!(matches!(
            FenFields::parse("8/8/8/8/8/8/8/8 W - - 0 1"),
            Err(FenError::InvalidSideToMove(_))
        ));
    }

    #[test]
    fn bad_placement() {
        // seven ranks
        assert!(matches!(
            FenFields::parse("8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        // unknown letter
        assert!(matches!(
            FenFields::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPXPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        // nine squares
        assert!(matches!(
            FenFields::parse("rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        // seven squares
        assert!(matches!(
            FenFields::parse("rnbqkbn/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        // a zero run is not an empty-square count
        assert!(matches!(
            FenFields::parse("08/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
    }

    #[test]
    fn placement_squares() {
        let pieces = parse_placement("4k3/8/8/8/8/8/8/4K2R").unwrap();
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0], (Square::E8, Piece::King, Color::Black));
        assert_eq!(pieces[1], (Square::E1, Piece::King, Color::White));
        assert_eq!(pieces[2], (Square::H1, Piece::Rook, Color::White));
    }

    #[test]
    fn bad_castling() {
        assert!(matches!(
            FenFields::parse("8/8/8/8/8/8/8/8 w XYZ - 0 1"),
            Err(FenError::InvalidCastlingRights(_))
        ));
        assert!(matches!(
            FenFields::parse("8/8/8/8/8/8/8/8 w KK - 0 1"),
            Err(FenError::InvalidCastlingRights(_))
        ));
        assert!(FenFields::parse("8/8/8/8/8/8/8/8 w Kq - 0 1").is_ok());
    }

    #[test]
    fn bad_en_passant() {
        for ep in ["abc", "x3", "e4", "e9"] {
            let fen = format!("8/8/8/8/8/8/8/8 w - {} 0 1", ep);
            assert!(
                matches!(FenFields::parse(&fen), Err(FenError::InvalidEnPassantSquare(_))),
                "{} should be rejected",
                ep
            );
        }
        let parsed = FenFields::parse("8/8/8/8/8/8/8/8 w - d6 0 1").unwrap();
        assert_eq!(parsed.en_passant, Square::from_algebraic("d6"));
    }

    #[test]
    fn en_passant_rank_follows_side_to_move() {
        // e3 is only a target after White's double push, so Black must be to move
        assert!(matches!(
            FenFields::parse("4k3/8/8/8/8/8/3PP3/4K3 w - e3 0 1"),
            Err(FenError::InvalidEnPassantSquare(_))
        ));
        assert!(matches!(
            FenFields::parse("4k3/8/8/8/4p3/8/8/4K3 b - e6 0 1"),
            Err(FenError::InvalidEnPassantSquare(_))
        ));
        let parsed = FenFields::parse("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1").unwrap();
        assert_eq!(parsed.en_passant, Square::from_algebraic("e3"));
    }

    #[test]
    fn bad_counters() {
        assert!(matches!(
            FenFields::parse("8/8/8/8/8/8/8/8 w - - abc 1"),
            Err(FenError::InvalidHalfmoveClock(_))
        ));
        assert!(matches!(
            FenFields::parse("8/8/8/8/8/8/8/8 w - - 0 -1"),
            Err(FenError::InvalidFullmoveNumber(_))
        ));
        // move numbers start at 1
        assert_eq!(
            FenFields::parse("8/8/8/8/8/8/8/8 w - - 0 0"),
            Err(FenError::InvalidFullmoveNumber("0".to_string()))
        );
    }

    #[test]
    fn error_messages_name_the_input() {
        assert!(FenError::InvalidFieldCount(3).to_string().contains('3'));
        assert!(FenError::InvalidSideToMove("x".into()).to_string().contains('x'));
        assert!(FenError::InvalidEnPassantSquare("z9".into())
            .to_string()
            .contains("z9"));
    }
}
