//! Standard Algebraic Notation (SAN).
//!
//! Formatting needs the position before the move: disambiguation looks at
//! the other legal moves, and the `+`/`#` suffix at the position after it.
//! Parsing matches the text against the legal moves and never guesses: no
//! match and several matches are both errors.

use crate::movegen::{generate_moves, is_king_attacked, make_move, MoveList};
use crate::Position;
use chess_core::{File, Move, Piece, Rank, Square};
use thiserror::Error;

/// Errors produced when parsing SAN text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SanError {
    #[error("empty SAN string")]
    Empty,

    #[error("invalid SAN format: {0}")]
    InvalidFormat(String),

    #[error("no legal move matches {0}")]
    NoMatchingMove(String),

    #[error("ambiguous move {0}")]
    AmbiguousMove(String),
}

impl SanError {
    /// True for malformed text, false for well-formed text that names no
    /// single legal move.
    pub fn is_format_error(&self) -> bool {
        matches!(self, SanError::Empty | SanError::InvalidFormat(_))
    }
}

/// Renders a legal move of `position` in SAN.
pub fn move_to_san(position: &Position, m: Move) -> String {
    let legal = generate_moves(position);
    format_with(position, m, &legal)
}

fn format_with(position: &Position, m: Move, legal: &MoveList) -> String {
    let (from, to) = (m.from(), m.to());
    let Some((piece, _)) = position.piece_at(from) else {
        return m.to_uci();
    };

    let mut san = String::with_capacity(8);
    if piece == Piece::King && from.file_index().abs_diff(to.file_index()) == 2 {
        san.push_str(if to.file_index() > from.file_index() {
            "O-O"
        } else {
            "O-O-O"
        });
    } else {
        let capture = position.piece_at(to).is_some()
            || (piece == Piece::Pawn && from.file_index() != to.file_index());

        if piece == Piece::Pawn {
            if capture {
                san.push(from.file().to_char());
            }
        } else {
            san.push(piece.san_char());
            san.push_str(&disambiguation(position, m, piece, legal));
        }
        if capture {
            san.push('x');
        }
        san.push_str(&to.to_algebraic());
        if let Some(promo) = m.promotion_piece() {
            san.push('=');
            san.push(promo.san_char());
        } else if piece == Piece::Pawn && to.rank_index() == position.side_to_move.promotion_rank()
        {
            san.push_str("=Q");
        }
    }

    let after = make_move(position, m);
    if is_king_attacked(&after, after.side_to_move) {
        san.push(if generate_moves(&after).is_empty() {
            '#'
        } else {
            '+'
        });
    }
    san
}

/// Origin file, rank or both: the shortest prefix that tells `m` apart from
/// other legal moves of the same kind to the same square.
fn disambiguation(position: &Position, m: Move, piece: Piece, legal: &MoveList) -> String {
    let from = m.from();
    let rivals: Vec<Square> = legal
        .iter()
        .filter(|other| other.to() == m.to() && other.from() != from)
        .filter(|other| position.piece_at(other.from()).map(|(p, _)| p) == Some(piece))
        .map(|other| other.from())
        .collect();

    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|sq| sq.file() != from.file()) {
        from.file().to_string()
    } else if rivals.iter().all(|sq| sq.rank() != from.rank()) {
        from.rank().to_string()
    } else {
        from.to_algebraic()
    }
}

/// Components of a non-castling SAN token.
#[derive(Debug)]
struct ParsedSan {
    piece: Piece,
    from_file: Option<File>,
    from_rank: Option<Rank>,
    to: Square,
    promotion: Option<Piece>,
}

enum Token {
    Castle { kingside: bool },
    Standard(ParsedSan),
}

/// Parses SAN text into a legal move of `position`.
///
/// Check, mate and `!`/`?` annotations are ignored, `0-0` is accepted for
/// `O-O`, and a promotion without a piece letter means a queen. Text that
/// matches no canonical SAN is matched by its components, so
/// over-disambiguated input such as `Ngf3` is accepted when unique.
pub fn san_to_move(position: &Position, text: &str) -> Result<Move, SanError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SanError::Empty);
    }
    let core = trimmed.trim_end_matches(&['+', '#', '!', '?'][..]);
    let core = match core {
        "0-0" => "O-O",
        "0-0-0" => "O-O-O",
        other => other,
    };
    let token = parse_token(core).ok_or_else(|| SanError::InvalidFormat(trimmed.to_string()))?;

    let legal = generate_moves(position);
    let exact: Vec<Move> = legal
        .iter()
        .copied()
        .filter(|m| format_with(position, *m, &legal).trim_end_matches(&['+', '#'][..]) == core)
        .collect();
    if let [m] = exact[..] {
        return Ok(m);
    }

    let matching: Vec<Move> = legal
        .iter()
        .copied()
        .filter(|m| token_matches(position, &token, *m))
        .collect();
    match matching[..] {
        [m] => Ok(m),
        [] => Err(SanError::NoMatchingMove(trimmed.to_string())),
        _ => Err(SanError::AmbiguousMove(trimmed.to_string())),
    }
}

fn token_matches(position: &Position, token: &Token, m: Move) -> bool {
    let Some((piece, _)) = position.piece_at(m.from()) else {
        return false;
    };
    let castles = piece == Piece::King && m.from().file_index().abs_diff(m.to().file_index()) == 2;

    match token {
        Token::Castle { kingside } => {
            castles && (m.to().file_index() > m.from().file_index()) == *kingside
        }
        Token::Standard(parsed) => {
            !castles
                && piece == parsed.piece
                && m.to() == parsed.to
                && parsed.from_file.map_or(true, |f| m.from().file() == f)
                && parsed.from_rank.map_or(true, |r| m.from().rank() == r)
                && match (parsed.promotion, m.promotion_piece()) {
                    (Some(wanted), Some(actual)) => wanted == actual,
                    (None, Some(actual)) => actual == Piece::Queen,
                    (None, None) => true,
                    (Some(_), None) => false,
                }
        }
    }
}

fn parse_token(core: &str) -> Option<Token> {
    match core {
        "O-O" => return Some(Token::Castle { kingside: true }),
        "O-O-O" => return Some(Token::Castle { kingside: false }),
        _ => {}
    }
    if !core.is_ascii() {
        return None;
    }

    let mut chars: Vec<char> = core.chars().collect();

    let piece = match chars.first().copied().and_then(Piece::from_san_char) {
        Some(p) => {
            chars.remove(0);
            p
        }
        None => Piece::Pawn,
    };

    let mut promotion = None;
    if let Some(p) = chars.last().copied().and_then(Piece::from_san_char) {
        if piece != Piece::Pawn || !p.is_promotion_target() {
            return None;
        }
        promotion = Some(p);
        chars.pop();
        if chars.last() == Some(&'=') {
            chars.pop();
        }
    }

    if chars.len() < 2 {
        return None;
    }
    let rank = Rank::from_char(chars.pop()?)?;
    let file = File::from_char(chars.pop()?)?;
    let to = Square::new(file, rank);

    if chars.last() == Some(&'x') {
        chars.pop();
    }

    let (from_file, from_rank) = match chars[..] {
        [] => (None, None),
        [c] => match (File::from_char(c), Rank::from_char(c)) {
            (Some(f), _) => (Some(f), None),
            (None, Some(r)) => (None, Some(r)),
            _ => return None,
        },
        [f, r] => (Some(File::from_char(f)?), Some(Rank::from_char(r)?)),
        _ => return None,
    };
    if piece == Piece::Pawn && from_rank.is_some() {
        return None;
    }

    Some(Token::Standard(ParsedSan {
        piece,
        from_file,
        from_rank,
        to,
        promotion,
    }))
}
