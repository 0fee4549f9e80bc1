//! Game results and termination rules.
//!
//! Position-local conditions (checkmate, stalemate, insufficient material)
//! live behind the [`RuleSet`] trait. Rules that need the path that led to a
//! position (repetition) or a caller policy (claimable draws) are decided by
//! [`evaluate`], which takes the Zobrist keys of every position on the path.

mod standard;

pub use standard::StandardChess;

use crate::{DrawPolicy, GameConfig, MoveList, Position};
use chess_core::{Color, Move};
use std::fmt;

/// State of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameResult {
    #[default]
    InProgress,
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameResult {
    /// The side that won, if any.
    pub fn winner(self) -> Option<Color> {
        match self {
            GameResult::WhiteWins => Some(Color::White),
            GameResult::BlackWins => Some(Color::Black),
            _ => None,
        }
    }

    /// A win for `color`.
    pub fn win_for(color: Color) -> Self {
        match color {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        }
    }

    pub fn is_over(self) -> bool {
        self != GameResult::InProgress
    }

    /// PGN result token.
    pub fn as_pgn(self) -> &'static str {
        match self {
            GameResult::InProgress => "*",
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_pgn())
    }
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    None,
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    /// 100 half-moves without a pawn move or capture.
    FiftyMoveRule,
    /// 150 half-moves without a pawn move or capture.
    SeventyFiveMoveRule,
    ThreefoldRepetition,
    FivefoldRepetition,
    Resignation,
    DrawAgreement,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::None => "none",
            Method::Checkmate => "checkmate",
            Method::Stalemate => "stalemate",
            Method::InsufficientMaterial => "insufficient material",
            Method::FiftyMoveRule => "fifty-move rule",
            Method::SeventyFiveMoveRule => "seventy-five-move rule",
            Method::ThreefoldRepetition => "threefold repetition",
            Method::FivefoldRepetition => "fivefold repetition",
            Method::Resignation => "resignation",
            Method::DrawAgreement => "draw agreement",
        };
        f.write_str(name)
    }
}

/// Rules of a chess variant.
///
/// # Example
///
/// ```
/// use chess_engine::rules::RuleSet;
/// use chess_engine::StandardChess;
///
/// let position = StandardChess.initial_position();
/// assert_eq!(StandardChess.generate_moves(&position).len(), 20);
/// ```
pub trait RuleSet {
    fn initial_position(&self) -> Position;

    /// Every legal move, in ascending move order.
    fn generate_moves(&self, position: &Position) -> MoveList;

    fn is_legal(&self, position: &Position, m: Move) -> bool {
        self.generate_moves(position).contains(&m)
    }

    /// Plays `m` without checking legality.
    ///
    /// # Panics
    ///
    /// May panic if the move is not legal. Use
    /// [`try_make_move`](RuleSet::try_make_move) for untrusted input.
    fn make_move(&self, position: &Position, m: Move) -> Position;

    /// Plays `m` if it is legal.
    fn try_make_move(&self, position: &Position, m: Move) -> Option<Position> {
        let legal = self.generate_moves(position);
        let found = legal.iter().find(|candidate| **candidate == m)?;
        Some(self.make_move(position, *found))
    }

    /// True when the side to move is in check.
    fn is_check(&self, position: &Position) -> bool;

    /// True when neither side can possibly deliver mate.
    fn is_insufficient_material(&self, position: &Position) -> bool;

    /// Outcome decided by `position` alone: checkmate, stalemate or
    /// insufficient material, in that order.
    fn position_outcome(&self, position: &Position) -> (GameResult, Method) {
        if self.generate_moves(position).is_empty() {
            return if self.is_check(position) {
                (
                    GameResult::win_for(position.side_to_move.opposite()),
                    Method::Checkmate,
                )
            } else {
                (GameResult::Draw, Method::Stalemate)
            };
        }
        if self.is_insufficient_material(position) {
            return (GameResult::Draw, Method::InsufficientMaterial);
        }
        (GameResult::InProgress, Method::None)
    }
}

/// Half-move clock value at which the fifty-move rule applies.
pub const FIFTY_MOVE_PLIES: u32 = 100;
/// Half-move clock value at which the seventy-five-move rule applies.
pub const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

/// Number of times the last key of `keys` occurs in `keys`.
pub fn repetition_count(keys: &[u64]) -> usize {
    keys.last()
        .map_or(0, |current| keys.iter().filter(|k| *k == current).count())
}

/// Outcome of the game whose current position is `position`.
///
/// `keys` holds the Zobrist key of every position from the start of the
/// game to `position`, inclusive. Forced draws (seventy-five moves,
/// fivefold repetition) apply when `config.automatic_draws` is set; the
/// fifty-move rule and threefold repetition end the game only under
/// [`DrawPolicy::Automatic`].
pub fn evaluate(position: &Position, keys: &[u64], config: &GameConfig) -> (GameResult, Method) {
    let local = StandardChess.position_outcome(position);
    if local.0.is_over() {
        return local;
    }

    let repetitions = repetition_count(keys);
    let clock = position.halfmove_clock;

    if config.automatic_draws {
        if clock >= SEVENTY_FIVE_MOVE_PLIES {
            return (GameResult::Draw, Method::SeventyFiveMoveRule);
        }
        if repetitions >= 5 {
            return (GameResult::Draw, Method::FivefoldRepetition);
        }
    }

    if config.draw_policy == DrawPolicy::Automatic {
        if clock >= FIFTY_MOVE_PLIES {
            return (GameResult::Draw, Method::FiftyMoveRule);
        }
        if repetitions >= 3 {
            return (GameResult::Draw, Method::ThreefoldRepetition);
        }
    }

    (GameResult::InProgress, Method::None)
}

/// Draws the side to move could claim in `position`.
pub fn eligible_draws(position: &Position, keys: &[u64]) -> Vec<Method> {
    let mut draws = Vec::new();
    if position.halfmove_clock >= FIFTY_MOVE_PLIES {
        draws.push(Method::FiftyMoveRule);
    }
    if repetition_count(keys) >= 3 {
        draws.push(Method::ThreefoldRepetition);
    }
    draws
}
