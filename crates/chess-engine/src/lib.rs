//! Bitboard chess rules engine.
//!
//! This crate provides:
//! - [`Bitboard`] and [`Board`] - piece placement as twelve 64-bit sets
//! - [`Position`] - placement plus side to move, castling, en passant and clocks
//! - [`movegen`] - legal move generation, attack detection and perft
//! - [`san`] - Standard Algebraic Notation in both directions
//! - [`rules`] - checkmate, stalemate and the draw rules
//! - [`Game`] - a game tree with variations, comments and tag pairs
//!
//! # Architecture
//!
//! Positions are immutable values. The generator produces pseudo-legal moves
//! and filters out those that leave the mover's king attacked. A [`Game`]
//! stores one position per node, so navigating the tree never replays moves.
//!
//! # Example
//!
//! ```
//! use chess_engine::{Game, Position, PushOptions, StandardChess};
//! use chess_engine::rules::RuleSet;
//!
//! // Positions on their own
//! let position = StandardChess.initial_position();
//! assert_eq!(StandardChess.generate_moves(&position).len(), 20);
//!
//! // A game record
//! let mut game = Game::new();
//! game.push_move("e4", PushOptions::default()).unwrap();
//! game.push_move("e5", PushOptions::default()).unwrap();
//! assert_eq!(
//!     game.to_fen(),
//!     "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2"
//! );
//! ```

mod bitboard;
mod board;
mod config;
mod game;
pub mod movegen;
mod position;
pub mod rules;
pub mod san;
pub mod zobrist;

pub use bitboard::{Bitboard, BitboardIter};
pub use board::{Board, BoardCodecError, FlipAxis};
pub use config::{ConfigError, DrawPolicy, GameConfig};
pub use game::{Game, GameError, Node, NodeId, PushOptions, TagPairs, Termination};
pub use movegen::{
    bishop_attacks, generate_moves, is_king_attacked, is_square_attacked, king_attacks,
    knight_attacks, make_move, pawn_attacks, perft, perft_divide, queen_attacks, rook_attacks,
    MoveList,
};
pub use position::{CastlingRights, MoveError, Position};
pub use rules::{eligible_draws, evaluate, GameResult, Method, RuleSet, StandardChess};
pub use san::{move_to_san, san_to_move, SanError};
pub use zobrist::hash_fen;
