//! Core types for chess.
//!
//! This crate provides the vocabulary shared by the engine and the CLI:
//! - [`Piece`] and [`Color`] for the men on the board
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`] and [`MoveFlag`] for move representation
//! - [`FenFields`] for splitting and validating FEN records

mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use fen::{parse_placement, FenError, FenFields};
pub use mov::{Move, MoveFlag};
pub use piece::Piece;
pub use square::{File, Rank, Square};
