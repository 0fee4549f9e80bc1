//! Standard chess rules.

use super::RuleSet;
use crate::{movegen, Bitboard, MoveList, Position};
use chess_core::{Move, Piece};

/// Standard chess rules (FIDE), including castling, en passant and
/// promotion.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardChess;

impl RuleSet for StandardChess {
    fn initial_position(&self) -> Position {
        Position::startpos()
    }

    fn generate_moves(&self, position: &Position) -> MoveList {
        movegen::generate_moves(position)
    }

    fn make_move(&self, position: &Position, m: Move) -> Position {
        movegen::make_move(position, m)
    }

    fn is_check(&self, position: &Position) -> bool {
        movegen::is_king_attacked(position, position.side_to_move)
    }

    fn is_insufficient_material(&self, position: &Position) -> bool {
        let board = &position.board;
        let heavy = board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | board.pieces(Piece::Queen);
        if heavy.is_not_empty() {
            return false;
        }

        let knights = board.pieces(Piece::Knight);
        let bishops = board.pieces(Piece::Bishop);
        if (knights | bishops).count() <= 1 {
            return true;
        }

        // any number of bishops, all on one square colour
        knights.is_empty()
            && ((bishops & Bitboard::LIGHT_SQUARES).is_empty()
                || (bishops & Bitboard::DARK_SQUARES).is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{GameResult, Method};
    use chess_core::FenFields;

    fn insufficient(fen: &str) -> bool {
        StandardChess.is_insufficient_material(&Position::from_fen(fen).unwrap())
    }

    #[test]
    fn initial_position() {
        let pos = StandardChess.initial_position();
        assert_eq!(pos.to_fen(), FenFields::STARTPOS);
        assert_eq!(StandardChess.generate_moves(&pos).len(), 20);
    }

    #[test]
    fn insufficient_material_cases() {
        assert!(insufficient("4k3/8/8/8/8/8/8/4K3 w - - 0 1"));
        assert!(insufficient("4k3/8/8/8/8/8/8/4KN2 w - - 0 1"));
        assert!(insufficient("4kb2/8/8/8/8/8/8/4K3 w - - 0 1"));
        // bishops on c1 and f8 are both dark squares
        assert!(insufficient("4kb2/8/8/8/8/8/8/2B1K3 w - - 0 1"));

        assert!(!insufficient("4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1"));
        assert!(!insufficient("4k3/8/8/8/8/8/8/4KNN1 w - - 0 1"));
        assert!(!insufficient("4kn2/8/8/8/8/8/8/2B1K3 w - - 0 1"));
        assert!(!insufficient("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"));
        assert!(!insufficient("4k3/8/8/8/8/8/8/R3K3 w - - 0 1"));
    }

    #[test]
    fn check_and_outcomes() {
        let mated =
            Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        assert!(StandardChess.is_check(&mated));
        assert_eq!(
            StandardChess.position_outcome(&mated),
            (GameResult::BlackWins, Method::Checkmate)
        );

        let stalemate = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(!StandardChess.is_check(&stalemate));
        assert_eq!(
            StandardChess.position_outcome(&stalemate),
            (GameResult::Draw, Method::Stalemate)
        );

        assert_eq!(
            StandardChess.position_outcome(&Position::startpos()),
            (GameResult::InProgress, Method::None)
        );
    }

    #[test]
    fn try_make_move_rejects_illegal_moves() {
        let pos = Position::startpos();
        let e2e4 = Move::from_uci("e2e4").unwrap();
        let e2e5 = Move::from_uci("e2e5").unwrap();
        assert!(StandardChess.is_legal(&pos, e2e4));
        assert!(!StandardChess.is_legal(&pos, e2e5));
        assert!(StandardChess.try_make_move(&pos, e2e5).is_none());

        let next = StandardChess.try_make_move(&pos, e2e4).unwrap();
        assert_eq!(
            next.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }
}
