//! Legal move generation.
//!
//! Moves are produced pseudo-legally per piece kind, then every move that
//! would leave the mover's king attacked is dropped by playing it and asking
//! [`is_square_attacked`]. The result is sorted so index-based selection is
//! reproducible.

mod attacks;
pub mod perft;

use crate::{Bitboard, Board, Position};
use chess_core::{Color, Move, MoveFlag, Piece, Square};

pub use attacks::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks,
};
pub use perft::{perft, perft_divide};

/// A list of moves with a fixed maximum capacity.
///
/// No legal chess position has more than 218 moves, so the list lives on the
/// stack.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    pub const MAX_MOVES: usize = 256;

    const FILLER: Move = Move::normal(Square::A1, Square::A1);

    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Self::FILLER; Self::MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        if self.len < Self::MAX_MOVES {
            self.moves[self.len] = m;
            self.len += 1;
        }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    /// True when a move equal to `m` (same squares and promotion) is listed.
    pub fn contains(&self, m: &Move) -> bool {
        self.as_slice().contains(m)
    }

    pub fn get(&self, index: usize) -> Option<&Move> {
        self.as_slice().get(index)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Keeps only the moves for which `f` returns true, preserving order.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }

    fn sort(&mut self) {
        self.moves[..self.len].sort_unstable();
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Move {
        &self.as_slice()[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Generates every legal move for the side to move, sorted by origin,
/// destination and promotion.
pub fn generate_moves(position: &Position) -> MoveList {
    let mut moves = MoveList::new();

    generate_pawn_moves(position, &mut moves);
    for piece in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King] {
        generate_piece_moves(position, piece, &mut moves);
    }
    generate_castling_moves(position, &mut moves);

    let us = position.side_to_move;
    moves.retain(|m| !is_king_attacked(&make_move(position, *m), us));
    moves.sort();
    moves
}

fn push_pawn_move(moves: &mut MoveList, from: Square, to: Square, flag: MoveFlag, color: Color) {
    if to.rank_index() == color.promotion_rank() {
        for piece in Piece::PROMOTIONS {
            moves.push(Move::promotion(from, to, piece, flag));
        }
    } else {
        moves.push(Move::new(from, to, flag));
    }
}

fn generate_pawn_moves(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move;
    let board = &position.board;
    let occupied = board.occupied();
    let enemies = board.occupancy_of(us.opposite());
    let dir = us.pawn_direction();
    let start_rank = (us.back_rank() as i8 + dir) as u8;
    // the target only counts with an enemy pawn standing behind it
    let en_passant = position.en_passant.filter(|ep| {
        ep.offset(0, -dir)
            .is_some_and(|victim| board.piece_at(victim) == Some((Piece::Pawn, us.opposite())))
    });

    for from in board.pieces_of(Piece::Pawn, us) {
        if let Some(one) = from.offset(0, dir).filter(|sq| !occupied.contains(*sq)) {
            push_pawn_move(moves, from, one, MoveFlag::Normal, us);
            if from.rank_index() == start_rank {
                if let Some(two) = one.offset(0, dir).filter(|sq| !occupied.contains(*sq)) {
                    moves.push(Move::new(from, two, MoveFlag::DoublePush));
                }
            }
        }

        let targets = pawn_attacks(from, us);
        for to in targets & enemies {
            push_pawn_move(moves, from, to, MoveFlag::Capture, us);
        }
        if let Some(ep) = en_passant {
            if targets.contains(ep) && !occupied.contains(ep) {
                moves.push(Move::new(from, ep, MoveFlag::EnPassant));
            }
        }
    }
}

fn generate_piece_moves(position: &Position, piece: Piece, moves: &mut MoveList) {
    let us = position.side_to_move;
    let board = &position.board;
    let occupied = board.occupied();
    let ours = board.occupancy_of(us);
    let enemies = board.occupancy_of(us.opposite());

    for from in board.pieces_of(piece, us) {
        let targets = piece_attacks(piece, from, occupied) & !ours;
        for to in targets {
            let flag = if enemies.contains(to) {
                MoveFlag::Capture
            } else {
                MoveFlag::Normal
            };
            moves.push(Move::new(from, to, flag));
        }
    }
}

fn piece_attacks(piece: Piece, from: Square, occupied: Bitboard) -> Bitboard {
    match piece {
        Piece::Knight => knight_attacks(from),
        Piece::Bishop => bishop_attacks(from, occupied),
        Piece::Rook => rook_attacks(from, occupied),
        Piece::Queen => queen_attacks(from, occupied),
        Piece::King => king_attacks(from),
        Piece::Pawn => Bitboard::EMPTY,
    }
}

/// Squares the king and rook use when castling, for one side and wing.
struct CastlePath {
    king_from: Square,
    king_to: Square,
    rook_from: Square,
    /// Must be empty.
    between: &'static [Square],
    /// Square the king crosses; must not be attacked.
    transit: Square,
    flag: MoveFlag,
}

const fn castle_path(color: Color, kingside: bool) -> CastlePath {
    match (color, kingside) {
        (Color::White, true) => CastlePath {
            king_from: Square::E1,
            king_to: Square::G1,
            rook_from: Square::H1,
            between: &[Square::F1, Square::G1],
            transit: Square::F1,
            flag: MoveFlag::CastleKingside,
        },
        (Color::White, false) => CastlePath {
            king_from: Square::E1,
            king_to: Square::C1,
            rook_from: Square::A1,
            between: &[Square::B1, Square::C1, Square::D1],
            transit: Square::D1,
            flag: MoveFlag::CastleQueenside,
        },
        (Color::Black, true) => CastlePath {
            king_from: Square::E8,
            king_to: Square::G8,
            rook_from: Square::H8,
            between: &[Square::F8, Square::G8],
            transit: Square::F8,
            flag: MoveFlag::CastleKingside,
        },
        (Color::Black, false) => CastlePath {
            king_from: Square::E8,
            king_to: Square::C8,
            rook_from: Square::A8,
            between: &[Square::B8, Square::C8, Square::D8],
            transit: Square::D8,
            flag: MoveFlag::CastleQueenside,
        },
    }
}

/// Adds castling moves whose right is held, whose king and rook stand at
/// home with nothing between them, and whose king neither starts in nor
/// crosses check. Landing in check is caught by the legality filter.
fn generate_castling_moves(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move;
    let them = us.opposite();
    let board = &position.board;

    for kingside in [true, false] {
        let allowed = if kingside {
            position.castling.can_castle_kingside(us)
        } else {
            position.castling.can_castle_queenside(us)
        };
        if !allowed {
            continue;
        }

        let path = castle_path(us, kingside);
        if board.piece_at(path.king_from) != Some((Piece::King, us))
            || board.piece_at(path.rook_from) != Some((Piece::Rook, us))
            || path.between.iter().any(|sq| board.piece_at(*sq).is_some())
            || is_square_attacked(position, path.king_from, them)
            || is_square_attacked(position, path.transit, them)
        {
            continue;
        }

        moves.push(Move::new(path.king_from, path.king_to, path.flag));
    }
}

/// True when any man of color `by` attacks `sq`.
pub fn is_square_attacked(position: &Position, sq: Square, by: Color) -> bool {
    board_attacks(&position.board, sq, by)
}

fn board_attacks(board: &Board, sq: Square, by: Color) -> bool {
    let occupied = board.occupied();
    let queens = board.pieces_of(Piece::Queen, by);

    (pawn_attacks(sq, by.opposite()) & board.pieces_of(Piece::Pawn, by)).is_not_empty()
        || (knight_attacks(sq) & board.pieces_of(Piece::Knight, by)).is_not_empty()
        || (king_attacks(sq) & board.pieces_of(Piece::King, by)).is_not_empty()
        || (bishop_attacks(sq, occupied) & (board.pieces_of(Piece::Bishop, by) | queens))
            .is_not_empty()
        || (rook_attacks(sq, occupied) & (board.pieces_of(Piece::Rook, by) | queens))
            .is_not_empty()
}

/// True when `color`'s king stands on an attacked square. A side without a
/// king is never in check.
pub fn is_king_attacked(position: &Position, color: Color) -> bool {
    position
        .board
        .king_square(color)
        .is_some_and(|king| board_attacks(&position.board, king, color.opposite()))
}

/// Plays `m` on a copy of `position`.
///
/// Special moves are recognised from the board rather than from the move
/// flag: a king travelling two files castles, a pawn moving diagonally onto
/// the en passant square captures en passant, and a pawn reaching the last
/// rank without a promotion piece becomes a queen.
///
/// # Panics
///
/// Panics if no piece stands on the origin square.
pub fn make_move(position: &Position, m: Move) -> Position {
    let us = position.side_to_move;
    let (from, to) = (m.from(), m.to());
    let mut next = position.clone();
    let board = &mut next.board;

    let (piece, _) = board
        .remove(from)
        .expect("make_move called without a piece on the origin square");
    let mut captured = board.remove(to).is_some();

    match piece {
        Piece::Pawn => {
            if from.file_index() != to.file_index() && !captured && position.en_passant == Some(to)
            {
                if let Some(victim) = to.offset(0, -us.pawn_direction()) {
                    board.remove(victim);
                }
                captured = true;
            }
            let landed = if to.rank_index() == us.promotion_rank() {
                m.promotion_piece().unwrap_or(Piece::Queen)
            } else {
                Piece::Pawn
            };
            board.put(to, landed, us);
        }
        Piece::King if from.file_index().abs_diff(to.file_index()) == 2 => {
            let kingside = to.file_index() > from.file_index();
            let path = castle_path(us, kingside);
            let rook_to = if kingside {
                to.offset(-1, 0)
            } else {
                to.offset(1, 0)
            };
            if let (Some(_), Some(rook_to)) = (board.remove(path.rook_from), rook_to) {
                board.put(rook_to, Piece::Rook, us);
            }
            board.put(to, piece, us);
        }
        _ => board.put(to, piece, us),
    }

    next.castling.remove_for_square(from);
    next.castling.remove_for_square(to);

    next.en_passant = if piece == Piece::Pawn && from.rank_index().abs_diff(to.rank_index()) == 2 {
        from.offset(0, us.pawn_direction())
    } else {
        None
    };

    if piece == Piece::Pawn || captured {
        next.halfmove_clock = 0;
    } else {
        next.halfmove_clock += 1;
    }
    if us == Color::Black {
        next.fullmove_number += 1;
    }
    next.side_to_move = us.opposite();

    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn find(position: &Position, uci: &str) -> Move {
        let wanted = Move::from_uci(uci).unwrap();
        *generate_moves(position)
            .iter()
            .find(|m| **m == wanted)
            .unwrap_or_else(|| panic!("{} is not legal", uci))
    }

    fn has_flag(position: &Position, flag: MoveFlag) -> bool {
        generate_moves(position).iter().any(|m| m.flag() == flag)
    }

    #[test]
    fn movelist_basics() {
        let mut list = MoveList::new();
        assert!(list.is_empty());
        list.push(Move::normal(sq("e2"), sq("e3")));
        list.push(Move::normal(sq("e2"), sq("e4")));
        list.push(Move::normal(sq("d2"), sq("d4")));
        assert_eq!(list.len(), 3);
        assert_eq!(list[1].to(), sq("e4"));
        assert!(list.contains(&Move::new(sq("d2"), sq("d4"), MoveFlag::DoublePush)));
        assert_eq!(list.get(3), None);

        list.retain(|m| m.from() == sq("e2"));
        assert_eq!(list.len(), 2);
        list.clear();
        assert!(MoveList::default().is_empty() && list.is_empty());
    }

    #[test]
    fn startpos_and_reply_counts() {
        let start = Position::startpos();
        assert_eq!(generate_moves(&start).len(), 20);
        let after_e4 = make_move(&start, find(&start, "e2e4"));
        assert_eq!(generate_moves(&after_e4).len(), 20);
    }

    #[test]
    fn output_is_sorted() {
        let position = pos("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let moves = generate_moves(&position);
        assert!(moves.as_slice().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(moves[0], Move::normal(Square::A1, Square::B1));
    }

    #[test]
    fn flags_are_classified() {
        let start = Position::startpos();
        assert_eq!(find(&start, "e2e4").flag(), MoveFlag::DoublePush);
        assert_eq!(find(&start, "e2e3").flag(), MoveFlag::Normal);

        let position = pos("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
        assert_eq!(find(&position, "e4d5").flag(), MoveFlag::Capture);
    }

    #[test]
    fn double_push_sets_en_passant() {
        let start = Position::startpos();
        let next = make_move(&start, find(&start, "e2e4"));
        assert_eq!(next.side_to_move, Color::Black);
        assert_eq!(next.en_passant, Some(sq("e3")));
        assert_eq!(next.halfmove_clock, 0);
        assert_eq!(next.fullmove_number, 1);

        let reply = make_move(&next, find(&next, "g8f6"));
        assert_eq!(reply.en_passant, None);
        assert_eq!(reply.halfmove_clock, 1);
        assert_eq!(reply.fullmove_number, 2);
    }

    #[test]
    fn blocked_pawns_cannot_push() {
        let position = pos("4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1");
        let moves = generate_moves(&position);
        assert!(moves.iter().all(|m| m.from() != sq("e2")));
    }

    #[test]
    fn en_passant_capture() {
        let position = pos("rnbqkbnr/pppp1ppp/8/4pP2/8/8/PPPPP1PP/RNBQKBNR w KQkq e6 0 3");
        let m = find(&position, "f5e6");
        assert_eq!(m.flag(), MoveFlag::EnPassant);
        let next = make_move(&position, m);
        assert_eq!(next.piece_at(sq("e5")), None);
        assert_eq!(next.piece_at(sq("e6")), Some((Piece::Pawn, Color::White)));
        assert_eq!(next.halfmove_clock, 0);
    }

    #[test]
    fn en_passant_needs_a_pawn_to_capture() {
        // e6 is set but nothing stands on e5
        let position = pos("4k3/8/8/3P4/8/8/8/4K3 w - e6 7 1");
        assert!(!has_flag(&position, MoveFlag::EnPassant));
        assert!(!generate_moves(&position)
            .iter()
            .any(|m| *m == Move::from_uci("d5e6").unwrap()));

        // a knight on e5 is not a pawn that just double-pushed
        let position = pos("4k3/8/8/3Pn3/8/8/8/4K3 w - e6 0 1");
        assert!(!has_flag(&position, MoveFlag::EnPassant));
    }

    #[test]
    fn en_passant_pin_is_respected() {
        // capturing would expose the king on the fifth rank
        let position = pos("8/8/8/K2pP2r/8/8/8/7k w - d6 0 1");
        assert!(!has_flag(&position, MoveFlag::EnPassant));
    }

    #[test]
    fn promotions_enumerate_every_kind() {
        let position = pos("1n5k/P7/8/8/8/8/8/4K3 w - - 0 1");
        let moves = generate_moves(&position);
        let promos: Vec<&Move> = moves.iter().filter(|m| m.is_promotion()).collect();
        assert_eq!(promos.len(), 8);
        assert_eq!(promos.iter().filter(|m| m.is_capture()).count(), 4);

        let next = make_move(&position, find(&position, "a7b8n"));
        assert_eq!(next.piece_at(sq("b8")), Some((Piece::Knight, Color::White)));
        let queen = make_move(&position, Move::normal(sq("a7"), sq("a8")));
        assert_eq!(queen.piece_at(sq("a8")), Some((Piece::Queen, Color::White)));
    }

    #[test]
    fn castling_both_wings() {
        let position = pos("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        assert!(has_flag(&position, MoveFlag::CastleKingside));
        assert!(has_flag(&position, MoveFlag::CastleQueenside));

        let short = make_move(&position, find(&position, "e1g1"));
        assert_eq!(short.piece_at(Square::G1), Some((Piece::King, Color::White)));
        assert_eq!(short.piece_at(Square::F1), Some((Piece::Rook, Color::White)));
        assert_eq!(short.piece_at(Square::H1), None);
        assert!(!short.castling.can_castle_kingside(Color::White));
        assert!(!short.castling.can_castle_queenside(Color::White));
        assert!(short.castling.can_castle_kingside(Color::Black));

        let long = make_move(&short, find(&short, "e8c8"));
        assert_eq!(long.piece_at(Square::C8), Some((Piece::King, Color::Black)));
        assert_eq!(long.piece_at(Square::D8), Some((Piece::Rook, Color::Black)));
        assert_eq!(long.castling, crate::CastlingRights::NONE);
    }

    #[test]
    fn no_castling_through_or_out_of_check() {
        // rook on f8 covers f1
        let through = pos("5r1k/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!has_flag(&through, MoveFlag::CastleKingside));
        assert!(has_flag(&through, MoveFlag::CastleQueenside));

        // rook on e8 gives check
        let in_check = pos("4r2k/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!has_flag(&in_check, MoveFlag::CastleKingside));
        assert!(!has_flag(&in_check, MoveFlag::CastleQueenside));

        // rook on g8 covers the landing square only
        let landing = pos("6rk/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!has_flag(&landing, MoveFlag::CastleKingside));

        // b1 may be attacked on the long side
        let b_file = pos("1r5k/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(has_flag(&b_file, MoveFlag::CastleQueenside));
    }

    #[test]
    fn castling_needs_rook_and_empty_path() {
        let no_rook = pos("4k3/8/8/8/8/8/8/4K3 w KQ - 0 1");
        assert!(!has_flag(&no_rook, MoveFlag::CastleKingside));

        let blocked = pos("4k3/8/8/8/8/8/8/RN2K1NR w KQ - 0 1");
        assert!(!has_flag(&blocked, MoveFlag::CastleKingside));
        assert!(!has_flag(&blocked, MoveFlag::CastleQueenside));
    }

    #[test]
    fn capturing_a_home_rook_drops_the_right() {
        let position = pos("r3k2r/8/8/8/8/8/6b1/R3K2R b KQkq - 0 1");
        let next = make_move(&position, find(&position, "g2h1"));
        assert!(!next.castling.can_castle_kingside(Color::White));
        assert!(next.castling.can_castle_queenside(Color::White));
        assert_eq!(next.halfmove_clock, 0);
    }

    #[test]
    fn pinned_piece_stays_on_its_line() {
        let position = pos("4r2k/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(generate_moves(&position).iter().all(|m| m.from() != sq("e2")));
    }

    #[test]
    fn attack_detection() {
        let start = Position::startpos();
        assert!(is_square_attacked(&start, sq("e3"), Color::White));
        assert!(is_square_attacked(&start, sq("f6"), Color::Black));
        assert!(!is_square_attacked(&start, sq("e4"), Color::White));
        assert!(!is_king_attacked(&start, Color::White));

        let check = pos("4k3/8/8/8/8/8/8/4K2q w - - 0 1");
        assert!(is_king_attacked(&check, Color::White));
        assert!(!is_king_attacked(&pos("8/8/8/8/8/8/8/8 w - - 0 1"), Color::White));
    }

    #[test]
    fn side_not_to_move_gets_nothing() {
        let position = pos("4k3/8/8/8/8/8/8/4K3 b - - 0 1");
        assert!(generate_moves(&position).iter().all(|m| m.from() == Square::E8));
    }
}
