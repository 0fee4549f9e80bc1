//! Perft: leaf-node counts used to validate the generator against
//! published figures.

use super::{generate_moves, make_move};
use crate::Position;
use chess_core::Move;

/// Counts the leaves of the legal move tree `depth` plies deep.
pub fn perft(position: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_moves(position);
    if depth == 1 {
        return moves.len() as u64;
    }

    moves
        .iter()
        .map(|m| perft(&make_move(position, *m), depth - 1))
        .sum()
}

/// Leaf counts below each root move, in move order.
pub fn perft_divide(position: &Position, depth: u32) -> Vec<(Move, u64)> {
    let below = depth.saturating_sub(1);
    generate_moves(position)
        .iter()
        .map(|m| (*m, perft(&make_move(position, *m), below)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

    fn check(fen: &str, expected: &[u64]) {
        let position = Position::from_fen(fen).unwrap();
        for (depth, nodes) in expected.iter().enumerate() {
            assert_eq!(
                perft(&position, depth as u32 + 1),
                *nodes,
                "{} at depth {}",
                fen,
                depth + 1
            );
        }
    }

    #[test]
    fn startpos() {
        let position = Position::startpos();
        assert_eq!(perft(&position, 0), 1);
        assert_eq!(perft(&position, 1), 20);
        assert_eq!(perft(&position, 2), 400);
        assert_eq!(perft(&position, 3), 8_902);
    }

    #[test]
    fn kiwipete() {
        check(KIWIPETE, &[48, 2_039]);
    }

    #[test]
    fn position_3() {
        check(POSITION_3, &[14, 191, 2_812]);
    }

    #[test]
    fn position_4() {
        check(POSITION_4, &[6, 264, 9_467]);
    }

    #[test]
    fn position_5() {
        check(POSITION_5, &[44, 1_486]);
    }

    #[test]
    #[ignore]
    fn deep_fixtures() {
        assert_eq!(perft(&Position::startpos(), 4), 197_281);
        assert_eq!(perft(&Position::startpos(), 5), 4_865_609);
        check(KIWIPETE, &[48, 2_039, 97_862]);
        check(POSITION_3, &[14, 191, 2_812, 43_238]);
        check(POSITION_5, &[44, 1_486, 62_379]);
    }

    #[test]
    fn divide_sums_to_perft() {
        let position = Position::from_fen(KIWIPETE).unwrap();
        let divided = perft_divide(&position, 2);
        assert_eq!(divided.len(), 48);
        assert_eq!(divided.iter().map(|(_, n)| n).sum::<u64>(), 2_039);
        assert!(divided.windows(2).all(|w| w[0].0 < w[1].0));

        let shallow = perft_divide(&Position::startpos(), 1);
        assert!(shallow.iter().all(|(_, n)| *n == 1));
    }
}
