//! Game termination: terminal positions, draw rules and external endings.

use chess_engine::{
    DrawPolicy, Game, GameConfig, GameError, GameResult, Method, PushOptions, Termination,
};
use chess_core::Color;

fn play(game: &mut Game, moves: &str) {
    for san in moves.split_whitespace() {
        game.push_move(san, PushOptions::default())
            .unwrap_or_else(|e| panic!("{san}: {e}"));
    }
}

const KNIGHT_SHUFFLE: &str = "Nf3 Nf6 Ng1 Ng8";

#[test]
fn fools_mate() {
    let mut game = Game::new();
    play(&mut game, "f3 e5 g4 Qh4#");
    assert!(game.is_check());
    assert_eq!(game.outcome(), GameResult::BlackWins);
    assert_eq!(game.method(), Method::Checkmate);
    assert!(game.legal_moves().is_empty());
    assert!(game.to_string().ends_with("2. g4 Qh4# 0-1"));
}

#[test]
fn fastest_stalemate() {
    let mut game = Game::new();
    play(
        &mut game,
        "e3 a5 Qh5 Ra6 Qxa5 h5 h4 Rah6 Qxc7 f6 Qxd7+ Kf7 Qxb7 Qd3 Qxb8 Qh7 Qxc8 Kg6 Qe6",
    );
    assert_eq!(game.outcome(), GameResult::Draw);
    assert_eq!(game.method(), Method::Stalemate);
    assert!(!game.is_check());
}

#[test]
fn capture_down_to_bare_kings() {
    let mut game = Game::from_fen("4k3/8/8/8/8/8/3r4/4K3 w - - 0 1").unwrap();
    assert_eq!(game.outcome(), GameResult::InProgress);
    play(&mut game, "Kxd2");
    assert_eq!(game.outcome(), GameResult::Draw);
    assert_eq!(game.method(), Method::InsufficientMaterial);
}

#[test]
fn threefold_is_claimable_by_default() {
    let mut game = Game::new();
    play(&mut game, KNIGHT_SHUFFLE);
    assert_eq!(game.repetition_count(), 2);
    assert!(game.eligible_draws().is_empty());

    play(&mut game, KNIGHT_SHUFFLE);
    assert_eq!(game.repetition_count(), 3);
    assert_eq!(game.outcome(), GameResult::InProgress);
    assert_eq!(game.eligible_draws(), vec![Method::ThreefoldRepetition]);

    // play continues until a claim
    play(&mut game, "e4");
    assert!(game.eligible_draws().is_empty());
    game.go_back();
    game.claim_draw(Method::ThreefoldRepetition).unwrap();
    assert_eq!(game.outcome(), GameResult::Draw);
    assert_eq!(
        game.termination(),
        Some(Termination::DrawClaim(Method::ThreefoldRepetition))
    );
}

#[test]
fn threefold_ends_the_game_under_automatic_policy() {
    let config = GameConfig {
        draw_policy: DrawPolicy::Automatic,
        ..GameConfig::default()
    };
    let mut game = Game::new().with_config(config);
    play(&mut game, KNIGHT_SHUFFLE);
    play(&mut game, KNIGHT_SHUFFLE);
    assert_eq!(game.outcome(), GameResult::Draw);
    assert_eq!(game.method(), Method::ThreefoldRepetition);
    assert_eq!(
        game.push_move("e4", PushOptions::default()),
        Err(GameError::GameAlreadyOver)
    );
}

#[test]
fn fivefold_is_forced() {
    let mut game = Game::new();
    for _ in 0..3 {
        play(&mut game, KNIGHT_SHUFFLE);
    }
    assert_eq!(game.outcome(), GameResult::InProgress);
    play(&mut game, KNIGHT_SHUFFLE);
    assert_eq!(game.repetition_count(), 5);
    assert_eq!(game.outcome(), GameResult::Draw);
    assert_eq!(game.method(), Method::FivefoldRepetition);

    let lenient = GameConfig {
        automatic_draws: false,
        ..GameConfig::default()
    };
    game.set_config(lenient);
    assert_eq!(game.outcome(), GameResult::InProgress);
    assert_eq!(game.eligible_draws(), vec![Method::ThreefoldRepetition]);
}

#[test]
fn fifty_and_seventy_five_move_rules() {
    let mut game = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 99 70").unwrap();
    assert!(game.eligible_draws().is_empty());
    play(&mut game, "Ra2");
    assert_eq!(game.eligible_draws(), vec![Method::FiftyMoveRule]);
    assert_eq!(game.outcome(), GameResult::InProgress);

    let mut game = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 149 90").unwrap();
    play(&mut game, "Ra2");
    assert_eq!(game.outcome(), GameResult::Draw);
    assert_eq!(game.method(), Method::SeventyFiveMoveRule);

    // a pawn move resets the clock
    let mut game = Game::from_fen("4k3/8/8/8/8/8/P7/4K3 w - - 149 90").unwrap();
    play(&mut game, "a3");
    assert_eq!(game.position().halfmove_clock, 0);
    assert_eq!(game.outcome(), GameResult::InProgress);
}

#[test]
fn resignation_and_agreement() {
    let mut game = Game::new();
    play(&mut game, "e4 e5");
    game.resign(Color::White).unwrap();
    assert_eq!(game.outcome(), GameResult::BlackWins);
    assert_eq!(game.method(), Method::Resignation);
    assert_eq!(game.resign(Color::Black), Err(GameError::GameAlreadyOver));
    game.go_to_start();
    assert_eq!(game.outcome(), GameResult::BlackWins);

    let mut game = Game::new();
    game.agree_draw().unwrap();
    assert_eq!(game.outcome(), GameResult::Draw);
    assert_eq!(game.method(), Method::DrawAgreement);
    assert_eq!(game.to_string(), "1/2-1/2");
}

#[test]
fn terminal_start_position() {
    let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(game.method(), Method::Stalemate);
    let game = Game::from_fen("8/8/8/8/8/8/8/4K2k w - - 0 1").unwrap();
    assert_eq!(game.method(), Method::InsufficientMaterial);
}
