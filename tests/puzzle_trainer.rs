//! Integration tests for the puzzle trainer
//!
//! Puzzles are parsed from the same JSON shape the binary reads from disk and
//! played through the trainer's public input contract, acknowledging every
//! animation the way a presentation layer would.

use chess_practice::game::rules::STARTING_FEN;
use chess_practice::game::{CommitKind, Interaction, SurfaceEvent};
use chess_practice::puzzle::{
    parse_puzzles, FirstMove, PuzzleCategory, PuzzleConfig, PuzzleStatus, PuzzleTrainer,
};
use chess_practice::{PieceKind, ShakmatyRules, Side, Square};
use std::time::Duration;

const PUZZLES: &str = r#"[
    {"id": "open", "position": "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
     "solutionMoves": "e2e4 e7e5", "rating": 600, "tags": "opening short"},
    {"id": "backrank", "position": "6k1/5ppp/8/8/8/8/8/R5K1 w - -",
     "solutionMoves": "a1a8", "rating": 900, "tags": "mateIn1 backRankMate oneMove"},
    {"id": "promote", "fen": "8/P6k/8/8/8/8/8/K7 w - - 0 1",
     "solutionMoves": "a7a8q h7g6", "rating": 1100, "tags": "endgame pawnEndgame"},
    {"id": "defend", "position": "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
     "solutionMoves": "e2e4 e7e5 g1f3", "rating": 800, "tags": "opening", "playerSide": "b"}
]"#;

fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

fn trainer() -> PuzzleTrainer<ShakmatyRules> {
    let puzzles = parse_puzzles(PUZZLES).unwrap();
    PuzzleTrainer::new(ShakmatyRules::new(), puzzles, PuzzleConfig::default())
}

fn click(trainer: &mut PuzzleTrainer<ShakmatyRules>, from: &str, to: &str) -> Interaction {
    trainer.select_or_move(sq(from));
    trainer.select_or_move(sq(to))
}

// ============================================================================
// Verification
// ============================================================================

#[test]
fn test_correct_line_solves_puzzle() {
    //! Player move, delayed automatic reply, then Solved

    let mut trainer = trainer();
    assert_eq!(trainer.current().map(|p| p.id.as_str()), Some("open"));
    assert_eq!(trainer.session().unwrap().cursor(), 0);

    assert!(matches!(click(&mut trainer, "e2", "e4"), Interaction::Moved(_)));
    assert_eq!(trainer.status(), Some(PuzzleStatus::Solving));

    trainer.complete_animation();
    assert_eq!(trainer.status(), Some(PuzzleStatus::Ready));
    assert_eq!(trainer.session().unwrap().cursor(), 1);

    // Reply waits for the full delay
    trainer.update(Duration::from_millis(250));
    assert_eq!(trainer.session().unwrap().cursor(), 1);
    trainer.update(Duration::from_millis(250));
    assert_eq!(trainer.session().unwrap().cursor(), 2);

    assert_eq!(trainer.complete_animation(), Some(CommitKind::Move));
    assert_eq!(trainer.status(), Some(PuzzleStatus::Solved));
    assert!(trainer.is_solved("open"));
    assert_eq!(trainer.solved_count(), 1);

    // A solved puzzle takes no more moves
    assert_eq!(trainer.select_or_move(sq("g1")), Interaction::Ignored);
}

#[test]
fn test_wrong_move_animates_back() {
    //! A legal move off the solution line is undone and the attempt continues

    let mut trainer = trainer();

    let Interaction::Rejected(record) = trainer.drag_move(sq("d2"), sq("d4")) else {
        panic!("expected the move to be rejected");
    };
    assert_eq!(record.san, "d4");
    assert_eq!(trainer.status(), Some(PuzzleStatus::Failed));

    let events = trainer.drain_events();
    assert!(events.iter().any(|event| matches!(
        event,
        SurfaceEvent::Animate(anim) if anim.from == sq("d4") && anim.to == sq("d2")
    )));

    // No input while the piece slides home
    assert_eq!(trainer.drag_move(sq("e2"), sq("e4")), Interaction::Ignored);

    assert_eq!(trainer.complete_animation(), Some(CommitKind::Rollback));
    let session = trainer.session().unwrap();
    assert_eq!(session.status(), PuzzleStatus::Ready);
    assert_eq!(session.cursor(), 0);
    assert_eq!(session.pipeline().position(), STARTING_FEN);
    assert!(session.pipeline().history().is_empty());

    // Second try on the right move still works
    assert!(matches!(
        trainer.drag_move(sq("e2"), sq("e4")),
        Interaction::Moved(_)
    ));
    assert_eq!(trainer.status(), Some(PuzzleStatus::Ready));
}

#[test]
fn test_illegal_move_is_not_a_failure() {
    //! Moves the rule engine refuses never reach verification

    let mut trainer = trainer();
    assert_eq!(trainer.drag_move(sq("e2"), sq("e5")), Interaction::Ignored);
    assert_eq!(trainer.status(), Some(PuzzleStatus::Ready));
}

#[test]
fn test_single_move_mate_solves_without_reply() {
    let mut trainer = trainer();
    trainer.next();
    assert_eq!(trainer.current().map(|p| p.id.as_str()), Some("backrank"));

    assert!(matches!(trainer.drag_move(sq("a1"), sq("a8")), Interaction::Moved(_)));
    assert_eq!(trainer.status(), Some(PuzzleStatus::Solved));
    assert!(trainer.is_solved("backrank"));
    assert!(trainer.session().unwrap().pipeline().is_game_over());
}

#[test]
fn test_promotion_inside_puzzle() {
    //! The piece choice is part of the verified move

    let mut trainer = trainer();
    assert!(trainer.select(2));

    assert!(matches!(
        click(&mut trainer, "a7", "a8"),
        Interaction::PromotionRequested(_)
    ));

    // Under-promotion does not match `a8=Q`
    assert!(matches!(
        trainer.choose_promotion(PieceKind::Rook),
        Ok(Interaction::Rejected(_))
    ));
    trainer.complete_animation();
    assert_eq!(trainer.status(), Some(PuzzleStatus::Ready));

    click(&mut trainer, "a7", "a8");
    assert!(matches!(
        trainer.choose_promotion(PieceKind::Queen),
        Ok(Interaction::Moved(_))
    ));
    trainer.complete_animation();
    trainer.update(Duration::from_millis(500));
    trainer.complete_animation();
    assert_eq!(trainer.status(), Some(PuzzleStatus::Solved));
}

#[test]
fn test_setup_move_hands_turn_to_player() {
    //! A puzzle that names the other side plays the first move for the opponent

    let mut trainer = trainer();
    assert!(trainer.select(3));

    let session = trainer.session().unwrap();
    assert_eq!(session.player_side(), Side::Black);
    assert_eq!(session.cursor(), 1);
    assert_eq!(session.pipeline().turn(), Side::Black);

    assert!(matches!(
        trainer.drag_move(sq("e7"), sq("e5")),
        Interaction::Moved(_)
    ));
    trainer.update(Duration::from_millis(500));
    trainer.complete_animation();
    assert_eq!(trainer.status(), Some(PuzzleStatus::Solved));
}

#[test]
fn test_opponent_first_convention_plays_setup_move() {
    //! Without `playerSide` the trainer setting decides who moves first

    let puzzles = parse_puzzles(PUZZLES).unwrap();
    let config = PuzzleConfig {
        first_move: FirstMove::Opponent,
        ..PuzzleConfig::default()
    };
    let mut trainer = PuzzleTrainer::new(ShakmatyRules::new(), puzzles, config);

    let session = trainer.session().unwrap();
    assert_eq!(session.record().player_side, None);
    assert_eq!(session.player_side(), Side::Black);
    assert_eq!(session.cursor(), 1);
    assert_eq!(session.pipeline().last_move(), Some((sq("e2"), sq("e4"))));

    assert!(matches!(
        trainer.drag_move(sq("e7"), sq("e5")),
        Interaction::Moved(_)
    ));
    trainer.complete_animation();
    assert_eq!(trainer.status(), Some(PuzzleStatus::Solved));

    // An explicit side still wins over the setting
    assert!(trainer.select(3));
    assert_eq!(trainer.session().unwrap().player_side(), Side::Black);
    assert_eq!(trainer.session().unwrap().cursor(), 1);
}

// ============================================================================
// Hints
// ============================================================================

#[test]
fn test_hint_escalates_then_clears_on_correct_move() {
    let mut trainer = trainer();

    let first = trainer.request_hint().unwrap();
    assert_eq!(first.level, 1);
    assert_eq!(first.origin, sq("e2"));
    assert_eq!(first.arrow, None);

    let second = trainer.request_hint().unwrap();
    assert_eq!(second.level, 2);
    assert_eq!(second.arrow, Some((sq("e2"), sq("e4"))));

    trainer.drain_events();
    trainer.drag_move(sq("e2"), sq("e4"));
    assert_eq!(trainer.session().unwrap().hint(), None);
    assert!(trainer
        .drain_events()
        .contains(&SurfaceEvent::HintChanged(None)));
}

// ============================================================================
// Navigation and filtering
// ============================================================================

#[test]
fn test_navigation_wraps_and_reloads() {
    let mut trainer = trainer();
    assert_eq!(trainer.len(), 4);

    trainer.previous();
    assert_eq!(trainer.index(), 3);
    trainer.next();
    assert_eq!(trainer.index(), 0);
    assert!(!trainer.select(4));
}

#[test]
fn test_restart_drops_scheduled_reply() {
    //! The reply from the abandoned attempt must not land on the fresh board

    let mut trainer = trainer();
    trainer.drag_move(sq("e2"), sq("e4"));
    assert!(trainer.session().unwrap().is_reply_scheduled());

    trainer.restart();
    trainer.update(Duration::from_secs(1));

    let session = trainer.session().unwrap();
    assert_eq!(session.cursor(), 0);
    assert_eq!(session.pipeline().position(), STARTING_FEN);
    assert_eq!(session.status(), PuzzleStatus::Ready);
}

#[test]
fn test_filter_selects_matching_puzzles() {
    let mut trainer = trainer();

    trainer.set_filter("mate");
    assert_eq!(trainer.category(), PuzzleCategory::Mate);
    assert_eq!(trainer.len(), 1);
    assert_eq!(trainer.current().map(|p| p.id.as_str()), Some("backrank"));

    trainer.set_category(PuzzleCategory::Opening);
    assert_eq!(trainer.len(), 2);

    trainer.set_category(PuzzleCategory::Fork);
    assert!(trainer.is_empty());
    assert!(trainer.current().is_none());
    assert_eq!(trainer.drag_move(sq("e2"), sq("e4")), Interaction::Ignored);

    // Unknown keys show everything
    trainer.set_filter("nonsense");
    assert_eq!(trainer.category(), PuzzleCategory::All);
    assert_eq!(trainer.len(), trainer.total());
}

#[test]
fn test_solved_set_survives_navigation() {
    let mut trainer = trainer();
    trainer.select(1);
    trainer.drag_move(sq("a1"), sq("a8"));
    assert!(trainer.is_solved("backrank"));

    trainer.set_category(PuzzleCategory::Opening);
    trainer.next();
    assert!(trainer.is_solved("backrank"));

    trainer.clear_solved();
    assert_eq!(trainer.solved_count(), 0);
}
