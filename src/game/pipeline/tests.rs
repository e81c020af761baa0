//! Move-commit pipeline tests
//!
//! # Test Organization
//!
//! - `test_commit_*` - two-phase commit and the authoritative position
//! - `test_guard_*` - rejection rules of `make_move`
//! - `test_click_*` / `test_drag_*` - input contract
//! - `test_promotion_*` - promotion sub-flow
//! - `test_rollback_*` - puzzle-style rejected move animation

use super::*;
use crate::game::rules::{ShakmatyRules, STARTING_FEN};
use crate::game::types::Piece;

fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

fn mv(text: &str) -> MoveInput {
    text.parse().unwrap()
}

fn start() -> MoveCommitPipeline<ShakmatyRules> {
    MoveCommitPipeline::new(ShakmatyRules::new())
}

fn promotion_board() -> MoveCommitPipeline<ShakmatyRules> {
    MoveCommitPipeline::with_position(ShakmatyRules::new(), "8/4P3/8/8/8/8/k7/4K3 w - - 0 1")
        .unwrap()
}

// ============================================================================
// Two-phase commit
// ============================================================================

#[test]
fn test_commit_waits_for_animation() {
    let mut pipeline = start();
    let record = pipeline.make_move(mv("e2e4"), MoveOptions::animated()).unwrap();
    assert_eq!(record.san, "e4");

    // Pending: authoritative position still the old one
    assert!(pipeline.is_animating());
    assert_eq!(pipeline.position(), STARTING_FEN);
    assert_eq!(
        pipeline.pending_animation().map(|a| (a.from, a.to)),
        Some((sq("e2"), sq("e4")))
    );

    assert_eq!(pipeline.complete_animation(), Some(CommitKind::Move));
    assert!(!pipeline.is_animating());
    assert_eq!(pipeline.turn(), Side::Black);
    assert_eq!(pipeline.position().split(' ').nth(1), Some("b"));
    assert_eq!(pipeline.history().san_list(), vec!["e4"]);
    assert_eq!(pipeline.last_move(), Some((sq("e2"), sq("e4"))));
}

#[test]
fn test_commit_instant_updates_position_immediately() {
    let mut pipeline = start();
    pipeline.make_move(mv("g1f3"), MoveOptions::instant()).unwrap();
    assert!(!pipeline.is_animating());
    assert_eq!(pipeline.position(), pipeline.rules().fen());
}

#[test]
fn test_commit_complete_without_pending_is_ignored() {
    let mut pipeline = start();
    assert_eq!(pipeline.complete_animation(), None);
    assert_eq!(pipeline.position(), STARTING_FEN);
}

#[test]
fn test_commit_emits_move_and_animation_events() {
    let mut pipeline = start();
    pipeline.make_move(mv("e2e4"), MoveOptions::animated()).unwrap();
    let events = pipeline.drain_events();
    assert!(matches!(&events[0], SurfaceEvent::MoveMade { record, .. } if record.san == "e4"));
    assert!(matches!(events[1], SurfaceEvent::Animate(_)));
    assert!(pipeline.drain_events().is_empty());
}

#[test]
fn test_commit_move_list_text() {
    let mut pipeline = start();
    for m in ["e2e4", "e7e5", "g1f3"] {
        pipeline.make_move(mv(m), MoveOptions::instant()).unwrap();
    }
    assert_eq!(pipeline.move_list_text(), "1. e4 e5 2. Nf3");
}

// ============================================================================
// make_move guards
// ============================================================================

#[test]
fn test_guard_single_flight() {
    let mut pipeline = start();
    pipeline.make_move(mv("e2e4"), MoveOptions::animated()).unwrap();
    let err = pipeline
        .make_move(mv("e7e5"), MoveOptions::animated())
        .unwrap_err();
    assert_eq!(err, GameError::MoveInFlight);
    assert_eq!(pipeline.history().len(), 1);
}

#[test]
fn test_guard_empty_square_and_wrong_side() {
    let mut pipeline = start();
    assert_eq!(
        pipeline.make_move(mv("e4e5"), MoveOptions::instant()),
        Err(GameError::NoPieceAt { square: sq("e4") })
    );
    assert_eq!(
        pipeline.make_move(mv("e7e5"), MoveOptions::instant()),
        Err(GameError::NotYourTurn { square: sq("e7") })
    );
}

#[test]
fn test_guard_illegal_move_changes_nothing() {
    let mut pipeline = start();
    let err = pipeline
        .make_move(mv("e2e5"), MoveOptions::instant())
        .unwrap_err();
    assert!(matches!(err, GameError::IllegalMove { .. }));
    assert_eq!(pipeline.position(), STARTING_FEN);
    assert!(pipeline.history().is_empty());
    assert!(pipeline.drain_events().is_empty());
}

#[test]
fn test_guard_game_over_blocks_moves() {
    let mut pipeline = start();
    for m in ["f2f3", "e7e5", "g2g4", "d8h4"] {
        pipeline.make_move(mv(m), MoveOptions::instant()).unwrap();
    }
    assert_eq!(
        pipeline.outcome(),
        Some(GameOutcome::Checkmate {
            winner: Side::Black
        })
    );
    assert!(pipeline
        .drain_events()
        .iter()
        .any(|e| matches!(e, SurfaceEvent::GameEnded(_))));
    assert_eq!(
        pipeline.make_move(mv("a2a3"), MoveOptions::instant()),
        Err(GameError::GameOver)
    );
}

#[test]
fn test_guard_promotion_requires_piece() {
    let mut pipeline = promotion_board();
    assert_eq!(
        pipeline.make_move(mv("e7e8"), MoveOptions::instant()),
        Err(GameError::PromotionRequired {
            from: sq("e7"),
            to: sq("e8")
        })
    );
}

// ============================================================================
// Click and drag
// ============================================================================

#[test]
fn test_click_select_then_move() {
    let mut pipeline = start();
    assert_eq!(pipeline.select_or_move(sq("e2")), Interaction::Selected(sq("e2")));
    assert!(pipeline.selection().can_reach(sq("e4")));

    match pipeline.select_or_move(sq("e4")) {
        Interaction::Moved(record) => assert_eq!(record.san, "e4"),
        other => panic!("expected a move, got {other:?}"),
    }
    assert!(!pipeline.selection().is_selected());
}

#[test]
fn test_click_same_square_deselects() {
    let mut pipeline = start();
    pipeline.select_or_move(sq("g1"));
    assert_eq!(pipeline.select_or_move(sq("g1")), Interaction::Deselected);
    assert!(!pipeline.selection().is_selected());
}

#[test]
fn test_click_other_own_piece_reselects() {
    let mut pipeline = start();
    pipeline.select_or_move(sq("e2"));
    assert_eq!(pipeline.select_or_move(sq("g1")), Interaction::Selected(sq("g1")));
    assert_eq!(pipeline.selection().origin, Some(sq("g1")));
}

#[test]
fn test_click_ignored_while_animating() {
    let mut pipeline = start();
    pipeline.make_move(mv("e2e4"), MoveOptions::animated()).unwrap();
    assert_eq!(pipeline.select_or_move(sq("e7")), Interaction::Ignored);
}

#[test]
fn test_click_opponent_piece_is_ignored() {
    let mut pipeline = start();
    assert_eq!(pipeline.select_or_move(sq("e7")), Interaction::Ignored);
}

#[test]
fn test_drag_commits_without_animation() {
    let mut pipeline = start();
    assert!(matches!(
        pipeline.drag_move(sq("d2"), sq("d4")),
        Interaction::Moved(_)
    ));
    assert!(!pipeline.is_animating());
    assert_eq!(pipeline.turn(), Side::Black);
}

// ============================================================================
// Promotion
// ============================================================================

#[test]
fn test_promotion_click_opens_picker() {
    let mut pipeline = promotion_board();
    pipeline.select_or_move(sq("e7"));
    let interaction = pipeline.select_or_move(sq("e8"));
    assert!(matches!(interaction, Interaction::PromotionRequested(_)));
    assert!(pipeline.is_busy());
    assert!(pipeline.history().is_empty());

    // Preview left the board as it was
    assert_eq!(pipeline.position(), pipeline.rules().fen());

    // Any other move attempt is refused while the picker is open
    assert_eq!(
        pipeline.make_move(mv("e1d1"), MoveOptions::instant()),
        Err(GameError::PromotionPending)
    );

    let record = pipeline.resolve_promotion(PieceKind::Knight).unwrap();
    assert_eq!(record.promotion, Some(PieceKind::Knight));
    assert!(pipeline.is_animating());
    pipeline.complete_animation();
    assert_eq!(
        pipeline.rules().piece_at(sq("e8")),
        Some(Piece::new(PieceKind::Knight, Side::White))
    );
}

#[test]
fn test_promotion_drag_resolves_without_animation() {
    let mut pipeline = promotion_board();
    assert!(matches!(
        pipeline.drag_move(sq("e7"), sq("e8")),
        Interaction::PromotionRequested(PromotionRequest { animate: false, .. })
    ));
    pipeline.resolve_promotion(PieceKind::Queen).unwrap();
    assert!(!pipeline.is_animating());
    assert_eq!(pipeline.turn(), Side::Black);
}

#[test]
fn test_promotion_cancel_leaves_pawn() {
    let mut pipeline = promotion_board();
    pipeline.drag_move(sq("e7"), sq("e8"));
    assert!(pipeline.cancel_promotion());
    assert!(!pipeline.is_busy());
    assert_eq!(
        pipeline.rules().piece_at(sq("e7")),
        Some(Piece::new(PieceKind::Pawn, Side::White))
    );
    assert!(!pipeline.cancel_promotion());
}

#[test]
fn test_promotion_resolve_without_request() {
    let mut pipeline = start();
    assert_eq!(
        pipeline.resolve_promotion(PieceKind::Queen),
        Err(GameError::NoPromotionPending)
    );
}

#[test]
fn test_promotion_blocked_pawn_never_opens_picker() {
    let mut pipeline =
        MoveCommitPipeline::with_position(ShakmatyRules::new(), "4n3/4P3/8/8/8/8/k7/4K3 w - - 0 1")
            .unwrap();
    assert!(!pipeline.needs_promotion(mv("e7e8")));
    assert_eq!(pipeline.drag_move(sq("e7"), sq("e8")), Interaction::Ignored);
    assert!(pipeline.promotion().is_none());
}

// ============================================================================
// Rollback
// ============================================================================

#[test]
fn test_rollback_animates_back_without_changing_position() {
    let mut pipeline = start();
    let record = pipeline.reject_move(mv("d2d4")).unwrap();
    assert_eq!(record.san, "d4");
    assert_eq!(
        pipeline.pending_animation().map(|a| (a.from, a.to)),
        Some((sq("d4"), sq("d2")))
    );
    assert_eq!(pipeline.complete_animation(), Some(CommitKind::Rollback));
    assert_eq!(pipeline.position(), STARTING_FEN);
    assert_eq!(pipeline.rules().fen(), STARTING_FEN);
    assert!(pipeline.history().is_empty());
}

#[test]
fn test_preview_san_leaves_board() {
    let mut pipeline = start();
    assert_eq!(pipeline.preview_san(mv("b1c3")).unwrap(), "Nc3");
    assert_eq!(pipeline.rules().fen(), STARTING_FEN);
}
