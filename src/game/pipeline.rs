//! Position Store & Move-Commit Pipeline
//!
//! Owns the authoritative position of one play surface and is the single
//! chokepoint every move passes through, whether it comes from a click, a
//! drag, the synthetic opponent, or the puzzle trainer's automatic reply.
//!
//! # Move flow
//!
//! 1. Input is validated against the [`RulesEngine`].
//! 2. The rule engine applies the move; the resulting position string is
//!    captured immediately.
//! 3. Animated moves buffer that position in a [`CommitGate`] and emit
//!    [`SurfaceEvent::Animate`]. Non-animated moves commit on the spot.
//! 4. `complete_animation()` (called by the presentation layer) makes the
//!    buffered position authoritative.
//!
//! While a commit is pending or a promotion choice is outstanding, every other
//! move attempt is rejected rather than queued.
//!
//! # Promotion sub-flow
//!
//! Click and drag paths test for a last-rank pawn move *before* delegating to
//! [`MoveCommitPipeline::make_move`], using a play-then-undo legality check so
//! that illegal "promotions" never open the picker.

use tracing::{debug, info, warn};

use crate::game::error::{GameError, GameResult};
use crate::game::events::SurfaceEvent;
use crate::game::resources::{
    detect_outcome, is_promotion_move, CommitGate, GameOutcome, MoveHistory, PromotionRequest,
    Selection,
};
use crate::game::rules::RulesEngine;
use crate::game::types::{AnimationRequest, MoveInput, MoveRecord, PieceKind, Side, Square};

/// What a buffered commit represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitKind {
    /// A real move; the buffered position is the one after it
    Move,
    /// A rejected move sliding back to its origin; the position is unchanged
    Rollback,
}

/// Payload held by the commit gate until the animation finishes
#[derive(Debug, Clone)]
pub struct Commit {
    pub kind: CommitKind,
    pub position: String,
}

/// Flags for [`MoveCommitPipeline::make_move`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOptions {
    pub animate: bool,
    /// Lets the synthetic opponent move even though it does not own the turn
    /// from the UI's point of view
    pub skip_turn_check: bool,
}

impl MoveOptions {
    pub fn animated() -> Self {
        Self {
            animate: true,
            skip_turn_check: false,
        }
    }

    pub fn instant() -> Self {
        Self {
            animate: false,
            skip_turn_check: false,
        }
    }

    pub fn on_behalf_of_opponent(mut self) -> Self {
        self.skip_turn_check = true;
        self
    }
}

impl Default for MoveOptions {
    fn default() -> Self {
        Self::animated()
    }
}

/// Outcome of a click or drag as seen by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Selected(Square),
    Deselected,
    Moved(MoveRecord),
    /// Legal move refused by the puzzle trainer; the piece is animating back
    Rejected(MoveRecord),
    PromotionRequested(PromotionRequest),
    /// Input arrived while the surface was busy, finished, or pointed at nothing
    Ignored,
}

/// Position store plus the two-phase move-commit gate
#[derive(Debug)]
pub struct MoveCommitPipeline<R: RulesEngine> {
    rules: R,
    position: String,
    start_side: Side,
    start_fullmove: u32,
    selection: Selection,
    history: MoveHistory,
    last_move: Option<(Square, Square)>,
    outcome: Option<GameOutcome>,
    gate: CommitGate<Commit>,
    promotion: Option<PromotionRequest>,
    events: Vec<SurfaceEvent>,
}

impl<R: RulesEngine> MoveCommitPipeline<R> {
    /// Wrap a rule engine, adopting whatever position it currently holds
    pub fn new(rules: R) -> Self {
        let position = rules.fen();
        let (start_side, start_fullmove) = counters_of(&position);
        Self {
            rules,
            position,
            start_side,
            start_fullmove,
            selection: Selection::default(),
            history: MoveHistory::default(),
            last_move: None,
            outcome: None,
            gate: CommitGate::default(),
            promotion: None,
            events: Vec::new(),
        }
    }

    /// Wrap a rule engine loaded with `fen`
    pub fn with_position(mut rules: R, fen: &str) -> GameResult<Self> {
        rules.load(fen)?;
        Ok(Self::new(rules))
    }

    /// Replace the position and forget everything about the previous one
    pub fn load(&mut self, fen: &str) -> GameResult<()> {
        self.rules.load(fen)?;
        self.adopt_rules_position();
        Ok(())
    }

    /// Back to the standard starting position
    pub fn reset(&mut self) {
        self.rules.reset();
        self.adopt_rules_position();
    }

    fn adopt_rules_position(&mut self) {
        self.position = self.rules.fen();
        let (side, fullmove) = counters_of(&self.position);
        self.start_side = side;
        self.start_fullmove = fullmove;
        self.selection.clear();
        self.history.clear();
        self.last_move = None;
        self.outcome = detect_outcome(&self.rules);
        self.gate.clear();
        self.promotion = None;
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Authoritative position; lags the rule engine while an animation is pending
    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn turn(&self) -> Side {
        self.rules.turn()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    /// `1. e4 e5 2. Nf3`-style text of the moves since the position was loaded
    pub fn move_list_text(&self) -> String {
        self.history
            .numbered_text(self.start_side, self.start_fullmove)
    }

    pub fn last_move(&self) -> Option<(Square, Square)> {
        self.last_move
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn pending_animation(&self) -> Option<&AnimationRequest> {
        self.gate.pending().map(|pending| &pending.animation)
    }

    pub fn is_animating(&self) -> bool {
        self.gate.is_pending()
    }

    pub fn promotion(&self) -> Option<&PromotionRequest> {
        self.promotion.as_ref()
    }

    /// A commit or a promotion choice is outstanding
    pub fn is_busy(&self) -> bool {
        self.gate.is_pending() || self.promotion.is_some()
    }

    pub(crate) fn emit(&mut self, event: SurfaceEvent) {
        self.events.push(event);
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Input contract
    // ------------------------------------------------------------------

    /// Click handling: select, deselect, or move
    ///
    /// A rejected move falls back to treating the click as a fresh selection
    /// attempt on `square`.
    pub fn select_or_move(&mut self, square: Square) -> Interaction {
        if self.is_busy() || self.is_game_over() {
            return Interaction::Ignored;
        }

        match self.selection.origin {
            None => self.select_square(square),
            Some(origin) if origin == square => {
                self.selection.clear();
                Interaction::Deselected
            }
            Some(origin) => {
                let mv = MoveInput::new(origin, square);
                if self.needs_promotion(mv) {
                    return Interaction::PromotionRequested(self.raise_promotion(mv, true));
                }
                match self.make_move(mv, MoveOptions::animated()) {
                    Ok(record) => Interaction::Moved(record),
                    Err(err) => {
                        debug!("[PIPELINE] Click move {} rejected: {}", mv, err);
                        self.selection.clear();
                        match self.select_square(square) {
                            Interaction::Ignored => Interaction::Deselected,
                            selected => selected,
                        }
                    }
                }
            }
        }
    }

    /// Drag-and-drop handling; the gesture already moved the piece, so no animation
    pub fn drag_move(&mut self, from: Square, to: Square) -> Interaction {
        if self.is_busy() || self.is_game_over() {
            return Interaction::Ignored;
        }
        let mv = MoveInput::new(from, to);
        if self.needs_promotion(mv) {
            return Interaction::PromotionRequested(self.raise_promotion(mv, false));
        }
        match self.make_move(mv, MoveOptions::instant()) {
            Ok(record) => Interaction::Moved(record),
            Err(err) => {
                debug!("[PIPELINE] Drag move {} rejected: {}", mv, err);
                self.selection.clear();
                Interaction::Ignored
            }
        }
    }

    /// Select `square` if it holds a piece of the side to move
    pub fn select_square(&mut self, square: Square) -> Interaction {
        let side = self.rules.turn();
        match self.rules.piece_at(square) {
            Some(piece) if piece.side == side => {
                let moves = self.rules.moves_from(square);
                self.selection.select(square, &moves);
                debug!(
                    "[PIPELINE] Selected {} with {} destinations",
                    square,
                    self.selection.destinations.len()
                );
                Interaction::Selected(square)
            }
            _ => Interaction::Ignored,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ------------------------------------------------------------------
    // The chokepoint
    // ------------------------------------------------------------------

    /// Validate and apply one move
    ///
    /// Fails without side effects when a commit or promotion is outstanding,
    /// the game is over, there is no piece on the origin, the piece belongs to
    /// the side not on move (unless `skip_turn_check`), a last-rank pawn move
    /// lacks a promotion piece, or the rule engine rejects the move.
    pub fn make_move(&mut self, mv: MoveInput, options: MoveOptions) -> GameResult<MoveRecord> {
        if self.gate.is_pending() {
            return Err(GameError::MoveInFlight);
        }
        if self.promotion.is_some() {
            return Err(GameError::PromotionPending);
        }
        if self.outcome.is_some() {
            return Err(GameError::GameOver);
        }

        // Captured before the engine mutates: the destination's content changes
        let piece = self
            .rules
            .piece_at(mv.from)
            .ok_or(GameError::NoPieceAt { square: mv.from })?;
        if !options.skip_turn_check && piece.side != self.rules.turn() {
            return Err(GameError::NotYourTurn { square: mv.from });
        }
        if is_promotion_move(piece, mv.to) && mv.promotion.is_none() {
            return Err(GameError::PromotionRequired {
                from: mv.from,
                to: mv.to,
            });
        }

        let record = self.rules.play(mv)?;
        let next_position = self.rules.fen();

        info!(
            "[PIPELINE] {} plays {} ({})",
            piece.side, record.san, mv
        );

        self.history.add_move(record.clone());
        self.last_move = Some((mv.from, mv.to));
        self.selection.clear();
        self.events.push(SurfaceEvent::MoveMade {
            record: record.clone(),
            position: next_position.clone(),
        });

        if options.animate {
            let animation = AnimationRequest {
                piece,
                from: mv.from,
                to: mv.to,
            };
            self.gate.begin(
                animation,
                Commit {
                    kind: CommitKind::Move,
                    position: next_position,
                },
            );
            self.events.push(SurfaceEvent::Animate(animation));
        } else {
            self.position = next_position;
        }

        if let Some(outcome) = detect_outcome(&self.rules) {
            info!("[PIPELINE] ========== GAME OVER ==========");
            info!("[PIPELINE] {}", outcome.message());
            self.outcome = Some(outcome);
            self.events.push(SurfaceEvent::GameEnded(outcome));
        }

        Ok(record)
    }

    /// Presentation layer acknowledgement of the pending animation
    ///
    /// Returns the kind of commit that was released, or `None` when nothing
    /// was pending (the call is then ignored).
    pub fn complete_animation(&mut self) -> Option<CommitKind> {
        let Some(pending) = self.gate.complete() else {
            warn!("[PIPELINE] complete_animation called with no pending commit");
            return None;
        };
        self.position = pending.payload.position;
        Some(pending.payload.kind)
    }

    // ------------------------------------------------------------------
    // Previews used by the puzzle trainer
    // ------------------------------------------------------------------

    /// SAN the move would have, without leaving it on the board
    pub fn preview_san(&mut self, mv: MoveInput) -> GameResult<String> {
        let record = self.rules.play(mv)?;
        self.rules.undo();
        Ok(record.san)
    }

    /// Play a legal-but-unwanted move, undo it, and animate the piece back home
    pub fn reject_move(&mut self, mv: MoveInput) -> GameResult<MoveRecord> {
        if self.is_busy() {
            return Err(GameError::MoveInFlight);
        }
        let record = self.rules.play(mv)?;
        self.rules.undo();
        self.selection.clear();

        let animation = AnimationRequest {
            piece: record.piece,
            from: mv.to,
            to: mv.from,
        };
        self.gate.begin(
            animation,
            Commit {
                kind: CommitKind::Rollback,
                position: self.position.clone(),
            },
        );
        self.events.push(SurfaceEvent::Animate(animation));
        Ok(record)
    }

    // ------------------------------------------------------------------
    // Promotion sub-flow
    // ------------------------------------------------------------------

    /// A legal pawn move onto the last rank that still needs a piece choice
    pub fn needs_promotion(&mut self, mv: MoveInput) -> bool {
        if mv.promotion.is_some() {
            return false;
        }
        let Some(piece) = self.rules.piece_at(mv.from) else {
            return false;
        };
        if !is_promotion_move(piece, mv.to) {
            return false;
        }
        // Placeholder piece only checks legality; the trial move is rolled back
        match self.rules.play(mv.with_promotion(Some(PieceKind::Queen))) {
            Ok(_) => {
                self.rules.undo();
                true
            }
            Err(_) => false,
        }
    }

    pub(crate) fn raise_promotion(&mut self, mv: MoveInput, animate: bool) -> PromotionRequest {
        let request = PromotionRequest {
            from: mv.from,
            to: mv.to,
            side: self.rules.turn(),
            animate,
        };
        info!(
            "[PROMOTION] Pawn {}{} needs a promotion piece",
            request.from, request.to
        );
        self.selection.clear();
        self.promotion = Some(request);
        self.events.push(SurfaceEvent::PromotionRequested(request));
        request
    }

    /// Finish the outstanding promotion with `kind`
    ///
    /// On failure the request stays open.
    pub fn resolve_promotion(&mut self, kind: PieceKind) -> GameResult<MoveRecord> {
        let request = self.take_promotion()?;
        let options = if request.animate {
            MoveOptions::animated()
        } else {
            MoveOptions::instant()
        };
        let mv = MoveInput::new(request.from, request.to).with_promotion(Some(kind));
        self.make_move(mv, options).inspect_err(|_| {
            self.promotion = Some(request);
        })
    }

    /// Remove the outstanding request so a wrapper can run its own checks
    pub(crate) fn take_promotion(&mut self) -> GameResult<PromotionRequest> {
        self.promotion.take().ok_or(GameError::NoPromotionPending)
    }

    pub(crate) fn restore_promotion(&mut self, request: PromotionRequest) {
        self.promotion = Some(request);
    }

    /// Close the picker without moving; the pawn stays where it was
    pub fn cancel_promotion(&mut self) -> bool {
        if self.promotion.take().is_some() {
            info!("[PROMOTION] Promotion cancelled");
            self.events.push(SurfaceEvent::PromotionCancelled);
            true
        } else {
            false
        }
    }
}

/// Side to move and fullmove number of a position string
fn counters_of(fen: &str) -> (Side, u32) {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    let side = fields
        .get(1)
        .and_then(|s| s.chars().next())
        .and_then(Side::from_code)
        .unwrap_or(Side::White);
    let fullmove = fields
        .get(5)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);
    (side, fullmove)
}

#[cfg(test)]
mod tests;
