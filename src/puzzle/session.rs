//! Puzzle Verification State Machine
//!
//! One [`PuzzleSession`] wraps a move-commit pipeline loaded with a puzzle's
//! starting position and checks every player move against the stored
//! solution.
//!
//! # Status transitions
//!
//! ```text
//! Ready --correct move--> Solving --animation done--> Ready (reply scheduled) | Solved
//! Ready --legal but wrong--> Failed --rollback animation done--> Ready
//! Ready (reply timer fires) --> Solving --animation done--> Ready | Solved
//! ```
//!
//! # Solution encoding
//!
//! The source lists coordinate moves (`e2e4`). On load they are replayed on a
//! scratch copy of the rule engine and stored as SAN, which is what player
//! moves are compared against. A move that fails to parse or replay truncates
//! the solution at that point.
//!
//! # Hints
//!
//! `request_hint` escalates 0 → 1 (origin square) → 2 (origin plus arrow) and
//! stays at 2. Any correct move clears the hint.

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::data::{FirstMove, PuzzleError, PuzzleRecord, PuzzleResult};
use crate::game::error::{GameError, GameResult};
use crate::game::events::SurfaceEvent;
use crate::game::pipeline::{CommitKind, Interaction, MoveCommitPipeline, MoveOptions};
use crate::game::resources::DelayTimer;
use crate::game::rules::RulesEngine;
use crate::game::types::{MoveInput, PieceKind, Side, Square};

/// Where the player stands in the current puzzle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PuzzleStatus {
    Ready,
    Solving,
    Solved,
    Failed,
}

impl PuzzleStatus {
    pub fn label(self) -> &'static str {
        match self {
            PuzzleStatus::Ready => "Your move",
            PuzzleStatus::Solving => "Correct!",
            PuzzleStatus::Solved => "Puzzle solved",
            PuzzleStatus::Failed => "Not the best move, try again",
        }
    }
}

impl fmt::Display for PuzzleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Hint overlay for the next solution move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hint {
    /// 1 = origin highlight, 2 = origin plus arrow
    pub level: u8,
    pub origin: Square,
    pub arrow: Option<(Square, Square)>,
}

pub const MAX_HINT_LEVEL: u8 = 2;

#[derive(Debug, Clone)]
struct ScheduledReply {
    timer: DelayTimer,
    generation: u64,
}

/// A single puzzle being attempted
#[derive(Debug)]
pub struct PuzzleSession<R: RulesEngine> {
    record: PuzzleRecord,
    pipeline: MoveCommitPipeline<R>,
    solution: Vec<String>,
    cursor: usize,
    status: PuzzleStatus,
    hint: Option<Hint>,
    player_side: Side,
    first_move: FirstMove,
    reply_delay: Duration,
    reply: Option<ScheduledReply>,
    generation: u64,
}

impl<R: RulesEngine> PuzzleSession<R> {
    /// Load `record` into `rules` and play the setup move if there is one
    pub fn load(rules: R, record: PuzzleRecord, reply_delay: Duration) -> PuzzleResult<Self> {
        Self::load_with(rules, record, reply_delay, FirstMove::Player)
    }

    /// Like [`load`](Self::load), with `first_move` deciding the solver's side
    /// when the record has no `playerSide`
    pub fn load_with(
        rules: R,
        record: PuzzleRecord,
        reply_delay: Duration,
        first_move: FirstMove,
    ) -> PuzzleResult<Self> {
        let player_side = rules.turn();
        let mut session = Self {
            record,
            pipeline: MoveCommitPipeline::new(rules),
            solution: Vec::new(),
            cursor: 0,
            status: PuzzleStatus::Ready,
            hint: None,
            player_side,
            first_move,
            reply_delay,
            reply: None,
            generation: 0,
        };
        session.start()?;
        Ok(session)
    }

    fn start(&mut self) -> PuzzleResult<()> {
        self.generation = self.generation.wrapping_add(1);
        self.reply = None;
        self.hint = None;
        self.cursor = 0;

        self.pipeline
            .load(&self.record.position)
            .map_err(|source| PuzzleError::InvalidPosition {
                id: self.record.id.clone(),
                source,
            })?;
        self.solution = parse_solution(self.pipeline.rules(), &self.record);

        let side_to_move = self.pipeline.turn();
        self.player_side = self
            .record
            .player_side
            .unwrap_or_else(|| self.first_move.player_side(side_to_move));
        if self.player_side != side_to_move && !self.solution.is_empty() {
            self.play_setup_move();
        }

        info!(
            "[PUZZLE] Loaded {} (rating {}, {} solution moves, player {})",
            self.record.id,
            self.record.rating,
            self.solution.len(),
            self.player_side
        );
        self.pipeline.emit(SurfaceEvent::PuzzleLoaded {
            id: self.record.id.clone(),
            rating: self.record.rating,
        });

        self.status = if !self.solution.is_empty() && self.cursor >= self.solution.len() {
            PuzzleStatus::Solved
        } else {
            PuzzleStatus::Ready
        };
        self.pipeline
            .emit(SurfaceEvent::PuzzleStatusChanged(self.status));
        Ok(())
    }

    /// Opponent move that precedes the player's first move
    fn play_setup_move(&mut self) {
        let setup = &self.solution[0];
        let Some(mv) = self.pipeline.rules().resolve_notation(setup) else {
            warn!("[PUZZLE] {}: setup move {} did not resolve", self.record.id, setup);
            self.solution.clear();
            return;
        };
        match self
            .pipeline
            .make_move(mv, MoveOptions::instant().on_behalf_of_opponent())
        {
            Ok(record) => {
                debug!("[PUZZLE] Setup move {}", record.san);
                self.cursor = 1;
            }
            Err(e) => {
                warn!("[PUZZLE] {}: setup move failed: {}", self.record.id, e);
                self.solution.clear();
            }
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn record(&self) -> &PuzzleRecord {
        &self.record
    }

    pub fn status(&self) -> PuzzleStatus {
        self.status
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Solution in SAN, possibly truncated at the first bad move
    pub fn solution(&self) -> &[String] {
        &self.solution
    }

    pub fn hint(&self) -> Option<Hint> {
        self.hint
    }

    pub fn hint_level(&self) -> u8 {
        self.hint.map_or(0, |hint| hint.level)
    }

    pub fn player_side(&self) -> Side {
        self.player_side
    }

    pub fn is_reply_scheduled(&self) -> bool {
        self.reply.is_some()
    }

    pub fn pipeline(&self) -> &MoveCommitPipeline<R> {
        &self.pipeline
    }

    pub fn drain_events(&mut self) -> Vec<SurfaceEvent> {
        self.pipeline.drain_events()
    }

    fn accepts_input(&self) -> bool {
        self.status == PuzzleStatus::Ready
            && self.reply.is_none()
            && !self.pipeline.is_busy()
            && self.pipeline.turn() == self.player_side
    }

    fn set_status(&mut self, status: PuzzleStatus) {
        if self.status != status {
            debug!("[PUZZLE] {:?} -> {:?}", self.status, status);
            self.status = status;
            self.pipeline
                .emit(SurfaceEvent::PuzzleStatusChanged(status));
        }
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    pub fn select_or_move(&mut self, square: Square) -> Interaction {
        if !self.accepts_input() {
            return Interaction::Ignored;
        }
        match self.pipeline.selection().origin {
            Some(origin) if origin != square => {
                let mv = MoveInput::new(origin, square);
                if self.pipeline.needs_promotion(mv) {
                    return Interaction::PromotionRequested(self.pipeline.raise_promotion(mv, true));
                }
                match self.attempt(mv, true) {
                    Ok(interaction) => interaction,
                    Err(e) => {
                        debug!("[PUZZLE] Click move {} rejected: {}", mv, e);
                        self.pipeline.clear_selection();
                        match self.pipeline.select_square(square) {
                            Interaction::Ignored => Interaction::Deselected,
                            selected => selected,
                        }
                    }
                }
            }
            // Selecting and deselecting never move anything
            _ => self.pipeline.select_or_move(square),
        }
    }

    pub fn drag_move(&mut self, from: Square, to: Square) -> Interaction {
        if !self.accepts_input() {
            return Interaction::Ignored;
        }
        let mv = MoveInput::new(from, to);
        if self.pipeline.needs_promotion(mv) {
            return Interaction::PromotionRequested(self.pipeline.raise_promotion(mv, false));
        }
        match self.attempt(mv, false) {
            Ok(interaction) => interaction,
            Err(e) => {
                debug!("[PUZZLE] Drag move {} rejected: {}", mv, e);
                self.pipeline.clear_selection();
                Interaction::Ignored
            }
        }
    }

    /// Supply the piece for an outstanding promotion; the request survives failure
    pub fn choose_promotion(&mut self, kind: PieceKind) -> GameResult<Interaction> {
        let request = self.pipeline.take_promotion()?;
        let mv = MoveInput::new(request.from, request.to).with_promotion(Some(kind));
        self.attempt(mv, request.animate).inspect_err(|_| {
            self.pipeline.restore_promotion(request);
        })
    }

    pub fn cancel_promotion(&mut self) -> bool {
        self.pipeline.cancel_promotion()
    }

    /// Compare the move's SAN against the expected solution step
    fn attempt(&mut self, mv: MoveInput, animate: bool) -> GameResult<Interaction> {
        let piece = self
            .pipeline
            .rules()
            .piece_at(mv.from)
            .ok_or(GameError::NoPieceAt { square: mv.from })?;
        if piece.side != self.player_side {
            return Err(GameError::NotYourTurn { square: mv.from });
        }
        let Some(expected) = self.solution.get(self.cursor).cloned() else {
            return Err(GameError::GameOver);
        };

        let san = self.pipeline.preview_san(mv)?;
        if san == expected {
            self.accept(mv, animate)
        } else {
            let record = self.pipeline.reject_move(mv)?;
            info!(
                "[PUZZLE] {} played {}, expected {}",
                self.record.id, san, expected
            );
            self.set_status(PuzzleStatus::Failed);
            Ok(Interaction::Rejected(record))
        }
    }

    fn accept(&mut self, mv: MoveInput, animate: bool) -> GameResult<Interaction> {
        let options = if animate {
            MoveOptions::animated()
        } else {
            MoveOptions::instant()
        };
        let record = self.pipeline.make_move(mv, options)?;
        self.cursor += 1;
        if self.hint.take().is_some() {
            self.pipeline.emit(SurfaceEvent::HintChanged(None));
        }
        info!(
            "[PUZZLE] Correct: {} ({}/{})",
            record.san,
            self.cursor,
            self.solution.len()
        );

        self.set_status(PuzzleStatus::Solving);
        if !self.pipeline.is_animating() {
            self.after_correct_move();
        }
        Ok(Interaction::Moved(record))
    }

    /// Presentation acknowledgement; drives Solving and Failed back out
    pub fn complete_animation(&mut self) -> Option<CommitKind> {
        let kind = self.pipeline.complete_animation()?;
        match kind {
            CommitKind::Move if self.status == PuzzleStatus::Solving => self.after_correct_move(),
            CommitKind::Rollback if self.status == PuzzleStatus::Failed => {
                self.set_status(PuzzleStatus::Ready)
            }
            _ => {}
        }
        Some(kind)
    }

    fn after_correct_move(&mut self) {
        if self.cursor >= self.solution.len() {
            info!("[PUZZLE] ========== PUZZLE {} SOLVED ==========", self.record.id);
            self.set_status(PuzzleStatus::Solved);
            return;
        }
        self.set_status(PuzzleStatus::Ready);
        if self.pipeline.turn() != self.player_side {
            debug!(
                "[PUZZLE] Reply {} scheduled in {} ms",
                self.solution[self.cursor],
                self.reply_delay.as_millis()
            );
            self.reply = Some(ScheduledReply {
                timer: DelayTimer::new(self.reply_delay),
                generation: self.generation,
            });
        }
    }

    /// Advance the automatic reply timer
    pub fn update(&mut self, delta: Duration) {
        let Some(reply) = self.reply.as_mut() else {
            return;
        };
        if !reply.timer.tick(delta) {
            return;
        }
        let generation = reply.generation;
        self.reply = None;
        if generation != self.generation {
            debug!("[PUZZLE] Dropping reply from an earlier attempt");
            return;
        }
        self.play_reply();
    }

    fn play_reply(&mut self) {
        let Some(expected) = self.solution.get(self.cursor).cloned() else {
            return;
        };
        let Some(mv) = self.pipeline.rules().resolve_notation(&expected) else {
            warn!(
                "[PUZZLE] {}: automatic reply {} did not resolve",
                self.record.id, expected
            );
            return;
        };
        match self
            .pipeline
            .make_move(mv, MoveOptions::animated().on_behalf_of_opponent())
        {
            Ok(record) => {
                self.cursor += 1;
                debug!("[PUZZLE] Opponent replies {}", record.san);
                self.set_status(PuzzleStatus::Solving);
                if !self.pipeline.is_animating() {
                    self.after_correct_move();
                }
            }
            Err(e) => warn!(
                "[PUZZLE] {}: automatic reply {} failed: {}",
                self.record.id, expected, e
            ),
        }
    }

    // ------------------------------------------------------------------
    // Hints and reset
    // ------------------------------------------------------------------

    /// Escalate the hint for the next solution move
    pub fn request_hint(&mut self) -> Option<Hint> {
        if !self.accepts_input() {
            return None;
        }
        let expected = self.solution.get(self.cursor)?;
        let scratch = self.pipeline.rules().clone();
        let mv = scratch.resolve_notation(expected)?;

        let level = (self.hint_level() + 1).min(MAX_HINT_LEVEL);
        let hint = Hint {
            level,
            origin: mv.from,
            arrow: (level >= MAX_HINT_LEVEL).then_some((mv.from, mv.to)),
        };
        if self.hint != Some(hint) {
            self.hint = Some(hint);
            self.pipeline.emit(SurfaceEvent::HintChanged(Some(hint)));
        }
        Some(hint)
    }

    /// Start the same puzzle over; pending replies from the old attempt are dropped
    pub fn restart(&mut self) -> PuzzleResult<()> {
        info!("[PUZZLE] Restarting {}", self.record.id);
        self.start()
    }
}

/// Replay the coordinate solution on a scratch engine, collecting SAN
fn parse_solution<R: RulesEngine>(rules: &R, record: &PuzzleRecord) -> Vec<String> {
    let mut scratch = rules.clone();
    let mut solution = Vec::new();
    for (index, token) in record.solution_list().enumerate() {
        let mv: MoveInput = match token.parse() {
            Ok(mv) => mv,
            Err(e) => {
                warn!(
                    "[PUZZLE] {}: solution move #{} '{}' unreadable ({}), truncating",
                    record.id, index, token, e
                );
                break;
            }
        };
        match scratch.play(mv) {
            Ok(played) => solution.push(played.san),
            Err(e) => {
                warn!(
                    "[PUZZLE] {}: solution move #{} '{}' does not replay ({}), truncating",
                    record.id, index, token, e
                );
                break;
            }
        }
    }
    solution
}
