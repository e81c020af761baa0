//! Free-play surface: a human against the synthetic opponent
//!
//! Owns one move-commit pipeline and one AI coordinator (and through it one
//! search engine). Dropping the surface terminates the engine.

use std::time::Duration;
use tracing::info;

use super::status::SurfaceStatus;
use crate::game::ai::{AiConfig, AiCoordinator, EngineProfile, SearchEngine};
use crate::game::error::GameResult;
use crate::game::events::SurfaceEvent;
use crate::game::pipeline::{CommitKind, Interaction, MoveCommitPipeline};
use crate::game::rules::RulesEngine;
use crate::game::types::{MoveRecord, PieceKind, Side, Square};

#[derive(Debug)]
pub struct PlaySurface<R: RulesEngine, E: SearchEngine> {
    pipeline: MoveCommitPipeline<R>,
    opponent: AiCoordinator<E>,
    human_side: Side,
}

impl<R: RulesEngine, E: SearchEngine> PlaySurface<R, E> {
    /// Mount a surface at whatever position `rules` holds
    pub fn new(
        rules: R,
        engine: E,
        config: AiConfig,
        profile: EngineProfile,
        human_side: Side,
    ) -> Self {
        info!(
            "[GAME] New game: human plays {}, opponent {} ({})",
            human_side, profile.name, profile.elo
        );
        Self {
            pipeline: MoveCommitPipeline::new(rules),
            opponent: AiCoordinator::new(engine, config, profile, human_side.opposite()),
            human_side,
        }
    }

    pub fn pipeline(&self) -> &MoveCommitPipeline<R> {
        &self.pipeline
    }

    pub(crate) fn pipeline_mut(&mut self) -> &mut MoveCommitPipeline<R> {
        &mut self.pipeline
    }

    pub fn opponent(&self) -> &AiCoordinator<E> {
        &self.opponent
    }

    pub fn human_side(&self) -> Side {
        self.human_side
    }

    fn is_human_turn(&self) -> bool {
        self.pipeline.turn() == self.human_side
    }

    pub fn status(&self) -> SurfaceStatus {
        SurfaceStatus::of(&self.pipeline, &self.opponent, self.human_side)
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    pub fn select_or_move(&mut self, square: Square) -> Interaction {
        if !self.is_human_turn() {
            return Interaction::Ignored;
        }
        self.pipeline.select_or_move(square)
    }

    pub fn drag_move(&mut self, from: Square, to: Square) -> Interaction {
        if !self.is_human_turn() {
            return Interaction::Ignored;
        }
        self.pipeline.drag_move(from, to)
    }

    pub fn choose_promotion(&mut self, kind: PieceKind) -> GameResult<MoveRecord> {
        self.pipeline.resolve_promotion(kind)
    }

    pub fn cancel_promotion(&mut self) -> bool {
        self.pipeline.cancel_promotion()
    }

    pub fn complete_animation(&mut self) -> Option<CommitKind> {
        self.pipeline.complete_animation()
    }

    /// Host tick: advances the opponent's readiness, delay, and reply polling
    pub fn update(&mut self, delta: Duration) -> Option<MoveRecord> {
        self.opponent.update(&mut self.pipeline, delta)
    }

    pub fn drain_events(&mut self) -> Vec<SurfaceEvent> {
        self.pipeline.drain_events()
    }

    // ------------------------------------------------------------------
    // Game control
    // ------------------------------------------------------------------

    /// Start over from the standard position, or from `fen` when given
    ///
    /// Any thinking in progress is abandoned; its reply will be discarded.
    pub fn new_game(&mut self, fen: Option<&str>) -> GameResult<()> {
        self.opponent.cancel();
        match fen {
            Some(fen) => self.pipeline.load(fen)?,
            None => self.pipeline.reset(),
        }
        info!("[GAME] New game from {}", self.pipeline.position());
        Ok(())
    }

    /// Swap colors with the opponent; the position is kept
    pub fn set_human_side(&mut self, side: Side) {
        self.human_side = side;
        self.opponent.set_side(side.opposite());
    }

    pub fn set_profile(&mut self, profile: EngineProfile) {
        self.opponent.set_profile(profile);
    }

    /// Terminate the search engine now rather than on drop
    pub fn shutdown(&mut self) {
        self.opponent.shutdown();
    }
}
