//! Blindfold surface
//!
//! The player never sees the board. Moves are typed as SAN (`Nf3`, `exd5`,
//! `e8=Q`) or coordinate text (`g1f3`, `e7e8q`) and committed without
//! animation. The opponent's replies still go through the commit gate so the
//! host can announce them before the next move is accepted.

use std::time::Duration;
use tracing::{debug, info};

use super::play::PlaySurface;
use super::status::SurfaceStatus;
use crate::game::ai::{AiConfig, EngineProfile, SearchEngine};
use crate::game::error::{GameError, GameResult};
use crate::game::events::SurfaceEvent;
use crate::game::pipeline::{CommitKind, MoveCommitPipeline, MoveOptions};
use crate::game::rules::RulesEngine;
use crate::game::types::{MoveRecord, Side};

#[derive(Debug)]
pub struct BlindfoldSurface<R: RulesEngine, E: SearchEngine> {
    inner: PlaySurface<R, E>,
}

impl<R: RulesEngine, E: SearchEngine> BlindfoldSurface<R, E> {
    pub fn new(
        rules: R,
        engine: E,
        config: AiConfig,
        profile: EngineProfile,
        human_side: Side,
    ) -> Self {
        Self {
            inner: PlaySurface::new(rules, engine, config, profile, human_side),
        }
    }

    pub fn pipeline(&self) -> &MoveCommitPipeline<R> {
        self.inner.pipeline()
    }

    pub fn status(&self) -> SurfaceStatus {
        self.inner.status()
    }

    /// Play one move given as text
    ///
    /// Fails when it is not the player's turn, a commit is outstanding, or the
    /// text names no legal move. Promotions must spell out the piece.
    pub fn submit(&mut self, notation: &str) -> GameResult<MoveRecord> {
        let Some(mv) = self.pipeline().rules().resolve_notation(notation) else {
            debug!("[GAME] Blindfold input '{}' not understood", notation.trim());
            return Err(GameError::InvalidNotation {
                notation: notation.trim().to_string(),
            });
        };
        if self.pipeline().turn() != self.inner.human_side() {
            return Err(GameError::NotYourTurn { square: mv.from });
        }
        let record = self
            .inner
            .pipeline_mut()
            .make_move(mv, MoveOptions::instant())?;
        info!("[GAME] Blindfold move {}", record.san);
        Ok(record)
    }

    /// `1. e4 e5 2. Nf3` text for read-back
    pub fn move_list(&self) -> String {
        self.pipeline().move_list_text()
    }

    /// SAN of the most recent move by either side
    pub fn last_move_text(&self) -> Option<&str> {
        self.pipeline()
            .history()
            .last_move()
            .map(|record| record.san.as_str())
    }

    pub fn complete_animation(&mut self) -> Option<CommitKind> {
        self.inner.complete_animation()
    }

    pub fn update(&mut self, delta: Duration) -> Option<MoveRecord> {
        self.inner.update(delta)
    }

    pub fn drain_events(&mut self) -> Vec<SurfaceEvent> {
        self.inner.drain_events()
    }

    pub fn new_game(&mut self, fen: Option<&str>) -> GameResult<()> {
        self.inner.new_game(fen)
    }

    pub fn shutdown(&mut self) {
        self.inner.shutdown();
    }
}
