//! Status label shown by free-play and blindfold surfaces

use std::fmt;

use crate::game::ai::{AiCoordinator, SearchEngine};
use crate::game::pipeline::MoveCommitPipeline;
use crate::game::resources::GameOutcome;
use crate::game::rules::RulesEngine;
use crate::game::types::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceStatus {
    YourTurn,
    Thinking,
    /// Opponent to move but its engine never became ready
    EngineNotReady,
    Animating,
    ChoosingPromotion,
    GameOver(GameOutcome),
}

impl SurfaceStatus {
    pub(crate) fn of<R: RulesEngine, E: SearchEngine>(
        pipeline: &MoveCommitPipeline<R>,
        opponent: &AiCoordinator<E>,
        human_side: Side,
    ) -> Self {
        if let Some(outcome) = pipeline.outcome() {
            if !pipeline.is_animating() {
                return SurfaceStatus::GameOver(outcome);
            }
        }
        if pipeline.promotion().is_some() {
            SurfaceStatus::ChoosingPromotion
        } else if pipeline.is_animating() {
            SurfaceStatus::Animating
        } else if pipeline.turn() == human_side {
            SurfaceStatus::YourTurn
        } else if opponent.is_ready() {
            SurfaceStatus::Thinking
        } else {
            SurfaceStatus::EngineNotReady
        }
    }
}

impl fmt::Display for SurfaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceStatus::YourTurn => f.write_str("Your move"),
            SurfaceStatus::Thinking => f.write_str("Opponent is thinking..."),
            SurfaceStatus::EngineNotReady => f.write_str("Engine not ready"),
            SurfaceStatus::Animating => f.write_str("..."),
            SurfaceStatus::ChoosingPromotion => f.write_str("Choose a promotion piece"),
            SurfaceStatus::GameOver(outcome) => f.write_str(&outcome.message()),
        }
    }
}
