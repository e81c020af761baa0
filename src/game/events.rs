//! Events produced for the presentation layer
//!
//! Every surface queues these while handling input, ticks, and animation
//! acknowledgements. The host drains them after each call and renders what
//! they describe; [`SurfaceEvent::Animate`] is the one that must eventually be
//! answered with `complete_animation()`.

use crate::game::resources::{GameOutcome, PromotionRequest};
use crate::game::types::{AnimationRequest, MoveRecord};
use crate::puzzle::{Hint, PuzzleStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// A move was accepted; `position` is the position after it
    MoveMade {
        record: MoveRecord,
        position: String,
    },
    /// Play this transition, then call `complete_animation()`
    Animate(AnimationRequest),
    /// The game reached a terminal result
    GameEnded(GameOutcome),
    /// Show the promotion piece picker
    PromotionRequested(PromotionRequest),
    PromotionCancelled,
    /// The synthetic opponent started thinking
    EngineThinking,
    /// The search engine finished initializing
    EngineReady,
    PuzzleLoaded {
        id: String,
        rating: u32,
    },
    PuzzleStatusChanged(PuzzleStatus),
    /// `None` clears any hint overlay
    HintChanged(Option<Hint>),
}
