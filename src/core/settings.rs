//! User-facing practice settings
//!
//! One flat, serde-friendly struct stored as JSON. The library never reads it
//! directly: it is converted into the [`AiConfig`] and [`PuzzleConfig`] the
//! surfaces take.
//!
//! # Defaults
//!
//! | Field                   | Default |
//! |-------------------------|---------|
//! | `humanize_delay_ms`     | 400     |
//! | `puzzle_reply_delay_ms` | 500     |
//! | `min_think_ms`          | 250     |
//! | `max_think_ms`          | 2000    |
//! | `human_side`            | `"w"`   |
//! | `puzzle_filter`         | `"all"` |
//! | `puzzle_first_move`     | `"player"` |

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::error::{CoreError, CoreResult};
use crate::game::ai::{AiConfig, EngineProfile};
use crate::game::types::Side;
use crate::puzzle::{FirstMove, PuzzleCategory, PuzzleConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeSettings {
    /// UCI engine binary used for the synthetic opponent
    pub engine_path: Option<PathBuf>,
    pub profile: EngineProfile,
    pub human_side: Side,
    pub humanize_delay_ms: u64,
    pub puzzle_reply_delay_ms: u64,
    pub min_think_ms: u64,
    pub max_think_ms: u64,
    /// Category key, see [`PuzzleCategory`]
    pub puzzle_filter: String,
    /// Owner of the first move in puzzles without `playerSide`
    pub puzzle_first_move: FirstMove,
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            engine_path: None,
            profile: EngineProfile::default(),
            human_side: Side::White,
            humanize_delay_ms: 400,
            puzzle_reply_delay_ms: 500,
            min_think_ms: 250,
            max_think_ms: 2000,
            puzzle_filter: PuzzleCategory::All.key().to_string(),
            puzzle_first_move: FirstMove::Player,
        }
    }
}

impl PracticeSettings {
    /// Reject settings that would make the coordinator misbehave
    pub fn validate(&self) -> CoreResult<()> {
        if self.min_think_ms > self.max_think_ms {
            return Err(CoreError::InvalidSetting {
                key: "min_think_ms".to_string(),
                message: format!(
                    "{} exceeds max_think_ms {}",
                    self.min_think_ms, self.max_think_ms
                ),
            });
        }
        if self.profile.elo == 0 {
            return Err(CoreError::InvalidSetting {
                key: "profile.elo".to_string(),
                message: "rating must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn ai_config(&self) -> AiConfig {
        AiConfig {
            humanize_delay: Duration::from_millis(self.humanize_delay_ms),
            min_think: Duration::from_millis(self.min_think_ms),
            max_think: Duration::from_millis(self.max_think_ms),
        }
    }

    pub fn puzzle_config(&self) -> PuzzleConfig {
        PuzzleConfig {
            reply_delay: Duration::from_millis(self.puzzle_reply_delay_ms),
            category: PuzzleCategory::from_key(&self.puzzle_filter),
            first_move: self.puzzle_first_move,
        }
    }
}
