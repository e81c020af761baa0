//! Opponent profile and timing configuration
//!
//! Controls how strong the synthetic opponent plays and how long it is allowed
//! to think. The rating is handed to the search engine as its strength setting
//! and also drives the per-move time budget.
//!
//! # Built-in Profiles
//!
//! | Id         | Name        | Rating | Budget (defaults) |
//! |------------|-------------|--------|-------------------|
//! | `beginner` | Beginner    | 800    | 800 ms            |
//! | `club`     | Club Player | 1400   | 1400 ms           |
//! | `expert`   | Expert      | 1800   | 1800 ms           |
//! | `master`   | Master      | 2400   | 2000 ms (clamped) |
//!
//! # Time Budget
//!
//! One millisecond per rating point, clamped to
//! `[min_think, max_think]`. The function is monotonic, so a stronger profile
//! never gets less time than a weaker one, and the clamp keeps weak profiles
//! responsive and strong ones from stalling.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identity and strength of the synthetic opponent
///
/// Immutable once selected; switching profiles reconfigures the search engine
/// but never touches the game position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineProfile {
    pub id: String,
    pub name: String,
    /// Strength rating passed to the engine (`UCI_Elo`)
    pub elo: u32,
}

impl EngineProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, elo: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            elo,
        }
    }

    /// Profiles offered when no custom one is configured
    pub fn builtin() -> Vec<EngineProfile> {
        vec![
            EngineProfile::new("beginner", "Beginner", 800),
            EngineProfile::new("club", "Club Player", 1400),
            EngineProfile::new("expert", "Expert", 1800),
            EngineProfile::new("master", "Master", 2400),
        ]
    }

    /// Look up a built-in profile by id
    pub fn by_id(id: &str) -> Option<EngineProfile> {
        Self::builtin().into_iter().find(|profile| profile.id == id)
    }
}

impl Default for EngineProfile {
    fn default() -> Self {
        EngineProfile::new("club", "Club Player", 1400)
    }
}

/// Timing knobs of the AI Turn Coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiConfig {
    /// Pause before the request is issued so replies don't feel instant
    pub humanize_delay: Duration,
    pub min_think: Duration,
    pub max_think: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            humanize_delay: Duration::from_millis(400),
            min_think: Duration::from_millis(250),
            max_think: Duration::from_millis(2000),
        }
    }
}

impl AiConfig {
    /// Per-move search budget for a strength rating
    pub fn think_time(&self, elo: u32) -> Duration {
        let (low, high) = if self.min_think <= self.max_think {
            (self.min_think, self.max_think)
        } else {
            (self.max_think, self.min_think)
        };
        Duration::from_millis(u64::from(elo)).clamp(low, high)
    }
}
