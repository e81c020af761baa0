//! Chess game logic module
//!
//! Everything a play surface needs to accept, validate, commit, and announce
//! moves, with no rendering attached. The presentation layer sits on the other
//! side of [`events::SurfaceEvent`] and `complete_animation()`.
//!
//! # Module Organization
//!
//! - `types` - board vocabulary (squares, pieces, moves, records)
//! - `rules` - the rule engine boundary and its `shakmaty` implementation
//! - `resources` - per-surface state pieces (selection, history, commit gate, outcome)
//! - `pipeline` - position store and the move-commit chokepoint, promotion sub-flow
//! - `ai` - synthetic opponent: profiles, search engine boundary, turn coordinator
//! - `events` - what the presentation layer is told
//! - `error` - [`GameError`](error::GameError)
//!
//! # Move Flow
//!
//! 1. Input (click, drag, engine reply, puzzle reply) reaches the pipeline
//! 2. Rule engine validates and applies the move
//! 3. Animated moves wait in the commit gate for `complete_animation()`
//! 4. Terminal result detection runs after every accepted move

pub mod ai;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod resources;
pub mod rules;
pub mod types;

pub use error::{GameError, GameResult};
pub use events::SurfaceEvent;
pub use pipeline::{CommitKind, Interaction, MoveCommitPipeline, MoveOptions};
