//! Play surfaces
//!
//! A surface is what a host mounts: it owns its pipeline and engines for its
//! whole lifetime and never shares them.
//!
//! - [`PlaySurface`] - free play against the synthetic opponent
//! - [`BlindfoldSurface`] - notation-only play against the same opponent
//! - [`PuzzleTrainer`](crate::puzzle::PuzzleTrainer) - puzzle verification
//!
//! Every surface is driven the same way: input calls, `update(delta)` from
//! the host loop, `complete_animation()` after each `Animate` event, and
//! `drain_events()` to collect what happened.

pub mod blindfold;
pub mod play;
pub mod status;

pub use crate::puzzle::PuzzleTrainer;
pub use blindfold::BlindfoldSurface;
pub use play::PlaySurface;
pub use status::SurfaceStatus;
