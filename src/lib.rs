//! Move-commit and verification layer for chess practice
//!
//! Three surfaces share one pipeline design:
//!
//! - free play against a UCI engine ([`surface::PlaySurface`])
//! - blindfold play by notation ([`surface::BlindfoldSurface`])
//! - puzzle verification ([`puzzle::PuzzleTrainer`])
//!
//! Chess legality is delegated to a [`game::rules::RulesEngine`]; opponent
//! moves come from a [`game::ai::SearchEngine`]. Both are traits so test
//! doubles can stand in for the real ones.

pub mod core;
pub mod game;
pub mod puzzle;
pub mod surface;

pub use game::rules::{RulesEngine, ShakmatyRules};
pub use game::types::{MoveInput, Piece, PieceKind, Side, Square};
