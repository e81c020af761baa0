//! Per-surface game state pieces
//!
//! Each play surface owns one instance of each of these; nothing here is
//! global or shared between surfaces.
//!
//! # Resource Categories
//!
//! ## Player Interaction
//! - [`Selection`] - selected origin and deduplicated legal destinations
//! - [`PromotionRequest`] - outstanding promotion choice
//!
//! ## Move Flow
//! - [`CommitGate`] - two-phase (pending, committed) animation gate
//! - [`DelayTimer`] - tick-driven one-shot delay
//!
//! ## Game History
//! - [`MoveHistory`] - committed moves with SAN
//!
//! ## Game Status
//! - [`GameOutcome`] / [`DrawReason`] - terminal results

pub mod game_over;
pub mod history;
pub mod pending;
pub mod promotion;
pub mod selection;
pub mod timer;

pub use game_over::{detect_outcome, DrawReason, GameEndReport, GameOutcome};
pub use history::MoveHistory;
pub use pending::{CommitGate, PendingCommit};
pub use promotion::{is_promotion_move, PromotionRequest};
pub use selection::Selection;
pub use timer::DelayTimer;
