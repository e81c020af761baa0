//! Synthetic opponent
//!
//! The opponent's moves come from an external search engine and are submitted
//! through the same move-commit pipeline as human moves, so they follow the
//! same validation rules.
//!
//! # Architecture
//!
//! - [`EngineProfile`] / [`AiConfig`]: strength and timing settings
//! - [`SearchEngine`]: the engine boundary (readiness, strength, position, best move)
//! - [`AiCoordinator`]: Idle/Thinking state machine that issues one request per turn
//! - [`UciEngine`]: UCI child process adapter
//! - [`ScriptedEngine`]: hand-driven engine for tests and offline hosts
//!
//! # Turn Flow
//!
//! 1. Opponent's turn, engine ready, pipeline idle: enter Thinking
//! 2. Wait out the humanizing delay
//! 3. Send the authoritative position and request a move within the time budget
//! 4. Poll the reply and submit it with the turn-ownership check skipped

pub mod coordinator;
pub mod resource;
pub mod scripted;
pub mod search;
pub mod uci;

pub use coordinator::AiCoordinator;
pub use resource::{AiConfig, EngineProfile};
pub use scripted::ScriptedEngine;
pub use search::{SearchEngine, SearchError, SearchResult};
pub use uci::UciEngine;
