//! Search Engine Adapter boundary
//!
//! The coordinator never talks to a concrete engine. Anything implementing
//! [`SearchEngine`] can play the opponent: the [`UciEngine`](super::UciEngine)
//! process adapter or the [`ScriptedEngine`](super::ScriptedEngine) test double.
//!
//! Best-move replies are delivered on a `crossbeam-channel` receiver that the
//! caller polls. An outstanding request is abandoned with
//! [`SearchEngine::cancel`]; the engine must then never route that search's
//! answer to a later request.

use crossbeam_channel::Receiver;
use std::time::Duration;
use thiserror::Error;

use crate::game::types::MoveInput;

/// Errors raised by search engine adapters
#[derive(Error, Debug)]
pub enum SearchError {
    /// Engine process could not be started
    #[error("Failed to start engine '{path}': {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Engine pipe I/O failed
    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Engine was used after `terminate`
    #[error("Engine has been terminated")]
    Terminated,

    /// Engine is still initializing
    #[error("Engine is not ready")]
    NotReady,
}

pub type SearchResult<T> = Result<T, SearchError>;

/// Asynchronous best-move provider owned by exactly one play surface
pub trait SearchEngine {
    /// Whether asynchronous initialization has finished
    ///
    /// Polled by the coordinator; the first `true` plays the role of the
    /// one-shot readiness notification.
    fn poll_ready(&mut self) -> bool;

    /// Set the engine's internal strength parameter
    fn set_elo(&mut self, elo: u32) -> SearchResult<()>;

    /// Set the position the next search starts from
    fn set_position(&mut self, fen: &str) -> SearchResult<()>;

    /// Start a search limited to `budget`; the reply arrives on the returned channel
    ///
    /// A disconnected channel without a message means the engine found no move.
    fn request_best_move(&mut self, budget: Duration) -> SearchResult<Receiver<MoveInput>>;

    /// Abandon the outstanding request, if any
    ///
    /// Its reply channel is closed and whatever the search eventually answers
    /// is discarded.
    fn cancel(&mut self);

    /// Release the engine; later calls fail with [`SearchError::Terminated`]
    fn terminate(&mut self);
}
