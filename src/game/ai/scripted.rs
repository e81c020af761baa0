//! Scripted search engine
//!
//! A [`SearchEngine`] whose readiness and replies are controlled by hand.
//! Cloned handles share state, so a test can move one clone into a coordinator
//! and keep another to drive it.

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use super::search::{SearchEngine, SearchError, SearchResult};
use crate::game::types::MoveInput;

#[derive(Debug, Default)]
struct ScriptState {
    ready: bool,
    terminated: bool,
    cancels: usize,
    elo: Option<u32>,
    positions: Vec<String>,
    budgets: Vec<Duration>,
    pending: Vec<Sender<MoveInput>>,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedEngine {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedEngine {
    /// Engine that has not finished initializing
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that reports readiness on the first poll
    pub fn ready() -> Self {
        let engine = Self::default();
        engine.set_ready(true);
        engine
    }

    pub fn set_ready(&self, ready: bool) {
        self.state.lock().ready = ready;
    }

    /// Deliver `mv` to the oldest outstanding request
    ///
    /// Returns `false` when no request is waiting or its receiver is gone.
    pub fn reply(&self, mv: MoveInput) -> bool {
        let mut state = self.state.lock();
        if state.pending.is_empty() {
            return false;
        }
        let sender = state.pending.remove(0);
        sender.send(mv).is_ok()
    }

    /// Close the oldest outstanding request without a move
    pub fn reply_none(&self) -> bool {
        let mut state = self.state.lock();
        if state.pending.is_empty() {
            return false;
        }
        state.pending.remove(0);
        true
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().budgets.len()
    }

    pub fn pending_requests(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn last_budget(&self) -> Option<Duration> {
        self.state.lock().budgets.last().copied()
    }

    pub fn last_position(&self) -> Option<String> {
        self.state.lock().positions.last().cloned()
    }

    /// Times `cancel` was called
    pub fn cancel_count(&self) -> usize {
        self.state.lock().cancels
    }

    pub fn elo(&self) -> Option<u32> {
        self.state.lock().elo
    }

    pub fn is_terminated(&self) -> bool {
        self.state.lock().terminated
    }
}

impl SearchEngine for ScriptedEngine {
    fn poll_ready(&mut self) -> bool {
        let state = self.state.lock();
        state.ready && !state.terminated
    }

    fn set_elo(&mut self, elo: u32) -> SearchResult<()> {
        let mut state = self.state.lock();
        if state.terminated {
            return Err(SearchError::Terminated);
        }
        state.elo = Some(elo);
        Ok(())
    }

    fn set_position(&mut self, fen: &str) -> SearchResult<()> {
        let mut state = self.state.lock();
        if state.terminated {
            return Err(SearchError::Terminated);
        }
        state.positions.push(fen.to_string());
        Ok(())
    }

    fn request_best_move(&mut self, budget: Duration) -> SearchResult<Receiver<MoveInput>> {
        let mut state = self.state.lock();
        if state.terminated {
            return Err(SearchError::Terminated);
        }
        if !state.ready {
            return Err(SearchError::NotReady);
        }
        let (sender, receiver) = bounded(1);
        state.budgets.push(budget);
        state.pending.push(sender);
        Ok(receiver)
    }

    fn cancel(&mut self) {
        let mut state = self.state.lock();
        state.cancels += 1;
        state.pending.clear();
    }

    fn terminate(&mut self) {
        let mut state = self.state.lock();
        state.terminated = true;
        state.pending.clear();
    }
}
