//! Two-phase commit gate shared by every play surface
//!
//! A move is validated immediately, but the position it produces only becomes
//! authoritative after the presentation layer finishes animating it. The gate
//! holds that buffered payload between `begin` and `complete`:
//!
//! ```text
//! Idle --begin(animation, payload)--> Pending --complete()--> Idle (payload returned)
//! ```
//!
//! While pending, `begin` refuses a second payload, which is what keeps two
//! animations from ever overlapping.

use crate::game::types::AnimationRequest;

#[derive(Debug, Clone)]
pub struct PendingCommit<T> {
    pub animation: AnimationRequest,
    pub payload: T,
}

/// Idle or holding exactly one [`PendingCommit`]
#[derive(Debug, Clone)]
pub struct CommitGate<T> {
    pending: Option<PendingCommit<T>>,
}

impl<T> Default for CommitGate<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> CommitGate<T> {
    /// Buffer `payload` behind `animation`; `false` if a commit is already pending
    pub fn begin(&mut self, animation: AnimationRequest, payload: T) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(PendingCommit { animation, payload });
        true
    }

    /// Release the buffered payload, returning the gate to idle
    pub fn complete(&mut self) -> Option<PendingCommit<T>> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PendingCommit<T>> {
        self.pending.as_ref()
    }

    /// Drop the buffered payload without applying it
    pub fn clear(&mut self) {
        self.pending = None;
    }
}
