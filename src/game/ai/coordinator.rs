//! AI Turn Coordinator
//!
//! Decides when the synthetic opponent thinks and feeds its answer back into
//! the same [`MoveCommitPipeline`] human moves go through.
//!
//! # Phases
//!
//! ```text
//! Idle --(opponent to move, engine ready, pipeline idle)--> Delaying
//! Delaying --(humanize delay elapsed)--> Awaiting   (one request issued)
//! Awaiting --(reply received)--> Idle                (move submitted)
//! ```
//!
//! `Delaying` and `Awaiting` together form the Thinking state. Repeated
//! `update` calls while Thinking never issue a second request.
//!
//! # Stale replies
//!
//! Every request is tagged with a generation number and the position it was
//! asked about. `cancel` tells the engine to abandon its search, bumps the
//! generation and drops the reply channel; a reply whose position no longer
//! matches the pipeline is logged and dropped.

use crossbeam_channel::{Receiver, TryRecvError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::resource::{AiConfig, EngineProfile};
use super::search::SearchEngine;
use crate::game::events::SurfaceEvent;
use crate::game::pipeline::{MoveCommitPipeline, MoveOptions};
use crate::game::resources::DelayTimer;
use crate::game::rules::RulesEngine;
use crate::game::types::{MoveInput, MoveRecord, Side};

#[derive(Debug)]
enum Phase {
    Idle,
    Delaying {
        timer: DelayTimer,
        generation: u64,
    },
    Awaiting {
        reply: Receiver<MoveInput>,
        position: String,
        generation: u64,
    },
}

/// Drives one [`SearchEngine`] on behalf of one play surface
pub struct AiCoordinator<E: SearchEngine> {
    engine: Option<E>,
    config: AiConfig,
    profile: EngineProfile,
    side: Side,
    ready: bool,
    phase: Phase,
    generation: u64,
    requests_issued: u64,
}

impl<E: SearchEngine> AiCoordinator<E> {
    /// Take ownership of `engine`; the opponent plays `side`
    pub fn new(engine: E, config: AiConfig, profile: EngineProfile, side: Side) -> Self {
        Self {
            engine: Some(engine),
            config,
            profile,
            side,
            ready: false,
            phase: Phase::Idle,
            generation: 0,
            requests_issued: 0,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Hand the opponent a different color; cancels any in-flight thinking
    pub fn set_side(&mut self, side: Side) {
        self.cancel();
        self.side = side;
    }

    pub fn profile(&self) -> &EngineProfile {
        &self.profile
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_thinking(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// Total best-move requests sent to the engine
    pub fn requests_issued(&self) -> u64 {
        self.requests_issued
    }

    pub fn is_terminated(&self) -> bool {
        self.engine.is_none()
    }

    /// Budget the current profile gets per move
    pub fn think_time(&self) -> Duration {
        self.config.think_time(self.profile.elo)
    }

    /// Switch profiles; a ready engine picks up the new rating immediately
    ///
    /// An in-flight request keeps running with the old strength.
    pub fn set_profile(&mut self, profile: EngineProfile) {
        info!(
            "[AI] Profile changed: {} ({})",
            profile.name, profile.elo
        );
        self.profile = profile;
        if self.ready {
            self.apply_elo();
        }
    }

    fn apply_elo(&mut self) {
        let elo = self.profile.elo;
        if let Some(engine) = self.engine.as_mut() {
            if let Err(e) = engine.set_elo(elo) {
                warn!("[AI] Failed to set engine strength to {}: {}", elo, e);
            }
        }
    }

    /// Abandon any thinking in progress; a late reply will be ignored
    pub fn cancel(&mut self) {
        if self.is_thinking() {
            debug!("[AI] Cancelling generation {}", self.generation);
        }
        if matches!(self.phase, Phase::Awaiting { .. }) {
            if let Some(engine) = self.engine.as_mut() {
                engine.cancel();
            }
        }
        self.generation = self.generation.wrapping_add(1);
        self.phase = Phase::Idle;
    }

    /// Cancel and terminate the engine; the coordinator stays inert afterwards
    pub fn shutdown(&mut self) {
        self.cancel();
        if let Some(mut engine) = self.engine.take() {
            info!("[AI] Terminating search engine");
            engine.terminate();
        }
        self.ready = false;
    }

    fn should_think<R: RulesEngine>(&self, pipeline: &MoveCommitPipeline<R>) -> bool {
        self.engine.is_some()
            && self.ready
            && matches!(self.phase, Phase::Idle)
            && pipeline.turn() == self.side
            && !pipeline.is_game_over()
            && !pipeline.is_busy()
    }

    /// Advance readiness, delay timer, and reply polling by one tick
    ///
    /// Returns the opponent's move when one was submitted this tick.
    pub fn update<R: RulesEngine>(
        &mut self,
        pipeline: &mut MoveCommitPipeline<R>,
        delta: Duration,
    ) -> Option<MoveRecord> {
        self.poll_readiness(pipeline);

        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => {
                if self.should_think(pipeline) {
                    info!(
                        "[AI] {} to move, thinking ({} / {})",
                        self.side, self.profile.name, self.profile.elo
                    );
                    self.phase = Phase::Delaying {
                        timer: DelayTimer::new(self.config.humanize_delay),
                        generation: self.generation,
                    };
                    pipeline.emit(SurfaceEvent::EngineThinking);
                }
                None
            }
            Phase::Delaying {
                mut timer,
                generation,
            } => {
                if generation != self.generation {
                    return None;
                }
                if timer.tick(delta) {
                    self.issue_request(pipeline, generation);
                } else {
                    self.phase = Phase::Delaying { timer, generation };
                }
                None
            }
            Phase::Awaiting {
                reply,
                position,
                generation,
            } => match reply.try_recv() {
                Ok(mv) => self.apply_reply(pipeline, mv, &position, generation),
                Err(TryRecvError::Empty) => {
                    self.phase = Phase::Awaiting {
                        reply,
                        position,
                        generation,
                    };
                    None
                }
                Err(TryRecvError::Disconnected) => {
                    error!("[AI] Engine returned no move");
                    if generation == self.generation && pipeline.position() == position {
                        self.play_fallback(pipeline)
                    } else {
                        None
                    }
                }
            },
        }
    }

    fn poll_readiness<R: RulesEngine>(&mut self, pipeline: &mut MoveCommitPipeline<R>) {
        if self.ready {
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        if engine.poll_ready() {
            info!("[AI] Search engine ready");
            self.ready = true;
            self.apply_elo();
            pipeline.emit(SurfaceEvent::EngineReady);
        }
    }

    fn issue_request<R: RulesEngine>(&mut self, pipeline: &MoveCommitPipeline<R>, generation: u64) {
        // Position may have moved on during the delay
        if !self.should_think_after_delay(pipeline) {
            debug!("[AI] Board changed during humanize delay, standing down");
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        let position = pipeline.position().to_string();
        let budget = self.config.think_time(self.profile.elo);

        if let Err(e) = engine.set_position(&position) {
            error!("[AI] Failed to send position to engine: {}", e);
            return;
        }
        match engine.request_best_move(budget) {
            Ok(reply) => {
                self.requests_issued += 1;
                info!(
                    "[AI] Requested best move (budget {} ms, request #{})",
                    budget.as_millis(),
                    self.requests_issued
                );
                self.phase = Phase::Awaiting {
                    reply,
                    position,
                    generation,
                };
            }
            Err(e) => error!("[AI] Best-move request failed: {}", e),
        }
    }

    fn should_think_after_delay<R: RulesEngine>(&self, pipeline: &MoveCommitPipeline<R>) -> bool {
        self.engine.is_some()
            && pipeline.turn() == self.side
            && !pipeline.is_game_over()
            && !pipeline.is_busy()
    }

    fn apply_reply<R: RulesEngine>(
        &mut self,
        pipeline: &mut MoveCommitPipeline<R>,
        mv: MoveInput,
        position: &str,
        generation: u64,
    ) -> Option<MoveRecord> {
        if generation != self.generation || pipeline.position() != position {
            warn!("[AI] Discarding stale engine reply {}", mv);
            return None;
        }

        info!("[AI] ========== AI MOVE READY FOR EXECUTION ==========");
        match pipeline.make_move(mv, MoveOptions::animated().on_behalf_of_opponent()) {
            Ok(record) => Some(record),
            Err(e) => {
                error!("[AI] Engine move {} rejected: {}", mv, e);
                self.play_fallback(pipeline)
            }
        }
    }

    /// First legal move of the side to move, so a bad engine reply never stalls the game
    fn play_fallback<R: RulesEngine>(
        &mut self,
        pipeline: &mut MoveCommitPipeline<R>,
    ) -> Option<MoveRecord> {
        if pipeline.turn() != self.side || pipeline.is_busy() || pipeline.is_game_over() {
            return None;
        }
        warn!("[AI] Attempting fallback move...");
        let fallback = pipeline.rules().all_moves().into_iter().next()?;
        match pipeline.make_move(
            fallback.input(),
            MoveOptions::animated().on_behalf_of_opponent(),
        ) {
            Ok(record) => Some(record),
            Err(e) => {
                error!("[AI] Fallback move {} failed: {}", fallback.input(), e);
                None
            }
        }
    }
}

impl<E: SearchEngine> Drop for AiCoordinator<E> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<E: SearchEngine> std::fmt::Debug for AiCoordinator<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiCoordinator")
            .field("side", &self.side)
            .field("profile", &self.profile)
            .field("ready", &self.ready)
            .field("phase", &self.phase)
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ai::ScriptedEngine;
    use crate::game::rules::ShakmatyRules;

    const TICK: Duration = Duration::from_millis(100);

    fn mv(text: &str) -> MoveInput {
        text.parse().unwrap()
    }

    fn black_to_move() -> MoveCommitPipeline<ShakmatyRules> {
        let mut pipeline = MoveCommitPipeline::new(ShakmatyRules::new());
        pipeline
            .make_move(mv("e2e4"), MoveOptions::instant())
            .unwrap();
        pipeline
    }

    fn coordinator(engine: &ScriptedEngine) -> AiCoordinator<ScriptedEngine> {
        AiCoordinator::new(
            engine.clone(),
            AiConfig::default(),
            EngineProfile::default(),
            Side::Black,
        )
    }

    #[test]
    fn test_not_ready_engine_never_thinks() {
        //! No readiness, no Thinking state
        let engine = ScriptedEngine::new();
        let mut ai = coordinator(&engine);
        let mut pipeline = black_to_move();
        for _ in 0..20 {
            ai.update(&mut pipeline, TICK);
        }
        assert!(!ai.is_thinking());
        assert_eq!(engine.request_count(), 0);
    }

    #[test]
    fn test_ready_applies_profile_elo() {
        //! Rating is pushed on readiness and on profile change
        let engine = ScriptedEngine::ready();
        let mut ai = coordinator(&engine);
        let mut pipeline = MoveCommitPipeline::new(ShakmatyRules::new());
        ai.update(&mut pipeline, TICK);
        assert_eq!(engine.elo(), Some(1400));

        ai.set_profile(EngineProfile::new("custom", "Custom", 1900));
        assert_eq!(engine.elo(), Some(1900));
    }

    #[test]
    fn test_humanize_delay_precedes_request() {
        //! Request only after the delay elapses
        let engine = ScriptedEngine::ready();
        let mut ai = coordinator(&engine);
        let mut pipeline = black_to_move();

        ai.update(&mut pipeline, TICK); // enters Thinking
        assert!(ai.is_thinking());
        ai.update(&mut pipeline, TICK);
        assert_eq!(engine.request_count(), 0);
        for _ in 0..4 {
            ai.update(&mut pipeline, TICK);
        }
        assert_eq!(engine.request_count(), 1);
        assert_eq!(engine.last_position().as_deref(), Some(pipeline.position()));
    }

    #[test]
    fn test_reply_is_played_for_opponent() {
        //! Engine reply goes through the pipeline with animation
        let engine = ScriptedEngine::ready();
        let mut ai = coordinator(&engine);
        let mut pipeline = black_to_move();
        for _ in 0..10 {
            ai.update(&mut pipeline, TICK);
        }
        assert!(engine.reply(mv("e7e5")));
        let record = ai.update(&mut pipeline, TICK).expect("reply applied");
        assert_eq!(record.san, "e5");
        assert!(!ai.is_thinking());
        assert!(pipeline.is_animating());
    }

    #[test]
    fn test_rejected_reply_falls_back_to_legal_move() {
        //! Illegal engine output still produces a move
        let engine = ScriptedEngine::ready();
        let mut ai = coordinator(&engine);
        let mut pipeline = black_to_move();
        for _ in 0..10 {
            ai.update(&mut pipeline, TICK);
        }
        engine.reply(mv("e7e4"));
        let record = ai.update(&mut pipeline, TICK).expect("fallback move");
        assert_eq!(record.piece.side, Side::Black);
    }

    #[test]
    fn test_cancel_abandons_engine_search() {
        //! The engine is told to drop the search, not just the channel
        let engine = ScriptedEngine::ready();
        let mut ai = coordinator(&engine);
        let mut pipeline = black_to_move();
        for _ in 0..10 {
            ai.update(&mut pipeline, TICK);
        }
        assert_eq!(engine.pending_requests(), 1);

        ai.cancel();
        assert_eq!(engine.cancel_count(), 1);
        assert_eq!(engine.pending_requests(), 0);
        assert!(!engine.reply(mv("e7e5")));

        // Next turn's request is the only one the engine answers
        for _ in 0..10 {
            ai.update(&mut pipeline, TICK);
        }
        assert_eq!(engine.request_count(), 2);
        assert!(engine.reply(mv("c7c5")));
        let record = ai.update(&mut pipeline, TICK).expect("fresh reply applied");
        assert_eq!(record.san, "c5");
    }

    #[test]
    fn test_cancel_while_delaying_sends_nothing() {
        let engine = ScriptedEngine::ready();
        let mut ai = coordinator(&engine);
        let mut pipeline = black_to_move();
        ai.update(&mut pipeline, TICK);
        assert!(ai.is_thinking());

        ai.cancel();
        assert_eq!(engine.cancel_count(), 0);
        assert_eq!(engine.request_count(), 0);
    }

    #[test]
    fn test_shutdown_terminates_engine() {
        //! Teardown releases the engine exactly once
        let engine = ScriptedEngine::ready();
        {
            let mut ai = coordinator(&engine);
            ai.shutdown();
            assert!(ai.is_terminated());
        }
        assert!(engine.is_terminated());
    }
}
