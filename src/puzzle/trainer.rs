//! Puzzle trainer surface
//!
//! Owns the puzzle list, the active category filter, the active index, and the
//! set of puzzles solved during this process. A fresh [`PuzzleSession`] is
//! created whenever the index or the filter changes.

use std::collections::HashSet;
use std::time::Duration;
use tracing::{error, info};

use super::data::{FirstMove, PuzzleRecord};
use super::filter::{filter_indices, PuzzleCategory};
use super::session::{Hint, PuzzleSession, PuzzleStatus};
use crate::game::error::{GameError, GameResult};
use crate::game::events::SurfaceEvent;
use crate::game::pipeline::{CommitKind, Interaction};
use crate::game::rules::RulesEngine;
use crate::game::types::{PieceKind, Square};

/// Trainer timing and the initial filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PuzzleConfig {
    /// Pause between a correct move landing and the opponent's reply
    pub reply_delay: Duration,
    pub category: PuzzleCategory,
    /// Applies only to puzzles that do not name the solver's side
    pub first_move: FirstMove,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(500),
            category: PuzzleCategory::All,
            first_move: FirstMove::Player,
        }
    }
}

#[derive(Debug)]
pub struct PuzzleTrainer<R: RulesEngine> {
    rules: R,
    puzzles: Vec<PuzzleRecord>,
    config: PuzzleConfig,
    visible: Vec<usize>,
    index: usize,
    solved: HashSet<String>,
    session: Option<PuzzleSession<R>>,
}

impl<R: RulesEngine> PuzzleTrainer<R> {
    /// `rules` is the template every session's engine is cloned from
    pub fn new(rules: R, puzzles: Vec<PuzzleRecord>, config: PuzzleConfig) -> Self {
        let visible = filter_indices(&puzzles, config.category);
        let mut trainer = Self {
            rules,
            puzzles,
            config,
            visible,
            index: 0,
            solved: HashSet::new(),
            session: None,
        };
        trainer.load_current();
        trainer
    }

    fn load_current(&mut self) {
        self.session = None;
        let Some(record) = self
            .visible
            .get(self.index)
            .and_then(|&i| self.puzzles.get(i))
            .cloned()
        else {
            info!("[PUZZLE] No puzzles match '{}'", self.config.category);
            return;
        };
        match PuzzleSession::load_with(
            self.rules.clone(),
            record,
            self.config.reply_delay,
            self.config.first_move,
        ) {
            Ok(session) => self.session = Some(session),
            Err(e) => error!("[PUZZLE] {}", e),
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Puzzles visible under the current filter
    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn total(&self) -> usize {
        self.puzzles.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn category(&self) -> PuzzleCategory {
        self.config.category
    }

    pub fn current(&self) -> Option<&PuzzleRecord> {
        self.session.as_ref().map(|session| session.record())
    }

    pub fn session(&self) -> Option<&PuzzleSession<R>> {
        self.session.as_ref()
    }

    pub fn status(&self) -> Option<PuzzleStatus> {
        self.session.as_ref().map(|session| session.status())
    }

    pub fn is_solved(&self, id: &str) -> bool {
        self.solved.contains(id)
    }

    pub fn solved_count(&self) -> usize {
        self.solved.len()
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn next(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        self.index = (self.index + 1) % self.visible.len();
        self.load_current();
    }

    pub fn previous(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        self.index = self
            .index
            .checked_sub(1)
            .unwrap_or(self.visible.len() - 1);
        self.load_current();
    }

    /// Jump to position `index` of the filtered list
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.visible.len() {
            return false;
        }
        self.index = index;
        self.load_current();
        true
    }

    /// Filter by category key; unknown keys show everything
    pub fn set_filter(&mut self, key: &str) {
        self.set_category(PuzzleCategory::from_key(key));
    }

    pub fn set_category(&mut self, category: PuzzleCategory) {
        self.config.category = category;
        self.visible = filter_indices(&self.puzzles, category);
        self.index = 0;
        info!(
            "[PUZZLE] Filter '{}': {} of {} puzzles",
            category,
            self.visible.len(),
            self.puzzles.len()
        );
        self.load_current();
    }

    pub fn restart(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if let Err(e) = session.restart() {
                error!("[PUZZLE] {}", e);
            }
        }
    }

    pub fn clear_solved(&mut self) {
        self.solved.clear();
    }

    // ------------------------------------------------------------------
    // Forwarded input
    // ------------------------------------------------------------------

    fn record_solved(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if session.status() == PuzzleStatus::Solved && self.solved.insert(session.id().to_string())
        {
            info!(
                "[PUZZLE] {} added to solved set ({} total)",
                session.id(),
                self.solved.len()
            );
        }
    }

    pub fn select_or_move(&mut self, square: Square) -> Interaction {
        let interaction = self
            .session
            .as_mut()
            .map_or(Interaction::Ignored, |session| session.select_or_move(square));
        self.record_solved();
        interaction
    }

    pub fn drag_move(&mut self, from: Square, to: Square) -> Interaction {
        let interaction = self
            .session
            .as_mut()
            .map_or(Interaction::Ignored, |session| session.drag_move(from, to));
        self.record_solved();
        interaction
    }

    pub fn choose_promotion(&mut self, kind: PieceKind) -> GameResult<Interaction> {
        let session = self.session.as_mut().ok_or(GameError::NoPromotionPending)?;
        let result = session.choose_promotion(kind);
        self.record_solved();
        result
    }

    pub fn cancel_promotion(&mut self) -> bool {
        self.session
            .as_mut()
            .is_some_and(|session| session.cancel_promotion())
    }

    pub fn complete_animation(&mut self) -> Option<CommitKind> {
        let kind = self.session.as_mut()?.complete_animation();
        self.record_solved();
        kind
    }

    pub fn update(&mut self, delta: Duration) {
        if let Some(session) = self.session.as_mut() {
            session.update(delta);
        }
        self.record_solved();
    }

    pub fn request_hint(&mut self) -> Option<Hint> {
        self.session.as_mut()?.request_hint()
    }

    pub fn drain_events(&mut self) -> Vec<SurfaceEvent> {
        self.session
            .as_mut()
            .map(|session| session.drain_events())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::rules::{ShakmatyRules, STARTING_FEN};

    fn puzzle(id: &str, solution: &str, tags: &str) -> PuzzleRecord {
        PuzzleRecord {
            id: id.to_string(),
            position: STARTING_FEN.to_string(),
            solution_moves: solution.to_string(),
            rating: 1000,
            tags: tags.to_string(),
            player_side: None,
        }
    }

    fn trainer() -> PuzzleTrainer<ShakmatyRules> {
        PuzzleTrainer::new(
            ShakmatyRules::new(),
            vec![
                puzzle("p1", "e2e4", "opening short"),
                puzzle("p2", "d2d4", "opening"),
                puzzle("p3", "g1f3", "middlegame fork"),
            ],
            PuzzleConfig::default(),
        )
    }

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn test_navigation_wraps() {
        let mut trainer = trainer();
        assert_eq!(trainer.current().map(|p| p.id.as_str()), Some("p1"));
        trainer.previous();
        assert_eq!(trainer.current().map(|p| p.id.as_str()), Some("p3"));
        trainer.next();
        assert_eq!(trainer.index(), 0);
        assert!(trainer.select(1));
        assert_eq!(trainer.current().map(|p| p.id.as_str()), Some("p2"));
        assert!(!trainer.select(3));
    }

    #[test]
    fn test_filter_resets_index() {
        let mut trainer = trainer();
        trainer.select(2);
        trainer.set_filter("opening");
        assert_eq!(trainer.index(), 0);
        assert_eq!(trainer.len(), 2);
        trainer.set_filter("fork");
        assert_eq!(trainer.current().map(|p| p.id.as_str()), Some("p3"));
        trainer.set_filter("no-such-theme");
        assert_eq!(trainer.category(), PuzzleCategory::All);
        assert_eq!(trainer.len(), 3);
    }

    #[test]
    fn test_empty_filter_has_no_session() {
        let mut trainer = trainer();
        trainer.set_filter("skewer");
        assert!(trainer.is_empty());
        assert!(trainer.session().is_none());
        assert_eq!(trainer.select_or_move(sq("e2")), Interaction::Ignored);
        trainer.next();
    }

    #[test]
    fn test_solved_set_accumulates_and_clears() {
        let mut trainer = trainer();
        trainer.drag_move(sq("e2"), sq("e4"));
        assert_eq!(trainer.status(), Some(PuzzleStatus::Solved));
        assert!(trainer.is_solved("p1"));

        trainer.next();
        assert!(trainer.is_solved("p1"));
        assert!(!trainer.is_solved("p2"));

        trainer.clear_solved();
        assert_eq!(trainer.solved_count(), 0);
    }
}
