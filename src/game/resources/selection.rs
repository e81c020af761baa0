//! Selection resource for tracking the selected origin and its legal destinations

use crate::game::rules::LegalMove;
use crate::game::types::Square;

/// Currently selected origin square and where it may move
///
/// Destinations are deduplicated: a pawn on the seventh rank has four
/// promotion moves to the same square but only one highlighted destination.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Selection {
    pub origin: Option<Square>,
    pub destinations: Vec<Square>,
}

impl Selection {
    /// Select `origin` with the legal moves the rule engine listed for it
    pub fn select(&mut self, origin: Square, moves: &[LegalMove]) {
        self.origin = Some(origin);
        self.destinations.clear();
        for mv in moves {
            if !self.destinations.contains(&mv.to) {
                self.destinations.push(mv.to);
            }
        }
    }

    pub fn clear(&mut self) {
        self.origin = None;
        self.destinations.clear();
    }

    pub fn is_selected(&self) -> bool {
        self.origin.is_some()
    }

    pub fn can_reach(&self, square: Square) -> bool {
        self.destinations.contains(&square)
    }
}
