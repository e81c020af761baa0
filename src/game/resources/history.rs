//! Move history tracking resource
//!
//! Maintains the chronological record of committed moves. Entries are appended
//! at the moment a move is accepted by the pipeline (before its animation
//! finishes), so the history always matches the rule engine's move stack.
//!
//! # Integration
//!
//! - Written by [`crate::game::pipeline::MoveCommitPipeline::make_move`]
//! - Read by the surfaces to render move lists (the blindfold surface prints it)

use crate::game::types::{MoveRecord, Side, Square};

/// Ordered list of all moves made since the position was loaded
#[derive(Debug, Default, Clone)]
pub struct MoveHistory {
    /// Index 0 is the first ply after the loaded position
    pub moves: Vec<MoveRecord>,
}

impl MoveHistory {
    pub fn add_move(&mut self, record: MoveRecord) {
        self.moves.push(record);
    }

    /// Get the most recent move, if any
    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.moves.last()
    }

    /// Origin and destination of the last move, for highlighting
    pub fn last_squares(&self) -> Option<(Square, Square)> {
        self.last_move().map(|record| (record.from, record.to))
    }

    /// Number of half-moves (ply) recorded
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MoveRecord> {
        self.moves.iter()
    }

    /// SAN list in play order
    pub fn san_list(&self) -> Vec<&str> {
        self.moves.iter().map(|record| record.san.as_str()).collect()
    }

    /// Move list text such as `1. e4 e5 2. Nf3`
    ///
    /// `first_side` is the side that made the first recorded move and
    /// `first_number` its fullmove number, so lists that begin with a Black
    /// move render as `1... e5`.
    pub fn numbered_text(&self, first_side: Side, first_number: u32) -> String {
        let mut out = String::new();
        let mut number = first_number;
        let mut side = first_side;
        for (i, record) in self.moves.iter().enumerate() {
            match side {
                Side::White => {
                    if i > 0 {
                        out.push(' ');
                    }
                    out.push_str(&format!("{number}. {}", record.san));
                }
                Side::Black => {
                    if i == 0 {
                        out.push_str(&format!("{number}... {}", record.san));
                    } else {
                        out.push(' ');
                        out.push_str(&record.san);
                    }
                    number += 1;
                }
            }
            side = side.opposite();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::{Piece, PieceKind};

    fn record(from: &str, to: &str, side: Side, san: &str) -> MoveRecord {
        MoveRecord {
            from: from.parse().unwrap(),
            to: to.parse().unwrap(),
            piece: Piece::new(PieceKind::Pawn, side),
            captured: None,
            promotion: None,
            san: san.to_string(),
        }
    }

    #[test]
    fn test_move_history_default() {
        //! Verifies MoveHistory starts empty
        let history = MoveHistory::default();

        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
        assert!(history.last_move().is_none());
        assert!(history.last_squares().is_none());
    }

    #[test]
    fn test_last_move_returns_correct_move() {
        let mut history = MoveHistory::default();
        history.add_move(record("e2", "e4", Side::White, "e4"));
        history.add_move(record("e7", "e5", Side::Black, "e5"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.last_move().unwrap().san, "e5");
        assert_eq!(
            history.last_squares(),
            Some(("e7".parse().unwrap(), "e5".parse().unwrap()))
        );
    }

    #[test]
    fn test_numbered_text_from_white() {
        let mut history = MoveHistory::default();
        history.add_move(record("e2", "e4", Side::White, "e4"));
        history.add_move(record("e7", "e5", Side::Black, "e5"));
        history.add_move(record("g1", "f3", Side::White, "Nf3"));

        assert_eq!(history.numbered_text(Side::White, 1), "1. e4 e5 2. Nf3");
        assert_eq!(history.san_list(), vec!["e4", "e5", "Nf3"]);
    }

    #[test]
    fn test_numbered_text_from_black() {
        let mut history = MoveHistory::default();
        history.add_move(record("e7", "e5", Side::Black, "e5"));
        history.add_move(record("g1", "f3", Side::White, "Nf3"));

        assert_eq!(history.numbered_text(Side::Black, 7), "7... e5 8. Nf3");
    }

    #[test]
    fn test_clear_history() {
        let mut history = MoveHistory::default();
        history.add_move(record("e2", "e4", Side::White, "e4"));
        history.clear();
        assert!(history.is_empty());
    }
}
