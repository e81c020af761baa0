//! Puzzle category filters
//!
//! A category key selected by the caller maps to a fixed set of puzzle tags.
//! A puzzle belongs to the category when any of its tags is in that set.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use super::data::PuzzleRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PuzzleCategory {
    #[default]
    All,
    Mate,
    Fork,
    Pin,
    Skewer,
    Discovered,
    Sacrifice,
    Endgame,
    Opening,
    Middlegame,
    Short,
    Long,
}

impl PuzzleCategory {
    pub const ALL: [PuzzleCategory; 12] = [
        PuzzleCategory::All,
        PuzzleCategory::Mate,
        PuzzleCategory::Fork,
        PuzzleCategory::Pin,
        PuzzleCategory::Skewer,
        PuzzleCategory::Discovered,
        PuzzleCategory::Sacrifice,
        PuzzleCategory::Endgame,
        PuzzleCategory::Opening,
        PuzzleCategory::Middlegame,
        PuzzleCategory::Short,
        PuzzleCategory::Long,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PuzzleCategory::All => "all",
            PuzzleCategory::Mate => "mate",
            PuzzleCategory::Fork => "fork",
            PuzzleCategory::Pin => "pin",
            PuzzleCategory::Skewer => "skewer",
            PuzzleCategory::Discovered => "discovered",
            PuzzleCategory::Sacrifice => "sacrifice",
            PuzzleCategory::Endgame => "endgame",
            PuzzleCategory::Opening => "opening",
            PuzzleCategory::Middlegame => "middlegame",
            PuzzleCategory::Short => "short",
            PuzzleCategory::Long => "long",
        }
    }

    /// Category for a key, `None` if unknown
    pub fn parse_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.key().eq_ignore_ascii_case(key))
    }

    /// Category for a key; unknown keys fall back to [`PuzzleCategory::All`]
    pub fn from_key(key: &str) -> Self {
        Self::parse_key(key).unwrap_or_else(|| {
            warn!("[PUZZLE] Unknown filter '{}', showing all puzzles", key);
            PuzzleCategory::All
        })
    }

    /// Tags that place a puzzle in this category; empty for `All`
    pub fn tags(self) -> &'static [&'static str] {
        match self {
            PuzzleCategory::All => &[],
            PuzzleCategory::Mate => &[
                "mate",
                "mateIn1",
                "mateIn2",
                "mateIn3",
                "mateIn4",
                "mateIn5",
                "backRankMate",
                "smotheredMate",
                "anastasiaMate",
                "arabianMate",
                "hookMate",
            ],
            PuzzleCategory::Fork => &["fork"],
            PuzzleCategory::Pin => &["pin"],
            PuzzleCategory::Skewer => &["skewer"],
            PuzzleCategory::Discovered => &["discoveredAttack", "doubleCheck"],
            PuzzleCategory::Sacrifice => &["sacrifice"],
            PuzzleCategory::Endgame => &[
                "endgame",
                "pawnEndgame",
                "rookEndgame",
                "bishopEndgame",
                "knightEndgame",
                "queenEndgame",
                "queenRookEndgame",
            ],
            PuzzleCategory::Opening => &["opening"],
            PuzzleCategory::Middlegame => &["middlegame"],
            PuzzleCategory::Short => &["oneMove", "short"],
            PuzzleCategory::Long => &["long", "veryLong"],
        }
    }

    pub fn matches(self, puzzle: &PuzzleRecord) -> bool {
        match self {
            PuzzleCategory::All => true,
            category => category.tags().iter().any(|tag| puzzle.has_tag(tag)),
        }
    }
}

impl fmt::Display for PuzzleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Indices of the puzzles that belong to `category`, in source order
pub fn filter_indices(puzzles: &[PuzzleRecord], category: PuzzleCategory) -> Vec<usize> {
    puzzles
        .iter()
        .enumerate()
        .filter(|(_, puzzle)| category.matches(puzzle))
        .map(|(index, _)| index)
        .collect()
}
