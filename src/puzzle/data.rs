//! Puzzle data contract
//!
//! Puzzles arrive as a JSON array of records:
//!
//! ```json
//! [{
//!   "id": "00sHx",
//!   "position": "q3k1nr/1pp1nQpp/3p4/1P2p3/4P3/B1PP1b2/B5PP/5K2 b k -",
//!   "solutionMoves": "e8d7 a2e6 d7d8 f7f8",
//!   "rating": 1760,
//!   "tags": "mate mateIn2 middlegame short",
//!   "playerSide": "w"
//! }]
//! ```
//!
//! `position` may omit the halfmove and fullmove fields. `playerSide` is
//! optional; when it names the side *not* on move, the first solution move is
//! the opponent's setup move.
//!
//! A record without `playerSide` cannot say on its own whether its first move
//! is the solver's or a setup move. The trainer decides with its [`FirstMove`]
//! setting: by default the side to move solves, while collections that store
//! the position before the opponent's blunder need [`FirstMove::Opponent`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::game::error::GameError;
use crate::game::types::Side;

/// Errors raised while loading puzzle data
#[derive(Error, Debug)]
pub enum PuzzleError {
    #[error("Puzzle file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Puzzle data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The starting position could not be loaded into the rule engine
    #[error("Puzzle {id} has an invalid position: {source}")]
    InvalidPosition {
        id: String,
        #[source]
        source: GameError,
    },
}

pub type PuzzleResult<T> = Result<T, PuzzleError>;

/// Who owns the first solution move of a puzzle without `playerSide`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirstMove {
    /// The side to move is the solver
    #[default]
    Player,
    /// The first move is the opponent's setup move
    Opponent,
}

impl FirstMove {
    /// Solver's side for a puzzle whose start position has `side_to_move`
    pub fn player_side(self, side_to_move: Side) -> Side {
        match self {
            FirstMove::Player => side_to_move,
            FirstMove::Opponent => side_to_move.opposite(),
        }
    }
}

/// One puzzle as stored by the puzzle source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleRecord {
    pub id: String,
    #[serde(alias = "fen")]
    pub position: String,
    /// Space-separated coordinate moves (`"e2e4 e7e5"`)
    pub solution_moves: String,
    #[serde(default)]
    pub rating: u32,
    /// Space-separated tag list
    #[serde(default)]
    pub tags: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_side: Option<Side>,
}

impl PuzzleRecord {
    pub fn solution_list(&self) -> impl Iterator<Item = &str> {
        self.solution_moves.split_whitespace()
    }

    pub fn tag_list(&self) -> impl Iterator<Item = &str> {
        self.tags.split_whitespace()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag_list().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Parse a JSON array of puzzle records
pub fn parse_puzzles(json: &str) -> PuzzleResult<Vec<PuzzleRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a puzzle file
pub fn load_puzzles(path: impl AsRef<Path>) -> PuzzleResult<Vec<PuzzleRecord>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let puzzles = parse_puzzles(&contents)?;
    info!("[PUZZLE] Loaded {} puzzles from {:?}", puzzles.len(), path);
    Ok(puzzles)
}
