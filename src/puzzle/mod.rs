//! Puzzle trainer
//!
//! - `data` - puzzle records and JSON loading
//! - `filter` - category keys mapped to tag sets
//! - `session` - the verification state machine for one puzzle
//! - `trainer` - list, filter, navigation, and the solved set

pub mod data;
pub mod filter;
pub mod session;
pub mod trainer;

pub use data::{load_puzzles, parse_puzzles, FirstMove, PuzzleError, PuzzleRecord, PuzzleResult};
pub use filter::PuzzleCategory;
pub use session::{Hint, PuzzleSession, PuzzleStatus, MAX_HINT_LEVEL};
pub use trainer::{PuzzleConfig, PuzzleTrainer};
