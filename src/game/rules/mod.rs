//! Rule Engine Adapter - the chess legality boundary
//!
//! The practice layer never decides chess legality on its own. Every question
//! about the board (which moves exist, what a move is called, whether the game
//! is over) goes through a [`RulesEngine`], and a conforming implementation can
//! be swapped in freely: the shipped [`ShakmatyRules`] or a test double.
//!
//! # Module Structure
//!
//! - `position` - position-string normalization (4/5-field inputs completed to 6)
//! - `shakmaty_rules` - [`RulesEngine`] backed by the `shakmaty` crate
//!
//! # Contract
//!
//! `play` is the only mutating call besides `load`/`reset`/`undo`. A rejected
//! move returns [`GameError::IllegalMove`](crate::game::error::GameError) and
//! leaves the engine untouched. `undo` reverts exactly one successful `play`.

pub mod position;
pub mod shakmaty_rules;


use crate::game::error::GameResult;
use crate::game::types::{MoveInput, MoveRecord, Piece, PieceKind, Side, Square};

pub use position::{normalize_fen, STARTING_FEN};
pub use shakmaty_rules::ShakmatyRules;

/// 8x8 grid as returned by [`RulesEngine::board`]; row 0 is rank 8, column 0 is file a
pub type BoardGrid = [[Option<Piece>; 8]; 8];

/// One legal move from a given origin, as listed by [`RulesEngine::moves_from`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegalMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
    pub san: String,
}

impl LegalMove {
    pub fn input(&self) -> MoveInput {
        MoveInput {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }
}

/// Chess rules collaborator consumed by the pipeline and puzzle trainer
///
/// `Clone` provides the scratch copies used for non-mutating checks (solution
/// parsing, hint computation) so the live engine is never disturbed.
pub trait RulesEngine: Clone {
    /// Load a position string; 4- and 5-field inputs are completed first
    fn load(&mut self, fen: &str) -> GameResult<()>;

    /// Return to the standard starting position and forget all history
    fn reset(&mut self);

    /// Apply a move, returning its history record (SAN includes `+`/`#`)
    fn play(&mut self, mv: MoveInput) -> GameResult<MoveRecord>;

    /// Revert the last successful `play`
    fn undo(&mut self) -> Option<MoveRecord>;

    fn piece_at(&self, square: Square) -> Option<Piece>;

    /// All legal moves starting on `square`, one entry per promotion choice
    fn moves_from(&self, square: Square) -> Vec<LegalMove>;

    /// Resolve SAN (`"Nf3"`, `"exd8=Q+"`) or coordinate (`"g1f3"`) text to a legal move
    fn resolve_notation(&self, notation: &str) -> Option<MoveInput>;

    fn turn(&self) -> Side;

    /// Current position as a six-field position string
    fn fen(&self) -> String;

    fn board(&self) -> BoardGrid;

    fn in_check(&self) -> bool;
    fn is_checkmate(&self) -> bool;
    fn is_stalemate(&self) -> bool;
    fn is_insufficient_material(&self) -> bool;
    fn is_threefold_repetition(&self) -> bool;

    /// Fifty-move rule (halfmove clock reached 100)
    fn is_fifty_moves(&self) -> bool;

    fn is_draw(&self) -> bool {
        self.is_stalemate()
            || self.is_insufficient_material()
            || self.is_threefold_repetition()
            || self.is_fifty_moves()
    }

    fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }

    /// Every legal move for the side to move
    fn all_moves(&self) -> Vec<LegalMove> {
        let side = self.turn();
        (0..64)
            .filter_map(Square::from_index)
            .filter(|&sq| self.piece_at(sq).is_some_and(|p| p.side == side))
            .flat_map(|sq| self.moves_from(sq))
            .collect()
    }
}
