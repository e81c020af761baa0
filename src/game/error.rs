//! Error types for game module
//!
//! Provides custom error types for move validation and pipeline gating. None of
//! these are fatal: the interactive entry points translate them into selection
//! changes or status labels, and only the low-level `make_move` chokepoint
//! returns them to its caller.

use crate::game::types::Square;

/// Errors that can occur in game logic
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// A move animation has not been acknowledged yet
    #[error("A move is still being animated; wait for completeAnimation")]
    MoveInFlight,

    /// A promotion choice is outstanding
    #[error("A pawn promotion is waiting for a piece choice")]
    PromotionPending,

    /// Promotion choice supplied while nothing is pending
    #[error("No pawn promotion is pending")]
    NoPromotionPending,

    /// The game already reached a terminal result
    #[error("The game is over")]
    GameOver,

    /// Piece not found at expected square
    #[error("No piece at {square}")]
    NoPieceAt { square: Square },

    /// The piece belongs to the side that is not on move
    #[error("The piece on {square} does not belong to the side to move")]
    NotYourTurn { square: Square },

    /// Pawn reaches its last rank without a promotion piece
    #[error("Moving {from}{to} requires a promotion piece")]
    PromotionRequired { from: Square, to: Square },

    /// Rule engine rejected the move
    #[error("Invalid move: {message}")]
    IllegalMove { message: String },

    /// Position string could not be loaded
    #[error("Invalid position '{fen}': {message}")]
    InvalidPosition { fen: String, message: String },

    /// Move text could not be parsed or resolved
    #[error("Unrecognized move notation '{notation}'")]
    InvalidNotation { notation: String },
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
