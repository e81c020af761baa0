//! Terminal result detection
//!
//! After every accepted move the pipeline asks the rule engine whether the game
//! has ended. Each draw condition keeps its own reason so the presentation
//! layer can say *why* the game was drawn.
//!
//! # Detection order
//!
//! 1. Checkmate (the side that just moved wins)
//! 2. Stalemate
//! 3. Insufficient material
//! 4. Threefold repetition
//! 5. Fifty-move rule

use serde::Serialize;

use crate::game::rules::RulesEngine;
use crate::game::types::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DrawReason {
    Stalemate,
    InsufficientMaterial,
    ThreefoldRepetition,
    FiftyMoveRule,
}

impl DrawReason {
    pub fn message(self) -> &'static str {
        match self {
            DrawReason::Stalemate => "Draw by stalemate",
            DrawReason::InsufficientMaterial => "Draw by insufficient material",
            DrawReason::ThreefoldRepetition => "Draw by threefold repetition",
            DrawReason::FiftyMoveRule => "Draw by the fifty-move rule",
        }
    }
}

/// How a finished game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Checkmate { winner: Side },
    Draw(DrawReason),
}

impl GameOutcome {
    pub fn winner(self) -> Option<Side> {
        match self {
            GameOutcome::Checkmate { winner } => Some(winner),
            GameOutcome::Draw(_) => None,
        }
    }

    pub fn is_checkmate(self) -> bool {
        matches!(self, GameOutcome::Checkmate { .. })
    }

    pub fn is_draw(self) -> bool {
        matches!(self, GameOutcome::Draw(_))
    }

    pub fn draw_reason(self) -> Option<DrawReason> {
        match self {
            GameOutcome::Draw(reason) => Some(reason),
            GameOutcome::Checkmate { .. } => None,
        }
    }

    pub fn message(self) -> String {
        match self {
            GameOutcome::Checkmate { winner } => format!("{winner} wins by checkmate!"),
            GameOutcome::Draw(reason) => reason.message().to_string(),
        }
    }

    /// Flattened shape handed to the presentation layer when a game ends
    pub fn report(self) -> GameEndReport {
        GameEndReport {
            game_over: true,
            winner: self.winner(),
            is_checkmate: self.is_checkmate(),
            is_draw: self.is_draw(),
            draw_reason: self.draw_reason(),
        }
    }
}

/// `{gameOver, winner, isCheckmate, isDraw, drawReason?}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEndReport {
    pub game_over: bool,
    pub winner: Option<Side>,
    pub is_checkmate: bool,
    pub is_draw: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw_reason: Option<DrawReason>,
}

/// Ask the rule engine whether the current position is terminal
pub fn detect_outcome<R: RulesEngine>(rules: &R) -> Option<GameOutcome> {
    if rules.is_checkmate() {
        return Some(GameOutcome::Checkmate {
            winner: rules.turn().opposite(),
        });
    }
    if rules.is_stalemate() {
        return Some(GameOutcome::Draw(DrawReason::Stalemate));
    }
    if rules.is_insufficient_material() {
        return Some(GameOutcome::Draw(DrawReason::InsufficientMaterial));
    }
    if rules.is_threefold_repetition() {
        return Some(GameOutcome::Draw(DrawReason::ThreefoldRepetition));
    }
    if rules.is_fifty_moves() {
        return Some(GameOutcome::Draw(DrawReason::FiftyMoveRule));
    }
    None
}
