//! Position-string normalization
//!
//! Puzzle sources frequently drop the halfmove clock and fullmove number. The
//! rule engine wants all six fields, so missing counters are defaulted to `0`
//! and `1`.

use crate::game::error::{GameError, GameResult};

/// Standard starting position
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Complete a 4- or 5-field position string to the 6-field form
///
/// Extra whitespace is collapsed. Fewer than four fields or more than six is
/// rejected.
pub fn normalize_fen(fen: &str) -> GameResult<String> {
    let mut fields: Vec<&str> = fen.split_whitespace().collect();
    match fields.len() {
        4 => fields.extend(["0", "1"]),
        5 => fields.push("1"),
        6 => {}
        n => {
            return Err(GameError::InvalidPosition {
                fen: fen.to_string(),
                message: format!("expected 4 to 6 fields, found {n}"),
            })
        }
    }
    Ok(fields.join(" "))
}
