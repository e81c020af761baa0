//! Board vocabulary shared by the pipeline, the engine adapters, and the puzzle trainer
//!
//! These types are deliberately independent of any particular rules library so
//! that every [`RulesEngine`](crate::game::rules::RulesEngine) and
//! [`SearchEngine`](crate::game::ai::SearchEngine) implementation, including
//! test doubles, speaks the same language.
//!
//! # Coordinates
//!
//! - `file`: 0 (file 'a') to 7 (file 'h')
//! - `rank`: 0 (rank 1) to 7 (rank 8)
//! - Squares print and parse in algebraic form (`"e4"`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::game::error::GameError;

/// Side to move / piece color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "w", alias = "white")]
    White,
    #[serde(rename = "b", alias = "black")]
    Black,
}

impl Side {
    /// The opposing side
    pub fn opposite(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Single-letter code used in position strings (`'w'` / `'b'`)
    pub fn code(self) -> char {
        match self {
            Side::White => 'w',
            Side::Black => 'b',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'w' | 'W' => Some(Side::White),
            'b' | 'B' => Some(Side::Black),
            _ => None,
        }
    }

    /// Rank index a pawn of this side promotes on
    pub fn promotion_rank(self) -> u8 {
        match self {
            Side::White => 7,
            Side::Black => 0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => f.write_str("White"),
            Side::Black => f.write_str("Black"),
        }
    }
}

/// Piece role without color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Lowercase letter used in coordinate notation (`q` in `e7e8q`)
    pub fn char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    /// Whether a pawn may promote to this piece
    pub fn is_promotion_choice(self) -> bool {
        matches!(
            self,
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen
        )
    }
}

/// A colored piece as reported by the rule engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
}

impl Piece {
    pub fn new(kind: PieceKind, side: Side) -> Self {
        Self { kind, side }
    }
}

/// Board square, stored as `rank * 8 + file`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square(u8);

impl Square {
    /// Create a square from zero-based file and rank, `None` when off the board
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then(|| Square(rank * 8 + file))
    }

    pub fn from_index(index: u8) -> Option<Self> {
        (index < 64).then_some(Square(index))
    }

    /// Square from an index already known to be in `0..64`
    pub(crate) fn wrapping(index: u8) -> Self {
        Square(index % 64)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn file(self) -> u8 {
        self.0 % 8
    }

    pub fn rank(self) -> u8 {
        self.0 / 8
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + self.file()) as char,
            (b'1' + self.rank()) as char
        )
    }
}

impl FromStr for Square {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(GameError::InvalidNotation {
                notation: s.to_string(),
            });
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        Square::new(file, rank).ok_or_else(|| GameError::InvalidNotation {
            notation: s.to_string(),
        })
    }
}

impl TryFrom<String> for Square {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.to_string()
    }
}

/// A move in coordinate form: origin, destination, optional promotion piece
///
/// This is the shape of input events, of search engine replies, and of the
/// compact puzzle solution encoding (`"e2e4"`, `"e7e8q"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveInput {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl MoveInput {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, promotion: Option<PieceKind>) -> Self {
        self.promotion = promotion;
        self
    }
}

impl fmt::Display for MoveInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.char())?;
        }
        Ok(())
    }
}

impl FromStr for MoveInput {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GameError::InvalidNotation {
            notation: s.to_string(),
        };
        let s = s.trim();
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(invalid());
        }
        let from: Square = s[0..2].parse().map_err(|_| invalid())?;
        let to: Square = s[2..4].parse().map_err(|_| invalid())?;
        let promotion = match s[4..].chars().next() {
            Some(c) => Some(
                PieceKind::from_char(c)
                    .filter(|kind| kind.is_promotion_choice())
                    .ok_or_else(invalid)?,
            ),
            None => None,
        };
        Ok(MoveInput {
            from,
            to,
            promotion,
        })
    }
}

/// A committed move as stored in the move history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    /// Standard algebraic notation including check / mate suffix
    pub san: String,
}

/// Animation payload handed to the presentation layer
///
/// The presentation layer plays the transition and must then call
/// `complete_animation()` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationRequest {
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_parse_and_display() {
        let e4: Square = "e4".parse().unwrap();
        assert_eq!(e4.file(), 4);
        assert_eq!(e4.rank(), 3);
        assert_eq!(e4.to_string(), "e4");
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("e".parse::<Square>().is_err());
    }

    #[test]
    fn test_square_rejects_letter_rank() {
        //! Far-off-board coordinates are refused, not computed
        assert!("xd".parse::<Square>().is_err());
        assert!("ez".parse::<Square>().is_err());
        assert_eq!(Square::new(200, 200), None);
        assert!("exd5".parse::<MoveInput>().is_err());
        assert!("help".parse::<MoveInput>().is_err());
    }

    #[test]
    fn test_move_input_parses_promotion_suffix() {
        let mv: MoveInput = "e7e8q".parse().unwrap();
        assert_eq!(mv.from.to_string(), "e7");
        assert_eq!(mv.to.to_string(), "e8");
        assert_eq!(mv.promotion, Some(PieceKind::Queen));
        assert_eq!(mv.to_string(), "e7e8q");

        // A king is never a valid promotion target
        assert!("e7e8k".parse::<MoveInput>().is_err());
        assert!("e2e4e5".parse::<MoveInput>().is_err());
    }

    #[test]
    fn test_side_helpers() {
        assert_eq!(Side::White.opposite(), Side::Black);
        assert_eq!(Side::from_code('b'), Some(Side::Black));
        assert_eq!(Side::Black.promotion_rank(), 0);
        assert_eq!(Side::White.code(), 'w');
    }
}
