//! [`RulesEngine`] implementation on top of the `shakmaty` crate
//!
//! `shakmaty` positions are immutable values, so undo is a stack of previous
//! positions. Repetition is counted on the first four position-string fields
//! (placement, side to move, castling rights, en-passant target).

use std::collections::HashMap;

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position, Role};
use tracing::debug;

use super::{normalize_fen, BoardGrid, LegalMove, RulesEngine};
use crate::game::error::{GameError, GameResult};
use crate::game::types::{MoveInput, MoveRecord, Piece, PieceKind, Side, Square};

#[derive(Debug, Clone)]
struct UndoEntry {
    previous: Chess,
    record: MoveRecord,
}

/// Rule engine backed by `shakmaty::Chess`
#[derive(Debug, Clone)]
pub struct ShakmatyRules {
    position: Chess,
    undo_stack: Vec<UndoEntry>,
    repetitions: HashMap<String, u32>,
}

impl Default for ShakmatyRules {
    fn default() -> Self {
        let mut rules = Self {
            position: Chess::default(),
            undo_stack: Vec::new(),
            repetitions: HashMap::new(),
        };
        rules.record_repetition();
        rules
    }
}

impl ShakmatyRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an engine already loaded with `fen`
    pub fn from_fen(fen: &str) -> GameResult<Self> {
        let mut rules = Self::default();
        rules.load(fen)?;
        Ok(rules)
    }

    fn repetition_key(&self) -> String {
        let fen = self.fen();
        fen.split(' ').take(4).collect::<Vec<_>>().join(" ")
    }

    fn record_repetition(&mut self) {
        *self.repetitions.entry(self.repetition_key()).or_insert(0) += 1;
    }

    fn forget_repetition(&mut self) {
        let key = self.repetition_key();
        if let Some(count) = self.repetitions.get_mut(&key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.repetitions.remove(&key);
            }
        }
    }

    fn legal_move(&self, mv: MoveInput) -> GameResult<Move> {
        let uci = UciMove::Normal {
            from: to_shakmaty_square(mv.from),
            to: to_shakmaty_square(mv.to),
            promotion: mv.promotion.map(to_role),
        };
        uci.to_move(&self.position)
            .map_err(|err| GameError::IllegalMove {
                message: format!("{mv}: {err}"),
            })
    }

    /// SAN with `+`/`#` suffix for a move legal in the current position
    fn san_of(&self, m: &Move) -> String {
        SanPlus::from_move(self.position.clone(), m.clone()).to_string()
    }

    fn legal_entry(&self, m: &Move) -> Option<LegalMove> {
        let (from, to, promotion) = standard_coordinates(m)?;
        Some(LegalMove {
            from: from_shakmaty_square(from),
            to: from_shakmaty_square(to),
            promotion: promotion.map(from_role),
            san: self.san_of(m),
        })
    }
}

impl RulesEngine for ShakmatyRules {
    fn load(&mut self, fen: &str) -> GameResult<()> {
        let normalized = normalize_fen(fen)?;
        let parsed: Fen = normalized
            .parse()
            .map_err(|err: shakmaty::fen::ParseFenError| GameError::InvalidPosition {
                fen: normalized.clone(),
                message: err.to_string(),
            })?;
        let position: Chess =
            parsed
                .into_position(CastlingMode::Standard)
                .map_err(|err| GameError::InvalidPosition {
                    fen: normalized.clone(),
                    message: err.to_string(),
                })?;

        self.position = position;
        self.undo_stack.clear();
        self.repetitions.clear();
        self.record_repetition();
        debug!("[RULES] Loaded position {}", normalized);
        Ok(())
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn play(&mut self, mv: MoveInput) -> GameResult<MoveRecord> {
        let m = self.legal_move(mv)?;
        let piece = self
            .piece_at(mv.from)
            .ok_or(GameError::NoPieceAt { square: mv.from })?;
        let san = self.san_of(&m);
        let next = self
            .position
            .clone()
            .play(m.clone())
            .map_err(|err| GameError::IllegalMove {
                message: err.to_string(),
            })?;

        let record = MoveRecord {
            from: mv.from,
            to: mv.to,
            piece,
            captured: m.capture().map(from_role),
            promotion: m.promotion().map(from_role),
            san,
        };
        let previous = std::mem::replace(&mut self.position, next);
        self.undo_stack.push(UndoEntry {
            previous,
            record: record.clone(),
        });
        self.record_repetition();
        Ok(record)
    }

    fn undo(&mut self) -> Option<MoveRecord> {
        let entry = self.undo_stack.pop()?;
        self.forget_repetition();
        self.position = entry.previous;
        Some(entry.record)
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position
            .board()
            .piece_at(to_shakmaty_square(square))
            .map(from_shakmaty_piece)
    }

    fn moves_from(&self, square: Square) -> Vec<LegalMove> {
        let origin = to_shakmaty_square(square);
        self.position
            .legal_moves()
            .iter()
            .filter(|m| m.from() == Some(origin))
            .filter_map(|m| self.legal_entry(m))
            .collect()
    }

    fn resolve_notation(&self, notation: &str) -> Option<MoveInput> {
        let text = notation.trim();
        if let Ok(mv) = text.parse::<MoveInput>() {
            return self.legal_move(mv).ok().map(|_| mv);
        }
        let san: SanPlus = text.parse().ok()?;
        let m = san.san.to_move(&self.position).ok()?;
        let (from, to, promotion) = standard_coordinates(&m)?;
        Some(MoveInput {
            from: from_shakmaty_square(from),
            to: from_shakmaty_square(to),
            promotion: promotion.map(from_role),
        })
    }

    fn turn(&self) -> Side {
        from_color(self.position.turn())
    }

    fn fen(&self) -> String {
        Fen::from_position(&self.position, EnPassantMode::Legal).to_string()
    }

    fn board(&self) -> BoardGrid {
        let mut grid: BoardGrid = [[None; 8]; 8];
        for (row, cells) in grid.iter_mut().enumerate() {
            for (file, cell) in cells.iter_mut().enumerate() {
                let rank = 7 - row as u8;
                *cell = Square::new(file as u8, rank).and_then(|sq| self.piece_at(sq));
            }
        }
        grid
    }

    fn in_check(&self) -> bool {
        self.position.is_check()
    }

    fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    fn is_insufficient_material(&self) -> bool {
        self.position.is_insufficient_material()
    }

    fn is_threefold_repetition(&self) -> bool {
        self.repetitions
            .get(&self.repetition_key())
            .is_some_and(|&count| count >= 3)
    }

    fn is_fifty_moves(&self) -> bool {
        self.position.halfmoves() >= 100
    }
}

/// Origin, king-destination-style target, and promotion of a shakmaty move
///
/// Castling is reported as the king's two-square step (`e1g1`), not the
/// king-takes-rook encoding shakmaty uses internally.
fn standard_coordinates(
    m: &Move,
) -> Option<(shakmaty::Square, shakmaty::Square, Option<Role>)> {
    match m.to_uci(CastlingMode::Standard) {
        UciMove::Normal {
            from,
            to,
            promotion,
        } => Some((from, to, promotion)),
        _ => None,
    }
}

fn to_shakmaty_square(square: Square) -> shakmaty::Square {
    shakmaty::Square::new(u32::from(square.index()))
}

fn from_shakmaty_square(square: shakmaty::Square) -> Square {
    Square::wrapping(square as u8)
}

fn from_color(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

fn from_role(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}

fn to_role(kind: PieceKind) -> Role {
    match kind {
        PieceKind::Pawn => Role::Pawn,
        PieceKind::Knight => Role::Knight,
        PieceKind::Bishop => Role::Bishop,
        PieceKind::Rook => Role::Rook,
        PieceKind::Queen => Role::Queen,
        PieceKind::King => Role::King,
    }
}

fn from_shakmaty_piece(piece: shakmaty::Piece) -> Piece {
    Piece {
        kind: from_role(piece.role),
        side: from_color(piece.color),
    }
}
