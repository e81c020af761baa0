//! Pawn promotion request tracking
//!
//! When a pawn move would land on its last rank and no piece was chosen, the
//! move is suppressed and a [`PromotionRequest`] is raised instead. The UI
//! shows a piece picker; the move is only replayed once a piece is supplied.

use crate::game::types::{Piece, PieceKind, Side, Square};

/// Outstanding promotion choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionRequest {
    pub from: Square,
    pub to: Square,
    pub side: Side,
    /// Whether the eventual move should be animated (click path) or not (drag path)
    pub animate: bool,
}

/// Check if moving `piece` to `to` lands a pawn on its promotion rank
pub fn is_promotion_move(piece: Piece, to: Square) -> bool {
    piece.kind == PieceKind::Pawn && to.rank() == piece.side.promotion_rank()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotion_rank_by_color() {
        let white_pawn = Piece::new(PieceKind::Pawn, Side::White);
        let black_pawn = Piece::new(PieceKind::Pawn, Side::Black);

        assert!(is_promotion_move(white_pawn, "a8".parse().unwrap()));
        assert!(!is_promotion_move(white_pawn, "a1".parse().unwrap()));
        assert!(is_promotion_move(black_pawn, "h1".parse().unwrap()));
        assert!(!is_promotion_move(black_pawn, "h8".parse().unwrap()));
    }

    #[test]
    fn test_non_pawn_never_promotes() {
        let rook = Piece::new(PieceKind::Rook, Side::White);
        assert!(!is_promotion_move(rook, "a8".parse().unwrap()));
    }
}
