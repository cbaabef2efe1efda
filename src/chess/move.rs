use bitflags::bitflags;

use super::{Color, Piece, PieceType, Square};

/// The two sides a king can castle towards.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum CastlingSide {
    Kingside = 0,
    Queenside = 1,
}

impl CastlingSide {
    pub const COUNT: usize = 2;

    pub const ALL: [CastlingSide; CastlingSide::COUNT] = [CastlingSide::Kingside, CastlingSide::Queenside];
}

impl From<CastlingSide> for usize {
    fn from(side: CastlingSide) -> Self {
        side as usize
    }
}

bitflags! {
    /// The set of castling rights still available in a position.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CastlingRight: u8 {
        const WHITE_KINGSIDE = 0b0001;
        const WHITE_QUEENSIDE = 0b0010;
        const BLACK_KINGSIDE = 0b0100;
        const BLACK_QUEENSIDE = 0b1000;
    }
}

impl CastlingRight {
    pub const COUNT: usize = 16;

    /// Returns the single castling right of `color` towards `side`.
    pub fn new(color: Color, side: CastlingSide) -> CastlingRight {
        match (color, side) {
            (Color::White, CastlingSide::Kingside) => CastlingRight::WHITE_KINGSIDE,
            (Color::White, CastlingSide::Queenside) => CastlingRight::WHITE_QUEENSIDE,
            (Color::Black, CastlingSide::Kingside) => CastlingRight::BLACK_KINGSIDE,
            (Color::Black, CastlingSide::Queenside) => CastlingRight::BLACK_QUEENSIDE,
        }
    }

    /// Returns the index of a single castling right, from 0 to 3.
    pub fn index(color: Color, side: CastlingSide) -> usize {
        usize::from(color) * CastlingSide::COUNT + usize::from(side)
    }
}

/// The different kinds of moves a piece can make.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum MoveType {
    Basic,
    Capture(Piece),
    Promotion(PieceType),
    CapturePromotion { capture: Piece, promotion: PieceType },
    TwoSquarePawnPush,
    EnPassant,
    Castling(CastlingSide),
    Drop,
}

/// A move of the rule engine.
///
/// Castling moves are encoded as the king capturing its own rook: `to_square` is the square of the castling rook, not
/// the destination of the king. Drops have the same origin and destination square.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Move {
    from_square: Square,
    to_square: Square,
    piece: Piece,
    move_type: MoveType,
}

impl Move {
    /// Creates a new move of the given type.
    pub fn new(from_square: Square, to_square: Square, piece: Piece, move_type: MoveType) -> Self {
        Self { from_square, to_square, piece, move_type }
    }

    /// Creates a new drop of `piece` on `square`.
    pub fn new_drop(square: Square, piece: Piece) -> Self {
        Self { from_square: square, to_square: square, piece, move_type: MoveType::Drop }
    }

    /// Returns the source square of the move.
    pub fn from_square(&self) -> Square {
        self.from_square
    }

    /// Returns the destination square of the move (the rook square for castling).
    pub fn to_square(&self) -> Square {
        self.to_square
    }

    /// Returns the piece that is moving.
    pub fn piece(&self) -> Piece {
        self.piece
    }

    /// Returns the type of move.
    pub fn move_type(&self) -> MoveType {
        self.move_type
    }

    /// Returns the piece captured by the move, if any. En passant captures report the captured pawn.
    pub fn captured(&self) -> Option<Piece> {
        match self.move_type {
            MoveType::Capture(capture) | MoveType::CapturePromotion { capture, .. } => Some(capture),
            MoveType::EnPassant => Some(Piece::new(!self.piece.color(), PieceType::Pawn)),
            _ => None,
        }
    }

    /// Returns the piece type the moving pawn promotes to, if any.
    pub fn promotion(&self) -> Option<PieceType> {
        match self.move_type {
            MoveType::Promotion(promotion) | MoveType::CapturePromotion { promotion, .. } => Some(promotion),
            _ => None,
        }
    }

    /// Returns the castling side of a castling move.
    pub fn castling_side(&self) -> Option<CastlingSide> {
        match self.move_type {
            MoveType::Castling(side) => Some(side),
            _ => None,
        }
    }

    /// Returns true if the move can never be taken back: captures, pawn moves, drops and castling.
    pub fn is_irreversible(&self) -> bool {
        self.captured().is_some()
            || self.piece.piece_type() == PieceType::Pawn
            || matches!(self.move_type, MoveType::Drop | MoveType::Castling(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::Color;

    fn sq(name: &str) -> Square {
        Square::try_from(name).unwrap()
    }

    #[test]
    fn test_castling_right_new() {
        assert_eq!(CastlingRight::new(Color::White, CastlingSide::Kingside), CastlingRight::WHITE_KINGSIDE);
        assert_eq!(CastlingRight::new(Color::Black, CastlingSide::Queenside), CastlingRight::BLACK_QUEENSIDE);
        assert_eq!(CastlingRight::all().bits() as usize, CastlingRight::COUNT - 1);
    }

    #[test]
    fn test_captured_piece() {
        let pawn = Piece::new(Color::White, PieceType::Pawn);
        let knight = Piece::new(Color::Black, PieceType::Knight);
        assert_eq!(Move::new(sq("e4"), sq("d5"), pawn, MoveType::Capture(knight)).captured(), Some(knight));
        assert_eq!(
            Move::new(sq("e5"), sq("d6"), pawn, MoveType::EnPassant).captured(),
            Some(Piece::new(Color::Black, PieceType::Pawn))
        );
        assert_eq!(Move::new(sq("e2"), sq("e3"), pawn, MoveType::Basic).captured(), None);
    }

    #[test]
    fn test_promotion() {
        let pawn = Piece::new(Color::White, PieceType::Pawn);
        let mv = Move::new(sq("a7"), sq("a8"), pawn, MoveType::Promotion(PieceType::Queen));
        assert_eq!(mv.promotion(), Some(PieceType::Queen));
        assert!(mv.is_irreversible());
    }

    #[test]
    fn test_drop() {
        let knight = Piece::new(Color::Black, PieceType::Knight);
        let mv = Move::new_drop(sq("f6"), knight);
        assert_eq!(mv.from_square(), mv.to_square());
        assert_eq!(mv.move_type(), MoveType::Drop);
        assert!(mv.is_irreversible());
    }

    #[test]
    fn test_quiet_piece_move_is_reversible() {
        let knight = Piece::new(Color::White, PieceType::Knight);
        assert!(!Move::new(sq("g1"), sq("f3"), knight, MoveType::Basic).is_irreversible());
    }
}
