use std::collections::{BTreeMap, BTreeSet};

use crate::{
    chess::{Color, PieceType},
    engine::context,
    variant,
};

/// Static metadata about a piece type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceInfo {
    id: PieceType,
    name: &'static str,
    betza: &'static str,
}

impl PieceInfo {
    /// Returns the piece type the metadata describes.
    pub fn id(&self) -> PieceType {
        self.id
    }

    /// Returns the lowercase name of the piece, e.g. `knight`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the movement of the piece in Betza notation.
    pub fn betza(&self) -> &'static str {
        self.betza
    }
}

impl From<PieceType> for PieceInfo {
    fn from(piece_type: PieceType) -> Self {
        PieceInfo { id: piece_type, name: piece_type.name(), betza: piece_type.betza() }
    }
}

/// A piece as reported to callers: its metadata, its color and whether it was obtained by promotion.
///
/// For a promoted piece the metadata describes the piece it was before promoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardPiece {
    info: PieceInfo,
    color: Color,
    promoted: bool,
}

impl BoardPiece {
    pub fn new(piece_type: PieceType, color: Color, promoted: bool) -> Self {
        BoardPiece { info: *context().piece_info(piece_type), color, promoted }
    }

    pub fn info(&self) -> &PieceInfo {
        &self.info
    }

    pub fn piece_type(&self) -> PieceType {
        self.info.id
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn promoted(&self) -> bool {
        self.promoted
    }
}

/// Returns the metadata of every piece type the engine knows, by name.
pub fn available_pieces() -> BTreeMap<String, PieceInfo> {
    context().pieces.iter().map(|info| (info.name().to_string(), *info)).collect()
}

fn collect_chars<F>(piece_types: F) -> String
where
    F: Fn(&variant::Variant) -> Vec<PieceType>,
{
    let mut chars = BTreeSet::new();
    for variant in variant::all() {
        for piece_type in piece_types(&variant) {
            if let Some(c) = variant.piece_char(piece_type) {
                chars.insert(c.to_ascii_uppercase());
                chars.insert(c);
            }
        }
    }
    chars.into_iter().collect()
}

/// Returns the characters, in both cases, of every piece used by a registered variant.
pub fn available_piece_chars() -> String {
    collect_chars(|variant| variant.piece_types().collect())
}

/// Returns the characters, in both cases, of every piece a pawn can promote to in a registered variant.
pub fn available_promotable_piece_chars() -> String {
    collect_chars(|variant| variant.promotion_piece_types().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_pieces() {
        let pieces = available_pieces();
        assert_eq!(pieces.len(), PieceType::COUNT);
        assert_eq!(pieces["knight"].id(), PieceType::Knight);
        assert_eq!(pieces["archbishop"].betza(), "BN");
    }

    #[test]
    fn test_available_piece_chars() {
        let chars = available_piece_chars();
        for c in "KQRBNPkqrbnpACac".chars() {
            assert!(chars.contains(c), "missing {}", c);
        }
        assert!(!chars.contains('x'));
    }

    #[test]
    fn test_available_promotable_piece_chars() {
        let chars = available_promotable_piece_chars();
        for c in "QRBNqrbnACac".chars() {
            assert!(chars.contains(c), "missing {}", c);
        }
        assert!(!chars.contains('K'));
        assert!(!chars.contains('p'));
    }

    #[test]
    fn test_board_piece() {
        let piece = BoardPiece::new(PieceType::Pawn, Color::Black, true);
        assert_eq!(piece.info().name(), "pawn");
        assert_eq!(piece.color(), Color::Black);
        assert!(piece.promoted());
    }
}
