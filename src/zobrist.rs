use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::chess::{CastlingRight, File, Piece, Square};

/// Type alias for the Zobrist hash value
pub type Zobrist = u64;

/// Largest number of pieces of a single kind that can be held in hand and still be hashed distinctly.
pub const MAX_HAND_COUNT: usize = 32;

const SEED: u64 = 0x5EED_F3A2_0C0F_FEE5;

/// The random keys used to compute position signatures.
///
/// The keys are generated from a fixed seed so that signatures are stable across runs, which keeps repetition
/// detection reproducible in tests.
pub struct ZobristKeys {
    piece_square: Vec<Zobrist>,
    in_hand: Vec<Zobrist>,
    en_passant: [Zobrist; File::COUNT],
    black_to_move: Zobrist,
    castling: [Zobrist; CastlingRight::COUNT],
}

impl ZobristKeys {
    /// Generates every key.
    pub fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(SEED);

        let piece_square = (0..Piece::COUNT * Square::COUNT).map(|_| rng.gen()).collect();
        let in_hand = (0..Piece::COUNT * MAX_HAND_COUNT).map(|_| rng.gen()).collect();
        let en_passant = std::array::from_fn(|_| rng.gen());
        let black_to_move = rng.gen();

        // Index zero is kept at zero so that a position without castling rights does not alter the signature.
        let mut castling = [0; CastlingRight::COUNT];
        for key in castling.iter_mut().skip(1) {
            *key = rng.gen();
        }

        Self { piece_square, in_hand, en_passant, black_to_move, castling }
    }

    /// Returns the key for a specific piece on a specific square.
    pub fn piece_square(&self, piece: Piece, square: Square) -> Zobrist {
        self.piece_square[usize::from(piece) * Square::COUNT + usize::from(square)]
    }

    /// Returns the key for holding `count` copies of `piece` in hand.
    pub fn in_hand(&self, piece: Piece, count: u8) -> Zobrist {
        if count == 0 {
            return 0;
        }
        self.in_hand[usize::from(piece) * MAX_HAND_COUNT + (count as usize).min(MAX_HAND_COUNT - 1)]
    }

    /// Returns the key for an en passant opportunity on the file of `square`.
    pub fn en_passant(&self, square: Option<Square>) -> Zobrist {
        match square {
            Some(square) => self.en_passant[usize::from(square.file())],
            None => 0,
        }
    }

    /// Returns the key that toggles the side to move.
    pub fn black_to_move(&self) -> Zobrist {
        self.black_to_move
    }

    /// Returns the key for a specific castling right combination.
    pub fn castling(&self, castling_right: CastlingRight) -> Zobrist {
        self.castling[castling_right.bits() as usize]
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::{Color, PieceType};

    #[test]
    fn test_keys_are_deterministic() {
        let first = ZobristKeys::new();
        let second = ZobristKeys::new();
        let knight = Piece::new(Color::White, PieceType::Knight);
        let e4 = Square::try_from("e4").unwrap();
        assert_eq!(first.piece_square(knight, e4), second.piece_square(knight, e4));
        assert_eq!(first.black_to_move(), second.black_to_move());
    }

    #[test]
    fn test_empty_values_do_not_alter_signature() {
        let keys = ZobristKeys::new();
        assert_eq!(keys.castling(CastlingRight::empty()), 0);
        assert_eq!(keys.en_passant(None), 0);
        assert_eq!(keys.in_hand(Piece::new(Color::Black, PieceType::Pawn), 0), 0);
    }

    #[test]
    fn test_hand_counts_are_distinct() {
        let keys = ZobristKeys::new();
        let pawn = Piece::new(Color::White, PieceType::Pawn);
        assert_ne!(keys.in_hand(pawn, 1), keys.in_hand(pawn, 2));
    }
}
