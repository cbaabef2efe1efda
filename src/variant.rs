use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use log::debug;
use once_cell::sync::Lazy;

use crate::{
    chess::{Bitboard, CastlingSide, File, PieceType, Rank, Square},
    engine::Board,
    error::{Error, Result},
    notation::Notation,
    outcome::{Value, VALUE_DRAW, VALUE_MATE},
};

/// The rules of a chess variant.
///
/// A variant describes the board geometry, the pieces taking part in the game and the characters representing them,
/// pawn and castling rules, whether captured pieces go to the capturer's hand, and the policies used to classify the
/// end of the game. Values are always expressed from the point of view of the side to move.
#[derive(Debug, Clone)]
pub struct Variant {
    name: String,
    max_file: File,
    max_rank: Rank,
    start_fen: String,
    piece_chars: [Option<char>; PieceType::COUNT],
    promotion_piece_types: Vec<PieceType>,
    double_step: bool,
    castling: bool,
    castling_kingside_file: File,
    castling_queenside_file: File,
    captures_to_hand: bool,
    checkmate_value: Value,
    stalemate_value: Value,
    flag_region: Bitboard,
    bare_king_loses: bool,
    n_move_rule: u16,
    n_fold_rule: u16,
    perpetual_check_illegal: bool,
    default_notation: Notation,
}

impl Variant {
    /// Standard chess, the base most other variants are derived from.
    pub fn chess() -> Variant {
        let mut piece_chars = [None; PieceType::COUNT];
        for (piece_type, c) in [
            (PieceType::Pawn, 'p'),
            (PieceType::Knight, 'n'),
            (PieceType::Bishop, 'b'),
            (PieceType::Rook, 'r'),
            (PieceType::Queen, 'q'),
            (PieceType::King, 'k'),
        ] {
            piece_chars[usize::from(piece_type)] = Some(c);
        }

        Variant {
            name: String::from("chess"),
            max_file: File::H,
            max_rank: Rank::R8,
            start_fen: String::from("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            piece_chars,
            promotion_piece_types: vec![PieceType::Queen, PieceType::Rook, PieceType::Bishop, PieceType::Knight],
            double_step: true,
            castling: true,
            castling_kingside_file: File::G,
            castling_queenside_file: File::C,
            captures_to_hand: false,
            checkmate_value: -VALUE_MATE,
            stalemate_value: VALUE_DRAW,
            flag_region: Bitboard::EMPTY,
            bare_king_loses: false,
            n_move_rule: 50,
            n_fold_rule: 3,
            perpetual_check_illegal: false,
            default_notation: Notation::San,
        }
    }

    /// Derives a new variant with the given name from this one.
    pub fn based_on(&self, name: &str) -> Variant {
        Variant { name: name.to_string(), ..self.clone() }
    }

    /// Replaces the starting position.
    pub fn with_start_fen(mut self, fen: &str) -> Variant {
        self.start_fen = fen.to_string();
        self
    }

    /// Enables or disables castling.
    pub fn with_castling(mut self, castling: bool) -> Variant {
        self.castling = castling;
        self
    }

    /// Sets the value of a stalemate for the stalemated side.
    pub fn with_stalemate_value(mut self, value: Value) -> Variant {
        self.stalemate_value = value;
        self
    }

    /// Sets the number of full moves without progress after which a draw can be claimed (0 disables the rule).
    pub fn with_n_move_rule(mut self, moves: u16) -> Variant {
        self.n_move_rule = moves;
        self
    }

    /// Sets the number of occurrences of a position after which the game can end (0 disables the rule).
    pub fn with_n_fold_rule(mut self, count: u16) -> Variant {
        self.n_fold_rule = count;
        self
    }

    /// Makes repetitions caused by perpetual check lost for the checking side.
    pub fn with_perpetual_check_illegal(mut self, illegal: bool) -> Variant {
        self.perpetual_check_illegal = illegal;
        self
    }

    fn with_piece(mut self, piece_type: PieceType, c: Option<char>) -> Variant {
        self.piece_chars[usize::from(piece_type)] = c;
        self
    }

    fn no_castle() -> Variant {
        Variant::chess()
            .based_on("nocastle")
            .with_castling(false)
            .with_start_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1")
    }

    fn king_of_the_hill() -> Variant {
        let mut variant = Variant::chess().based_on("kingofthehill");
        variant.flag_region = ["d4", "e4", "d5", "e5"]
            .into_iter()
            .filter_map(|name| Square::try_from(name).ok())
            .fold(Bitboard::EMPTY, |bb, square| bb | square);
        variant
    }

    fn crazyhouse() -> Variant {
        let mut variant = Variant::chess()
            .based_on("crazyhouse")
            .with_start_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR[] w KQkq - 0 1")
            .with_n_move_rule(0);
        variant.captures_to_hand = true;
        variant
    }

    fn capablanca() -> Variant {
        let mut variant = Variant::chess()
            .based_on("capablanca")
            .with_start_fen("rnabqkbcnr/pppppppppp/10/10/10/10/PPPPPPPPPP/RNABQKBCNR w KQkq - 0 1")
            .with_piece(PieceType::Archbishop, Some('a'))
            .with_piece(PieceType::Chancellor, Some('c'));
        variant.max_file = File::J;
        variant.castling_kingside_file = File::I;
        variant.promotion_piece_types.extend([PieceType::Archbishop, PieceType::Chancellor]);
        variant
    }

    fn shatranj() -> Variant {
        let mut variant = Variant::chess()
            .based_on("shatranj")
            .with_start_fen("rnbkqbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBKQBNR w - - 0 1")
            .with_castling(false)
            .with_stalemate_value(-VALUE_MATE)
            .with_n_move_rule(70)
            .with_piece(PieceType::Bishop, None)
            .with_piece(PieceType::Queen, None)
            .with_piece(PieceType::Alfil, Some('b'))
            .with_piece(PieceType::Fers, Some('q'));
        variant.promotion_piece_types = vec![PieceType::Fers];
        variant.double_step = false;
        variant.bare_king_loses = true;
        variant
    }

    /// Returns the name of the variant.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the last file of the board.
    pub fn max_file(&self) -> File {
        self.max_file
    }

    /// Returns the last rank of the board.
    pub fn max_rank(&self) -> Rank {
        self.max_rank
    }

    /// Returns the squares of the board.
    pub fn board(&self) -> Bitboard {
        Bitboard::board(self.max_file, self.max_rank)
    }

    /// Returns the starting position in FEN.
    pub fn start_fen(&self) -> &str {
        &self.start_fen
    }

    /// Returns the piece types taking part in the game.
    pub fn piece_types(&self) -> impl Iterator<Item = PieceType> + '_ {
        PieceType::ALL.into_iter().filter(|piece_type| self.piece_chars[usize::from(*piece_type)].is_some())
    }

    /// Returns the lowercase character of a piece type, if the piece type takes part in the game.
    pub fn piece_char(&self, piece_type: PieceType) -> Option<char> {
        self.piece_chars[usize::from(piece_type)]
    }

    /// Returns the piece type represented by a character, ignoring its case.
    pub fn piece_type_from_char(&self, c: char) -> Option<PieceType> {
        let c = c.to_ascii_lowercase();
        self.piece_types().find(|piece_type| self.piece_char(*piece_type) == Some(c))
    }

    /// Returns the piece types a pawn can promote to.
    pub fn promotion_piece_types(&self) -> &[PieceType] {
        &self.promotion_piece_types
    }

    /// Returns true if pawns may advance two squares from their starting rank.
    pub fn double_step(&self) -> bool {
        self.double_step
    }

    /// Returns true if the variant knows castling.
    pub fn castling(&self) -> bool {
        self.castling
    }

    /// Returns the file the king lands on when castling towards `side`.
    pub fn castling_king_file(&self, side: CastlingSide) -> File {
        match side {
            CastlingSide::Kingside => self.castling_kingside_file,
            CastlingSide::Queenside => self.castling_queenside_file,
        }
    }

    /// Returns true if captured pieces go to the hand of the capturing side and can be dropped back.
    pub fn captures_to_hand(&self) -> bool {
        self.captures_to_hand
    }

    /// Returns the value of being checkmated.
    pub fn checkmate_value(&self) -> Value {
        self.checkmate_value
    }

    /// Returns the value of being stalemated.
    pub fn stalemate_value(&self) -> Value {
        self.stalemate_value
    }

    /// Returns the squares a king wins the game by reaching.
    pub fn flag_region(&self) -> Bitboard {
        self.flag_region
    }

    /// Returns true if a side left with a lone king loses.
    pub fn bare_king_loses(&self) -> bool {
        self.bare_king_loses
    }

    /// Returns the n-move rule in full moves (0 when disabled).
    pub fn n_move_rule(&self) -> u16 {
        self.n_move_rule
    }

    /// Returns the n-fold repetition rule (0 when disabled).
    pub fn n_fold_rule(&self) -> u16 {
        self.n_fold_rule
    }

    /// Returns true if a repetition caused by perpetual check is lost by the checking side.
    pub fn perpetual_check_illegal(&self) -> bool {
        self.perpetual_check_illegal
    }

    /// Returns the notation used when callers ask for the default one.
    pub fn default_notation(&self) -> Notation {
        self.default_notation
    }
}

//======================================================================================================================
// Registry
//======================================================================================================================

static VARIANTS: Lazy<RwLock<BTreeMap<String, Arc<Variant>>>> = Lazy::new(|| {
    let variants = [
        Variant::chess(),
        Variant::no_castle(),
        Variant::king_of_the_hill(),
        Variant::crazyhouse(),
        Variant::capablanca(),
        Variant::shatranj(),
    ];
    RwLock::new(variants.into_iter().map(|variant| (variant.name.clone(), Arc::new(variant))).collect())
});

/// Forces the creation of the built-in variants.
pub(crate) fn initialize() {
    Lazy::force(&VARIANTS);
    debug!("{} variants available", available_variants().len());
}

/// Looks up a variant by name.
pub fn get(name: &str) -> Result<Arc<Variant>> {
    VARIANTS
        .read()
        .expect("The variant registry should never be poisoned")
        .get(name)
        .cloned()
        .ok_or_else(|| Error::InvalidVariant(name.to_string()))
}

/// Returns the names of all registered variants, in alphabetical order.
pub fn available_variants() -> Vec<String> {
    VARIANTS.read().expect("The variant registry should never be poisoned").keys().cloned().collect()
}

/// Returns every registered variant.
pub fn all() -> Vec<Arc<Variant>> {
    VARIANTS.read().expect("The variant registry should never be poisoned").values().cloned().collect()
}

/// Registers a variant, replacing any variant with the same name.
///
/// # Errors
/// * `InvalidFen` - If the starting position of the variant cannot be read with its own rules
pub fn register_variant(variant: Variant) -> Result<()> {
    let variant = Arc::new(variant);
    Board::from_fen(variant.clone(), variant.start_fen(), false)
        .map_err(|source| Error::InvalidFen { fen: variant.start_fen().to_string(), source })?;

    debug!("Registering variant {}", variant.name());
    VARIANTS
        .write()
        .expect("The variant registry should never be poisoned")
        .insert(variant.name().to_string(), variant);
    Ok(())
}

/// Returns the starting position of a variant.
pub fn initial_fen(name: &str) -> Result<String> {
    Ok(get(name)?.start_fen().to_string())
}

/// Returns true if `fen` describes a position that can be played under the rules of `variant`.
pub fn validate_fen(variant: &str, fen: &str, is_chess960: bool) -> bool {
    match get(variant) {
        Ok(variant) => Board::from_fen(variant, fen, is_chess960).is_ok(),
        Err(_) => false,
    }
}
