//! Position management for chess variants.
//!
//! A [`Position`] is an immutable snapshot of a game. Playing moves on it returns a new snapshot that shares the history
//! of its parent, so any number of lines can be explored from a common position without copying the game so far.
//! Snapshots classify the end of the game ([`outcome`]), render moves in human notations ([`Notation`]) and describe
//! their pieces ([`pieces`]). Castling moves can be rewritten in the Chess960 form with [`to_960_uci`].

use std::sync::Once;

pub mod chess;
pub mod chess960;
pub mod config;
pub mod engine;
pub mod error;
pub mod notation;
pub mod options;
pub mod outcome;
pub mod perft;
pub mod pieces;
pub mod position;
pub mod variant;
pub mod zobrist;

pub use chess960::{to_960_uci, to_960_uci_from_fen};
pub use error::{Error, Result};
pub use notation::Notation;
pub use options::Options;
pub use outcome::{Value, VALUE_DRAW, VALUE_MATE, VALUE_ZERO};
pub use pieces::{available_piece_chars, available_pieces, available_promotable_piece_chars, BoardPiece, PieceInfo};
pub use position::Position;
pub use variant::{available_variants, initial_fen, register_variant, validate_fen, Variant};

static INIT: Once = Once::new();

/// Initialize the library. Calling it is optional, every global is created on first use, but doing it up front moves
/// the cost out of the first position created. Further calls do nothing.
pub fn initialize() {
    INIT.call_once(|| {
        engine::context();
        variant::initialize();
    });
}

/// Returns the version of the library.
pub fn version() -> &'static str {
    "v0.0.20"
}
