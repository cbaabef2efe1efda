//! The bundled chess-family rule engine and the contract positions are built on.

mod board;
mod context;
mod fen;
mod rules;
mod state;

use std::{fmt::Debug, sync::Arc};

pub use board::Board;
pub use context::{context, EngineContext};
pub use fen::FenError;
pub use state::{StateInfo, StateNode};

use crate::{
    chess::{Color, Move, Piece, PieceType, Square},
    error::Result,
    notation::{self, Notation},
    outcome::Value,
    variant::Variant,
};

/// The operations a position snapshot needs from a mutable rule engine.
///
/// Implementations keep their history as a chain of shared, write-once nodes. `duplicate` must return a board that
/// shares nothing mutable with the original: only the history head and immutable process-wide data may be aliased, so
/// that applying moves to the duplicate appends new nodes without touching the original's view of the game.
pub trait EngineHandle: Send + Sync + Sized {
    type Move: Copy + PartialEq + Debug + Send + Sync;

    fn variant(&self) -> &Arc<Variant>;
    fn is_chess960(&self) -> bool;

    /// Returns an independent copy of the board whose history shares every existing node with this one.
    fn duplicate(&self) -> Self;

    fn legal_moves(&self) -> Vec<Self::Move>;
    fn move_to_uci(&self, mv: Self::Move) -> String;
    fn move_to_san(&self, mv: Self::Move, notation: Notation) -> Result<String>;

    /// Plays a legal move, appending exactly one node to the history.
    fn apply_move(&mut self, mv: Self::Move);

    fn to_fen(&self, sfen: bool, show_promoted: bool, move_counter_floor: u16) -> String;
    fn is_in_check(&self) -> bool;
    fn is_immediate_end(&self) -> Option<Value>;
    fn is_optional_end(&self, plies_since_progress: u16) -> Option<Value>;
    fn checkmate_value(&self) -> Value;
    fn stalemate_value(&self) -> Value;
    fn has_insufficient_material(&self, color: Color) -> bool;
    fn has_game_cycle(&self, ply: i32) -> bool;
    fn has_repeated(&self) -> bool;
    fn is_draw(&self, ply: i32) -> bool;
    fn piece_on(&self, square: Square) -> Option<Piece>;

    /// Returns the piece a promoted piece was before promotion, or `None` for pieces that were never promoted.
    ///
    /// Only pawns promote in the bundled engine, so for `Board` the answer is always a pawn of the piece's color.
    fn unpromoted_piece_on(&self, square: Square) -> Option<Piece>;

    fn is_wall(&self, square: Square) -> bool;
    fn count_in_hand(&self, color: Color, piece_type: PieceType) -> u8;

    /// Returns the number of nodes in the history chain.
    fn history_len(&self) -> usize;
}

impl EngineHandle for Board {
    type Move = Move;

    fn variant(&self) -> &Arc<Variant> {
        Board::variant(self)
    }

    fn is_chess960(&self) -> bool {
        self.chess960()
    }

    fn duplicate(&self) -> Self {
        let copy = self.clone();
        debug_assert!(Arc::ptr_eq(&copy.state, &self.state));
        copy
    }

    fn legal_moves(&self) -> Vec<Move> {
        Board::legal_moves(self)
    }

    fn move_to_uci(&self, mv: Move) -> String {
        Board::move_to_uci(self, mv)
    }

    fn move_to_san(&self, mv: Move, notation: Notation) -> Result<String> {
        notation::san(self, mv, notation)
    }

    fn apply_move(&mut self, mv: Move) {
        let length = self.state.len();
        Board::apply_move(self, mv);
        debug_assert_eq!(self.state.len(), length + 1);
    }

    fn to_fen(&self, sfen: bool, show_promoted: bool, move_counter_floor: u16) -> String {
        Board::to_fen(self, sfen, show_promoted, move_counter_floor)
    }

    fn is_in_check(&self) -> bool {
        self.state.info().checkers.has_any()
    }

    fn is_immediate_end(&self) -> Option<Value> {
        Board::is_immediate_end(self)
    }

    fn is_optional_end(&self, plies_since_progress: u16) -> Option<Value> {
        Board::is_optional_end(self, plies_since_progress)
    }

    fn checkmate_value(&self) -> Value {
        self.variant.checkmate_value()
    }

    fn stalemate_value(&self) -> Value {
        self.variant.stalemate_value()
    }

    fn has_insufficient_material(&self, color: Color) -> bool {
        Board::has_insufficient_material(self, color)
    }

    fn has_game_cycle(&self, ply: i32) -> bool {
        Board::has_game_cycle(self, ply)
    }

    fn has_repeated(&self) -> bool {
        Board::has_repeated(self)
    }

    fn is_draw(&self, ply: i32) -> bool {
        Board::is_draw(self, ply)
    }

    fn piece_on(&self, square: Square) -> Option<Piece> {
        Board::piece_on(self, square)
    }

    fn unpromoted_piece_on(&self, square: Square) -> Option<Piece> {
        match self.piece_on(square) {
            Some(piece) if self.is_promoted(square) => Some(Piece::new(piece.color(), PieceType::Pawn)),
            _ => None,
        }
    }

    fn is_wall(&self, square: Square) -> bool {
        self.walls.get(square)
    }

    fn count_in_hand(&self, color: Color, piece_type: PieceType) -> u8 {
        self.hand(color, piece_type)
    }

    fn history_len(&self) -> usize {
        self.state.len()
    }
}
