pub mod attacks;
mod bitboard;
mod coordinates;
mod r#move;
mod piece;

pub use bitboard::{Bitboard, BitboardIterator};
pub use coordinates::{CoordinatesError, File, Rank, Square};
pub use piece::{Color, Piece, PieceType};
pub use r#move::{CastlingRight, CastlingSide, Move, MoveType};
