//! Translation of castling moves from the king-to-destination form to the king-captures-rook form.
//!
//! The game is replayed twice, once in each castling mode, and the legal moves of the two replays are compared at each
//! ply. Only castling moves are written differently by the two modes, so a move found in one list but not the other is
//! a castling move. This is a heuristic: when the candidate cannot be confirmed on the board the move is kept as is.

use log::{trace, warn};

use crate::{
    chess::{PieceType, Square},
    error::{Error, Result},
    position::Position,
    variant,
};

/// Rewrites the castling moves of a game played from the starting position of a variant.
///
/// # Errors
/// * `InvalidVariant` - If no variant with this name is registered
/// * `IllegalMove` - If a move is not legal in the position it is played in
pub fn to_960_uci<S: AsRef<str>>(variant: &str, moves: &[S]) -> Result<Vec<String>> {
    let fen = variant::initial_fen(variant)?;
    to_960_uci_from_fen(variant, &fen, moves)
}

/// Rewrites the castling moves of a game played from `fen`.
///
/// Moves already written in the king-captures-rook form are returned unchanged, so translating the output again is a
/// no-op.
///
/// # Errors
/// * `InvalidVariant` - If no variant with this name is registered
/// * `InvalidFen` - If the FEN does not describe a valid position of the variant
/// * `IllegalMove` - If a move is not legal in the position it is played in
pub fn to_960_uci_from_fen<S: AsRef<str>>(variant: &str, fen: &str, moves: &[S]) -> Result<Vec<String>> {
    if !variant::get(variant)?.castling() {
        return Ok(moves.iter().map(|mv| mv.as_ref().to_string()).collect());
    }

    let mut standard = Position::from_fen(variant, fen, false)?;
    let mut chess960 = Position::from_fen(variant, fen, true)?;
    let mut translated = Vec::with_capacity(moves.len());

    for token in moves {
        let token = token.as_ref();
        let translation = translate(&standard, &chess960, token)?;
        trace!("Translated {} to {}", token, translation.written);

        standard = standard.make_moves(&[&translation.standard])?;
        chess960 = chess960.make_moves(&[&translation.chess960])?;
        translated.push(translation.written);
    }

    Ok(translated)
}

/// How one move of the game is handled.
#[derive(Debug, PartialEq)]
struct Translation {
    /// The move played on the standard replay.
    standard: String,
    /// The move played on the king-captures-rook replay.
    chess960: String,
    /// The move written to the output.
    written: String,
}

impl Translation {
    fn new(standard: &str, chess960: &str, written: &str) -> Self {
        Translation { standard: standard.to_string(), chess960: chess960.to_string(), written: written.to_string() }
    }

    fn unchanged(token: &str) -> Self {
        Translation::new(token, token, token)
    }
}

/// Returns the moves to play on each replay for `token` and the move to write.
fn translate(standard: &Position, chess960: &Position, token: &str) -> Result<Translation> {
    let mut standard_moves = standard.get_legal_moves();
    let mut chess960_moves = chess960.get_legal_moves();
    standard_moves.sort();
    chess960_moves.sort();

    let only_standard: Vec<&String> =
        standard_moves.iter().filter(|mv| chess960_moves.binary_search(mv).is_err()).collect();
    let only_chess960: Vec<&String> =
        chess960_moves.iter().filter(|mv| standard_moves.binary_search(mv).is_err()).collect();

    if only_standard.len() == 1 && only_chess960.len() == 1 && only_standard[0] == token {
        return Ok(Translation::new(token, only_chess960[0], only_chess960[0]));
    }

    if only_standard.len() == 2 && only_chess960.len() == 2 && only_standard.iter().any(|mv| *mv == token) {
        let candidate = match move_squares(token) {
            Some((from, to)) if from.file() < to.file() => only_chess960[1],
            _ => only_chess960[0],
        };
        if is_castling(chess960, candidate) {
            return Ok(Translation::new(token, candidate, candidate));
        }
        // The token has no counterpart on the king-captures-rook replay, which keeps up with the candidate instead.
        warn!("Unable to confirm {} as the translation of {}, keeping the move unchanged", candidate, token);
        return Ok(Translation::new(token, candidate, token));
    }

    if let Some(index) = only_chess960.iter().position(|mv| *mv == token) {
        // Already written in the king-captures-rook form.
        let counterpart = if only_standard.len() == only_chess960.len() { only_standard.get(index) } else { None };
        return match counterpart {
            Some(counterpart) => Ok(Translation::new(counterpart, token, token)),
            None => Err(Error::IllegalMove(token.to_string())),
        };
    }

    Ok(Translation::unchanged(token))
}

/// Returns true if `candidate` moves a king onto a square holding a rook in the king-captures-rook replay.
fn is_castling(chess960: &Position, candidate: &str) -> bool {
    let Some((from, rook)) = move_squares(candidate) else {
        return false;
    };

    let board = chess960.pieces_on_board();
    let is = |square: Square, piece_type: PieceType| {
        board.get(&square).is_some_and(|piece| piece.piece_type() == piece_type)
    };
    is(from, PieceType::King) && is(rook, PieceType::Rook)
}

/// Splits a board move such as `e1g1` or `a10a9` into its two squares.
fn move_squares(token: &str) -> Option<(Square, Square)> {
    let split = token.char_indices().skip(1).find(|(_, c)| c.is_ascii_alphabetic()).map(|(index, _)| index)?;
    let (from, rest) = token.split_at(split);
    let end = rest.char_indices().skip(1).find(|(_, c)| !c.is_ascii_digit()).map_or(rest.len(), |(index, _)| index);

    Some((Square::try_from(from).ok()?, Square::try_from(&rest[..end]).ok()?))
}
