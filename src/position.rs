use std::{collections::BTreeMap, fmt::Debug, sync::Arc};

use log::trace;

use crate::{
    chess::{Color, PieceType, Square},
    engine::{Board, EngineHandle},
    error::{Error, Result},
    notation::Notation,
    options::{Options, ReadOnlyOptions},
    pieces::BoardPiece,
    variant::{self, Variant},
};

/// An immutable snapshot of a game of a chess variant.
///
/// A position never changes once created. Playing moves returns a new position that shares the history of its parent:
/// the moves are applied to a private duplicate of the engine board, which appends new history nodes without touching
/// the nodes the parent can see. Positions can be cloned cheaply and shared between threads.
///
/// # Examples
///
/// ```
/// use ferz::Position;
///
/// let start = Position::new("chess", false).unwrap();
/// let after = start.make_moves(&["e2e4", "e7e5"]).unwrap();
/// assert_eq!(after.get_fen(false, false, 0), "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2");
/// assert_eq!(start.get_fen(false, false, 0), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
/// ```
pub struct Position<E: EngineHandle = Board> {
    variant: String,
    is_chess960: bool,
    engine: Arc<E>,
}

impl Position {
    /// Creates the starting position of a variant.
    ///
    /// # Errors
    /// * `InvalidVariant` - If no variant with this name is registered
    pub fn new(variant: &str, is_chess960: bool) -> Result<Position> {
        let variant = variant::get(variant)?;
        let fen = variant.start_fen().to_string();
        Position::with_variant(variant, &fen, is_chess960)
    }

    /// Creates a position of a variant from a FEN string.
    ///
    /// # Errors
    /// * `InvalidVariant` - If no variant with this name is registered
    /// * `InvalidFen` - If the FEN does not describe a valid position of the variant
    pub fn from_fen(variant: &str, fen: &str, is_chess960: bool) -> Result<Position> {
        Position::with_variant(variant::get(variant)?, fen, is_chess960)
    }

    /// Creates the starting position of the variant selected with the `UCI_Variant` option, in the castling mode of the
    /// `UCI_Chess960` option.
    pub fn from_options() -> Result<Position> {
        let options = Options::get();
        Position::new(options.variant(), options.chess960())
    }

    fn with_variant(variant: Arc<Variant>, fen: &str, is_chess960: bool) -> Result<Position> {
        let engine = Board::from_fen(variant, fen, is_chess960)
            .map_err(|source| Error::InvalidFen { fen: fen.to_string(), source })?;
        Ok(Position::from_engine(engine))
    }
}

impl<E: EngineHandle> Position<E> {
    /// Wraps an engine board in a position. The board must not be modified afterwards.
    pub fn from_engine(engine: E) -> Position<E> {
        let variant = engine.variant().name().to_string();
        Position { variant, is_chess960: engine.is_chess960(), engine: Arc::new(engine) }
    }

    /// Returns the name of the variant.
    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// Returns true if castling moves are written in the king-captures-rook form.
    pub fn is_chess960(&self) -> bool {
        self.is_chess960
    }

    /// Returns the engine board of the position.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Returns the number of positions recorded in the history, this one included.
    pub fn history_len(&self) -> usize {
        self.engine.history_len()
    }

    fn find_move(engine: &E, token: &str) -> Result<E::Move> {
        engine
            .legal_moves()
            .into_iter()
            .find(|mv| engine.move_to_uci(*mv) == token)
            .ok_or_else(|| Error::IllegalMove(token.to_string()))
    }

    /// Returns the position reached by playing moves from this one.
    ///
    /// Moves are written in engine coordinate notation. Either every move is played or none is: the first illegal move
    /// fails the whole call.
    ///
    /// # Errors
    /// * `IllegalMove` - If a move is not legal in the position it is played in
    pub fn make_moves<S: AsRef<str>>(&self, moves: &[S]) -> Result<Position<E>> {
        let mut engine = self.engine.duplicate();
        for token in moves {
            let mv = Self::find_move(&engine, token.as_ref())?;
            engine.apply_move(mv);
        }
        trace!("Played {} moves, history length {}", moves.len(), engine.history_len());

        Ok(Position { variant: self.variant.clone(), is_chess960: self.is_chess960, engine: Arc::new(engine) })
    }

    /// Returns the position as a FEN string, or as an SFEN string when `sfen` is set.
    ///
    /// The move number written is at least `move_counter_floor`, limited to the range of the engine's counter.
    pub fn get_fen(&self, sfen: bool, show_promoted: bool, move_counter_floor: i32) -> String {
        let floor = move_counter_floor.clamp(0, u16::MAX as i32) as u16;
        self.engine.to_fen(sfen, show_promoted, floor)
    }

    /// Returns the legal moves in engine coordinate notation.
    pub fn get_legal_moves(&self) -> Vec<String> {
        self.engine.legal_moves().into_iter().map(|mv| self.engine.move_to_uci(mv)).collect()
    }

    /// Returns a move written in a human notation.
    ///
    /// # Errors
    /// * `IllegalMove` - If the move is not legal
    /// * `UnsupportedNotation` - If the notation cannot be rendered for the variant
    pub fn get_san(&self, mv: &str, notation: Notation) -> Result<String> {
        let mv = Self::find_move(&self.engine, mv)?;
        self.engine.move_to_san(mv, notation)
    }

    /// Returns a sequence of moves written in a human notation, each in the position reached by the previous ones.
    ///
    /// # Errors
    /// * `IllegalMove` - If a move is not legal
    /// * `UnsupportedNotation` - If the notation cannot be rendered for the variant
    pub fn get_san_moves<S: AsRef<str>>(&self, moves: &[S], notation: Notation) -> Result<Vec<String>> {
        let mut engine = self.engine.duplicate();
        let mut sans = Vec::with_capacity(moves.len());
        for token in moves {
            let mv = Self::find_move(&engine, token.as_ref())?;
            sans.push(engine.move_to_san(mv, notation)?);
            engine.apply_move(mv);
        }
        Ok(sans)
    }

    /// Returns true if the side to move is in check.
    pub fn gives_check(&self) -> bool {
        self.engine.is_in_check()
    }

    fn board_squares(&self) -> impl Iterator<Item = Square> + '_ {
        let variant = self.engine.variant();
        Square::all().filter(move |square| square.file() <= variant.max_file() && square.rank() <= variant.max_rank())
    }

    fn board_piece(&self, square: Square) -> Option<BoardPiece> {
        match self.engine.unpromoted_piece_on(square) {
            Some(piece) => Some(BoardPiece::new(piece.piece_type(), piece.color(), true)),
            None => self.engine.piece_on(square).map(|piece| BoardPiece::new(piece.piece_type(), piece.color(), false)),
        }
    }

    /// Returns the pieces on the board by square.
    pub fn pieces_on_board(&self) -> BTreeMap<Square, BoardPiece> {
        self.board_squares().filter_map(|square| Some((square, self.board_piece(square)?))).collect()
    }

    /// Returns the pieces on the board by square name, e.g. `e4`.
    pub fn pieces_on_uci_board(&self) -> BTreeMap<String, BoardPiece> {
        self.board_squares().filter_map(|square| Some((square.to_string(), self.board_piece(square)?))).collect()
    }

    /// Returns the pieces held in hand by both sides, White's first.
    pub fn pieces_in_hand(&self) -> Vec<BoardPiece> {
        let mut pieces = Vec::new();
        for color in Color::ALL {
            for piece_type in PieceType::ALL {
                let count = self.engine.count_in_hand(color, piece_type);
                pieces.extend((0..count).map(|_| BoardPiece::new(piece_type, color, false)));
            }
        }
        pieces
    }

    /// Returns the wall squares.
    pub fn walls_on_board(&self) -> Vec<Square> {
        self.board_squares().filter(|square| self.engine.is_wall(*square)).collect()
    }
}

impl<E: EngineHandle> Clone for Position<E> {
    fn clone(&self) -> Self {
        Position { variant: self.variant.clone(), is_chess960: self.is_chess960, engine: Arc::clone(&self.engine) }
    }
}

impl<E: EngineHandle> Debug for Position<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Position")
            .field("variant", &self.variant)
            .field("is_chess960", &self.is_chess960)
            .field("fen", &self.get_fen(false, false, 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_position_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Position>();
    }

    mod construction {
        use super::*;

        #[test]
        fn test_unknown_variant() {
            assert!(matches!(Position::new("notavariant", false), Err(Error::InvalidVariant(_))));
            assert!(matches!(Position::from_fen("notavariant", START, false), Err(Error::InvalidVariant(_))));
        }

        #[test]
        fn test_invalid_fen() {
            let result = Position::from_fen("chess", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1", false);
            assert!(matches!(result, Err(Error::InvalidFen { .. })));
        }

        #[test]
        fn test_from_fen() {
            let position = Position::from_fen("chess", START, false).unwrap();
            assert_eq!(position.variant(), "chess");
            assert!(!position.is_chess960());
            assert_eq!(position.get_fen(false, false, 0), START);
            assert_eq!(position.history_len(), 1);
        }
    }

    mod make_moves {
        use super::*;

        #[test]
        fn test_parent_is_unaffected() {
            let start = Position::new("chess", false).unwrap();
            let after = start.make_moves(&["e2e4"]).unwrap();
            assert_eq!(start.get_fen(false, false, 0), START);
            assert_eq!(after.get_fen(false, false, 0), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1");
            assert_eq!(start.history_len(), 1);
            assert_eq!(after.history_len(), 2);
        }

        #[test]
        fn test_illegal_move_is_all_or_nothing() {
            let start = Position::new("chess", false).unwrap();
            let result = start.make_moves(&["e2e4", "e7e5", "e1e3"]);
            assert!(matches!(result, Err(Error::IllegalMove(mv)) if mv == "e1e3"));
            assert_eq!(start.get_fen(false, false, 0), START);
        }

        #[test]
        fn test_no_moves_returns_equal_position() {
            let start = Position::new("chess", false).unwrap();
            let same = start.make_moves::<&str>(&[]).unwrap();
            assert_eq!(same.get_fen(false, false, 0), START);
        }

        #[test]
        fn test_siblings_do_not_see_each_other() {
            let start = Position::new("chess", false).unwrap();
            let left = start.make_moves(&["e2e4"]).unwrap();
            let right = start.make_moves(&["d2d4"]).unwrap();
            let left_reply = left.make_moves(&["e7e5"]).unwrap();

            assert!(right.get_legal_moves().contains(&String::from("d7d5")));
            assert_eq!(left_reply.history_len(), 3);
            assert_eq!(right.history_len(), 2);
            assert_eq!(left.get_fen(false, false, 0), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1");
        }
    }

    mod queries {
        use super::*;

        #[test]
        fn test_get_fen_counter_floor() {
            let position = Position::new("chess", false).unwrap();
            assert_eq!(position.get_fen(false, false, -5), START);
            assert_eq!(position.get_fen(false, false, 7), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 7");
            assert_eq!(
                position.get_fen(false, false, i32::MAX),
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 65535"
            );
        }

        #[test]
        fn test_get_san() {
            let position = Position::new("chess", false).unwrap();
            assert_eq!(position.get_san("g1f3", Notation::Default).unwrap(), "Nf3");
            assert!(matches!(position.get_san("g1g3", Notation::San), Err(Error::IllegalMove(_))));
        }

        #[test]
        fn test_get_san_moves() {
            let position = Position::new("chess", false).unwrap();
            let sans = position.get_san_moves(&["e2e4", "e7e5", "g1f3", "b8c6", "f1b5"], Notation::San).unwrap();
            assert_eq!(sans, vec!["e4", "e5", "Nf3", "Nc6", "Bb5"]);
            assert_eq!(position.history_len(), 1);
        }

        #[test]
        fn test_gives_check() {
            let position = Position::new("chess", false).unwrap();
            assert!(!position.gives_check());
            let position = position.make_moves(&["e2e4", "f7f6", "d2d4", "g7g5", "d1h5"]).unwrap();
            assert!(position.gives_check());
        }

        #[test]
        fn test_pieces_on_board() {
            let position = Position::new("capablanca", false).unwrap();
            let pieces = position.pieces_on_board();
            assert_eq!(pieces.len(), 40);
            let archbishop = pieces[&Square::try_from("c1").unwrap()];
            assert_eq!(archbishop.info().name(), "archbishop");
            assert_eq!(archbishop.color(), Color::White);

            let uci = position.pieces_on_uci_board();
            assert_eq!(uci["h8"].info().name(), "chancellor");
            assert_eq!(uci["h8"].color(), Color::Black);
        }

        #[test]
        fn test_promoted_pieces_report_their_origin() {
            let position = Position::from_fen("crazyhouse", "4k3/8/8/8/8/8/8/3Q~K3[] w - - 0 1", false).unwrap();
            let piece = position.pieces_on_uci_board()["d1"];
            assert_eq!(piece.piece_type(), PieceType::Pawn);
            assert!(piece.promoted());
        }

        #[test]
        fn test_pieces_in_hand() {
            let position = Position::from_fen("crazyhouse", "4k3/8/8/8/8/8/8/4K3[NPPq] w - - 0 1", false).unwrap();
            let hand = position.pieces_in_hand();
            assert_eq!(hand.len(), 4);
            assert_eq!(hand.iter().filter(|piece| piece.color() == Color::White).count(), 3);
            assert_eq!(hand[3].piece_type(), PieceType::Queen);
        }

        #[test]
        fn test_walls_on_board() {
            let position = Position::from_fen("chess", "4k3/8/8/3**3/8/8/8/4K3 w - - 0 1", false).unwrap();
            let walls = position.walls_on_board();
            assert_eq!(walls, vec![Square::try_from("d5").unwrap(), Square::try_from("e5").unwrap()]);
            assert!(position.pieces_on_board().len() == 2);
        }
    }
}
