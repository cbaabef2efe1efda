use std::{fmt::Write, sync::Arc};

use thiserror::Error;

use super::{
    board::Board,
    state::{StateInfo, StateNode},
};
use crate::{
    chess::{Bitboard, CastlingRight, CastlingSide, Color, File, Piece, PieceType, Rank, Square},
    variant::Variant,
};

/// Error type for parsing a FEN (Forsyth-Edwards Notation) string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid piece placement")]
    InvalidPiecePlacement,
    #[error("invalid pieces in hand")]
    InvalidHand,
    #[error("invalid active color")]
    InvalidActiveColor,
    #[error("invalid castling availability")]
    InvalidCastlingAvailability,
    #[error("invalid en passant square")]
    InvalidEnPassantSquare,
    #[error("invalid halfmove clock")]
    InvalidHalfmoveClock,
    #[error("invalid fullmove number")]
    InvalidFullmoveNumber,
    #[error("missing field")]
    MissingField,
    #[error("each side must have exactly one king")]
    InvalidKingCount,
    #[error("pawns cannot stand on the first or last rank")]
    PawnOnBackRank,
    #[error("the side that just moved is in check")]
    OpponentInCheck,
}

impl Board {
    /// Creates a board from a FEN string, read with the rules of `variant`.
    ///
    /// A FEN string contains up to 6 fields separated by spaces:
    ///
    /// 1. Piece placement: Each rank is described from the last to the first, separated by '/'. Letters represent
    ///    pieces using the characters of the variant, uppercase for white and lowercase for black. Numbers represent
    ///    empty squares and may have two digits on wide boards. A '*' is a wall and a '~' marks the preceding piece as
    ///    promoted. Variants with drops append the pieces in hand between brackets, for example `[Qp]`.
    ///
    /// 2. Active color: "w" means White moves next, "b" means Black moves next.
    ///
    /// 3. Castling availability: "K", "Q", "k", "q" for the outermost rooks, or the file letters of the castling rooks
    ///    (Shredder notation), or "-" if no castling is possible. Defaults to "-".
    ///
    /// 4. En passant target square, or "-". Defaults to "-". A square no pawn can capture on is dropped.
    ///
    /// 5. Halfmove clock. Defaults to 0.
    ///
    /// 6. Fullmove number. Defaults to 1.
    pub fn from_fen(variant: Arc<Variant>, fen: &str, chess960: bool) -> Result<Board, FenError> {
        let mut board = Board::empty(variant, chess960);

        let mut fields = fen.split_whitespace();
        board.read_piece_placement(fields.next().ok_or(FenError::MissingField)?)?;
        board.read_active_color(fields.next().ok_or(FenError::MissingField)?)?;
        let castling_rights = board.read_castling(fields.next().unwrap_or("-"))?;
        let en_passant_square = board.read_en_passant_square(fields.next().unwrap_or("-"))?;

        let rule50 = match fields.next() {
            Some(field) => field.parse().map_err(|_| FenError::InvalidHalfmoveClock)?,
            None => 0,
        };
        let fullmove_number: u16 = match fields.next() {
            Some(field) => field.parse().map_err(|_| FenError::InvalidFullmoveNumber)?,
            None => 1,
        };
        board.game_ply = fullmove_number
            .max(1)
            .saturating_sub(1)
            .saturating_mul(2)
            .saturating_add(u16::from(board.side_to_move == Color::Black));

        board.validate()?;

        board.state = StateNode::root(StateInfo {
            castling_rights,
            en_passant_square,
            rule50,
            plies_from_null: 0,
            key: board.compute_key(castling_rights, en_passant_square),
            checkers: board.checkers(),
            repetition: 0,
            last_move: None,
        });

        Ok(board)
    }

    fn piece_from_char(&self, c: char) -> Option<Piece> {
        let piece_type = self.variant.piece_type_from_char(c)?;
        let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
        Some(Piece::new(color, piece_type))
    }

    fn piece_to_char(&self, piece: Piece) -> Option<char> {
        let c = self.variant.piece_char(piece.piece_type())?;
        Some(match piece.color() {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        })
    }

    fn read_piece_placement(&mut self, piece_placement: &str) -> Result<(), FenError> {
        let (placement, hand) = match piece_placement.find('[') {
            Some(index) => {
                let hand = piece_placement[index + 1..].strip_suffix(']').ok_or(FenError::InvalidHand)?;
                (&piece_placement[..index], Some(hand))
            }
            None => (piece_placement, None),
        };

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != usize::from(self.variant.max_rank()) + 1 {
            return Err(FenError::InvalidPiecePlacement);
        }
        let file_count = usize::from(self.variant.max_file()) + 1;

        for (index, rank_text) in ranks.iter().enumerate() {
            let rank = Rank::from((ranks.len() - 1 - index) as u8);
            let mut file = 0;
            let mut chars = rank_text.chars().peekable();

            while let Some(c) = chars.next() {
                if let Some(digit) = c.to_digit(10) {
                    let mut empty = digit as usize;
                    while let Some(next) = chars.peek().and_then(|c| c.to_digit(10)) {
                        empty = empty * 10 + next as usize;
                        if file + empty > file_count {
                            return Err(FenError::InvalidPiecePlacement);
                        }
                        chars.next();
                    }
                    file += empty;
                } else if c == '~' {
                    let previous = file.checked_sub(1).ok_or(FenError::InvalidPiecePlacement)?;
                    let square = Square::new(File::from(previous as u8), rank);
                    if self.piece_on(square).is_none() {
                        return Err(FenError::InvalidPiecePlacement);
                    }
                    self.promoted |= square;
                } else {
                    if file >= file_count {
                        return Err(FenError::InvalidPiecePlacement);
                    }
                    let square = Square::new(File::from(file as u8), rank);
                    if c == '*' {
                        self.walls |= square;
                    } else {
                        let piece = self.piece_from_char(c).ok_or(FenError::InvalidPiecePlacement)?;
                        self.put_piece(piece, square);
                    }
                    file += 1;
                }

                if file > file_count {
                    return Err(FenError::InvalidPiecePlacement);
                }
            }

            if file != file_count {
                return Err(FenError::InvalidPiecePlacement);
            }
        }

        if let Some(hand) = hand {
            self.read_hand(hand)?;
        }
        Ok(())
    }

    fn read_hand(&mut self, hand: &str) -> Result<(), FenError> {
        for c in hand.chars().filter(|c| *c != '-') {
            let piece = self.piece_from_char(c).ok_or(FenError::InvalidHand)?;
            if !self.variant.captures_to_hand() || piece.piece_type() == PieceType::King {
                return Err(FenError::InvalidHand);
            }
            let count = &mut self.hands[usize::from(piece.color())][usize::from(piece.piece_type())];
            *count = count.saturating_add(1);
        }
        Ok(())
    }

    fn read_active_color(&mut self, active_color: &str) -> Result<(), FenError> {
        self.side_to_move = match active_color {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(FenError::InvalidActiveColor),
        };
        Ok(())
    }

    fn read_castling(&mut self, castling_availability: &str) -> Result<CastlingRight, FenError> {
        let mut rights = CastlingRight::empty();
        if castling_availability == "-" {
            return Ok(rights);
        }

        for c in castling_availability.chars() {
            let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
            let rank = self.relative_rank(color, Rank::R1);
            let king = self
                .king_square(color)
                .filter(|king| king.rank() == rank)
                .ok_or(FenError::InvalidCastlingAvailability)?;
            let rooks = self.pieces_of(color, PieceType::Rook) & Bitboard::from(rank);

            let rook = match c.to_ascii_lowercase() {
                'k' => rooks.into_iter().filter(|rook| rook.file() > king.file()).last(),
                'q' => rooks.into_iter().find(|rook| rook.file() < king.file()),
                c => File::try_from(c)
                    .ok()
                    .filter(|file| *file <= self.variant.max_file())
                    .map(|file| Square::new(file, rank))
                    .filter(|rook| rooks.get(*rook)),
            }
            .ok_or(FenError::InvalidCastlingAvailability)?;

            if !self.variant.castling() {
                continue;
            }

            let side = if rook.file() > king.file() { CastlingSide::Kingside } else { CastlingSide::Queenside };
            let right = CastlingRight::new(color, side);
            rights |= right;
            self.castling_rook_squares[CastlingRight::index(color, side)] = Some(rook);
            self.castling_rights_mask[usize::from(king)] |= right;
            self.castling_rights_mask[usize::from(rook)] |= right;
        }

        Ok(rights)
    }

    fn read_en_passant_square(&self, en_passant_square: &str) -> Result<Option<Square>, FenError> {
        if en_passant_square == "-" {
            return Ok(None);
        }

        let us = self.side_to_move;
        let them = !us;
        let square = Square::try_from(en_passant_square).map_err(|_| FenError::InvalidEnPassantSquare)?;
        let expected_rank = self.variant.max_rank().offset(-2).ok_or(FenError::InvalidEnPassantSquare)?;
        if !self.board_mask.get(square) || square.rank() != self.relative_rank(us, expected_rank) {
            return Err(FenError::InvalidEnPassantSquare);
        }

        let pushed = square.offset(0, them.forward());
        let origin = square.offset(0, -them.forward());
        let capturable = pushed.and_then(|pushed| self.piece_on(pushed)) == Some(Piece::new(them, PieceType::Pawn))
            && self.piece_on(square).is_none()
            && origin.is_some_and(|origin| self.piece_on(origin).is_none())
            && (crate::chess::attacks::attacks_from_pawn(them, square, self.board_mask)
                & self.pieces_of(us, PieceType::Pawn))
            .has_any();

        Ok(capturable.then_some(square))
    }

    fn validate(&self) -> Result<(), FenError> {
        for color in Color::ALL {
            if self.pieces_of(color, PieceType::King).popcnt() != 1 {
                return Err(FenError::InvalidKingCount);
            }
        }

        let pawns = self.pieces_of(Color::White, PieceType::Pawn) | self.pieces_of(Color::Black, PieceType::Pawn);
        if (pawns & (Bitboard::from(Rank::R1) | Bitboard::from(self.variant.max_rank()))).has_any() {
            return Err(FenError::PawnOnBackRank);
        }

        let them = !self.side_to_move;
        if let Some(king) = self.king_square(them) {
            if self.attackers_to(king, self.occupied() | self.walls, self.side_to_move).has_any() {
                return Err(FenError::OpponentInCheck);
            }
        }
        Ok(())
    }

    //==================================================================================================================
    // Writing
    //==================================================================================================================

    /// Writes the position as a FEN string, or as an SFEN string when `sfen` is set.
    ///
    /// The move number written is never lower than `move_counter_floor`. Promoted pieces are marked with a '~' in
    /// variants with drops, and in every variant when `show_promoted` is set.
    pub fn to_fen(&self, sfen: bool, show_promoted: bool, move_counter_floor: u16) -> String {
        let mut fen = self.placement_text(show_promoted || self.variant.captures_to_hand());

        if sfen {
            let side = match self.side_to_move {
                Color::White => 'b',
                Color::Black => 'w',
            };
            let move_number = self.game_ply.saturating_add(1).max(move_counter_floor);
            let _ = write!(fen, " {} {} {}", side, self.sfen_hand_text(), move_number);
            return fen;
        }

        if self.variant.captures_to_hand() {
            let _ = write!(fen, "[{}]", self.hand_text());
        }

        let info = self.state.info();
        let en_passant = info.en_passant_square.map_or_else(|| String::from("-"), |square| square.to_string());
        let fullmove_number = (self.game_ply / 2).saturating_add(1).max(move_counter_floor);
        let _ = write!(
            fen,
            " {} {} {} {} {}",
            char::from(self.side_to_move),
            self.castling_text(),
            en_passant,
            info.rule50,
            fullmove_number
        );
        fen
    }

    fn placement_text(&self, show_promoted: bool) -> String {
        let mut text = String::new();
        let max_rank = self.variant.max_rank();

        for rank in Rank::ALL.into_iter().filter(|rank| *rank <= max_rank).rev() {
            let mut empty = 0;
            for file in File::ALL.into_iter().filter(|file| *file <= self.variant.max_file()) {
                let square = Square::new(file, rank);
                let c = if self.walls.get(square) {
                    Some('*')
                } else {
                    self.piece_on(square).and_then(|piece| self.piece_to_char(piece))
                };

                match c {
                    Some(c) => {
                        if empty > 0 {
                            let _ = write!(text, "{}", empty);
                            empty = 0;
                        }
                        text.push(c);
                        if show_promoted && self.promoted.get(square) {
                            text.push('~');
                        }
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                let _ = write!(text, "{}", empty);
            }
            if rank != Rank::R1 {
                text.push('/');
            }
        }
        text
    }

    fn hand_pieces(&self) -> impl Iterator<Item = (Piece, u8)> + '_ {
        Color::ALL.into_iter().flat_map(move |color| {
            PieceType::ALL
                .into_iter()
                .rev()
                .map(move |piece_type| (Piece::new(color, piece_type), self.hand(color, piece_type)))
                .filter(|(_, count)| *count > 0)
        })
    }

    fn hand_text(&self) -> String {
        let mut text = String::new();
        for (piece, count) in self.hand_pieces() {
            if let Some(c) = self.piece_to_char(piece) {
                text.extend(std::iter::repeat(c).take(count as usize));
            }
        }
        text
    }

    fn sfen_hand_text(&self) -> String {
        let mut text = String::new();
        for (piece, count) in self.hand_pieces() {
            if let Some(c) = self.piece_to_char(piece) {
                if count > 1 {
                    let _ = write!(text, "{}", count);
                }
                text.push(c);
            }
        }
        if text.is_empty() {
            text.push('-');
        }
        text
    }

    fn castling_text(&self) -> String {
        let rights = self.state.info().castling_rights;
        let mut text = String::new();

        for color in Color::ALL {
            for side in CastlingSide::ALL {
                if !rights.contains(CastlingRight::new(color, side)) {
                    continue;
                }
                let Some(rook) = self.castling_rook_square(color, side) else {
                    continue;
                };

                let rooks = self.pieces_of(color, PieceType::Rook) & Bitboard::from(rook.rank());
                let outermost = match side {
                    CastlingSide::Kingside => rooks.msb() == Some(rook),
                    CastlingSide::Queenside => rooks.lsb() == Some(rook),
                };
                let c = match (self.chess960 || !outermost, side) {
                    (true, _) => char::from(rook.file()),
                    (false, CastlingSide::Kingside) => 'k',
                    (false, CastlingSide::Queenside) => 'q',
                };
                text.push(match color {
                    Color::White => c.to_ascii_uppercase(),
                    Color::Black => c,
                });
            }
        }

        if text.is_empty() {
            text.push('-');
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant;

    fn read(variant: &str, fen: &str) -> Result<Board, FenError> {
        Board::from_fen(variant::get(variant).unwrap(), fen, false)
    }

    mod from_fen {
        use super::*;

        #[test]
        fn test_missing_fields() {
            assert_eq!(read("chess", "").err(), Some(FenError::MissingField));
            assert_eq!(read("chess", "4k3/8/8/8/8/8/8/4K3").err(), Some(FenError::MissingField));
        }

        #[test]
        fn test_optional_counters() {
            let board = read("chess", "4k3/8/8/8/8/8/8/4K3 b").unwrap();
            assert_eq!(board.to_fen(false, false, 0), "4k3/8/8/8/8/8/8/4K3 b - - 0 1");
        }

        #[test]
        fn test_invalid_piece_placement() {
            assert_eq!(read("chess", "4k3/8/8/8/8/8/8/4K4 w - - 0 1").err(), Some(FenError::InvalidPiecePlacement));
            assert_eq!(read("chess", "4k3/8/8/8/8/8/4K3 w - - 0 1").err(), Some(FenError::InvalidPiecePlacement));
            assert_eq!(read("chess", "4k3/8/8/8/8/8/8/4K2X w - - 0 1").err(), Some(FenError::InvalidPiecePlacement));
            assert_eq!(read("shatranj", "4k3/8/8/8/8/8/8/3QK3 w - - 0 1").map(|_| ()), Ok(()));
            assert_eq!(read("chess", "4k3/8/8/8/8/8/8/3AK3 w - - 0 1").err(), Some(FenError::InvalidPiecePlacement));
        }

        #[test]
        fn test_long_empty_run() {
            let fen = "4k3/8/8/8/8/8/8/99999999999999999999999 w - - 0 1";
            assert_eq!(read("chess", fen).err(), Some(FenError::InvalidPiecePlacement));
            let wide = "4k5/10/10/10/10/10/10/4K15 w - - 0 1";
            assert_eq!(read("capablanca", wide).err(), Some(FenError::InvalidPiecePlacement));
            assert!(!crate::variant::validate_fen("chess", fen, false));
        }

        #[test]
        fn test_invalid_active_color() {
            assert_eq!(read("chess", "4k3/8/8/8/8/8/8/4K3 x - - 0 1").err(), Some(FenError::InvalidActiveColor));
        }

        #[test]
        fn test_invalid_castling() {
            assert_eq!(
                read("chess", "4k3/8/8/8/8/8/8/4K3 w K - 0 1").err(),
                Some(FenError::InvalidCastlingAvailability)
            );
            assert_eq!(
                read("chess", "4k3/8/8/8/8/8/8/R3K3 w Z - 0 1").err(),
                Some(FenError::InvalidCastlingAvailability)
            );
        }

        #[test]
        fn test_king_count() {
            assert_eq!(read("chess", "8/8/8/8/8/8/8/4K3 w - - 0 1").err(), Some(FenError::InvalidKingCount));
            assert_eq!(read("chess", "4k3/8/8/8/8/8/8/3KK3 w - - 0 1").err(), Some(FenError::InvalidKingCount));
        }

        #[test]
        fn test_pawn_on_back_rank() {
            assert_eq!(read("chess", "4k2P/8/8/8/8/8/8/4K3 w - - 0 1").err(), Some(FenError::PawnOnBackRank));
        }

        #[test]
        fn test_opponent_in_check() {
            assert_eq!(read("chess", "4k3/8/8/8/8/8/8/4KR1r w - - 0 1").map(|_| ()), Ok(()));
            assert_eq!(read("chess", "4k3/8/8/8/8/8/8/4R2K w - - 0 1").err(), Some(FenError::OpponentInCheck));
        }

        #[test]
        fn test_en_passant_square() {
            let board = read("chess", "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
            assert_eq!(board.state().info().en_passant_square, Square::try_from("d6").ok());

            let board = read("chess", "4k3/8/8/3p4/8/8/4P3/4K3 w - d6 0 1").unwrap();
            assert_eq!(board.state().info().en_passant_square, None);

            assert_eq!(
                read("chess", "4k3/8/8/3pP3/8/8/8/4K3 w - d3 0 1").err(),
                Some(FenError::InvalidEnPassantSquare)
            );
        }

        #[test]
        fn test_hand() {
            let board = read("crazyhouse", "4k3/8/8/8/8/8/8/4K3[QNp] w - - 0 1").unwrap();
            assert_eq!(board.hand(Color::White, PieceType::Queen), 1);
            assert_eq!(board.hand(Color::White, PieceType::Knight), 1);
            assert_eq!(board.hand(Color::Black, PieceType::Pawn), 1);

            assert_eq!(read("crazyhouse", "4k3/8/8/8/8/8/8/4K3[K] w - - 0 1").err(), Some(FenError::InvalidHand));
            assert_eq!(read("chess", "4k3/8/8/8/8/8/8/4K3[Q] w - - 0 1").err(), Some(FenError::InvalidHand));
        }

        #[test]
        fn test_walls_and_wide_boards() {
            let board = read("capablanca", "rnabqkbcnr/pppppppppp/10/4*5/10/10/PPPPPPPPPP/RNABQKBCNR w KQkq - 0 1")
                .unwrap();
            assert!(board.walls().get(Square::try_from("e5").unwrap()));
            assert_eq!(board.occupied().popcnt(), 40);
        }
    }

    mod to_fen {
        use super::*;

        #[test]
        fn test_round_trip() {
            for (variant, fen) in [
                ("chess", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
                ("chess", "r3k2r/8/8/3pP3/8/8/8/R3K2R w Kq d6 3 12"),
                ("crazyhouse", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR[] w KQkq - 0 1"),
                ("crazyhouse", "4k3/8/8/8/8/8/8/3QK3[Nnpp] b - - 0 20"),
                ("capablanca", "rnabqkbcnr/pppppppppp/10/10/4*5/10/PPPPPPPPPP/RNABQKBCNR w KQkq - 0 1"),
                ("shatranj", "rnbkqbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBKQBNR w - - 0 1"),
            ] {
                assert_eq!(read(variant, fen).unwrap().to_fen(false, false, 0), fen);
            }
        }

        #[test]
        fn test_promoted_marker() {
            let fen = "4k3/8/8/8/8/8/8/3Q~K3[] w - - 0 1";
            assert_eq!(read("crazyhouse", fen).unwrap().to_fen(false, false, 0), fen);
        }

        #[test]
        fn test_chess960_castling_letters() {
            let board = Board::from_fen(
                variant::get("chess").unwrap(),
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
                true,
            )
            .unwrap();
            assert_eq!(board.to_fen(false, false, 0), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w HAha - 0 1");
        }

        #[test]
        fn test_inner_rook_uses_file_letter() {
            let fen = "4k3/8/8/8/8/8/8/R1R1K3 w C - 0 1";
            assert_eq!(read("chess", fen).unwrap().to_fen(false, false, 0), fen);
        }

        #[test]
        fn test_move_counter_floor() {
            let board = read("chess", "4k3/8/8/8/8/8/8/4K3 w - - 0 5").unwrap();
            assert_eq!(board.to_fen(false, false, 0), "4k3/8/8/8/8/8/8/4K3 w - - 0 5");
            assert_eq!(board.to_fen(false, false, 30), "4k3/8/8/8/8/8/8/4K3 w - - 0 30");
            assert_eq!(board.to_fen(false, false, u16::MAX), "4k3/8/8/8/8/8/8/4K3 w - - 0 65535");
        }

        #[test]
        fn test_sfen() {
            let board = read("crazyhouse", "4k3/8/8/8/8/8/8/4K3[PPn] b - - 0 3").unwrap();
            assert_eq!(board.to_fen(true, false, 0), "4k3/8/8/8/8/8/8/4K3 w 2Pn 6");
        }
    }
}
