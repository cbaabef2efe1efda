use std::sync::Arc;

use log::trace;

use super::{
    context::{context, EngineContext},
    state::{StateInfo, StateNode},
};
use crate::{
    chess::{
        attacks::{attacks_from, attacks_from_pawn},
        Bitboard, CastlingRight, CastlingSide, Color, Move, MoveType, Piece, PieceType, Rank, Square,
    },
    variant::Variant,
    zobrist::Zobrist,
};

/// The mutable board of the bundled rule engine.
///
/// A board is a plain typed struct: cloning it copies the placement and shares two things, the head of the history
/// chain (immutable, only ever extended by allocating a new node) and the process-wide engine context.
#[derive(Clone)]
pub struct Board {
    pub(super) variant: Arc<Variant>,
    pub(super) chess960: bool,
    pub(super) board_mask: Bitboard,
    pub(super) squares: [Option<Piece>; Square::COUNT],
    pub(super) by_color: [Bitboard; Color::COUNT],
    pub(super) by_piece: [Bitboard; Piece::COUNT],
    pub(super) walls: Bitboard,
    pub(super) promoted: Bitboard,
    pub(super) hands: [[u8; PieceType::COUNT]; Color::COUNT],
    pub(super) castling_rook_squares: [Option<Square>; CastlingSide::COUNT * Color::COUNT],
    pub(super) castling_rights_mask: [CastlingRight; Square::COUNT],
    pub(super) side_to_move: Color,
    pub(super) game_ply: u16,
    pub(super) state: Arc<StateNode>,
    pub(super) context: &'static EngineContext,
}

impl Board {
    /// Creates an empty board for a variant. The history is a placeholder until a position is set up.
    pub(super) fn empty(variant: Arc<Variant>, chess960: bool) -> Board {
        Board {
            board_mask: variant.board(),
            variant,
            chess960,
            squares: [None; Square::COUNT],
            by_color: [Bitboard::EMPTY; Color::COUNT],
            by_piece: [Bitboard::EMPTY; Piece::COUNT],
            walls: Bitboard::EMPTY,
            promoted: Bitboard::EMPTY,
            hands: [[0; PieceType::COUNT]; Color::COUNT],
            castling_rook_squares: [None; CastlingSide::COUNT * Color::COUNT],
            castling_rights_mask: [CastlingRight::empty(); Square::COUNT],
            side_to_move: Color::White,
            game_ply: 0,
            state: StateNode::root(StateInfo {
                castling_rights: CastlingRight::empty(),
                en_passant_square: None,
                rule50: 0,
                plies_from_null: 0,
                key: 0,
                checkers: Bitboard::EMPTY,
                repetition: 0,
                last_move: None,
            }),
            context: context(),
        }
    }

    //==================================================================================================================
    // Accessors
    //==================================================================================================================

    /// Returns the rules the board is played with.
    pub fn variant(&self) -> &Arc<Variant> {
        &self.variant
    }

    /// Returns true if castling moves are written in the king-captures-rook form.
    pub fn chess960(&self) -> bool {
        self.chess960
    }

    /// Returns the color of the side to move.
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Returns the number of plies played since the start of the game, as counted by the FEN move number.
    pub fn game_ply(&self) -> u16 {
        self.game_ply
    }

    /// Returns the head of the history chain.
    pub fn state(&self) -> &StateNode {
        &self.state
    }

    /// Returns the piece standing on a square.
    pub fn piece_on(&self, square: Square) -> Option<Piece> {
        self.squares[usize::from(square)]
    }

    /// Returns the squares occupied by pieces of a color.
    pub fn pieces(&self, color: Color) -> Bitboard {
        self.by_color[usize::from(color)]
    }

    /// Returns the squares occupied by a specific piece.
    pub fn pieces_of(&self, color: Color, piece_type: PieceType) -> Bitboard {
        self.by_piece[usize::from(Piece::new(color, piece_type))]
    }

    /// Returns the squares occupied by pieces of either color.
    pub fn occupied(&self) -> Bitboard {
        self.pieces(Color::White) | self.pieces(Color::Black)
    }

    /// Returns the wall squares.
    pub fn walls(&self) -> Bitboard {
        self.walls
    }

    /// Returns true if the piece on `square` was obtained by promotion.
    pub fn is_promoted(&self, square: Square) -> bool {
        self.promoted.get(square)
    }

    /// Returns the number of pieces of a type a color holds in hand.
    pub fn hand(&self, color: Color, piece_type: PieceType) -> u8 {
        self.hands[usize::from(color)][usize::from(piece_type)]
    }

    /// Returns the square of the king of a color.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(color, PieceType::King).lsb()
    }

    /// Returns the square of the rook a color castles with towards a side.
    pub fn castling_rook_square(&self, color: Color, side: CastlingSide) -> Option<Square> {
        self.castling_rook_squares[CastlingRight::index(color, side)]
    }

    /// Formats a move in engine coordinate notation.
    pub fn move_to_uci(&self, mv: Move) -> String {
        crate::notation::uci(self, mv)
    }

    /// Returns the squares that stop sliding pieces.
    fn blockers(&self) -> Bitboard {
        self.occupied() | self.walls
    }

    /// Converts a rank seen from White's side to the same rank seen from `color`'s side.
    pub(crate) fn relative_rank(&self, color: Color, rank: Rank) -> Rank {
        match color {
            Color::White => rank,
            Color::Black => rank.flip(self.variant.max_rank()),
        }
    }

    //==================================================================================================================
    // Placement
    //==================================================================================================================

    pub(super) fn put_piece(&mut self, piece: Piece, square: Square) {
        self.squares[usize::from(square)] = Some(piece);
        self.by_color[usize::from(piece.color())] |= square;
        self.by_piece[usize::from(piece)] |= square;
    }

    pub(super) fn remove_piece(&mut self, square: Square) -> Option<Piece> {
        let piece = self.squares[usize::from(square)].take()?;
        self.by_color[usize::from(piece.color())] ^= square;
        self.by_piece[usize::from(piece)] ^= square;
        self.promoted &= !Bitboard::from(square);
        Some(piece)
    }

    fn move_piece(&mut self, from: Square, to: Square) {
        let promoted = self.promoted.get(from);
        if let Some(piece) = self.remove_piece(from) {
            self.put_piece(piece, to);
            if promoted {
                self.promoted |= to;
            }
        }
    }

    /// Moves a captured piece to the hand of the capturing side, demoting it first if it was promoted.
    fn capture_to_hand(&mut self, square: Square) {
        if !self.variant.captures_to_hand() {
            return;
        }
        if let Some(captured) = self.piece_on(square) {
            let piece_type = if self.promoted.get(square) { PieceType::Pawn } else { captured.piece_type() };
            let count = &mut self.hands[usize::from(!captured.color())][usize::from(piece_type)];
            *count = count.saturating_add(1);
        }
    }

    //==================================================================================================================
    // Attacks
    //==================================================================================================================

    /// Returns the pieces of `color` attacking `square` when the squares in `occupied` block sliding pieces.
    pub fn attackers_to(&self, square: Square, occupied: Bitboard, color: Color) -> Bitboard {
        self.variant.piece_types().fold(Bitboard::EMPTY, |attackers, piece_type| {
            let pieces = self.pieces_of(color, piece_type);
            if pieces.has_none() {
                attackers
            } else {
                attackers | (attacks_from(piece_type, !color, square, occupied, self.board_mask) & pieces)
            }
        })
    }

    /// Returns the pieces giving check to the side to move.
    pub fn checkers(&self) -> Bitboard {
        match self.king_square(self.side_to_move) {
            Some(king) => self.attackers_to(king, self.blockers(), !self.side_to_move),
            None => Bitboard::EMPTY,
        }
    }

    //==================================================================================================================
    // Move generation
    //==================================================================================================================

    /// Returns the moves of the side to move, without verifying that they leave its king safe.
    pub fn pseudo_legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        let us = self.side_to_move;
        let ours = self.pieces(us);
        let blockers = self.blockers();

        for from in ours {
            let Some(piece) = self.piece_on(from) else {
                continue;
            };
            match piece.piece_type() {
                PieceType::Pawn => self.generate_pawn_moves(from, piece, &mut moves),
                piece_type => {
                    let targets = attacks_from(piece_type, us, from, blockers, self.board_mask) & !ours & !self.walls;
                    for to in targets {
                        let move_type = match self.piece_on(to) {
                            Some(captured) => MoveType::Capture(captured),
                            None => MoveType::Basic,
                        };
                        moves.push(Move::new(from, to, piece, move_type));
                    }
                }
            }
        }

        self.generate_castling_moves(&mut moves);
        self.generate_drops(&mut moves);
        moves
    }

    /// Returns the legal moves of the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.pseudo_legal_moves().into_iter().filter(|mv| self.is_legal(*mv)).collect()
    }

    fn generate_pawn_moves(&self, from: Square, piece: Piece, moves: &mut Vec<Move>) {
        let us = piece.color();
        let forward = us.forward();
        let promotion_rank = self.relative_rank(us, self.variant.max_rank());
        let empty = self.board_mask & !self.blockers();

        let push_promotions = |moves: &mut Vec<Move>, to: Square, capture: Option<Piece>| {
            for promotion in self.variant.promotion_piece_types().iter().copied() {
                let move_type = match capture {
                    Some(capture) => MoveType::CapturePromotion { capture, promotion },
                    None => MoveType::Promotion(promotion),
                };
                moves.push(Move::new(from, to, piece, move_type));
            }
        };

        if let Some(to) = from.offset(0, forward).filter(|to| empty.get(*to)) {
            if to.rank() == promotion_rank {
                push_promotions(moves, to, None);
            } else {
                moves.push(Move::new(from, to, piece, MoveType::Basic));
                if self.variant.double_step() && from.rank() == self.relative_rank(us, Rank::R2) {
                    if let Some(to) = to.offset(0, forward).filter(|to| empty.get(*to)) {
                        moves.push(Move::new(from, to, piece, MoveType::TwoSquarePawnPush));
                    }
                }
            }
        }

        let attacks = attacks_from_pawn(us, from, self.board_mask);
        for to in attacks & self.pieces(!us) {
            let capture = self.piece_on(to);
            if to.rank() == promotion_rank {
                push_promotions(moves, to, capture);
            } else if let Some(capture) = capture {
                moves.push(Move::new(from, to, piece, MoveType::Capture(capture)));
            }
        }

        if let Some(en_passant) = self.state.info().en_passant_square {
            if attacks.get(en_passant) {
                moves.push(Move::new(from, en_passant, piece, MoveType::EnPassant));
            }
        }
    }

    /// Returns the destination squares of the king and the rook when `color` castles towards `side`.
    pub(crate) fn castling_destinations(&self, color: Color, side: CastlingSide) -> (Square, Square) {
        let rank = self.relative_rank(color, Rank::R1);
        let king_file = self.variant.castling_king_file(side);
        let rook_file = match side {
            CastlingSide::Kingside => king_file.offset(-1),
            CastlingSide::Queenside => king_file.offset(1),
        }
        .unwrap_or(king_file);
        (Square::new(king_file, rank), Square::new(rook_file, rank))
    }

    fn generate_castling_moves(&self, moves: &mut Vec<Move>) {
        let us = self.side_to_move;
        let info = self.state.info();
        if !self.variant.castling() || info.checkers.has_any() {
            return;
        }
        let Some(king_from) = self.king_square(us) else {
            return;
        };
        let blockers = self.blockers();

        for side in CastlingSide::ALL {
            if !info.castling_rights.contains(CastlingRight::new(us, side)) {
                continue;
            }
            let Some(rook_from) = self.castling_rook_square(us, side) else {
                continue;
            };

            let (king_to, rook_to) = self.castling_destinations(us, side);
            let king_path = Bitboard::between(king_from, king_to) | king_to;
            let path = (king_path | Bitboard::between(rook_from, rook_to) | rook_to) & !(king_from | rook_from);
            if (path & blockers).has_any() {
                continue;
            }
            if king_path.into_iter().any(|square| self.attackers_to(square, blockers, !us).has_any()) {
                continue;
            }

            moves.push(Move::new(king_from, rook_from, Piece::new(us, PieceType::King), MoveType::Castling(side)));
        }
    }

    fn generate_drops(&self, moves: &mut Vec<Move>) {
        if !self.variant.captures_to_hand() {
            return;
        }
        let us = self.side_to_move;
        let empty = self.board_mask & !self.blockers();
        let back_ranks = Bitboard::from(Rank::R1) | Bitboard::from(self.variant.max_rank());

        for piece_type in self.variant.piece_types() {
            if self.hand(us, piece_type) == 0 {
                continue;
            }
            let targets = if piece_type == PieceType::Pawn { empty & !back_ranks } else { empty };
            for to in targets {
                moves.push(Move::new_drop(to, Piece::new(us, piece_type)));
            }
        }
    }

    /// Returns true if a pseudo-legal move does not leave the king of the side to move attacked.
    pub fn is_legal(&self, mv: Move) -> bool {
        let us = self.side_to_move;
        let Some(king) = self.king_square(us) else {
            return true;
        };
        let from = mv.from_square();
        let to = mv.to_square();
        let blockers = self.blockers();

        let (king, occupied, removed) = match mv.move_type() {
            MoveType::Castling(side) => {
                let (king_to, rook_to) = self.castling_destinations(us, side);
                (king_to, (blockers ^ from ^ to) | king_to | rook_to, Bitboard::EMPTY)
            }
            MoveType::Drop => (king, blockers | to, Bitboard::EMPTY),
            MoveType::EnPassant => {
                let captured = Square::new(to.file(), from.rank());
                (king, (blockers ^ from ^ captured) | to, Bitboard::from(captured))
            }
            _ => {
                let king = if mv.piece().piece_type() == PieceType::King { to } else { king };
                (king, (blockers ^ from) | to, Bitboard::from(to))
            }
        };

        (self.attackers_to(king, occupied, !us) & !removed).has_none()
    }

    //==================================================================================================================
    // Making moves
    //==================================================================================================================

    /// Plays a legal move, appending a new node to the history.
    pub fn apply_move(&mut self, mv: Move) {
        let us = self.side_to_move;
        let them = !us;
        let from = mv.from_square();
        let to = mv.to_square();
        let previous = *self.state.info();

        let mut en_passant_square = None;
        match mv.move_type() {
            MoveType::Basic => self.move_piece(from, to),
            MoveType::Capture(_) => {
                self.capture_to_hand(to);
                self.remove_piece(to);
                self.move_piece(from, to);
            }
            MoveType::Promotion(promotion) => {
                self.remove_piece(from);
                self.put_piece(Piece::new(us, promotion), to);
                self.promoted |= to;
            }
            MoveType::CapturePromotion { promotion, .. } => {
                self.capture_to_hand(to);
                self.remove_piece(to);
                self.remove_piece(from);
                self.put_piece(Piece::new(us, promotion), to);
                self.promoted |= to;
            }
            MoveType::TwoSquarePawnPush => {
                self.move_piece(from, to);
                if let Some(skipped) = from.offset(0, us.forward()) {
                    if (attacks_from_pawn(us, skipped, self.board_mask) & self.pieces_of(them, PieceType::Pawn)).has_any()
                    {
                        en_passant_square = Some(skipped);
                    }
                }
            }
            MoveType::EnPassant => {
                let captured = Square::new(to.file(), from.rank());
                self.capture_to_hand(captured);
                self.remove_piece(captured);
                self.move_piece(from, to);
            }
            MoveType::Castling(side) => {
                let (king_to, rook_to) = self.castling_destinations(us, side);
                let king = self.remove_piece(from);
                let rook = self.remove_piece(to);
                if let (Some(king), Some(rook)) = (king, rook) {
                    self.put_piece(king, king_to);
                    self.put_piece(rook, rook_to);
                }
            }
            MoveType::Drop => {
                let count = &mut self.hands[usize::from(us)][usize::from(mv.piece().piece_type())];
                *count = count.saturating_sub(1);
                self.put_piece(mv.piece(), to);
            }
        }

        let resets_clock = mv.captured().is_some() || mv.piece().piece_type() == PieceType::Pawn;
        let castling_rights = previous.castling_rights
            & !(self.castling_rights_mask[usize::from(from)] | self.castling_rights_mask[usize::from(to)]);

        self.side_to_move = them;
        self.game_ply = self.game_ply.saturating_add(1);

        let mut info = StateInfo {
            castling_rights,
            en_passant_square,
            rule50: if resets_clock { 0 } else { previous.rule50.saturating_add(1) },
            plies_from_null: previous.plies_from_null.saturating_add(1),
            key: 0,
            checkers: self.checkers(),
            repetition: 0,
            last_move: Some(mv),
        };
        info.key = self.compute_key(castling_rights, en_passant_square);
        info.repetition = self.repetition_distance(&info);

        self.state = StateNode::extend(&self.state, info);
        trace!("Applied {:?}, history length {}", mv, self.state.len());
    }

    /// Returns the number of plies searched backwards for repetitions of the position described by `info`.
    pub(super) fn repetition_window(&self, info: &StateInfo) -> u16 {
        if self.variant.captures_to_hand() {
            info.plies_from_null
        } else {
            info.rule50.min(info.plies_from_null)
        }
    }

    /// Looks for an earlier occurrence of the position described by `info`, whose predecessor is the current head.
    fn repetition_distance(&self, info: &StateInfo) -> i32 {
        let end = self.repetition_window(info) as usize;
        let mut ply = 4;
        while ply <= end {
            // The current head is one ply behind the new position.
            let Some(node) = self.state.ancestor(ply - 1) else {
                break;
            };
            if node.info().key == info.key {
                return if node.info().repetition != 0 { -(ply as i32) } else { ply as i32 };
            }
            ply += 2;
        }
        0
    }

    //==================================================================================================================
    // Signatures
    //==================================================================================================================

    /// Computes the Zobrist signature of the current placement with the given rights.
    pub(super) fn compute_key(&self, castling_rights: CastlingRight, en_passant_square: Option<Square>) -> Zobrist {
        let keys = &self.context.zobrist;
        let mut key = 0;

        for square in self.occupied() {
            if let Some(piece) = self.piece_on(square) {
                key ^= keys.piece_square(piece, square);
            }
        }
        for color in Color::ALL {
            for piece_type in PieceType::ALL {
                key ^= keys.in_hand(Piece::new(color, piece_type), self.hand(color, piece_type));
            }
        }
        if self.side_to_move == Color::Black {
            key ^= keys.black_to_move();
        }
        key ^ keys.castling(castling_rights) ^ keys.en_passant(en_passant_square)
    }

    /// Returns the signature of the position reached by a reversible move, without playing it.
    pub(super) fn key_after(&self, mv: Move) -> Zobrist {
        let keys = &self.context.zobrist;
        let info = self.state.info();
        let castling_rights = info.castling_rights
            & !(self.castling_rights_mask[usize::from(mv.from_square())]
                | self.castling_rights_mask[usize::from(mv.to_square())]);

        info.key
            ^ keys.piece_square(mv.piece(), mv.from_square())
            ^ keys.piece_square(mv.piece(), mv.to_square())
            ^ keys.black_to_move()
            ^ keys.en_passant(info.en_passant_square)
            ^ keys.castling(info.castling_rights)
            ^ keys.castling(castling_rights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant;

    fn sq(name: &str) -> Square {
        Square::try_from(name).unwrap()
    }

    fn board(variant: &str, fen: &str) -> Board {
        Board::from_fen(variant::get(variant).unwrap(), fen, false).unwrap()
    }

    fn find(board: &Board, uci: &str) -> Move {
        board.legal_moves().into_iter().find(|mv| board.move_to_uci(*mv) == uci).unwrap()
    }

    #[test]
    fn test_start_position_has_twenty_moves() {
        let board = board("chess", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert_eq!(board.legal_moves().len(), 20);
    }

    #[test]
    fn test_pinned_piece_cannot_move() {
        let board = board("chess", "4k3/4r3/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(board.legal_moves().iter().all(|mv| mv.piece().piece_type() == PieceType::King));
    }

    #[test]
    fn test_en_passant_is_only_recorded_when_capturable() {
        let mut quiet = board("chess", "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
        quiet.apply_move(find(&quiet, "e2e4"));
        assert_eq!(quiet.state().info().en_passant_square, None);

        let mut capturable = board("chess", "4k3/8/8/8/3p4/8/4P3/4K3 w - - 0 1");
        capturable.apply_move(find(&capturable, "e2e4"));
        assert_eq!(capturable.state().info().en_passant_square, Some(sq("e3")));
        let en_passant = find(&capturable, "d4e3");
        assert_eq!(en_passant.move_type(), MoveType::EnPassant);
        capturable.apply_move(en_passant);
        assert_eq!(capturable.piece_on(sq("e4")), None);
    }

    #[test]
    fn test_castling_moves_king_and_rook() {
        let mut board = board("chess", "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        board.apply_move(find(&board, "e1g1"));
        assert_eq!(board.piece_on(sq("g1")), Some(Piece::new(Color::White, PieceType::King)));
        assert_eq!(board.piece_on(sq("f1")), Some(Piece::new(Color::White, PieceType::Rook)));
        assert_eq!(board.state().info().castling_rights, CastlingRight::BLACK_KINGSIDE | CastlingRight::BLACK_QUEENSIDE);
    }

    #[test]
    fn test_castling_through_check_is_not_generated() {
        let board = board("chess", "4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        let moves: Vec<String> = board.legal_moves().iter().map(|mv| board.move_to_uci(*mv)).collect();
        assert!(!moves.contains(&"e1g1".to_string()));
        assert!(moves.contains(&"e1c1".to_string()));
    }

    #[test]
    fn test_capture_goes_to_hand_and_can_be_dropped() {
        let mut board = board("crazyhouse", "4k3/8/8/3p4/4N3/8/8/4K3[] w - - 0 1");
        board.apply_move(find(&board, "e4d6"));
        assert_eq!(board.hand(Color::White, PieceType::Pawn), 0);

        let mut board = self::board("crazyhouse", "4k3/8/8/3p4/4P3/8/8/4K3[] w - - 0 1");
        board.apply_move(find(&board, "e4d5"));
        assert_eq!(board.hand(Color::White, PieceType::Pawn), 1);
        board.apply_move(find(&board, "e8d8"));
        let drop = find(&board, "P@e4");
        assert_eq!(drop.move_type(), MoveType::Drop);
        board.apply_move(drop);
        assert_eq!(board.hand(Color::White, PieceType::Pawn), 0);
        assert_eq!(board.piece_on(sq("e4")), Some(Piece::new(Color::White, PieceType::Pawn)));
    }

    #[test]
    fn test_promoted_piece_returns_to_hand_as_pawn() {
        let mut board = board("crazyhouse", "8/1P5k/8/8/8/8/r7/4K3[] w - - 0 1");
        board.apply_move(find(&board, "b7b8q"));
        assert!(board.is_promoted(sq("b8")));
        board.apply_move(find(&board, "a2a8"));
        board.apply_move(find(&board, "e1e2"));
        board.apply_move(find(&board, "a8b8"));
        assert_eq!(board.hand(Color::Black, PieceType::Pawn), 1);
        assert_eq!(board.hand(Color::Black, PieceType::Queen), 0);
    }

    #[test]
    fn test_key_after_matches_applied_move() {
        let board = board("chess", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        let mv = find(&board, "g1f3");
        let mut played = board.clone();
        played.apply_move(mv);
        assert_eq!(board.key_after(mv), played.state().info().key);
    }

    #[test]
    fn test_clone_does_not_affect_original() {
        let board = board("chess", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        let mut copy = board.clone();
        copy.apply_move(find(&copy, "e2e4"));
        assert_eq!(board.state().len(), 1);
        assert_eq!(copy.state().len(), 2);
        assert_eq!(board.piece_on(sq("e2")), Some(Piece::new(Color::White, PieceType::Pawn)));
    }
}
