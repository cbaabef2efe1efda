use super::board::Board;
use crate::{
    chess::{Bitboard, Color, PieceType},
    outcome::{Value, VALUE_DRAW, VALUE_MATE},
};

impl Board {
    /// Returns the result of the game if a variant rule ends it immediately, from the point of view of the side to move.
    pub fn is_immediate_end(&self) -> Option<Value> {
        let us = self.side_to_move;
        let them = !us;

        let flag_region = self.variant.flag_region();
        if flag_region.has_any() {
            if (flag_region & self.pieces_of(them, PieceType::King)).has_any() {
                return Some(-VALUE_MATE);
            }
            if (flag_region & self.pieces_of(us, PieceType::King)).has_any() {
                return Some(VALUE_MATE);
            }
        }

        if self.variant.bare_king_loses() {
            let ours = self.pieces(us) & !self.pieces_of(us, PieceType::King);
            let theirs = self.pieces(them) & !self.pieces_of(them, PieceType::King);

            if ours.has_none() && theirs.has_any() {
                // A lone king that can take the last enemy piece bares the opponent in turn.
                let counter_bares = !theirs.has_many()
                    && self.legal_moves().iter().any(|mv| mv.captured().is_some() && theirs.get(mv.to_square()));
                if !counter_bares {
                    return Some(-VALUE_MATE);
                }
            }
            if theirs.has_none() && ours.has_any() {
                return Some(VALUE_MATE);
            }
        }

        None
    }

    /// Returns the result of the game if it can be ended by a claim, from the point of view of the side to move.
    ///
    /// The n-move rule counts the larger of the halfmove clock and `plies_since_progress`. Repetitions are draws unless
    /// the variant forbids perpetual check, in which case the side that checked on every move of the cycle loses.
    pub fn is_optional_end(&self, plies_since_progress: u16) -> Option<Value> {
        let node = self.state();
        let info = node.info();

        let n_move_rule = self.variant.n_move_rule();
        if n_move_rule > 0 {
            let clock = info.rule50.max(plies_since_progress);
            if clock >= n_move_rule.saturating_mul(2) && (info.checkers.has_none() || !self.legal_moves().is_empty()) {
                return Some(VALUE_DRAW);
            }
        }

        let n_fold_rule = self.variant.n_fold_rule();
        if n_fold_rule > 0 {
            let end = self.repetition_window(info) as usize;
            let checked = |plies: usize| node.ancestor(plies).is_some_and(|node| node.info().checkers.has_any());

            let mut count = 0;
            let mut perpetual_them = info.checkers.has_any() && checked(2);
            let mut perpetual_us = checked(1) && checked(3);

            let mut ply = 4;
            while ply <= end {
                let Some(earlier) = node.ancestor(ply) else {
                    break;
                };
                perpetual_them &= earlier.info().checkers.has_any();

                if earlier.info().key == info.key {
                    count += 1;
                    if count + 1 == n_fold_rule {
                        let value = if !self.variant.perpetual_check_illegal() {
                            VALUE_DRAW
                        } else if perpetual_them && !perpetual_us {
                            VALUE_MATE
                        } else if perpetual_us && !perpetual_them {
                            -VALUE_MATE
                        } else {
                            VALUE_DRAW
                        };
                        return Some(value);
                    }
                }

                if ply < end {
                    perpetual_us &= checked(ply + 1);
                }
                ply += 2;
            }
        }

        None
    }

    /// Returns true if the position is drawn by the n-move rule or by a repetition.
    ///
    /// A repetition counts when it happened after the search root (`ply` plies ago) or when it is the third occurrence.
    pub fn is_draw(&self, ply: i32) -> bool {
        let info = self.state().info();
        let n_move_rule = self.variant.n_move_rule();
        if n_move_rule > 0
            && info.rule50 >= n_move_rule.saturating_mul(2)
            && (info.checkers.has_none() || !self.legal_moves().is_empty())
        {
            return true;
        }

        info.repetition != 0 && info.repetition < ply
    }

    /// Returns true if a position repeated since the last irreversible move.
    pub fn has_repeated(&self) -> bool {
        let mut node = self.state();
        let mut end = self.repetition_window(node.info()) as i32;

        while end >= 4 {
            end -= 1;
            if node.info().repetition != 0 {
                return true;
            }
            match node.previous() {
                Some(previous) => node = previous,
                None => break,
            }
        }
        false
    }

    /// Returns true if the side to move can reach an earlier position of the game with a reversible move.
    ///
    /// Positions before the search root (`ply` plies ago) only count when they were themselves repeated.
    pub fn has_game_cycle(&self, ply: i32) -> bool {
        let node = self.state();
        let end = self.repetition_window(node.info()) as usize;
        if end < 3 {
            return false;
        }

        for mv in self.legal_moves().into_iter().filter(|mv| !mv.is_irreversible()) {
            let key = self.key_after(mv);
            let mut distance = 3;
            while distance <= end {
                let Some(earlier) = node.ancestor(distance) else {
                    break;
                };
                if earlier.info().key == key && (ply > distance as i32 || earlier.info().repetition != 0) {
                    return true;
                }
                distance += 2;
            }
        }
        false
    }

    /// Returns true if `color` cannot checkmate the opponent with the material left on the board, however the
    /// opponent plays.
    pub fn has_insufficient_material(&self, color: Color) -> bool {
        if self.variant.captures_to_hand()
            || self.variant.bare_king_loses()
            || self.variant.flag_region().has_any()
            || PieceType::ALL.into_iter().any(|piece_type| self.hand(color, piece_type) > 0)
        {
            return false;
        }

        let ours = self.pieces(color);
        if self
            .variant
            .piece_types()
            .any(|piece_type| piece_type.is_mating() && self.pieces_of(color, piece_type).has_any())
        {
            return false;
        }
        if self.pieces_of(color, PieceType::Pawn).has_any()
            && self.variant.promotion_piece_types().iter().any(|piece_type| piece_type.is_mating())
        {
            return false;
        }

        let kings = self.pieces_of(Color::White, PieceType::King) | self.pieces_of(Color::Black, PieceType::King);
        let non_kings = self.occupied() & !kings;
        let color_bound = self
            .variant
            .piece_types()
            .filter(|piece_type| piece_type.is_color_bound())
            .fold(Bitboard::EMPTY, |bb, piece_type| {
                bb | self.pieces_of(Color::White, piece_type) | self.pieces_of(Color::Black, piece_type)
            });
        let unbound = non_kings & !color_bound;
        let dark = Bitboard::dark_squares();
        let stalemate_wins = self.variant.stalemate_value() != VALUE_DRAW;

        if (color_bound & ours).has_any()
            && (((color_bound & dark).has_any() && (color_bound & !dark).has_any())
                || unbound.has_any()
                || stalemate_wins)
        {
            return false;
        }

        if (unbound & ours).has_any() && (non_kings.popcnt() >= 2 || stalemate_wins) {
            return false;
        }

        true
    }
}
