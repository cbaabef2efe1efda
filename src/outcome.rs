//! Classification of the end of a game.
//!
//! Values are always given from the point of view of the side to move: negative when it is losing, positive when it is
//! winning.

use crate::{
    chess::Color,
    engine::EngineHandle,
    error::{Error, Result},
    position::Position,
};

/// The value of a game result.
pub type Value = i32;

pub const VALUE_ZERO: Value = 0;
pub const VALUE_DRAW: Value = 0;
pub const VALUE_MATE: Value = 32000;

impl<E: EngineHandle> Position<E> {
    /// Returns the result of a game in which the side to move has no legal move.
    ///
    /// A variant rule ending the game takes precedence; otherwise the side to move is checkmated when in check and
    /// stalemated when not.
    ///
    /// # Errors
    /// * `PreconditionViolated` - If the side to move still has legal moves
    pub fn game_result(&self) -> Result<Value> {
        let engine = self.engine();
        if !engine.legal_moves().is_empty() {
            return Err(Error::PreconditionViolated("the game result is only defined when no legal move remains"));
        }

        if let Some(value) = engine.is_immediate_end() {
            return Ok(value);
        }
        Ok(if engine.is_in_check() { engine.checkmate_value() } else { engine.stalemate_value() })
    }

    /// Returns the result of the game if a variant rule ends it immediately.
    pub fn is_immediate_game_end(&self) -> Option<Value> {
        self.engine().is_immediate_end()
    }

    /// Returns the result of the game if it can be ended by a claim: the n-move rule or an n-fold repetition.
    ///
    /// `plies_since_progress` is a progress counter kept by the caller; the n-move rule uses it when it is larger than
    /// the engine's own halfmove clock.
    pub fn is_optional_game_end(&self, plies_since_progress: u16) -> Option<Value> {
        self.engine().is_optional_end(plies_since_progress)
    }

    /// Returns, for White and Black, whether the side lacks the material to ever win.
    pub fn has_insufficient_material(&self) -> (bool, bool) {
        let engine = self.engine();
        (engine.has_insufficient_material(Color::White), engine.has_insufficient_material(Color::Black))
    }

    /// Returns true if the side to move can reach an earlier position with a reversible move.
    pub fn has_game_cycle(&self, ply: i32) -> bool {
        self.engine().has_game_cycle(ply)
    }

    /// Returns true if a position repeated since the last capture or pawn move.
    pub fn has_repeated(&self) -> bool {
        self.engine().has_repeated()
    }

    /// Returns true if the position is drawn by the n-move rule or by repetition.
    pub fn is_draw(&self, ply: i32) -> bool {
        self.engine().is_draw(ply)
    }
}
