use once_cell::sync::Lazy;

use crate::{chess::PieceType, pieces::PieceInfo, zobrist::ZobristKeys};

/// Immutable infrastructure shared by every board of the process.
pub struct EngineContext {
    pub zobrist: ZobristKeys,
    pub pieces: Vec<PieceInfo>,
}

impl EngineContext {
    fn new() -> Self {
        Self { zobrist: ZobristKeys::new(), pieces: PieceType::ALL.into_iter().map(PieceInfo::from).collect() }
    }

    /// Returns the metadata of a piece type.
    pub fn piece_info(&self, piece_type: PieceType) -> &PieceInfo {
        &self.pieces[usize::from(piece_type)]
    }
}

static CONTEXT: Lazy<EngineContext> = Lazy::new(EngineContext::new);

/// Returns the engine context, creating it on first use.
pub fn context() -> &'static EngineContext {
    &CONTEXT
}
