use std::{fmt::Display, str::FromStr};

use crate::{
    chess::{CastlingSide, Move, MoveType, PieceType, Square},
    engine::Board,
    error::{Error, Result},
};

/// The notations moves can be written in for humans.
///
/// The bundled chess-family variants render `San` and `Lan`. The other members name the notations of the shogi,
/// janggi and xiangqi families; asking for them yields `Error::UnsupportedNotation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notation {
    /// The notation the variant uses by default.
    Default,
    /// Standard algebraic notation, e.g. `Nf3`.
    San,
    /// Long algebraic notation, e.g. `Ng1-f3`.
    Lan,
    ShogiHosking,
    ShogiHodges,
    ShogiHodgesNumber,
    Janggi,
    XiangqiWxf,
}

impl Notation {
    pub const ALL: [Notation; 8] = [
        Notation::Default,
        Notation::San,
        Notation::Lan,
        Notation::ShogiHosking,
        Notation::ShogiHodges,
        Notation::ShogiHodgesNumber,
        Notation::Janggi,
        Notation::XiangqiWxf,
    ];

    fn name(self) -> &'static str {
        match self {
            Notation::Default => "default",
            Notation::San => "san",
            Notation::Lan => "lan",
            Notation::ShogiHosking => "shogi-hosking",
            Notation::ShogiHodges => "shogi-hodges",
            Notation::ShogiHodgesNumber => "shogi-hodges-number",
            Notation::Janggi => "janggi",
            Notation::XiangqiWxf => "xiangqi-wxf",
        }
    }
}

impl Display for Notation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Notation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Notation::ALL
            .into_iter()
            .find(|notation| notation.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidOptionValue { name: String::from("notation"), value: s.to_string() })
    }
}

fn piece_letter(board: &Board, piece_type: PieceType) -> char {
    board.variant().piece_char(piece_type).unwrap_or('?').to_ascii_uppercase()
}

/// Formats a move in engine coordinate notation: `e2e4`, `e7e8q`, `P@e4`.
///
/// Castling is written as the king's move to its destination, or as the king capturing its own rook in Chess960 mode.
pub(crate) fn uci(board: &Board, mv: Move) -> String {
    let from = mv.from_square();
    let to = mv.to_square();

    match mv.move_type() {
        MoveType::Drop => format!("{}@{}", piece_letter(board, mv.piece().piece_type()), to),
        MoveType::Castling(side) if !board.chess960() => {
            let (king_to, _) = board.castling_destinations(mv.piece().color(), side);
            format!("{}{}", from, king_to)
        }
        _ => {
            let mut text = format!("{}{}", from, to);
            if let Some(promotion) = mv.promotion() {
                text.push(piece_letter(board, promotion).to_ascii_lowercase());
            }
            text
        }
    }
}

/// Formats a legal move for humans, with a `+` or `#` suffix when it gives check or mate.
///
/// `Notation::Default` resolves to the default notation of the board's variant.
///
/// # Errors
/// * `UnsupportedNotation` - If the notation cannot be rendered for the variant
pub(crate) fn san(board: &Board, mv: Move, notation: Notation) -> Result<String> {
    let notation = match notation {
        Notation::Default => board.variant().default_notation(),
        notation => notation,
    };

    let mut text = match notation {
        Notation::San => standard_algebraic(board, mv),
        Notation::Lan => long_algebraic(board, mv),
        notation => {
            return Err(Error::UnsupportedNotation { notation, variant: board.variant().name().to_string() });
        }
    };

    let mut after = board.clone();
    after.apply_move(mv);
    if after.checkers().has_any() {
        text.push(if after.legal_moves().is_empty() { '#' } else { '+' });
    }
    Ok(text)
}

fn castling(side: CastlingSide) -> String {
    match side {
        CastlingSide::Kingside => String::from("O-O"),
        CastlingSide::Queenside => String::from("O-O-O"),
    }
}

fn standard_algebraic(board: &Board, mv: Move) -> String {
    let from = mv.from_square();
    let to = mv.to_square();
    let piece_type = mv.piece().piece_type();

    match mv.move_type() {
        MoveType::Castling(side) => return castling(side),
        MoveType::Drop => return format!("{}@{}", piece_letter(board, piece_type), to),
        _ => {}
    }

    let mut text = String::new();
    if piece_type == PieceType::Pawn {
        if mv.captured().is_some() {
            text.push(char::from(from.file()));
            text.push('x');
        }
    } else {
        text.push(piece_letter(board, piece_type));
        text.push_str(&disambiguation(board, mv));
        if mv.captured().is_some() {
            text.push('x');
        }
    }

    text.push_str(&to.to_string());
    if let Some(promotion) = mv.promotion() {
        text.push('=');
        text.push(piece_letter(board, promotion));
    }
    text
}

/// Returns the part of the origin square needed to tell the move apart from moves of identical pieces.
fn disambiguation(board: &Board, mv: Move) -> String {
    let from = mv.from_square();
    let others: Vec<Square> = board
        .legal_moves()
        .into_iter()
        .filter(|other| {
            other.piece() == mv.piece()
                && other.to_square() == mv.to_square()
                && other.from_square() != from
                && !matches!(other.move_type(), MoveType::Castling(_) | MoveType::Drop)
        })
        .map(|other| other.from_square())
        .collect();

    if others.is_empty() {
        String::new()
    } else if others.iter().all(|square| square.file() != from.file()) {
        from.file().to_string()
    } else if others.iter().all(|square| square.rank() != from.rank()) {
        from.rank().to_string()
    } else {
        from.to_string()
    }
}

fn long_algebraic(board: &Board, mv: Move) -> String {
    let piece_type = mv.piece().piece_type();

    match mv.move_type() {
        MoveType::Castling(side) => return castling(side),
        MoveType::Drop => return format!("{}@{}", piece_letter(board, piece_type), mv.to_square()),
        _ => {}
    }

    let mut text = String::new();
    if piece_type != PieceType::Pawn {
        text.push(piece_letter(board, piece_type));
    }
    text.push_str(&mv.from_square().to_string());
    text.push(if mv.captured().is_some() { 'x' } else { '-' });
    text.push_str(&mv.to_square().to_string());
    if let Some(promotion) = mv.promotion() {
        text.push('=');
        text.push(piece_letter(board, promotion));
    }
    text
}
