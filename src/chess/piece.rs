use std::fmt::Display;

/// Represents the color of a piece.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const COUNT: usize = 2;

    /// Represents all colors.
    pub const ALL: [Color; Color::COUNT] = [Color::White, Color::Black];

    /// Returns the rank direction in which pawns of this color advance.
    pub fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Color;

    /// Returns the opposite color.
    fn not(self) -> Self::Output {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

impl From<Color> for usize {
    fn from(color: Color) -> Self {
        color as usize
    }
}

impl From<Color> for char {
    /// Converts the color to its FEN side-to-move character.
    fn from(color: Color) -> Self {
        match color {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

/// Every piece type known to the rule engine.
///
/// Which of them take part in a game, and which characters represent them, is decided by the variant.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PieceType {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
    Fers = 6,
    Alfil = 7,
    Archbishop = 8,
    Chancellor = 9,
}

impl PieceType {
    pub const COUNT: usize = 10;

    /// Represents all piece types, ordered by id.
    pub const ALL: [PieceType; PieceType::COUNT] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
        PieceType::Fers,
        PieceType::Alfil,
        PieceType::Archbishop,
        PieceType::Chancellor,
    ];

    /// Returns the lowercase name of the piece type.
    pub fn name(self) -> &'static str {
        match self {
            PieceType::Pawn => "pawn",
            PieceType::Knight => "knight",
            PieceType::Bishop => "bishop",
            PieceType::Rook => "rook",
            PieceType::Queen => "queen",
            PieceType::King => "king",
            PieceType::Fers => "fers",
            PieceType::Alfil => "alfil",
            PieceType::Archbishop => "archbishop",
            PieceType::Chancellor => "chancellor",
        }
    }

    /// Returns the movement of the piece type in Betza notation.
    pub fn betza(self) -> &'static str {
        match self {
            PieceType::Pawn => "fmWfceF",
            PieceType::Knight => "N",
            PieceType::Bishop => "B",
            PieceType::Rook => "R",
            PieceType::Queen => "Q",
            PieceType::King => "K",
            PieceType::Fers => "F",
            PieceType::Alfil => "A",
            PieceType::Archbishop => "BN",
            PieceType::Chancellor => "RN",
        }
    }

    /// Returns true for piece types whose moves are confined to squares of a single color.
    pub fn is_color_bound(self) -> bool {
        matches!(self, PieceType::Bishop | PieceType::Fers | PieceType::Alfil)
    }

    /// Returns true for piece types able to force mate together with their king.
    pub fn is_mating(self) -> bool {
        matches!(self, PieceType::Rook | PieceType::Queen | PieceType::Archbishop | PieceType::Chancellor)
    }
}

impl From<PieceType> for u8 {
    fn from(piece_type: PieceType) -> Self {
        piece_type as u8
    }
}

impl From<PieceType> for usize {
    fn from(piece_type: PieceType) -> Self {
        piece_type as usize
    }
}

impl From<u8> for PieceType {
    /// Converts a `u8` value to a `PieceType`.
    fn from(value: u8) -> Self {
        assert!(value < PieceType::COUNT as u8);
        PieceType::ALL[value as usize]
    }
}

impl Display for PieceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Represents a piece on the board.
///
/// A `Piece` is a combination of a `Color` and a `PieceType` stored in a single byte, with the lowest bit holding the
/// color and the higher bits holding the piece type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Piece(u8);

impl Piece {
    pub const COUNT: usize = PieceType::COUNT * Color::COUNT;

    /// Creates a new `Piece` with the given `Color` and `PieceType`.
    pub const fn new(color: Color, piece_type: PieceType) -> Self {
        Piece((piece_type as u8) << 1 | color as u8)
    }

    /// Returns the color of the piece.
    pub fn color(self) -> Color {
        if self.0 & 1 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    /// Returns the type of the piece.
    pub fn piece_type(self) -> PieceType {
        PieceType::from(self.0 >> 1)
    }
}

impl From<Piece> for usize {
    fn from(piece: Piece) -> Self {
        piece.0 as usize
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.color(), self.piece_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod color_tests {
        use super::*;

        #[test]
        fn test_color_display() {
            assert_eq!(format!("{}", Color::White), "White");
            assert_eq!(format!("{}", Color::Black), "Black");
        }

        #[test]
        fn test_not() {
            assert_eq!(!Color::White, Color::Black);
            assert_eq!(!Color::Black, Color::White);
        }

        #[test]
        fn test_forward() {
            assert_eq!(Color::White.forward(), 1);
            assert_eq!(Color::Black.forward(), -1);
        }
    }

    mod piece_type_tests {
        use super::*;

        #[test]
        fn test_piece_type_conversion() {
            for (id, piece_type) in PieceType::ALL.iter().enumerate() {
                assert_eq!(usize::from(*piece_type), id);
                assert_eq!(PieceType::from(id as u8), *piece_type);
            }
        }

        #[test]
        fn test_names_are_unique() {
            let mut names: Vec<_> = PieceType::ALL.iter().map(|pt| pt.name()).collect();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), PieceType::COUNT);
        }

        #[test]
        fn test_betza() {
            assert_eq!(PieceType::Knight.betza(), "N");
            assert_eq!(PieceType::Chancellor.betza(), "RN");
        }
    }

    mod piece_tests {
        use super::*;

        #[test]
        fn test_piece_creation() {
            for color in Color::ALL {
                for piece_type in PieceType::ALL {
                    let piece = Piece::new(color, piece_type);
                    assert_eq!(piece.color(), color);
                    assert_eq!(piece.piece_type(), piece_type);
                    assert!(usize::from(piece) < Piece::COUNT);
                }
            }
        }

        #[test]
        fn test_display_for_piece() {
            assert_eq!(format!("{}", Piece::new(Color::White, PieceType::Pawn)), "White pawn");
            assert_eq!(format!("{}", Piece::new(Color::Black, PieceType::Archbishop)), "Black archbishop");
        }
    }
}
