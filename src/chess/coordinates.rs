use std::fmt::Display;

use thiserror::Error;

/// Errors raised when parsing coordinates from text.
#[derive(Error, Debug, PartialEq)]
pub enum CoordinatesError {
    #[error("Invalid file character: {0:?}")]
    InvalidFile(char),

    #[error("Invalid rank: {0:?}")]
    InvalidRank(String),

    #[error("Invalid square: {0:?}")]
    InvalidSquare(String),
}

/// Represents a file (column) on a board.
///
/// Files are labeled from A to L, going from left to right when viewing the board from White's perspective. Variants
/// use a prefix of these files; standard chess uses A to H.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
    I = 8,
    J = 9,
    K = 10,
    L = 11,
}

impl File {
    pub const COUNT: usize = 12;

    /// Represents all files of the largest supported board.
    #[rustfmt::skip]
    pub const ALL: [File; File::COUNT] = [
        File::A, File::B, File::C, File::D, File::E, File::F,
        File::G, File::H, File::I, File::J, File::K, File::L,
    ];

    /// Returns the file `delta` columns away, if it exists.
    pub fn offset(self, delta: i8) -> Option<File> {
        let value = u8::from(self) as i8 + delta;
        if (0..File::COUNT as i8).contains(&value) {
            Some(File::from(value as u8))
        } else {
            None
        }
    }
}

impl Display for File {
    /// Formats the file as a single lowercase letter.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

impl From<File> for char {
    fn from(file: File) -> Self {
        (u8::from(file) + b'a') as char
    }
}

impl TryFrom<char> for File {
    type Error = CoordinatesError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase() {
            c @ 'a'..='l' => Ok(File::from(c as u8 - b'a')),
            _ => Err(CoordinatesError::InvalidFile(value)),
        }
    }
}

impl From<u8> for File {
    /// Converts a `u8` value to a `File`.
    fn from(value: u8) -> Self {
        assert!(value < File::COUNT as u8);
        File::ALL[value as usize]
    }
}

impl From<File> for u8 {
    fn from(file: File) -> Self {
        file as u8
    }
}

impl From<File> for usize {
    fn from(file: File) -> Self {
        file as usize
    }
}

/// Represents a rank (row) on a board.
///
/// Ranks are labeled from 1 to 10, going from the bottom to the top when viewing the board from White's perspective.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    R1 = 0,
    R2 = 1,
    R3 = 2,
    R4 = 3,
    R5 = 4,
    R6 = 5,
    R7 = 6,
    R8 = 7,
    R9 = 8,
    R10 = 9,
}

impl Rank {
    pub const COUNT: usize = 10;

    /// Represents all ranks of the largest supported board.
    #[rustfmt::skip]
    pub const ALL: [Rank; Rank::COUNT] = [
        Rank::R1, Rank::R2, Rank::R3, Rank::R4, Rank::R5,
        Rank::R6, Rank::R7, Rank::R8, Rank::R9, Rank::R10,
    ];

    /// Returns the rank `delta` rows away, if it exists.
    pub fn offset(self, delta: i8) -> Option<Rank> {
        let value = u8::from(self) as i8 + delta;
        if (0..Rank::COUNT as i8).contains(&value) {
            Some(Rank::from(value as u8))
        } else {
            None
        }
    }

    /// Mirrors the rank vertically on a board whose last rank is `max_rank`.
    pub fn flip(self, max_rank: Rank) -> Rank {
        Rank::from(u8::from(max_rank) - u8::from(self))
    }
}

impl Display for Rank {
    /// Formats the rank as its number (1 to 10).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", u8::from(*self) + 1)
    }
}

impl TryFrom<&str> for Rank {
    type Error = CoordinatesError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<u8>() {
            Ok(number) if (1..=Rank::COUNT as u8).contains(&number) => Ok(Rank::from(number - 1)),
            _ => Err(CoordinatesError::InvalidRank(value.to_string())),
        }
    }
}

impl From<u8> for Rank {
    /// Converts a `u8` value to a `Rank`.
    fn from(value: u8) -> Self {
        assert!(value < Rank::COUNT as u8);
        Rank::ALL[value as usize]
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> Self {
        rank as u8
    }
}

impl From<Rank> for usize {
    fn from(rank: Rank) -> Self {
        rank as usize
    }
}

/// Represents a square on the board.
///
/// Squares are indexed from 0 to 119 as `rank * 12 + file`, so that every supported board geometry (up to 12 files
/// and 10 ranks) shares the same indexing. Squares outside of a variant's bounds simply never hold pieces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

impl Square {
    pub const COUNT: usize = File::COUNT * Rank::COUNT;

    /// Creates a new square from a file and a rank.
    pub const fn new(file: File, rank: Rank) -> Square {
        Square(rank as u8 * File::COUNT as u8 + file as u8)
    }

    /// Returns the rank of the square.
    pub fn rank(self) -> Rank {
        Rank::from(self.0 / File::COUNT as u8)
    }

    /// Returns the file of the square.
    pub fn file(self) -> File {
        File::from(self.0 % File::COUNT as u8)
    }

    /// Returns the square `file_delta` files and `rank_delta` ranks away, if it exists on the largest board.
    pub fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Square> {
        Some(Square::new(self.file().offset(file_delta)?, self.rank().offset(rank_delta)?))
    }

    /// Iterates over every square of the largest supported board, from A1 to L10.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..Square::COUNT as u8).map(Square)
    }
}

impl From<Square> for u8 {
    fn from(square: Square) -> Self {
        square.0
    }
}

impl From<Square> for usize {
    fn from(square: Square) -> Self {
        square.0 as usize
    }
}

impl From<u8> for Square {
    fn from(value: u8) -> Self {
        assert!((value as usize) < Square::COUNT);
        Square(value)
    }
}

impl TryFrom<&str> for Square {
    type Error = CoordinatesError;

    /// Parses a square such as `e4` or `a10`.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut chars = value.chars();
        let file = chars.next().ok_or_else(|| CoordinatesError::InvalidSquare(value.to_string()))?;
        let file = File::try_from(file).map_err(|_| CoordinatesError::InvalidSquare(value.to_string()))?;
        let rank = Rank::try_from(chars.as_str()).map_err(|_| CoordinatesError::InvalidSquare(value.to_string()))?;
        Ok(Square::new(file, rank))
    }
}

impl Display for Square {
    /// Formats the square as a file letter followed by a rank number.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod file_tests {
        use super::*;

        #[test]
        fn test_file_display() {
            assert_eq!(format!("{}", File::A), "a");
            assert_eq!(format!("{}", File::L), "l");
        }

        #[test]
        fn test_file_conversion() {
            assert_eq!(u8::from(File::A), 0);
            assert_eq!(u8::from(File::L), 11);
            assert_eq!(File::from(7), File::H);
            assert_eq!(File::try_from('j'), Ok(File::J));
            assert!(File::try_from('m').is_err());
        }

        #[test]
        fn test_invalid_conversion_do_panic() {
            assert!(std::panic::catch_unwind(|| File::from(12)).is_err());
        }

        #[test]
        fn test_offset() {
            assert_eq!(File::A.offset(-1), None);
            assert_eq!(File::C.offset(2), Some(File::E));
            assert_eq!(File::L.offset(1), None);
        }
    }

    mod rank_tests {
        use super::*;

        #[test]
        fn test_rank_display() {
            assert_eq!(format!("{}", Rank::R1), "1");
            assert_eq!(format!("{}", Rank::R10), "10");
        }

        #[test]
        fn test_rank_parsing() {
            assert_eq!(Rank::try_from("8"), Ok(Rank::R8));
            assert_eq!(Rank::try_from("10"), Ok(Rank::R10));
            assert!(Rank::try_from("0").is_err());
            assert!(Rank::try_from("11").is_err());
        }

        #[test]
        fn test_flip() {
            assert_eq!(Rank::R1.flip(Rank::R8), Rank::R8);
            assert_eq!(Rank::R2.flip(Rank::R10), Rank::R9);
        }
    }

    mod square_tests {
        use super::*;

        #[test]
        fn test_square_creation() {
            let e5 = Square::new(File::E, Rank::R5);
            assert_eq!(File::E, e5.file());
            assert_eq!(Rank::R5, e5.rank());
            assert_eq!(u8::from(e5), 4 * 12 + 4);
        }

        #[test]
        fn test_square_display_and_parsing() {
            assert_eq!(format!("{}", Square::new(File::A, Rank::R1)), "a1");
            assert_eq!(format!("{}", Square::new(File::J, Rank::R10)), "j10");
            assert_eq!(Square::try_from("h8"), Ok(Square::new(File::H, Rank::R8)));
            assert_eq!(Square::try_from("a10"), Ok(Square::new(File::A, Rank::R10)));
            assert!(Square::try_from("z1").is_err());
            assert!(Square::try_from("a").is_err());
        }

        #[test]
        fn test_offset() {
            let a1 = Square::new(File::A, Rank::R1);
            assert_eq!(a1.offset(-1, 0), None);
            assert_eq!(a1.offset(1, 2), Some(Square::new(File::B, Rank::R3)));
        }
    }
}
