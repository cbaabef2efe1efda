use super::{File, Rank, Square};

/// A bitboard is a 128-bit integer with one bit per square of the largest supported board (12 files by 10 ranks).
/// Bit `n` represents the square with index `n`; the 8 highest bits are never set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(u128);

impl Bitboard {
    /// Represents an empty bitboard.
    pub const EMPTY: Bitboard = Bitboard(0);

    /// Represents every square of the largest supported board.
    pub const ALL: Bitboard = Bitboard((1u128 << Square::COUNT) - 1);

    /// Returns the value of a single square on the bitboard.
    pub fn get(self, square: Square) -> bool {
        self.0 & (1u128 << u8::from(square)) != 0
    }

    /// Returns the least significant bit of the bitboard.
    pub fn lsb(self) -> Option<Square> {
        if self.0 == 0 {
            return None;
        }

        Some((self.0.trailing_zeros() as u8).into())
    }

    /// Returns the most significant bit of the bitboard.
    pub fn msb(self) -> Option<Square> {
        if self.0 == 0 {
            return None;
        }

        Some((127 - self.0.leading_zeros() as u8).into())
    }

    /// Returns the number of set bits in the bitboard.
    pub fn popcnt(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns true if no square is set.
    pub fn has_none(self) -> bool {
        self.0 == 0
    }

    /// Returns true if at least one square is set.
    pub fn has_any(self) -> bool {
        self.0 != 0
    }

    /// Returns true if more than one square is set.
    pub fn has_many(self) -> bool {
        self.0 & self.0.wrapping_sub(1) != 0
    }

    /// Returns the squares of a board with the given last file and last rank.
    pub fn board(max_file: File, max_rank: Rank) -> Bitboard {
        let mut bb = Bitboard::EMPTY;
        for rank in Rank::ALL.into_iter().take_while(|rank| *rank <= max_rank) {
            for file in File::ALL.into_iter().take_while(|file| *file <= max_file) {
                bb |= Square::new(file, rank);
            }
        }
        bb
    }

    /// Returns the squares on which a bishop standing on a dark square can stand (a1 is dark).
    pub fn dark_squares() -> Bitboard {
        let mut bb = Bitboard::EMPTY;
        for square in Square::all() {
            if (u8::from(square.file()) + u8::from(square.rank())) % 2 == 0 {
                bb |= square;
            }
        }
        bb
    }

    /// Returns a bitboard with all squares strictly between two squares sharing a rank, file or diagonal, and an empty
    /// bitboard for any other pair.
    pub fn between(from: Square, to: Square) -> Bitboard {
        let df = u8::from(to.file()) as i8 - u8::from(from.file()) as i8;
        let dr = u8::from(to.rank()) as i8 - u8::from(from.rank()) as i8;
        if !(df == 0 || dr == 0 || df.abs() == dr.abs()) {
            return Bitboard::EMPTY;
        }

        let mut bb = Bitboard::EMPTY;
        let mut current = from;
        while let Some(next) = current.offset(df.signum(), dr.signum()) {
            if next == to {
                break;
            }
            bb |= next;
            current = next;
        }
        bb
    }
}

impl From<Square> for Bitboard {
    fn from(square: Square) -> Self {
        Bitboard(1u128 << u8::from(square))
    }
}

impl From<File> for Bitboard {
    fn from(file: File) -> Self {
        Rank::ALL.iter().fold(Bitboard::EMPTY, |bb, rank| bb | Square::new(file, *rank))
    }
}

impl From<Rank> for Bitboard {
    fn from(rank: Rank) -> Self {
        Bitboard(0xfff << (File::COUNT * usize::from(rank)))
    }
}

impl std::ops::BitAnd for Bitboard {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 & rhs.0)
    }
}

impl std::ops::BitAnd<Square> for Bitboard {
    type Output = Self;
    fn bitand(self, rhs: Square) -> Self::Output {
        self & Bitboard::from(rhs)
    }
}

impl std::ops::BitOr for Bitboard {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 | rhs.0)
    }
}

impl std::ops::BitOr<Square> for Bitboard {
    type Output = Self;
    fn bitor(self, rhs: Square) -> Self::Output {
        self | Bitboard::from(rhs)
    }
}

impl std::ops::BitOr<Square> for Square {
    type Output = Bitboard;
    fn bitor(self, rhs: Square) -> Self::Output {
        Bitboard::from(self) | Bitboard::from(rhs)
    }
}

impl std::ops::BitXor for Bitboard {
    type Output = Self;
    fn bitxor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 ^ rhs.0)
    }
}

impl std::ops::BitXor<Square> for Bitboard {
    type Output = Self;
    fn bitxor(self, rhs: Square) -> Self::Output {
        self ^ Bitboard::from(rhs)
    }
}

impl std::ops::Not for Bitboard {
    type Output = Self;
    fn not(self) -> Self::Output {
        Bitboard(!self.0 & Bitboard::ALL.0)
    }
}

impl std::ops::BitAndAssign for Bitboard {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl std::ops::BitOrAssign for Bitboard {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitOrAssign<Square> for Bitboard {
    fn bitor_assign(&mut self, rhs: Square) {
        *self |= Bitboard::from(rhs);
    }
}

impl std::ops::BitXorAssign for Bitboard {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

impl std::ops::BitXorAssign<Square> for Bitboard {
    fn bitxor_assign(&mut self, rhs: Square) {
        *self ^= Bitboard::from(rhs);
    }
}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = BitboardIterator;

    fn into_iter(self) -> Self::IntoIter {
        BitboardIterator(self.0)
    }
}

/// An iterator over the set bits in a bitboard, from the lowest index to the highest.
pub struct BitboardIterator(u128);

impl Iterator for BitboardIterator {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            return None;
        }

        let square: Square = (self.0.trailing_zeros() as u8).into();
        self.0 &= self.0 - 1;
        Some(square)
    }
}
