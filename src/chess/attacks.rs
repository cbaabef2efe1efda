use super::{Bitboard, Color, PieceType, Square};

const ORTHOGONAL: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const KNIGHT: [(i8, i8); 8] = [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];
const ALFIL: [(i8, i8); 4] = [(2, 2), (2, -2), (-2, 2), (-2, -2)];

fn leaper(square: Square, offsets: &[(i8, i8)], board: Bitboard) -> Bitboard {
    offsets
        .iter()
        .filter_map(|(df, dr)| square.offset(*df, *dr))
        .filter(|to| board.get(*to))
        .fold(Bitboard::EMPTY, |bb, to| bb | to)
}

fn slider(square: Square, directions: &[(i8, i8)], occupied: Bitboard, board: Bitboard) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for (df, dr) in directions {
        let mut current = square;
        while let Some(to) = current.offset(*df, *dr) {
            if !board.get(to) {
                break;
            }
            attacks |= to;
            if occupied.get(to) {
                break;
            }
            current = to;
        }
    }
    attacks
}

/// Returns the squares attacked by a pawn of `color` standing on `square`.
pub fn attacks_from_pawn(color: Color, square: Square, board: Bitboard) -> Bitboard {
    leaper(square, &[(-1, color.forward()), (1, color.forward())], board)
}

/// Returns the squares attacked by a piece standing on `square`.
///
/// Sliding rays stop on the first square of `occupied` (included) and at the edge of `board`. Walls must be part of
/// `occupied` so that they block rays; callers remove them from the result when generating moves.
///
/// # Parameters
/// * `piece_type` - The type of the attacking piece
/// * `color` - The color of the attacking piece, only relevant for pawns
/// * `square` - The square the piece stands on
/// * `occupied` - The squares blocking sliding pieces
/// * `board` - The squares that exist in the current variant
pub fn attacks_from(piece_type: PieceType, color: Color, square: Square, occupied: Bitboard, board: Bitboard) -> Bitboard {
    match piece_type {
        PieceType::Pawn => attacks_from_pawn(color, square, board),
        PieceType::Knight => leaper(square, &KNIGHT, board),
        PieceType::Bishop => slider(square, &DIAGONAL, occupied, board),
        PieceType::Rook => slider(square, &ORTHOGONAL, occupied, board),
        PieceType::Queen => slider(square, &DIAGONAL, occupied, board) | slider(square, &ORTHOGONAL, occupied, board),
        PieceType::King => leaper(square, &DIAGONAL, board) | leaper(square, &ORTHOGONAL, board),
        PieceType::Fers => leaper(square, &DIAGONAL, board),
        PieceType::Alfil => leaper(square, &ALFIL, board),
        PieceType::Archbishop => slider(square, &DIAGONAL, occupied, board) | leaper(square, &KNIGHT, board),
        PieceType::Chancellor => slider(square, &ORTHOGONAL, occupied, board) | leaper(square, &KNIGHT, board),
    }
}
