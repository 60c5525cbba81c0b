// src/board.rs
use rand::seq::SliceRandom;
use rand::RngCore;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::fmt;

use crate::types::{Color, Piece, PieceKind, Square, BOARD_SIZE};

const BLACK_BACK_ROW: usize = 0;
const BLACK_PAWN_ROW: usize = 1;
const WHITE_PAWN_ROW: usize = 6;
const WHITE_BACK_ROW: usize = 7;

/// Columns 1..=6 of the back rank, left to right. Rooks always hold the corners.
const BACK_RANK_INNER: [PieceKind; 6] = [
    PieceKind::Knight, PieceKind::Bishop, PieceKind::Queen,
    PieceKind::King, PieceKind::Bishop, PieceKind::Knight,
];
const CANNON_COLUMNS: [usize; 2] = [1, 6];

/// Plain 8x8 storage. Holds no rule logic.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Board::empty()
    }
}

impl Board {
    pub fn empty() -> Self {
        Board { cells: [[None; BOARD_SIZE]; BOARD_SIZE] }
    }

    /// Fixed starting layout: R N B Q K B N R behind a row of pawns with cannons on columns 1 and 6.
    pub fn starting() -> Self {
        Board::with_back_rank(BACK_RANK_INNER)
    }

    /// Starting layout with columns 1..=6 of the back rank shuffled, mirrored for both sides.
    pub fn starting_shuffled(rng: &mut dyn RngCore) -> Self {
        let mut inner = BACK_RANK_INNER;
        inner.shuffle(rng);
        Board::with_back_rank(inner)
    }

    fn with_back_rank(inner: [PieceKind; 6]) -> Self {
        let mut board = Board::empty();
        for (color, back_row, pawn_row) in [
            (Color::Black, BLACK_BACK_ROW, BLACK_PAWN_ROW),
            (Color::White, WHITE_BACK_ROW, WHITE_PAWN_ROW),
        ] {
            board.cells[back_row][0] = Some(Piece::new(PieceKind::Rook, color));
            board.cells[back_row][7] = Some(Piece::new(PieceKind::Rook, color));
            for (offset, kind) in inner.iter().enumerate() {
                board.cells[back_row][offset + 1] = Some(Piece::new(*kind, color));
            }
            for col in 0..BOARD_SIZE {
                let kind = if CANNON_COLUMNS.contains(&col) { PieceKind::Cannon } else { PieceKind::Pawn };
                board.cells[pawn_row][col] = Some(Piece::new(kind, color));
            }
        }
        board
    }

    pub fn is_within_bounds(row: i64, col: i64) -> bool {
        Square::new(row, col).is_some()
    }

    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.cells[sq.row][sq.col].as_ref()
    }

    pub fn piece_at_mut(&mut self, sq: Square) -> Option<&mut Piece> {
        self.cells[sq.row][sq.col].as_mut()
    }

    /// Puts `piece` on `sq`, returning whatever was there before.
    pub fn place(&mut self, sq: Square, piece: Piece) -> Option<Piece> {
        self.cells[sq.row][sq.col].replace(piece)
    }

    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        self.cells[sq.row][sq.col].take()
    }

    pub fn is_empty_at(&self, sq: Square) -> bool {
        self.cells[sq.row][sq.col].is_none()
    }

    /// Every occupied square with its piece, row-major.
    pub fn occupied(&self) -> impl Iterator<Item = (Square, &Piece)> + '_ {
        Square::all().filter_map(move |sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, &Piece)> + '_ {
        self.occupied().filter(move |(_, p)| p.color == color)
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces(color).find(|(_, p)| p.kind == PieceKind::King).map(|(sq, _)| sq)
    }

    pub fn has_king(&self, color: Color) -> bool {
        self.find_king(color).is_some()
    }

    pub fn count(&self, color: Color) -> usize {
        self.pieces(color).count()
    }
}

// Wire format: an 8x8 array of piece objects or null.
impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut rows = serializer.serialize_seq(Some(BOARD_SIZE))?;
        for row in &self.cells {
            rows.serialize_element(row.as_slice())?;
        }
        rows.end()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    0 1 2 3 4 5 6 7")?;
        writeln!(f, "  +-----------------+")?;
        for (row_idx, row) in self.cells.iter().enumerate() {
            write!(f, "{} | ", row_idx)?;
            for cell in row {
                match cell {
                    Some(piece) => write!(f, "{} ", piece)?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f, "|")?;
        }
        write!(f, "  +-----------------+")
    }
}
