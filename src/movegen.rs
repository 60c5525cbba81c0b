// src/movegen.rs
use lazy_static::lazy_static;

use crate::board::Board;
use crate::error::EngineError;
use crate::types::{Color, Piece, PieceKind, Square, BOARD_SIZE};

const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const KNIGHT_JUMPS: [(i32, i32); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

// --- Precomputed Move Tables ---

lazy_static! {
    static ref KNIGHT_TARGETS: Vec<Vec<Square>> = compute_step_targets(&KNIGHT_JUMPS);
    static ref KING_TARGETS: Vec<Vec<Square>> = {
        let steps: Vec<(i32, i32)> = ORTHOGONAL.iter().chain(DIAGONAL.iter()).copied().collect();
        compute_step_targets(&steps)
    };
}

/// For every square (row-major index), the on-board squares reachable by one of `steps`.
fn compute_step_targets(steps: &[(i32, i32)]) -> Vec<Vec<Square>> {
    Square::all()
        .map(|from| steps.iter().filter_map(|&(dr, dc)| from.offset(dr, dc)).collect())
        .collect()
}

fn table_index(sq: Square) -> usize {
    sq.row * BOARD_SIZE + sq.col
}

// --- Generation ---

/// Destinations for the piece standing on `from`. Empty square or immobile piece yields nothing.
/// Moves are pseudo-legal: a move that leaves the own King capturable is still generated.
pub fn destinations(board: &Board, from: Square) -> Vec<Square> {
    let piece = match board.piece_at(from) {
        Some(piece) if !piece.immobile => *piece,
        _ => return Vec::new(),
    };
    let mut moves = Vec::with_capacity(16);
    match piece.kind {
        PieceKind::King => step_moves(board, &piece, &KING_TARGETS[table_index(from)], &mut moves),
        PieceKind::Knight => step_moves(board, &piece, &KNIGHT_TARGETS[table_index(from)], &mut moves),
        PieceKind::Bishop => sliding_moves(board, &piece, from, &DIAGONAL, &mut moves),
        PieceKind::Rook => sliding_moves(board, &piece, from, &ORTHOGONAL, &mut moves),
        PieceKind::Queen => {
            sliding_moves(board, &piece, from, &ORTHOGONAL, &mut moves);
            sliding_moves(board, &piece, from, &DIAGONAL, &mut moves);
        }
        PieceKind::Pawn => pawn_moves(board, &piece, from, &mut moves),
        PieceKind::Cannon => cannon_moves(board, &piece, from, &mut moves),
    }
    moves
}

/// Checked entry point used by the API: the request must name the piece actually on `(row, col)`.
pub fn valid_moves(board: &Board, row: i64, col: i64, kind: PieceKind, color: Color) -> Result<Vec<Square>, EngineError> {
    let from = Square::new(row, col).ok_or(EngineError::OutOfBounds { row, col })?;
    match board.piece_at(from) {
        Some(piece) if piece.kind == kind && piece.color == color => Ok(destinations(board, from)),
        _ => Err(EngineError::InvalidPiece { square: from, kind, color }),
    }
}

/// Every (from, to) pair available to `color`.
pub fn all_moves(board: &Board, color: Color) -> Vec<(Square, Square)> {
    let mut moves = Vec::with_capacity(64);
    for (from, _) in board.pieces(color) {
        moves.extend(destinations(board, from).into_iter().map(|to| (from, to)));
    }
    moves
}

pub fn has_any_move(board: &Board, color: Color) -> bool {
    board.pieces(color).any(|(from, _)| !destinations(board, from).is_empty())
}

fn can_land(board: &Board, mover: &Piece, to: Square) -> bool {
    board.piece_at(to).map_or(true, |target| target.color != mover.color)
}

fn step_moves(board: &Board, piece: &Piece, targets: &[Square], moves: &mut Vec<Square>) {
    moves.extend(targets.iter().copied().filter(|&to| can_land(board, piece, to)));
}

fn sliding_moves(board: &Board, piece: &Piece, from: Square, directions: &[(i32, i32)], moves: &mut Vec<Square>) {
    for &(dr, dc) in directions {
        let mut current = from;
        while let Some(next) = current.offset(dr, dc) {
            match board.piece_at(next) {
                None => moves.push(next),
                Some(blocker) => {
                    if blocker.color != piece.color {
                        moves.push(next); // Capture ends the ray
                    }
                    break;
                }
            }
            current = next;
        }
    }
}

fn pawn_moves(board: &Board, piece: &Piece, from: Square, moves: &mut Vec<Square>) {
    let forward = piece.color.forward();

    if let Some(one) = from.offset(forward, 0) {
        if board.is_empty_at(one) {
            moves.push(one);
            if piece.first_move {
                if let Some(two) = from.offset(2 * forward, 0) {
                    if board.is_empty_at(two) {
                        moves.push(two);
                    }
                }
            }
        }
    }

    for side in [-1, 1] {
        if let Some(diag) = from.offset(forward, side) {
            if board.piece_at(diag).map_or(false, |target| target.color != piece.color) {
                moves.push(diag);
            }
        }
    }
}

/// Quiet moves slide over empty squares; a capture must jump exactly one screen piece
/// (either color) and land on the first piece beyond it, which must be an enemy.
fn cannon_moves(board: &Board, piece: &Piece, from: Square, moves: &mut Vec<Square>) {
    for (dr, dc) in ORTHOGONAL {
        let mut current = from;
        let mut screened = false;
        while let Some(next) = current.offset(dr, dc) {
            match (board.piece_at(next), screened) {
                (None, false) => moves.push(next),
                (None, true) => {}
                (Some(_), false) => screened = true,
                (Some(target), true) => {
                    if target.color != piece.color {
                        moves.push(next);
                    }
                    break;
                }
            }
            current = next;
        }
    }
}
