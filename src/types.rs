// src/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

pub const BOARD_SIZE: usize = 8;

// --- Enums and Basic Structs ---

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Color { White, Black }

impl Color {
    pub fn opponent(&self) -> Color {
        match self { Color::White => Color::Black, Color::Black => Color::White }
    }

    /// Helper for per-color tables.
    pub fn index(&self) -> usize {
        match self { Color::White => 0, Color::Black => 1 }
    }

    /// Row delta of a forward pawn step. White starts on rows 6-7 and walks toward row 0.
    pub fn forward(&self) -> i32 {
        match self { Color::White => -1, Color::Black => 1 }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "WHITE"),
            Color::Black => write!(f, "BLACK"),
        }
    }
}

impl FromStr for Color {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Color::White),
            "black" | "b" => Ok(Color::Black),
            _ => Err(EngineError::MalformedRequest(format!("unknown color '{}'", s))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PieceKind { Pawn, Knight, Bishop, Rook, Cannon, Queen, King }

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::Pawn, PieceKind::Knight, PieceKind::Bishop, PieceKind::Rook,
        PieceKind::Cannon, PieceKind::Queen, PieceKind::King,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PieceKind::Pawn => "Pawn", PieceKind::Knight => "Knight", PieceKind::Bishop => "Bishop",
            PieceKind::Rook => "Rook", PieceKind::Cannon => "Cannon", PieceKind::Queen => "Queen",
            PieceKind::King => "King",
        }
    }

    fn symbol(&self) -> char {
        match self {
            PieceKind::Pawn => 'p', PieceKind::Knight => 'n', PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r', PieceKind::Cannon => 'c', PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PieceKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PieceKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EngineError::MalformedRequest(format!("unknown piece type '{}'", s)))
    }
}

/// A piece together with the per-piece counters the special rules read and write.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    #[serde(rename = "type")]
    pub kind: PieceKind,
    pub color: Color,
    pub capture_count: u32,
    pub first_move: bool,
    pub immobile: bool,
    pub promoted_from_pawn: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color) -> Self {
        Piece { kind, color, capture_count: 0, first_move: true, immobile: false, promoted_from_pawn: false }
    }

    /// Replacement piece for a pawn metamorphosis; counters carry over.
    pub fn promoted(&self, kind: PieceKind) -> Self {
        Piece {
            kind,
            color: self.color,
            capture_count: self.capture_count,
            first_move: false,
            immobile: false,
            promoted_from_pawn: true,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = self.kind.symbol();
        let symbol = match self.color {
            Color::White => symbol.to_ascii_uppercase(),
            Color::Black => symbol,
        };
        write!(f, "{}", symbol)
    }
}

// --- Coordinates ---

/// Board coordinate. `row` is the wire format's X, `col` its Y.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    pub row: usize,
    pub col: usize,
}

impl Square {
    /// Returns `None` when the coordinates fall outside the 8x8 grid.
    pub fn new(row: i64, col: i64) -> Option<Square> {
        let size = BOARD_SIZE as i64;
        if (0..size).contains(&row) && (0..size).contains(&col) {
            Some(Square { row: row as usize, col: col as usize })
        } else {
            None
        }
    }

    pub fn offset(&self, d_row: i32, d_col: i32) -> Option<Square> {
        Square::new(self.row as i64 + d_row as i64, self.col as i64 + d_col as i64)
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Square { row, col }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// --- Move Representation ---

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    pub start: Square,
    pub end: Square,
    pub piece: PieceKind,
    pub color: Color,
}

impl Move {
    pub fn new(start: Square, end: Square, piece: PieceKind, color: Color) -> Self {
        Move { start, end, piece, color }
    }

    /// Unit step from `end` back toward `start`, each axis signed independently.
    pub fn back_step(&self) -> (i32, i32) {
        let d_row = self.end.row as i32 - self.start.row as i32;
        let d_col = self.end.col as i32 - self.start.col as i32;
        (-d_row.signum(), -d_col.signum())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} -> {}", self.color, self.piece, self.start, self.end)
    }
}

// --- Rules and Outcomes ---

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum RuleKind {
    #[default]
    None,
    PawnPromotionRule,
    KingQueenSpecialRule,
    CannonSpecialRule,
}

impl RuleKind {
    pub const ALL: [RuleKind; 4] = [
        RuleKind::None, RuleKind::PawnPromotionRule,
        RuleKind::KingQueenSpecialRule, RuleKind::CannonSpecialRule,
    ];

    /// The three rules that actually mutate captures.
    pub const SPECIAL: [RuleKind; 3] = [
        RuleKind::PawnPromotionRule, RuleKind::KingQueenSpecialRule, RuleKind::CannonSpecialRule,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::None => "None",
            RuleKind::PawnPromotionRule => "PawnPromotionRule",
            RuleKind::KingQueenSpecialRule => "KingQueenSpecialRule",
            RuleKind::CannonSpecialRule => "CannonSpecialRule",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RuleKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RuleKind::ALL
            .iter()
            .copied()
            .find(|rule| rule.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EngineError::MalformedRequest(format!("unknown rule '{}'", s)))
    }
}

/// Protocol-level result of a move submission. None of these are faults.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MoveResult {
    ValidMove,
    InvalidMove,
    WhiteWins,
    BlackWins,
    Stalemate,
}

impl MoveResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveResult::ValidMove => "VALID_MOVE",
            MoveResult::InvalidMove => "INVALID_MOVE",
            MoveResult::WhiteWins => "WHITE_WINS",
            MoveResult::BlackWins => "BLACK_WINS",
            MoveResult::Stalemate => "STALEMATE",
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, MoveResult::WhiteWins | MoveResult::BlackWins | MoveResult::Stalemate)
    }

    pub fn win_for(color: Color) -> MoveResult {
        match color { Color::White => MoveResult::WhiteWins, Color::Black => MoveResult::BlackWins }
    }
}

impl fmt::Display for MoveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_bounds() {
        assert_eq!(Square::new(0, 0), Some(Square { row: 0, col: 0 }));
        assert_eq!(Square::new(7, 7), Some(Square { row: 7, col: 7 }));
        assert_eq!(Square::new(8, 0), None);
        assert_eq!(Square::new(0, -1), None);
        assert_eq!(Square::all().count(), 64);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("white".parse::<Color>().unwrap(), Color::White);
        assert_eq!("BLACK".parse::<Color>().unwrap(), Color::Black);
        assert!("green".parse::<Color>().is_err());
        assert_eq!("cannon".parse::<PieceKind>().unwrap(), PieceKind::Cannon);
        assert!("Dragon".parse::<PieceKind>().is_err());
        assert_eq!("KingQueenSpecialRule".parse::<RuleKind>().unwrap(), RuleKind::KingQueenSpecialRule);
        for rule in RuleKind::ALL {
            assert_eq!(rule.name().parse::<RuleKind>().unwrap(), rule);
        }
    }

    #[test]
    fn test_piece_json_shape() {
        let piece = Piece::new(PieceKind::Cannon, Color::Black);
        let value = serde_json::to_value(piece).unwrap();
        assert_eq!(value["type"], "Cannon");
        assert_eq!(value["color"], "BLACK");
        assert_eq!(value["captureCount"], 0);
        assert_eq!(value["firstMove"], true);
        assert_eq!(value["immobile"], false);
        assert_eq!(value["promotedFromPawn"], false);
    }

    #[test]
    fn test_back_step() {
        let mv = Move::new(Square { row: 2, col: 2 }, Square { row: 2, col: 4 }, PieceKind::Queen, Color::White);
        assert_eq!(mv.back_step(), (0, -1));
        let mv = Move::new(Square { row: 5, col: 1 }, Square { row: 2, col: 4 }, PieceKind::Queen, Color::White);
        assert_eq!(mv.back_step(), (1, -1));
    }
}
