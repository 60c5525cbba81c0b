// src/ai.rs
//! Engine-side move choice for the non-human side. Pickers are pluggable behind
//! `MovePicker`; the session plays whatever they return through the normal move path.

use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::str::FromStr;

use crate::board::Board;
use crate::error::EngineError;
use crate::executor::{self, GameState};
use crate::movegen;
use crate::rules::CANNON_CHARGE;
use crate::types::{Color, Move, Piece, PieceKind, RuleKind};

pub trait MovePicker: Send {
    fn name(&self) -> &str;

    /// A move for the side to move in `state`, or `None` when it has none.
    fn pick(&mut self, state: &GameState, rule: RuleKind) -> Option<Move>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PickerKind { Greedy, Random }

impl FromStr for PickerKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greedy" => Ok(PickerKind::Greedy),
            "random" => Ok(PickerKind::Random),
            _ => Err(EngineError::MalformedRequest(format!("unknown AI picker '{}'", s))),
        }
    }
}

impl fmt::Display for PickerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PickerKind::Greedy => write!(f, "greedy"),
            PickerKind::Random => write!(f, "random"),
        }
    }
}

pub fn picker_for(kind: PickerKind, seed: Option<u64>) -> Box<dyn MovePicker> {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ 0x5EED_A1A1),
        None => StdRng::from_os_rng(),
    };
    match kind {
        PickerKind::Greedy => Box::new(GreedyPicker::new(rng)),
        PickerKind::Random => Box::new(RandomPicker::new(rng)),
    }
}

/// Candidate moves for the side to move, labelled with the piece standing on the start square.
fn candidate_moves(state: &GameState) -> Vec<Move> {
    let color = state.turn;
    movegen::all_moves(&state.board, color)
        .into_iter()
        .filter_map(|(from, to)| {
            state.board.piece_at(from).map(|piece| Move::new(from, to, piece.kind, color))
        })
        .collect()
}

// --- Random ---

pub struct RandomPicker {
    rng: StdRng,
}

impl RandomPicker {
    pub fn new(rng: StdRng) -> Self {
        RandomPicker { rng }
    }
}

impl MovePicker for RandomPicker {
    fn name(&self) -> &str {
        "random"
    }

    fn pick(&mut self, state: &GameState, _rule: RuleKind) -> Option<Move> {
        if state.is_over() {
            return None;
        }
        candidate_moves(state).choose(&mut self.rng).copied()
    }
}

// --- Greedy (one ply, material) ---

pub struct GreedyPicker {
    rng: StdRng,
}

impl GreedyPicker {
    pub fn new(rng: StdRng) -> Self {
        GreedyPicker { rng }
    }

    fn piece_value(piece: &Piece, rule: RuleKind) -> i32 {
        match piece.kind {
            PieceKind::Pawn => 1,
            PieceKind::Knight | PieceKind::Bishop => 3,
            PieceKind::Rook => 5,
            PieceKind::Cannon => {
                // An armed cannon is worth more while it can still blow up.
                let armed = rule == RuleKind::CannonSpecialRule && piece.capture_count + 1 >= CANNON_CHARGE;
                if armed { 15 } else { 5 }
            }
            PieceKind::Queen => 9,
            PieceKind::King => 1000,
        }
    }

    /// Material balance from `color`'s point of view.
    pub fn evaluate(board: &Board, color: Color, rule: RuleKind) -> i32 {
        board.occupied().fold(0, |score, (_, piece)| {
            let value = GreedyPicker::piece_value(piece, rule);
            if piece.color == color { score + value } else { score - value }
        })
    }
}

impl MovePicker for GreedyPicker {
    fn name(&self) -> &str {
        "greedy"
    }

    fn pick(&mut self, state: &GameState, rule: RuleKind) -> Option<Move> {
        if state.is_over() {
            return None;
        }
        let color = state.turn;
        let mut best_score = i32::MIN;
        let mut best_moves = Vec::new();

        for mv in candidate_moves(state) {
            let mut trial = state.clone();
            if executor::execute(&mut trial, &mv, rule, &mut self.rng, None).is_none() {
                continue;
            }
            let score = GreedyPicker::evaluate(&trial.board, color, rule);
            if score > best_score {
                best_score = score;
                best_moves.clear();
                best_moves.push(mv);
            } else if score == best_score {
                best_moves.push(mv);
            }
        }

        best_moves.choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Square;

    fn sq(row: usize, col: usize) -> Square {
        Square { row, col }
    }

    #[test]
    fn test_greedy_takes_the_king() {
        let mut board = Board::empty();
        board.place(sq(7, 4), Piece::new(PieceKind::King, Color::White));
        board.place(sq(0, 4), Piece::new(PieceKind::King, Color::Black));
        board.place(sq(0, 0), Piece::new(PieceKind::Rook, Color::White));
        board.place(sq(3, 3), Piece::new(PieceKind::Queen, Color::Black));
        let state = GameState::new(board);
        let mut picker = GreedyPicker::new(StdRng::seed_from_u64(3));
        let mv = picker.pick(&state, RuleKind::None).unwrap();
        assert_eq!(mv.end, sq(0, 4));
        assert_eq!(mv.piece, PieceKind::Rook);
    }

    #[test]
    fn test_random_picks_legal_move() {
        let state = GameState::new(Board::starting());
        let mut picker = RandomPicker::new(StdRng::seed_from_u64(5));
        for _ in 0..20 {
            let mv = picker.pick(&state, RuleKind::None).unwrap();
            assert_eq!(mv.color, Color::White);
            assert!(executor::is_legal(&state, &mv));
        }
    }

    #[test]
    fn test_no_pick_when_over() {
        let mut state = GameState::new(Board::starting());
        state.status = executor::GameStatus::GameOver(crate::types::MoveResult::Stalemate);
        assert!(picker_for(PickerKind::Greedy, Some(1)).pick(&state, RuleKind::None).is_none());
        assert!(picker_for(PickerKind::Random, Some(1)).pick(&state, RuleKind::None).is_none());
    }

    #[test]
    fn test_evaluate_starting_position_is_even() {
        assert_eq!(GreedyPicker::evaluate(&Board::starting(), Color::White, RuleKind::None), 0);
    }
}
