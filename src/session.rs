// src/session.rs
use log::{info, warn};
use rand::rngs::StdRng;
use std::sync::{Arc, RwLock};

use crate::ai::MovePicker;
use crate::board::Board;
use crate::error::EngineError;
use crate::executor::{self, GameState, GameStatus, MoveOutcome};
use crate::movegen;
use crate::types::{Color, Move, MoveResult, PieceKind, RuleKind, Square};

/// The single game served by the process. Writers take the write half, queries the read half.
pub type SharedSession = Arc<RwLock<GameSession>>;

pub fn shared(session: GameSession) -> SharedSession {
    Arc::new(RwLock::new(session))
}

/// One applied move plus what is needed to take it back and to replay it identically.
#[derive(Debug, Clone)]
struct HistoryEntry {
    mv: Move,
    promotion: Option<PieceKind>,
    before: GameState,
}

pub struct GameSession {
    state: GameState,
    initial_board: Board,
    rule: RuleKind,
    history: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    shuffle_back_rank: bool,
    rng: StdRng,
}

impl GameSession {
    /// Fresh game on the starting layout.
    pub fn new(rule: RuleKind, shuffle_back_rank: bool, rng: StdRng) -> Self {
        let mut session = GameSession::from_board(Board::starting(), rule, rng);
        session.shuffle_back_rank = shuffle_back_rank;
        if shuffle_back_rank {
            session.restart();
        }
        session
    }

    /// Game starting from an arbitrary position with White to move. `restart` still
    /// goes back to the standard layout.
    pub fn from_board(board: Board, rule: RuleKind, rng: StdRng) -> Self {
        GameSession {
            state: GameState::new(board),
            initial_board: board,
            rule,
            history: Vec::new(),
            redo_stack: Vec::new(),
            shuffle_back_rank: false,
            rng,
        }
    }

    // --- Queries ---

    pub fn board(&self) -> &Board {
        &self.state.board
    }

    /// The layout the current game started from.
    pub fn initial_board(&self) -> &Board {
        &self.initial_board
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn current_turn(&self) -> Color {
        self.state.turn
    }

    pub fn active_rule(&self) -> RuleKind {
        self.rule
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn valid_moves(&self, row: i64, col: i64, kind: PieceKind, color: Color) -> Result<Vec<Square>, EngineError> {
        movegen::valid_moves(&self.state.board, row, col, kind, color)
    }

    // --- Lifecycle ---

    /// Back to the starting layout with White to move; the active rule is kept.
    pub fn restart(&mut self) {
        let board = if self.shuffle_back_rank {
            Board::starting_shuffled(&mut self.rng)
        } else {
            Board::starting()
        };
        self.initial_board = board;
        self.state = GameState::new(board);
        self.history.clear();
        self.redo_stack.clear();
        info!("Game restarted under {}", self.rule);
    }

    pub fn set_rule(&mut self, rule: RuleKind) {
        self.rule = rule;
        self.restart();
    }

    // --- Moves ---

    /// Applies a client move. Rejections come back as `InvalidMove` with nothing changed.
    pub fn submit_move(&mut self, mv: &Move) -> MoveResult {
        match self.apply(mv, None) {
            Some(outcome) => {
                self.redo_stack.clear();
                info!("{} => {}", mv, outcome.result);
                outcome.result
            }
            None => MoveResult::InvalidMove,
        }
    }

    /// Shared by submit and redo: executes the move and records it on the history.
    fn apply(&mut self, mv: &Move, forced_promotion: Option<PieceKind>) -> Option<MoveOutcome> {
        let before = self.state.clone();
        let outcome = executor::execute(&mut self.state, mv, self.rule, &mut self.rng, forced_promotion)?;
        self.history.push(HistoryEntry { mv: *mv, promotion: outcome.promotion(), before });
        Some(outcome)
    }

    pub fn undo(&mut self) -> Result<(), EngineError> {
        let entry = self.history.pop().ok_or(EngineError::NothingToUndo)?;
        self.state = entry.before.clone();
        info!("Undid {}", entry.mv);
        self.redo_stack.push(entry);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<MoveResult, EngineError> {
        let entry = self.redo_stack.pop().ok_or(EngineError::NothingToRedo)?;
        match self.apply(&entry.mv, entry.promotion) {
            Some(outcome) => {
                info!("Redid {}", entry.mv);
                Ok(outcome.result)
            }
            None => {
                // The stack no longer matches the board; drop it rather than replay garbage.
                warn!("Redo of {} no longer applies, clearing redo stack", entry.mv);
                self.redo_stack.clear();
                Err(EngineError::NothingToRedo)
            }
        }
    }

    /// Lets `picker` choose for the side to move and plays its choice like a client move.
    pub fn ai_move(&mut self, picker: &mut dyn MovePicker) -> Result<(Move, MoveResult), EngineError> {
        let color = self.state.turn;
        if self.state.is_over() {
            return Err(EngineError::NoMoveAvailable(color));
        }
        let mv = picker.pick(&self.state, self.rule).ok_or(EngineError::NoMoveAvailable(color))?;
        info!("{} picker chose {}", picker.name(), mv);
        match self.submit_move(&mv) {
            MoveResult::InvalidMove => Err(EngineError::NoMoveAvailable(color)),
            result => Ok((mv, result)),
        }
    }
}
