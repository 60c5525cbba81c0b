// src/executor.rs
use log::debug;
use rand::RngCore;

use crate::board::Board;
use crate::movegen;
use crate::rules::{rule_for, CaptureContext, RuleEffect, CANNON_CHARGE};
use crate::types::{Color, Move, MoveResult, Piece, PieceKind, RuleKind};

/// Consecutive moves without a capture after which the game is drawn.
pub const QUIET_MOVE_LIMIT: u32 = 60;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GameStatus {
    AwaitingMove,
    GameOver(MoveResult),
}

/// Everything a move can change. Cloned wholesale for undo snapshots and AI look-ahead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameState {
    pub board: Board,
    pub turn: Color,
    pub status: GameStatus,
    /// Moves since the last capture.
    pub quiet_moves: u32,
}

impl GameState {
    pub fn new(board: Board) -> Self {
        GameState {
            board,
            turn: Color::White,
            status: GameStatus::AwaitingMove,
            quiet_moves: 0,
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self.status, GameStatus::GameOver(_))
    }
}

/// What an accepted move did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub result: MoveResult,
    pub captured: Option<Piece>,
    pub effect: RuleEffect,
}

impl MoveOutcome {
    /// The metamorphosis rolled on this move, recorded so redo can replay it.
    pub fn promotion(&self) -> Option<PieceKind> {
        match self.effect {
            RuleEffect::Promoted(kind) => Some(kind),
            _ => None,
        }
    }
}

/// A move is acceptable when the game is running, the mover's side has the turn,
/// the named piece is really on the start square, and the destination is generated for it.
pub fn is_legal(state: &GameState, mv: &Move) -> bool {
    if state.is_over() || mv.color != state.turn {
        return false;
    }
    match state.board.piece_at(mv.start) {
        Some(piece) if piece.kind == mv.piece && piece.color == mv.color => {
            movegen::destinations(&state.board, mv.start).contains(&mv.end)
        }
        _ => false,
    }
}

/// Validates and applies `mv`. Returns `None` (state untouched) when the move is rejected.
pub fn execute(
    state: &mut GameState,
    mv: &Move,
    rule: RuleKind,
    rng: &mut dyn RngCore,
    forced_promotion: Option<PieceKind>,
) -> Option<MoveOutcome> {
    if !is_legal(state, mv) {
        debug!("Rejected move {}", mv);
        return None;
    }

    // 1. Lift the mover and resolve the capture
    let mut mover = state.board.remove(mv.start)?;
    let captured = state.board.remove(mv.end);
    if captured.is_some() {
        mover.capture_count += 1;
        state.quiet_moves = 0;
    } else {
        state.quiet_moves += 1;
    }
    mover.first_move = false;

    // A cannon that cannot detonate under the active rule locks up once fully charged.
    if mover.kind == PieceKind::Cannon && mover.capture_count >= CANNON_CHARGE && rule != RuleKind::CannonSpecialRule {
        mover.immobile = true;
    }
    state.board.place(mv.end, mover);

    // 2. Rule mutation
    let effect = match captured {
        Some(captured) => {
            let mut ctx = CaptureContext {
                board: &mut state.board,
                mv: *mv,
                captured,
                rng,
                forced_promotion,
            };
            rule_for(rule).after_capture(&mut ctx)
        }
        None => RuleEffect::Unchanged,
    };

    // 3. Adjudicate
    let result = adjudicate(state);
    if result.is_game_over() {
        state.status = GameStatus::GameOver(result);
    } else {
        state.turn = state.turn.opponent();
    }

    debug!("{} => {}", mv, result);
    debug!("Board after move:\n{}", state.board);
    Some(MoveOutcome { result, captured, effect })
}

/// Terminal check run after every move, from the point of view of the side that just moved.
fn adjudicate(state: &GameState) -> MoveResult {
    let board = &state.board;
    let mover = state.turn;
    match (board.has_king(Color::White), board.has_king(Color::Black)) {
        (true, false) => return MoveResult::WhiteWins,
        (false, true) => return MoveResult::BlackWins,
        (false, false) => return MoveResult::Stalemate,
        (true, true) => {}
    }
    if !movegen::has_any_move(board, mover.opponent()) {
        return MoveResult::Stalemate;
    }
    if state.quiet_moves >= QUIET_MOVE_LIMIT || only_kings_left(board) {
        return MoveResult::Stalemate;
    }
    MoveResult::ValidMove
}

/// Exactly one White King against one Black King.
fn only_kings_left(board: &Board) -> bool {
    board.count(Color::White) == 1
        && board.count(Color::Black) == 1
        && board.has_king(Color::White)
        && board.has_king(Color::Black)
}
