use rand::rngs::StdRng;
use rand::SeedableRng;
use variant_chess::ai::{GreedyPicker, MovePicker, RandomPicker};
use variant_chess::{Board, Color, GameSession, GameState, GameStatus, Move, MoveResult, Piece, PieceKind, RuleKind, Square};

fn sq(row: usize, col: usize) -> Square {
    Square { row, col }
}

fn board_with(pieces: &[(usize, usize, PieceKind, Color)]) -> Board {
    let mut board = Board::empty();
    for &(row, col, kind, color) in pieces {
        board.place(sq(row, col), Piece::new(kind, color));
    }
    board
}

fn seeded(board: Board, rule: RuleKind, seed: u64) -> GameSession {
    GameSession::from_board(board, rule, StdRng::seed_from_u64(seed))
}

#[test]
fn cannon_detonation_spares_allies() {
    let mut board = board_with(&[
        (7, 7, PieceKind::King, Color::White),
        (0, 0, PieceKind::King, Color::Black),
        (4, 6, PieceKind::Pawn, Color::White),   // screen
        (4, 4, PieceKind::Knight, Color::Black), // target
        (3, 4, PieceKind::Pawn, Color::Black),
        (5, 4, PieceKind::Rook, Color::White),
        (4, 3, PieceKind::Bishop, Color::Black),
    ]);
    let mut cannon = Piece::new(PieceKind::Cannon, Color::White);
    cannon.capture_count = 2;
    board.place(sq(4, 7), cannon);

    let mut session = seeded(board, RuleKind::CannonSpecialRule, 1);
    let shot = Move::new(sq(4, 7), sq(4, 4), PieceKind::Cannon, Color::White);
    assert_eq!(session.submit_move(&shot), MoveResult::ValidMove);

    let after = session.board();
    assert!(after.piece_at(sq(4, 4)).is_none());
    assert!(after.piece_at(sq(3, 4)).is_none());
    assert!(after.piece_at(sq(4, 3)).is_none());
    assert_eq!(after.piece_at(sq(5, 4)).map(|p| (p.kind, p.color)), Some((PieceKind::Rook, Color::White)));
    assert_eq!(after.piece_at(sq(4, 6)).map(|p| p.kind), Some(PieceKind::Pawn));
}

fn assert_undo_redo_exact(session: &mut GameSession, mv: Move) {
    let before = session.state().clone();
    assert_eq!(session.submit_move(&mv), MoveResult::ValidMove);
    let after = session.state().clone();
    assert_ne!(before, after);

    session.undo().unwrap();
    assert_eq!(session.state(), &before);
    session.redo().unwrap();
    assert_eq!(session.state(), &after);
    session.undo().unwrap();
    assert_eq!(session.state(), &before);
}

#[test]
fn detonation_undoes_and_redoes_exactly() {
    let mut board = board_with(&[
        (7, 7, PieceKind::King, Color::White),
        (0, 0, PieceKind::King, Color::Black),
        (4, 6, PieceKind::Pawn, Color::White),
        (4, 4, PieceKind::Knight, Color::Black),
        (3, 4, PieceKind::Pawn, Color::Black),
        (5, 4, PieceKind::Rook, Color::White),
        (4, 3, PieceKind::Bishop, Color::Black),
    ]);
    let mut cannon = Piece::new(PieceKind::Cannon, Color::White);
    cannon.capture_count = 2;
    cannon.first_move = false;
    board.place(sq(4, 7), cannon);

    let mut session = seeded(board, RuleKind::CannonSpecialRule, 1);
    assert_undo_redo_exact(&mut session, Move::new(sq(4, 7), sq(4, 4), PieceKind::Cannon, Color::White));
    assert_eq!(session.board().piece_at(sq(4, 7)), Some(&cannon));
    assert_eq!(session.board().piece_at(sq(3, 4)).map(|p| p.kind), Some(PieceKind::Pawn));
    assert_eq!(session.board().piece_at(sq(4, 3)).map(|p| p.kind), Some(PieceKind::Bishop));
}

#[test]
fn conversion_undoes_and_redoes_exactly() {
    let board = board_with(&[
        (7, 7, PieceKind::King, Color::White),
        (0, 0, PieceKind::King, Color::Black),
        (2, 2, PieceKind::Queen, Color::White),
        (2, 4, PieceKind::Pawn, Color::Black),
    ]);
    let mut session = seeded(board, RuleKind::KingQueenSpecialRule, 1);
    assert_undo_redo_exact(&mut session, Move::new(sq(2, 2), sq(2, 4), PieceKind::Queen, Color::White));
    assert_eq!(session.board(), &board);
    assert_eq!(session.current_turn(), Color::White);
}

#[test]
fn queen_converts_on_every_capture() {
    let board = board_with(&[
        (7, 4, PieceKind::King, Color::White),
        (0, 0, PieceKind::King, Color::Black),
        (2, 2, PieceKind::Queen, Color::White),
        (2, 4, PieceKind::Pawn, Color::Black),
        (5, 3, PieceKind::Knight, Color::Black),
    ]);
    let mut session = seeded(board, RuleKind::KingQueenSpecialRule, 1);
    session.submit_move(&Move::new(sq(2, 2), sq(2, 4), PieceKind::Queen, Color::White));
    session.submit_move(&Move::new(sq(0, 0), sq(0, 1), PieceKind::King, Color::Black));
    let result = session.submit_move(&Move::new(sq(2, 3), sq(5, 3), PieceKind::Queen, Color::White));
    assert_eq!(result, MoveResult::ValidMove);
    assert_eq!(session.board().piece_at(sq(5, 3)).map(|p| (p.kind, p.color)), Some((PieceKind::Knight, Color::White)));
    assert_eq!(session.board().piece_at(sq(4, 3)).map(|p| (p.kind, p.color)), Some((PieceKind::Queen, Color::White)));
}

#[test]
fn cannon_is_spent_without_the_cannon_rule() {
    let mut board = board_with(&[
        (7, 7, PieceKind::King, Color::White),
        (0, 0, PieceKind::King, Color::Black),
        (4, 6, PieceKind::Pawn, Color::White),
        (4, 4, PieceKind::Knight, Color::Black),
    ]);
    let mut cannon = Piece::new(PieceKind::Cannon, Color::White);
    cannon.capture_count = 2;
    board.place(sq(4, 7), cannon);

    let mut session = seeded(board, RuleKind::None, 1);
    session.submit_move(&Move::new(sq(4, 7), sq(4, 4), PieceKind::Cannon, Color::White));
    let spent = session.board().piece_at(sq(4, 4)).copied().unwrap();
    assert!(spent.immobile);
    assert_eq!(spent.capture_count, 3);
    assert_eq!(session.valid_moves(4, 4, PieceKind::Cannon, Color::White), Ok(vec![]));
}

#[test]
fn queen_conversion_steps_back() {
    let board = board_with(&[
        (7, 7, PieceKind::King, Color::White),
        (0, 0, PieceKind::King, Color::Black),
        (2, 2, PieceKind::Queen, Color::White),
        (2, 4, PieceKind::Pawn, Color::Black),
    ]);
    let mut session = seeded(board, RuleKind::KingQueenSpecialRule, 1);
    let capture = Move::new(sq(2, 2), sq(2, 4), PieceKind::Queen, Color::White);
    assert_eq!(session.submit_move(&capture), MoveResult::ValidMove);

    let after = session.board();
    assert_eq!(after.piece_at(sq(2, 3)).map(|p| (p.kind, p.color)), Some((PieceKind::Queen, Color::White)));
    assert_eq!(after.piece_at(sq(2, 4)).map(|p| (p.kind, p.color)), Some((PieceKind::Pawn, Color::White)));
    assert!(after.piece_at(sq(2, 2)).is_none());
}

#[test]
fn pawn_metamorphosis_tiers() {
    for seed in 0..32 {
        let board = board_with(&[
            (7, 7, PieceKind::King, Color::White),
            (0, 0, PieceKind::King, Color::Black),
            (4, 4, PieceKind::Pawn, Color::White),
            (3, 3, PieceKind::Knight, Color::Black),
        ]);
        let mut session = seeded(board, RuleKind::PawnPromotionRule, seed);
        session.submit_move(&Move::new(sq(4, 4), sq(3, 3), PieceKind::Pawn, Color::White));
        let kind = session.board().piece_at(sq(3, 3)).map(|p| p.kind);
        assert!(matches!(kind, Some(PieceKind::Knight) | Some(PieceKind::Bishop)), "seed {}: {:?}", seed, kind);
    }

    let mut board = board_with(&[
        (7, 7, PieceKind::King, Color::White),
        (0, 0, PieceKind::King, Color::Black),
        (3, 4, PieceKind::Bishop, Color::Black),
    ]);
    let mut veteran = Piece::new(PieceKind::Rook, Color::White).promoted(PieceKind::Rook);
    veteran.capture_count = 2;
    board.place(sq(6, 4), veteran);
    let mut session = seeded(board, RuleKind::PawnPromotionRule, 9);
    session.submit_move(&Move::new(sq(6, 4), sq(3, 4), PieceKind::Rook, Color::White));
    let queen = session.board().piece_at(sq(3, 4)).copied().unwrap();
    assert_eq!(queen.kind, PieceKind::Queen);
    assert_eq!(queen.capture_count, 3);
    assert!(queen.promoted_from_pawn);
}

#[test]
fn out_of_turn_move_changes_nothing() {
    let mut session = GameSession::new(RuleKind::None, false, StdRng::seed_from_u64(4));
    let before = session.state().clone();
    let black_push = Move::new(sq(1, 0), sq(2, 0), PieceKind::Pawn, Color::Black);
    assert_eq!(session.submit_move(&black_push), MoveResult::InvalidMove);
    assert_eq!(session.state(), &before);
    assert!(!session.can_undo());
}

#[test]
fn capturing_the_king_ends_the_game() {
    let board = board_with(&[
        (7, 7, PieceKind::King, Color::White),
        (0, 4, PieceKind::King, Color::Black),
        (5, 4, PieceKind::Rook, Color::White),
    ]);
    let mut session = seeded(board, RuleKind::None, 1);
    assert_eq!(session.submit_move(&Move::new(sq(5, 4), sq(0, 4), PieceKind::Rook, Color::White)), MoveResult::WhiteWins);
    assert_eq!(session.status(), GameStatus::GameOver(MoveResult::WhiteWins));
    assert_eq!(session.submit_move(&Move::new(sq(7, 7), sq(6, 7), PieceKind::King, Color::White)), MoveResult::InvalidMove);

    // Undo brings a finished game back to life.
    session.undo().unwrap();
    assert_eq!(session.status(), GameStatus::AwaitingMove);
}

fn undo_redo_walk(rule: RuleKind, picker: &mut dyn MovePicker, seed: u64) {
    let mut session = GameSession::new(rule, false, StdRng::seed_from_u64(seed));
    let mut snapshots: Vec<GameState> = vec![session.state().clone()];
    for _ in 0..40 {
        if session.ai_move(picker).is_err() {
            break;
        }
        snapshots.push(session.state().clone());
    }

    for expected in snapshots.iter().rev().skip(1) {
        session.undo().unwrap();
        assert_eq!(session.state(), expected);
    }
    assert!(!session.can_undo());

    for expected in snapshots.iter().skip(1) {
        session.redo().unwrap();
        assert_eq!(session.state(), expected);
    }
    assert!(!session.can_redo());
}

#[test]
fn undo_and_redo_are_exact_under_every_rule() {
    for rule in RuleKind::ALL {
        for seed in 0..4 {
            undo_redo_walk(rule, &mut RandomPicker::new(StdRng::seed_from_u64(seed)), seed);
            undo_redo_walk(rule, &mut GreedyPicker::new(StdRng::seed_from_u64(seed)), seed);
        }
    }
}

#[test]
fn set_rule_clears_counters_and_history() {
    let mut session = GameSession::new(RuleKind::PawnPromotionRule, false, StdRng::seed_from_u64(8));
    let mut picker = GreedyPicker::new(StdRng::seed_from_u64(8));
    for _ in 0..12 {
        if session.ai_move(&mut picker).is_err() {
            break;
        }
    }
    session.undo().unwrap();
    session.set_rule(RuleKind::CannonSpecialRule);
    assert_eq!(session.active_rule(), RuleKind::CannonSpecialRule);
    assert_eq!(session.board(), &Board::starting());
    assert!(!session.can_undo() && !session.can_redo());
    assert!(session.board().occupied().all(|(_, p)| p.capture_count == 0 && !p.immobile && !p.promoted_from_pawn));
}

#[test]
fn shuffled_start_keeps_rooks_in_corners() {
    let session = GameSession::new(RuleKind::None, true, StdRng::seed_from_u64(21));
    let board = session.initial_board();
    for (row, color) in [(0, Color::Black), (7, Color::White)] {
        for col in [0, 7] {
            assert_eq!(board.piece_at(sq(row, col)).map(|p| (p.kind, p.color)), Some((PieceKind::Rook, color)));
        }
        assert!(board.find_king(color).is_some());
    }
    assert_eq!(session.board(), board);
}
