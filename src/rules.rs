// src/rules.rs
//! Post-capture mutations. Exactly one rule is active per game; the executor calls it
//! only after a capture has been applied to the board.

use log::debug;
use rand::{Rng, RngCore};

use crate::board::Board;
use crate::types::{Color, Move, Piece, PieceKind, RuleKind, Square};

/// Capture count at which a cannon detonates (cannon rule) or is spent (any other rule).
pub const CANNON_CHARGE: u32 = 3;

const NEIGHBOURS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Everything a rule may look at or touch after a capture.
/// When this runs, the mover already stands on `mv.end` with its capture count bumped,
/// and `captured` has been taken off the board.
pub struct CaptureContext<'a> {
    pub board: &'a mut Board,
    pub mv: Move,
    pub captured: Piece,
    pub rng: &'a mut dyn RngCore,
    /// Replays a recorded metamorphosis instead of rolling again (redo).
    pub forced_promotion: Option<PieceKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleEffect {
    Unchanged,
    Promoted(PieceKind),
    Converted { converted_at: Square, capturer_at: Square },
    Detonated { removed: Vec<Square> },
}

pub trait SpecialRule: Send + Sync {
    fn kind(&self) -> RuleKind;

    fn after_capture(&self, ctx: &mut CaptureContext<'_>) -> RuleEffect;
}

pub struct NoSpecialRule;
pub struct PawnPromotionRule;
pub struct KingQueenSpecialRule;
pub struct CannonSpecialRule;

static NO_SPECIAL_RULE: NoSpecialRule = NoSpecialRule;
static PAWN_PROMOTION_RULE: PawnPromotionRule = PawnPromotionRule;
static KING_QUEEN_SPECIAL_RULE: KingQueenSpecialRule = KingQueenSpecialRule;
static CANNON_SPECIAL_RULE: CannonSpecialRule = CannonSpecialRule;

pub fn rule_for(kind: RuleKind) -> &'static dyn SpecialRule {
    match kind {
        RuleKind::None => &NO_SPECIAL_RULE,
        RuleKind::PawnPromotionRule => &PAWN_PROMOTION_RULE,
        RuleKind::KingQueenSpecialRule => &KING_QUEEN_SPECIAL_RULE,
        RuleKind::CannonSpecialRule => &CANNON_SPECIAL_RULE,
    }
}

impl SpecialRule for NoSpecialRule {
    fn kind(&self) -> RuleKind {
        RuleKind::None
    }

    fn after_capture(&self, _ctx: &mut CaptureContext<'_>) -> RuleEffect {
        RuleEffect::Unchanged
    }
}

// --- Pawn metamorphosis ---

/// Candidate shapes after the n-th capture of a pawn-born piece.
pub fn metamorphosis_choices(capture_count: u32) -> &'static [PieceKind] {
    match capture_count {
        1 => &[PieceKind::Knight, PieceKind::Bishop],
        2 => &[PieceKind::Cannon, PieceKind::Rook],
        3 => &[PieceKind::Queen],
        _ => &[],
    }
}

impl SpecialRule for PawnPromotionRule {
    fn kind(&self) -> RuleKind {
        RuleKind::PawnPromotionRule
    }

    fn after_capture(&self, ctx: &mut CaptureContext<'_>) -> RuleEffect {
        let mover = match ctx.board.piece_at(ctx.mv.end) {
            Some(piece) if piece.kind == PieceKind::Pawn || piece.promoted_from_pawn => *piece,
            _ => return RuleEffect::Unchanged,
        };

        let choices = metamorphosis_choices(mover.capture_count);
        let new_kind = match (choices, ctx.forced_promotion) {
            ([], _) => return RuleEffect::Unchanged,
            (_, Some(forced)) if choices.contains(&forced) => forced,
            ([only], _) => *only,
            ([first, second, ..], _) => if ctx.rng.random_bool(0.5) { *first } else { *second },
        };

        debug!("{} at {} becomes {} after capture #{}", mover.kind, ctx.mv.end, new_kind, mover.capture_count);
        ctx.board.place(ctx.mv.end, mover.promoted(new_kind));
        RuleEffect::Promoted(new_kind)
    }
}

// --- King/Queen conversion ---

impl SpecialRule for KingQueenSpecialRule {
    fn kind(&self) -> RuleKind {
        RuleKind::KingQueenSpecialRule
    }

    fn after_capture(&self, ctx: &mut CaptureContext<'_>) -> RuleEffect {
        let is_royal = ctx.board.piece_at(ctx.mv.end)
            .map_or(false, |p| matches!(p.kind, PieceKind::King | PieceKind::Queen));
        if !is_royal {
            return RuleEffect::Unchanged;
        }
        let (dr, dc) = ctx.mv.back_step();
        let back = match ctx.mv.end.offset(dr, dc) {
            Some(sq) => sq,
            None => return RuleEffect::Unchanged,
        };
        let capturer = match ctx.board.remove(ctx.mv.end) {
            Some(piece) => piece,
            None => return RuleEffect::Unchanged,
        };

        let mut converted = ctx.captured;
        converted.color = capturer.color;
        converted.immobile = false;
        ctx.board.place(ctx.mv.end, converted);

        // Remove-and-overwrite whatever holds the back square.
        if let Some(evicted) = ctx.board.place(back, capturer) {
            debug!("Conversion evicted {} {} from {}", evicted.color, evicted.kind, back);
        }
        debug!("{} converted {} at {}, capturer steps back to {}", capturer.kind, converted.kind, ctx.mv.end, back);
        RuleEffect::Converted { converted_at: ctx.mv.end, capturer_at: back }
    }
}

// --- Cannon detonation ---

impl SpecialRule for CannonSpecialRule {
    fn kind(&self) -> RuleKind {
        RuleKind::CannonSpecialRule
    }

    fn after_capture(&self, ctx: &mut CaptureContext<'_>) -> RuleEffect {
        let cannon = match ctx.board.piece_at(ctx.mv.end) {
            Some(piece) if piece.kind == PieceKind::Cannon && piece.capture_count >= CANNON_CHARGE => *piece,
            _ => return RuleEffect::Unchanged,
        };
        let removed = detonate(ctx.board, ctx.mv.end, cannon.color);
        debug!("Cannon detonated at {}, removed {} enemy piece(s)", ctx.mv.end, removed.len() - 1);
        RuleEffect::Detonated { removed }
    }
}

/// Clears enemy pieces on the four orthogonal neighbours of `at`, then the cannon itself.
/// Returns the cleared squares, the cannon's own square last.
fn detonate(board: &mut Board, at: Square, owner: Color) -> Vec<Square> {
    let mut removed = Vec::with_capacity(5);
    for (dr, dc) in NEIGHBOURS {
        if let Some(neighbour) = at.offset(dr, dc) {
            if board.piece_at(neighbour).map_or(false, |p| p.color != owner) {
                board.remove(neighbour);
                removed.push(neighbour);
            }
        }
    }
    board.remove(at);
    removed.push(at);
    removed
}
