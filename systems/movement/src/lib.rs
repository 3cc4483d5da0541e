#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic move engine that decides which single-cell slides are legal.
//!
//! Every function here is pure: boards are inspected by reference and a
//! successful [`apply_move`] hands back a new board, leaving the input intact.
//! Counting moves, checking for victory, and animating are the session's job.

use huarongdao_core::{Board, Direction, PieceId, SolutionStep};
use thiserror::Error;
use tracing::debug;

/// A legal one-step move for a piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    /// Direction of travel.
    pub direction: Direction,
    /// Column delta of the move.
    pub dx: i32,
    /// Row delta of the move.
    pub dy: i32,
}

impl From<Direction> for Move {
    fn from(direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self { direction, dx, dy }
    }
}

/// Reasons [`apply_move`] refuses a translation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IllegalMove {
    /// The board holds no piece with the identifier.
    #[error("no piece named {piece} is on the board")]
    UnknownPiece {
        /// Identifier that was looked up.
        piece: PieceId,
    },
    /// The slide would leave the grid or collide with another piece.
    #[error("piece {piece} cannot move {direction}")]
    Blocked {
        /// Piece that was asked to move.
        piece: PieceId,
        /// Requested direction.
        direction: Direction,
    },
}

/// Failure raised while replaying a sequence of steps.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("step {index} failed: {source}")]
pub struct ReplayError {
    /// Zero-based index of the failing step.
    pub index: usize,
    /// The move that could not be applied.
    #[source]
    pub source: IllegalMove,
}

/// Reports whether the named piece can slide one cell in `direction`.
///
/// Unknown pieces cannot move.
#[must_use]
pub fn can_move(board: &Board, piece: &PieceId, direction: Direction) -> bool {
    board.piece(piece).map_or(false, |found| {
        board.is_region_free(&found.rect().stepped(direction), Some(piece))
    })
}

/// Offset form of [`can_move`].
///
/// Anything other than exactly one cardinal step is never legal.
#[must_use]
pub fn can_move_by(board: &Board, piece: &PieceId, dx: i32, dy: i32) -> bool {
    Direction::from_offset(dx, dy).map_or(false, |direction| can_move(board, piece, direction))
}

/// Lists the legal moves of a piece in canonical direction order
/// (up, down, left, right).
#[must_use]
pub fn valid_moves(board: &Board, piece: &PieceId) -> Vec<Move> {
    Direction::ALL
        .into_iter()
        .filter(|direction| can_move(board, piece, *direction))
        .map(Move::from)
        .collect()
}

/// Returns a copy of the board with the named piece moved one cell.
///
/// All other pieces are unchanged. The input board is never modified.
pub fn apply_move(
    board: &Board,
    piece: &PieceId,
    direction: Direction,
) -> Result<Board, IllegalMove> {
    let Some(found) = board.piece(piece) else {
        debug!(%piece, %direction, "move refused: unknown piece");
        return Err(IllegalMove::UnknownPiece {
            piece: piece.clone(),
        });
    };

    if !can_move(board, piece, direction) {
        debug!(%piece, %direction, "move refused: blocked");
        return Err(IllegalMove::Blocked {
            piece: piece.clone(),
            direction,
        });
    }

    let destination = found.origin().step(direction);
    let mut next = board.clone();
    let _ = next.relocate(piece, destination);
    Ok(next)
}

/// Picks a direction for a piece whose direction was left unspecified.
///
/// Directions are tried in `preference` order (defaulting to
/// [`Direction::TAP_PREFERENCE`]) and the first legal one wins. When none of
/// the preferred directions is legal, the first entry of [`valid_moves`] is
/// used instead. Returns `None` when the piece cannot move at all.
#[must_use]
pub fn select_direction(
    board: &Board,
    piece: &PieceId,
    preference: Option<&[Direction]>,
) -> Option<Direction> {
    let preference = preference.unwrap_or(&Direction::TAP_PREFERENCE);
    preference
        .iter()
        .copied()
        .find(|direction| can_move(board, piece, *direction))
        .or_else(|| {
            valid_moves(board, piece)
                .first()
                .map(|candidate| candidate.direction)
        })
}

/// Applies a sequence of steps in order, stopping at the first illegal one.
pub fn replay(board: &Board, steps: &[SolutionStep]) -> Result<Board, ReplayError> {
    let mut current = board.clone();
    for (index, step) in steps.iter().enumerate() {
        current = apply_move(&current, &step.piece, step.direction)
            .map_err(|source| ReplayError { index, source })?;
    }
    Ok(current)
}
