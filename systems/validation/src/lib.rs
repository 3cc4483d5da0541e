#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure layout validator that decides whether a board may become a playable level.
//!
//! The validator is consulted by the editor before saving, exporting, or test
//! playing a layout, and by the session before loading a level. It never
//! mutates the board and may be run at any time on a partially built layout.

use std::collections::HashSet;

use huarongdao_core::{Board, ValidationFailure};
use serde::Serialize;
use tracing::debug;

/// Checks a board for structural legality.
///
/// Checks run in a fixed order and stop at the first failure: an empty
/// board, a missing protagonist, a second protagonist, a piece outside the
/// grid, a pair of overlapping pieces, and finally a reused piece identifier.
pub fn validate_layout(board: &Board) -> Result<(), ValidationFailure> {
    let outcome = run_checks(board);
    if let Err(reason) = &outcome {
        debug!(%reason, pieces = board.len(), "layout rejected");
    }
    outcome
}

fn run_checks(board: &Board) -> Result<(), ValidationFailure> {
    if board.is_empty() {
        return Err(ValidationFailure::EmptyBoard);
    }

    match board.protagonists().count() {
        0 => return Err(ValidationFailure::MissingProtagonist),
        1 => {}
        _ => return Err(ValidationFailure::DuplicateProtagonist),
    }

    if let Some(piece) = board
        .pieces()
        .iter()
        .find(|piece| !board.in_bounds(&piece.rect()))
    {
        return Err(ValidationFailure::OutOfBounds {
            piece: piece.id().clone(),
        });
    }

    let pieces = board.pieces();
    for (index, first) in pieces.iter().enumerate() {
        for second in &pieces[index + 1..] {
            if first.rect().overlaps(&second.rect()) {
                return Err(ValidationFailure::Overlap {
                    first: first.id().clone(),
                    second: second.id().clone(),
                });
            }
        }
    }

    let mut seen = HashSet::with_capacity(pieces.len());
    for piece in pieces {
        if !seen.insert(piece.id()) {
            return Err(ValidationFailure::DuplicatePieceId {
                piece: piece.id().clone(),
            });
        }
    }

    Ok(())
}

/// Display-oriented summary of a validation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LayoutReport {
    /// Indicates whether the layout passed every check.
    pub valid: bool,
    /// First failed check, if any.
    pub reason: Option<ValidationFailure>,
    /// Human-readable message suitable for showing to the author.
    pub message: String,
}

impl LayoutReport {
    /// Validates the board and captures the outcome.
    #[must_use]
    pub fn of(board: &Board) -> Self {
        match validate_layout(board) {
            Ok(()) => Self {
                valid: true,
                reason: None,
                message: String::from("layout is valid"),
            },
            Err(reason) => Self {
                valid: false,
                message: reason.to_string(),
                reason: Some(reason),
            },
        }
    }
}
