#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure win detector for the puzzle board.

use huarongdao_core::{Board, CellCoord};

/// Reports whether the board's protagonist rests on the victory cell.
///
/// A board without exactly one protagonist is never solved.
#[must_use]
pub fn is_solved(board: &Board, victory_cell: CellCoord) -> bool {
    let mut protagonists = board.protagonists();
    match (protagonists.next(), protagonists.next()) {
        (Some(protagonist), None) => protagonist.origin() == victory_cell,
        _ => false,
    }
}
