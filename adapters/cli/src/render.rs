use std::fmt::Write as _;

use huarongdao_core::{format_time, Board, CellCoord, SessionStatus, VICTORY_CELL};
use huarongdao_world::{query, Session};

const CELL_WIDTH: usize = 4;

/// Draws the board as a text grid, one row per line, with the exit marked
/// under the victory columns.
pub(crate) fn board(board: &Board) -> String {
    let columns = i32::try_from(board.columns()).unwrap_or(i32::MAX);
    let rows = i32::try_from(board.rows()).unwrap_or(i32::MAX);
    let mut out = String::new();

    let border = format!("+{}+", "-".repeat(CELL_WIDTH * board.columns() as usize));
    out.push_str(&border);
    out.push('\n');
    for row in 0..rows {
        out.push('|');
        for column in 0..columns {
            let label = board
                .piece_at(CellCoord::new(column, row))
                .map_or(".", |piece| piece.id().as_str());
            let _ = write!(out, "{:^width$}", truncate(label), width = CELL_WIDTH);
        }
        out.push_str("|\n");
    }

    out.push('+');
    for column in 0..columns {
        let exit = column == VICTORY_CELL.column() || column == VICTORY_CELL.column() + 1;
        out.push_str(&(if exit { " " } else { "-" }).repeat(CELL_WIDTH));
    }
    out.push('+');
    out
}

fn truncate(label: &str) -> &str {
    match label.char_indices().nth(CELL_WIDTH - 1) {
        Some((index, _)) => &label[..index],
        None => label,
    }
}

/// One-line summary of the session's progress.
pub(crate) fn status_line(session: &Session) -> String {
    let status = match query::status(session) {
        SessionStatus::Idle => "idle",
        SessionStatus::Playing => "playing",
        SessionStatus::Paused => "paused",
        SessionStatus::Solved => "solved",
    };
    format!(
        "moves {}  time {}  [{status}]",
        query::move_count(session),
        format_time(query::elapsed_seconds(session))
    )
}
