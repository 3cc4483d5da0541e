//! Built-in level table.
//!
//! Reference solutions are single-cell steps and were verified by exhaustive
//! search; `min_moves` is the length of the shortest such line.

use huarongdao_core::{Board, CellCoord, Level, Piece, PieceKind, Solution, SolutionStep};

struct PieceSeed {
    id: &'static str,
    kind: PieceKind,
    column: i32,
    row: i32,
    label: &'static str,
}

const fn seed(
    id: &'static str,
    kind: PieceKind,
    column: i32,
    row: i32,
    label: &'static str,
) -> PieceSeed {
    PieceSeed {
        id,
        kind,
        column,
        row,
        label,
    }
}

struct LevelSeed {
    name: &'static str,
    description: &'static str,
    pieces: &'static [PieceSeed],
    solution: &'static [(&'static str, i32, i32)],
}

use PieceKind::{HorizontalGeneral, Protagonist, Soldier, VerticalGeneral};

const FLYING_SWALLOW: &[PieceSeed] = &[
    seed("C", Protagonist, 1, 0, "曹操"),
    seed("G", VerticalGeneral, 0, 0, "关羽"),
    seed("Z", VerticalGeneral, 3, 0, "张飞"),
    seed("S1", Soldier, 0, 2, "兵"),
    seed("S2", Soldier, 3, 2, "兵"),
    seed("S3", Soldier, 1, 3, "兵"),
    seed("S4", Soldier, 2, 3, "兵"),
];

const LAYERED_DEFENCE: &[PieceSeed] = &[
    seed("C", Protagonist, 1, 0, "曹操"),
    seed("G", VerticalGeneral, 0, 0, "关羽"),
    seed("Z", VerticalGeneral, 3, 0, "张飞"),
    seed("Y", VerticalGeneral, 0, 2, "赵云"),
    seed("M", VerticalGeneral, 3, 2, "马超"),
    seed("S1", Soldier, 1, 2, "兵"),
    seed("S2", Soldier, 2, 2, "兵"),
    seed("S3", Soldier, 1, 3, "兵"),
    seed("S4", Soldier, 2, 3, "兵"),
];

const CROSSWISE_BLADE: &[PieceSeed] = &[
    seed("C", Protagonist, 1, 0, "曹操"),
    seed("G", VerticalGeneral, 0, 0, "黄忠"),
    seed("Z", VerticalGeneral, 3, 0, "张飞"),
    seed("Y", VerticalGeneral, 0, 2, "赵云"),
    seed("M", VerticalGeneral, 3, 2, "马超"),
    seed("H", HorizontalGeneral, 1, 2, "关羽"),
    seed("S1", Soldier, 1, 3, "兵"),
    seed("S2", Soldier, 2, 3, "兵"),
    seed("S3", Soldier, 0, 4, "兵"),
    seed("S4", Soldier, 3, 4, "兵"),
];

#[rustfmt::skip]
const FLYING_SWALLOW_SOLUTION: &[(&str, i32, i32)] = &[
    ("C", 0, 1), ("S3", -1, 0), ("S4", 1, 0), ("C", 0, 1), ("C", 0, 1),
];

#[rustfmt::skip]
const LAYERED_DEFENCE_SOLUTION: &[(&str, i32, i32)] = &[
    ("Y", 0, 1), ("M", 0, 1), ("S1", -1, 0), ("S2", 1, 0), ("C", 0, 1), ("S3", 0, 1),
    ("S4", 0, 1), ("C", 0, 1), ("G", 1, 0), ("Z", -1, 0), ("S1", 0, -1), ("Y", 0, -1),
    ("S2", 0, -1), ("M", 0, -1), ("S3", -1, 0), ("S4", 1, 0), ("C", 0, 1),
];

#[rustfmt::skip]
const CROSSWISE_BLADE_SOLUTION: &[(&str, i32, i32)] = &[
    ("S3", 1, 0), ("Y", 0, 1), ("H", -1, 0), ("S2", 0, -1), ("S4", -1, 0), ("M", 0, 1),
    ("S2", 1, 0), ("H", 1, 0), ("Y", 0, -1), ("S3", -1, 0), ("S4", -1, 0), ("M", -1, 0),
    ("S2", 0, 1), ("H", 1, 0), ("S1", 0, -1), ("S2", 0, 1), ("S4", 0, -1), ("S3", 1, 0),
    ("Y", 0, 1), ("S1", -1, 0), ("H", -1, 0), ("Z", 0, 1), ("Z", 0, 1), ("C", 1, 0),
    ("G", 1, 0), ("S1", 0, -1), ("Y", 0, -1), ("S1", 0, -1), ("Y", 0, -1), ("S3", -1, 0),
    ("S4", -1, 0), ("M", -1, 0), ("S2", -1, 0), ("Z", 0, 1), ("H", 1, 0), ("M", 0, -1),
    ("S2", 0, -1), ("S3", 1, 0), ("S3", 1, 0), ("M", 0, 1), ("G", 0, 1), ("S1", 1, 0),
    ("Y", 0, -1), ("S4", 0, -1), ("M", -1, 0), ("G", 0, 1), ("G", 0, 1), ("S4", 1, 0),
    ("S4", 0, -1), ("H", -1, 0), ("Z", 0, -1), ("H", -1, 0), ("S3", 1, 0), ("S2", 0, 1),
    ("Z", -1, 0), ("S3", 0, -1), ("S2", 1, 0), ("Z", 0, 1), ("H", 1, 0), ("Y", 0, 1),
    ("H", 1, 0), ("G", 0, -1), ("S1", -1, 0), ("S4", 0, -1), ("G", 0, -1), ("Z", -1, 0),
    ("S2", -1, 0), ("S3", 0, 1), ("H", 0, 1), ("C", 0, 1), ("S4", 1, 0), ("S1", 1, 0),
    ("Y", 0, -1), ("M", 0, -1), ("S4", 1, 0), ("S1", 1, 0), ("G", 0, -1), ("Z", 0, -1),
    ("S2", -1, 0), ("S2", -1, 0), ("S3", -1, 0), ("S3", -1, 0), ("H", 0, 1), ("C", 0, 1),
    ("S1", 0, 1), ("S1", 1, 0), ("G", 1, 0), ("Z", 0, -1), ("Z", 0, -1), ("C", -1, 0),
    ("S1", 0, 1), ("S1", 0, 1), ("S4", 0, 1), ("S4", 0, 1), ("G", 1, 0), ("Z", 1, 0),
    ("Y", 1, 0), ("M", 0, -1), ("M", 0, -1), ("C", -1, 0), ("S1", -1, 0), ("S1", 0, -1),
    ("H", 0, -1), ("S3", 1, 0), ("S2", 1, 0), ("S3", 1, 0), ("S2", 1, 0), ("C", 0, 1),
    ("S1", -1, 0), ("S1", -1, 0), ("S4", -1, 0), ("S4", -1, 0), ("H", 0, -1), ("S2", 0, -1),
    ("S2", 1, 0), ("C", 1, 0),
];

const LEVELS: [LevelSeed; 3] = [
    LevelSeed {
        name: "飞燕归巢",
        description: "Easy: clear the two soldiers under Cao Cao and walk him out",
        pieces: FLYING_SWALLOW,
        solution: FLYING_SWALLOW_SOLUTION,
    },
    LevelSeed {
        name: "层层设防",
        description: "Medium: four generals and four soldiers guard the exit",
        pieces: LAYERED_DEFENCE,
        solution: LAYERED_DEFENCE_SOLUTION,
    },
    LevelSeed {
        name: "横刀立马",
        description: "Hard: the classic opening with Guan Yu standing crosswise",
        pieces: CROSSWISE_BLADE,
        solution: CROSSWISE_BLADE_SOLUTION,
    },
];

/// Number of built-in levels.
pub(crate) const LEVEL_COUNT: u32 = LEVELS.len() as u32;

/// Builds a fresh copy of the numbered level (1-based).
pub(crate) fn build(number: u32) -> Option<Level> {
    let index = usize::try_from(number.checked_sub(1)?).ok()?;
    let seed = LEVELS.get(index)?;

    let pieces = seed
        .pieces
        .iter()
        .map(|piece| {
            Piece::new(piece.id, piece.kind, CellCoord::new(piece.column, piece.row))
                .with_label(piece.label)
        })
        .collect();

    let steps: Vec<SolutionStep> = seed
        .solution
        .iter()
        .filter_map(|&(piece, dx, dy)| SolutionStep::from_offset(piece, dx, dy))
        .collect();
    let min_moves = u32::try_from(steps.len()).unwrap_or(u32::MAX);

    Some(
        Level::new(seed.name, seed.description, Board::standard(pieces))
            .with_solution(Solution::new(steps, min_moves)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_solution_step_is_a_single_cardinal_step() {
        for seed in &LEVELS {
            for &(piece, dx, dy) in seed.solution {
                assert!(
                    SolutionStep::from_offset(piece, dx, dy).is_some(),
                    "{} has a malformed step for {piece}",
                    seed.name
                );
            }
        }
    }

    #[test]
    fn level_numbers_are_one_based() {
        assert!(build(0).is_none());
        assert!(build(1).is_some());
        assert!(build(LEVEL_COUNT).is_some());
        assert!(build(LEVEL_COUNT + 1).is_none());
    }
}
