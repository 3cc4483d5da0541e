use chrono::Utc;
use huarongdao_catalog::CustomLevel;
use huarongdao_core::{CellCoord, CustomLevelId, Piece, PieceId, PieceKind, ValidationFailure};
use huarongdao_system_builder::{EditOutcome, Editor, PlacementRejection};

#[test]
fn placement_inside_empty_board_succeeds() {
    let mut editor = Editor::new();

    assert!(editor.place_piece(PieceKind::Protagonist, CellCoord::new(1, 0)));
    assert!(editor.place_piece(PieceKind::VerticalGeneral, CellCoord::new(0, 0)));

    let ids: Vec<&str> = editor
        .board()
        .pieces()
        .iter()
        .map(|piece| piece.id().as_str())
        .collect();
    assert_eq!(ids, vec!["C", "P1"], "protagonist is C, others are numbered");
}

#[test]
fn placement_past_the_edge_is_refused() {
    let mut editor = Editor::new();

    assert!(!editor.place_piece(PieceKind::HorizontalGeneral, CellCoord::new(3, 4)));
    assert!(editor.board().is_empty(), "rejected placement leaves board untouched");

    let preview = editor.preview(PieceKind::VerticalGeneral, CellCoord::new(0, 4));
    assert_eq!(preview.rejection, Some(PlacementRejection::OutOfBounds));
    assert!(!preview.placeable());
}

#[test]
fn overlapping_placement_is_refused() {
    let mut editor = Editor::new();
    assert!(editor.place_piece(PieceKind::Protagonist, CellCoord::new(1, 1)));

    assert!(!editor.place_piece(PieceKind::Soldier, CellCoord::new(2, 2)));
    assert_eq!(
        editor.preview(PieceKind::Soldier, CellCoord::new(2, 2)).rejection,
        Some(PlacementRejection::Occupied)
    );
    assert_eq!(editor.board().len(), 1);
}

#[test]
fn second_protagonist_is_refused() {
    let mut editor = Editor::new();
    assert!(editor.place_piece(PieceKind::Protagonist, CellCoord::new(0, 0)));

    assert_eq!(
        editor.toggle_at(CellCoord::new(2, 3), PieceKind::Protagonist),
        EditOutcome::Rejected(PlacementRejection::SecondProtagonist)
    );
}

#[test]
fn second_protagonist_is_reported_before_geometry() {
    let mut editor = Editor::new();
    assert!(editor.place_piece(PieceKind::Protagonist, CellCoord::new(1, 0)));

    assert_eq!(
        editor.preview(PieceKind::Protagonist, CellCoord::new(1, 1)).rejection,
        Some(PlacementRejection::SecondProtagonist),
        "overlapping the existing protagonist"
    );
    assert_eq!(
        editor.preview(PieceKind::Protagonist, CellCoord::new(3, 4)).rejection,
        Some(PlacementRejection::SecondProtagonist),
        "hanging off the board"
    );
    assert_eq!(
        editor.preview(PieceKind::Soldier, CellCoord::new(3, 4)).rejection,
        None
    );
}

#[test]
fn toggle_removes_then_places() {
    let mut editor = Editor::new();

    let placed = editor.toggle_at(CellCoord::new(0, 0), PieceKind::VerticalGeneral);
    assert_eq!(placed, EditOutcome::Placed(PieceId::from("P1")));

    let removed = editor.toggle_at(CellCoord::new(0, 1), PieceKind::Soldier);
    assert_eq!(
        removed,
        EditOutcome::Removed(Piece::new(
            "P1",
            PieceKind::VerticalGeneral,
            CellCoord::new(0, 0)
        )),
        "clicking any covered cell removes the whole piece"
    );
    assert!(editor.board().is_empty());
}

#[test]
fn remove_on_empty_cell_returns_nothing() {
    let mut editor = Editor::new();
    assert!(editor.remove_piece_at(CellCoord::new(2, 2)).is_none());
}

#[test]
fn editor_validation_and_level_conversion() {
    let mut editor = Editor::new();
    assert_eq!(editor.validate(), Err(ValidationFailure::EmptyBoard));

    assert!(editor.place_piece(PieceKind::Soldier, CellCoord::new(0, 0)));
    assert_eq!(
        editor.to_level("draft", "").map(|_| ()),
        Err(ValidationFailure::MissingProtagonist)
    );

    assert!(editor.place_piece(PieceKind::Protagonist, CellCoord::new(1, 0)));
    let level = editor.to_level("draft", "two pieces").expect("layout is valid");
    assert_eq!(level.name(), "draft");
    assert_eq!(level.board().len(), 2);
    assert!(level.solution().is_none());
}

#[test]
fn loaded_ids_are_never_reused() {
    let now = Utc::now();
    let mut stored = CustomLevel::new(CustomLevelId::new("stored"), now);
    stored.pieces = vec![
        Piece::new("P1", PieceKind::Soldier, CellCoord::new(0, 0)),
        Piece::new("C", PieceKind::Soldier, CellCoord::new(3, 0)),
    ];

    let mut editor = Editor::from_custom(&stored);
    assert_eq!(editor.editing(), Some(&CustomLevelId::new("stored")));

    assert_eq!(
        editor.toggle_at(CellCoord::new(0, 1), PieceKind::Soldier),
        EditOutcome::Placed(PieceId::from("P2"))
    );
    assert_eq!(
        editor.toggle_at(CellCoord::new(1, 1), PieceKind::Protagonist),
        EditOutcome::Placed(PieceId::from("P3")),
        "C is already used by a soldier"
    );
    assert_eq!(editor.validate(), Ok(()));
}

#[test]
fn clear_empties_the_board() {
    let mut editor = Editor::new();
    assert!(editor.place_piece(PieceKind::Soldier, CellCoord::new(0, 0)));

    editor.clear();

    assert!(editor.board().is_empty());
}
