use huarongdao_catalog::builtin_level;
use huarongdao_core::{
    Board, CellCoord, Command, Direction, Event, LevelKey, PieceId, SessionStatus,
};
use huarongdao_system_gesture::{GestureConfig, Gestures, PointerInput};

fn board() -> Board {
    builtin_level(1).expect("level 1 exists").board().clone()
}

fn playing() -> Vec<Event> {
    vec![
        Event::LevelStarted {
            key: LevelKey::BuiltIn(1),
            piece_count: 7,
        },
        Event::StatusChanged {
            status: SessionStatus::Playing,
        },
    ]
}

fn press(x: f32, y: f32) -> PointerInput {
    PointerInput::Press { x, y }
}

fn motion(x: f32, y: f32) -> PointerInput {
    PointerInput::Motion { x, y }
}

fn feed(
    gestures: &mut Gestures,
    events: &[Event],
    input: PointerInput,
    board: &Board,
) -> Vec<Command> {
    let mut commands = Vec::new();
    gestures.handle(events, Some(input), board, &mut commands);
    commands
}

#[test]
fn drag_past_threshold_requests_dominant_direction() {
    let board = board();
    let mut gestures = Gestures::default();

    let pressed = feed(&mut gestures, &playing(), press(150.0, 350.0), &board);
    assert!(pressed.is_empty());

    let small = feed(&mut gestures, &[], motion(160.0, 370.0), &board);
    assert!(small.is_empty(), "20px is below the drag threshold");

    let commands = feed(&mut gestures, &[], motion(140.0, 390.0), &board);
    assert_eq!(
        commands,
        vec![Command::RequestMove {
            piece: PieceId::from("S3"),
            direction: Some(Direction::Down),
        }],
        "vertical travel dominates",
    );

    let again = feed(&mut gestures, &[], motion(140.0, 420.0), &board);
    assert!(again.is_empty(), "a drag commits at most once");

    let released = feed(&mut gestures, &[], PointerInput::Release, &board);
    assert!(released.is_empty(), "release after a slide is not a tap");
}

#[test]
fn drag_toward_blocked_direction_keeps_tracking() {
    let board = board();
    let mut gestures = Gestures::default();
    let _ = feed(&mut gestures, &playing(), press(150.0, 350.0), &board);

    let blocked = feed(&mut gestures, &[], motion(200.0, 355.0), &board);
    assert!(blocked.is_empty(), "S4 blocks S3 on the right");
    assert!(gestures.is_dragging());

    let left = feed(&mut gestures, &[], motion(100.0, 355.0), &board);
    assert_eq!(
        left,
        vec![Command::RequestMove {
            piece: PieceId::from("S3"),
            direction: Some(Direction::Left),
        }]
    );
}

#[test]
fn release_without_slide_is_a_tap() {
    let board = board();
    let mut gestures = Gestures::default();
    let _ = feed(&mut gestures, &playing(), press(150.0, 50.0), &board);

    let commands = feed(&mut gestures, &[], PointerInput::Release, &board);

    assert_eq!(
        commands,
        vec![Command::RequestMove {
            piece: PieceId::from("C"),
            direction: None,
        }]
    );
}

#[test]
fn leaving_the_surface_cancels_without_commands() {
    let board = board();
    let mut gestures = Gestures::default();
    let _ = feed(&mut gestures, &playing(), press(150.0, 350.0), &board);

    let left = feed(&mut gestures, &[], PointerInput::Leave, &board);
    let released = feed(&mut gestures, &[], PointerInput::Release, &board);

    assert!(left.is_empty());
    assert!(released.is_empty());
    assert!(!gestures.is_dragging());
}

#[test]
fn presses_are_ignored_unless_playing() {
    let board = board();
    let mut gestures = Gestures::default();

    let _ = feed(&mut gestures, &[], press(150.0, 350.0), &board);
    assert!(!gestures.is_dragging(), "idle session ignores presses");

    let paused = [
        Event::StatusChanged {
            status: SessionStatus::Playing,
        },
        Event::StatusChanged {
            status: SessionStatus::Paused,
        },
    ];
    let _ = feed(&mut gestures, &paused, press(150.0, 350.0), &board);
    assert!(!gestures.is_dragging(), "paused session ignores presses");
}

#[test]
fn presses_are_ignored_while_a_move_is_in_flight() {
    let board = board();
    let mut gestures = Gestures::default();
    let mut events = playing();
    events.push(Event::MoveStarted {
        piece: PieceId::from("S3"),
        direction: Direction::Down,
        from: CellCoord::new(1, 3),
        to: CellCoord::new(1, 4),
    });

    let _ = feed(&mut gestures, &events, press(50.0, 250.0), &board);
    assert!(!gestures.is_dragging());

    let settled = [Event::PieceMoved {
        piece: PieceId::from("S3"),
        direction: Direction::Down,
        from: CellCoord::new(1, 3),
        to: CellCoord::new(1, 4),
        move_count: 1,
    }];
    let _ = feed(&mut gestures, &settled, press(50.0, 250.0), &board);
    assert!(gestures.is_dragging());
}

#[test]
fn pressing_an_empty_cell_tracks_nothing() {
    let board = board();
    let mut gestures = Gestures::default();

    let _ = feed(&mut gestures, &playing(), press(150.0, 250.0), &board);

    assert!(!gestures.is_dragging());
}

#[test]
fn custom_geometry_scales_cells_and_threshold() {
    let board = board();
    let mut gestures = Gestures::new(GestureConfig {
        cell_size_px: 50.0,
        drag_threshold_px: 10.0,
    });
    let _ = feed(&mut gestures, &playing(), press(75.0, 175.0), &board);

    let mut commands = Vec::new();
    gestures.handle(&[], None, &board, &mut commands);
    assert!(commands.is_empty(), "no input, no commands");

    let commands = feed(&mut gestures, &[], motion(75.0, 164.0), &board);
    assert_eq!(
        commands,
        vec![Command::RequestMove {
            piece: PieceId::from("S3"),
            direction: Some(Direction::Up),
        }]
    );
}

#[test]
fn non_finite_positions_are_ignored() {
    let board = board();
    let mut gestures = Gestures::default();

    let presses = [
        (f32::NAN, f32::NAN),
        (f32::INFINITY, 350.0),
        (150.0, f32::NEG_INFINITY),
    ];
    for (x, y) in presses {
        let commands = feed(&mut gestures, &playing(), press(x, y), &board);
        assert!(commands.is_empty());
        assert!(!gestures.is_dragging(), "press at ({x}, {y}) must not grab a piece");
    }

    let pressed = feed(&mut gestures, &[], press(150.0, 350.0), &board);
    assert!(pressed.is_empty());
    let motions = [
        (f32::NAN, f32::NAN),
        (150.0, f32::INFINITY),
        (f32::NEG_INFINITY, 350.0),
    ];
    for (x, y) in motions {
        let commands = feed(&mut gestures, &[], motion(x, y), &board);
        assert!(commands.is_empty(), "motion to ({x}, {y}) must not request a move");
    }
    assert!(gestures.is_dragging(), "the original press is still tracked");

    let dragged = feed(&mut gestures, &[], motion(150.0, 400.0), &board);
    assert_eq!(
        dragged,
        vec![Command::RequestMove {
            piece: PieceId::from("S3"),
            direction: Some(Direction::Down),
        }]
    );
}
