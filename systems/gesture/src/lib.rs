#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure pointer-gesture system that turns drags and taps into move requests.
//!
//! The system tracks the session's status from broadcast events so it knows
//! when presses should be ignored, and it reads the current board to resolve
//! pixel coordinates into pieces. It never touches the board itself: every
//! decision is expressed as a [`Command::RequestMove`].

use huarongdao_core::{Board, CellCoord, Command, Direction, Event, PieceId, SessionStatus};
use huarongdao_system_movement::can_move;
use tracing::debug;

/// Default distance in pixels a pointer must travel before a press becomes a drag.
pub const DEFAULT_DRAG_THRESHOLD_PX: f32 = 30.0;

/// Default edge length of one board cell in pixels.
pub const DEFAULT_CELL_SIZE_PX: f32 = 100.0;

/// Pixel geometry used to interpret pointer positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureConfig {
    /// Edge length of one board cell in pixels.
    pub cell_size_px: f32,
    /// Distance a pointer must travel on either axis before a drag is recognised.
    pub drag_threshold_px: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            cell_size_px: DEFAULT_CELL_SIZE_PX,
            drag_threshold_px: DEFAULT_DRAG_THRESHOLD_PX,
        }
    }
}

/// Pointer input distilled from adapter-provided frame data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerInput {
    /// The pointer was pressed at the given board-relative position.
    Press {
        /// Horizontal pixel position.
        x: f32,
        /// Vertical pixel position.
        y: f32,
    },
    /// The pointer moved while the surface had focus.
    Motion {
        /// Horizontal pixel position.
        x: f32,
        /// Vertical pixel position.
        y: f32,
    },
    /// The pointer was released.
    Release,
    /// The pointer left the board surface.
    Leave,
}

impl PointerInput {
    /// Reports whether every carried coordinate is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        match *self {
            Self::Press { x, y } | Self::Motion { x, y } => x.is_finite() && y.is_finite(),
            Self::Release | Self::Leave => true,
        }
    }
}

#[derive(Clone, Debug)]
struct Drag {
    piece: PieceId,
    start: (f32, f32),
    moved: bool,
}

/// Gesture system that translates pointer input into move commands.
#[derive(Clone, Debug)]
pub struct Gestures {
    config: GestureConfig,
    status: SessionStatus,
    busy: bool,
    drag: Option<Drag>,
}

impl Default for Gestures {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl Gestures {
    /// Creates a new gesture system with the provided geometry.
    #[must_use]
    pub const fn new(config: GestureConfig) -> Self {
        Self {
            config,
            status: SessionStatus::Idle,
            busy: false,
            drag: None,
        }
    }

    /// Reports whether a press is currently being tracked.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Consumes session events and pointer input to emit move requests.
    pub fn handle(
        &mut self,
        events: &[Event],
        input: Option<PointerInput>,
        board: &Board,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::StatusChanged { status } => {
                    self.status = *status;
                    if *status != SessionStatus::Playing {
                        self.drag = None;
                    }
                }
                Event::LevelStarted { .. } => {
                    self.busy = false;
                    self.drag = None;
                }
                Event::MoveStarted { .. } => self.busy = true,
                Event::PieceMoved { .. } | Event::MoveRejected { .. } => self.busy = false,
                _ => {}
            }
        }

        let Some(input) = input else {
            return;
        };
        if !input.is_finite() {
            debug!(?input, "ignoring non-finite pointer position");
            return;
        }

        match input {
            PointerInput::Press { x, y } => self.press(x, y, board),
            PointerInput::Motion { x, y } => self.motion(x, y, board, out),
            PointerInput::Release => self.release(out),
            PointerInput::Leave => {
                if let Some(drag) = self.drag.take() {
                    debug!(piece = %drag.piece, "drag cancelled");
                }
            }
        }
    }

    fn press(&mut self, x: f32, y: f32, board: &Board) {
        if self.status != SessionStatus::Playing || self.busy {
            return;
        }
        let Some(cell) = self.cell_at(x, y) else {
            return;
        };
        self.drag = board.piece_at(cell).map(|piece| Drag {
            piece: piece.id().clone(),
            start: (x, y),
            moved: false,
        });
    }

    fn motion(&mut self, x: f32, y: f32, board: &Board, out: &mut Vec<Command>) {
        let Some(drag) = self.drag.as_mut().filter(|drag| !drag.moved) else {
            return;
        };
        let Some(direction) = drag_direction(&self.config, drag.start, (x, y)) else {
            return;
        };
        if can_move(board, &drag.piece, direction) {
            drag.moved = true;
            out.push(Command::RequestMove {
                piece: drag.piece.clone(),
                direction: Some(direction),
            });
        }
    }

    fn release(&mut self, out: &mut Vec<Command>) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        if !drag.moved {
            out.push(Command::RequestMove {
                piece: drag.piece,
                direction: None,
            });
        }
    }

    fn cell_at(&self, x: f32, y: f32) -> Option<CellCoord> {
        if x < 0.0 || y < 0.0 || self.config.cell_size_px <= 0.0 {
            return None;
        }
        let column = (x / self.config.cell_size_px).floor();
        let row = (y / self.config.cell_size_px).floor();
        if column > i32::MAX as f32 || row > i32::MAX as f32 {
            return None;
        }
        Some(CellCoord::new(column as i32, row as i32))
    }
}

fn drag_direction(config: &GestureConfig, start: (f32, f32), now: (f32, f32)) -> Option<Direction> {
    let dx = now.0 - start.0;
    let dy = now.1 - start.1;
    if dx.abs() < config.drag_threshold_px && dy.abs() < config.drag_threshold_px {
        return None;
    }

    let direction = if dx.abs() > dy.abs() {
        if dx > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if dy > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    };
    Some(direction)
}
