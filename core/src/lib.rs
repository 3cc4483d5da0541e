#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Huarongdao puzzle engine.
//!
//! This crate defines the piece and board model together with the message
//! surface that connects adapters, the authoritative session, and pure
//! systems. Adapters submit [`Command`] values describing desired mutations,
//! the session executes those commands via its `apply` entry point, and then
//! broadcasts [`Event`] values for adapters and systems to react to. Systems
//! query immutable [`Board`] values and respond exclusively with new command
//! batches or plain return values.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of columns on the standard puzzle board.
pub const GRID_COLUMNS: u32 = 4;

/// Number of rows on the standard puzzle board.
pub const GRID_ROWS: u32 = 5;

/// Cell the protagonist's top-left corner must reach to solve the puzzle.
pub const VICTORY_CELL: CellCoord = CellCoord::new(1, 3);

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Loads a level into the session and begins play.
    StartLevel {
        /// Identity of the level, reported back on completion.
        key: LevelKey,
        /// Definition whose board is copied into the session.
        level: Level,
    },
    /// Restores the current level's initial layout and zeroes all counters.
    Reset,
    /// Suspends play; time stops and move requests are ignored.
    Pause,
    /// Resumes a paused session.
    Resume,
    /// Flips between paused and playing.
    TogglePause,
    /// Advances the session clock by the provided wall-clock delta.
    Tick {
        /// Duration of time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Updates how long a move stays in flight before it settles.
    ConfigureMotion {
        /// Time a requested move occupies before it is applied.
        settle: Duration,
    },
    /// Requests that a piece slide one cell.
    RequestMove {
        /// Identifier of the piece to move.
        piece: PieceId,
        /// Direction of travel, or `None` to let the session pick one.
        direction: Option<Direction>,
    },
    /// Immediately settles the move currently in flight, if any.
    SettleMove,
}

/// Events broadcast by the session after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a level was loaded and play began.
    LevelStarted {
        /// Identity of the loaded level.
        key: LevelKey,
        /// Number of pieces placed on the board.
        piece_count: usize,
    },
    /// Reports that a level could not be loaded because its layout is invalid.
    LevelRejected {
        /// Identity of the rejected level.
        key: LevelKey,
        /// First validation check the layout failed.
        reason: ValidationFailure,
    },
    /// Announces that the session entered a new status.
    StatusChanged {
        /// Status that became active after processing commands.
        status: SessionStatus,
    },
    /// Indicates that another whole second of play elapsed.
    ClockAdvanced {
        /// Total number of seconds played so far.
        elapsed_seconds: u32,
    },
    /// Confirms that a move was accepted and is now in flight.
    MoveStarted {
        /// Identifier of the moving piece.
        piece: PieceId,
        /// Direction the piece travels.
        direction: Direction,
        /// Origin of the piece before the move.
        from: CellCoord,
        /// Origin of the piece once the move settles.
        to: CellCoord,
    },
    /// Reports that a move request was ignored.
    MoveRejected {
        /// Identifier of the piece named in the request.
        piece: PieceId,
        /// Specific reason the request was ignored.
        reason: MoveRejection,
    },
    /// Confirms that an in-flight move settled and was applied to the board.
    PieceMoved {
        /// Identifier of the piece that moved.
        piece: PieceId,
        /// Direction the piece travelled.
        direction: Direction,
        /// Origin of the piece before the move.
        from: CellCoord,
        /// Origin of the piece after the move.
        to: CellCoord,
        /// Number of moves made in the session including this one.
        move_count: u32,
    },
    /// Announces that the protagonist reached the victory cell.
    PuzzleSolved {
        /// Result handed to the records store.
        completion: Completion,
    },
}

/// Lifecycle state of a play session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    /// No level has been loaded yet.
    Idle,
    /// A level is loaded and accepting moves.
    Playing,
    /// Play is suspended; the clock is stopped.
    Paused,
    /// The protagonist reached the victory cell.
    Solved,
}

/// Reasons a move request may be ignored by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRejection {
    /// No level is loaded.
    NotPlaying,
    /// The session is paused.
    Paused,
    /// The puzzle is already solved.
    Solved,
    /// A previous move has not settled yet.
    Busy,
    /// The board holds no piece with the requested identifier.
    UnknownPiece,
    /// The piece cannot slide in the requested direction.
    Blocked,
}

/// Result of a solved session, consumed by the records store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Completion {
    /// Level that was solved.
    pub key: LevelKey,
    /// Number of moves used.
    pub moves: u32,
    /// Number of whole seconds played.
    pub elapsed_seconds: u32,
}

/// Reasons a layout fails structural validation.
///
/// Variants are ordered the way the validator checks them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum ValidationFailure {
    /// The board holds no pieces at all.
    #[error("add at least one piece to the board")]
    EmptyBoard,
    /// The board holds no protagonist.
    #[error("the board needs a 2x2 protagonist piece")]
    MissingProtagonist,
    /// The board holds more than one protagonist.
    #[error("the board may hold only one protagonist piece")]
    DuplicateProtagonist,
    /// A piece extends beyond the grid.
    #[error("piece {piece} extends beyond the board")]
    OutOfBounds {
        /// First piece found outside the grid.
        piece: PieceId,
    },
    /// Two pieces share at least one cell.
    #[error("pieces {first} and {second} overlap")]
    Overlap {
        /// Earlier of the two overlapping pieces in board order.
        first: PieceId,
        /// Later of the two overlapping pieces in board order.
        second: PieceId,
    },
    /// Two pieces share an identifier.
    #[error("more than one piece uses the id {piece}")]
    DuplicatePieceId {
        /// Identifier used more than once.
        piece: PieceId,
    },
}

/// Cardinal directions a piece may slide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in canonical order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Preference applied when a piece is tapped without a direction.
    pub const TAP_PREFERENCE: [Direction; 4] = [
        Direction::Down,
        Direction::Up,
        Direction::Left,
        Direction::Right,
    ];

    /// Column and row delta of a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Resolves a single-step delta into a direction.
    ///
    /// Diagonal, zero, and multi-cell deltas have no direction.
    #[must_use]
    pub const fn from_offset(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Self::Up),
            (0, 1) => Some(Self::Down),
            (-1, 0) => Some(Self::Left),
            (1, 0) => Some(Self::Right),
            _ => None,
        }
    }

    /// Lowercase name used in logs and text interfaces.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so that layouts read from untrusted sources can
/// describe, and be rejected for, positions left of or above the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Returns the coordinate shifted by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            column: self.column.saturating_add(dx),
            row: self.row.saturating_add(dy),
        }
    }

    /// Returns the neighbouring coordinate in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        self.offset(dx, dy)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Reports whether the rectangle lies entirely within a grid of the
    /// provided dimensions.
    #[must_use]
    pub fn fits_within(&self, columns: u32, rows: u32) -> bool {
        let (left, top, right, bottom) = self.edges();
        left >= 0 && top >= 0 && right <= i64::from(columns) && bottom <= i64::from(rows)
    }

    /// Reports whether two rectangles share any area.
    ///
    /// Rectangles that only touch along an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &CellRect) -> bool {
        let (left, top, right, bottom) = self.edges();
        let (other_left, other_top, other_right, other_bottom) = other.edges();
        left < other_right && right > other_left && top < other_bottom && bottom > other_top
    }

    /// Reports whether the rectangle covers the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let (left, top, right, bottom) = self.edges();
        let column = i64::from(cell.column());
        let row = i64::from(cell.row());
        column >= left && column < right && row >= top && row < bottom
    }

    /// Returns the rectangle moved one step in the provided direction.
    #[must_use]
    pub const fn stepped(self, direction: Direction) -> Self {
        Self {
            origin: self.origin.step(direction),
            size: self.size,
        }
    }

    fn edges(&self) -> (i64, i64, i64, i64) {
        let left = i64::from(self.origin.column());
        let top = i64::from(self.origin.row());
        (
            left,
            top,
            left + i64::from(self.size.width()),
            top + i64::from(self.size.height()),
        )
    }
}

/// Types of pieces that populate the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    /// The 2x2 piece that must reach the victory cell.
    #[serde(rename = "caocao")]
    Protagonist,
    /// A 1x2 upright general.
    #[serde(rename = "general_v")]
    VerticalGeneral,
    /// A 2x1 lying general.
    #[serde(rename = "general_h")]
    HorizontalGeneral,
    /// A 1x1 soldier.
    #[serde(rename = "soldier")]
    Soldier,
}

impl PieceKind {
    /// Every piece kind in palette order.
    pub const ALL: [PieceKind; 4] = [
        PieceKind::Protagonist,
        PieceKind::VerticalGeneral,
        PieceKind::HorizontalGeneral,
        PieceKind::Soldier,
    ];

    /// Reports the footprint occupied by a piece of this kind.
    #[must_use]
    pub const fn footprint(self) -> CellRectSize {
        match self {
            Self::Protagonist => CellRectSize::new(2, 2),
            Self::VerticalGeneral => CellRectSize::new(1, 2),
            Self::HorizontalGeneral => CellRectSize::new(2, 1),
            Self::Soldier => CellRectSize::new(1, 1),
        }
    }

    /// Colour used when a piece carries no explicit colour.
    #[must_use]
    pub const fn default_color(self) -> PieceColor {
        match self {
            Self::Protagonist => PieceColor::from_rgb(0xe7, 0x4c, 0x3c),
            Self::VerticalGeneral => PieceColor::from_rgb(0xf3, 0x9c, 0x12),
            Self::HorizontalGeneral => PieceColor::from_rgb(0x27, 0xae, 0x60),
            Self::Soldier => PieceColor::from_rgb(0x34, 0x98, 0xdb),
        }
    }

    /// Label used when a piece carries no explicit label.
    #[must_use]
    pub const fn default_label(self) -> &'static str {
        match self {
            Self::Protagonist => "曹操",
            Self::VerticalGeneral => "竖将",
            Self::HorizontalGeneral => "横将",
            Self::Soldier => "兵卒",
        }
    }

    /// Stable name used by the persisted and exported layout format.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Protagonist => "caocao",
            Self::VerticalGeneral => "general_v",
            Self::HorizontalGeneral => "general_h",
            Self::Soldier => "soldier",
        }
    }

    /// Parses a kind from its wire name or a few friendly aliases.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "caocao" | "protagonist" | "c" => Some(Self::Protagonist),
            "general_v" | "vertical" | "v" => Some(Self::VerticalGeneral),
            "general_h" | "horizontal" | "h" => Some(Self::HorizontalGeneral),
            "soldier" | "s" => Some(Self::Soldier),
            _ => None,
        }
    }
}

/// Display colour carried through to renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PieceColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl PieceColor {
    /// Creates a new piece color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Parses a `#rrggbb` hex string.
    #[must_use]
    pub fn from_hex(value: &str) -> Option<Self> {
        let digits = value.trim().strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Formats the colour as a `#rrggbb` hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Identifier of a piece, unique within a board.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(String);

impl PieceId {
    /// Creates a new piece identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Retrieves the textual representation of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PieceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A rectangular piece placed on the board.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PieceRecord", into = "PieceRecord")]
pub struct Piece {
    id: PieceId,
    kind: PieceKind,
    origin: CellCoord,
    label: Option<String>,
    color: Option<PieceColor>,
}

impl Piece {
    /// Creates a piece of the provided kind anchored at `origin`.
    #[must_use]
    pub fn new(id: impl Into<PieceId>, kind: PieceKind, origin: CellCoord) -> Self {
        Self {
            id: id.into(),
            kind,
            origin,
            label: None,
            color: None,
        }
    }

    /// Attaches a display label to the piece.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Attaches a display colour to the piece.
    #[must_use]
    pub fn with_color(mut self, color: PieceColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Identifier of the piece.
    #[must_use]
    pub fn id(&self) -> &PieceId {
        &self.id
    }

    /// Kind of the piece.
    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Upper-left cell of the piece.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Region of cells covered by the piece.
    #[must_use]
    pub const fn rect(&self) -> CellRect {
        CellRect::from_origin_and_size(self.origin, self.kind.footprint())
    }

    /// Label to display, falling back to the kind's default.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.kind.default_label())
    }

    /// Colour to display, falling back to the kind's default.
    #[must_use]
    pub fn color(&self) -> PieceColor {
        self.color.unwrap_or(self.kind.default_color())
    }

    /// Returns a copy of the piece anchored at a new origin.
    #[must_use]
    pub fn relocated(&self, origin: CellCoord) -> Self {
        Self {
            origin,
            ..self.clone()
        }
    }

    /// Returns a copy of the piece with a different identifier.
    #[must_use]
    pub fn renamed(&self, id: PieceId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }
}

/// Flat persisted representation of a [`Piece`].
///
/// This is the shape used in storage and in exported layout files:
/// `{id, type, x, y, width, height}` plus optional display attributes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceRecord {
    /// Identifier of the piece.
    pub id: PieceId,
    /// Kind of the piece.
    #[serde(rename = "type")]
    pub kind: PieceKind,
    /// Column of the upper-left cell.
    pub x: i32,
    /// Row of the upper-left cell.
    pub y: i32,
    /// Width in cells; must match the kind's footprint.
    pub width: u32,
    /// Height in cells; must match the kind's footprint.
    pub height: u32,
    /// Optional `#rrggbb` display colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Optional display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Reasons a [`PieceRecord`] cannot be turned into a [`Piece`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PieceRecordError {
    /// The recorded dimensions disagree with the kind's footprint.
    #[error(
        "piece {id} is {width}x{height} but a {} is {expected_width}x{expected_height}",
        .kind.wire_name()
    )]
    FootprintMismatch {
        /// Identifier of the offending piece.
        id: PieceId,
        /// Kind named by the record.
        kind: PieceKind,
        /// Recorded width.
        width: u32,
        /// Recorded height.
        height: u32,
        /// Width implied by the kind.
        expected_width: u32,
        /// Height implied by the kind.
        expected_height: u32,
    },
    /// The recorded colour is not a `#rrggbb` string.
    #[error("piece {id} has an unreadable colour '{color}'")]
    InvalidColor {
        /// Identifier of the offending piece.
        id: PieceId,
        /// Colour text found in the record.
        color: String,
    },
}

impl TryFrom<PieceRecord> for Piece {
    type Error = PieceRecordError;

    fn try_from(record: PieceRecord) -> Result<Self, Self::Error> {
        let footprint = record.kind.footprint();
        if footprint.width() != record.width || footprint.height() != record.height {
            return Err(PieceRecordError::FootprintMismatch {
                id: record.id,
                kind: record.kind,
                width: record.width,
                height: record.height,
                expected_width: footprint.width(),
                expected_height: footprint.height(),
            });
        }

        let color = match record.color {
            Some(text) => match PieceColor::from_hex(&text) {
                Some(color) => Some(color),
                None => {
                    return Err(PieceRecordError::InvalidColor {
                        id: record.id,
                        color: text,
                    })
                }
            },
            None => None,
        };

        Ok(Self {
            id: record.id,
            kind: record.kind,
            origin: CellCoord::new(record.x, record.y),
            label: record.name,
            color,
        })
    }
}

impl From<Piece> for PieceRecord {
    fn from(piece: Piece) -> Self {
        let footprint = piece.kind.footprint();
        Self {
            x: piece.origin.column(),
            y: piece.origin.row(),
            width: footprint.width(),
            height: footprint.height(),
            color: piece.color.map(|color| color.to_hex()),
            name: piece.label,
            id: piece.id,
            kind: piece.kind,
        }
    }
}

/// Grid dimensions plus the pieces placed on it.
///
/// A board is a plain value: cloning it yields an independent copy, which is
/// how levels stay immutable while sessions and editors mutate their own.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    columns: u32,
    rows: u32,
    pieces: Vec<Piece>,
}

impl Board {
    /// Creates a board with explicit dimensions.
    #[must_use]
    pub fn new(columns: u32, rows: u32, pieces: Vec<Piece>) -> Self {
        Self {
            columns,
            rows,
            pieces,
        }
    }

    /// Creates a standard 4x5 board holding the provided pieces.
    #[must_use]
    pub fn standard(pieces: Vec<Piece>) -> Self {
        Self::new(GRID_COLUMNS, GRID_ROWS, pieces)
    }

    /// Creates an empty standard board.
    #[must_use]
    pub fn empty() -> Self {
        Self::standard(Vec::new())
    }

    /// Number of columns on the board.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows on the board.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Pieces in stored order.
    #[must_use]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Number of pieces on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Reports whether the board holds no pieces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Looks up a piece by identifier.
    #[must_use]
    pub fn piece(&self, id: &PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.id() == id)
    }

    /// Returns the first piece, in stored order, covering the provided cell.
    #[must_use]
    pub fn piece_at(&self, cell: CellCoord) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.rect().contains(cell))
    }

    /// Reports whether a rectangle lies entirely within the board.
    #[must_use]
    pub fn in_bounds(&self, rect: &CellRect) -> bool {
        rect.fits_within(self.columns, self.rows)
    }

    /// Reports whether a rectangle is in bounds and clear of every piece
    /// except the one named by `ignoring`.
    #[must_use]
    pub fn is_region_free(&self, rect: &CellRect, ignoring: Option<&PieceId>) -> bool {
        self.in_bounds(rect)
            && self
                .pieces
                .iter()
                .filter(|piece| Some(piece.id()) != ignoring)
                .all(|piece| !piece.rect().overlaps(rect))
    }

    /// Iterator over every protagonist on the board.
    pub fn protagonists(&self) -> impl Iterator<Item = &Piece> {
        self.pieces
            .iter()
            .filter(|piece| piece.kind() == PieceKind::Protagonist)
    }

    /// Appends a piece without checking placement rules.
    pub fn push(&mut self, piece: Piece) {
        self.pieces.push(piece);
    }

    /// Removes the piece with the provided identifier.
    pub fn remove(&mut self, id: &PieceId) -> Option<Piece> {
        let index = self.pieces.iter().position(|piece| piece.id() == id)?;
        Some(self.pieces.remove(index))
    }

    /// Moves the named piece to a new origin without checking placement rules.
    ///
    /// Returns `false` when no piece carries the identifier.
    pub fn relocate(&mut self, id: &PieceId, origin: CellCoord) -> bool {
        match self.pieces.iter_mut().find(|piece| piece.id() == id) {
            Some(piece) => {
                piece.origin = origin;
                true
            }
            None => false,
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

/// Identifier of a user-authored level.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomLevelId(String);

impl CustomLevelId {
    /// Wraps an existing identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Retrieves the textual representation of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomLevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a playable level.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelKey {
    /// A numbered level from the built-in table.
    BuiltIn(u32),
    /// A user-authored level.
    Custom(CustomLevelId),
}

impl LevelKey {
    /// Key under which the level's best record is stored.
    #[must_use]
    pub fn record_key(&self) -> String {
        match self {
            Self::BuiltIn(number) => format!("level{number}"),
            Self::Custom(id) => format!("custom_{id}"),
        }
    }
}

impl fmt::Display for LevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.record_key())
    }
}

/// A single step of a reference solution.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SolutionStep {
    /// Piece to move.
    pub piece: PieceId,
    /// Direction the piece slides.
    pub direction: Direction,
}

impl SolutionStep {
    /// Creates a step from a piece and a single-cell delta.
    ///
    /// Returns `None` when the delta is not one cardinal step.
    #[must_use]
    pub fn from_offset(piece: impl Into<PieceId>, dx: i32, dy: i32) -> Option<Self> {
        Some(Self {
            piece: piece.into(),
            direction: Direction::from_offset(dx, dy)?,
        })
    }
}

/// Shipped reference solution for a built-in level.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Solution {
    steps: Vec<SolutionStep>,
    min_moves: u32,
}

impl Solution {
    /// Creates a solution from its steps and advertised move count.
    #[must_use]
    pub fn new(steps: Vec<SolutionStep>, min_moves: u32) -> Self {
        Self { steps, min_moves }
    }

    /// Steps in the order they are played.
    #[must_use]
    pub fn steps(&self) -> &[SolutionStep] {
        &self.steps
    }

    /// Advertised number of moves.
    #[must_use]
    pub const fn min_moves(&self) -> u32 {
        self.min_moves
    }
}

/// Immutable definition of a playable layout.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Level {
    name: String,
    description: String,
    board: Board,
    solution: Option<Solution>,
}

impl Level {
    /// Creates a level without a reference solution.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, board: Board) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            board,
            solution: None,
        }
    }

    /// Attaches a reference solution.
    #[must_use]
    pub fn with_solution(mut self, solution: Solution) -> Self {
        self.solution = Some(solution);
        self
    }

    /// Human-readable name of the level.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short description of the level.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Initial layout of the level.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Reference solution, present only for built-in levels.
    #[must_use]
    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }
}

/// Formats a number of seconds as zero-padded `MM:SS`.
///
/// Minutes are not wrapped into hours.
#[must_use]
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    fn soldier(id: &str, column: i32, row: i32) -> Piece {
        Piece::new(id, PieceKind::Soldier, CellCoord::new(column, row))
    }

    #[test]
    fn edge_touching_rectangles_do_not_overlap() {
        let left = CellRect::from_origin_and_size(CellCoord::new(0, 0), CellRectSize::new(2, 2));
        let right = CellRect::from_origin_and_size(CellCoord::new(2, 0), CellRectSize::new(1, 2));
        let below = CellRect::from_origin_and_size(CellCoord::new(0, 2), CellRectSize::new(2, 1));
        assert!(!left.overlaps(&right));
        assert!(!left.overlaps(&below));
    }

    #[test]
    fn sharing_a_cell_is_overlap() {
        let first = CellRect::from_origin_and_size(CellCoord::new(1, 1), CellRectSize::new(2, 2));
        let second = CellRect::from_origin_and_size(CellCoord::new(2, 2), CellRectSize::new(1, 1));
        assert!(first.overlaps(&second));
        assert!(second.overlaps(&first));
    }

    #[test]
    fn fits_within_rejects_every_edge() {
        let inside =
            CellRect::from_origin_and_size(CellCoord::new(2, 3), CellRectSize::new(2, 2));
        assert!(inside.fits_within(GRID_COLUMNS, GRID_ROWS));

        let too_wide =
            CellRect::from_origin_and_size(CellCoord::new(3, 4), CellRectSize::new(2, 1));
        assert!(!too_wide.fits_within(GRID_COLUMNS, GRID_ROWS));

        let negative =
            CellRect::from_origin_and_size(CellCoord::new(-1, 0), CellRectSize::new(1, 1));
        assert!(!negative.fits_within(GRID_COLUMNS, GRID_ROWS));

        let too_tall =
            CellRect::from_origin_and_size(CellCoord::new(0, 4), CellRectSize::new(1, 2));
        assert!(!too_tall.fits_within(GRID_COLUMNS, GRID_ROWS));
    }

    #[test]
    fn piece_at_finds_covering_piece() {
        let board = Board::standard(vec![
            Piece::new("C", PieceKind::Protagonist, CellCoord::new(1, 0)),
            soldier("S1", 0, 0),
        ]);

        assert_eq!(
            board.piece_at(CellCoord::new(2, 1)).map(Piece::id),
            Some(&PieceId::from("C"))
        );
        assert_eq!(
            board.piece_at(CellCoord::new(0, 0)).map(Piece::id),
            Some(&PieceId::from("S1"))
        );
        assert!(board.piece_at(CellCoord::new(3, 4)).is_none());
    }

    #[test]
    fn region_free_ignores_named_piece() {
        let board = Board::standard(vec![soldier("S1", 0, 0), soldier("S2", 1, 0)]);
        let rect = board.piece(&PieceId::from("S1")).expect("piece").rect();

        assert!(!board.is_region_free(&rect, None));
        assert!(board.is_region_free(&rect, Some(&PieceId::from("S1"))));
        assert!(!board.is_region_free(&rect.stepped(Direction::Right), Some(&PieceId::from("S1"))));
        assert!(!board.is_region_free(&rect.stepped(Direction::Up), Some(&PieceId::from("S1"))));
    }

    #[test]
    fn direction_offsets_round_trip() {
        for direction in Direction::ALL {
            let (dx, dy) = direction.offset();
            assert_eq!(Direction::from_offset(dx, dy), Some(direction));
        }
        assert_eq!(Direction::from_offset(1, 1), None);
        assert_eq!(Direction::from_offset(0, 2), None);
        assert_eq!(Direction::from_offset(0, 0), None);
    }

    #[test]
    fn record_keys_follow_storage_convention() {
        assert_eq!(LevelKey::BuiltIn(2).record_key(), "level2");
        assert_eq!(
            LevelKey::Custom(CustomLevelId::new("1700000000000_abc")).record_key(),
            "custom_1700000000000_abc"
        );
    }

    #[test]
    fn format_time_pads_minutes_and_seconds() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(59 * 60 + 59), "59:59");
    }

    #[test]
    fn piece_serializes_in_layout_file_shape() {
        let piece = Piece::new("G", PieceKind::VerticalGeneral, CellCoord::new(0, 2));
        let json = serde_json::to_value(&piece).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "id": "G",
                "type": "general_v",
                "x": 0,
                "y": 2,
                "width": 1,
                "height": 2,
            })
        );
    }

    #[test]
    fn piece_record_rejects_footprint_mismatch() {
        let json = r#"{"id":"C","type":"caocao","x":1,"y":0,"width":1,"height":2}"#;
        let error = serde_json::from_str::<Piece>(json).expect_err("footprint must match kind");
        assert!(error.to_string().contains("caocao"));
    }

    #[test]
    fn piece_record_carries_display_attributes() {
        let json = concat!(
            r#"{"id":"S1","type":"soldier","x":0,"y":4,"width":1,"height":1,"#,
            r##""color":"#3498db","name":"兵"}"##
        );
        let piece: Piece = serde_json::from_str(json).expect("valid record");
        assert_eq!(piece.label(), "兵");
        assert_eq!(piece.color(), PieceColor::from_rgb(0x34, 0x98, 0xdb));
    }

    #[test]
    fn direction_round_trips_through_bincode() {
        assert_round_trip(&Direction::Left);
    }

    #[test]
    fn validation_failure_round_trips_through_bincode() {
        assert_round_trip(&ValidationFailure::Overlap {
            first: PieceId::from("S1"),
            second: PieceId::from("S2"),
        });
    }

    #[test]
    fn level_key_round_trips_through_bincode() {
        assert_round_trip(&LevelKey::Custom(CustomLevelId::new("abc")));
    }

    #[test]
    fn cell_rect_round_trips_through_bincode() {
        let rect = CellRect::from_origin_and_size(CellCoord::new(1, 3), CellRectSize::new(2, 2));
        assert_round_trip(&rect);
    }
}
