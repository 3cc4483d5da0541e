#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level editor that lets authors place and remove pieces on a scratch board.

use huarongdao_catalog::CustomLevel;
use huarongdao_core::{
    Board, CellCoord, CellRect, CustomLevelId, Level, Piece, PieceId, PieceKind,
    ValidationFailure,
};
use huarongdao_system_validation::validate_layout;
use thiserror::Error;
use tracing::debug;

const PROTAGONIST_ID: &str = "C";

/// Declarative placement preview describing a potential piece placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementPreview {
    /// Kind of piece proposed for placement.
    pub kind: PieceKind,
    /// Origin cell anchoring the proposed footprint.
    pub origin: CellCoord,
    /// Region of cells that would be occupied by the piece if placed.
    pub region: CellRect,
    /// First reason the placement would be refused, if any.
    pub rejection: Option<PlacementRejection>,
}

impl PlacementPreview {
    /// Indicates whether the preview represents a valid placement location.
    #[must_use]
    pub const fn placeable(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Reasons a placement is refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum PlacementRejection {
    /// The footprint would extend past the grid.
    #[error("the piece would not fit inside the board")]
    OutOfBounds,
    /// The footprint covers a cell that is already occupied.
    #[error("the target cells are already occupied")]
    Occupied,
    /// The board already holds a protagonist.
    #[error("the board already has a protagonist")]
    SecondProtagonist,
}

/// Result of clicking a cell in the editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// A new piece was placed with the returned identifier.
    Placed(PieceId),
    /// The piece occupying the cell was removed.
    Removed(Piece),
    /// Nothing changed.
    Rejected(PlacementRejection),
}

/// Scratch board owned by the level editor.
#[derive(Clone, Debug)]
pub struct Editor {
    board: Board,
    editing: Option<CustomLevelId>,
    next_index: u32,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Creates an editor holding an empty standard board.
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: Board::empty(),
            editing: None,
            next_index: 1,
        }
    }

    /// Opens a stored custom level for editing.
    #[must_use]
    pub fn from_custom(level: &CustomLevel) -> Self {
        Self {
            board: level.board(),
            editing: Some(level.id.clone()),
            next_index: 1,
        }
    }

    /// Board being edited.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Identifier of the stored level being edited, if it came from storage.
    #[must_use]
    pub fn editing(&self) -> Option<&CustomLevelId> {
        self.editing.as_ref()
    }

    /// Describes whether a piece of `kind` could be placed at `cell`.
    #[must_use]
    pub fn preview(&self, kind: PieceKind, cell: CellCoord) -> PlacementPreview {
        let region = CellRect::from_origin_and_size(cell, kind.footprint());
        let rejection = if kind == PieceKind::Protagonist
            && self.board.protagonists().next().is_some()
        {
            Some(PlacementRejection::SecondProtagonist)
        } else if !self.board.in_bounds(&region) {
            Some(PlacementRejection::OutOfBounds)
        } else if !self.board.is_region_free(&region, None) {
            Some(PlacementRejection::Occupied)
        } else {
            None
        };

        PlacementPreview {
            kind,
            origin: cell,
            region,
            rejection,
        }
    }

    /// Places a piece with its top-left corner at `cell`.
    ///
    /// Returns `false` and leaves the board unchanged when the footprint
    /// leaves the grid, overlaps another piece, or would add a second
    /// protagonist.
    pub fn place_piece(&mut self, kind: PieceKind, cell: CellCoord) -> bool {
        self.try_place(kind, cell).is_ok()
    }

    fn try_place(
        &mut self,
        kind: PieceKind,
        cell: CellCoord,
    ) -> Result<PieceId, PlacementRejection> {
        let preview = self.preview(kind, cell);
        if let Some(rejection) = preview.rejection {
            debug!(?kind, %cell, %rejection, "placement rejected");
            return Err(rejection);
        }

        let id = self.fresh_id(kind);
        self.board.push(Piece::new(id.clone(), kind, cell));
        Ok(id)
    }

    /// Removes and returns the piece covering `cell`, if any.
    pub fn remove_piece_at(&mut self, cell: CellCoord) -> Option<Piece> {
        let id = self.board.piece_at(cell)?.id().clone();
        self.board.remove(&id)
    }

    /// Removes the piece under `cell` or, when the cell is empty, places a
    /// piece of `kind` there.
    pub fn toggle_at(&mut self, cell: CellCoord, kind: PieceKind) -> EditOutcome {
        if let Some(removed) = self.remove_piece_at(cell) {
            return EditOutcome::Removed(removed);
        }
        match self.try_place(kind, cell) {
            Ok(id) => EditOutcome::Placed(id),
            Err(rejection) => EditOutcome::Rejected(rejection),
        }
    }

    /// Removes every piece from the board.
    pub fn clear(&mut self) {
        self.board = Board::empty();
        self.next_index = 1;
    }

    /// Runs the layout validator over the current board.
    pub fn validate(&self) -> Result<(), ValidationFailure> {
        validate_layout(&self.board)
    }

    /// Produces a playable level from the current board once it validates.
    pub fn to_level(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Level, ValidationFailure> {
        self.validate()?;
        Ok(Level::new(name, description, self.board.clone()))
    }

    fn fresh_id(&mut self, kind: PieceKind) -> PieceId {
        let protagonist = PieceId::from(PROTAGONIST_ID);
        if kind == PieceKind::Protagonist && self.board.piece(&protagonist).is_none() {
            return protagonist;
        }

        loop {
            let candidate = PieceId::new(format!("P{}", self.next_index));
            self.next_index = self.next_index.saturating_add(1);
            if self.board.piece(&candidate).is_none() {
                return candidate;
            }
        }
    }
}
