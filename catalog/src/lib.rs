#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level catalog: the fixed built-in levels plus the author-made custom levels.
//!
//! Built-in levels are numbered from 1 and rebuilt on every lookup so callers
//! can mutate what they receive. Custom levels live behind a
//! [`CustomLevelStore`]; this crate only knows how to read them, mint new
//! identifiers, and turn a stored entry into a playable [`Level`].

mod builtin;

use chrono::{DateTime, Utc};
use huarongdao_core::{Board, CustomLevelId, Level, LevelKey, Piece};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default name given to freshly created custom levels.
pub const DEFAULT_CUSTOM_NAME: &str = "Untitled level";

/// Default description given to freshly created custom levels.
pub const DEFAULT_CUSTOM_DESCRIPTION: &str = "Custom level";

/// Number of random base-36 characters appended to generated identifiers.
const ID_SUFFIX_LEN: usize = 9;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Returns how many built-in levels exist.
#[must_use]
pub fn builtin_count() -> u32 {
    builtin::LEVEL_COUNT
}

/// Looks up a built-in level by its 1-based number.
///
/// The returned level is a fresh copy.
#[must_use]
pub fn builtin_level(number: u32) -> Option<Level> {
    builtin::build(number)
}

/// Enumerates every built-in level in order, paired with its number.
#[must_use]
pub fn builtin_levels() -> Vec<(u32, Level)> {
    (1..=builtin::LEVEL_COUNT)
        .filter_map(|number| builtin_level(number).map(|level| (number, level)))
        .collect()
}

/// Persisted author-made level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomLevel {
    /// Identifier unique among custom levels.
    pub id: CustomLevelId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Pieces in placement order.
    pub pieces: Vec<Piece>,
    /// Moment the level was first saved.
    pub created_at: DateTime<Utc>,
    /// Moment the level was last saved.
    pub updated_at: DateTime<Utc>,
}

impl CustomLevel {
    /// Creates an empty custom level with default name and description.
    #[must_use]
    pub fn new(id: CustomLevelId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: String::from(DEFAULT_CUSTOM_NAME),
            description: String::from(DEFAULT_CUSTOM_DESCRIPTION),
            pieces: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Board holding the level's pieces on the standard grid.
    #[must_use]
    pub fn board(&self) -> Board {
        Board::standard(self.pieces.clone())
    }

    /// Converts the entry into a playable level. Custom levels carry no
    /// reference solution.
    #[must_use]
    pub fn to_level(&self) -> Level {
        Level::new(self.name.clone(), self.description.clone(), self.board())
    }

    /// Key under which records for this level are kept.
    #[must_use]
    pub fn key(&self) -> LevelKey {
        LevelKey::Custom(self.id.clone())
    }

    /// Short listing entry for the level.
    #[must_use]
    pub fn summary(&self) -> CustomLevelSummary {
        CustomLevelSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            updated_at: self.updated_at,
            piece_count: self.pieces.len(),
        }
    }
}

/// Listing entry for a custom level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CustomLevelSummary {
    /// Identifier of the level.
    pub id: CustomLevelId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Moment the level was last saved.
    pub updated_at: DateTime<Utc>,
    /// Number of pieces on the board.
    pub piece_count: usize,
}

/// Read access to persisted custom levels.
pub trait CustomLevelStore {
    /// Returns every stored custom level in save order.
    fn custom_levels(&self) -> Vec<CustomLevel>;
}

/// Lists the stored custom levels.
#[must_use]
pub fn list_custom_levels(store: &impl CustomLevelStore) -> Vec<CustomLevelSummary> {
    store
        .custom_levels()
        .iter()
        .map(CustomLevel::summary)
        .collect()
}

/// Fetches a stored custom level by identifier.
#[must_use]
pub fn find_custom_level(store: &impl CustomLevelStore, id: &CustomLevelId) -> Option<CustomLevel> {
    store
        .custom_levels()
        .into_iter()
        .find(|level| &level.id == id)
}

/// Loads a stored custom level as a playable level.
#[must_use]
pub fn load_custom_level(store: &impl CustomLevelStore, id: &CustomLevelId) -> Option<Level> {
    let found = find_custom_level(store, id);
    if found.is_none() {
        debug!(%id, "custom level not found");
    }
    found.map(|level| level.to_level())
}

/// Resolves any level key to a playable level.
#[must_use]
pub fn resolve_level(store: &impl CustomLevelStore, key: &LevelKey) -> Option<Level> {
    match key {
        LevelKey::BuiltIn(number) => builtin_level(*number),
        LevelKey::Custom(id) => load_custom_level(store, id),
    }
}

/// Mints an identifier of the form `<unix millis>_<9 base-36 chars>`.
pub fn generate_custom_level_id<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> CustomLevelId {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();
    CustomLevelId::new(format!("{}_{suffix}", now.timestamp_millis()))
}

/// Creates an empty custom level whose identifier is not yet in the store.
pub fn new_custom_level<R: Rng + ?Sized>(
    store: &impl CustomLevelStore,
    now: DateTime<Utc>,
    rng: &mut R,
) -> CustomLevel {
    let taken: Vec<CustomLevelId> = store
        .custom_levels()
        .into_iter()
        .map(|level| level.id)
        .collect();
    let id = loop {
        let candidate = generate_custom_level_id(now, rng);
        if !taken.contains(&candidate) {
            break candidate;
        }
    };
    CustomLevel::new(id, now)
}
