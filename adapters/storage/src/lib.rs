#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Persistence for best records and author-made levels.
//!
//! Values are stored as JSON strings under two fixed keys in a pluggable
//! [`KeyValueStore`]. Unreadable values are logged, discarded and replaced by
//! their defaults so a damaged save never blocks play.

mod backend;

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use huarongdao_catalog::{CustomLevel, CustomLevelStore};
use huarongdao_core::{format_time, Completion, CustomLevelId, LevelKey, Piece};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use backend::{FileStore, KeyValueStore, MemoryStore};

/// Key under which best records are persisted.
pub const RECORDS_KEY: &str = "huarongdao_records";

/// Key under which custom levels are persisted.
pub const CUSTOM_LEVELS_KEY: &str = "huarongdao_custom_levels";

/// Failures surfaced by the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not read or write a value.
    #[error("storage I/O failed for {key}")]
    Io {
        /// Logical key being accessed.
        key: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// A value could not be encoded for storage.
    #[error("could not encode {key}")]
    Encode {
        /// Logical key being written.
        key: String,
        /// Underlying serializer failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Best result achieved on one level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestRecord {
    /// Fewest moves used to solve the level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_moves: Option<u32>,
    /// Shortest time in whole seconds taken to solve the level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_time: Option<u32>,
}

impl BestRecord {
    /// Folds a new result into the record, keeping the smaller value of each
    /// field independently. Returns whether anything improved.
    pub fn improve(&mut self, moves: u32, seconds: u32) -> bool {
        let mut improved = false;
        if self.best_moves.map_or(true, |best| moves < best) {
            self.best_moves = Some(moves);
            improved = true;
        }
        if self.best_time.map_or(true, |best| seconds < best) {
            self.best_time = Some(seconds);
            improved = true;
        }
        improved
    }
}

impl fmt::Display for BestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.best_moves {
            Some(moves) => write!(f, "{moves} moves")?,
            None => f.write_str("--")?,
        }
        f.write_str(" / ")?;
        match self.best_time {
            Some(seconds) => f.write_str(&format_time(seconds)),
            None => f.write_str("--"),
        }
    }
}

/// Author-supplied content of a custom level about to be saved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomLevelDraft {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Pieces in placement order.
    pub pieces: Vec<Piece>,
}

/// Persistence facade over a key-value backend.
#[derive(Clone, Debug)]
pub struct Storage<B> {
    backend: B,
}

impl<B: KeyValueStore> Storage<B> {
    /// Wraps the provided backend.
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Read-only access to the backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Every stored best record keyed by record key.
    pub fn records(&self) -> Result<BTreeMap<String, BestRecord>, StorageError> {
        self.load(RECORDS_KEY)
    }

    /// Best record of one level, if it was ever solved.
    pub fn record(&self, key: &LevelKey) -> Result<Option<BestRecord>, StorageError> {
        Ok(self.records()?.remove(&key.record_key()))
    }

    /// Folds a result into the level's best record.
    ///
    /// Each field is replaced independently when the new value is strictly
    /// smaller or no value exists yet. Storage is written only when something
    /// improved; the return value reports whether it did.
    pub fn update_record(
        &mut self,
        key: &LevelKey,
        moves: u32,
        seconds: u32,
    ) -> Result<bool, StorageError> {
        let mut records = self.records()?;
        let record_key = key.record_key();
        let improved = records
            .entry(record_key.clone())
            .or_default()
            .improve(moves, seconds);

        if improved {
            self.store(RECORDS_KEY, &records)?;
            info!(key = %record_key, moves, seconds, "best record improved");
        }
        Ok(improved)
    }

    /// Folds a finished session into the records.
    pub fn record_completion(&mut self, completion: &Completion) -> Result<bool, StorageError> {
        self.update_record(&completion.key, completion.moves, completion.elapsed_seconds)
    }

    /// Forgets every best record.
    pub fn clear_records(&mut self) -> Result<(), StorageError> {
        self.backend.remove(RECORDS_KEY)
    }

    /// Every stored custom level in save order.
    ///
    /// Rows that no longer decode are skipped one by one; the rest of the
    /// table is kept.
    pub fn load_custom_levels(&self) -> Result<Vec<CustomLevel>, StorageError> {
        let rows: Vec<Value> = self.load(CUSTOM_LEVELS_KEY)?;
        let levels = rows
            .into_iter()
            .enumerate()
            .filter_map(|(index, row)| match serde_json::from_value(row) {
                Ok(level) => Some(level),
                Err(error) => {
                    warn!(index, %error, "discarding corrupt custom level");
                    None
                }
            })
            .collect();
        Ok(levels)
    }

    /// Inserts or replaces the custom level with the given identifier.
    ///
    /// `updated_at` is set to `now`; `created_at` is preserved for existing
    /// entries and set to `now` for new ones.
    pub fn save_custom_level(
        &mut self,
        id: &CustomLevelId,
        draft: CustomLevelDraft,
        now: DateTime<Utc>,
    ) -> Result<CustomLevel, StorageError> {
        let mut levels = self.load_custom_levels()?;
        let existing = levels.iter().position(|level| &level.id == id);
        let created_at = existing
            .and_then(|index| levels.get(index))
            .map_or(now, |level| level.created_at);

        let saved = CustomLevel {
            id: id.clone(),
            name: draft.name,
            description: draft.description,
            pieces: draft.pieces,
            created_at,
            updated_at: now,
        };
        match existing {
            Some(index) => levels[index] = saved.clone(),
            None => levels.push(saved.clone()),
        }

        self.store(CUSTOM_LEVELS_KEY, &levels)?;
        info!(%id, pieces = saved.pieces.len(), "custom level saved");
        Ok(saved)
    }

    /// Deletes a custom level together with its best record.
    ///
    /// Returns whether a level with that identifier existed.
    pub fn delete_custom_level(&mut self, id: &CustomLevelId) -> Result<bool, StorageError> {
        let mut levels = self.load_custom_levels()?;
        let before = levels.len();
        levels.retain(|level| &level.id != id);
        if levels.len() == before {
            return Ok(false);
        }
        self.store(CUSTOM_LEVELS_KEY, &levels)?;

        let mut records = self.records()?;
        if records
            .remove(&LevelKey::Custom(id.clone()).record_key())
            .is_some()
        {
            self.store(RECORDS_KEY, &records)?;
        }
        info!(%id, "custom level deleted");
        Ok(true)
    }

    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StorageError> {
        let Some(raw) = self.backend.get(key)? else {
            debug!(key, "no stored value, using default");
            return Ok(T::default());
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(error) => {
                warn!(key, %error, "discarding corrupt stored value");
                Ok(T::default())
            }
        }
    }

    fn store<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_owned(),
            source,
        })?;
        self.backend.set(key, &encoded)
    }
}

impl<B: KeyValueStore> CustomLevelStore for Storage<B> {
    fn custom_levels(&self) -> Vec<CustomLevel> {
        self.load_custom_levels().unwrap_or_else(|error| {
            warn!(%error, "custom levels unavailable");
            Vec::new()
        })
    }
}
