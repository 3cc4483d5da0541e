use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use huarongdao_catalog::{CustomLevel, DEFAULT_CUSTOM_DESCRIPTION, DEFAULT_CUSTOM_NAME};
use huarongdao_core::{Piece, PieceKind, PieceRecord, PieceRecordError};
use huarongdao_storage::CustomLevelDraft;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

const SHARE_DOMAIN: &str = "hrd";
const SHARE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded share payload.
pub(crate) const SHARE_HEADER: &str = "hrd:v1";
/// Delimiter used to separate the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Exported layout file.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LayoutFile {
    /// Identifier the layout had where it was exported.
    pub(crate) id: String,
    /// Display name.
    pub(crate) name: String,
    /// Free-form description.
    pub(crate) description: String,
    /// Pieces in placement order.
    pub(crate) pieces: Vec<PieceRecord>,
    /// Moment of export.
    pub(crate) exported_at: DateTime<Utc>,
}

impl LayoutFile {
    /// Captures a stored custom level for export.
    pub(crate) fn export(level: &CustomLevel, now: DateTime<Utc>) -> Self {
        Self {
            id: level.id.to_string(),
            name: level.name.clone(),
            description: level.description.clone(),
            pieces: level.pieces.iter().cloned().map(PieceRecord::from).collect(),
            exported_at: now,
        }
    }

    /// Pretty JSON form written to export files.
    pub(crate) fn to_json(&self) -> Result<String, LayoutTransferError> {
        serde_json::to_string_pretty(self).map_err(LayoutTransferError::Encode)
    }

    /// Encodes the layout into a single-line string suitable for clipboard transfer.
    pub(crate) fn share_code(&self) -> Result<String, LayoutTransferError> {
        let json = serde_json::to_vec(self).map_err(LayoutTransferError::Encode)?;
        Ok(format!("{SHARE_HEADER}:{}", STANDARD_NO_PAD.encode(json)))
    }
}

/// Layout recovered from an export file or share code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ImportedLayout {
    /// Identifier the layout carried, if any.
    pub(crate) source_id: Option<String>,
    /// Display name.
    pub(crate) name: String,
    /// Free-form description.
    pub(crate) description: String,
    /// Pieces in placement order.
    pub(crate) pieces: Vec<Piece>,
    /// Moment of import.
    pub(crate) imported_at: DateTime<Utc>,
}

impl ImportedLayout {
    /// Content to hand to the storage layer.
    pub(crate) fn into_draft(self) -> CustomLevelDraft {
        CustomLevelDraft {
            name: self.name,
            description: self.description,
            pieces: self.pieces,
        }
    }
}

/// Errors that can occur while reading or writing transferred layouts.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided text was empty or contained only whitespace.
    #[error("layout payload was empty")]
    EmptyPayload,
    /// The text is neither JSON nor a share code.
    #[error("layout is not valid JSON")]
    NotJson(#[source] serde_json::Error),
    /// The payload has no `pieces` field.
    #[error("layout has no pieces list")]
    MissingPieces,
    /// The `pieces` field is not a list.
    #[error("layout pieces field is not a list")]
    PiecesNotList,
    /// A piece names a type outside the closed set.
    #[error("piece #{index} has unknown type '{kind}'")]
    UnknownPieceType {
        /// Zero-based position of the piece.
        index: usize,
        /// Type text found in the payload.
        kind: String,
    },
    /// A piece lacks required fields or has mistyped ones.
    #[error("piece #{index} is malformed")]
    InvalidPiece {
        /// Zero-based position of the piece.
        index: usize,
        /// Underlying decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// A piece's dimensions or colour disagree with its type.
    #[error(transparent)]
    InconsistentPiece(#[from] PieceRecordError),
    /// The share code did not include a version segment.
    #[error("share code is missing the version")]
    MissingVersion,
    /// The share code did not include the payload segment.
    #[error("share code is missing the payload")]
    MissingPayload,
    /// The share code used an unexpected prefix segment.
    #[error("share code prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The share code used an unsupported version identifier.
    #[error("share code version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode share code payload")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The layout could not be serialised.
    #[error("could not encode layout")]
    Encode(#[source] serde_json::Error),
}

/// Parses an export file or a share code, whichever `text` holds.
///
/// Nothing is persisted here, so a rejected payload leaves no partial state.
pub(crate) fn import_layout(
    text: &str,
    now: DateTime<Utc>,
) -> Result<ImportedLayout, LayoutTransferError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(LayoutTransferError::EmptyPayload);
    }
    if trimmed.starts_with(SHARE_DOMAIN) && trimmed.contains(FIELD_DELIMITER) {
        let bytes = decode_share(trimmed)?;
        let value = serde_json::from_slice(&bytes).map_err(LayoutTransferError::NotJson)?;
        return layout_from_value(&value, now);
    }

    let value = serde_json::from_str(trimmed).map_err(LayoutTransferError::NotJson)?;
    layout_from_value(&value, now)
}

fn decode_share(code: &str) -> Result<Vec<u8>, LayoutTransferError> {
    let mut parts = code.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().ok_or(LayoutTransferError::EmptyPayload)?;
    let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
    let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

    if domain != SHARE_DOMAIN {
        return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != SHARE_VERSION {
        return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
    }

    STANDARD_NO_PAD
        .decode(payload.trim().as_bytes())
        .map_err(LayoutTransferError::InvalidEncoding)
}

fn layout_from_value(
    value: &Value,
    now: DateTime<Utc>,
) -> Result<ImportedLayout, LayoutTransferError> {
    let entries = value
        .get("pieces")
        .ok_or(LayoutTransferError::MissingPieces)?
        .as_array()
        .ok_or(LayoutTransferError::PiecesNotList)?;

    let mut pieces = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let kind = entry.get("type").and_then(Value::as_str).unwrap_or_default();
        if !PieceKind::ALL.iter().any(|known| known.wire_name() == kind) {
            return Err(LayoutTransferError::UnknownPieceType {
                index,
                kind: kind.to_owned(),
            });
        }
        let record: PieceRecord = serde_json::from_value(entry.clone())
            .map_err(|source| LayoutTransferError::InvalidPiece { index, source })?;
        pieces.push(Piece::try_from(record)?);
    }

    let text = |field: &str| value.get(field).and_then(Value::as_str).map(str::to_owned);
    Ok(ImportedLayout {
        source_id: text("id"),
        name: text("name")
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| String::from(DEFAULT_CUSTOM_NAME)),
        description: text("description")
            .unwrap_or_else(|| String::from(DEFAULT_CUSTOM_DESCRIPTION)),
        pieces,
        imported_at: now,
    })
}
