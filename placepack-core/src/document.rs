//! The persisted compact document and its wire contract.
//!
//! Field names are short on purpose; they are the wire contract and must be
//! matched byte-for-byte for interoperability with existing documents.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interval::IntervalGroup;
use crate::progression::ProgressionGroup;

/// One encoded group, in whichever tier applies.
///
/// The two shapes are discriminated structurally at deserialisation: a
/// Tier-2 blob carries `y`/`s`/`seq`, a Tier-1 blob carries `e`. A JSON
/// object matching neither shape fails to parse; there is no silent
/// skipping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Blob {
    /// Tier-2: progression runs, wire shape `{c, n, id, y, s, seq}`.
    Progression(ProgressionGroup),
    /// Tier-1: interval entries, wire shape `{c, n, id, e}`.
    Interval(IntervalGroup),
}

/// The persisted artifact: one blob, or blobs in `(cityId, countryId, name)`
/// ascending order.
///
/// Written once and read wholesale; regeneration always replaces the whole
/// document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompactDocument {
    /// Exactly one group.
    Single(Blob),
    /// Zero or several groups.
    Many(Vec<Blob>),
}

/// Errors raised while reading or writing a compact document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The payload was not valid JSON, or an object matched neither tier's
    /// required fields.
    #[error("unrecognised compact document shape: {source}")]
    Parse {
        /// Underlying deserialisation failure.
        #[source]
        source: serde_json::Error,
    },
    /// Serialising the document failed.
    #[error("failed to serialise compact document: {source}")]
    Serialise {
        /// Underlying serialisation failure.
        #[source]
        source: serde_json::Error,
    },
}

impl CompactDocument {
    /// Wrap encoded blobs: a single blob stands alone, anything else is a
    /// collection.
    #[must_use]
    pub fn from_blobs(mut blobs: Vec<Blob>) -> Self {
        if blobs.len() == 1 {
            if let Some(only) = blobs.pop() {
                return Self::Single(only);
            }
        }
        Self::Many(blobs)
    }

    /// All blobs in document order.
    #[must_use]
    pub fn blobs(&self) -> &[Blob] {
        match self {
            Self::Single(blob) => std::slice::from_ref(blob),
            Self::Many(blobs) => blobs,
        }
    }

    /// Parse a document from its JSON wire form.
    ///
    /// # Errors
    /// Returns [`DocumentError::Parse`] for invalid JSON or an unrecognised
    /// blob shape.
    pub fn from_json(payload: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(payload).map_err(|source| DocumentError::Parse { source })
    }

    /// Serialise the document to its JSON wire form.
    ///
    /// # Errors
    /// Returns [`DocumentError::Serialise`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        serde_json::to_string(self).map_err(|source| DocumentError::Serialise { source })
    }
}
