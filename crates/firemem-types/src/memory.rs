//! Stored record types for the bot memory.
//!
//! Each key is one document in a single collection. The document carries a
//! single field, [`VALUE_FIELD`], holding the raw value bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Collection used when none is configured.
pub const DEFAULT_COLLECTION: &str = "joe-bot";

/// Name of the only field persisted in each document.
pub const VALUE_FIELD: &str = "value";

/// Maximum length in bytes of a document or collection id.
pub const MAX_ID_BYTES: usize = 1500;

/// A stored value together with the timestamps the database keeps for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub key: String,
    pub value: Vec<u8>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Check that `id` can name a document or collection.
///
/// Rejects empty ids, ids containing `/`, the relative names `.` and `..`,
/// reserved `__name__`-style ids, and ids longer than [`MAX_ID_BYTES`].
pub fn is_valid_id(id: &str) -> bool {
    if id.is_empty() || id.len() > MAX_ID_BYTES {
        return false;
    }
    if id.contains('/') || id == "." || id == ".." {
        return false;
    }
    !(id.len() >= 4 && id.starts_with("__") && id.ends_with("__"))
}
