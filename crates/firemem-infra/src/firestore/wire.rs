//! JSON shapes of the Firestore REST API (v1).
//!
//! Only what the memory adapter reads and writes is modelled; unknown value
//! kinds (maps, arrays, geo points, ...) deserialize to an empty
//! [`FieldValue`].

use std::collections::HashMap;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Firestore document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name, `projects/{p}/databases/{d}/documents/{path}`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default)]
    pub fields: HashMap<String, FieldValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
}

impl Document {
    /// A document body holding only `fields`, as sent on writes.
    pub fn with_fields(fields: HashMap<String, FieldValue>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Last path segment of the resource name.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }
}

/// A single typed field value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValue {
    /// Base64-encoded bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
}

impl FieldValue {
    pub fn bytes(value: &[u8]) -> Self {
        Self {
            bytes_value: Some(STANDARD.encode(value)),
            ..Self::default()
        }
    }

    /// Decode the bytes payload. `None` if this is not a bytes value.
    pub fn decode_bytes(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        self.bytes_value.as_deref().map(|encoded| STANDARD.decode(encoded))
    }
}

/// Response of `GET .../documents/{collection}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<Document>,

    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Error envelope returned for non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,

    #[serde(default)]
    pub message: String,

    /// Canonical status name, e.g. `"NOT_FOUND"`.
    #[serde(default)]
    pub status: Option<String>,
}
