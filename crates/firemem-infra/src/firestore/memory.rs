//! Firestore implementation of the bot memory.
//!
//! Implements `Memory` from `firemem-core` with one document per key in a
//! single collection. Each document carries exactly one field, `value`, with
//! the raw bytes. Every call is a direct round-trip; nothing is cached.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use firemem_core::config::{Logger, MemoryConfig};
use firemem_core::context::CallContext;
use firemem_core::memory::store::Memory;
use firemem_types::error::MemoryError;
use firemem_types::memory::{MemoryEntry, VALUE_FIELD, is_valid_id};

use super::client::{ClientOptions, CollectionRef, FirestoreClient, Precondition};
use super::wire::{Document, FieldValue};

/// Firestore-backed implementation of [`Memory`].
pub struct FirestoreMemory {
    project: String,
    collection_id: String,
    logger: Logger,
    /// `None` once closed; dropping the last reference releases the pool.
    collection: RwLock<Option<CollectionRef>>,
}

impl FirestoreMemory {
    /// Connect using [`ClientOptions::from_env`].
    pub fn connect(config: MemoryConfig) -> Result<Self, MemoryError> {
        Self::connect_with(config, ClientOptions::from_env())
    }

    /// Connect to `config.project()` and bind `config.collection()`.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Connection`] if the client cannot be built
    /// (missing credentials, invalid endpoint).
    pub fn connect_with(config: MemoryConfig, options: ClientOptions) -> Result<Self, MemoryError> {
        let logger = config.logger().clone();
        logger.in_scope(|| {
            tracing::debug!(project = %config.project(), "Connecting to Firestore");
        });

        let client = FirestoreClient::new(config.project(), options)?;
        let collection = client.collection(config.collection());

        logger.in_scope(|| {
            tracing::info!(
                project = %config.project(),
                collection = %config.collection(),
                "Firestore initialized successfully"
            );
        });

        Ok(Self {
            project: config.project().to_string(),
            collection_id: config.collection().to_string(),
            logger,
            collection: RwLock::new(Some(collection)),
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn collection(&self) -> &str {
        &self.collection_id
    }

    /// Like [`Memory::get`], but includes the server timestamps.
    pub async fn get_entry(
        &self,
        ctx: &CallContext,
        key: &str,
    ) -> Result<Option<MemoryEntry>, MemoryError> {
        let doc = self.bound()?.doc(checked_key(key)?);
        let op = async {
            match doc.get().await {
                Ok(document) => decode_value(key, &document).map(|value| {
                    Some(MemoryEntry {
                        key: key.to_string(),
                        value,
                        created_at: document.create_time,
                        updated_at: document.update_time,
                    })
                }),
                Err(err) if err.is_not_found() => Ok(None),
                Err(err) => Err(MemoryError::from(err)),
            }
        };
        self.logger.instrument("get_entry", ctx.run(op)).await
    }

    fn bound(&self) -> Result<CollectionRef, MemoryError> {
        self.collection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(MemoryError::Closed)
    }
}

fn checked_key(key: &str) -> Result<&str, MemoryError> {
    if is_valid_id(key) {
        Ok(key)
    } else {
        Err(MemoryError::InvalidKey(key.to_string()))
    }
}

/// Extract the `value` bytes. A document without a bytes `value` field reads
/// as an empty value.
fn decode_value(key: &str, document: &Document) -> Result<Vec<u8>, MemoryError> {
    match document.fields.get(VALUE_FIELD).and_then(FieldValue::decode_bytes) {
        Some(decoded) => decoded
            .map_err(|e| MemoryError::Decode(format!("invalid bytes for key '{key}': {e}"))),
        None => {
            tracing::warn!(key, "Document has no bytes value field");
            Ok(Vec::new())
        }
    }
}

impl Memory for FirestoreMemory {
    async fn set(&self, ctx: &CallContext, key: &str, value: &[u8]) -> Result<(), MemoryError> {
        let doc = self.bound()?.doc(checked_key(key)?);
        let op = async {
            tracing::debug!(key, bytes = value.len(), "Storing data");
            let mut fields = HashMap::with_capacity(1);
            fields.insert(VALUE_FIELD.to_string(), FieldValue::bytes(value));
            doc.set(fields).await?;
            Ok::<_, MemoryError>(())
        };
        self.logger.instrument("set", ctx.run(op)).await
    }

    async fn get(&self, ctx: &CallContext, key: &str) -> Result<Option<Vec<u8>>, MemoryError> {
        let doc = self.bound()?.doc(checked_key(key)?);
        let op = async {
            match doc.get().await {
                Ok(document) => decode_value(key, &document).map(Some),
                Err(err) if err.is_not_found() => Ok(None),
                Err(err) => Err(MemoryError::from(err)),
            }
        };
        self.logger.instrument("get", ctx.run(op)).await
    }

    async fn delete(&self, ctx: &CallContext, key: &str) -> Result<bool, MemoryError> {
        let doc = self.bound()?.doc(checked_key(key)?);
        let op = async {
            match doc.delete(Precondition::Exists).await {
                Ok(()) => Ok(true),
                Err(err) if err.is_not_found() => {
                    tracing::debug!(key, "Delete of missing document ignored");
                    Ok(false)
                }
                Err(err) => Err(MemoryError::from(err)),
            }
        };
        self.logger.instrument("delete", ctx.run(op)).await
    }

    async fn keys(&self, ctx: &CallContext) -> Result<Vec<String>, MemoryError> {
        let mut pages = self.bound()?.documents();
        let op = async {
            let mut keys = Vec::new();
            while let Some(documents) = pages.next_page().await? {
                keys.extend(documents.iter().map(|doc| doc.id().to_string()));
            }
            tracing::debug!(count = keys.len(), "Listed keys");
            Ok::<_, MemoryError>(keys)
        };
        self.logger.instrument("keys", ctx.run(op)).await
    }

    async fn close(&self) -> Result<(), MemoryError> {
        let released = self
            .collection
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match released {
            Some(_) => {
                self.logger.in_scope(|| {
                    tracing::info!(collection = %self.collection_id, "Firestore connection closed");
                });
                Ok(())
            }
            None => Err(MemoryError::Closed),
        }
    }
}
