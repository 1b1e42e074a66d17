//! Process-local memory backend.
//!
//! Keeps values in a [`DashMap`]; nothing survives a restart. The host falls
//! back to this store when no persistent module registers one.

use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use firemem_types::error::MemoryError;

use super::store::Memory;
use crate::context::CallContext;

/// In-memory implementation of [`Memory`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: DashMap<String, Vec<u8>>,
    closed: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ensure_open(&self) -> Result<(), MemoryError> {
        if self.closed.load(Ordering::Acquire) {
            Err(MemoryError::Closed)
        } else {
            Ok(())
        }
    }
}

impl Memory for InMemoryStore {
    async fn set(&self, ctx: &CallContext, key: &str, value: &[u8]) -> Result<(), MemoryError> {
        self.ensure_open()?;
        ctx.run(async {
            self.entries.insert(key.to_string(), value.to_vec());
            Ok(())
        })
        .await
    }

    async fn get(&self, ctx: &CallContext, key: &str) -> Result<Option<Vec<u8>>, MemoryError> {
        self.ensure_open()?;
        ctx.run(async { Ok(self.entries.get(key).map(|entry| entry.value().clone())) })
            .await
    }

    async fn delete(&self, ctx: &CallContext, key: &str) -> Result<bool, MemoryError> {
        self.ensure_open()?;
        ctx.run(async { Ok(self.entries.remove(key).is_some()) }).await
    }

    async fn keys(&self, ctx: &CallContext) -> Result<Vec<String>, MemoryError> {
        self.ensure_open()?;
        ctx.run(async {
            Ok(self
                .entries
                .iter()
                .map(|entry| entry.key().clone())
                .collect())
        })
        .await
    }

    async fn close(&self) -> Result<(), MemoryError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(MemoryError::Closed);
        }
        self.entries.clear();
        Ok(())
    }
}
