//! Key-value memory trait.
//!
//! Defines the interface the bot framework uses to persist small binary
//! values under string keys. Implementations live in firemem-infra (plus the
//! in-process [`InMemoryStore`](super::in_memory::InMemoryStore)).

use std::future::Future;

use firemem_types::error::MemoryError;

use crate::context::CallContext;

/// Trait for bot key-value persistent storage.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition). Use
/// [`BoxMemory`](super::box_memory::BoxMemory) when dynamic dispatch is needed.
pub trait Memory: Send + Sync {
    /// Store `value` under `key`, replacing any previous value entirely.
    fn set(
        &self,
        ctx: &CallContext,
        key: &str,
        value: &[u8],
    ) -> impl Future<Output = Result<(), MemoryError>> + Send;

    /// Get the value for `key`. Returns `None` if the key does not exist.
    fn get(
        &self,
        ctx: &CallContext,
        key: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, MemoryError>> + Send;

    /// Delete `key`. Returns whether a value existed; deleting a missing key
    /// is not an error.
    fn delete(
        &self,
        ctx: &CallContext,
        key: &str,
    ) -> impl Future<Output = Result<bool, MemoryError>> + Send;

    /// List every stored key. Order is backend-defined.
    fn keys(
        &self,
        ctx: &CallContext,
    ) -> impl Future<Output = Result<Vec<String>, MemoryError>> + Send;

    /// Release the backend. Calls made afterwards fail with
    /// [`MemoryError::Closed`], including a second `close`.
    fn close(&self) -> impl Future<Output = Result<(), MemoryError>> + Send;
}
