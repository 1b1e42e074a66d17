//! BoxMemory -- object-safe dynamic dispatch wrapper for Memory.
//!
//! 1. `MemoryDyn` is an object-safe mirror of `Memory` with boxed futures
//! 2. Blanket-impl `MemoryDyn` for all `T: Memory`
//! 3. `BoxMemory` wraps `Box<dyn MemoryDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use firemem_types::error::MemoryError;

use super::store::Memory;
use crate::context::CallContext;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, MemoryError>> + Send + 'a>>;

/// Object-safe version of [`Memory`] with boxed futures.
///
/// A blanket implementation is provided for all types implementing `Memory`.
pub trait MemoryDyn: Send + Sync {
    fn set_boxed<'a>(
        &'a self,
        ctx: &'a CallContext,
        key: &'a str,
        value: &'a [u8],
    ) -> BoxFuture<'a, ()>;

    fn get_boxed<'a>(&'a self, ctx: &'a CallContext, key: &'a str)
    -> BoxFuture<'a, Option<Vec<u8>>>;

    fn delete_boxed<'a>(&'a self, ctx: &'a CallContext, key: &'a str) -> BoxFuture<'a, bool>;

    fn keys_boxed<'a>(&'a self, ctx: &'a CallContext) -> BoxFuture<'a, Vec<String>>;

    fn close_boxed(&self) -> BoxFuture<'_, ()>;
}

impl<T: Memory> MemoryDyn for T {
    fn set_boxed<'a>(
        &'a self,
        ctx: &'a CallContext,
        key: &'a str,
        value: &'a [u8],
    ) -> BoxFuture<'a, ()> {
        Box::pin(self.set(ctx, key, value))
    }

    fn get_boxed<'a>(
        &'a self,
        ctx: &'a CallContext,
        key: &'a str,
    ) -> BoxFuture<'a, Option<Vec<u8>>> {
        Box::pin(self.get(ctx, key))
    }

    fn delete_boxed<'a>(&'a self, ctx: &'a CallContext, key: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(self.delete(ctx, key))
    }

    fn keys_boxed<'a>(&'a self, ctx: &'a CallContext) -> BoxFuture<'a, Vec<String>> {
        Box::pin(self.keys(ctx))
    }

    fn close_boxed(&self) -> BoxFuture<'_, ()> {
        Box::pin(self.close())
    }
}

/// Type-erased memory backend, as registered with the host.
///
/// Since `Memory` uses RPITIT it cannot be a trait object directly;
/// `BoxMemory` offers the same methods and implements `Memory` itself.
pub struct BoxMemory {
    inner: Box<dyn MemoryDyn>,
}

impl BoxMemory {
    pub fn new<T: Memory + 'static>(memory: T) -> Self {
        Self {
            inner: Box::new(memory),
        }
    }
}

impl Memory for BoxMemory {
    async fn set(&self, ctx: &CallContext, key: &str, value: &[u8]) -> Result<(), MemoryError> {
        self.inner.set_boxed(ctx, key, value).await
    }

    async fn get(&self, ctx: &CallContext, key: &str) -> Result<Option<Vec<u8>>, MemoryError> {
        self.inner.get_boxed(ctx, key).await
    }

    async fn delete(&self, ctx: &CallContext, key: &str) -> Result<bool, MemoryError> {
        self.inner.delete_boxed(ctx, key).await
    }

    async fn keys(&self, ctx: &CallContext) -> Result<Vec<String>, MemoryError> {
        self.inner.keys_boxed(ctx).await
    }

    async fn close(&self) -> Result<(), MemoryError> {
        self.inner.close_boxed().await
    }
}
