//! The key-value memory interface the host framework plugs backends into.
//!
//! Backends implement [`store::Memory`]; the host stores them type-erased as
//! [`box_memory::BoxMemory`]. [`in_memory::InMemoryStore`] is a process-local
//! backend used when no persistent store is configured.

pub mod box_memory;
pub mod in_memory;
pub mod store;
