//! Memory interface and host wiring for firemem.
//!
//! This crate defines the "port" the bot framework talks to (the [`Memory`]
//! trait), the per-call [`CallContext`], the adapter configuration builder,
//! and the host registration surface. It depends only on `firemem-types` --
//! never on `firemem-infra` or any network crate.
//!
//! [`Memory`]: memory::store::Memory
//! [`CallContext`]: context::CallContext

pub mod config;
pub mod context;
pub mod host;
pub mod memory;
