//! Shared domain types for firemem.
//!
//! This crate contains the types every other crate agrees on: the error
//! enums, the status-kind classification returned by the storage client,
//! stored record views, and settings-file types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod error;
pub mod memory;
pub mod status;
