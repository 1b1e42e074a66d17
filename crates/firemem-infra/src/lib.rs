//! Infrastructure layer for firemem.
//!
//! Contains the Firestore REST client binding, the [`Memory`] implementation
//! built on it, the plugin-style module constructor, and the settings-file
//! loader.
//!
//! [`Memory`]: firemem_core::memory::store::Memory

pub mod config;
pub mod firestore;
