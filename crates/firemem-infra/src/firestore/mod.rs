//! Firestore-backed bot memory.
//!
//! - [`client`]: thin REST binding (documents get/patch/delete/list).
//! - [`memory`]: [`FirestoreMemory`](memory::FirestoreMemory), one document
//!   per key inside a single collection.
//! - [`module`]: registration with the host's configuration object.

pub mod client;
pub mod error;
pub mod memory;
pub mod module;
pub mod wire;

pub use client::{ClientOptions, Credentials, FirestoreClient};
pub use memory::FirestoreMemory;
pub use module::{FirestoreModule, firestore_module};
