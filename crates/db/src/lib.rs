//! Entity store, persistence backends and lifecycle repositories.
//!
//! [`store::EntityStore`] owns the canonical project and task collections.
//! The repositories in [`repositories`] are the only code that mutates them;
//! every mutation ends in a commit that persists the full snapshot and
//! publishes a change event.

pub mod filter;
pub mod ids;
pub mod ingest;
pub mod models;
pub mod persistence;
pub mod repositories;
pub mod store;

pub use persistence::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use store::EntityStore;
