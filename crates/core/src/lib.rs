//! Shared domain vocabulary for the testmaster workspace.
//!
//! This crate has no internal dependencies so it can be used by the store,
//! the event bus and the export pipeline alike.

pub mod config;
pub mod data_uri;
pub mod error;
pub mod naming;
pub mod search;
pub mod status;
pub mod types;
pub mod validation;
