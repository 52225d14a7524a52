//! Change notification bus for the testmaster store.
//!
//! The presentation layer subscribes to [`EventBus`] and re-renders when a
//! [`ChangeEvent`] arrives, instead of observing the collections directly.

pub mod bus;

pub use bus::{ChangeEvent, EventBus};
