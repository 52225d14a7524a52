//! Lifecycle managers for the entity store.
//!
//! Each repository is a zero-sized struct with associated functions taking
//! the store explicitly, mirroring how the rest of the workspace passes its
//! owned state around.

pub mod project_repo;
pub mod task_repo;

pub use project_repo::ProjectRepo;
pub use task_repo::TaskRepo;
