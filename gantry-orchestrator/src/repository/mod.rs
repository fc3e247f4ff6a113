//! Repository Module
//!
//! Data access layer for the orchestrator.
//! Each repository handles database operations for a specific domain entity.
//! Status mutations use guarded UPDATE statements so terminal records and
//! progress monotonicity hold atomically at the store.

pub mod deployment;
pub mod target;

// Re-export for convenience
pub use deployment as deployment_repository;
pub use target as target_repository;
