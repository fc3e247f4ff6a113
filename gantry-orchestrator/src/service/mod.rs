//! Service Module
//!
//! Business logic layer for the orchestrator.
//! Services orchestrate between repositories, external dispatch clients,
//! and contain domain logic.

pub mod deployment;
pub mod dispatch;
pub mod event;

// Re-export for convenience
pub use deployment as deployment_service;
pub use dispatch as dispatch_service;
pub use event as event_service;
