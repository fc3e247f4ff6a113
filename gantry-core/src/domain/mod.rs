//! Core domain types
//!
//! This module contains the core domain structures used across Gantry services.
//! These types represent the fundamental business entities and are shared between
//! the orchestrator (for persistence) and the executor (for provisioning).

pub mod deployment;
pub mod target;
