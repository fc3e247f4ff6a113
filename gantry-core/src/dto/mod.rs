//! Data Transfer Objects for inter-service communication
//!
//! This module contains DTOs used for communication between Gantry services
//! (orchestrator, executor, CLI). DTOs are lightweight representations of
//! domain entities optimized for network transfer.

pub mod deployment;
pub mod event;
pub mod target;
