//! Gantry Core
//!
//! Core types and abstractions for the Gantry agent deployment platform.
//!
//! This crate contains:
//! - Domain types: Core business entities (Deployment, Target)
//! - DTOs: Data transfer objects for inter-service communication

pub mod domain;
pub mod dto;
