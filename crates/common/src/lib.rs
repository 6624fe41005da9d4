//! Shared types for the physarum trail simulation.
//!
//! # Invariants
//! - Grid dimensions are positive once a `GridSize` leaves validation.
//! - Agent positions are expressed in cell units on the continuous plane.

mod types;

pub use types::{Agent, AgentId, AgentSeed, GridSize};
