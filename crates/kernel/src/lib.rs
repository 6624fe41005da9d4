//! Physarum kernel: agent-based trail simulation with deterministic ticking.
//!
//! # Invariants
//! - A tick is a pure function of the previous tick's agents and field plus
//!   the seed; thread count and processing order never change the result.
//! - Every agent lies in `[0, width) x [0, height)` after each tick.
//! - Every published cell lies in `[0, cap]`.
//! - Callers receive owned snapshots, never the buffers a tick writes.
//!
//! # Tick pipeline
//! motion (previous field, previous agents → next agents) → deposit (next
//! agents → deposit layer) → diffusion (previous field → diffused layer) →
//! blend (deposit + diffused → next field) → publish and swap.

pub mod agents;
pub mod blend;
pub mod buffer;
pub mod config;
pub mod deposit;
pub mod diffusion;
pub mod error;
pub mod field;
pub mod mixer;
pub mod motion;
pub mod runner;
pub mod sensor;
pub mod sim;

pub use agents::AgentStore;
pub use config::{Placement, SimConfig, SteeringParams};
pub use error::SimError;
pub use field::{FieldSnapshot, TrailField};
pub use mixer::RandomMixer;
pub use runner::{CancelToken, RunOptions, RunSummary, StopReason};
pub use sim::{SimState, Simulation};

pub fn crate_info() -> &'static str {
    "physarum-kernel v0.1.0"
}
