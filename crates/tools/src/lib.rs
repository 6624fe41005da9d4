//! Developer tooling: simulation inspector, tick timing, snapshot export.
//!
//! # Invariants
//! - Tools only read simulation state; they never mutate a `Simulation`.

pub mod export;
mod inspector;
mod profiler;

pub use inspector::{AgentInfo, FieldStats, SimInspector, SimSummary};
pub use profiler::TickTimer;

pub fn crate_info() -> &'static str {
    "physarum-tools v0.1.0"
}
