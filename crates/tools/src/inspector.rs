use physarum_common::{AgentId, GridSize};
use physarum_kernel::{FieldSnapshot, SimState, Simulation};

/// Simulation inspector for developer tooling.
///
/// Read-only queries against a simulation for debugging, profiling and
/// command-line reporting.
pub struct SimInspector;

impl SimInspector {
    /// Produce a summary of the simulation state.
    pub fn summary(sim: &Simulation) -> SimSummary {
        SimSummary {
            tick: sim.tick_count(),
            state: sim.state(),
            grid: sim.config().grid(),
            agent_count: sim.agent_count(),
            field: FieldStats::from_snapshot(&sim.field_snapshot()),
        }
    }

    pub fn inspect_agent(sim: &Simulation, id: AgentId) -> Option<AgentInfo> {
        sim.agent(id).map(|a| AgentInfo {
            id: a.id,
            position: [a.position.x, a.position.y],
            heading: a.heading,
            cell: sim.config().grid().cell_index(a.position),
        })
    }
}

/// Aggregate statistics over one published field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sum of every cell.
    pub mass: f64,
    /// Cells holding a value above zero.
    pub occupied: usize,
}

impl FieldStats {
    pub fn from_snapshot(snapshot: &FieldSnapshot) -> Self {
        let cells = snapshot.cells();
        if cells.is_empty() {
            return Self {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                mass: 0.0,
                occupied: 0,
            };
        }
        let (mut min, mut max, mut mass, mut occupied) = (f64::INFINITY, 0.0f64, 0.0, 0);
        for &c in cells {
            min = min.min(c);
            max = max.max(c);
            mass += c;
            if c > 0.0 {
                occupied += 1;
            }
        }
        Self {
            min,
            max,
            mean: mass / cells.len() as f64,
            mass,
            occupied,
        }
    }
}

impl std::fmt::Display for FieldStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "min={:.4} max={:.4} mean={:.4} mass={:.2} occupied={}",
            self.min, self.max, self.mean, self.mass, self.occupied
        )
    }
}

/// Summary of simulation state for the inspector.
#[derive(Debug, Clone)]
pub struct SimSummary {
    pub tick: u64,
    pub state: SimState,
    pub grid: GridSize,
    pub agent_count: usize,
    pub field: FieldStats,
}

impl std::fmt::Display for SimSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Simulation: tick={} state={:?} grid={}x{} agents={} field[{}]",
            self.tick,
            self.state,
            self.grid.width,
            self.grid.height,
            self.agent_count,
            self.field
        )
    }
}

/// Detailed info about a single agent.
#[derive(Debug, Clone)]
pub struct AgentInfo {
    pub id: AgentId,
    pub position: [f64; 2],
    pub heading: f64,
    /// Row-major index of the enclosing cell.
    pub cell: Option<usize>,
}

impl std::fmt::Display for AgentInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Agent [{}] pos=({:.2}, {:.2}) heading={:.3}rad",
            self.id.0, self.position[0], self.position[1], self.heading
        )?;
        if let Some(cell) = self.cell {
            write!(f, " cell={cell}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use physarum_common::AgentSeed;
    use physarum_kernel::{Placement, SimConfig};

    fn one_agent_sim() -> Simulation {
        Simulation::new(SimConfig {
            width: 8,
            height: 8,
            agent_count: 1,
            placement: Placement::Explicit {
                agents: vec![AgentSeed {
                    position: DVec2::new(2.5, 3.5),
                    heading: 0.0,
                }],
            },
            ..SimConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn summary_idle_simulation() {
        let sim = one_agent_sim();
        let summary = SimInspector::summary(&sim);
        assert_eq!(summary.tick, 0);
        assert_eq!(summary.state, SimState::Idle);
        assert_eq!(summary.agent_count, 1);
        assert_eq!(summary.field.mass, 0.0);
        assert_eq!(summary.field.occupied, 0);
    }

    #[test]
    fn summary_after_tick_sees_deposit() {
        let mut sim = one_agent_sim();
        sim.tick().unwrap();
        let summary = SimInspector::summary(&sim);
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.state, SimState::Running);
        assert_eq!(summary.field.max, 1.0);
        assert_eq!(summary.field.occupied, 1);
    }

    #[test]
    fn inspect_agent_found() {
        let sim = one_agent_sim();
        let info = SimInspector::inspect_agent(&sim, AgentId(0)).unwrap();
        assert_eq!(info.position, [2.5, 3.5]);
        assert_eq!(info.cell, Some(3 * 8 + 2));
    }

    #[test]
    fn inspect_agent_not_found() {
        let sim = one_agent_sim();
        assert!(SimInspector::inspect_agent(&sim, AgentId(7)).is_none());
    }

    #[test]
    fn field_stats_over_cells() {
        let mut field = physarum_kernel::TrailField::new(GridSize::new(2, 2));
        field.set(0, 0, 1.0);
        field.set(1, 1, 0.5);
        let stats = FieldStats::from_snapshot(&FieldSnapshot::capture(0, &field));
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 1.0);
        assert_eq!(stats.mass, 1.5);
        assert_eq!(stats.mean, 0.375);
        assert_eq!(stats.occupied, 2);
    }

    #[test]
    fn summary_display() {
        let sim = one_agent_sim();
        let s = format!("{}", SimInspector::summary(&sim));
        assert!(s.contains("tick=0"));
        assert!(s.contains("grid=8x8"));
    }
}
