//! Agent population: double-buffered state plus the initial layout schemes.

use std::f64::consts::{PI, TAU};

use glam::DVec2;
use physarum_common::{Agent, AgentId, GridSize};

use crate::buffer::DoubleBuffer;
use crate::config::{Placement, SimConfig};
use crate::mixer::{RandomMixer, Stream, agent_key};
use crate::motion::clamp_to_grid;

/// Positions and headings of the whole population, double-buffered.
///
/// Slot `i` always holds the agent with id `i`; the population size never
/// changes after construction.
#[derive(Debug, Clone)]
pub struct AgentStore {
    buffers: DoubleBuffer<Vec<Agent>>,
}

impl AgentStore {
    pub fn from_agents(agents: Vec<Agent>) -> Self {
        Self {
            buffers: DoubleBuffer::new(agents),
        }
    }

    /// Lay out `config.agent_count` agents according to `config.placement`.
    /// Expects a validated config.
    pub(crate) fn place(config: &SimConfig, mixer: &RandomMixer) -> Self {
        let grid = config.grid();
        let agents = (0..config.agent_count as u64)
            .map(|id| match &config.placement {
                Placement::Uniform => uniform_agent(id, grid, mixer),
                Placement::Disk { radius } => {
                    let radius = radius.unwrap_or_else(|| default_disk_radius(grid));
                    disk_agent(id, grid, radius, mixer)
                }
                Placement::Explicit { agents } => {
                    let seed = agents[id as usize];
                    Agent::new(id, seed.position, seed.heading)
                }
            })
            .collect();
        Self::from_agents(agents)
    }

    pub fn current(&self) -> &[Agent] {
        self.buffers.current()
    }

    pub fn len(&self) -> usize {
        self.current().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current().is_empty()
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.current().get(id.index())
    }

    /// Owned copy of the current agent states.
    pub fn snapshot(&self) -> Vec<Agent> {
        self.current().to_vec()
    }

    pub(crate) fn split(&mut self) -> (&[Agent], &mut [Agent]) {
        let (cur, next) = self.buffers.split();
        (cur.as_slice(), next.as_mut_slice())
    }

    pub(crate) fn swap(&mut self) {
        self.buffers.swap();
    }
}

/// A third of the smaller grid dimension.
pub fn default_disk_radius(grid: GridSize) -> f64 {
    grid.width.min(grid.height) as f64 / 3.0
}

fn uniform_agent(id: u64, grid: GridSize, mixer: &RandomMixer) -> Agent {
    let x = mixer.range(agent_key(id, Stream::PlaceX), 0.0, grid.width as f64);
    let y = mixer.range(agent_key(id, Stream::PlaceY), 0.0, grid.height as f64);
    let heading = mixer.range(agent_key(id, Stream::PlaceHeading), 0.0, TAU);
    Agent::new(id, clamp_to_grid(DVec2::new(x, y), grid), heading)
}

fn disk_agent(id: u64, grid: GridSize, radius: f64, mixer: &RandomMixer) -> Agent {
    let angle = mixer.range(agent_key(id, Stream::PlaceHeading), 0.0, TAU);
    let r = mixer.range(agent_key(id, Stream::PlaceX), 0.0, radius);
    let position = grid.center() + DVec2::from_angle(angle) * r;
    Agent::new(
        id,
        clamp_to_grid(position, grid),
        (angle + PI).rem_euclid(TAU),
    )
}
