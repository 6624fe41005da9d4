use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Stable identifier of an agent. Equal to its slot index in the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl AgentId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A point agent: position on the plane plus heading in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub position: DVec2,
    pub heading: f64,
}

impl Agent {
    pub fn new(id: u64, position: DVec2, heading: f64) -> Self {
        Self {
            id: AgentId(id),
            position,
            heading,
        }
    }

    /// Unit vector along the current heading.
    pub fn direction(&self) -> DVec2 {
        DVec2::from_angle(self.heading)
    }
}

/// Caller-supplied initial state for one agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentSeed {
    pub position: DVec2,
    #[serde(default)]
    pub heading: f64,
}

/// Dimensions of the trail grid, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Grid center on the continuous plane.
    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Whether a point lies in `[0, width) x [0, height)`.
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= 0.0 && p.x < self.width as f64 && p.y >= 0.0 && p.y < self.height as f64
    }

    /// Row-major index of the cell enclosing `p`, or `None` when `p` is off-grid.
    pub fn cell_index(&self, p: DVec2) -> Option<usize> {
        if !self.contains(p) {
            return None;
        }
        let x = (p.x.floor() as usize).min(self.width - 1);
        let y = (p.y.floor() as usize).min(self.height - 1);
        Some(y * self.width + x)
    }

    /// Row-major index of `(x, y)` after toroidal wrap on both axes.
    pub fn wrapped_index(&self, x: i64, y: i64) -> usize {
        let wx = x.rem_euclid(self.width as i64) as usize;
        let wy = y.rem_euclid(self.height as i64) as usize;
        wy * self.width + wx
    }
}
