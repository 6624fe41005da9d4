//! Per-agent steering and movement.
//!
//! Each agent is a pure function of its own previous state, the previous
//! field and the mixer, so the population is updated as an unordered
//! parallel map.

use std::f64::consts::TAU;

use glam::DVec2;
use physarum_common::{Agent, GridSize};
use rayon::prelude::*;

use crate::config::SteeringParams;
use crate::field::TrailField;
use crate::mixer::{RandomMixer, Stream, position_key};
use crate::sensor::{SensorReading, sense_cone};

/// Gap kept between a clamped agent and the far grid edge.
pub const BOUNDARY_MARGIN: f64 = 0.01;

/// Outcome of comparing the three sensor readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steering {
    /// Forward is strictly strongest.
    Straight,
    /// Forward is strictly weakest: turn by a random amount.
    Random,
    Right,
    Left,
    /// Left and right tie without forward winning or losing outright.
    Hold,
}

impl Steering {
    pub fn decide(r: &SensorReading) -> Self {
        if r.forward > r.left && r.forward > r.right {
            Self::Straight
        } else if r.forward < r.left && r.forward < r.right {
            Self::Random
        } else if r.right > r.left {
            Self::Right
        } else if r.right < r.left {
            Self::Left
        } else {
            Self::Hold
        }
    }

    /// New heading; `draw` is only consulted for [`Steering::Random`].
    pub fn apply(self, heading: f64, turn_speed: f64, draw: impl FnOnce() -> f64) -> f64 {
        match self {
            Self::Straight | Self::Hold => heading,
            Self::Random => heading + (draw() - 0.5) * 2.0 * turn_speed,
            Self::Right => heading + turn_speed,
            Self::Left => heading - turn_speed,
        }
    }
}

/// Clamp each coordinate into `[0, dim - BOUNDARY_MARGIN]`.
pub fn clamp_to_grid(p: DVec2, grid: GridSize) -> DVec2 {
    let max_x = (grid.width as f64 - BOUNDARY_MARGIN).max(0.0);
    let max_y = (grid.height as f64 - BOUNDARY_MARGIN).max(0.0);
    DVec2::new(p.x.clamp(0.0, max_x), p.y.clamp(0.0, max_y))
}

/// Advance one agent by one tick.
///
/// Sensing uses the pre-move position. A candidate position that leaves the
/// grid is clamped back in and the heading is redrawn, discarding the
/// steering decision for this tick.
pub fn advance(
    agent: &Agent,
    field: &TrailField,
    params: &SteeringParams,
    mixer: &RandomMixer,
    tick: u64,
) -> Agent {
    let grid = field.grid();
    let candidate = agent.position + agent.direction() * params.speed;

    let reading = sense_cone(
        field,
        agent.position,
        agent.heading,
        params.sensor_angle_spacing,
        params.sensor_offset_distance,
    );
    let steered = Steering::decide(&reading).apply(agent.heading, params.turn_speed, || {
        mixer.unit(position_key(agent.position, grid.width, tick, Stream::Steer))
    });

    let (position, heading) = if grid.contains(candidate) {
        (candidate, steered)
    } else {
        let redraw = mixer.unit(position_key(
            agent.position,
            grid.width,
            tick,
            Stream::Boundary,
        ));
        (clamp_to_grid(candidate, grid), redraw * TAU)
    };

    Agent {
        id: agent.id,
        position,
        heading: heading.rem_euclid(TAU),
    }
}

/// Write the advanced state of every agent in `current` into `next`.
pub fn update_agents(
    current: &[Agent],
    next: &mut [Agent],
    field: &TrailField,
    params: &SteeringParams,
    mixer: &RandomMixer,
    tick: u64,
) {
    next.par_iter_mut()
        .zip(current.par_iter())
        .for_each(|(out, agent)| *out = advance(agent, field, params, mixer, tick));
}
