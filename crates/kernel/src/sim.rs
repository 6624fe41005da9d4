use physarum_common::{Agent, AgentId};
use serde::{Deserialize, Serialize};

use crate::agents::AgentStore;
use crate::blend;
use crate::buffer::DoubleBuffer;
use crate::config::{SimConfig, SteeringParams};
use crate::deposit;
use crate::diffusion;
use crate::error::SimError;
use crate::field::{FieldSnapshot, Fnv1a, TrailField};
use crate::mixer::RandomMixer;
use crate::motion;

/// Lifecycle of a [`Simulation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimState {
    /// Constructed or reset; no tick executed yet.
    Idle,
    /// At least one tick published; more may follow.
    Running,
    /// Terminal. The last published field stays readable.
    Stopped,
}

/// The tick orchestrator.
///
/// Owns both double buffers, the scratch layers and the mixer. A tick is a
/// pure function of the previous tick's agents and field: motion reads the
/// previous field and agents, deposit and diffusion each fill their own
/// layer, and the blend writes the back field buffer before both buffers
/// swap. Callers only ever see owned snapshots.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    state: SimState,
    tick: u64,
    mixer: RandomMixer,
    agents: AgentStore,
    field: DoubleBuffer<TrailField>,
    deposit_layer: Vec<f64>,
    diffused_layer: TrailField,
}

impl Simulation {
    /// Validate `config` and lay out the initial population on an empty field.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let grid = config.grid();
        let mixer = RandomMixer::from_optional_seed(config.seed);
        let agents = AgentStore::place(&config, &mixer);
        let empty = TrailField::new(grid);

        tracing::info!(
            width = grid.width,
            height = grid.height,
            agents = agents.len(),
            seed = ?config.seed,
            "simulation initialized"
        );

        Ok(Self {
            state: SimState::Idle,
            tick: 0,
            mixer,
            agents,
            field: DoubleBuffer::new(empty.clone()),
            deposit_layer: vec![0.0; grid.cell_count()],
            diffused_layer: empty,
            config,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    /// Number of ticks published since construction or the last reset.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Advance one step and publish the new field.
    pub fn tick(&mut self) -> Result<FieldSnapshot, SimError> {
        if self.state == SimState::Stopped {
            return Err(SimError::InvalidState {
                state: self.state,
                operation: "tick",
            });
        }
        self.state = SimState::Running;

        let tick = self.tick;
        let _span = tracing::debug_span!("tick", tick).entered();
        let grid = self.config.grid();
        let params = self.config.steering;

        {
            let _stage = tracing::trace_span!("sensing_moving").entered();
            let (cur_agents, next_agents) = self.agents.split();
            motion::update_agents(
                cur_agents,
                next_agents,
                self.field.current(),
                &params,
                &self.mixer,
                tick,
            );
        }
        self.agents.swap();

        {
            let _stage = tracing::trace_span!("depositing").entered();
            deposit::rasterize(
                self.agents.current(),
                grid,
                self.config.deposit_sentinel,
                &mut self.deposit_layer,
            );
        }

        {
            let _stage = tracing::trace_span!("diffusing").entered();
            diffusion::diffuse_and_decay(
                self.field.current(),
                params.diffusion_weight,
                params.decay_rate,
                &mut self.diffused_layer,
            );
        }

        {
            let _stage = tracing::trace_span!("blending").entered();
            let (_, next_field) = self.field.split();
            blend::composite(
                &self.deposit_layer,
                self.diffused_layer.cells(),
                self.config.cap,
                next_field.cells_mut(),
            );
        }
        self.field.swap();
        self.tick += 1;

        let published = self.field.current();
        tracing::debug!(
            tick = self.tick,
            mass = published.mass(),
            peak = published.peak(),
            "tick published"
        );
        Ok(FieldSnapshot::capture(self.tick, published))
    }

    /// Run `ticks` ticks and return the last published snapshot, or the
    /// current one when `ticks` is zero.
    pub fn run(&mut self, ticks: u64) -> Result<FieldSnapshot, SimError> {
        let mut last = self.field_snapshot();
        for _ in 0..ticks {
            last = self.tick()?;
        }
        Ok(last)
    }

    /// Copy of the most recently published field.
    pub fn field_snapshot(&self) -> FieldSnapshot {
        FieldSnapshot::capture(self.tick, self.field.current())
    }

    /// Copy of every agent's current state, ordered by id.
    pub fn agent_snapshot(&self) -> Vec<Agent> {
        self.agents.snapshot()
    }

    pub fn agent(&self, id: AgentId) -> Option<Agent> {
        self.agents.get(id).copied()
    }

    /// Replace the field the first tick will read. Only allowed while idle.
    pub fn seed_field(&mut self, field: TrailField) -> Result<(), SimError> {
        if self.state != SimState::Idle {
            return Err(SimError::InvalidState {
                state: self.state,
                operation: "seed the field",
            });
        }
        if field.grid() != self.config.grid() {
            return Err(SimError::config(
                "field",
                format!(
                    "is {}x{} but the grid is {}x{}",
                    field.width(),
                    field.height(),
                    self.config.width,
                    self.config.height
                ),
            ));
        }
        let cap = self.config.cap;
        if let Some(v) = field.cells().iter().find(|v| **v > cap) {
            return Err(SimError::config(
                "field",
                format!("holds {v}, above cap {cap}"),
            ));
        }
        *self.field.current_mut() = field;
        Ok(())
    }

    /// Swap in new steering, diffusion and decay parameters. They take effect
    /// from the next tick.
    pub fn update_params(&mut self, params: SteeringParams) -> Result<(), SimError> {
        if self.state == SimState::Stopped {
            return Err(SimError::InvalidState {
                state: self.state,
                operation: "update parameters",
            });
        }
        params.validate()?;
        tracing::debug!(?params, "parameters updated");
        self.config.steering = params;
        Ok(())
    }

    /// Enter the terminal state. Idempotent.
    pub fn stop(&mut self) {
        if self.state != SimState::Stopped {
            tracing::info!(tick = self.tick, "simulation stopped");
            self.state = SimState::Stopped;
        }
    }

    /// Reinitialize from `config`, back to `Idle`. On error the simulation is
    /// left untouched.
    pub fn reset(&mut self, config: SimConfig) -> Result<(), SimError> {
        *self = Self::new(config)?;
        tracing::info!("simulation reset");
        Ok(())
    }

    /// FNV-1a over the tick, the published field and every agent, bit-exact.
    pub fn state_hash(&self) -> u64 {
        let mut h = Fnv1a::new();
        h.write(&self.tick.to_le_bytes());
        for c in self.field.current().cells() {
            h.write(&c.to_bits().to_le_bytes());
        }
        for a in self.agents.current() {
            h.write(&a.id.0.to_le_bytes());
            h.write(&a.position.x.to_bits().to_le_bytes());
            h.write(&a.position.y.to_bits().to_le_bytes());
            h.write(&a.heading.to_bits().to_le_bytes());
        }
        h.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Placement;
    use crate::mixer::{Stream, position_key};
    use crate::motion::BOUNDARY_MARGIN;
    use glam::DVec2;
    use physarum_common::AgentSeed;
    use std::f64::consts::TAU;

    fn single_agent(width: usize, height: usize, position: DVec2, heading: f64) -> SimConfig {
        SimConfig {
            width,
            height,
            agent_count: 1,
            placement: Placement::Explicit {
                agents: vec![AgentSeed { position, heading }],
            },
            ..SimConfig::default()
        }
    }

    fn busy_config(seed: u64) -> SimConfig {
        SimConfig {
            width: 48,
            height: 32,
            agent_count: 400,
            seed: Some(seed),
            placement: Placement::Uniform,
            ..SimConfig::default()
        }
    }

    #[test]
    fn starts_idle_and_runs() {
        let mut sim = Simulation::new(busy_config(1)).unwrap();
        assert_eq!(sim.state(), SimState::Idle);
        assert_eq!(sim.tick_count(), 0);
        let snap = sim.tick().unwrap();
        assert_eq!(sim.state(), SimState::Running);
        assert_eq!(snap.tick, 1);
        assert_eq!(snap.len(), 48 * 32);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = Simulation::new(SimConfig {
            height: 0,
            ..SimConfig::default()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidConfiguration {
                field: "height",
                ..
            }
        ));
    }

    #[test]
    fn distant_sensors_tick_cleanly() {
        let mut config = busy_config(3);
        config.width = 8;
        config.height = 8;
        config.agent_count = 1;
        config.steering.sensor_offset_distance = 1e19;
        config.validate().unwrap();
        let mut sim = Simulation::new(config).unwrap();
        let snap = sim.run(5).unwrap();
        assert_eq!(snap.tick, 5);
        assert!(snap.cells().iter().all(|c| (0.0..=1.0).contains(c)));
    }

    #[test]
    fn end_to_end_single_agent() {
        let mut config = single_agent(4, 4, DVec2::ZERO, 0.0);
        config.steering.speed = 1.0;
        config.steering.decay_rate = 0.0;
        config.steering.diffusion_weight = 0.0;
        let mut sim = Simulation::new(config).unwrap();

        let snap = sim.tick().unwrap();
        let agent = sim.agent_snapshot()[0];
        assert_eq!(agent.position, DVec2::new(1.0, 0.0));
        assert_eq!(sim.deposit_layer[1], 5.0);
        assert_eq!(
            sim.deposit_layer.iter().filter(|v| **v != 0.0).count(),
            1
        );
        assert!(snap.get(1, 0) > 0.0);
        for y in 0..4 {
            for x in 0..4 {
                if (x, y) != (1, 0) {
                    assert_eq!(snap.get(x, y), 0.0, "cell ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn boundary_rerandomizes_heading() {
        let (w, h) = (16usize, 10usize);
        let start = DVec2::new(w as f64 - 0.5, h as f64 / 2.0);
        let mut config = single_agent(w, h, start, 0.0);
        config.seed = Some(21);
        let mut sim = Simulation::new(config).unwrap();
        sim.tick().unwrap();

        let agent = sim.agent_snapshot()[0];
        assert!(agent.position.x <= w as f64 - BOUNDARY_MARGIN);
        let mixer = RandomMixer::new(21);
        let expected = mixer.unit(position_key(start, w, 0, Stream::Boundary)) * TAU;
        assert_eq!(agent.heading, expected);
    }

    #[test]
    fn deposit_overrides_decayed_background() {
        let mut config = single_agent(8, 8, DVec2::new(2.5, 2.5), 0.0);
        config.steering.decay_rate = 0.1;
        let mut sim = Simulation::new(config).unwrap();
        let mut field = TrailField::new(sim.config().grid());
        field.fill(0.6);
        sim.seed_field(field).unwrap();

        let snap = sim.tick().unwrap();
        // Agent moved to (3.5, 2.5); background decays to 0.5 elsewhere.
        assert_eq!(snap.get(3, 2), 1.0);
        assert!((snap.get(0, 0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn bounds_and_range_hold_over_many_ticks() {
        let mut config = busy_config(3);
        config.steering.speed = 2.7;
        let mut sim = Simulation::new(config).unwrap();
        for _ in 0..60 {
            let snap = sim.tick().unwrap();
            assert!(snap.cells().iter().all(|v| (0.0..=1.0).contains(v)));
            for a in sim.agent_snapshot() {
                assert!(a.position.x >= 0.0 && a.position.x < 48.0, "{a:?}");
                assert!(a.position.y >= 0.0 && a.position.y < 32.0, "{a:?}");
                assert!(a.heading.is_finite());
            }
        }
    }

    #[test]
    fn identical_configs_are_bit_identical() {
        let mut a = Simulation::new(busy_config(42)).unwrap();
        let mut b = Simulation::new(busy_config(42)).unwrap();
        for _ in 0..40 {
            let sa = a.tick().unwrap();
            let sb = b.tick().unwrap();
            assert_eq!(sa.content_hash(), sb.content_hash());
        }
        assert_eq!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = Simulation::new(busy_config(1)).unwrap();
        let mut b = Simulation::new(busy_config(2)).unwrap();
        a.run(5).unwrap();
        b.run(5).unwrap();
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn thread_count_does_not_change_results() {
        let mut global = Simulation::new(busy_config(9)).unwrap();
        let expected = global.run(25).unwrap();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap();
        let single = pool.install(|| {
            let mut sim = Simulation::new(busy_config(9)).unwrap();
            sim.run(25).unwrap()
        });
        assert_eq!(expected.content_hash(), single.content_hash());
    }

    #[test]
    fn stopped_rejects_ticks_but_stays_readable() {
        let mut sim = Simulation::new(busy_config(5)).unwrap();
        let last = sim.run(3).unwrap();
        sim.stop();
        assert_eq!(sim.state(), SimState::Stopped);
        assert!(matches!(
            sim.tick(),
            Err(SimError::InvalidState {
                state: SimState::Stopped,
                ..
            })
        ));
        assert_eq!(sim.field_snapshot(), last);
        assert!(sim.update_params(SteeringParams::default()).is_err());
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut sim = Simulation::new(busy_config(5)).unwrap();
        sim.run(4).unwrap();
        sim.stop();
        sim.reset(busy_config(6)).unwrap();
        assert_eq!(sim.state(), SimState::Idle);
        assert_eq!(sim.tick_count(), 0);
        assert_eq!(sim.field_snapshot().cells().iter().sum::<f64>(), 0.0);
        assert!(sim.tick().is_ok());
    }

    #[test]
    fn failed_reset_keeps_state() {
        let mut sim = Simulation::new(busy_config(5)).unwrap();
        sim.run(2).unwrap();
        let before = sim.state_hash();
        let bad = SimConfig {
            agent_count: 0,
            ..SimConfig::default()
        };
        assert!(sim.reset(bad).is_err());
        assert_eq!(sim.state_hash(), before);
        assert_eq!(sim.state(), SimState::Running);
    }

    #[test]
    fn seed_field_only_while_idle() {
        let mut sim = Simulation::new(busy_config(5)).unwrap();
        let grid = sim.config().grid();
        assert!(sim.seed_field(TrailField::new(grid)).is_ok());
        let wrong = TrailField::new(physarum_common::GridSize::new(3, 3));
        assert!(sim.seed_field(wrong).is_err());
        let mut hot = TrailField::new(grid);
        hot.set(0, 0, 2.0);
        assert!(sim.seed_field(hot).is_err());
        sim.tick().unwrap();
        assert!(matches!(
            sim.seed_field(TrailField::new(grid)),
            Err(SimError::InvalidState { .. })
        ));
    }

    #[test]
    fn update_params_applies_next_tick() {
        let mut config = single_agent(16, 16, DVec2::new(4.0, 4.0), 0.0);
        config.steering.speed = 1.0;
        let mut sim = Simulation::new(config).unwrap();
        sim.tick().unwrap();
        assert_eq!(sim.agent_snapshot()[0].position, DVec2::new(5.0, 4.0));

        let faster = SteeringParams {
            speed: 3.0,
            ..sim.config().steering
        };
        sim.update_params(faster).unwrap();
        sim.tick().unwrap();
        let p = sim.agent_snapshot()[0].position;
        assert_eq!(p.y, 4.0);
        assert!((p.x - 8.0).abs() < 1e-12);

        let bad = SteeringParams {
            decay_rate: -1.0,
            ..faster
        };
        assert!(sim.update_params(bad).is_err());
        assert_eq!(sim.config().steering, faster);
    }

    #[test]
    fn run_zero_returns_current_snapshot() {
        let mut sim = Simulation::new(busy_config(8)).unwrap();
        let snap = sim.run(0).unwrap();
        assert_eq!(snap.tick, 0);
        assert_eq!(sim.state(), SimState::Idle);
    }
}
