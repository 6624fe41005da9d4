use physarum_common::{AgentSeed, GridSize};
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// How the initial population is laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// Uniformly random position in the grid, uniformly random heading.
    Uniform,
    /// Uniformly random point of a disk centered in the grid, heading toward
    /// the center. `None` uses a third of the smaller grid dimension.
    Disk {
        #[serde(default)]
        radius: Option<f64>,
    },
    /// Caller-supplied positions and headings, one per agent.
    Explicit { agents: Vec<AgentSeed> },
}

impl Default for Placement {
    fn default() -> Self {
        Self::Disk { radius: None }
    }
}

/// Parameters that may change between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringParams {
    /// Displacement per tick, in cells.
    pub speed: f64,
    /// Maximum heading change per tick, radians.
    pub turn_speed: f64,
    /// Angle between the forward sensor and each side sensor, radians.
    pub sensor_angle_spacing: f64,
    /// Distance from the agent to each sensor point, in cells.
    pub sensor_offset_distance: f64,
    /// Blend factor between a cell and its 3x3 mean, in `[0, 1]`.
    pub diffusion_weight: f64,
    /// Amount subtracted from every cell per tick.
    pub decay_rate: f64,
}

impl Default for SteeringParams {
    fn default() -> Self {
        Self {
            speed: 1.0,
            turn_speed: 0.25,
            sensor_angle_spacing: 0.4,
            sensor_offset_distance: 3.0,
            diffusion_weight: 0.2,
            decay_rate: 0.07,
        }
    }
}

impl SteeringParams {
    pub fn validate(&self) -> Result<(), SimError> {
        finite("speed", self.speed)?;
        finite("turn_speed", self.turn_speed)?;
        finite("sensor_angle_spacing", self.sensor_angle_spacing)?;
        finite("sensor_offset_distance", self.sensor_offset_distance)?;
        finite("diffusion_weight", self.diffusion_weight)?;
        if !(0.0..=1.0).contains(&self.diffusion_weight) {
            return Err(SimError::config(
                "diffusion_weight",
                format!("must lie in [0, 1], got {}", self.diffusion_weight),
            ));
        }
        finite("decay_rate", self.decay_rate)?;
        if self.decay_rate < 0.0 {
            return Err(SimError::config(
                "decay_rate",
                format!("must be >= 0, got {}", self.decay_rate),
            ));
        }
        Ok(())
    }
}

/// Full construction-time configuration of a simulation.
///
/// Deserializes with defaults for every missing field, so a config file only
/// needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub width: usize,
    pub height: usize,
    pub agent_count: usize,
    #[serde(flatten)]
    pub steering: SteeringParams,
    /// Upper bound of every published cell.
    pub cap: f64,
    /// Value marking an occupied cell in the deposit layer. Must exceed `cap`.
    pub deposit_sentinel: f64,
    /// Salt for every random draw. `None` uses a fixed default.
    pub seed: Option<u64>,
    pub placement: Placement,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 120,
            height: 120,
            agent_count: 100,
            steering: SteeringParams::default(),
            cap: 1.0,
            deposit_sentinel: 5.0,
            seed: None,
            placement: Placement::default(),
        }
    }
}

impl SimConfig {
    pub fn grid(&self) -> GridSize {
        GridSize::new(self.width, self.height)
    }

    /// Check every field, naming the first offending one.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.width == 0 {
            return Err(SimError::config("width", "must be positive"));
        }
        if self.height == 0 {
            return Err(SimError::config("height", "must be positive"));
        }
        if self.width.checked_mul(self.height).is_none() {
            return Err(SimError::config("width", "width * height overflows"));
        }
        if self.agent_count == 0 {
            return Err(SimError::config("agent_count", "must be positive"));
        }
        self.steering.validate()?;
        finite("cap", self.cap)?;
        if self.cap <= 0.0 {
            return Err(SimError::config("cap", "must be positive"));
        }
        finite("deposit_sentinel", self.deposit_sentinel)?;
        if self.deposit_sentinel <= self.cap {
            return Err(SimError::config(
                "deposit_sentinel",
                format!("must exceed cap {}, got {}", self.cap, self.deposit_sentinel),
            ));
        }
        self.validate_placement()
    }

    fn validate_placement(&self) -> Result<(), SimError> {
        match &self.placement {
            Placement::Uniform => Ok(()),
            Placement::Disk { radius: None } => Ok(()),
            Placement::Disk {
                radius: Some(radius),
            } => {
                if radius.is_finite() && *radius > 0.0 {
                    Ok(())
                } else {
                    Err(SimError::config(
                        "placement",
                        format!("disk radius must be positive, got {radius}"),
                    ))
                }
            }
            Placement::Explicit { agents } => {
                if agents.len() != self.agent_count {
                    return Err(SimError::config(
                        "agent_count",
                        format!(
                            "is {} but explicit placement lists {} agents",
                            self.agent_count,
                            agents.len()
                        ),
                    ));
                }
                let grid = self.grid();
                for (i, seed) in agents.iter().enumerate() {
                    if !seed.heading.is_finite() {
                        return Err(SimError::config(
                            "placement",
                            format!("agent {i} heading is not finite"),
                        ));
                    }
                    if !grid.contains(seed.position) {
                        return Err(SimError::config(
                            "placement",
                            format!(
                                "agent {i} at ({}, {}) lies outside the {}x{} grid",
                                seed.position.x, seed.position.y, self.width, self.height
                            ),
                        ));
                    }
                }
                Ok(())
            }
        }
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), SimError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::config(field, format!("must be finite, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn offending_field(config: &SimConfig) -> &'static str {
        match config.validate() {
            Err(SimError::InvalidConfiguration { field, .. }) => field,
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_dimensions_name_the_field() {
        let mut c = SimConfig::default();
        c.width = 0;
        assert_eq!(offending_field(&c), "width");

        let mut c = SimConfig::default();
        c.height = 0;
        assert_eq!(offending_field(&c), "height");

        let mut c = SimConfig::default();
        c.agent_count = 0;
        assert_eq!(offending_field(&c), "agent_count");
    }

    #[test]
    fn diffusion_weight_must_be_a_fraction() {
        let mut c = SimConfig::default();
        c.steering.diffusion_weight = 1.5;
        assert_eq!(offending_field(&c), "diffusion_weight");
        c.steering.diffusion_weight = -0.1;
        assert_eq!(offending_field(&c), "diffusion_weight");
        c.steering.diffusion_weight = 0.0;
        assert!(c.validate().is_ok());
        c.steering.diffusion_weight = 1.0;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn negative_decay_rejected() {
        let mut c = SimConfig::default();
        c.steering.decay_rate = -0.01;
        assert_eq!(offending_field(&c), "decay_rate");
    }

    #[test]
    fn non_finite_parameters_rejected() {
        let mut c = SimConfig::default();
        c.steering.speed = f64::NAN;
        assert_eq!(offending_field(&c), "speed");

        let mut c = SimConfig::default();
        c.steering.turn_speed = f64::INFINITY;
        assert_eq!(offending_field(&c), "turn_speed");
    }

    #[test]
    fn sentinel_must_exceed_cap() {
        let mut c = SimConfig::default();
        c.deposit_sentinel = 1.0;
        assert_eq!(offending_field(&c), "deposit_sentinel");
    }

    #[test]
    fn explicit_placement_checks_count_and_bounds() {
        let mut c = SimConfig {
            width: 4,
            height: 4,
            agent_count: 2,
            placement: Placement::Explicit {
                agents: vec![AgentSeed {
                    position: DVec2::new(1.0, 1.0),
                    heading: 0.0,
                }],
            },
            ..SimConfig::default()
        };
        assert_eq!(offending_field(&c), "agent_count");

        c.agent_count = 1;
        assert!(c.validate().is_ok());

        c.placement = Placement::Explicit {
            agents: vec![AgentSeed {
                position: DVec2::new(4.0, 1.0),
                heading: 0.0,
            }],
        };
        assert_eq!(offending_field(&c), "placement");
    }

    #[test]
    fn disk_radius_must_be_positive() {
        let c = SimConfig {
            placement: Placement::Disk { radius: Some(0.0) },
            ..SimConfig::default()
        };
        assert_eq!(offending_field(&c), "placement");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c: SimConfig = serde_json::from_str(
            r#"{ "width": 64, "decay_rate": 0.01, "placement": { "kind": "uniform" } }"#,
        )
        .unwrap();
        assert_eq!(c.width, 64);
        assert_eq!(c.height, 120);
        assert_eq!(c.steering.decay_rate, 0.01);
        assert_eq!(c.steering.speed, 1.0);
        assert_eq!(c.placement, Placement::Uniform);
    }

    #[test]
    fn json_roundtrip_preserves_explicit_agents() {
        let c = SimConfig {
            width: 8,
            height: 8,
            agent_count: 1,
            seed: Some(9),
            placement: Placement::Explicit {
                agents: vec![AgentSeed {
                    position: DVec2::new(2.5, 3.5),
                    heading: 1.0,
                }],
            },
            ..SimConfig::default()
        };
        let text = serde_json::to_string(&c).unwrap();
        let back: SimConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, c);
    }
}
