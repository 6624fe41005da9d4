use glam::DVec2;

use crate::field::TrailField;

/// Half-width of the square window summed around each sensor point.
pub const SENSOR_RADIUS: i64 = 1;

/// Trail sums seen by the three sensors of one agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub forward: f64,
    pub left: f64,
    pub right: f64,
}

/// Sum of the 3x3 window around the point `offset_distance` ahead of
/// `position` along `heading + angle_offset`. Indices wrap toroidally.
pub fn sense(
    field: &TrailField,
    position: DVec2,
    heading: f64,
    angle_offset: f64,
    offset_distance: f64,
) -> f64 {
    let probe = position + DVec2::from_angle(heading + angle_offset) * offset_distance;
    // Wrap before the integer cast so distant probes cannot saturate.
    let cx = probe.x.floor().rem_euclid(field.width() as f64) as i64;
    let cy = probe.y.floor().rem_euclid(field.height() as f64) as i64;

    let mut sum = 0.0;
    for dy in -SENSOR_RADIUS..=SENSOR_RADIUS {
        for dx in -SENSOR_RADIUS..=SENSOR_RADIUS {
            sum += field.wrapped(cx + dx, cy + dy);
        }
    }
    sum
}

/// Forward, left (`-spacing`) and right (`+spacing`) readings.
pub fn sense_cone(
    field: &TrailField,
    position: DVec2,
    heading: f64,
    spacing: f64,
    offset_distance: f64,
) -> SensorReading {
    SensorReading {
        forward: sense(field, position, heading, 0.0, offset_distance),
        left: sense(field, position, heading, -spacing, offset_distance),
        right: sense(field, position, heading, spacing, offset_distance),
    }
}
