//! Deterministic, stateless randomness keyed by agent identity and position.
//!
//! Every draw is a pure function of its key, so agents can be updated in
//! parallel in any order and still reproduce the same run.

use glam::DVec2;

/// Seed used when the configuration does not provide one.
pub const DEFAULT_SEED: u64 = 0x0000_5eed_f00d_cafe;

/// Which consumer a key belongs to. Folded into the key so that the
/// steering and boundary draws of one agent never coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum Stream {
    Steer = 1,
    Boundary = 2,
    PlaceX = 3,
    PlaceY = 4,
    PlaceHeading = 5,
}

/// Avalanche hash of a 64-bit key.
///
/// XOR with an odd constant, then three multiply/xor-shift rounds, so a
/// single flipped input bit changes about half of the output bits.
pub fn avalanche(key: u64) -> u64 {
    let mut z = key ^ 0x0000_0000_a3c5_9ac3;
    z = z.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    z ^= z >> 30;
    z = z.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z ^= z >> 27;
    z = z.wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Maps a hash to `[0, 1)` using its top 53 bits.
fn to_unit(hash: u64) -> f64 {
    (hash >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Pure `[0, 1)` draw for `key`, unsalted.
pub fn mix(key: u64) -> f64 {
    to_unit(avalanche(key))
}

/// Salted view over [`mix`]. Holds no mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomMixer {
    salt: u64,
}

impl RandomMixer {
    pub fn new(seed: u64) -> Self {
        Self {
            salt: avalanche(seed),
        }
    }

    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        Self::new(seed.unwrap_or(DEFAULT_SEED))
    }

    /// Draw in `[0, 1)`. Same key, same value.
    pub fn unit(&self, key: u64) -> f64 {
        mix(key ^ self.salt)
    }

    /// Draw in `[lo, hi)`.
    pub fn range(&self, key: u64, lo: f64, hi: f64) -> f64 {
        lo + self.unit(key) * (hi - lo)
    }
}

/// Key for draws made by motion or boundary logic: the rounded cell the
/// agent occupies, folded with the tick counter.
pub fn position_key(position: DVec2, width: usize, tick: u64, stream: Stream) -> u64 {
    let x = position.x.round().max(0.0) as u64;
    let y = position.y.round().max(0.0) as u64;
    let cell = y.wrapping_mul(width as u64).wrapping_add(x);
    fold(cell, tick, stream)
}

/// Key for draws made per agent independently of position.
pub fn agent_key(id: u64, stream: Stream) -> u64 {
    fold(id, 0, stream)
}

fn fold(base: u64, lane: u64, stream: Stream) -> u64 {
    avalanche(base ^ lane.rotate_left(29)) ^ ((stream as u64) << 58)
}
