//! Smooth scalar fields used to drive the wind.

use noise::{NoiseFn, Perlin};

/// A deterministic, coherent scalar field indexed by `(time, offset)`.
///
/// Implementations must return values in `[0, 1]` and should be continuous
/// in `t`, so that consecutive frames see gently varying wind.
pub trait NoiseField {
    fn sample(&self, t: f32, offset: f32) -> f32;
}

/// Perlin noise remapped from `[-1, 1]` to `[0, 1]`.
#[derive(Clone, Copy, Debug)]
pub struct PerlinField {
    perlin: Perlin,
}

impl PerlinField {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }
}

impl Default for PerlinField {
    fn default() -> Self {
        Self::new(Perlin::DEFAULT_SEED)
    }
}

impl NoiseField for PerlinField {
    fn sample(&self, t: f32, offset: f32) -> f32 {
        let v = self.perlin.get([t as f64, offset as f64]);
        ((v * 0.5 + 0.5) as f32).clamp(0.0, 1.0)
    }
}

/// A field that returns the same value everywhere. Handy for tests and
/// for freezing the wind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantField(pub f32);

impl NoiseField for ConstantField {
    fn sample(&self, _t: f32, _offset: f32) -> f32 {
        self.0.clamp(0.0, 1.0)
    }
}
