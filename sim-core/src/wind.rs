//! Wind model: one global gust field plus per-tree and per-branch
//! perturbations sampled from the same [`NoiseField`].

use std::f32::consts::{FRAC_PI_4, TAU};

use glam::Vec2;
use rand::Rng;

use crate::noise_field::NoiseField;

/// Strength scale of the global wind.
pub const GLOBAL_WIND_STRENGTH: f32 = 0.005;
/// Strength scale of per-tree and per-branch wind.
pub const LOCAL_WIND_STRENGTH: f32 = 0.001;
/// Noise offset of the global wind angle channel.
const GLOBAL_ANGLE_OFFSET: f32 = 1000.0;
const MIN_GLOBAL_ANGLE: f32 = FRAC_PI_4;
const MAX_GLOBAL_ANGLE: f32 = 3.0 * FRAC_PI_4;

/// A pair of fixed noise offsets giving an entity its own wind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindSource {
    pub strength_offset: f32,
    pub angle_offset: f32,
}

impl WindSource {
    pub fn new(strength_offset: f32, angle_offset: f32) -> Self {
        Self {
            strength_offset,
            angle_offset,
        }
    }

    /// Offsets drawn uniformly from `[0, 1000)`.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::new(rng.random_range(0.0..1000.0), rng.random_range(0.0..1000.0))
    }

    /// Wind vector at time `t`: a full-circle angle and a strength of
    /// `noise * scale`.
    pub fn sample(&self, t: f32, field: &impl NoiseField, scale: f32) -> Vec2 {
        let strength = field.sample(t, self.strength_offset) * scale;
        let angle = field.sample(t, self.angle_offset) * TAU;
        Vec2::from_angle(angle) * strength
    }
}

/// Forest-wide wind at time `t`.
///
/// The angle is confined to `[π/4, 3π/4]` so gusts keep a consistent
/// overall heading instead of spinning around.
pub fn global_wind(t: f32, field: &impl NoiseField) -> Vec2 {
    let strength = field.sample(t, 0.0) * GLOBAL_WIND_STRENGTH;
    let n = field.sample(t, GLOBAL_ANGLE_OFFSET);
    let angle = MIN_GLOBAL_ANGLE + n * (MAX_GLOBAL_ANGLE - MIN_GLOBAL_ANGLE);
    Vec2::from_angle(angle) * strength
}
