//! A single swaying segment of a tree skeleton.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4, FRAC_PI_6, FRAC_PI_8};

use glam::Vec2;
use rand::Rng;
use tracing::warn;

use crate::{
    draw::{DrawPrimitive, Rgba},
    noise_field::NoiseField,
    types::BranchId,
    wind::{LOCAL_WIND_STRENGTH, WindSource},
};

/// Mass ratio between a child branch and its parent.
pub const CHILD_MASS_RATIO: f32 = 0.8;
/// Spring constant pulling displacement back to rest.
pub const SPRING_CONSTANT: f32 = -0.001;
/// Cap on how far a branch tip may sway from rest.
pub const MAX_DISPLACEMENT: f32 = 10.0;
/// Stroke width of a branch with mass 1.
const BASE_STROKE_WIDTH: f32 = 15.0;

/// How one child is derived from its parent: rotate the parent direction
/// by `angle` and scale it by `length_scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BranchRule {
    pub angle: f32,
    pub length_scale: f32,
}

impl BranchRule {
    /// The three rules every branch carries: a long child on each side and
    /// a shorter one roughly straight ahead.
    fn random_set(rng: &mut impl Rng) -> [BranchRule; 3] {
        [
            BranchRule {
                angle: rng.random_range(FRAC_PI_8..FRAC_PI_4),
                length_scale: rng.random_range(0.6..0.8),
            },
            BranchRule {
                angle: -rng.random_range(FRAC_PI_8..FRAC_PI_4),
                length_scale: rng.random_range(0.6..0.8),
            },
            BranchRule {
                angle: rng.random_range(-FRAC_PI_6..FRAC_PI_6),
                length_scale: rng.random_range(0.4..0.6),
            },
        ]
    }
}

#[derive(Clone, Debug)]
pub struct Branch {
    pub begin: Vec2,
    pub end: Vec2,
    pub parent: Option<BranchId>,
    pub mass: f32,

    pub growth: f32,
    pub growth_rate: f32,
    pub limit: f32,
    pub growing: bool,

    pub displacement: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub current_end: Vec2,
    /// Where the tip is this frame; children and leaves attach here.
    pub real_end: Vec2,

    /// Set once this branch has produced its children.
    pub finished: bool,
    /// Set while a leaf hangs from the tip.
    pub has_leaf: bool,

    pub rules: [BranchRule; 3],
    pub wind: WindSource,
    pub max_displacement: f32,
}

impl Branch {
    pub fn new_root(begin: Vec2, end: Vec2, growth_rate: f32, rng: &mut impl Rng) -> Self {
        Self::new(begin, end, None, 1.0, growth_rate, rng)
    }

    pub fn new_child(
        begin: Vec2,
        end: Vec2,
        parent: BranchId,
        mass: f32,
        growth_rate: f32,
        rng: &mut impl Rng,
    ) -> Self {
        Self::new(begin, end, Some(parent), mass, growth_rate, rng)
    }

    fn new(
        begin: Vec2,
        end: Vec2,
        parent: Option<BranchId>,
        mass: f32,
        growth_rate: f32,
        rng: &mut impl Rng,
    ) -> Self {
        Self {
            begin,
            end,
            parent,
            mass,
            growth: 0.0,
            growth_rate,
            limit: rng.random_range(FRAC_PI_3..FRAC_PI_2),
            growing: true,
            displacement: Vec2::ZERO,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            current_end: begin,
            real_end: begin,
            finished: false,
            has_leaf: false,
            rules: BranchRule::random_set(rng),
            wind: WindSource::random(rng),
            max_displacement: MAX_DISPLACEMENT,
        }
    }

    /// Target vector from `begin` to `end`. Its length never changes.
    #[inline]
    pub fn reach(&self) -> Vec2 {
        self.end - self.begin
    }

    #[inline]
    pub fn stroke_width(&self) -> f32 {
        self.mass.powi(3) * BASE_STROKE_WIDTH
    }

    /// Eased share of the reach currently revealed, before the outer sine.
    ///
    /// While growing this is `1 + sin(growth - π/2)`, an ease-in from 0.
    /// Once grown it is `sin(growth)`, constant since growth has stopped.
    pub fn revealed_fraction(&self) -> f32 {
        if self.growing {
            1.0 + (self.growth - FRAC_PI_2).sin()
        } else {
            self.growth.sin()
        }
    }

    /// Advances the growth animation and emits this branch's line.
    ///
    /// `anchor` is the parent's `real_end` for this frame, or `begin` for
    /// the root; a growing child is laid out from there so it follows the
    /// parent's sway.
    pub fn grow(&mut self, anchor: Vec2, out: &mut Vec<DrawPrimitive>) {
        if self.growth <= self.limit {
            self.growth += self.growth_rate;
            self.current_end = anchor + self.reach() * self.revealed_fraction().sin();
        } else {
            self.growing = false;
        }

        self.real_end = self.current_end + self.displacement;
        out.push(DrawPrimitive::Line {
            from: anchor,
            to: self.real_end,
            stroke_width: self.stroke_width(),
            color: Rgba::WHITE,
        });
    }

    /// Integrates one step of wind-driven spring motion.
    ///
    /// The spring is deliberately under-damped so the branch keeps swaying.
    pub fn physics(&mut self, global_wind: Vec2, t: f32, field: &impl NoiseField) {
        let wind = global_wind + self.wind.sample(t, field, LOCAL_WIND_STRENGTH);

        self.acceleration = wind / self.mass;
        self.velocity += self.acceleration + self.displacement * SPRING_CONSTANT;
        self.displacement += self.velocity;
        self.displacement = self.displacement.clamp_length_max(self.max_displacement);

        if !self.displacement.is_finite() || !self.velocity.is_finite() {
            warn!(
                displacement = ?self.displacement,
                velocity = ?self.velocity,
                "non-finite branch motion, resetting to rest"
            );
            self.settle();
        }

        self.current_end = self.begin + self.reach();
        self.real_end = self.current_end + self.displacement;
    }

    /// Drops all motion state.
    pub fn settle(&mut self) {
        self.displacement = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
        self.acceleration = Vec2::ZERO;
    }

    /// Creates the three children described by [`Branch::rules`], each
    /// rooted at this branch's `end`.
    ///
    /// `id` is this branch's own index in the arena, recorded as the
    /// children's parent.
    pub fn branch_out(&self, id: BranchId, rng: &mut impl Rng) -> [Branch; 3] {
        let reach = self.reach();
        let mass = self.mass * CHILD_MASS_RATIO;
        self.rules.map(|rule| {
            let dir = Vec2::from_angle(rule.angle).rotate(reach) * rule.length_scale;
            Branch::new_child(self.end, self.end + dir, id, mass, self.growth_rate, rng)
        })
    }
}
