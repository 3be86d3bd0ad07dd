//! Leaves: hang from a branch tip, age in color, drop, drift to the
//! ground and decompose.

use glam::Vec2;
use rand::Rng;

use crate::{
    config::TreeParams,
    draw::{DrawPrimitive, Rgba},
    types::BranchId,
};

pub const INITIAL_COLOR: Rgba = Rgba::rgb(27, 141, 87);
pub const INTERMEDIATE_COLOR: Rgba = Rgba::rgb(230, 170, 40);
pub const FINAL_COLOR: Rgba = Rgba::rgb(174, 48, 86);

/// Compost value at which the leaf has turned fully intermediate.
pub const INTERMEDIATE_COMPOST: u32 = 50;
/// Compost value at which the leaf has turned fully final.
pub const FINAL_COMPOST: u32 = 1000;
/// Frames a detached leaf lingers before it is removed.
pub const DECOMPOSITION_TIME: u32 = 1000;

const LEAF_MASS: f32 = 0.5;
const MAX_SIZE: f32 = 50.0;
const MAX_GROWTH_RATE: f32 = 0.2;
const MAX_GRAVITY: f32 = 0.05;
const TURBULENCE: f32 = 0.01;

/// Outcome of [`Leaf::show`] that the owning tree has to react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafEvent {
    None,
    /// The leaf let go of its branch this frame.
    Detached,
}

/// Color of a leaf with the given compost count.
///
/// Three phases: `[0, 50)` green to amber, `[50, 1000)` amber to red,
/// and from 1000 on exactly red.
pub fn compost_color(compost: u32) -> Rgba {
    if compost < INTERMEDIATE_COMPOST {
        let t = compost as f32 / INTERMEDIATE_COMPOST as f32;
        INITIAL_COLOR.lerp(INTERMEDIATE_COLOR, t)
    } else if compost < FINAL_COMPOST {
        let t = (compost - INTERMEDIATE_COMPOST) as f32
            / (FINAL_COMPOST - INTERMEDIATE_COMPOST) as f32;
        INTERMEDIATE_COLOR.lerp(FINAL_COLOR, t)
    } else {
        FINAL_COLOR
    }
}

#[derive(Clone, Debug)]
pub struct Leaf {
    pub branch: BranchId,
    /// Only meaningful once detached; attached leaves are drawn at their
    /// branch tip.
    pub position: Vec2,
    /// `true` while hanging from the branch. Never flips back once cleared.
    pub attached: bool,

    pub current_size: f32,
    pub max_size: f32,
    pub growth_rate: f32,

    pub compost: u32,
    pub time_on_ground: u32,
    pub decomposition_time: u32,
    pub color: Rgba,

    pub color_transition_speed: f32,
    pub drop_leaf_rate: f32,

    pub mass: f32,
    pub velocity: Vec2,
    pub acceleration: Vec2,
}

impl Leaf {
    pub fn new(branch: BranchId, anchor: Vec2, params: &TreeParams, rng: &mut impl Rng) -> Self {
        Self {
            branch,
            position: anchor,
            attached: true,
            current_size: 1.0,
            max_size: MAX_SIZE,
            growth_rate: MAX_GROWTH_RATE * rng.random::<f32>(),
            compost: 0,
            time_on_ground: 0,
            decomposition_time: DECOMPOSITION_TIME,
            color: INITIAL_COLOR,
            color_transition_speed: params.color_change_speed,
            drop_leaf_rate: params.drop_leaf_rate,
            mass: LEAF_MASS,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
        }
    }

    /// Detached and lingered past its decomposition time.
    #[inline]
    pub fn is_decomposed(&self) -> bool {
        !self.attached && self.time_on_ground > self.decomposition_time
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite() && self.current_size.is_finite()
    }

    /// Runs the per-frame lifecycle and emits this leaf's disc.
    ///
    /// `anchor` is the branch tip for this frame. Returns
    /// [`LeafEvent::Detached`] on the frame the leaf lets go, so the tree
    /// can free the branch for a new leaf.
    pub fn show(
        &mut self,
        anchor: Vec2,
        rng: &mut impl Rng,
        out: &mut Vec<DrawPrimitive>,
    ) -> LeafEvent {
        let mut event = LeafEvent::None;
        if self.attached && rng.random::<f32>() < self.drop_leaf_rate {
            self.attached = false;
            self.position = anchor;
            event = LeafEvent::Detached;
        }

        if rng.random::<f32>() < self.color_transition_speed {
            self.compost = self.compost.saturating_add(1);
        }
        self.color = compost_color(self.compost);

        self.current_size = (self.current_size + self.growth_rate).min(self.max_size);

        out.push(DrawPrimitive::Circle {
            center: if self.attached { anchor } else { self.position },
            diameter: self.current_size,
            color: self.color,
        });

        if !self.attached {
            // Fallen leaves keep rotting regardless of the season speed.
            self.compost = self.compost.saturating_add(1);
            self.time_on_ground = self.time_on_ground.saturating_add(1);
        }
        event
    }

    /// Drifts a detached leaf under `force`, gravity and a little
    /// turbulence until it reaches `ground`.
    pub fn physics(&mut self, force: Vec2, ground: f32, rng: &mut impl Rng) {
        if self.attached || self.position.y >= ground {
            return;
        }

        let gravity = Vec2::new(0.0, rng.random_range(0.0..MAX_GRAVITY));
        let turbulence = Vec2::new(
            rng.random_range(-TURBULENCE..TURBULENCE),
            rng.random_range(-TURBULENCE..TURBULENCE),
        );
        self.acceleration = force / self.mass + gravity + turbulence;
        self.velocity += self.acceleration;
        self.position += self.velocity;

        if self.position.y >= ground {
            self.position.y = ground;
            self.velocity = Vec2::ZERO;
        }
    }
}
