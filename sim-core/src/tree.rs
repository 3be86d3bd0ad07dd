use glam::Vec2;
use rand::Rng;
use tracing::{debug, warn};

use crate::{
    branch::Branch,
    config::{Config, TreeParams},
    draw::DrawPrimitive,
    leaf::{Leaf, LeafEvent},
    noise_field::NoiseField,
    types::BranchId,
    wind::{LOCAL_WIND_STRENGTH, WindSource},
};

/// One tree: a pre-built branch skeleton plus the leaves living on it.
///
/// Branches are stored in a flat arena in construction order, so every
/// parent precedes its children. The per-frame update relies on that
/// order to read each parent's fresh `real_end`.
#[derive(Debug)]
pub struct BranchTree {
    branches: Vec<Branch>,
    leaves: Vec<Leaf>,
    params: TreeParams,
    wind: WindSource,
    wind_multiplier: f32,
}

impl BranchTree {
    /// Builds a tree standing at `origin` with a random number of
    /// branching passes drawn from the config's iteration range.
    pub fn new(origin: Vec2, trunk_length: f32, cfg: &Config, rng: &mut impl Rng) -> Self {
        let max = cfg.max_iterations.max(cfg.min_iterations + 1);
        let iterations = rng.random_range(cfg.min_iterations..max);
        Self::with_iterations(origin, trunk_length, iterations, cfg, rng)
    }

    /// Builds a tree with exactly `iterations` branching passes, giving
    /// `3^0 + 3^1 + ... + 3^iterations` branches.
    pub fn with_iterations(
        origin: Vec2,
        trunk_length: f32,
        iterations: usize,
        cfg: &Config,
        rng: &mut impl Rng,
    ) -> Self {
        // The canvas y axis points down, so "up" is negative y.
        let top = origin - Vec2::new(0.0, trunk_length);
        let root = Branch::new_root(origin, top, cfg.growth_rate, rng);

        let mut tree = Self {
            branches: vec![root],
            leaves: Vec::new(),
            params: cfg.tree,
            wind: WindSource::random(rng),
            wind_multiplier: rng.random_range(0.5..2.0),
        };
        for _ in 0..iterations {
            tree.branching_pass(rng);
        }

        debug!(
            x = origin.x,
            y = origin.y,
            trunk_length,
            iterations,
            branches = tree.branches.len(),
            "built tree"
        );
        tree
    }

    /// Branches out every unfinished branch once and appends the children.
    fn branching_pass(&mut self, rng: &mut impl Rng) {
        let count = self.branches.len();
        for id in 0..count {
            if self.branches[id].finished {
                continue;
            }
            let children = self.branches[id].branch_out(id, rng);
            self.branches[id].finished = true;
            self.branches.extend(children);
        }
    }

    pub fn root(&self) -> &Branch {
        &self.branches[0]
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn leaves_mut(&mut self) -> &mut Vec<Leaf> {
        &mut self.leaves
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut TreeParams {
        &mut self.params
    }

    /// This tree's own wind at time `t`, before the global wind is added.
    pub fn tree_wind(&self, t: f32, field: &impl NoiseField) -> Vec2 {
        self.wind.sample(t, field, LOCAL_WIND_STRENGTH) * self.wind_multiplier
    }

    /// Where branch `id` is anchored this frame: its parent's tip, or its
    /// own base for the root.
    fn anchor_of(&self, id: BranchId) -> Vec2 {
        let branch = &self.branches[id];
        match branch.parent {
            Some(parent) => self.branches[parent].real_end,
            None => branch.begin,
        }
    }

    /// Advances the whole tree by one frame and appends its drawing to
    /// `out`.
    ///
    /// Branches update in arena order (grow, then physics, then maybe
    /// sprout a leaf), then every leaf shows and drifts, then fully
    /// decomposed leaves are dropped.
    pub fn grow_and_show(
        &mut self,
        global_wind: Vec2,
        t: f32,
        field: &impl NoiseField,
        ground: f32,
        rng: &mut impl Rng,
        out: &mut Vec<DrawPrimitive>,
    ) {
        let wind = global_wind + self.tree_wind(t, field);

        for id in 0..self.branches.len() {
            let anchor = self.anchor_of(id);
            let branch = &mut self.branches[id];
            branch.grow(anchor, out);
            branch.physics(wind, t, field);

            let bare_tip = !branch.finished && !branch.growing && !branch.has_leaf;
            if bare_tip && rng.random::<f32>() < self.params.leaf_spawn_rate {
                branch.has_leaf = true;
                let leaf = Leaf::new(id, branch.real_end, &self.params, rng);
                self.leaves.push(leaf);
            }
        }

        for leaf in &mut self.leaves {
            leaf.color_transition_speed = self.params.color_change_speed;
            leaf.drop_leaf_rate = self.params.drop_leaf_rate;

            let anchor = self.branches[leaf.branch].real_end;
            if leaf.show(anchor, rng, out) == LeafEvent::Detached {
                self.branches[leaf.branch].has_leaf = false;
            }
            leaf.physics(wind, ground, rng);
        }

        self.remove_spent_leaves();
    }

    /// Like [`BranchTree::grow_and_show`], returning a fresh primitive list.
    pub fn advance(
        &mut self,
        global_wind: Vec2,
        t: f32,
        field: &impl NoiseField,
        ground: f32,
        rng: &mut impl Rng,
    ) -> Vec<DrawPrimitive> {
        let mut out = Vec::with_capacity(self.branches.len() + self.leaves.len());
        self.grow_and_show(global_wind, t, field, ground, rng, &mut out);
        out
    }

    /// Drops decomposed leaves, and any leaf whose state went non-finite.
    fn remove_spent_leaves(&mut self) {
        let branches = &mut self.branches;
        self.leaves.retain(|leaf| {
            if !leaf.is_finite() {
                warn!(branch = leaf.branch, position = ?leaf.position, "dropping non-finite leaf");
                if leaf.attached {
                    branches[leaf.branch].has_leaf = false;
                }
                return false;
            }
            !leaf.is_decomposed()
        });
    }
}
