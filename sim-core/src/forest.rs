//! The top-level collection of trees and its season controls.

use glam::Vec2;
use rand::Rng;
use tracing::{debug, warn};

use crate::{
    config::{Config, MAX_TREES, TreeParams},
    draw::DrawPrimitive,
    noise_field::NoiseField,
    tree::BranchTree,
    wind,
};

/// Drop rate used by [`Forest::shed_leaves`].
pub const SHEDDING_DROP_RATE: f32 = 0.05;
/// Color speed used by [`Forest::fast_aging`].
pub const FAST_COLOR_CHANGE_SPEED: f32 = 1.0;

/// Owns every tree on the canvas and drives them frame by frame.
///
/// All mutation goes through methods here; a UI only forwards button
/// presses and text input.
#[derive(Debug)]
pub struct Forest {
    cfg: Config,
    trees: Vec<BranchTree>,
}

impl Forest {
    /// Plants a forest from `cfg`. An invalid config is logged and replaced
    /// by [`Config::default`].
    pub fn new(cfg: Config, rng: &mut impl Rng) -> Self {
        let cfg = match cfg.validate() {
            Ok(()) => cfg,
            Err(err) => {
                warn!(%err, "invalid forest config, using defaults");
                Config::default()
            }
        };
        let mut forest = Self {
            cfg,
            trees: Vec::new(),
        };
        forest.regrow(cfg.tree_count, rng);
        forest
    }

    /// Replaces every tree with `tree_count` freshly built ones.
    ///
    /// The canvas width is split into equal segments and each tree stands
    /// at a random x inside its own segment, on the ground line. A count
    /// outside `1..=MAX_TREES` falls back to the default with a warning.
    pub fn regrow(&mut self, tree_count: usize, rng: &mut impl Rng) {
        let tree_count = checked_tree_count(tree_count);
        self.cfg.tree_count = tree_count;

        let segment = self.cfg.width / tree_count as f32;
        let trunk = self.cfg.trunk_length_min..self.cfg.trunk_length_max;
        let cfg = self.cfg;
        self.trees = (0..tree_count)
            .map(|i| {
                let left = i as f32 * segment;
                let x = rng.random_range(left..left + segment);
                let trunk_length = rng.random_range(trunk.clone());
                BranchTree::new(Vec2::new(x, cfg.ground_height), trunk_length, &cfg, rng)
            })
            .collect();

        debug!(
            trees = tree_count,
            branches = self.trees.iter().map(BranchTree::branch_count).sum::<usize>(),
            "regrew forest"
        );
    }

    /// Rebuilds the forest from user input, falling back to the default
    /// tree count when the input is not a usable number.
    pub fn regrow_from_input(&mut self, input: &str, rng: &mut impl Rng) -> usize {
        let count = parse_tree_count(input);
        self.regrow(count, rng);
        count
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn trees(&self) -> &[BranchTree] {
        &self.trees
    }

    pub fn leaf_count(&self) -> usize {
        self.trees.iter().map(|t| t.leaves().len()).sum()
    }

    /// Noise time for a frame number.
    pub fn time_at(&self, frame: u64) -> f32 {
        frame as f32 * self.cfg.noise_time_scale
    }

    pub fn global_wind(&self, t: f32, field: &impl NoiseField) -> Vec2 {
        wind::global_wind(t, field)
    }

    /// Runs one frame for every tree and returns everything to draw.
    pub fn advance(
        &mut self,
        frame: u64,
        field: &impl NoiseField,
        rng: &mut impl Rng,
    ) -> Vec<DrawPrimitive> {
        let t = self.time_at(frame);
        let global = self.global_wind(t, field);
        let ground = self.cfg.ground_height;

        let mut out = Vec::new();
        for tree in &mut self.trees {
            tree.grow_and_show(global, t, field, ground, rng, &mut out);
        }
        out
    }

    /// Moves the ground line and canvas width, e.g. after a window resize.
    /// Existing trees keep their positions.
    pub fn resize(&mut self, width: f32, ground_height: f32) {
        if width.is_finite() && width > 0.0 {
            self.cfg.width = width;
        }
        if ground_height.is_finite() && ground_height > 0.0 {
            self.cfg.ground_height = ground_height;
        }
    }

    fn update_params(&mut self, f: impl Fn(&mut TreeParams)) {
        f(&mut self.cfg.tree);
        for tree in &mut self.trees {
            f(tree.params_mut());
        }
    }

    pub fn set_color_change_speed(&mut self, speed: f32) {
        let speed = clamp_probability("color_change_speed", speed);
        self.update_params(|p| p.color_change_speed = speed);
    }

    pub fn set_drop_leaf_rate(&mut self, rate: f32) {
        let rate = clamp_probability("drop_leaf_rate", rate);
        self.update_params(|p| p.drop_leaf_rate = rate);
    }

    pub fn set_leaf_spawn_rate(&mut self, rate: f32) {
        let rate = clamp_probability("leaf_spawn_rate", rate);
        self.update_params(|p| p.leaf_spawn_rate = rate);
    }

    /// Leaves redden every frame.
    pub fn fast_aging(&mut self) {
        self.set_color_change_speed(FAST_COLOR_CHANGE_SPEED);
    }

    /// Leaves let go quickly.
    pub fn shed_leaves(&mut self) {
        self.set_drop_leaf_rate(SHEDDING_DROP_RATE);
    }

    /// No new leaves sprout.
    pub fn suppress_spawning(&mut self) {
        self.set_leaf_spawn_rate(0.0);
    }

    /// Back to the default leaf behaviour on every tree.
    pub fn reset_seasons(&mut self) {
        let defaults = TreeParams::default();
        self.update_params(|p| *p = defaults);
    }
}

/// Parses a tree count typed by the user, falling back to the default
/// (2) with a warning instead of failing.
pub fn parse_tree_count(input: &str) -> usize {
    Config::parse_tree_count(input).unwrap_or_else(|err| {
        let fallback = Config::default().tree_count;
        warn!(%err, fallback, "using default tree count");
        fallback
    })
}

fn checked_tree_count(count: usize) -> usize {
    if (1..=MAX_TREES).contains(&count) {
        return count;
    }
    let fallback = Config::default().tree_count;
    warn!(count, fallback, "tree count out of range, using default");
    fallback
}

fn clamp_probability(name: &'static str, value: f32) -> f32 {
    if value.is_nan() {
        warn!(probability = name, "ignoring NaN probability, using 0");
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise_field::PerlinField;
    use rand::{SeedableRng, rngs::StdRng};

    fn forest(tree_count: usize, rng: &mut StdRng) -> Forest {
        let cfg = Config {
            tree_count,
            min_iterations: 2,
            max_iterations: 3,
            ..Config::default()
        };
        Forest::new(cfg, rng)
    }

    #[test]
    fn trees_stand_in_their_own_segments_on_the_ground() {
        let mut rng = StdRng::seed_from_u64(1);
        let f = forest(4, &mut rng);
        let segment = f.config().width / 4.0;

        assert_eq!(f.trees().len(), 4);
        for (i, tree) in f.trees().iter().enumerate() {
            let base = tree.root().begin;
            assert!(base.x >= i as f32 * segment && base.x < (i + 1) as f32 * segment);
            assert_eq!(base.y, f.config().ground_height);

            let trunk = tree.root().reach().length();
            assert!(trunk >= 100.0 - 1e-3 && trunk < 200.0 + 1e-3);
        }
    }

    #[test]
    fn bad_tree_count_falls_back_to_default() {
        assert_eq!(parse_tree_count("lots"), 2);
        assert_eq!(parse_tree_count("0"), 2);
        assert_eq!(parse_tree_count("5"), 5);

        let mut rng = StdRng::seed_from_u64(2);
        let mut f = forest(3, &mut rng);
        assert_eq!(f.regrow_from_input("not a number", &mut rng), 2);
        assert_eq!(f.trees().len(), 2);
        assert_eq!(f.config().tree_count, 2);
    }

    #[test]
    fn invalid_config_plants_a_default_forest() {
        let mut rng = StdRng::seed_from_u64(20);
        let inverted = Config {
            trunk_length_min: 200.0,
            trunk_length_max: 100.0,
            ..Config::default()
        };
        let f = Forest::new(inverted, &mut rng);
        assert_eq!(*f.config(), Config::default());
        assert_eq!(f.trees().len(), Config::default().tree_count);

        let flat = Config {
            width: 0.0,
            ..Config::default()
        };
        let f = Forest::new(flat, &mut rng);
        assert_eq!(f.config().width, Config::default().width);
        assert_eq!(f.trees().len(), 2);
    }

    #[test]
    fn out_of_range_regrow_counts_fall_back_to_default() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut f = forest(3, &mut rng);

        f.regrow(0, &mut rng);
        assert_eq!(f.trees().len(), 2);
        assert_eq!(f.config().tree_count, 2);

        f.regrow(MAX_TREES + 1, &mut rng);
        assert_eq!(f.trees().len(), 2);

        f.regrow(MAX_TREES, &mut rng);
        assert_eq!(f.trees().len(), MAX_TREES);
    }

    #[test]
    fn advance_draws_every_branch_of_every_tree() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut f = forest(3, &mut rng);
        let field = PerlinField::new(0);

        let out = f.advance(0, &field, &mut rng);
        let branches: usize = f.trees().iter().map(BranchTree::branch_count).sum();
        let lines = out
            .iter()
            .filter(|p| matches!(p, DrawPrimitive::Line { .. }))
            .count();
        assert_eq!(lines, branches);
    }

    #[test]
    fn forest_keeps_animating_leaves() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut f = forest(2, &mut rng);
        let field = PerlinField::new(0);

        for frame in 0..120 {
            f.advance(frame, &field, &mut rng);
        }
        assert!(f.leaf_count() > 0);

        f.shed_leaves();
        f.suppress_spawning();
        for frame in 120..400 {
            f.advance(frame, &field, &mut rng);
        }
        let fallen = f
            .trees()
            .iter()
            .flat_map(|t| t.leaves())
            .filter(|l| !l.attached)
            .count();
        assert_eq!(fallen, f.leaf_count());
    }

    #[test]
    fn season_controls_reach_every_tree_and_reset() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut f = forest(3, &mut rng);

        f.fast_aging();
        f.shed_leaves();
        f.suppress_spawning();
        for tree in f.trees() {
            assert_eq!(tree.params().color_change_speed, FAST_COLOR_CHANGE_SPEED);
            assert_eq!(tree.params().drop_leaf_rate, SHEDDING_DROP_RATE);
            assert_eq!(tree.params().leaf_spawn_rate, 0.0);
        }

        // Rebuilt trees inherit the current season.
        f.regrow(2, &mut rng);
        assert!(f.trees().iter().all(|t| t.params().leaf_spawn_rate == 0.0));

        f.reset_seasons();
        assert!(f.trees().iter().all(|t| *t.params() == TreeParams::default()));
    }

    #[test]
    fn probability_setters_clamp_input() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut f = forest(1, &mut rng);

        f.set_drop_leaf_rate(7.0);
        assert_eq!(f.trees()[0].params().drop_leaf_rate, 1.0);
        f.set_leaf_spawn_rate(-1.0);
        assert_eq!(f.trees()[0].params().leaf_spawn_rate, 0.0);
        f.set_color_change_speed(f32::NAN);
        assert_eq!(f.trees()[0].params().color_change_speed, 0.0);
    }

    #[test]
    fn same_seed_replays_identically() {
        let field = PerlinField::new(8);
        let run = || {
            let mut rng = StdRng::seed_from_u64(42);
            let mut f = forest(2, &mut rng);
            let mut last = Vec::new();
            for frame in 0..50 {
                last = f.advance(frame, &field, &mut rng);
            }
            last
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn resize_ignores_nonsense() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut f = forest(1, &mut rng);
        f.resize(640.0, 480.0);
        assert_eq!(f.config().width, 640.0);
        assert_eq!(f.config().ground_height, 480.0);

        f.resize(-1.0, f32::INFINITY);
        assert_eq!(f.config().width, 640.0);
        assert_eq!(f.config().ground_height, 480.0);
    }
}
