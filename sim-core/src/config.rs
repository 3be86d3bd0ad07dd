use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound on the number of trees a forest will build.
pub const MAX_TREES: usize = 64;
/// Upper bound (exclusive) on branching passes. Each pass triples the
/// number of tips, so this keeps a tree under a few thousand branches.
pub const MAX_ITERATIONS: usize = 7;

/// Per-tree leaf behaviour, adjustable while the forest is running.
///
/// These are the knobs the "season" controls turn: fast color aging,
/// accelerated leaf drop and suppressed spawning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeParams {
    /// Per-frame probability that a shown leaf advances its compost counter.
    pub color_change_speed: f32,
    /// Per-frame probability that an attached leaf detaches.
    pub drop_leaf_rate: f32,
    /// Per-frame probability that a bare, grown tip sprouts a leaf.
    pub leaf_spawn_rate: f32,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            color_change_speed: 0.05,
            drop_leaf_rate: 0.00005,
            leaf_spawn_rate: 1.0,
        }
    }
}

impl TreeParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("color_change_speed", self.color_change_speed)?;
        check_probability("drop_leaf_rate", self.drop_leaf_rate)?;
        check_probability("leaf_spawn_rate", self.leaf_spawn_rate)
    }
}

/// Global configuration for a [`crate::forest::Forest`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tree_count: usize,
    /// Canvas width; trees are spread evenly across it.
    pub width: f32,
    /// Canvas y coordinate of the ground. Trunks stand on it and falling
    /// leaves stop at it (y grows downward).
    pub ground_height: f32,
    pub trunk_length_min: f32,
    pub trunk_length_max: f32,
    /// Inclusive lower bound on branching passes.
    pub min_iterations: usize,
    /// Exclusive upper bound on branching passes.
    pub max_iterations: usize,
    /// Growth counter advance per frame, in radians of the easing curve.
    pub growth_rate: f32,
    /// Frame number to noise time conversion.
    pub noise_time_scale: f32,
    pub noise_seed: u32,
    pub tree: TreeParams,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tree_count: 2,
            width: 1200.0,
            ground_height: 800.0,
            trunk_length_min: 100.0,
            trunk_length_max: 200.0,
            min_iterations: 3,
            max_iterations: 6,
            growth_rate: 0.05,
            noise_time_scale: 0.01,
            noise_seed: 0,
            tree: TreeParams::default(),
        }
    }
}

impl Config {
    /// Parses a JSON document into a validated config.
    ///
    /// Missing fields take their default values.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: Config = serde_json::from_str(input)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tree_count == 0 || self.tree_count > MAX_TREES {
            return Err(ConfigError::InvalidTreeCount {
                input: self.tree_count.to_string(),
                max: MAX_TREES,
            });
        }
        check_positive("width", self.width)?;
        check_positive("ground_height", self.ground_height)?;
        check_positive("trunk_length_min", self.trunk_length_min)?;
        check_positive("trunk_length_max", self.trunk_length_max)?;
        check_positive("growth_rate", self.growth_rate)?;
        check_positive("noise_time_scale", self.noise_time_scale)?;
        if self.trunk_length_min >= self.trunk_length_max {
            return Err(ConfigError::InvalidRange {
                name: "trunk_length",
                min: self.trunk_length_min,
                max: self.trunk_length_max,
            });
        }
        if self.min_iterations >= self.max_iterations || self.max_iterations > MAX_ITERATIONS {
            return Err(ConfigError::InvalidRange {
                name: "iterations",
                min: self.min_iterations as f32,
                max: self.max_iterations as f32,
            });
        }
        self.tree.validate()
    }

    /// Parses a user-supplied tree count.
    ///
    /// Leading and trailing whitespace is ignored. Anything that is not an
    /// integer in `1..=MAX_TREES` is rejected.
    pub fn parse_tree_count(input: &str) -> Result<usize, ConfigError> {
        let invalid = || ConfigError::InvalidTreeCount {
            input: input.to_owned(),
            max: MAX_TREES,
        };
        let count: usize = input.trim().parse().map_err(|_| invalid())?;
        if count == 0 || count > MAX_TREES {
            return Err(invalid());
        }
        Ok(count)
    }
}

fn check_probability(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { name, value })
    }
}

fn check_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDimension { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let cfg = Config::from_json_str(r#"{ "tree_count": 5, "tree": { "drop_leaf_rate": 0.5 } }"#)
            .unwrap();

        assert_eq!(cfg.tree_count, 5);
        assert_eq!(cfg.tree.drop_leaf_rate, 0.5);
        assert_eq!(cfg.tree.leaf_spawn_rate, TreeParams::default().leaf_spawn_rate);
        assert_eq!(cfg.width, Config::default().width);
    }

    #[test]
    fn json_with_bad_probability_is_rejected() {
        let err = Config::from_json_str(r#"{ "tree": { "leaf_spawn_rate": 3.0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidProbability {
                name: "leaf_spawn_rate",
                ..
            }
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = Config::from_json_str("{ tree_count: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let mut cfg = Config::default();
        cfg.min_iterations = 6;
        cfg.max_iterations = 3;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidRange {
                name: "iterations",
                ..
            })
        ));

        let mut cfg = Config::default();
        cfg.trunk_length_max = cfg.trunk_length_min;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn runaway_iteration_counts_are_rejected() {
        let err = Config::from_json_str(r#"{ "min_iterations": 25, "max_iterations": 26 }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidRange {
                name: "iterations",
                ..
            }
        ));

        let mut cfg = Config::default();
        cfg.max_iterations = MAX_ITERATIONS;
        assert!(cfg.validate().is_ok());
        cfg.max_iterations = MAX_ITERATIONS + 1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn parse_tree_count_accepts_padded_integers() {
        assert_eq!(Config::parse_tree_count(" 7 ").unwrap(), 7);
    }

    #[test]
    fn parse_tree_count_rejects_garbage_zero_and_overflow() {
        assert!(Config::parse_tree_count("three").is_err());
        assert!(Config::parse_tree_count("").is_err());
        assert!(Config::parse_tree_count("0").is_err());
        assert!(Config::parse_tree_count("-2").is_err());
        assert!(Config::parse_tree_count(&(MAX_TREES + 1).to_string()).is_err());
    }
}
