//! Core 2-D swaying-tree and falling-leaf simulation library.
//!
//! Main components:
//! - [`forest`] — the collection of trees, global wind and season controls.
//! - [`tree`] — one branch skeleton plus its leaves; per-frame update.
//! - [`branch`] — growth easing and spring/wind physics of one segment.
//! - [`leaf`] — leaf lifecycle: color aging, detachment, falling.
//! - [`wind`] — global and per-entity wind sampling.
//! - [`noise_field`] — the coherent noise the wind is sampled from.
//! - [`draw`] — draw primitives handed to the renderer.
//! - [`config`] — tunables and their defaults.
//! - [`error`] — configuration errors.
//! - [`types`] — shared type aliases and IDs.

pub mod branch;
pub mod config;
pub mod draw;
pub mod error;
pub mod forest;
pub mod leaf;
pub mod noise_field;
pub mod tree;
pub mod types;
pub mod wind;
