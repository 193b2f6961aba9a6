//! Core configuration for cadenza-animation-core.

use serde::{Deserialize, Serialize};

/// Configuration for buffer sizing and sampling limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum clip events fired by one state in one update; the rest are dropped.
    pub max_events_per_tick: usize,

    /// Initial capacity hint for the per-state event scratch buffer.
    pub scratch_events: usize,

    /// Sampling rate for motion path flattening when the clip carries no `sample`.
    pub motion_path_fps: f64,

    /// Subdivisions used to measure bezier arc length.
    pub arc_length_divisions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_events_per_tick: 1024,
            scratch_events: 64,
            motion_path_fps: 60.0,
            arc_length_divisions: 200,
        }
    }
}
