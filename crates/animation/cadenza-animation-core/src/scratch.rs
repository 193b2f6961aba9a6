//! Scratch buffers reused across updates.

use crate::config::Config;

#[derive(Debug, Default, Clone)]
pub struct Scratch {
    /// Events crossed during the current update: (progress within pass, event index).
    pub crossed: Vec<(f64, usize)>,
}

impl Scratch {
    pub fn new(cfg: &Config) -> Self {
        Self {
            crossed: Vec::with_capacity(cfg.scratch_events),
        }
    }

    #[inline]
    pub fn begin_frame(&mut self) {
        self.crossed.clear();
    }
}
