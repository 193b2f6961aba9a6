//! Time-based actions run against a single target.
//!
//! An action is started on a target, then driven either by `step(dt)` (which keeps
//! its own elapsed clock) or directly by `update(ratio)` from an enclosing
//! composite. `reverse()` and `clone_action()` return fresh, unstarted copies.

pub mod ease;
pub mod instant;
pub mod interval;

pub use ease::EaseAction;
pub use instant::{CallFunc, FlipX, FlipY, Hide, Place, Show, ToggleVisibility};
pub use interval::{DelayTime, PropertyBy, PropertyTo, Repeat, Sequence};

use std::rc::Rc;

use crate::binding::{TargetRef, WeakTarget};
use crate::error::{AnimationError, Result};

/// Property toggled by `Show`, `Hide` and `ToggleVisibility`.
pub const ACTIVE: &str = "active";
pub const POSITION: &str = "position";
pub const FLIP_X: &str = "flipX";
pub const FLIP_Y: &str = "flipY";

/// Smallest duration used when turning elapsed time into a ratio.
pub const MIN_DURATION: f64 = f32::EPSILON as f64;

pub trait FiniteTimeAction {
    /// Type name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Seconds; 0 for instant actions.
    fn duration(&self) -> f64;

    fn start_with_target(&mut self, target: &TargetRef);

    /// Apply the action at `ratio` in [0, 1] (eased ratios may overshoot).
    fn update(&mut self, ratio: f64) -> Result<()>;

    fn stop(&mut self);

    /// Advance the action's own clock by `dt` seconds and update.
    fn step(&mut self, dt: f64) -> Result<()>;

    fn is_done(&self) -> bool;

    fn reverse(&self) -> Box<dyn FiniteTimeAction>;

    fn clone_action(&self) -> Box<dyn FiniteTimeAction>;
}

/// Target slot shared by all actions.
#[derive(Clone, Debug, Default)]
pub struct ActionTarget {
    target: Option<WeakTarget>,
}

impl ActionTarget {
    pub fn start(&mut self, target: &TargetRef) {
        self.target = Some(Rc::downgrade(target));
    }

    pub fn clear(&mut self) {
        self.target = None;
    }

    pub fn is_started(&self) -> bool {
        self.target.is_some()
    }

    /// The live target. `Ok(None)` when it was dropped after starting.
    pub fn get(&self, action: &'static str) -> Result<Option<TargetRef>> {
        match &self.target {
            None => Err(AnimationError::ActionNotStarted { action }),
            Some(weak) => Ok(weak.upgrade()),
        }
    }
}

/// Elapsed-time bookkeeping for interval actions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntervalClock {
    duration: f64,
    elapsed: f64,
    first_tick: bool,
}

impl IntervalClock {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            elapsed: 0.0,
            first_tick: true,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.first_tick = true;
    }

    /// Advance and return the clamped ratio. The first tick after a reset only
    /// starts the clock; zero-length intervals jump straight to 1.
    pub fn advance(&mut self, dt: f64) -> f64 {
        if self.first_tick {
            self.first_tick = false;
            self.elapsed = 0.0;
        } else {
            self.elapsed += dt;
        }
        if self.duration < MIN_DURATION {
            return 1.0;
        }
        let t = self.elapsed / self.duration;
        t.clamp(0.0, 1.0)
    }

    pub fn is_done(&self) -> bool {
        !self.first_tick && self.elapsed >= self.duration
    }
}
