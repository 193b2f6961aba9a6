//! Wrap modes and the time-wrapping function.
//!
//! `wrap()` folds an elapsed (speed-scaled) time into the local time of the current
//! pass, its ratio, the direction of travel and the continuous iteration count.

use serde::{Deserialize, Serialize};

const LOOP_BIT: u8 = 1 << 1;
const PING_PONG_BIT: u8 = 1 << 2;
const REVERSE_BIT: u8 = 1 << 5;

/// Playback wrap policy. Variants combine the Loop, PingPong and Reverse flags.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WrapMode {
    /// Use the clip's own mode (behaves as Normal when nothing overrides it).
    #[default]
    Default,
    Normal,
    Loop,
    Reverse,
    LoopReverse,
    PingPong,
    PingPongReverse,
}

impl WrapMode {
    #[inline]
    fn bits(self) -> u8 {
        match self {
            WrapMode::Default | WrapMode::Normal => 0,
            WrapMode::Loop => LOOP_BIT,
            WrapMode::Reverse => REVERSE_BIT,
            WrapMode::LoopReverse => LOOP_BIT | REVERSE_BIT,
            WrapMode::PingPong => LOOP_BIT | PING_PONG_BIT,
            WrapMode::PingPongReverse => LOOP_BIT | PING_PONG_BIT | REVERSE_BIT,
        }
    }

    #[inline]
    pub fn is_loop(self) -> bool {
        self.bits() & LOOP_BIT != 0
    }

    #[inline]
    pub fn is_ping_pong(self) -> bool {
        self.bits() & PING_PONG_BIT != 0
    }

    #[inline]
    pub fn is_reverse(self) -> bool {
        self.bits() & REVERSE_BIT != 0
    }

    /// Modes whose local time must be mirrored on reversed passes.
    #[inline]
    pub fn should_wrap(self) -> bool {
        self.bits() & (REVERSE_BIT | PING_PONG_BIT) != 0
    }

    /// Repeat count implied by the mode when it is assigned.
    #[inline]
    pub fn default_repeat_count(self) -> f64 {
        if self.is_loop() {
            f64::INFINITY
        } else {
            1.0
        }
    }

    /// Whether pass `pass` runs backwards in ratio space for this mode, counted
    /// away from zero. `mirrored` selects the negative-time side, where every pass
    /// meets the clip from its other end.
    pub fn pass_reversed(self, pass: u64, mirrored: bool) -> bool {
        let mut reversed = self.is_ping_pong() && pass % 2 == 1;
        if self.is_reverse() {
            reversed = !reversed;
        }
        if mirrored {
            reversed = !reversed;
        }
        reversed
    }
}

/// Snapshot produced by [`wrap`]; recomputed on every update.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WrapInfo {
    /// Local time inside the current pass, in seconds.
    pub time: f64,
    /// `time / duration`.
    pub ratio: f64,
    /// +1 when the ratio grows with elapsed time, -1 when it shrinks.
    pub direction: f64,
    pub stopped: bool,
    /// Continuous count of passes completed (1.05 = just past the first boundary).
    pub iterations: f64,
}

/// Index of the pass that contains `iterations`. A pass owns its end boundary, so an
/// exact positive integer belongs to the pass it completes.
#[inline]
pub fn pass_index(iterations: f64) -> u64 {
    if iterations > 0.0 && iterations.fract() == 0.0 {
        (iterations - 1.0) as u64
    } else {
        iterations.max(0.0).floor() as u64
    }
}

/// Fold `time` into a [`WrapInfo`] for a clip of `duration` seconds.
pub fn wrap(time: f64, duration: f64, mode: WrapMode, repeat_count: f64, speed: f64) -> WrapInfo {
    if duration <= 0.0 || !duration.is_finite() {
        return WrapInfo {
            time: 0.0,
            ratio: 1.0,
            direction: 1.0,
            stopped: true,
            iterations: 0.0,
        };
    }

    let mut time = time;
    let mut stopped = false;
    let mut iterations = time.abs() / duration;

    if iterations >= repeat_count {
        iterations = repeat_count;
        stopped = true;
        let mut tail = repeat_count.fract();
        if tail == 0.0 {
            tail = 1.0;
        }
        let sign = if time < 0.0 { -1.0 } else { 1.0 };
        time = tail * duration * sign;
    }

    if time > duration {
        let folded = time % duration;
        time = if folded == 0.0 { duration } else { folded };
    } else if time < 0.0 {
        time %= duration;
        if time != 0.0 {
            time += duration;
        }
    }

    let mut need_reverse = false;
    if mode.is_ping_pong() {
        need_reverse = pass_index(iterations) % 2 == 1;
    }
    if mode.is_reverse() {
        need_reverse = !need_reverse;
    }

    let mut direction = if need_reverse { -1.0 } else { 1.0 };
    if speed < 0.0 {
        direction = -direction;
    }

    if mode.should_wrap() && need_reverse {
        time = duration - time;
    }

    WrapInfo {
        time,
        ratio: time / duration,
        direction,
        stopped,
        iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        assert!(WrapMode::PingPongReverse.is_loop());
        assert!(WrapMode::PingPongReverse.is_reverse());
        assert!(WrapMode::PingPong.should_wrap());
        assert!(!WrapMode::Loop.should_wrap());
        assert_eq!(WrapMode::Normal.default_repeat_count(), 1.0);
        assert!(WrapMode::Loop.default_repeat_count().is_infinite());
    }

    #[test]
    fn pass_index_owns_end_boundary() {
        assert_eq!(pass_index(0.0), 0);
        assert_eq!(pass_index(0.5), 0);
        assert_eq!(pass_index(1.0), 0);
        assert_eq!(pass_index(1.05), 1);
        assert_eq!(pass_index(2.0), 1);
    }

    #[test]
    fn zero_duration_is_stopped_at_end() {
        let info = wrap(3.0, 0.0, WrapMode::Loop, f64::INFINITY, 1.0);
        assert!(info.stopped);
        assert_eq!(info.ratio, 1.0);
        assert_eq!(info.time, 0.0);
    }
}
