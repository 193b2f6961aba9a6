//! Clip events and their dispatch.
//!
//! An event sits at a ratio of the clip. Playback position is the signed
//! iteration count (elapsed time over duration, negative when the state time is
//! negative). Its magnitude splits into `(pass, progress)`, where `progress` runs
//! 0..1 through each pass regardless of the pass direction. On a forward pass an
//! event is met at `progress == ratio`, on a reversed pass at `1 - ratio`.
//!
//! An update fires every event met between the previous and the current
//! position, in the order playback meets them (ties keep authoring order). The
//! walk follows the direction of travel, so a negative speed fires events from a
//! positive start time too.

use serde_json::Value as JsonValue;

use crate::data::EventData;
use crate::error::Result;
use crate::wrap::{pass_index, WrapMode};

#[derive(Clone, Debug, PartialEq)]
pub struct ClipEvent {
    /// Position in the clip, `frame / duration` clamped to [0, 1].
    pub ratio: f64,
    pub frame: f64,
    pub func: String,
    pub params: Vec<JsonValue>,
}

impl ClipEvent {
    pub fn from_data(data: &EventData, duration: f64) -> Self {
        let ratio = if duration > 0.0 {
            (data.frame / duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            ratio,
            frame: data.frame,
            func: data.func.clone(),
            params: data.params.clone(),
        }
    }
}

/// Handed to the sink with every event.
#[derive(Debug)]
pub struct EventContext<'a> {
    clip: &'a str,
    time: f64,
    stop_requested: bool,
}

impl<'a> EventContext<'a> {
    pub(crate) fn new(clip: &'a str, time: f64) -> Self {
        Self {
            clip,
            time,
            stop_requested: false,
        }
    }

    /// Name of the clip that fired the event.
    pub fn clip(&self) -> &str {
        self.clip
    }

    /// State time (seconds, speed-scaled) at dispatch.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Stop the state; events not yet dispatched in this update are dropped.
    pub fn stop(&mut self) {
        self.stop_requested = true;
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested
    }
}

/// Receives fired events. Returning an error aborts the update.
pub trait EventSink {
    fn on_event(&mut self, event: &ClipEvent, ctx: &mut EventContext<'_>) -> Result<()>;
}

impl<F> EventSink for F
where
    F: FnMut(&ClipEvent, &mut EventContext<'_>) -> Result<()>,
{
    fn on_event(&mut self, event: &ClipEvent, ctx: &mut EventContext<'_>) -> Result<()> {
        self(event, ctx)
    }
}

/// Records fired events in order.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    pub fired: Vec<ClipEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler names in firing order.
    pub fn funcs(&self) -> Vec<&str> {
        self.fired.iter().map(|e| e.func.as_str()).collect()
    }

    pub fn clear(&mut self) {
        self.fired.clear();
    }
}

impl EventSink for EventLog {
    fn on_event(&mut self, event: &ClipEvent, _ctx: &mut EventContext<'_>) -> Result<()> {
        self.fired.push(event.clone());
        Ok(())
    }
}

/// Discards events.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoEvents;

impl EventSink for NoEvents {
    fn on_event(&mut self, _event: &ClipEvent, _ctx: &mut EventContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Playback position: pass index, then progress through that pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Position {
    pub pass: u64,
    pub progress: f64,
}

impl Position {
    /// Position for a continuous iteration count (see `WrapInfo::iterations`).
    pub fn from_iterations(iterations: f64) -> Self {
        let pass = pass_index(iterations);
        let progress = (iterations.max(0.0) - pass as f64).clamp(0.0, 1.0);
        Self { pass, progress }
    }
}

/// Where the next update starts looking for events.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EventCursor {
    /// Signed iteration count; negative on the mirrored side of zero.
    pub coordinate: f64,
    /// Events exactly at the cursor are still pending (after play or a seek).
    pub inclusive: bool,
}

impl EventCursor {
    pub fn at(coordinate: f64, inclusive: bool) -> Self {
        Self {
            coordinate,
            inclusive,
        }
    }
}

/// Collect events crossed moving from `from` to the signed coordinate `to` into
/// `out` as `(progress, index)`, in the order they are met. Returns false when
/// `cap` cut the list short.
pub fn collect_crossed(
    events: &[ClipEvent],
    from: EventCursor,
    to: f64,
    mode: WrapMode,
    cap: usize,
    out: &mut Vec<(f64, usize)>,
) -> bool {
    if events.is_empty() {
        return true;
    }
    let a = from.coordinate;
    let sweep = Sweep { events, mode, cap };
    if (a < 0.0) == (to < 0.0) || a == 0.0 || to == 0.0 {
        let mirrored = a < 0.0 || to < 0.0;
        return sweep.run(a.abs(), from.inclusive, to.abs(), mirrored, out);
    }
    // Crossing zero: back to the start on the old side, then out on the new one,
    // where the clip is met from its other end.
    sweep.run(a.abs(), from.inclusive, 0.0, a < 0.0, out) && sweep.run(0.0, true, to.abs(), to < 0.0, out)
}

struct Sweep<'a> {
    events: &'a [ClipEvent],
    mode: WrapMode,
    cap: usize,
}

impl Sweep<'_> {
    fn max_passes(&self) -> u64 {
        (self.cap as u64).saturating_mul(2).saturating_add(2)
    }

    fn run(&self, from: f64, inclusive: bool, to: f64, mirrored: bool, out: &mut Vec<(f64, usize)>) -> bool {
        if to < from {
            self.backward(from, inclusive, to, mirrored, out)
        } else {
            self.forward(from, inclusive, to, mirrored, out)
        }
    }

    /// Collect one pass, ordered ascending or descending; false once over the cap.
    fn pass(
        &self,
        pass: u64,
        mirrored: bool,
        descending: bool,
        out: &mut Vec<(f64, usize)>,
        keep: impl Fn(f64) -> bool,
    ) -> bool {
        let reversed = self.mode.pass_reversed(pass, mirrored);
        let begin = out.len();
        for (index, ev) in self.events.iter().enumerate() {
            let p = if reversed { 1.0 - ev.ratio } else { ev.ratio };
            if keep(p) {
                out.push((p, index));
            }
        }
        if descending {
            out[begin..].sort_by(|a, b| b.0.total_cmp(&a.0));
        } else {
            out[begin..].sort_by(|a, b| a.0.total_cmp(&b.0));
        }
        if out.len() > self.cap {
            out.truncate(self.cap);
            return false;
        }
        true
    }

    fn forward(&self, from: f64, inclusive: bool, to: f64, mirrored: bool, out: &mut Vec<(f64, usize)>) -> bool {
        let start = Position::from_iterations(from);
        let end = Position::from_iterations(to);
        // An event passed on the way out and again on the way back from a ping-pong
        // reflection fires twice in the same update, once per traversal.
        for pass in start.pass..=end.pass {
            if pass - start.pass > self.max_passes() {
                return false;
            }
            let first = pass == start.pass;
            let lo = if first { start.progress } else { 0.0 };
            let lo_inclusive = !first || inclusive;
            let hi = if pass == end.pass { end.progress } else { 1.0 };
            // A ping-pong reflection point was already met at the end of the previous pass.
            let skip_zero = self.mode.is_ping_pong() && pass > 0 && !(first && inclusive);
            let keep = |p: f64| (p > lo || (lo_inclusive && p == lo)) && p <= hi && !(skip_zero && p == 0.0);
            if !self.pass(pass, mirrored, false, out, keep) {
                return false;
            }
        }
        true
    }

    fn backward(&self, from: f64, inclusive: bool, to: f64, mirrored: bool, out: &mut Vec<(f64, usize)>) -> bool {
        let start = Position::from_iterations(from);
        let end = Position::from_iterations(to);
        for pass in (end.pass..=start.pass).rev() {
            if start.pass - pass > self.max_passes() {
                return false;
            }
            let first = pass == start.pass;
            let hi = if first { start.progress } else { 1.0 };
            let hi_inclusive = !first || inclusive;
            let lo = if pass == end.pass { end.progress } else { 0.0 };
            // Progress 0 of a later pass is progress 1 of the one before it.
            let skip_zero = self.mode.is_ping_pong() && pass > 0;
            let keep = |p: f64| (p < hi || (hi_inclusive && p == hi)) && p >= lo && !(skip_zero && p == 0.0);
            if !self.pass(pass, mirrored, true, out, keep) {
                return false;
            }
        }
        true
    }
}
