//! Playback state of one clip on one target.

use std::rc::Rc;

use crate::binding::{bind_clip, BoundCurve, TargetResolver};
use crate::config::Config;
use crate::data::AnimationClip;
use crate::error::Result;
use crate::events::{collect_crossed, ClipEvent, EventContext, EventCursor, EventSink};
use crate::scratch::Scratch;
use crate::wrap::{wrap, WrapInfo, WrapMode};

/// Time, speed, delay and wrap settings for a clip, plus its bound curves and events.
///
/// `time` is the speed-scaled elapsed time; [`wrap`] folds it into the clip on every
/// evaluation. Assigning a wrap mode resets `time` and derives the repeat count
/// from the mode (infinite for looping modes).
#[derive(Debug)]
pub struct AnimationState {
    clip: Rc<AnimationClip>,
    curves: Vec<BoundCurve>,
    events: Vec<ClipEvent>,
    time: f64,
    speed: f64,
    delay: f64,
    delay_remaining: f64,
    wrap_mode: WrapMode,
    repeat_count: f64,
    playing: bool,
    paused: bool,
    cursor: EventCursor,
    last_info: Option<WrapInfo>,
    scratch: Scratch,
    max_events_per_tick: usize,
}

impl AnimationState {
    /// Wrap pre-bound curves. Most callers want [`AnimationState::bind`].
    pub fn new(clip: Rc<AnimationClip>, curves: Vec<BoundCurve>, config: &Config) -> Self {
        let duration = clip.duration;
        let events = clip
            .events
            .iter()
            .map(|e| ClipEvent::from_data(e, duration))
            .collect();
        let wrap_mode = match clip.wrap_mode {
            WrapMode::Default => WrapMode::Normal,
            mode => mode,
        };
        Self {
            speed: clip.speed,
            clip,
            curves,
            events,
            time: 0.0,
            delay: 0.0,
            delay_remaining: 0.0,
            wrap_mode,
            repeat_count: wrap_mode.default_repeat_count(),
            playing: false,
            paused: false,
            cursor: EventCursor::at(0.0, true),
            last_info: None,
            scratch: Scratch::new(config),
            max_events_per_tick: config.max_events_per_tick,
        }
    }

    /// Validate `clip` and bind its curves through `resolver`.
    pub fn bind(clip: Rc<AnimationClip>, resolver: &dyn TargetResolver, config: &Config) -> Result<Self> {
        clip.validate()?;
        let curves = bind_clip(&clip, resolver, config)?;
        log::debug!("bound clip '{}': {} curves", clip.name, curves.len());
        Ok(Self::new(clip, curves, config))
    }

    pub fn name(&self) -> &str {
        &self.clip.name
    }

    pub fn clip(&self) -> &Rc<AnimationClip> {
        &self.clip
    }

    pub fn curves(&self) -> &[BoundCurve] {
        &self.curves
    }

    pub fn events(&self) -> &[ClipEvent] {
        &self.events
    }

    pub fn duration(&self) -> f64 {
        self.clip.duration
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Seek. Events at the new position fire on the next update.
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
        self.reset_cursor(true);
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    pub fn delay(&self) -> f64 {
        self.delay
    }

    /// Delay applied by the next `play`.
    pub fn set_delay(&mut self, delay: f64) {
        self.delay = delay.max(0.0);
    }

    pub fn wrap_mode(&self) -> WrapMode {
        self.wrap_mode
    }

    pub fn set_wrap_mode(&mut self, mode: WrapMode) {
        let mode = match mode {
            WrapMode::Default => WrapMode::Normal,
            mode => mode,
        };
        if mode == self.wrap_mode {
            return;
        }
        self.wrap_mode = mode;
        self.repeat_count = mode.default_repeat_count();
        self.set_time(0.0);
    }

    pub fn repeat_count(&self) -> f64 {
        self.repeat_count
    }

    pub fn set_repeat_count(&mut self, count: f64) {
        self.repeat_count = if count.is_nan() { 1.0 } else { count.max(0.0) };
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Result of the most recent evaluation.
    pub fn last_wrap(&self) -> Option<&WrapInfo> {
        self.last_info.as_ref()
    }

    /// Start from the beginning.
    pub fn play(&mut self) {
        self.play_from(0.0);
    }

    pub fn play_from(&mut self, time: f64) {
        log::debug!("play '{}' from {time}", self.clip.name);
        self.set_time(time);
        self.delay_remaining = self.delay;
        self.playing = true;
        self.paused = false;
    }

    /// Stop and rewind.
    pub fn stop(&mut self) {
        if self.playing {
            log::debug!("stop '{}'", self.clip.name);
        }
        self.playing = false;
        self.paused = false;
        self.delay_remaining = 0.0;
        self.set_time(0.0);
    }

    pub fn pause(&mut self) {
        if self.playing {
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    fn wrap_info(&self) -> WrapInfo {
        wrap(
            self.time,
            self.clip.duration,
            self.wrap_mode,
            self.repeat_count,
            self.speed,
        )
    }

    fn reset_cursor(&mut self, inclusive: bool) {
        let info = self.wrap_info();
        self.cursor = EventCursor::at(self.event_coordinate(&info), inclusive);
    }

    /// Iteration count signed like the state time.
    fn event_coordinate(&self, info: &WrapInfo) -> f64 {
        if self.time < 0.0 {
            -info.iterations
        } else {
            info.iterations
        }
    }

    fn apply_curves(&self, ratio: f64) {
        for curve in &self.curves {
            if let Err(err) = curve.apply(ratio) {
                log::warn!("clip '{}': curve '{}' not applied: {err}", self.clip.name, curve.path());
            }
        }
    }

    /// Write the values at the current time without advancing or firing events.
    pub fn sample(&mut self) -> WrapInfo {
        let info = self.wrap_info();
        self.apply_curves(info.ratio);
        self.last_info = Some(info);
        info
    }

    /// Advance by `dt` seconds (scaled by speed), write values and dispatch events.
    pub fn update(&mut self, dt: f64, sink: &mut dyn EventSink) -> Result<()> {
        if !self.playing || self.paused {
            return Ok(());
        }
        if self.delay_remaining > 0.0 {
            self.delay_remaining -= dt;
            if self.delay_remaining > 0.0 {
                return Ok(());
            }
        } else {
            self.time += dt * self.speed;
        }

        let info = self.sample();
        let result = self.dispatch_events(&info, sink);
        if info.stopped {
            self.playing = false;
            self.paused = false;
        }
        result
    }

    fn dispatch_events(&mut self, info: &WrapInfo, sink: &mut dyn EventSink) -> Result<()> {
        if self.events.is_empty() || self.clip.duration <= 0.0 {
            return Ok(());
        }
        let to = self.event_coordinate(info);

        self.scratch.begin_frame();
        let complete = collect_crossed(
            &self.events,
            self.cursor,
            to,
            self.wrap_mode,
            self.max_events_per_tick,
            &mut self.scratch.crossed,
        );
        if !complete {
            log::warn!(
                "clip '{}': more than {} events in one update; extra events dropped",
                self.clip.name,
                self.max_events_per_tick
            );
        }
        self.cursor = EventCursor::at(to, false);
        log::trace!(
            "clip '{}': {} events crossed",
            self.clip.name,
            self.scratch.crossed.len()
        );

        let mut ctx = EventContext::new(&self.clip.name, self.time);
        for &(_, index) in &self.scratch.crossed {
            sink.on_event(&self.events[index], &mut ctx)?;
            if ctx.is_stop_requested() {
                break;
            }
        }
        if ctx.is_stop_requested() {
            log::debug!("clip '{}' stopped by event handler", self.clip.name);
            self.playing = false;
            self.paused = false;
        }
        Ok(())
    }
}
