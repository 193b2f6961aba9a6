//! Animation component: a named clip list and one playback state per clip.

use std::rc::Rc;

use cadenza_api_core::Value;
use hashbrown::HashMap;
use indexmap::IndexMap;

use crate::binding::TargetResolver;
use crate::config::Config;
use crate::data::{compute_null_ratios, AnimationClip, Keyframe};
use crate::error::{AnimationError, Result};
use crate::events::EventSink;
use crate::state::AnimationState;
use crate::wrap::WrapMode;

/// Values of one key in [`Animation::animate`]: root properties and component
/// properties.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pose {
    /// Position as a ratio of the clip; poses without one are spaced evenly.
    pub ratio: Option<f64>,
    pub props: IndexMap<String, Value>,
    pub comps: IndexMap<String, IndexMap<String, Value>>,
}

impl Pose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(ratio: f64) -> Self {
        Self {
            ratio: Some(ratio),
            ..Self::default()
        }
    }

    pub fn prop(mut self, property: impl Into<String>, value: Value) -> Self {
        self.props.insert(property.into(), value);
        self
    }

    pub fn comp(mut self, component: impl Into<String>, property: impl Into<String>, value: Value) -> Self {
        self.comps
            .entry(component.into())
            .or_default()
            .insert(property.into(), value);
        self
    }
}

/// Playback settings for [`Animation::animate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimateOptions {
    pub delay: f64,
    /// Clip length in seconds.
    pub duration: f64,
    pub speed: f64,
    /// `None` keeps the wrap mode's own count.
    pub repeat_count: Option<f64>,
    pub wrap_mode: WrapMode,
}

impl Default for AnimateOptions {
    fn default() -> Self {
        Self {
            delay: 0.0,
            duration: 1.0,
            speed: 1.0,
            repeat_count: None,
            wrap_mode: WrapMode::Default,
        }
    }
}

fn push_key(curves: &mut IndexMap<String, Vec<Keyframe>>, property: &str, frame: f64, value: &Value) {
    curves
        .entry(property.to_string())
        .or_default()
        .push(Keyframe::new(frame, value.clone()));
}

/// Clip with one curve per property named by any pose.
fn clip_from_poses(name: &str, poses: &[Pose], options: &AnimateOptions) -> AnimationClip {
    let ratios = compute_null_ratios(&poses.iter().map(|p| p.ratio).collect::<Vec<_>>());
    let mut clip = AnimationClip::new(name, options.duration);
    clip.speed = options.speed;
    clip.wrap_mode = options.wrap_mode;
    for (pose, ratio) in poses.iter().zip(ratios) {
        let frame = ratio * options.duration;
        for (property, value) in &pose.props {
            push_key(&mut clip.curve_data.props, property, frame, value);
        }
        for (component, props) in &pose.comps {
            let curves = clip.curve_data.comps.entry(component.clone()).or_default();
            for (property, value) in props {
                push_key(curves, property, frame, value);
            }
        }
    }
    clip
}

/// Owns clips and their states for one animated root.
pub struct Animation {
    resolver: Rc<dyn TargetResolver>,
    config: Config,
    clips: Vec<Rc<AnimationClip>>,
    states: HashMap<String, AnimationState>,
    default_clip: Option<String>,
}

impl Animation {
    pub fn new(resolver: Rc<dyn TargetResolver>) -> Self {
        Self::with_config(resolver, Config::default())
    }

    pub fn with_config(resolver: Rc<dyn TargetResolver>, config: Config) -> Self {
        Self {
            resolver,
            config,
            clips: Vec::new(),
            states: HashMap::new(),
            default_clip: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clips(&self) -> &[Rc<AnimationClip>] {
        &self.clips
    }

    /// Clip played by `play(None, ..)`; the first clip when unset.
    pub fn default_clip(&self) -> Option<&str> {
        self.default_clip
            .as_deref()
            .or_else(|| self.clips.first().map(|c| c.name.as_str()))
    }

    pub fn set_default_clip(&mut self, name: &str) -> Result<()> {
        self.require(name)?;
        self.default_clip = Some(name.to_string());
        Ok(())
    }

    fn require(&self, name: &str) -> Result<()> {
        if self.states.contains_key(name) {
            Ok(())
        } else {
            Err(AnimationError::ClipNotFound { name: name.into() })
        }
    }

    fn resolve_name(&self, name: Option<&str>) -> Result<String> {
        match name.or_else(|| self.default_clip()) {
            Some(name) => {
                self.require(name)?;
                Ok(name.to_string())
            }
            None => Err(AnimationError::ClipNotFound {
                name: "<default>".into(),
            }),
        }
    }

    /// Register a clip and bind a state for it. A clip with an existing name
    /// replaces the old one.
    pub fn add_clip(&mut self, clip: AnimationClip) -> Result<&mut AnimationState> {
        if clip.name.is_empty() {
            return Err(AnimationError::InvalidClip {
                clip: clip.name,
                reason: "clip needs a name".into(),
            });
        }
        if self.states.contains_key(&clip.name) {
            return self.replace_clip(clip);
        }
        let clip = Rc::new(clip);
        let state = AnimationState::bind(clip.clone(), self.resolver.as_ref(), &self.config)?;
        let name = clip.name.clone();
        log::debug!("added clip '{name}'");
        self.clips.push(clip);
        Ok(self.states.entry(name).or_insert(state))
    }

    /// Swap the clip registered under `clip.name`, keeping its slot in the clip list,
    /// its time and whether it was playing.
    pub fn replace_clip(&mut self, clip: AnimationClip) -> Result<&mut AnimationState> {
        let name = clip.name.clone();
        let slot = self
            .clips
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| AnimationError::ClipNotFound { name: name.clone() })?;
        let clip = Rc::new(clip);
        let mut state = AnimationState::bind(clip.clone(), self.resolver.as_ref(), &self.config)?;
        if let Some(old) = self.states.get(&name) {
            if old.is_playing() {
                log::warn!("clip '{name}' replaced while playing");
                state.play_from(old.time());
                if old.is_paused() {
                    state.pause();
                }
            } else {
                state.set_time(old.time());
            }
        }
        self.clips[slot] = clip;
        log::debug!("replaced clip '{name}'");
        self.states.insert(name.clone(), state);
        self.states
            .get_mut(&name)
            .ok_or(AnimationError::ClipNotFound { name })
    }

    /// Remove a clip. A playing clip is only removed with `force`; returns whether
    /// the clip was removed.
    pub fn remove_clip(&mut self, name: &str, force: bool) -> Result<bool> {
        let state = self
            .states
            .get(name)
            .ok_or_else(|| AnimationError::ClipNotFound { name: name.into() })?;
        if state.is_playing() && !force {
            log::warn!("clip '{name}' is playing; not removed");
            return Ok(false);
        }
        self.states.remove(name);
        log::debug!("removed clip '{name}'");
        self.clips.retain(|c| c.name != name);
        if self.default_clip.as_deref() == Some(name) {
            self.default_clip = None;
        }
        Ok(true)
    }

    pub fn get_animation_state(&self, name: &str) -> Option<&AnimationState> {
        self.states.get(name)
    }

    pub fn get_animation_state_mut(&mut self, name: &str) -> Option<&mut AnimationState> {
        self.states.get_mut(name)
    }

    /// Play one clip (the default clip when `name` is None) and stop all others.
    pub fn play(&mut self, name: Option<&str>, start_time: Option<f64>) -> Result<&mut AnimationState> {
        let name = self.resolve_name(name)?;
        for (other, state) in self.states.iter_mut() {
            if *other != name && state.is_playing() {
                state.stop();
            }
        }
        self.play_additive(Some(name.as_str()), start_time)
    }

    /// Play a clip alongside whatever is already playing.
    pub fn play_additive(&mut self, name: Option<&str>, start_time: Option<f64>) -> Result<&mut AnimationState> {
        let name = self.resolve_name(name)?;
        let state = self
            .states
            .get_mut(&name)
            .ok_or_else(|| AnimationError::ClipNotFound { name: name.clone() })?;
        state.play_from(start_time.unwrap_or(0.0));
        Ok(state)
    }

    /// Build a clip named `name` from `poses`, register it and play it alongside
    /// whatever is already playing.
    pub fn animate(&mut self, name: &str, poses: &[Pose], options: AnimateOptions) -> Result<&mut AnimationState> {
        let clip = clip_from_poses(name, poses, &options);
        log::debug!("animate '{name}': {} poses over {}s", poses.len(), options.duration);
        let state = self.add_clip(clip)?;
        state.set_delay(options.delay);
        if let Some(count) = options.repeat_count {
            state.set_repeat_count(count);
        }
        state.play();
        Ok(state)
    }

    fn for_each_target<F>(&mut self, name: Option<&str>, mut f: F) -> Result<()>
    where
        F: FnMut(&mut AnimationState),
    {
        match name {
            Some(name) => {
                let state = self
                    .states
                    .get_mut(name)
                    .ok_or_else(|| AnimationError::ClipNotFound { name: name.into() })?;
                f(state);
            }
            None => self.states.values_mut().for_each(f),
        }
        Ok(())
    }

    /// Stop one clip, or all when `name` is None.
    pub fn stop(&mut self, name: Option<&str>) -> Result<()> {
        self.for_each_target(name, AnimationState::stop)
    }

    pub fn pause(&mut self, name: Option<&str>) -> Result<()> {
        self.for_each_target(name, AnimationState::pause)
    }

    pub fn resume(&mut self, name: Option<&str>) -> Result<()> {
        self.for_each_target(name, AnimationState::resume)
    }

    /// Seek one clip, or all when `name` is None.
    pub fn set_current_time(&mut self, time: f64, name: Option<&str>) -> Result<()> {
        self.for_each_target(name, |s| s.set_time(time))
    }

    /// Write current values of one clip, or of every playing clip.
    pub fn sample(&mut self, name: Option<&str>) -> Result<()> {
        match name {
            Some(_) => self.for_each_target(name, |s| {
                s.sample();
            }),
            None => {
                for clip in &self.clips {
                    if let Some(state) = self.states.get_mut(&clip.name) {
                        if state.is_playing() {
                            state.sample();
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// Advance every playing clip, in clip order.
    pub fn update(&mut self, dt: f64, sink: &mut dyn EventSink) -> Result<()> {
        for clip in &self.clips {
            if let Some(state) = self.states.get_mut(&clip.name) {
                state.update(dt, sink)?;
            }
        }
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.states.values().any(AnimationState::is_playing)
    }
}
