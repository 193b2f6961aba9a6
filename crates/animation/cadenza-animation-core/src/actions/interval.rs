//! Interval actions and composites.

use cadenza_api_core::blend::blend_values;
use cadenza_api_core::{FieldPath, TypedPath, Value};

use super::{ActionTarget, FiniteTimeAction, IntervalClock};
use crate::binding::TargetRef;
use crate::error::{AnimationError, Result};

/// Does nothing for `duration` seconds.
#[derive(Clone, Debug)]
pub struct DelayTime {
    clock: IntervalClock,
    slot: ActionTarget,
}

impl DelayTime {
    pub fn new(duration: f64) -> Self {
        Self {
            clock: IntervalClock::new(duration),
            slot: ActionTarget::default(),
        }
    }
}

impl FiniteTimeAction for DelayTime {
    fn name(&self) -> &'static str {
        "DelayTime"
    }

    fn duration(&self) -> f64 {
        self.clock.duration()
    }

    fn start_with_target(&mut self, target: &TargetRef) {
        self.clock.reset();
        self.slot.start(target);
    }

    fn update(&mut self, _ratio: f64) -> Result<()> {
        self.slot.get(self.name()).map(|_| ())
    }

    fn stop(&mut self) {
        self.slot.clear();
    }

    fn step(&mut self, dt: f64) -> Result<()> {
        let t = self.clock.advance(dt);
        self.update(t)
    }

    fn is_done(&self) -> bool {
        self.clock.is_done()
    }

    fn reverse(&self) -> Box<dyn FiniteTimeAction> {
        self.clone_action()
    }

    fn clone_action(&self) -> Box<dyn FiniteTimeAction> {
        Box::new(DelayTime::new(self.clock.duration()))
    }
}

/// Property accessor resolved when the action starts.
#[derive(Clone, Debug)]
struct PropertySlot {
    path: TypedPath,
    field: FieldPath,
}

impl PropertySlot {
    fn bind(path: &TypedPath, target: &TargetRef) -> Result<(Self, Value)> {
        let name = path.property_name();
        let base = target
            .borrow()
            .get_property(name)
            .ok_or_else(|| AnimationError::PropertyNotFound { name: name.into() })?;
        let field = FieldPath::compile(&base, &path.fields).map_err(|source| AnimationError::InvalidPath {
            path: path.to_string(),
            source,
        })?;
        let current = field.read(&base).ok_or_else(|| AnimationError::PropertyNotFound {
            name: path.to_string(),
        })?;
        Ok((
            Self {
                path: path.clone(),
                field,
            },
            current,
        ))
    }

    fn write(&self, target: &TargetRef, value: Value) -> Result<()> {
        let name = self.path.property_name();
        let mut target = target.borrow_mut();
        if self.field.is_empty() {
            return target.set_property(name, value);
        }
        let base = target
            .get_property(name)
            .ok_or_else(|| AnimationError::PropertyNotFound { name: name.into() })?;
        let actual = value.kind();
        let patched = self
            .field
            .patch(&base, value)
            .ok_or_else(|| AnimationError::ValueTypeMismatch {
                name: self.path.to_string(),
                expected: base.kind(),
                actual,
            })?;
        target.set_property(name, patched)
    }
}

fn parse_path(property: &str) -> Result<TypedPath> {
    TypedPath::parse(property).map_err(|source| AnimationError::InvalidPath {
        path: property.into(),
        source,
    })
}

/// Shared state of the property tweens: path, clock and what was captured at start.
#[derive(Clone, Debug)]
struct Tween {
    path: TypedPath,
    clock: IntervalClock,
    slot: ActionTarget,
    bound: Option<(PropertySlot, Value)>,
}

impl Tween {
    fn new(path: TypedPath, duration: f64) -> Self {
        Self {
            path,
            clock: IntervalClock::new(duration),
            slot: ActionTarget::default(),
            bound: None,
        }
    }

    fn start(&mut self, target: &TargetRef) {
        self.clock.reset();
        self.slot.start(target);
        self.bound = match PropertySlot::bind(&self.path, target) {
            Ok(bound) => Some(bound),
            Err(err) => {
                log::warn!("tween on '{}' has nothing to animate: {err}", self.path);
                None
            }
        };
    }

    fn stop(&mut self) {
        self.slot.clear();
        self.bound = None;
    }

    /// Write `value_at(start_value)` to the target.
    fn write(&self, action: &'static str, value_at: impl FnOnce(&Value) -> Result<Value>) -> Result<()> {
        let Some(target) = self.slot.get(action)? else {
            return Ok(());
        };
        let Some((slot, start)) = &self.bound else {
            return Ok(());
        };
        slot.write(&target, value_at(start)?)
    }
}

/// Tween a property (with optional field selectors, e.g. `"position.x"`) from its
/// value at start to `to`.
#[derive(Clone, Debug)]
pub struct PropertyTo {
    tween: Tween,
    to: Value,
}

impl PropertyTo {
    pub fn new(duration: f64, property: &str, to: Value) -> Result<Self> {
        Ok(Self {
            tween: Tween::new(parse_path(property)?, duration),
            to,
        })
    }
}

impl FiniteTimeAction for PropertyTo {
    fn name(&self) -> &'static str {
        "PropertyTo"
    }

    fn duration(&self) -> f64 {
        self.tween.clock.duration()
    }

    fn start_with_target(&mut self, target: &TargetRef) {
        self.tween.start(target);
    }

    fn update(&mut self, ratio: f64) -> Result<()> {
        let to = &self.to;
        self.tween
            .write("PropertyTo", |from| Ok(blend_values(from, to, ratio)))
    }

    fn stop(&mut self) {
        self.tween.stop();
    }

    fn step(&mut self, dt: f64) -> Result<()> {
        let t = self.tween.clock.advance(dt);
        self.update(t)
    }

    fn is_done(&self) -> bool {
        self.tween.clock.is_done()
    }

    /// Absolute tweens have no inverse; the copy plays forward again.
    fn reverse(&self) -> Box<dyn FiniteTimeAction> {
        log::warn!("PropertyTo on '{}' cannot be reversed", self.tween.path);
        self.clone_action()
    }

    fn clone_action(&self) -> Box<dyn FiniteTimeAction> {
        Box::new(PropertyTo {
            tween: Tween::new(self.tween.path.clone(), self.duration()),
            to: self.to.clone(),
        })
    }
}

/// Tween a property by `delta` relative to its value at start.
#[derive(Clone, Debug)]
pub struct PropertyBy {
    tween: Tween,
    delta: Value,
}

impl PropertyBy {
    pub fn new(duration: f64, property: &str, delta: Value) -> Result<Self> {
        Ok(Self {
            tween: Tween::new(parse_path(property)?, duration),
            delta,
        })
    }

    pub fn delta(&self) -> &Value {
        &self.delta
    }
}

impl FiniteTimeAction for PropertyBy {
    fn name(&self) -> &'static str {
        "PropertyBy"
    }

    fn duration(&self) -> f64 {
        self.tween.clock.duration()
    }

    fn start_with_target(&mut self, target: &TargetRef) {
        self.tween.start(target);
    }

    fn update(&mut self, ratio: f64) -> Result<()> {
        let delta = &self.delta;
        let path = &self.tween.path;
        self.tween.write("PropertyBy", |from| {
            from.add(&delta.scale(ratio))
                .ok_or_else(|| AnimationError::ValueTypeMismatch {
                    name: path.to_string(),
                    expected: from.kind(),
                    actual: delta.kind(),
                })
        })
    }

    fn stop(&mut self) {
        self.tween.stop();
    }

    fn step(&mut self, dt: f64) -> Result<()> {
        let t = self.tween.clock.advance(dt);
        self.update(t)
    }

    fn is_done(&self) -> bool {
        self.tween.clock.is_done()
    }

    fn reverse(&self) -> Box<dyn FiniteTimeAction> {
        Box::new(PropertyBy {
            tween: Tween::new(self.tween.path.clone(), self.duration()),
            delta: self.delta.neg(),
        })
    }

    fn clone_action(&self) -> Box<dyn FiniteTimeAction> {
        Box::new(PropertyBy {
            tween: Tween::new(self.tween.path.clone(), self.duration()),
            delta: self.delta.clone(),
        })
    }
}

/// Runs children one after another.
pub struct Sequence {
    actions: Vec<Box<dyn FiniteTimeAction>>,
    /// Cumulative end time of each child.
    ends: Vec<f64>,
    current: Option<usize>,
    clock: IntervalClock,
    slot: ActionTarget,
}

impl Sequence {
    pub fn new(actions: Vec<Box<dyn FiniteTimeAction>>) -> Result<Self> {
        if actions.is_empty() {
            return Err(AnimationError::EmptyComposite { action: "Sequence" });
        }
        Ok(Self::rebuilt(actions))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    fn start_of(&self, index: usize) -> f64 {
        if index == 0 {
            0.0
        } else {
            self.ends[index - 1]
        }
    }

    /// Child active at time `t`: the first whose end lies after `t`, else the last.
    fn index_at(&self, t: f64) -> usize {
        self.ends
            .iter()
            .position(|&end| t < end)
            .unwrap_or(self.actions.len() - 1)
    }

    /// Start child `index`, drive it to `ratio` and stop it.
    fn settle(&mut self, index: usize, target: &TargetRef, ratio: f64) -> Result<()> {
        let child = &mut self.actions[index];
        child.start_with_target(target);
        child.update(ratio)?;
        child.stop();
        Ok(())
    }
}

impl FiniteTimeAction for Sequence {
    fn name(&self) -> &'static str {
        "Sequence"
    }

    fn duration(&self) -> f64 {
        self.clock.duration()
    }

    fn start_with_target(&mut self, target: &TargetRef) {
        self.clock.reset();
        self.slot.start(target);
        self.current = None;
    }

    fn update(&mut self, ratio: f64) -> Result<()> {
        let Some(target) = self.slot.get(self.name())? else {
            return Ok(());
        };
        let t = ratio.clamp(0.0, 1.0) * self.duration();
        let index = self.index_at(t);

        match self.current {
            Some(cur) if index > cur => {
                self.actions[cur].update(1.0)?;
                self.actions[cur].stop();
                for skipped in cur + 1..index {
                    self.settle(skipped, &target, 1.0)?;
                }
                self.actions[index].start_with_target(&target);
            }
            Some(cur) if index < cur => {
                self.actions[cur].update(0.0)?;
                self.actions[cur].stop();
                for skipped in (index + 1..cur).rev() {
                    self.settle(skipped, &target, 0.0)?;
                }
                self.actions[index].start_with_target(&target);
            }
            Some(_) => {}
            None => {
                for skipped in 0..index {
                    self.settle(skipped, &target, 1.0)?;
                }
                self.actions[index].start_with_target(&target);
            }
        }
        self.current = Some(index);

        let start = self.start_of(index);
        let span = self.ends[index] - start;
        let local = if span > 0.0 { (t - start) / span } else { 1.0 };
        self.actions[index].update(local)
    }

    fn stop(&mut self) {
        if let Some(cur) = self.current.take() {
            self.actions[cur].stop();
        }
        self.slot.clear();
    }

    fn step(&mut self, dt: f64) -> Result<()> {
        let t = self.clock.advance(dt);
        self.update(t)
    }

    fn is_done(&self) -> bool {
        self.clock.is_done()
    }

    /// Reversed children in reverse order.
    fn reverse(&self) -> Box<dyn FiniteTimeAction> {
        let actions = self.actions.iter().rev().map(|a| a.reverse()).collect();
        Box::new(Sequence::rebuilt(actions))
    }

    fn clone_action(&self) -> Box<dyn FiniteTimeAction> {
        let actions = self.actions.iter().map(|a| a.clone_action()).collect();
        Box::new(Sequence::rebuilt(actions))
    }
}

impl Sequence {
    /// Rebuild from a child list known to be non-empty.
    fn rebuilt(actions: Vec<Box<dyn FiniteTimeAction>>) -> Sequence {
        let mut total = 0.0;
        let ends = actions
            .iter()
            .map(|a| {
                total += a.duration().max(0.0);
                total
            })
            .collect();
        Sequence {
            actions,
            ends,
            current: None,
            clock: IntervalClock::new(total),
            slot: ActionTarget::default(),
        }
    }
}

/// Runs its child `times` times back to back.
pub struct Repeat {
    inner: Box<dyn FiniteTimeAction>,
    times: u32,
    pass: u32,
    clock: IntervalClock,
    slot: ActionTarget,
}

impl Repeat {
    pub fn new(inner: Box<dyn FiniteTimeAction>, times: u32) -> Result<Self> {
        if times == 0 {
            return Err(AnimationError::EmptyComposite { action: "Repeat" });
        }
        let duration = inner.duration() * times as f64;
        Ok(Self {
            inner,
            times,
            pass: 0,
            clock: IntervalClock::new(duration),
            slot: ActionTarget::default(),
        })
    }

    pub fn times(&self) -> u32 {
        self.times
    }

    /// Pass currently being played (0-based).
    pub fn pass(&self) -> u32 {
        self.pass
    }
}

impl FiniteTimeAction for Repeat {
    fn name(&self) -> &'static str {
        "Repeat"
    }

    fn duration(&self) -> f64 {
        self.clock.duration()
    }

    fn start_with_target(&mut self, target: &TargetRef) {
        self.clock.reset();
        self.slot.start(target);
        self.pass = 0;
        self.inner.start_with_target(target);
    }

    fn update(&mut self, ratio: f64) -> Result<()> {
        let Some(target) = self.slot.get(self.name())? else {
            return Ok(());
        };
        let total = ratio.clamp(0.0, 1.0) * self.times as f64;
        let mut pass = total.floor() as u32;
        let mut local = total - pass as f64;
        if pass >= self.times {
            pass = self.times - 1;
            local = 1.0;
        }
        if pass < self.pass {
            self.inner.stop();
            self.inner.start_with_target(&target);
            self.pass = pass;
        }
        while self.pass < pass {
            self.inner.update(1.0)?;
            self.inner.stop();
            self.inner.start_with_target(&target);
            self.pass += 1;
        }
        self.inner.update(local)
    }

    fn stop(&mut self) {
        self.inner.stop();
        self.slot.clear();
    }

    fn step(&mut self, dt: f64) -> Result<()> {
        let t = self.clock.advance(dt);
        self.update(t)
    }

    fn is_done(&self) -> bool {
        self.clock.is_done()
    }

    fn reverse(&self) -> Box<dyn FiniteTimeAction> {
        Box::new(Repeat {
            inner: self.inner.reverse(),
            times: self.times,
            pass: 0,
            clock: IntervalClock::new(self.duration()),
            slot: ActionTarget::default(),
        })
    }

    fn clone_action(&self) -> Box<dyn FiniteTimeAction> {
        Box::new(Repeat {
            inner: self.inner.clone_action(),
            times: self.times,
            pass: 0,
            clock: IntervalClock::new(self.duration()),
            slot: ActionTarget::default(),
        })
    }
}
