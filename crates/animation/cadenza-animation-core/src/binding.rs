//! Animation targets, resolvers and bound curves.
//!
//! Curves are bound once, when a state is created: the clip's child path and
//! component select a target through a [`TargetResolver`], the property key is
//! parsed into a [`TypedPath`] and its field selectors are compiled against the
//! target's current value. Per-frame writes then go straight to the target.
//! States hold targets weakly; a dropped target makes its curves no-ops.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use cadenza_api_core::{FieldPath, TypedPath, Value};
use hashbrown::HashMap;

use crate::config::Config;
use crate::curve::{AnimationCurve, CurveMode};
use crate::data::AnimationClip;
use crate::error::{AnimationError, Result};
use crate::motion_path::sample_motion_paths;

/// Anything whose named properties can be read and written by animations.
pub trait AnimationTarget {
    fn get_property(&self, name: &str) -> Option<Value>;
    fn set_property(&mut self, name: &str, value: Value) -> Result<()>;
}

pub type TargetRef = Rc<RefCell<dyn AnimationTarget>>;
pub type WeakTarget = Weak<RefCell<dyn AnimationTarget>>;

/// Finds the object animated by a curve: `child_path` is relative to the animated
/// root (None = the root itself), `component` names a component on that node.
pub trait TargetResolver {
    fn resolve(&self, child_path: Option<&str>, component: Option<&str>) -> Option<TargetRef>;
}

/// Plain property map target. Properties must exist before they are animated and
/// keep their value kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyBag {
    props: HashMap<String, Value>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.props.insert(name.into(), value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.props.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_float)
    }

    pub fn into_shared(self) -> Rc<RefCell<PropertyBag>> {
        Rc::new(RefCell::new(self))
    }
}

impl AnimationTarget for PropertyBag {
    fn get_property(&self, name: &str) -> Option<Value> {
        self.props.get(name).cloned()
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<()> {
        let slot = self
            .props
            .get_mut(name)
            .ok_or_else(|| AnimationError::PropertyNotFound { name: name.into() })?;
        if slot.kind() != value.kind() {
            return Err(AnimationError::ValueTypeMismatch {
                name: name.into(),
                expected: slot.kind(),
                actual: value.kind(),
            });
        }
        *slot = value;
        Ok(())
    }
}

type SceneKey = (Option<String>, Option<String>);

/// Resolver over an explicit table of (child path, component) -> target.
#[derive(Clone, Default)]
pub struct SceneResolver {
    targets: HashMap<SceneKey, TargetRef>,
}

impl SceneResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, child_path: Option<&str>, component: Option<&str>, target: TargetRef) {
        self.targets
            .insert((child_path.map(str::to_string), component.map(str::to_string)), target);
    }

    pub fn with_root(mut self, target: TargetRef) -> Self {
        self.insert(None, None, target);
        self
    }

    pub fn with_child(mut self, child_path: &str, target: TargetRef) -> Self {
        self.insert(Some(child_path), None, target);
        self
    }

    pub fn with_component(mut self, child_path: Option<&str>, component: &str, target: TargetRef) -> Self {
        self.insert(child_path, Some(component), target);
        self
    }
}

impl TargetResolver for SceneResolver {
    fn resolve(&self, child_path: Option<&str>, component: Option<&str>) -> Option<TargetRef> {
        let key = (child_path.map(str::to_string), component.map(str::to_string));
        self.targets.get(&key).cloned()
    }
}

/// A curve attached to one target property.
#[derive(Clone, Debug)]
pub struct BoundCurve {
    path: TypedPath,
    component: Option<String>,
    field: FieldPath,
    target: WeakTarget,
    curve: AnimationCurve,
}

impl BoundCurve {
    pub fn new(path: TypedPath, target: &TargetRef, field: FieldPath, curve: AnimationCurve) -> Self {
        Self {
            path,
            component: None,
            field,
            target: Rc::downgrade(target),
            curve,
        }
    }

    pub fn path(&self) -> &TypedPath {
        &self.path
    }

    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }

    pub fn curve(&self) -> &AnimationCurve {
        &self.curve
    }

    pub fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }

    /// Sample at `ratio` and write the result. Returns false when the target is gone.
    pub fn apply(&self, ratio: f64) -> Result<bool> {
        let Some(target) = self.target.upgrade() else {
            log::debug!("target of '{}' dropped; skipping", self.path);
            return Ok(false);
        };
        let Some(value) = self.curve.sample(ratio) else {
            return Ok(false);
        };
        let property = self.path.property_name();
        let mut target = target.borrow_mut();
        if self.field.is_empty() {
            target.set_property(property, value)?;
            return Ok(true);
        }
        let base = target
            .get_property(property)
            .ok_or_else(|| AnimationError::PropertyNotFound {
                name: property.to_string(),
            })?;
        let actual = value.kind();
        let patched = self
            .field
            .patch(&base, value)
            .ok_or_else(|| AnimationError::ValueTypeMismatch {
                name: self.path.to_string(),
                expected: base.kind(),
                actual,
            })?;
        target.set_property(property, patched)?;
        Ok(true)
    }
}

/// Bind every curve of `clip` against targets from `resolver`.
///
/// Curves whose path, target, property or field cannot be resolved are skipped
/// with a warning. Malformed keyframe data fails the whole clip.
pub fn bind_clip(clip: &AnimationClip, resolver: &dyn TargetResolver, config: &Config) -> Result<Vec<BoundCurve>> {
    let mut bound = Vec::new();
    for spec in clip.curve_specs() {
        let path = match TypedPath::from_parts(spec.child, spec.property) {
            Ok(path) => path,
            Err(err) => {
                log::warn!("clip '{}': skipping curve '{}': {err}", clip.name, spec.property);
                continue;
            }
        };
        let mut curve = AnimationCurve::from_keyframes(spec.property, spec.keyframes, clip.duration)?;

        let Some(target) = resolver.resolve(spec.child, spec.component) else {
            log::warn!(
                "clip '{}': no target for '{}' (component {:?})",
                clip.name,
                path,
                spec.component
            );
            continue;
        };
        let Some(current) = target.borrow().get_property(path.property_name()) else {
            log::warn!("clip '{}': target has no property '{}'", clip.name, path.property_name());
            continue;
        };
        let field = match FieldPath::compile(&current, &path.fields) {
            Ok(field) => field,
            Err(err) => {
                log::warn!("clip '{}': skipping '{}': {err}", clip.name, path);
                continue;
            }
        };

        if path.property_name() == "position" && field.is_empty() {
            let fps = clip.sample.unwrap_or(config.motion_path_fps);
            if let Some(track) = sample_motion_paths(
                spec.keyframes,
                curve.ratios(),
                curve.segments(),
                clip.duration,
                fps,
                config.arc_length_divisions,
            ) {
                curve = AnimationCurve::new(track.ratios, track.values, track.segments)?
                    .with_mode(CurveMode::Sampled);
            }
        }

        let mut b = BoundCurve::new(path, &target, field, curve);
        b.component = spec.component.map(str::to_string);
        bound.push(b);
    }
    Ok(bound)
}
