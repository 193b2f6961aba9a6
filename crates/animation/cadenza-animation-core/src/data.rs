//! Clip data model (authoring/persistence boundary).
//!
//! ```json
//! {
//!   "name": "walk", "duration": 2.0, "sample": 60, "wrapMode": "Loop",
//!   "curveData": {
//!     "props": { "x": [ { "frame": 0, "value": 0, "curve": "cubicInOut" } ] },
//!     "comps": { "Sprite": { "color.a": [ ... ] } },
//!     "paths": { "arm/hand": { "props": { ... }, "comps": { ... } } }
//!   },
//!   "events": [ { "frame": 0.5, "func": "step", "params": ["left"] } ]
//! }
//! ```
//! `frame` values are seconds; curves divide them by `duration` to get ratios.
//! Keyframe values use the shorthand JSON accepted by `cadenza_api_core::json`.

use cadenza_api_core::json::deserialize_shorthand;
use cadenza_api_core::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{AnimationError, Result};
use crate::wrap::WrapMode;

fn default_speed() -> f64 {
    1.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationClip {
    #[serde(default)]
    pub name: String,
    pub duration: f64,
    /// Legacy frame rate; drives motion path flattening when present.
    #[serde(default)]
    pub sample: Option<f64>,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub wrap_mode: WrapMode,
    #[serde(default)]
    pub curve_data: CurveData,
    #[serde(default)]
    pub events: Vec<EventData>,
}

/// Curves keyed by property, grouped by owner. Maps keep authoring order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveData {
    #[serde(default)]
    pub props: IndexMap<String, Vec<Keyframe>>,
    #[serde(default)]
    pub comps: IndexMap<String, IndexMap<String, Vec<Keyframe>>>,
    #[serde(default)]
    pub paths: IndexMap<String, NodeCurves>,
}

/// Curves of one child node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeCurves {
    #[serde(default)]
    pub props: IndexMap<String, Vec<Keyframe>>,
    #[serde(default)]
    pub comps: IndexMap<String, IndexMap<String, Vec<Keyframe>>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    /// Seconds from clip start; computed from neighbours when absent.
    #[serde(default)]
    pub frame: Option<f64>,
    #[serde(deserialize_with = "deserialize_shorthand")]
    pub value: Value,
    /// Timing of the segment that starts at this keyframe.
    #[serde(default)]
    pub curve: Option<CurveHint>,
    /// Bezier control points between this keyframe and the next: each entry is
    /// `[x, y]` or `[x, y, in_x, in_y, out_x, out_y]`.
    #[serde(default)]
    pub motion_path: Option<Vec<Vec<f64>>>,
}

impl Keyframe {
    pub fn new(frame: f64, value: Value) -> Self {
        Self {
            frame: Some(frame),
            value,
            curve: None,
            motion_path: None,
        }
    }

    pub fn with_curve(mut self, curve: CurveHint) -> Self {
        self.curve = Some(curve);
        self
    }
}

/// Segment timing: an easing name (`"cubicInOut"`, `"constant"`) or cubic-bezier
/// timing control points `[x1, y1, x2, y2]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CurveHint {
    Named(String),
    Bezier([f64; 4]),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    pub frame: f64,
    pub func: String,
    #[serde(default)]
    pub params: Vec<serde_json::Value>,
}

/// One property curve as laid out in the clip, with its owner.
#[derive(Clone, Copy, Debug)]
pub struct CurveSpec<'a> {
    pub child: Option<&'a str>,
    pub component: Option<&'a str>,
    pub property: &'a str,
    pub keyframes: &'a [Keyframe],
}

fn push_owner<'a>(
    out: &mut Vec<CurveSpec<'a>>,
    child: Option<&'a str>,
    props: &'a IndexMap<String, Vec<Keyframe>>,
    comps: &'a IndexMap<String, IndexMap<String, Vec<Keyframe>>>,
) {
    for (property, keyframes) in props {
        out.push(CurveSpec {
            child,
            component: None,
            property,
            keyframes,
        });
    }
    for (component, props) in comps {
        for (property, keyframes) in props {
            out.push(CurveSpec {
                child,
                component: Some(component.as_str()),
                property,
                keyframes,
            });
        }
    }
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, duration: f64) -> Self {
        Self {
            name: name.into(),
            duration,
            sample: None,
            speed: 1.0,
            wrap_mode: WrapMode::Default,
            curve_data: CurveData::default(),
            events: Vec::new(),
        }
    }

    /// Parse a clip from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let clip: AnimationClip = serde_json::from_str(json)?;
        clip.validate()?;
        Ok(clip)
    }

    /// Add a root property curve (builder style).
    pub fn with_prop(mut self, property: impl Into<String>, keyframes: Vec<Keyframe>) -> Self {
        self.curve_data.props.insert(property.into(), keyframes);
        self
    }

    pub fn with_event(mut self, frame: f64, func: impl Into<String>, params: Vec<serde_json::Value>) -> Self {
        self.events.push(EventData {
            frame,
            func: func.into(),
            params,
        });
        self
    }

    /// All property curves in binding order: root props, root components, then
    /// each child path's props and components.
    pub fn curve_specs(&self) -> Vec<CurveSpec<'_>> {
        let data = &self.curve_data;
        let mut out = Vec::new();
        push_owner(&mut out, None, &data.props, &data.comps);
        for (child, node) in &data.paths {
            push_owner(&mut out, Some(child.as_str()), &node.props, &node.comps);
        }
        out
    }

    fn invalid(&self, reason: impl Into<String>) -> AnimationError {
        AnimationError::InvalidClip {
            clip: self.name.clone(),
            reason: reason.into(),
        }
    }

    /// Structural checks that do not need a target.
    pub fn validate(&self) -> Result<()> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(self.invalid(format!("duration must be >= 0, got {}", self.duration)));
        }
        if !self.speed.is_finite() {
            return Err(self.invalid("speed must be finite"));
        }
        if let Some(sample) = self.sample {
            if !(sample.is_finite() && sample > 0.0) {
                return Err(self.invalid(format!("sample rate must be > 0, got {sample}")));
            }
        }
        for ev in &self.events {
            if !ev.frame.is_finite() {
                return Err(self.invalid(format!("event '{}' has a non-finite frame", ev.func)));
            }
        }
        for spec in self.curve_specs() {
            for kf in spec.keyframes {
                if kf.frame.is_some_and(|f| !f.is_finite()) {
                    return Err(self.invalid(format!("'{}' has a non-finite frame", spec.property)));
                }
            }
        }
        Ok(())
    }
}

/// Fill missing keyframe ratios.
///
/// A missing first ratio becomes 0 and a missing last ratio becomes 1. Runs of
/// missing ratios between two known ones are spaced evenly.
pub fn compute_null_ratios(ratios: &[Option<f64>]) -> Vec<f64> {
    let len = ratios.len();
    let mut out = vec![0.0; len];
    let mut last_index = 0usize;
    let mut last_ratio = 0.0;
    for (i, explicit) in ratios.iter().enumerate() {
        let ratio = match *explicit {
            Some(r) => r,
            None if i == 0 => 0.0,
            None if i == len - 1 => 1.0,
            None => continue,
        };
        if last_index + 1 < i {
            let count = (i - last_index) as f64;
            for (k, j) in (last_index + 1..i).enumerate() {
                out[j] = last_ratio + (ratio - last_ratio) * (k + 1) as f64 / count;
            }
        }
        out[i] = ratio;
        last_index = i;
        last_ratio = ratio;
    }
    out
}

/// Ratios for a keyframe list on a clip of `duration` seconds. Explicit frames must
/// not go backwards.
pub fn keyframe_ratios(property: &str, keyframes: &[Keyframe], duration: f64) -> Result<Vec<f64>> {
    let explicit: Vec<Option<f64>> = keyframes
        .iter()
        .map(|kf| {
            kf.frame.map(|f| {
                if duration > 0.0 {
                    f / duration
                } else {
                    0.0
                }
            })
        })
        .collect();
    let ratios = compute_null_ratios(&explicit);
    for pair in ratios.windows(2) {
        if pair[1] < pair[0] {
            return Err(AnimationError::NonMonotonicKeyframes {
                property: property.to_string(),
                previous: pair[0],
                next: pair[1],
            });
        }
    }
    Ok(ratios)
}
