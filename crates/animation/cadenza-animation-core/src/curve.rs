//! Keyframed property curves.
//!
//! A curve maps a normalized clip ratio onto a [`Value`]. Ratios are located by an
//! epsilon-tolerant binary search (or, for flattened tracks, an index computed from
//! the uniform step). Between keyframes the left keyframe's [`SegmentCurve`] reshapes
//! the local ratio before the values are blended.

use cadenza_api_core::blend::blend_values;
use cadenza_api_core::Value;

use crate::data::{keyframe_ratios, CurveHint, Keyframe};
use crate::easing::Easing;
use crate::error::{AnimationError, Result};

/// Two ratios closer than this address the same keyframe.
pub const RATIO_EPSILON: f64 = 1e-6;

/// Timing of one segment, taken from its left keyframe.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum SegmentCurve {
    #[default]
    Linear,
    Eased(Easing),
    /// Hold the left value until the next keyframe.
    Constant,
}

impl SegmentCurve {
    /// Resolve an authored hint. Unknown names fall back to linear with a warning.
    pub fn from_hint(hint: Option<&CurveHint>) -> Result<Self> {
        match hint {
            None => Ok(SegmentCurve::Linear),
            Some(CurveHint::Named(name)) if name == "constant" => Ok(SegmentCurve::Constant),
            Some(CurveHint::Named(name)) => match Easing::from_name(name) {
                Some(Easing::Linear) => Ok(SegmentCurve::Linear),
                Some(easing) => Ok(SegmentCurve::Eased(easing)),
                None => {
                    log::warn!("unknown curve easing '{name}', using linear");
                    Ok(SegmentCurve::Linear)
                }
            },
            Some(CurveHint::Bezier([x1, y1, x2, y2])) => {
                Ok(SegmentCurve::Eased(Easing::cubic_bezier(*x1, *y1, *x2, *y2)?))
            }
        }
    }

    /// Reshape a local segment ratio.
    #[inline]
    pub fn remap(&self, t: f64) -> f64 {
        match self {
            SegmentCurve::Linear => t,
            SegmentCurve::Eased(easing) => easing.apply(t),
            SegmentCurve::Constant => 0.0,
        }
    }
}

/// How the curve locates a ratio.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CurveMode {
    /// Binary search over arbitrary keyframe ratios.
    #[default]
    Dynamic,
    /// Uniformly spaced ratios; index computed from the step.
    Sampled,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimationCurve {
    ratios: Vec<f64>,
    values: Vec<Value>,
    segments: Vec<SegmentCurve>,
    mode: CurveMode,
}

fn search(ratios: &[f64], ratio: f64) -> std::result::Result<usize, usize> {
    let (mut lo, mut hi) = (0isize, ratios.len() as isize - 1);
    while lo <= hi {
        let mid = (lo + hi) / 2;
        let probe = ratios[mid as usize];
        if (probe - ratio).abs() < RATIO_EPSILON {
            return Ok(mid as usize);
        }
        if probe > ratio {
            hi = mid - 1;
        } else {
            lo = mid + 1;
        }
    }
    Err(lo as usize)
}

impl AnimationCurve {
    pub fn new(ratios: Vec<f64>, values: Vec<Value>, segments: Vec<SegmentCurve>) -> Result<Self> {
        if ratios.len() != values.len() {
            return Err(AnimationError::InvalidClip {
                clip: String::new(),
                reason: format!("{} ratios for {} values", ratios.len(), values.len()),
            });
        }
        let mut segments = segments;
        segments.resize(ratios.len(), SegmentCurve::Linear);
        Ok(Self {
            ratios,
            values,
            segments,
            mode: CurveMode::Dynamic,
        })
    }

    /// Build from authored keyframes on a clip of `duration` seconds.
    pub fn from_keyframes(property: &str, keyframes: &[Keyframe], duration: f64) -> Result<Self> {
        let ratios = keyframe_ratios(property, keyframes, duration)?;
        let values = keyframes.iter().map(|kf| kf.value.clone()).collect();
        let segments = keyframes
            .iter()
            .map(|kf| SegmentCurve::from_hint(kf.curve.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(ratios, values, segments)
    }

    pub fn with_mode(mut self, mode: CurveMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> CurveMode {
        self.mode
    }

    pub fn ratios(&self) -> &[f64] {
        &self.ratios
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn segments(&self) -> &[SegmentCurve] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.ratios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty()
    }

    fn locate(&self, ratio: f64) -> std::result::Result<usize, usize> {
        match self.mode {
            CurveMode::Dynamic => search(&self.ratios, ratio),
            CurveMode::Sampled => self.locate_sampled(ratio),
        }
    }

    fn locate_sampled(&self, ratio: f64) -> std::result::Result<usize, usize> {
        let n = self.ratios.len();
        let (first, last) = (self.ratios[0], self.ratios[n - 1]);
        if n < 2 || last <= first {
            return search(&self.ratios, ratio);
        }
        if ratio <= first {
            return if first - ratio < RATIO_EPSILON { Ok(0) } else { Err(0) };
        }
        if ratio >= last {
            return if ratio - last < RATIO_EPSILON { Ok(n - 1) } else { Err(n) };
        }
        let step = (last - first) / (n - 1) as f64;
        let mut i = (((ratio - first) / step).floor() as usize).min(n - 2);
        // The tail segment may be shorter than the step.
        while i > 0 && self.ratios[i] > ratio {
            i -= 1;
        }
        while i + 2 < n && self.ratios[i + 1] <= ratio {
            i += 1;
        }
        if (self.ratios[i] - ratio).abs() < RATIO_EPSILON {
            Ok(i)
        } else if (self.ratios[i + 1] - ratio).abs() < RATIO_EPSILON {
            Ok(i + 1)
        } else {
            Err(i + 1)
        }
    }

    /// Value at `ratio`, clamped to the first/last keyframe outside the keyed range.
    pub fn sample(&self, ratio: f64) -> Option<Value> {
        let n = self.values.len();
        if n == 0 {
            return None;
        }
        let index = match self.locate(ratio) {
            Ok(i) => return Some(self.values[i].clone()),
            Err(0) => return Some(self.values[0].clone()),
            Err(i) if i >= n => return Some(self.values[n - 1].clone()),
            Err(i) => i,
        };
        let from = &self.values[index - 1];
        let segment = self.segments[index - 1];
        if from.kind().is_step() || segment == SegmentCurve::Constant {
            return Some(from.clone());
        }
        let (r0, r1) = (self.ratios[index - 1], self.ratios[index]);
        let span = r1 - r0;
        let t = if span > 0.0 { (ratio - r0) / span } else { 0.0 };
        Some(blend_values(from, &self.values[index], segment.remap(t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floats(ratios: &[f64], values: &[f64]) -> AnimationCurve {
        AnimationCurve::new(
            ratios.to_vec(),
            values.iter().map(|v| Value::f(*v)).collect(),
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn clamps_and_hits_keys() {
        let c = floats(&[0.2, 0.6], &[10.0, 20.0]);
        assert_eq!(c.sample(0.0), Some(Value::f(10.0)));
        assert_eq!(c.sample(0.6000001), Some(Value::f(20.0)));
        assert_eq!(c.sample(1.0), Some(Value::f(20.0)));
        let mid = c.sample(0.4).and_then(|v| v.as_float()).unwrap();
        assert!((mid - 15.0).abs() < 1e-9);
    }

    #[test]
    fn constant_segment_holds() {
        let c = AnimationCurve::new(
            vec![0.0, 1.0],
            vec![Value::f(0.0), Value::f(1.0)],
            vec![SegmentCurve::Constant],
        )
        .unwrap();
        assert_eq!(c.sample(0.99), Some(Value::f(0.0)));
        assert_eq!(c.sample(1.0), Some(Value::f(1.0)));
    }

    #[test]
    fn sampled_mode_matches_dynamic() {
        let ratios: Vec<f64> = (0..=10).map(|i| i as f64 / 10.0).collect();
        let values: Vec<f64> = ratios.iter().map(|r| r * 100.0).collect();
        let dynamic = floats(&ratios, &values);
        let sampled = dynamic.clone().with_mode(CurveMode::Sampled);
        for probe in [0.0, 0.05, 0.33, 0.5, 0.999, 1.0, 1.5] {
            assert_eq!(dynamic.sample(probe), sampled.sample(probe), "ratio {probe}");
        }
    }

    #[test]
    fn hint_resolution() {
        assert_eq!(SegmentCurve::from_hint(None).unwrap(), SegmentCurve::Linear);
        assert_eq!(
            SegmentCurve::from_hint(Some(&CurveHint::Named("constant".into()))).unwrap(),
            SegmentCurve::Constant
        );
        assert_eq!(
            SegmentCurve::from_hint(Some(&CurveHint::Named("quadIn".into()))).unwrap(),
            SegmentCurve::Eased(crate::easing::QUAD_IN)
        );
        assert!(SegmentCurve::from_hint(Some(&CurveHint::Bezier([2.0, 0.0, 0.5, 1.0]))).is_err());
    }
}
