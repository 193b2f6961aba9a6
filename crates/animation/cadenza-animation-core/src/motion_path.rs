//! Motion path flattening.
//!
//! A `position` keyframe may carry bezier control points that bend the segment to
//! the next keyframe. Flattening walks each segment at the clip's frame rate and
//! records one arc-length-parameterised point per frame, producing a uniformly
//! spaced track that the curve samples in O(1).

use cadenza_api_core::{coercion, Value};

use crate::curve::SegmentCurve;
use crate::data::Keyframe;

const EPSILON: f64 = 1e-6;

type Vec2 = [f64; 2];

#[inline]
fn sub(a: Vec2, b: Vec2) -> Vec2 {
    [a[0] - b[0], a[1] - b[1]]
}

#[inline]
fn add_scaled(a: Vec2, dir: Vec2, k: f64) -> Vec2 {
    [a[0] + dir[0] * k, a[1] + dir[1] * k]
}

#[inline]
fn dist(a: Vec2, b: Vec2) -> f64 {
    let d = sub(a, b);
    d[0].hypot(d[1])
}

fn normalize(v: Vec2) -> Vec2 {
    let len = v[0].hypot(v[1]);
    if len > 0.0 {
        [v[0] / len, v[1] / len]
    } else {
        [0.0, 0.0]
    }
}

#[inline]
fn cubic(a: f64, b: f64, c: f64, d: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * a + 3.0 * u * u * t * b + 3.0 * u * t * t * c + t * t * t * d
}

/// A point on the path with its incoming and outgoing handles.
#[derive(Copy, Clone, Debug, PartialEq)]
struct ControlPoint {
    pos: Vec2,
    in_ctrl: Vec2,
    out_ctrl: Vec2,
}

impl ControlPoint {
    fn at(pos: Vec2) -> Self {
        Self {
            pos,
            in_ctrl: pos,
            out_ctrl: pos,
        }
    }

    fn from_raw(raw: &[f64]) -> Option<Self> {
        match *raw {
            [x, y] => Some(Self::at([x, y])),
            [x, y, ix, iy, ox, oy] => Some(Self {
                pos: [x, y],
                in_ctrl: [ix, iy],
                out_ctrl: [ox, oy],
            }),
            _ => None,
        }
    }
}

/// Cubic bezier with a cached arc-length table.
#[derive(Clone, Debug)]
pub struct Bezier {
    pub start: Vec2,
    pub start_ctrl: Vec2,
    pub end_ctrl: Vec2,
    pub end: Vec2,
    lengths: Vec<f64>,
}

impl Bezier {
    pub fn new(start: Vec2, start_ctrl: Vec2, end_ctrl: Vec2, end: Vec2, divisions: usize) -> Self {
        let mut bezier = Self {
            start,
            start_ctrl,
            end_ctrl,
            end,
            lengths: Vec::new(),
        };
        let divisions = divisions.max(1);
        let mut lengths = Vec::with_capacity(divisions + 1);
        lengths.push(0.0);
        let mut last = bezier.point(0.0);
        let mut total = 0.0;
        for p in 1..=divisions {
            let current = bezier.point(p as f64 / divisions as f64);
            total += dist(current, last);
            lengths.push(total);
            last = current;
        }
        bezier.lengths = lengths;
        bezier
    }

    /// Point at curve parameter `t`.
    pub fn point(&self, t: f64) -> Vec2 {
        [
            cubic(self.start[0], self.start_ctrl[0], self.end_ctrl[0], self.end[0], t),
            cubic(self.start[1], self.start_ctrl[1], self.end_ctrl[1], self.end[1], t),
        ]
    }

    pub fn length(&self) -> f64 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    /// Curve parameter at arc-length fraction `u`.
    pub fn u_to_t(&self, u: f64) -> f64 {
        let n = self.lengths.len();
        if n < 2 {
            return u;
        }
        let target = u.clamp(0.0, 1.0) * self.length();
        let first_ge = self.lengths.partition_point(|&l| l < target);
        if first_ge < n && self.lengths[first_ge] == target {
            return first_ge as f64 / (n - 1) as f64;
        }
        let i = first_ge.saturating_sub(1).min(n - 2);
        let before = self.lengths[i];
        let span = self.lengths[i + 1] - before;
        if span <= 0.0 {
            return i as f64 / (n - 1) as f64;
        }
        (i as f64 + (target - before) / span) / (n - 1) as f64
    }

    /// Point at arc-length fraction `u`.
    pub fn point_at(&self, u: f64) -> Vec2 {
        self.point(self.u_to_t(u))
    }
}

/// Chain of beziers with each piece's share of the total length.
struct BezierChain {
    beziers: Vec<Bezier>,
    shares: Vec<f64>,
    progresses: Vec<f64>,
}

impl BezierChain {
    fn new(points: &[ControlPoint], divisions: usize) -> Option<Self> {
        let beziers: Vec<Bezier> = points
            .windows(2)
            .map(|w| Bezier::new(w[0].pos, w[0].out_ctrl, w[1].in_ctrl, w[1].pos, divisions))
            .collect();
        let total: f64 = beziers.iter().map(Bezier::length).sum();
        if beziers.is_empty() || !(total > 0.0) {
            return None;
        }
        let shares: Vec<f64> = beziers.iter().map(|b| b.length() / total).collect();
        let mut acc = 0.0;
        let progresses = shares
            .iter()
            .map(|s| {
                acc += s;
                acc
            })
            .collect();
        Some(Self {
            beziers,
            shares,
            progresses,
        })
    }

    /// Position at path progress `p`; values outside [0, 1] continue along the end
    /// tangents.
    fn position(&self, p: f64) -> Vec2 {
        let last = self.beziers.len() - 1;
        if p < 0.0 {
            let b = &self.beziers[0];
            let normal = normalize(sub(b.start, b.end_ctrl));
            return add_scaled(b.start, normal, -p * b.length());
        }
        if p > 1.0 {
            let b = &self.beziers[last];
            let normal = normalize(sub(b.end, b.start_ctrl));
            return add_scaled(b.end, normal, (p - 1.0) * b.length());
        }
        let index = match search(&self.progresses, p) {
            Ok(i) => i,
            Err(i) => i,
        }
        .min(last);
        let before = if index > 0 { self.progresses[index - 1] } else { 0.0 };
        let local = (p - before) / self.shares[index];
        self.beziers[index].point_at(local)
    }
}

/// Binary search tolerant to `EPSILON`: `Ok(i)` on a hit, `Err(insert)` otherwise.
fn search(sorted: &[f64], value: f64) -> Result<usize, usize> {
    let (mut lo, mut hi) = (0isize, sorted.len() as isize - 1);
    while lo <= hi {
        let mid = (lo + hi) / 2;
        let probe = sorted[mid as usize];
        if (probe - value).abs() < EPSILON {
            return Ok(mid as usize);
        }
        if probe > value {
            hi = mid - 1;
        } else {
            lo = mid + 1;
        }
    }
    Err(lo as usize)
}

/// Flattened track ready to become a sampled curve.
#[derive(Clone, Debug, PartialEq)]
pub struct FlattenedTrack {
    pub ratios: Vec<f64>,
    pub values: Vec<Value>,
    pub segments: Vec<SegmentCurve>,
}

fn control_points(keyframe: &Keyframe) -> Option<Vec<ControlPoint>> {
    let raw = keyframe.motion_path.as_ref()?;
    if raw.is_empty() {
        return None;
    }
    let points: Option<Vec<ControlPoint>> = raw.iter().map(|p| ControlPoint::from_raw(p)).collect();
    if points.is_none() {
        log::warn!("motion path ignored: control points need 2 or 6 numbers");
    }
    points
}

/// Whether any keyframe carries a well-formed motion path.
pub fn has_motion_paths(keyframes: &[Keyframe]) -> bool {
    keyframes.iter().any(|kf| control_points(kf).is_some())
}

/// Flatten `position` keyframes that carry motion paths into one value per frame at
/// `fps`. Returns `None` (leave the curve as authored) when no keyframe has a valid
/// path or a value is not two-dimensional.
pub fn sample_motion_paths(
    keyframes: &[Keyframe],
    ratios: &[f64],
    segments: &[SegmentCurve],
    duration: f64,
    fps: f64,
    divisions: usize,
) -> Option<FlattenedTrack> {
    if keyframes.len() < 2 || !has_motion_paths(keyframes) || !(duration > 0.0 && fps > 0.0) {
        return None;
    }
    let points: Option<Vec<Vec2>> = keyframes.iter().map(|kf| coercion::to_vec2(&kf.value)).collect();
    let Some(points) = points else {
        log::warn!("motion path ignored: keyframe values are not 2D positions");
        return None;
    };

    let mut out = FlattenedTrack {
        ratios: Vec::new(),
        values: Vec::new(),
        segments: Vec::new(),
    };
    let mut start_offset = 0.0;
    let mut flat_segment = SegmentCurve::Linear;

    for i in 0..keyframes.len() - 1 {
        let ratio = ratios[i];
        let between = ratios[i + 1] - ratio;
        let segment = segments.get(i).copied().unwrap_or(SegmentCurve::Linear);
        flat_segment = if segment == SegmentCurve::Constant {
            SegmentCurve::Constant
        } else {
            SegmentCurve::Linear
        };
        if between <= 0.0 {
            continue;
        }
        let speed = 1.0 / (between * duration * fps);
        let mut progress = start_offset / between;
        let mut results = Vec::new();

        let chain = control_points(&keyframes[i]).and_then(|mid| {
            let mut path = Vec::with_capacity(mid.len() + 2);
            path.push(ControlPoint::at(points[i]));
            path.extend(mid);
            path.push(ControlPoint::at(points[i + 1]));
            BezierChain::new(&path, divisions)
        });

        while 1.0 - progress > EPSILON {
            let p = segment.remap(progress);
            let pos = match &chain {
                Some(chain) => chain.position(p),
                None => [
                    points[i][0] + (points[i + 1][0] - points[i][0]) * p,
                    points[i][1] + (points[i + 1][1] - points[i][1]) * p,
                ],
            };
            results.push(pos);
            progress += speed;
        }

        for (j, pos) in results.into_iter().enumerate() {
            out.ratios.push(ratio + start_offset + speed * j as f64 * between);
            out.values.push(Value::Vec2(pos));
            out.segments.push(flat_segment);
        }

        start_offset = if (progress - 1.0).abs() > EPSILON {
            (progress - 1.0) * between
        } else {
            0.0
        };
    }

    let last_ratio = ratios[ratios.len() - 1];
    if out.ratios.last() != Some(&last_ratio) {
        out.ratios.push(last_ratio);
        out.values.push(Value::Vec2(points[points.len() - 1]));
        out.segments.push(flat_segment);
    }
    Some(out)
}
