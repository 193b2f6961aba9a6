//! Value: runtime property values read from and written to animation targets.
//! All numeric data uses f64.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Coarse kind tag used for quick dispatch (step vs. lerp, field lookup).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Float,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    ColorRgba,
    Vector,
    Record,
    Text,
}

impl ValueKind {
    /// Kinds that never interpolate; they hold the left keyframe.
    #[inline]
    pub fn is_step(self) -> bool {
        matches!(self, ValueKind::Bool | ValueKind::Text)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Value {
    /// Scalar float
    Float(f64),

    /// Boolean (step)
    Bool(bool),

    /// 2D vector (x, y)
    Vec2([f64; 2]),

    /// 3D vector (x, y, z)
    Vec3([f64; 3]),

    /// 4D vector (x, y, z, w)
    Vec4([f64; 4]),

    /// RGBA color; channel scale is up to the target (0..1 or 0..255)
    ColorRgba([f64; 4]),

    /// Generic, variable-length numeric vector
    Vector(Vec<f64>),

    /// Named fields, for composite values that are not plain vectors
    Record(HashMap<String, Value>),

    /// Text / string; step-only for interpolation
    Text(String),
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Vec4(_) => ValueKind::Vec4,
            Value::ColorRgba(_) => ValueKind::ColorRgba,
            Value::Vector(_) => ValueKind::Vector,
            Value::Record(_) => ValueKind::Record,
            Value::Text(_) => ValueKind::Text,
        }
    }

    /// Convenience constructors
    pub fn f(v: f64) -> Self {
        Value::Float(v)
    }

    pub fn vec2(x: f64, y: f64) -> Self {
        Value::Vec2([x, y])
    }

    pub fn vec3(x: f64, y: f64, z: f64) -> Self {
        Value::Vec3([x, y, z])
    }

    pub fn color(r: f64, g: f64, b: f64, a: f64) -> Self {
        Value::ColorRgba([r, g, b, a])
    }

    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric components of fixed-size kinds, in storage order.
    pub fn components(&self) -> Option<&[f64]> {
        match self {
            Value::Float(f) => Some(std::slice::from_ref(f)),
            Value::Vec2(a) => Some(&a[..]),
            Value::Vec3(a) => Some(&a[..]),
            Value::Vec4(a) | Value::ColorRgba(a) => Some(&a[..]),
            Value::Vector(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    fn components_mut(&mut self) -> Option<&mut [f64]> {
        match self {
            Value::Float(f) => Some(std::slice::from_mut(f)),
            Value::Vec2(a) => Some(&mut a[..]),
            Value::Vec3(a) => Some(&mut a[..]),
            Value::Vec4(a) | Value::ColorRgba(a) => Some(&mut a[..]),
            Value::Vector(v) => Some(v.as_mut_slice()),
            _ => None,
        }
    }

    /// Component-wise sum. Kinds must match (records add field by field).
    pub fn add(&self, other: &Value) -> Option<Value> {
        match (self, other) {
            (Value::Record(a), Value::Record(b)) => {
                let mut out = a.clone();
                for (key, delta) in b {
                    let slot = out.get_mut(key)?;
                    *slot = slot.add(delta)?;
                }
                Some(Value::Record(out))
            }
            (a, b) if a.kind() == b.kind() => {
                let mut out = a.clone();
                let lhs = out.components_mut()?;
                let rhs = b.components()?;
                if lhs.len() != rhs.len() {
                    return None;
                }
                for (l, r) in lhs.iter_mut().zip(rhs) {
                    *l += *r;
                }
                Some(out)
            }
            _ => None,
        }
    }

    /// Multiply every numeric component by `k`. Step kinds are returned unchanged.
    pub fn scale(&self, k: f64) -> Value {
        let mut out = self.clone();
        match &mut out {
            Value::Record(fields) => {
                for v in fields.values_mut() {
                    *v = v.scale(k);
                }
            }
            other => {
                if let Some(c) = other.components_mut() {
                    c.iter_mut().for_each(|x| *x *= k);
                }
            }
        }
        out
    }

    /// Negated copy; used when reversing relative ("by") animations.
    #[inline]
    pub fn neg(&self) -> Value {
        self.scale(-1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_matching_kinds() {
        let a = Value::vec2(1.0, 2.0);
        let b = Value::vec2(0.5, -2.0);
        assert_eq!(a.add(&b), Some(Value::vec2(1.5, 0.0)));
        assert_eq!(a.add(&Value::f(1.0)), None);
    }

    #[test]
    fn neg_record_recurses() {
        let r = Value::record([("a", Value::f(2.0)), ("b", Value::vec2(1.0, -1.0))]);
        let n = r.neg();
        assert_eq!(
            n,
            Value::record([("a", Value::f(-2.0)), ("b", Value::vec2(-1.0, 1.0))])
        );
    }

    #[test]
    fn serde_tagged_lowercase() {
        let v: Value = serde_json::from_str(r#"{"type":"colorrgba","data":[1,0,0,1]}"#).unwrap();
        assert_eq!(v, Value::color(1.0, 0.0, 0.0, 1.0));
    }
}
