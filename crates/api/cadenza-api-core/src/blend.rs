//! Blending utilities for Value types.
//! - f64 linear interpolation for floats and vector/color components
//! - elementwise blending for generic Vector
//! - field-by-field blending for Record
//! - step blending for Bool/Text (hold the left value until t reaches 1)

use crate::coercion;
use crate::Value;

/// Linear interpolation for f64
#[inline]
pub fn lerp_f(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Lerp for fixed-size arrays
pub fn lerp_array<const N: usize>(a: &[f64; N], b: &[f64; N], t: f64) -> [f64; N] {
    let mut out = [0.0f64; N];
    for i in 0..N {
        out[i] = lerp_f(a[i], b[i], t);
    }
    out
}

/// Blend two generic vectors elementwise. If lengths differ, treat missing elements as 0.0.
fn blend_vector(a: &[f64], b: &[f64], t: f64) -> Vec<f64> {
    let n = std::cmp::max(a.len(), b.len());
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let ai = a.get(i).copied().unwrap_or(0.0);
        let bi = b.get(i).copied().unwrap_or(0.0);
        out.push(lerp_f(ai, bi, t));
    }
    out
}

/// Blend two Values according to their kinds.
/// Mismatched numeric kinds fall back to Vector blending through coercion;
/// anything else steps.
pub fn blend_values(a: &Value, b: &Value, t: f64) -> Value {
    match (a, b) {
        (Value::Float(af), Value::Float(bf)) => Value::Float(lerp_f(*af, *bf, t)),

        (Value::Vec2(aa), Value::Vec2(bb)) => Value::Vec2(lerp_array(aa, bb, t)),
        (Value::Vec3(aa), Value::Vec3(bb)) => Value::Vec3(lerp_array(aa, bb, t)),
        (Value::Vec4(aa), Value::Vec4(bb)) => Value::Vec4(lerp_array(aa, bb, t)),

        (Value::ColorRgba(ac), Value::ColorRgba(bc)) => Value::ColorRgba(lerp_array(ac, bc, t)),

        (Value::Record(ma), Value::Record(mb)) => {
            let mut out = ma.clone();
            for (key, va) in out.iter_mut() {
                if let Some(vb) = mb.get(key) {
                    *va = blend_values(va, vb, t);
                }
            }
            Value::Record(out)
        }

        (Value::Vector(va), Value::Vector(vb)) => Value::Vector(blend_vector(va, vb, t)),

        (a_val, b_val) => {
            if a_val.kind().is_step() || b_val.kind().is_step() {
                return step_blend(a_val, b_val, t);
            }
            match (coercion::to_vector(a_val), coercion::to_vector(b_val)) {
                (Some(va), Some(vb)) => Value::Vector(blend_vector(&va, &vb, t)),
                _ => step_blend(a_val, b_val, t),
            }
        }
    }
}

/// Step blending for step-only types: keep `a` until `t` reaches 1.
pub fn step_blend(a: &Value, b: &Value, t: f64) -> Value {
    if t < 1.0 {
        a.clone()
    } else {
        b.clone()
    }
}
