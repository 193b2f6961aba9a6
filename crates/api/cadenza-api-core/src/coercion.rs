//! Coercion helpers between Value shapes.

use crate::Value;

/// Numeric components as an owned vector; None for step and record kinds.
pub fn to_vector(v: &Value) -> Option<Vec<f64>> {
    v.components().map(<[f64]>::to_vec)
}

/// Read a planar point from Vec2/Vec3/Vector values (z is dropped).
pub fn to_vec2(v: &Value) -> Option<[f64; 2]> {
    match v.components()? {
        [x, y, ..] => Some([*x, *y]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_points() {
        assert_eq!(to_vec2(&Value::vec3(1.0, 2.0, 3.0)), Some([1.0, 2.0]));
        assert_eq!(to_vec2(&Value::Vector(vec![4.0, 5.0])), Some([4.0, 5.0]));
        assert_eq!(to_vec2(&Value::f(1.0)), None);
        assert_eq!(to_vec2(&Value::Text("x".into())), None);
        assert_eq!(to_vector(&Value::vec2(1.0, 2.0)), Some(vec![1.0, 2.0]));
        assert_eq!(to_vector(&Value::Bool(true)), None);
    }
}
