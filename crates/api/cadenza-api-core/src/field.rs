//! Compiled field accessors for composite values.
//!
//! A property such as `scale.x` or `foo.bar.a` addresses a sub-field of the value
//! stored on the target. The selector chain is resolved once against a sample value
//! into a [`FieldPath`] of positional/keyed steps, so per-frame writes never
//! re-parse strings.

use crate::error::PathError;
use crate::{Value, ValueKind};

/// One resolved step into a composite value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldSel {
    /// Component index into a numeric kind (VecN, ColorRgba, Vector).
    Index(usize),
    /// Key into a Record.
    Key(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldPath {
    steps: Vec<FieldSel>,
}

/// Map a component name onto its index for the given kind.
fn component_index(kind: ValueKind, name: &str) -> Option<usize> {
    if let Ok(i) = name.parse::<usize>() {
        return Some(i);
    }
    match (kind, name) {
        (ValueKind::ColorRgba, "r") => Some(0),
        (ValueKind::ColorRgba, "g") => Some(1),
        (ValueKind::ColorRgba, "b") => Some(2),
        (ValueKind::ColorRgba, "a") => Some(3),
        (ValueKind::Vec2, "width") => Some(0),
        (ValueKind::Vec2, "height") => Some(1),
        (ValueKind::ColorRgba, _) => None,
        (_, "x") => Some(0),
        (_, "y") => Some(1),
        (_, "z") => Some(2),
        (_, "w") => Some(3),
        _ => None,
    }
}

impl FieldPath {
    /// Resolve `fields` against `sample`, the current value of the property.
    pub fn compile<S: AsRef<str>>(sample: &Value, fields: &[S]) -> Result<Self, PathError> {
        let mut steps = Vec::with_capacity(fields.len());
        let mut cursor = Some(sample);
        for field in fields {
            let field = field.as_ref();
            let current = match cursor {
                Some(v) => v,
                None => {
                    return Err(PathError::NotComposite {
                        field: field.to_string(),
                        kind: ValueKind::Float,
                    })
                }
            };
            match current {
                Value::Record(map) => {
                    let next = map.get(field).ok_or_else(|| PathError::UnknownField {
                        field: field.to_string(),
                        kind: ValueKind::Record,
                    })?;
                    steps.push(FieldSel::Key(field.to_string()));
                    cursor = Some(next);
                }
                Value::Vec2(_)
                | Value::Vec3(_)
                | Value::Vec4(_)
                | Value::ColorRgba(_)
                | Value::Vector(_) => {
                    let len = current.components().map_or(0, <[f64]>::len);
                    let idx = component_index(current.kind(), field)
                        .filter(|i| *i < len)
                        .ok_or_else(|| PathError::UnknownField {
                            field: field.to_string(),
                            kind: current.kind(),
                        })?;
                    steps.push(FieldSel::Index(idx));
                    // Components are scalars: nothing below them.
                    cursor = None;
                }
                other => {
                    return Err(PathError::NotComposite {
                        field: field.to_string(),
                        kind: other.kind(),
                    })
                }
            }
        }
        Ok(Self { steps })
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[FieldSel] {
        &self.steps
    }

    /// Read the addressed sub-value.
    pub fn read(&self, base: &Value) -> Option<Value> {
        let mut cur = base;
        for (i, step) in self.steps.iter().enumerate() {
            match (step, cur) {
                (FieldSel::Key(k), Value::Record(map)) => cur = map.get(k)?,
                (FieldSel::Index(idx), v) => {
                    let c = *v.components()?.get(*idx)?;
                    return if i + 1 == self.steps.len() {
                        Some(Value::Float(c))
                    } else {
                        None
                    };
                }
                _ => return None,
            }
        }
        Some(cur.clone())
    }

    /// Overwrite the addressed sub-value in place. Returns false if the shape no
    /// longer matches (e.g. the target swapped the value kind since binding).
    pub fn write_into(&self, base: &mut Value, leaf: Value) -> bool {
        let Some((last, prefix)) = self.steps.split_last() else {
            *base = leaf;
            return true;
        };
        let mut cur = base;
        for step in prefix {
            cur = match (step, cur) {
                (FieldSel::Key(k), Value::Record(map)) => match map.get_mut(k) {
                    Some(next) => next,
                    None => return false,
                },
                _ => return false,
            };
        }
        match (last, cur) {
            (FieldSel::Key(k), Value::Record(map)) => match map.get_mut(k) {
                Some(slot) => {
                    *slot = leaf;
                    true
                }
                None => false,
            },
            (FieldSel::Index(idx), target) => {
                let Value::Float(x) = leaf else {
                    return false;
                };
                match target {
                    Value::Vec2(a) if *idx < 2 => a[*idx] = x,
                    Value::Vec3(a) if *idx < 3 => a[*idx] = x,
                    Value::Vec4(a) | Value::ColorRgba(a) if *idx < 4 => a[*idx] = x,
                    Value::Vector(v) if *idx < v.len() => v[*idx] = x,
                    _ => return false,
                }
                true
            }
            _ => false,
        }
    }

    /// Clone `base`, overwrite the addressed sub-field with `leaf` and return the copy.
    pub fn patch(&self, base: &Value, leaf: Value) -> Option<Value> {
        let mut out = base.clone();
        if self.write_into(&mut out, leaf) {
            Some(out)
        } else {
            None
        }
    }
}
