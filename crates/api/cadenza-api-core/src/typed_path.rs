//! TypedPath parsing and formatting.
//!
//! Grammar:
//!   child/.../property.field.subfield
//! - '/' separates child node segments, relative to the animated root
//! - The last segment holds the `property` and optional `.`-separated field selectors
//!   Examples:
//!   "position" -> children=[], property="position", fields=[]
//!   "scale.x" -> children=[], property="scale", fields=["x"]
//!   "bar/baz/testColor.a" -> children=["bar","baz"], property="testColor", fields=["a"]
//!
//! Clip data keys curves by property name ("scale.x") and child path ("bar/baz")
//! separately; `TypedPath::from_parts` joins them into one value.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::PathError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypedPath {
    /// Child segments preceding the property (may be empty)
    pub children: Vec<String>,
    /// Property name on the resolved target
    pub property: String,
    /// Ordered field selectors into the property value (may be empty)
    pub fields: Vec<String>,
}

fn check_segment(seg: &str, what: &'static str) -> Result<(), PathError> {
    if seg.is_empty() {
        return Err(PathError::EmptySegment(what));
    }
    if seg.chars().any(char::is_whitespace) {
        return Err(PathError::Whitespace(what));
    }
    Ok(())
}

impl TypedPath {
    /// Construct a TypedPath from components.
    pub fn new(children: Vec<String>, property: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            children,
            property: property.into(),
            fields,
        }
    }

    /// Parse a path string according to the grammar described above.
    pub fn parse(s: &str) -> Result<Self, PathError> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        let mut parts: Vec<&str> = s.split('/').collect();
        let last = parts.pop().ok_or(PathError::Empty)?;
        for seg in &parts {
            check_segment(seg, "child")?;
        }
        let mut selectors = last.split('.');
        let property = selectors.next().unwrap_or_default();
        check_segment(property, "property")?;
        let mut fields = Vec::new();
        for field in selectors {
            check_segment(field, "field")?;
            fields.push(field.to_string());
        }
        Ok(TypedPath {
            children: parts.into_iter().map(str::to_string).collect(),
            property: property.to_string(),
            fields,
        })
    }

    /// Build a path from a clip child path (may be empty) and a property key such as "scale.x".
    pub fn from_parts(child_path: Option<&str>, property_key: &str) -> Result<Self, PathError> {
        match child_path {
            Some(child) if !child.is_empty() => Self::parse(&format!("{child}/{property_key}")),
            _ => Self::parse(property_key),
        }
    }

    /// Child path joined with '/', or `None` when the property lives on the root.
    pub fn child_path(&self) -> Option<String> {
        if self.children.is_empty() {
            None
        } else {
            Some(self.children.join("/"))
        }
    }

    /// Property name on the target.
    pub fn property_name(&self) -> &str {
        &self.property
    }

    /// Iterate over field selectors on the property.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|s| s.as_str())
    }

    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }
}

impl fmt::Display for TypedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for child in &self.children {
            f.write_str(child)?;
            f.write_str("/")?;
        }
        f.write_str(&self.property)?;
        for field in &self.fields {
            f.write_str(".")?;
            f.write_str(field)?;
        }
        Ok(())
    }
}

impl FromStr for TypedPath {
    type Err = PathError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypedPath::parse(s)
    }
}

// Serde support: serialize as string, deserialize from string
impl Serialize for TypedPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TypedPath {
    fn deserialize<D>(deserializer: D) -> Result<TypedPath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TypedPath::parse(&s).map_err(de::Error::custom)
    }
}
