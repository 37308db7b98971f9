//! Core types for schema validation and sanitization.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Built-in type tags, in the order they are listed in diagnostics.
pub const BUILT_IN_TYPES: &[&str] = &[
    "array", "object", "string", "number", "integer", "boolean", "null",
];

/// Formats understood by the `format` keyword.
pub const KNOWN_FORMATS: &[&str] = &[
    "date-time",
    "email",
    "hex-color",
    "ip",
    "uri",
    "uuid",
    "text-field",
    "textarea-field",
];

/// Default recursion limit for nested schemas.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// A recognized value of the `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Array,
    Object,
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl SchemaType {
    /// Parse a type tag.
    ///
    /// Returns `None` for unknown tags (caller decides how lenient to be).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "array" => Some(SchemaType::Array),
            "object" => Some(SchemaType::Object),
            "string" => Some(SchemaType::String),
            "number" => Some(SchemaType::Number),
            "integer" => Some(SchemaType::Integer),
            "boolean" => Some(SchemaType::Boolean),
            "null" => Some(SchemaType::Null),
            _ => None,
        }
    }

    /// Returns the keyword spelling of this tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Array => "array",
            SchemaType::Object => "object",
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Null => "null",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recognized value of the `format` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    DateTime,
    Email,
    HexColor,
    Ip,
    Uri,
    Uuid,
    TextField,
    TextareaField,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "date-time" => Some(Format::DateTime),
            "email" => Some(Format::Email),
            "hex-color" => Some(Format::HexColor),
            "ip" => Some(Format::Ip),
            "uri" => Some(Format::Uri),
            "uuid" => Some(Format::Uuid),
            "text-field" => Some(Format::TextField),
            "textarea-field" => Some(Format::TextareaField),
            _ => None,
        }
    }
}

/// What a schema node's `type` keyword resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    /// No `type` keyword at all.
    Missing,
    /// A single recognized tag.
    Single(SchemaType),
    /// A single tag that is not built in.
    Unknown(String),
    /// A list of tags, in declaration order. Unknown entries are kept verbatim.
    Multi(Vec<Result<SchemaType, String>>),
}

impl TypeSpec {
    /// Read the `type` keyword of a schema node.
    pub fn of(schema: &Value) -> Self {
        match schema.get("type") {
            None | Some(Value::Null) => TypeSpec::Missing,
            Some(Value::String(s)) => match SchemaType::parse(s) {
                Some(t) => TypeSpec::Single(t),
                None => TypeSpec::Unknown(s.clone()),
            },
            Some(Value::Array(list)) => TypeSpec::Multi(
                list.iter()
                    .map(|v| match v.as_str() {
                        Some(s) => SchemaType::parse(s).ok_or_else(|| s.to_string()),
                        None => Err(v.to_string()),
                    })
                    .collect(),
            ),
            Some(other) => TypeSpec::Unknown(other.to_string()),
        }
    }
}

/// One step in a parameter path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Parameter path used in error messages, rendered as `foo[a][0]`.
///
/// Paths are never mutated in place: every recursive call receives
/// its own extended copy from [`ParamPath::child`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamPath {
    root: String,
    segments: Vec<PathSegment>,
}

impl ParamPath {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            segments: Vec::new(),
        }
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self {
            root: self.root.clone(),
            segments,
        }
    }

    pub fn key(&self, key: &str) -> Self {
        self.child(PathSegment::Key(key.to_string()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.child(PathSegment::Index(index))
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl fmt::Display for ParamPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for segment in &self.segments {
            match segment {
                PathSegment::Key(k) => write!(f, "[{}]", k)?,
                PathSegment::Index(i) => write!(f, "[{}]", i)?,
            }
        }
        Ok(())
    }
}

/// Options for validation and sanitization.
#[derive(Debug, Clone)]
pub struct SchemaOptions {
    /// Maximum schema nesting followed before giving up with `rest_schema_too_deep`.
    pub max_depth: usize,
    /// When true, usage notices are returned in the [`crate::Report`] as well as logged.
    pub collect_notices: bool,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            collect_notices: true,
        }
    }
}

impl SchemaOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the recursion limit.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set whether notices are collected into the report.
    pub fn collect_notices(mut self, collect: bool) -> Self {
        self.collect_notices = collect;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schema_type_parse_valid() {
        for tag in BUILT_IN_TYPES {
            let parsed = SchemaType::parse(tag).unwrap();
            assert_eq!(parsed.as_str(), *tag);
        }
    }

    #[test]
    fn schema_type_parse_invalid() {
        assert_eq!(SchemaType::parse("str"), None);
        assert_eq!(SchemaType::parse("Integer"), None);
        assert_eq!(SchemaType::parse(""), None);
    }

    #[test]
    fn type_spec_of_schema() {
        assert_eq!(TypeSpec::of(&json!({})), TypeSpec::Missing);
        assert_eq!(
            TypeSpec::of(&json!({ "type": "string" })),
            TypeSpec::Single(SchemaType::String)
        );
        assert_eq!(
            TypeSpec::of(&json!({ "type": "str" })),
            TypeSpec::Unknown("str".into())
        );
        assert_eq!(
            TypeSpec::of(&json!({ "type": ["integer", "bogus"] })),
            TypeSpec::Multi(vec![Ok(SchemaType::Integer), Err("bogus".into())])
        );
    }

    #[test]
    fn param_path_display() {
        let root = ParamPath::new("foo");
        let nested = root.key("a").index(2);
        assert_eq!(root.to_string(), "foo");
        assert_eq!(nested.to_string(), "foo[a][2]");
        assert_eq!(nested.segments().len(), 2);
    }

    #[test]
    fn options_builder() {
        let opts = SchemaOptions::new().max_depth(3).collect_notices(false);
        assert_eq!(opts.max_depth, 3);
        assert!(!opts.collect_notices);
        assert_eq!(SchemaOptions::default().max_depth, DEFAULT_MAX_DEPTH);
    }
}
