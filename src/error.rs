//! Error types for schema loading, validation and sanitization.

use std::fmt;
use std::path::PathBuf;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors while loading a schema or payload document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
        }
    }
}

/// Machine-readable kind of a [`SchemaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidType,
    NotInEnum,
    InvalidMultiple,
    OutOfBounds,
    TooShort,
    TooLong,
    InvalidPattern,
    TooFewItems,
    TooManyItems,
    DuplicateItems,
    PropertyRequired,
    AdditionalPropertiesForbidden,
    TooFewProperties,
    TooManyProperties,
    InvalidEmail,
    InvalidHexColor,
    InvalidDate,
    InvalidIp,
    InvalidUuid,
    NoMatchingSchema,
    OneOfMultipleMatches,
    SchemaTooDeep,
}

impl ErrorCode {
    /// Returns the wire spelling of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidType => "rest_invalid_type",
            ErrorCode::NotInEnum => "rest_not_in_enum",
            ErrorCode::InvalidMultiple => "rest_invalid_multiple",
            ErrorCode::OutOfBounds => "rest_out_of_bounds",
            ErrorCode::TooShort => "rest_too_short",
            ErrorCode::TooLong => "rest_too_long",
            ErrorCode::InvalidPattern => "rest_invalid_pattern",
            ErrorCode::TooFewItems => "rest_too_few_items",
            ErrorCode::TooManyItems => "rest_too_many_items",
            ErrorCode::DuplicateItems => "rest_duplicate_items",
            ErrorCode::PropertyRequired => "rest_property_required",
            ErrorCode::AdditionalPropertiesForbidden => "rest_additional_properties_forbidden",
            ErrorCode::TooFewProperties => "rest_too_few_properties",
            ErrorCode::TooManyProperties => "rest_too_many_properties",
            ErrorCode::InvalidEmail => "rest_invalid_email",
            ErrorCode::InvalidHexColor => "rest_invalid_hex_color",
            ErrorCode::InvalidDate => "rest_invalid_date",
            ErrorCode::InvalidIp => "rest_invalid_ip",
            ErrorCode::InvalidUuid => "rest_invalid_uuid",
            ErrorCode::NoMatchingSchema => "rest_no_matching_schema",
            ErrorCode::OneOfMultipleMatches => "rest_one_of_multiple_matches",
            ErrorCode::SchemaTooDeep => "rest_schema_too_deep",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A value that does not fit its schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaError {
    pub code: ErrorCode,
    /// Human-readable message, already interpolated with the parameter path.
    pub message: String,
    /// Parameter path the error was raised at, for errors that record it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    /// Index of the combinator branch whose reason is reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    /// Indexes of every combinator branch that matched.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub positions: Vec<usize>,
}

impl SchemaError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            param: None,
            position: None,
            positions: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }

    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_positions(mut self, positions: Vec<usize>) -> Self {
        self.positions = positions;
        self
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for SchemaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_exit_codes() {
        let err = LoadError::FileNotFound {
            path: PathBuf::from("schema.json"),
        };
        assert_eq!(err.exit_code(), 3);

        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = LoadError::InvalidJson { source };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn schema_error_display() {
        let err = SchemaError::new(ErrorCode::InvalidType, "foo is not of type string.");
        assert_eq!(
            err.to_string(),
            "[rest_invalid_type] foo is not of type string."
        );
    }

    #[test]
    fn schema_error_serializes_code_as_string() {
        let err = SchemaError::new(ErrorCode::NoMatchingSchema, "nope").with_position(1);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "rest_no_matching_schema");
        assert_eq!(json["position"], 1);
        assert!(json.get("param").is_none());
        assert!(json.get("positions").is_none());
    }
}
