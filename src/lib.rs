//! REST Argument Schemas
//!
//! Validation and sanitization of request values against the JSON Schema
//! subset used to describe REST endpoint arguments.
//!
//! Values arrive loosely typed (query strings, form fields), so both
//! operations accept the common textual spellings: `"1"` is a number,
//! `"false"` is a boolean, `"a,b"` is a list.
//!
//! # Example
//!
//! ```
//! use rest_schema::{sanitize_value_from_schema, validate_value_from_schema, ErrorCode};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "array",
//!     "items": { "type": "number" }
//! });
//!
//! // Validation rejects the non-numeric item...
//! let err = validate_value_from_schema(&json!("1,2,a"), &schema, "ids").unwrap_err();
//! assert_eq!(err.code, ErrorCode::InvalidType);
//! assert_eq!(err.message, "ids[2] is not of type number.");
//!
//! // ...while sanitization casts it.
//! let clean = sanitize_value_from_schema(&json!("1,2,a"), &schema, "ids").unwrap();
//! assert_eq!(clean, json!([1.0, 2.0, 0.0]));
//! ```
//!
//! # Supported Keywords
//!
//! | Applies to | Keywords |
//! |------------|----------|
//! | any | `type`, `enum`, `anyOf`, `oneOf`, `format` |
//! | number, integer | `minimum`, `maximum`, `exclusiveMinimum`, `exclusiveMaximum`, `multipleOf` |
//! | string | `minLength`, `maxLength`, `pattern` |
//! | array | `items`, `minItems`, `maxItems`, `uniqueItems` |
//! | object | `properties`, `patternProperties`, `additionalProperties`, `required`, `minProperties`, `maxProperties` |

pub mod coerce;
mod error;
pub mod formats;
mod linter;
mod loader;
pub mod pattern;
mod sanitizer;
mod types;
mod usage;
mod validator;

pub use error::{ErrorCode, LoadError, SchemaError};
pub use linter::{
    lint, lint_file, lint_value, Diagnostic, FileResult, FileStatus, LintResult, Severity,
};
pub use loader::{
    is_url, load_document, load_document_auto, load_document_reader, load_document_str,
    STDIN_SOURCE,
};
pub use sanitizer::{sanitize_value_from_schema, sanitize_with};
pub use types::{
    Format, ParamPath, PathSegment, SchemaOptions, SchemaType, TypeSpec, BUILT_IN_TYPES,
    DEFAULT_MAX_DEPTH, KNOWN_FORMATS,
};
pub use usage::{Report, UsageKind, UsageNotice};
pub use validator::{validate_value_from_schema, validate_with};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
