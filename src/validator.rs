//! Validation of request values against schemas.

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::coerce;
use crate::error::{ErrorCode, SchemaError};
use crate::formats;
use crate::pattern;
use crate::sanitizer::sanitize_resolved;
use crate::types::{Format, ParamPath, SchemaOptions, SchemaType, TypeSpec};
use crate::usage::{list_and, Context, Report};

/// Validate a value against a schema.
///
/// `param` names the value in error messages (`foo[a] is not of type string.`).
/// Schema mistakes such as a missing `type` are logged as usage notices and
/// otherwise tolerated.
///
/// # Errors
///
/// Returns the first [`SchemaError`] found in a depth-first walk.
pub fn validate_value_from_schema(
    value: &Value,
    schema: &Value,
    param: &str,
) -> Result<(), SchemaError> {
    validate_with(value, schema, param, &SchemaOptions::default()).into_result()
}

/// Validate with explicit options, returning usage notices alongside the outcome.
pub fn validate_with(
    value: &Value,
    schema: &Value,
    param: &str,
    options: &SchemaOptions,
) -> Report<()> {
    let mut ctx = Context::new(options);
    let result = validate_node(value, schema, &ParamPath::new(param), &mut ctx);
    ctx.finish(result)
}

/// The type a node is checked as once `type` has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolved {
    Type(SchemaType),
    /// No usable type: every value passes the type check.
    Any,
}

impl Resolved {
    pub(crate) fn allows_format(self) -> bool {
        matches!(self, Resolved::Type(SchemaType::String) | Resolved::Any)
    }
}

/// Outcome of reading a node's `type` keyword against a concrete value.
pub(crate) enum TypeChoice {
    Resolved(Resolved),
    /// Multi-type: the listed types whose shape fits the value, in trial order.
    Candidates(Vec<SchemaType>),
    /// Multi-type with no fitting type; carries the listed names for the message.
    NoMatch(Vec<String>),
}

/// Whether a value has the basic shape of a type, before any constraint is checked.
fn has_shape(value: &Value, ty: SchemaType) -> bool {
    match ty {
        SchemaType::Array => coerce::as_list(value).is_some(),
        SchemaType::Object => coerce::is_object_like(value),
        SchemaType::Integer => coerce::is_integer_like(value),
        SchemaType::Number => coerce::is_numeric(value),
        SchemaType::Boolean => coerce::is_boolean_like(value),
        SchemaType::String => value.is_string(),
        SchemaType::Null => value.is_null(),
    }
}

pub(crate) fn resolve_type(
    value: &Value,
    schema: &Value,
    path: &ParamPath,
    ctx: &mut Context<'_>,
) -> TypeChoice {
    match TypeSpec::of(schema) {
        TypeSpec::Missing => {
            ctx.missing_type(path);
            TypeChoice::Resolved(Resolved::Any)
        }
        TypeSpec::Single(ty) => TypeChoice::Resolved(Resolved::Type(ty)),
        TypeSpec::Unknown(_) => {
            ctx.unknown_type(path, false);
            TypeChoice::Resolved(Resolved::Any)
        }
        TypeSpec::Multi(list) => {
            let known: Vec<SchemaType> = list.iter().filter_map(|t| t.as_ref().ok().copied()).collect();
            let has_unknown = known.len() != list.len();
            if has_unknown {
                ctx.unknown_type(path, true);
            }

            let mut candidates = Vec::new();
            // Empty strings read as empty lists and objects too, but are best kept as strings.
            if value.as_str() == Some("") && known.contains(&SchemaType::String) {
                candidates.push(SchemaType::String);
            }
            for ty in known {
                if !candidates.contains(&ty) && has_shape(value, ty) {
                    candidates.push(ty);
                }
            }

            if !candidates.is_empty() {
                TypeChoice::Candidates(candidates)
            } else if has_unknown {
                TypeChoice::Resolved(Resolved::Any)
            } else {
                TypeChoice::NoMatch(
                    list.into_iter()
                        .map(|t| match t {
                            Ok(ty) => ty.as_str().to_string(),
                            Err(name) => name,
                        })
                        .collect(),
                )
            }
        }
    }
}

pub(crate) fn validate_node(
    value: &Value,
    schema: &Value,
    path: &ParamPath,
    ctx: &mut Context<'_>,
) -> Result<(), SchemaError> {
    ctx.nested(path, |ctx| validate_inner(value, schema, path, ctx))
}

fn validate_inner(
    value: &Value,
    schema: &Value,
    path: &ParamPath,
    ctx: &mut Context<'_>,
) -> Result<(), SchemaError> {
    let mut schema = Cow::Borrowed(schema);

    if schema.get("anyOf").map_or(false, Value::is_array) {
        let branch = find_any_matching_schema(value, &schema, path, ctx)?;
        adopt_type(&mut schema, &branch);
    }
    if schema.get("oneOf").map_or(false, Value::is_array) {
        let branch = find_one_matching_schema(value, &schema, path, ctx)?;
        adopt_type(&mut schema, &branch);
    }

    match resolve_type(value, &schema, path, ctx) {
        TypeChoice::Resolved(resolved) => validate_resolved(value, &schema, resolved, path, ctx),
        TypeChoice::Candidates(types) => {
            let mut first_error = None;
            for ty in types {
                match validate_resolved(value, &schema, Resolved::Type(ty), path, ctx) {
                    Ok(()) => return Ok(()),
                    Err(error) => {
                        first_error.get_or_insert(error);
                    }
                }
            }
            Err(first_error.unwrap_or_else(|| invalid_type(path, "")))
        }
        TypeChoice::NoMatch(names) => Err(invalid_type(path, &names.join(","))),
    }
}

/// Check a value against a node whose type has been settled.
pub(crate) fn validate_resolved(
    value: &Value,
    schema: &Value,
    resolved: Resolved,
    path: &ParamPath,
    ctx: &mut Context<'_>,
) -> Result<(), SchemaError> {
    if let Resolved::Type(ty) = resolved {
        match ty {
            SchemaType::Null => validate_null(value, path)?,
            SchemaType::Boolean => validate_boolean(value, path)?,
            SchemaType::Object => validate_object(value, schema, path, ctx)?,
            SchemaType::Array => validate_array(value, schema, path, ctx)?,
            SchemaType::Number => validate_number(value, schema, "number", path)?,
            SchemaType::Integer => validate_integer(value, schema, path)?,
            SchemaType::String => validate_string(value, schema, path, ctx)?,
        }
    }

    validate_enum(value, schema, resolved, path, ctx)?;

    if resolved.allows_format() {
        validate_format(value, schema, path)?;
    }
    Ok(())
}

// --- Errors ---

pub(crate) fn fail(code: ErrorCode, path: &ParamPath, message: String) -> SchemaError {
    SchemaError::new(code, message).with_param(path.to_string())
}

fn invalid_type(path: &ParamPath, type_name: &str) -> SchemaError {
    fail(
        ErrorCode::InvalidType,
        path,
        format!("{} is not of type {}.", path, type_name),
    )
}

pub(crate) fn duplicate_items(path: &ParamPath, index: usize) -> SchemaError {
    fail(
        ErrorCode::DuplicateItems,
        path,
        format!("{} has duplicate items.", path),
    )
    .with_position(index)
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

// --- Keyword access ---

fn keyword_number(schema: &Value, key: &str) -> Option<f64> {
    schema.get(key).and_then(coerce::as_f64)
}

fn keyword_count(schema: &Value, key: &str) -> Option<usize> {
    keyword_number(schema, key)
        .filter(|n| *n >= 0.0)
        .map(|n| n as usize)
}

pub(crate) fn keyword_flag(schema: &Value, key: &str) -> bool {
    schema.get(key).map_or(false, coerce::sanitize_boolean)
}

fn keyword_text(schema: &Value, key: &str) -> String {
    schema.get(key).map(coerce::display_value).unwrap_or_default()
}

// --- Combinators ---

struct BranchFailure {
    error: SchemaError,
    schema: Value,
    index: usize,
}

/// A branch inherits the parent's `type` when it has none of its own.
fn inherit_type(branch: &Value, parent: &Value) -> Value {
    let mut branch = branch.clone();
    if let (Value::Object(map), Some(ty)) = (&mut branch, parent.get("type")) {
        if !map.contains_key("type") {
            map.insert("type".to_string(), ty.clone());
        }
    }
    branch
}

/// The parent takes the matched branch's `type` when it has none of its own.
pub(crate) fn adopt_type(schema: &mut Cow<'_, Value>, branch: &Value) {
    if schema.get("type").is_some() {
        return;
    }
    if let Some(ty) = branch.get("type") {
        if let Value::Object(map) = schema.to_mut() {
            map.insert("type".to_string(), ty.clone());
        }
    }
}

fn branches<'s>(schema: &'s Value, key: &str) -> &'s [Value] {
    schema
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// First `anyOf` branch the value satisfies.
pub(crate) fn find_any_matching_schema(
    value: &Value,
    schema: &Value,
    path: &ParamPath,
    ctx: &mut Context<'_>,
) -> Result<Value, SchemaError> {
    let mut failures = Vec::new();
    for (index, branch) in branches(schema, "anyOf").iter().enumerate() {
        let branch = inherit_type(branch, schema);
        match validate_node(value, &branch, path, ctx) {
            Ok(()) => {
                tracing::debug!(param = %path, index, "anyOf branch matched");
                return Ok(branch);
            }
            Err(error) => failures.push(BranchFailure {
                error,
                schema: branch,
                index,
            }),
        }
    }
    Err(combining_error(value, path, failures))
}

/// The single `oneOf` branch the value satisfies.
pub(crate) fn find_one_matching_schema(
    value: &Value,
    schema: &Value,
    path: &ParamPath,
    ctx: &mut Context<'_>,
) -> Result<Value, SchemaError> {
    let mut matches: Vec<(usize, Value)> = Vec::new();
    let mut failures = Vec::new();
    for (index, branch) in branches(schema, "oneOf").iter().enumerate() {
        let branch = inherit_type(branch, schema);
        match validate_node(value, &branch, path, ctx) {
            Ok(()) => matches.push((index, branch)),
            Err(error) => failures.push(BranchFailure {
                error,
                schema: branch,
                index,
            }),
        }
    }

    match matches.len() {
        0 => Err(combining_error(value, path, failures)),
        1 => {
            let (index, branch) = matches.remove(0);
            tracing::debug!(param = %path, index, "oneOf branch matched");
            Ok(branch)
        }
        _ => {
            let positions: Vec<usize> = matches.iter().map(|(i, _)| *i).collect();
            let titles: Vec<&str> = matches
                .iter()
                .filter_map(|(_, s)| s.get("title").and_then(Value::as_str))
                .collect();
            let message = if titles.len() == matches.len() {
                format!("{} matches {}, but should match only one.", path, list_and(&titles))
            } else {
                format!("{} matches more than one of the expected formats.", path)
            };
            Err(fail(ErrorCode::OneOfMultipleMatches, path, message).with_positions(positions))
        }
    }
}

fn format_branch_failure(path: &ParamPath, failure: &BranchFailure) -> SchemaError {
    let reason = &failure.error.message;
    let message = match failure.schema.get("title").and_then(Value::as_str) {
        Some(title) => format!("{} is not a valid {}. Reason: {}", path, title, reason),
        None => format!(
            "{} does not match the expected format. Reason: {}",
            path, reason
        ),
    };
    fail(ErrorCode::NoMatchingSchema, path, message).with_position(failure.index)
}

/// Pick the most useful explanation when no branch matched.
fn combining_error(value: &Value, path: &ParamPath, failures: Vec<BranchFailure>) -> SchemaError {
    if failures.len() == 1 {
        return format_branch_failure(path, &failures[0]);
    }

    // Type mismatches at this level say nothing about which branch was intended.
    let here = path.to_string();
    let specific: Vec<&BranchFailure> = failures
        .iter()
        .filter(|f| {
            f.error.code != ErrorCode::InvalidType
                || f.error.param.as_deref().map_or(false, |p| p != here)
        })
        .collect();
    if specific.len() == 1 {
        return format_branch_failure(path, specific[0]);
    }

    if specific.len() > 1
        && specific[0].schema.get("type").and_then(Value::as_str) == Some("object")
    {
        let mut best: Option<&BranchFailure> = None;
        let mut best_overlap = 0;
        for failure in &specific {
            if let Some(props) = failure.schema.get("properties").and_then(Value::as_object) {
                let overlap = value
                    .as_object()
                    .map_or(0, |map| props.keys().filter(|k| map.contains_key(*k)).count());
                if overlap > best_overlap {
                    best = Some(failure);
                    best_overlap = overlap;
                }
            }
        }
        if let Some(failure) = best {
            return format_branch_failure(path, failure);
        }
    }

    let titles: Vec<&str> = failures
        .iter()
        .filter_map(|f| f.schema.get("title").and_then(Value::as_str))
        .collect();
    let message = if !failures.is_empty() && titles.len() == failures.len() {
        format!("{} is not a valid {}.", path, list_and(&titles))
    } else {
        format!("{} does not match any of the expected formats.", path)
    };
    fail(ErrorCode::NoMatchingSchema, path, message)
}

// --- Per-type checks ---

fn validate_null(value: &Value, path: &ParamPath) -> Result<(), SchemaError> {
    if value.is_null() {
        Ok(())
    } else {
        Err(invalid_type(path, "null"))
    }
}

fn validate_boolean(value: &Value, path: &ParamPath) -> Result<(), SchemaError> {
    if coerce::is_boolean_like(value) {
        Ok(())
    } else {
        Err(invalid_type(path, "boolean"))
    }
}

fn is_multiple_of(value: f64, divisor: f64) -> bool {
    if divisor == 0.0 || !divisor.is_finite() {
        return false;
    }
    let quotient = value / divisor;
    (quotient - quotient.round()).abs() <= 1e-9 * quotient.abs().max(1.0)
}

fn validate_number(
    value: &Value,
    schema: &Value,
    type_name: &str,
    path: &ParamPath,
) -> Result<(), SchemaError> {
    let Some(number) = coerce::as_f64(value) else {
        return Err(invalid_type(path, type_name));
    };

    if let Some(divisor) = keyword_number(schema, "multipleOf") {
        if !is_multiple_of(number, divisor) {
            return Err(fail(
                ErrorCode::InvalidMultiple,
                path,
                format!("{} must be a multiple of {}.", path, keyword_text(schema, "multipleOf")),
            ));
        }
    }

    let exclusive_min = keyword_flag(schema, "exclusiveMinimum");
    let exclusive_max = keyword_flag(schema, "exclusiveMaximum");
    let min_text = keyword_text(schema, "minimum");
    let max_text = keyword_text(schema, "maximum");

    let message = match (keyword_number(schema, "minimum"), keyword_number(schema, "maximum")) {
        (Some(min), None) => {
            if exclusive_min && number <= min {
                Some(format!("{} must be greater than {}", path, min_text))
            } else if !exclusive_min && number < min {
                Some(format!("{} must be greater than or equal to {}", path, min_text))
            } else {
                None
            }
        }
        (None, Some(max)) => {
            if exclusive_max && number >= max {
                Some(format!("{} must be less than {}", path, max_text))
            } else if !exclusive_max && number > max {
                Some(format!("{} must be less than or equal to {}", path, max_text))
            } else {
                None
            }
        }
        (Some(min), Some(max)) => {
            let below = if exclusive_min { number <= min } else { number < min };
            let above = if exclusive_max { number >= max } else { number > max };
            (below || above).then(|| {
                format!(
                    "{} must be between {} ({}) and {} ({})",
                    path,
                    min_text,
                    if exclusive_min { "exclusive" } else { "inclusive" },
                    max_text,
                    if exclusive_max { "exclusive" } else { "inclusive" },
                )
            })
        }
        (None, None) => None,
    };

    match message {
        Some(message) => Err(fail(ErrorCode::OutOfBounds, path, message)),
        None => Ok(()),
    }
}

fn validate_integer(value: &Value, schema: &Value, path: &ParamPath) -> Result<(), SchemaError> {
    validate_number(value, schema, "integer", path)?;
    if coerce::is_integer_like(value) {
        Ok(())
    } else {
        Err(invalid_type(path, "integer"))
    }
}

fn validate_string(
    value: &Value,
    schema: &Value,
    path: &ParamPath,
    ctx: &mut Context<'_>,
) -> Result<(), SchemaError> {
    let Some(text) = value.as_str() else {
        return Err(invalid_type(path, "string"));
    };
    let length = text.chars().count();

    if let Some(min) = keyword_count(schema, "minLength") {
        if length < min {
            return Err(fail(
                ErrorCode::TooShort,
                path,
                format!(
                    "{} must be at least {} {} long.",
                    path,
                    min,
                    plural(min, "character", "characters")
                ),
            ));
        }
    }
    if let Some(max) = keyword_count(schema, "maxLength") {
        if length > max {
            return Err(fail(
                ErrorCode::TooLong,
                path,
                format!(
                    "{} must be at most {} {} long.",
                    path,
                    max,
                    plural(max, "character", "characters")
                ),
            ));
        }
    }
    if let Some(pattern_text) = schema.get("pattern").and_then(Value::as_str) {
        let matched = match pattern::matches_pattern(pattern_text, text) {
            Ok(matched) => matched,
            Err(reason) => {
                ctx.invalid_pattern(path, pattern_text, &reason);
                false
            }
        };
        if !matched {
            return Err(fail(
                ErrorCode::InvalidPattern,
                path,
                format!("{} does not match pattern {}.", path, pattern_text),
            ));
        }
    }
    Ok(())
}

fn validate_array(
    value: &Value,
    schema: &Value,
    path: &ParamPath,
    ctx: &mut Context<'_>,
) -> Result<(), SchemaError> {
    let Some(items) = coerce::as_list(value) else {
        return Err(invalid_type(path, "array"));
    };

    if let Some(item_schema) = schema.get("items").filter(|s| s.is_object()) {
        for (index, item) in items.iter().enumerate() {
            validate_node(item, item_schema, &path.index(index), ctx)?;
        }
    }

    if let Some(min) = keyword_count(schema, "minItems") {
        if items.len() < min {
            return Err(fail(
                ErrorCode::TooFewItems,
                path,
                format!(
                    "{} must contain at least {} {}.",
                    path,
                    min,
                    plural(min, "item", "items")
                ),
            ));
        }
    }
    if let Some(max) = keyword_count(schema, "maxItems") {
        if items.len() > max {
            return Err(fail(
                ErrorCode::TooManyItems,
                path,
                format!(
                    "{} must contain at most {} {}.",
                    path,
                    max,
                    plural(max, "item", "items")
                ),
            ));
        }
    }
    if keyword_flag(schema, "uniqueItems") {
        if let Some(index) = coerce::first_duplicate(&items) {
            return Err(duplicate_items(path, index));
        }
    }
    Ok(())
}

/// Schema of the first `patternProperties` entry whose regex matches `key`.
///
/// The empty key never matches.
pub(crate) fn find_pattern_property_schema<'s>(
    key: &str,
    schema: &'s Value,
    path: &ParamPath,
    ctx: &mut Context<'_>,
) -> Option<&'s Value> {
    if key.is_empty() {
        return None;
    }
    let patterns = schema.get("patternProperties")?.as_object()?;
    for (pattern_text, child) in patterns {
        match pattern::matches_pattern(pattern_text, key) {
            Ok(true) => return Some(child),
            Ok(false) => {}
            Err(reason) => ctx.invalid_pattern(path, pattern_text, &reason),
        }
    }
    None
}

fn check_required(
    map: &Map<String, Value>,
    schema: &Value,
    path: &ParamPath,
) -> Result<(), SchemaError> {
    let missing = |name: &str| {
        fail(
            ErrorCode::PropertyRequired,
            path,
            format!("{} is a required property of {}.", name, path),
        )
    };

    if let Some(Value::Array(names)) = schema.get("required") {
        for name in names.iter().filter_map(Value::as_str) {
            if !map.contains_key(name) {
                return Err(missing(name));
            }
        }
    } else if let Some(props) = schema.get("properties").and_then(Value::as_object) {
        for (name, prop) in props {
            if prop.get("required") == Some(&Value::Bool(true)) && !map.contains_key(name) {
                return Err(missing(name));
            }
        }
    }
    Ok(())
}

fn validate_object(
    value: &Value,
    schema: &Value,
    path: &ParamPath,
    ctx: &mut Context<'_>,
) -> Result<(), SchemaError> {
    if !coerce::is_object_like(value) {
        return Err(invalid_type(path, "object"));
    }
    let map = coerce::sanitize_object(value);

    check_required(&map, schema, path)?;

    let properties = schema.get("properties").and_then(Value::as_object);
    for (key, child_value) in &map {
        let child_path = path.key(key);

        if let Some(property_schema) = properties.and_then(|p| p.get(key)) {
            validate_node(child_value, property_schema, &child_path, ctx)?;
            continue;
        }
        if let Some(pattern_schema) = find_pattern_property_schema(key, schema, path, ctx) {
            validate_node(child_value, pattern_schema, &child_path, ctx)?;
            continue;
        }
        match schema.get("additionalProperties") {
            Some(Value::Bool(false)) => {
                return Err(fail(
                    ErrorCode::AdditionalPropertiesForbidden,
                    &child_path,
                    format!("{} is not a valid property of Object.", key),
                ));
            }
            Some(additional @ Value::Object(_)) => {
                validate_node(child_value, additional, &child_path, ctx)?;
            }
            _ => {}
        }
    }

    if let Some(min) = keyword_count(schema, "minProperties") {
        if map.len() < min {
            return Err(fail(
                ErrorCode::TooFewProperties,
                path,
                format!(
                    "{} must contain at least {} {}.",
                    path,
                    min,
                    plural(min, "property", "properties")
                ),
            ));
        }
    }
    if let Some(max) = keyword_count(schema, "maxProperties") {
        if map.len() > max {
            return Err(fail(
                ErrorCode::TooManyProperties,
                path,
                format!(
                    "{} must contain at most {} {}.",
                    path,
                    max,
                    plural(max, "property", "properties")
                ),
            ));
        }
    }
    Ok(())
}

// --- Enum and format ---

fn validate_enum(
    value: &Value,
    schema: &Value,
    resolved: Resolved,
    path: &ParamPath,
    ctx: &mut Context<'_>,
) -> Result<(), SchemaError> {
    let Some(members) = schema.get("enum").and_then(Value::as_array) else {
        return Ok(());
    };
    if members.is_empty() {
        return Ok(());
    }

    let sanitized = sanitize_resolved(value, schema, resolved, path, ctx)?;
    if members
        .iter()
        .any(|member| coerce::enum_member_matches(&sanitized, member))
    {
        return Ok(());
    }

    let encoded: Vec<String> = members
        .iter()
        .map(|member| match member {
            Value::Array(_) | Value::Object(_) | Value::Null => member.to_string(),
            scalar => coerce::stringify(scalar),
        })
        .collect();
    let message = match encoded.as_slice() {
        [only] => format!("{} is not {}.", path, only),
        _ => format!("{} is not one of {}.", path, list_and(&encoded)),
    };
    Err(fail(ErrorCode::NotInEnum, path, message))
}

/// Scalars checked against a format are read as text; lists and maps never match.
fn format_subject(value: &Value) -> Option<String> {
    match value {
        Value::Array(_) | Value::Object(_) => None,
        scalar => Some(coerce::stringify(scalar)),
    }
}

fn validate_format(value: &Value, schema: &Value, path: &ParamPath) -> Result<(), SchemaError> {
    let Some(format) = schema
        .get("format")
        .and_then(Value::as_str)
        .and_then(Format::parse)
    else {
        return Ok(());
    };
    let subject = format_subject(value);
    let holds = |check: fn(&str) -> bool| subject.as_deref().map_or(false, check);

    match format {
        Format::HexColor if !holds(formats::is_hex_color) => Err(fail(
            ErrorCode::InvalidHexColor,
            path,
            "Invalid hex color.".to_string(),
        )),
        Format::DateTime
            if !holds(|s| formats::parse_date_time(s).is_some()) =>
        {
            Err(fail(ErrorCode::InvalidDate, path, "Invalid date.".to_string()))
        }
        Format::Email if !holds(formats::is_email) => Err(fail(
            ErrorCode::InvalidEmail,
            path,
            "Invalid email address.".to_string(),
        )),
        Format::Ip if !holds(formats::is_ip_address) => Err(fail(
            ErrorCode::InvalidIp,
            path,
            format!("{} is not a valid IP address.", path),
        )),
        Format::Uuid if !holds(formats::is_uuid) => Err(fail(
            ErrorCode::InvalidUuid,
            path,
            format!("{} is not a valid UUID.", path),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(value: Value, schema: Value) -> Result<(), SchemaError> {
        validate_value_from_schema(&value, &schema, "param")
    }

    #[test]
    fn multiple_of_tolerates_float_error() {
        assert!(is_multiple_of(0.3, 0.1));
        assert!(is_multiple_of(10.0, 2.5));
        assert!(!is_multiple_of(1.0, 0.3));
        assert!(!is_multiple_of(1.0, 0.0));
    }

    #[test]
    fn format_applies_to_strings_and_untyped() {
        assert!(Resolved::Any.allows_format());
        assert!(Resolved::Type(SchemaType::String).allows_format());
        assert!(!Resolved::Type(SchemaType::Array).allows_format());
        assert!(!Resolved::Type(SchemaType::Integer).allows_format());
    }

    #[test]
    fn has_shape_per_type() {
        assert!(has_shape(&json!("a,b"), SchemaType::Array));
        assert!(has_shape(&json!(""), SchemaType::Object));
        assert!(has_shape(&json!("5"), SchemaType::Integer));
        assert!(!has_shape(&json!("5.5"), SchemaType::Integer));
        assert!(has_shape(&json!("5.5"), SchemaType::Number));
        assert!(has_shape(&json!("TRUE"), SchemaType::Boolean));
        assert!(!has_shape(&json!(1), SchemaType::String));
        assert!(has_shape(&json!(null), SchemaType::Null));
    }

    #[test]
    fn empty_string_prefers_string_type() {
        let options = SchemaOptions::new();
        let mut ctx = Context::new(&options);
        let schema = json!({ "type": ["object", "string"] });
        match resolve_type(&json!(""), &schema, &ParamPath::new("p"), &mut ctx) {
            TypeChoice::Candidates(types) => {
                assert_eq!(types, vec![SchemaType::String, SchemaType::Object])
            }
            _ => panic!("expected candidates"),
        }
    }

    #[test]
    fn branch_inherits_parent_type() {
        let parent = json!({ "type": "string", "anyOf": [] });
        assert_eq!(
            inherit_type(&json!({ "maxLength": 1 }), &parent),
            json!({ "maxLength": 1, "type": "string" })
        );
        assert_eq!(
            inherit_type(&json!({ "type": "integer" }), &parent),
            json!({ "type": "integer" })
        );
    }

    #[test]
    fn integer_message_names_integer() {
        let err = check(json!("abc"), json!({ "type": "integer" })).unwrap_err();
        assert_eq!(err.message, "param is not of type integer.");
        let err = check(json!(1.5), json!({ "type": "integer" })).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidType);
    }

    #[test]
    fn combining_error_prefers_object_branch_with_most_shared_keys() {
        let schema = json!({
            "anyOf": [
                {
                    "type": "object",
                    "properties": { "a": { "type": "string" } },
                    "required": ["a"]
                },
                {
                    "type": "object",
                    "properties": {
                        "b": { "type": "string" },
                        "c": { "type": "string" }
                    }
                }
            ]
        });
        let err = check(json!({ "b": 1, "c": 2 }), schema).unwrap_err();
        assert_eq!(err.code, ErrorCode::NoMatchingSchema);
        assert_eq!(err.position, Some(1));
        assert_eq!(
            err.message,
            "param does not match the expected format. Reason: param[b] is not of type string."
        );
    }

    #[test]
    fn empty_any_of_never_matches() {
        let err = check(json!(1), json!({ "type": "integer", "anyOf": [] })).unwrap_err();
        assert_eq!(
            err.message,
            "param does not match any of the expected formats."
        );
    }
}
