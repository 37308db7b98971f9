//! Sanitization: coercing request values into the shape their schema describes.
//!
//! Sanitizing is more forgiving than validating. Scalars are always cast to
//! something, unknown object keys are dropped rather than rejected when
//! `additionalProperties` is `false`, and `enum` is not enforced. Only
//! structural dead ends produce an error: no matching combinator branch,
//! several `oneOf` matches, or items that collapse into duplicates.

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::coerce;
use crate::error::SchemaError;
use crate::formats;
use crate::types::{Format, ParamPath, SchemaOptions, SchemaType};
use crate::usage::{Context, Report};
use crate::validator::{
    adopt_type, duplicate_items, find_any_matching_schema, find_one_matching_schema,
    find_pattern_property_schema, keyword_flag, resolve_type, validate_resolved, Resolved,
    TypeChoice,
};

/// Sanitize a value against a schema, returning a new coerced value.
///
/// # Errors
///
/// Returns a [`SchemaError`] when no `anyOf`/`oneOf` branch fits, when more
/// than one `oneOf` branch fits, or when `uniqueItems` is broken by the
/// coerced items.
pub fn sanitize_value_from_schema(
    value: &Value,
    schema: &Value,
    param: &str,
) -> Result<Value, SchemaError> {
    sanitize_with(value, schema, param, &SchemaOptions::default()).into_result()
}

/// Sanitize with explicit options, returning usage notices alongside the outcome.
pub fn sanitize_with(
    value: &Value,
    schema: &Value,
    param: &str,
    options: &SchemaOptions,
) -> Report<Value> {
    let mut ctx = Context::new(options);
    let result = sanitize_node(value, schema, &ParamPath::new(param), &mut ctx);
    ctx.finish(result)
}

pub(crate) fn sanitize_node(
    value: &Value,
    schema: &Value,
    path: &ParamPath,
    ctx: &mut Context<'_>,
) -> Result<Value, SchemaError> {
    ctx.nested(path, |ctx| sanitize_inner(value, schema, path, ctx))
}

fn sanitize_inner(
    value: &Value,
    schema: &Value,
    path: &ParamPath,
    ctx: &mut Context<'_>,
) -> Result<Value, SchemaError> {
    let mut schema = Cow::Borrowed(schema);
    let mut value = Cow::Borrowed(value);

    if schema.get("anyOf").map_or(false, Value::is_array) {
        let branch = find_any_matching_schema(&value, &schema, path, ctx)?;
        adopt_type(&mut schema, &branch);
        value = Cow::Owned(sanitize_node(&value, &branch, path, ctx)?);
    }
    if schema.get("oneOf").map_or(false, Value::is_array) {
        let branch = find_one_matching_schema(&value, &schema, path, ctx)?;
        adopt_type(&mut schema, &branch);
        value = Cow::Owned(sanitize_node(&value, &branch, path, ctx)?);
    }

    match resolve_type(&value, &schema, path, ctx) {
        TypeChoice::Resolved(resolved) => sanitize_resolved(&value, &schema, resolved, path, ctx),
        TypeChoice::Candidates(types) => {
            let mut first_error = None;
            for ty in types {
                let resolved = Resolved::Type(ty);
                match sanitize_resolved(&value, &schema, resolved, path, ctx) {
                    Ok(coerced) => {
                        if validate_resolved(&coerced, &schema, resolved, path, ctx).is_ok() {
                            return Ok(coerced);
                        }
                    }
                    Err(error) => {
                        first_error.get_or_insert(error);
                    }
                }
            }
            // Structural failures surface; plain type misses fall back to null.
            match first_error {
                Some(error) => Err(error),
                None => Ok(Value::Null),
            }
        }
        TypeChoice::NoMatch(_) => Ok(Value::Null),
    }
}

/// Coerce a value for a node whose type has been settled.
pub(crate) fn sanitize_resolved(
    value: &Value,
    schema: &Value,
    resolved: Resolved,
    path: &ParamPath,
    ctx: &mut Context<'_>,
) -> Result<Value, SchemaError> {
    match resolved {
        Resolved::Type(SchemaType::Array) => sanitize_array(value, schema, path, ctx),
        Resolved::Type(SchemaType::Object) => sanitize_object(value, schema, path, ctx),
        Resolved::Type(SchemaType::Null) => Ok(Value::Null),
        Resolved::Type(SchemaType::Integer) => Ok(Value::from(coerce::lenient_i64(value))),
        Resolved::Type(SchemaType::Number) => Ok(coerce::number_value(coerce::lenient_f64(value))),
        Resolved::Type(SchemaType::Boolean) => Ok(Value::Bool(coerce::sanitize_boolean(value))),
        Resolved::Type(SchemaType::String) | Resolved::Any => {
            if let Some(format) = schema
                .get("format")
                .and_then(Value::as_str)
                .and_then(Format::parse)
            {
                return Ok(Value::String(sanitize_format(value, format)));
            }
            Ok(match resolved {
                Resolved::Any => value.clone(),
                _ => Value::String(coerce::stringify(value)),
            })
        }
    }
}

fn sanitize_format(value: &Value, format: Format) -> String {
    match format {
        Format::HexColor => match value {
            Value::Array(_) | Value::Object(_) => String::new(),
            scalar => formats::sanitize_hex_color(&coerce::stringify(scalar)),
        },
        Format::Uri => match value {
            Value::Array(_) | Value::Object(_) => String::new(),
            scalar => formats::sanitize_url(&coerce::stringify(scalar)),
        },
        Format::TextareaField => formats::sanitize_text_field(value, true),
        // Email, date and identifier formats are cleaned, not checked: a
        // sanitizer that rejected them would hide the validation error.
        Format::DateTime | Format::Email | Format::Ip | Format::Uuid | Format::TextField => {
            formats::sanitize_text_field(value, false)
        }
    }
}

fn sanitize_array(
    value: &Value,
    schema: &Value,
    path: &ParamPath,
    ctx: &mut Context<'_>,
) -> Result<Value, SchemaError> {
    let mut items = coerce::sanitize_array(value);

    if let Some(item_schema) = schema
        .get("items")
        .filter(|s| s.as_object().map_or(false, |m| !m.is_empty()))
    {
        for (index, item) in items.iter_mut().enumerate() {
            *item = sanitize_node(item, item_schema, &path.index(index), ctx)?;
        }
    }

    if keyword_flag(schema, "uniqueItems") {
        if let Some(index) = coerce::first_duplicate(&items) {
            return Err(duplicate_items(path, index));
        }
    }
    Ok(Value::Array(items))
}

fn sanitize_object(
    value: &Value,
    schema: &Value,
    path: &ParamPath,
    ctx: &mut Context<'_>,
) -> Result<Value, SchemaError> {
    let input = coerce::sanitize_object(value);
    let properties = schema.get("properties").and_then(Value::as_object);
    let mut output = Map::new();

    for (key, child_value) in input {
        let child_path = path.key(&key);

        if let Some(property_schema) = properties.and_then(|p| p.get(&key)) {
            let sanitized = sanitize_node(&child_value, property_schema, &child_path, ctx)?;
            output.insert(key, sanitized);
            continue;
        }
        if key.is_empty() {
            continue;
        }
        if let Some(pattern_schema) = find_pattern_property_schema(&key, schema, path, ctx) {
            let sanitized = sanitize_node(&child_value, pattern_schema, &child_path, ctx)?;
            output.insert(key, sanitized);
            continue;
        }
        match schema.get("additionalProperties") {
            Some(Value::Bool(false)) => {}
            Some(additional @ Value::Object(_)) => {
                let sanitized = sanitize_node(&child_value, additional, &child_path, ctx)?;
                output.insert(key, sanitized);
            }
            _ => {
                output.insert(key, child_value);
            }
        }
    }
    Ok(Value::Object(output))
}
