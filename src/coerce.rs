//! Scalar coercion and shape detection shared by validation and sanitization.
//!
//! The rules follow the loose typing of form-encoded request parameters:
//! numbers may arrive as strings, booleans as `"0"`/`"1"`, lists as
//! comma-separated strings, and empty objects as `""`.

use std::collections::HashSet;

use serde_json::{Map, Number, Value};

const PHP_WHITESPACE: &[char] = &[' ', '\t', '\n', '\r', '\x0B', '\x0C'];

/// Length of the longest numeric prefix of `s` (after no leading whitespace).
///
/// Accepts `[+-]?(digits[.digits*]|.digits)([eE][+-]?digits)?`.
fn numeric_prefix_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }
    if digits == 0 {
        return None;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    Some(i)
}

/// Whether a string is a complete numeric literal, surrounding whitespace allowed.
pub fn is_numeric_str(s: &str) -> bool {
    let trimmed = s.trim_matches(PHP_WHITESPACE);
    matches!(numeric_prefix_len(trimmed), Some(len) if len == trimmed.len())
}

/// Numbers and numeric strings. Booleans and null are not numeric, nor are
/// literals that overflow to infinity.
pub fn is_numeric(value: &Value) -> bool {
    as_f64(value).is_some()
}

/// Finite value of a number or numeric string, `None` for anything else.
pub fn as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if is_numeric_str(s) => s.trim_matches(PHP_WHITESPACE).parse().ok(),
        _ => None,
    };
    parsed.filter(|f: &f64| f.is_finite())
}

/// Numeric with no fractional part: `1`, `1.0`, `"2"`, `"3e2"`.
pub fn is_integer_like(value: &Value) -> bool {
    as_f64(value).map_or(false, |f| f.is_finite() && f.round() == f)
}

/// Lenient float cast: leading numeric prefix for strings, 0 for anything unparsable.
pub fn lenient_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let trimmed = s.trim_start_matches(PHP_WHITESPACE);
            numeric_prefix_len(trimmed)
                .and_then(|len| trimmed[..len].parse().ok())
                .unwrap_or(0.0)
        }
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => 0.0,
    }
}

/// Lenient integer cast: truncates fractions, saturates out-of-range values.
pub fn lenient_i64(value: &Value) -> i64 {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => truncate(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => {
            let trimmed = s.trim_start_matches(PHP_WHITESPACE);
            match numeric_prefix_len(trimmed) {
                Some(len) => {
                    let literal = &trimmed[..len];
                    literal
                        .parse::<i64>()
                        .unwrap_or_else(|_| truncate(literal.parse().unwrap_or(0.0)))
                }
                None => 0,
            }
        }
        Value::Bool(b) => i64::from(*b),
        Value::Null | Value::Array(_) | Value::Object(_) => 0,
    }
}

fn truncate(f: f64) -> i64 {
    if !f.is_finite() {
        return 0;
    }
    // `as` saturates at the bounds.
    f.trunc() as i64
}

/// Booleans, integer `0`/`1`, and case-insensitive `"true"`, `"false"`, `"1"`, `"0"`.
pub fn is_boolean_like(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::String(s) => matches!(s.to_lowercase().as_str(), "true" | "false" | "1" | "0"),
        Value::Number(n) => matches!(n.as_i64(), Some(0) | Some(1)),
        _ => false,
    }
}

/// Truthiness with `"false"` and `"0"` (any case) mapped to false.
pub fn sanitize_boolean(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => {
            let lower = s.to_lowercase();
            !(lower.is_empty() || lower == "false" || lower == "0")
        }
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Split a comma or whitespace separated string, dropping empty segments.
pub fn parse_list(s: &str) -> Vec<Value> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|segment| !segment.is_empty())
        .map(|segment| Value::String(segment.to_string()))
        .collect()
}

fn is_index_key(key: &str) -> bool {
    key == "0" || (!key.starts_with('0') && !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()))
}

/// The list a value denotes, or `None` when it cannot be read as one.
///
/// Lists pass through; maps qualify only when every key is an index;
/// scalars are split as comma-separated text.
pub fn as_list(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items.clone()),
        Value::Object(map) if map.keys().all(|k| is_index_key(k)) => {
            Some(map.values().cloned().collect())
        }
        Value::Object(_) | Value::Null => None,
        scalar => Some(parse_list(&stringify(scalar))),
    }
}

/// Best-effort list: like [`as_list`] but keyed maps keep their values and null is empty.
pub fn sanitize_array(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Object(map) => map.values().cloned().collect(),
        Value::Null => Vec::new(),
        scalar => parse_list(&stringify(scalar)),
    }
}

/// Maps, the empty string, and the empty list all read as objects.
pub fn is_object_like(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// The map a value denotes, empty for anything that is not a map.
pub fn sanitize_object(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    }
}

/// Natural text form of a value: `true` is `"1"`, `false` and null are empty,
/// whole floats drop their fraction. Lists and maps become JSON text.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => format_number(n),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Format a number the way it reads in messages: `2`, `1.5`, `-0.25`.
pub fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    let f = n.as_f64().unwrap_or(0.0);
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{:.0}", f)
    } else {
        f.to_string()
    }
}

/// Text form of a schema keyword value for messages.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Number(n) => format_number(n),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Wrap a float as a JSON number; non-finite values become `0`.
pub fn number_value(f: f64) -> Value {
    Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or_else(|| Value::from(0))
}

/// Loose equality: lists element-wise, maps by key, ints and floats numerically.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| values_equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, l)| y.get(k).map_or(false, |r| values_equal(l, r)))
        }
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(l), Some(r)) => l == r,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

/// Enum membership test: [`values_equal`], plus numeric strings match equal numbers.
pub fn enum_member_matches(value: &Value, member: &Value) -> bool {
    if values_equal(value, member) {
        return true;
    }
    match (value, member) {
        (Value::String(_), Value::Number(n)) | (Value::Number(n), Value::String(_)) => {
            let text = if value.is_string() { value } else { member };
            as_f64(text).is_some() && as_f64(text) == n.as_f64()
        }
        _ => false,
    }
}

/// Rebuild a value with every map's keys in sorted order.
fn stabilize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), stabilize(&map[key.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(stabilize).collect()),
        other => other.clone(),
    }
}

/// Index of the first item that repeats an earlier one.
///
/// Map key order is ignored; list order, and the difference between
/// `1` and `1.0` or `"1"`, are not.
pub fn first_duplicate(items: &[Value]) -> Option<usize> {
    let mut seen = HashSet::new();
    for (index, item) in items.iter().enumerate() {
        if !seen.insert(stabilize(item).to_string()) {
            return Some(index);
        }
    }
    None
}
