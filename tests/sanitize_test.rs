//! Integration tests for value sanitization.

use proptest::prelude::*;
use rest_schema::{
    sanitize_value_from_schema, sanitize_with, validate_value_from_schema, ErrorCode,
    SchemaOptions, UsageKind,
};
use serde_json::{json, Value};

fn clean(value: Value, schema: &Value) -> Value {
    sanitize_value_from_schema(&value, schema, "param").unwrap()
}

mod scalars {
    use super::*;

    #[test]
    fn numbers_parse_leading_prefix() {
        let schema = json!({ "type": "number" });
        assert_eq!(clean(json!("1abc"), &schema), json!(1.0));
        assert_eq!(clean(json!(" 2.5"), &schema), json!(2.5));
        assert_eq!(clean(json!("abc"), &schema), json!(0.0));
        assert_eq!(clean(json!([1, 2]), &schema), json!(0.0));
    }

    #[test]
    fn integers_truncate() {
        let schema = json!({ "type": "integer" });
        assert_eq!(clean(json!("12.9"), &schema), json!(12));
        assert_eq!(clean(json!(-3.7), &schema), json!(-3));
        assert_eq!(clean(json!("7 apples"), &schema), json!(7));
        assert_eq!(clean(json!(true), &schema), json!(1));
        assert_eq!(clean(json!("1e400"), &schema), json!(0));
    }

    #[test]
    fn strings_use_natural_text() {
        let schema = json!({ "type": "string" });
        assert_eq!(clean(json!(15), &schema), json!("15"));
        assert_eq!(clean(json!(1.5), &schema), json!("1.5"));
        assert_eq!(clean(json!(true), &schema), json!("1"));
        assert_eq!(clean(json!(null), &schema), json!(""));
    }

    #[test]
    fn booleans_default_truthy() {
        let schema = json!({ "type": "boolean" });
        assert_eq!(clean(json!("false"), &schema), json!(false));
        assert_eq!(clean(json!("0"), &schema), json!(false));
        assert_eq!(clean(json!(""), &schema), json!(false));
        assert_eq!(clean(json!("yes"), &schema), json!(true));
        assert_eq!(clean(json!(2), &schema), json!(true));
    }
}

mod arrays {
    use super::*;

    #[test]
    fn csv_items_coerced() {
        let schema = json!({ "type": "array", "items": { "type": "number" } });
        assert_eq!(clean(json!("1,2,a"), &schema), json!([1.0, 2.0, 0.0]));
        assert_eq!(clean(json!("1,2,,"), &schema), json!([1.0, 2.0]));
    }

    #[test]
    fn enum_not_filtered() {
        let schema = json!({
            "type": "array",
            "items": { "type": "string", "enum": ["a"] }
        });
        assert_eq!(clean(json!(["b", "a"]), &schema), json!(["b", "a"]));
    }

    #[test]
    fn format_not_applied_to_arrays() {
        let schema = json!({
            "type": "array",
            "format": "hex-color",
            "items": { "type": "string" }
        });
        assert_eq!(clean(json!(["#zzz"]), &schema), json!(["#zzz"]));
    }

    #[test]
    fn duplicates_after_coercion_fail() {
        let schema = json!({
            "type": "array",
            "uniqueItems": true,
            "items": { "type": "string", "format": "uri" }
        });
        let value = json!(["http://example.com/a b", "http://example.com/a%20b"]);

        // Distinct before normalization.
        assert!(validate_value_from_schema(&value, &schema, "param").is_ok());

        let err = sanitize_value_from_schema(&value, &schema, "param").unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateItems);
        assert_eq!(err.position, Some(1));
    }

    #[test]
    fn numeric_strings_collapse_to_duplicates() {
        let schema = json!({ "type": "array", "uniqueItems": true, "items": { "type": "integer" } });
        let err = sanitize_value_from_schema(&json!(["1", "1.0"]), &schema, "ids").unwrap_err();
        assert_eq!(err.message, "ids has duplicate items.");
    }
}

mod objects {
    use super::*;

    #[test]
    fn unknown_keys_dropped() {
        let schema = json!({
            "type": "object",
            "properties": { "a": { "type": "number" } },
            "additionalProperties": false
        });
        assert_eq!(clean(json!({ "a": "1", "b": 1 }), &schema), json!({ "a": 1.0 }));
    }

    #[test]
    fn unknown_keys_kept_by_default() {
        let schema = json!({
            "type": "object",
            "properties": { "a": { "type": "integer" } }
        });
        assert_eq!(
            clean(json!({ "a": "2", "b": "x" }), &schema),
            json!({ "a": 2, "b": "x" })
        );
    }

    #[test]
    fn pattern_and_additional_schemas() {
        let schema = json!({
            "type": "object",
            "patternProperties": { "^n_": { "type": "integer" } },
            "additionalProperties": { "type": "boolean" }
        });
        assert_eq!(
            clean(json!({ "n_a": "5", "flag": "0" }), &schema),
            json!({ "n_a": 5, "flag": false })
        );
    }

    #[test]
    fn empty_string_is_empty_object() {
        let schema = json!({ "type": "object" });
        assert_eq!(clean(json!(""), &schema), json!({}));
    }

    #[test]
    fn empty_key_dropped() {
        let schema = json!({
            "type": "object",
            "patternProperties": { "^.*$": { "type": "string" } }
        });
        assert_eq!(clean(json!({ "": 1, "k": 2 }), &schema), json!({ "k": "2" }));
    }
}

mod formats {
    use super::*;

    #[test]
    fn invalid_hex_color_becomes_empty() {
        let schema = json!({ "type": "string", "format": "hex-color" });
        assert_eq!(clean(json!("#zzz"), &schema), json!(""));
        assert_eq!(clean(json!("#ABC"), &schema), json!("#ABC"));
    }

    #[test]
    fn text_fields_strip_markup() {
        let schema = json!({ "type": "string", "format": "text-field" });
        assert_eq!(clean(json!("  <em>hi</em>  there "), &schema), json!("hi there"));

        let schema = json!({ "type": "string", "format": "textarea-field" });
        assert_eq!(clean(json!("one\ntwo"), &schema), json!("one\ntwo"));
    }

    #[test]
    fn uri_prefixed_and_escaped() {
        let schema = json!({ "type": "string", "format": "uri" });
        assert_eq!(clean(json!("example.com/a b"), &schema), json!("http://example.com/a%20b"));
        assert_eq!(clean(json!("javascript:alert(1)"), &schema), json!(""));
    }
}

mod multi_type {
    use super::*;

    #[test]
    fn first_type_that_validates_wins() {
        let schema = json!({ "type": ["integer", "string"] });
        assert_eq!(clean(json!("15"), &schema), json!(15));
        assert_eq!(clean(json!("15.5"), &schema), json!("15.5"));

        let schema = json!({ "type": ["boolean", "integer"] });
        assert_eq!(clean(json!("1"), &schema), json!(true));
    }

    #[test]
    fn no_candidate_yields_null() {
        let schema = json!({ "type": ["integer", "string"] });
        assert_eq!(clean(json!(15.5), &schema), json!(null));

        let schema = json!({ "type": ["integer"], "minimum": 10 });
        assert_eq!(clean(json!("5"), &schema), json!(null));
    }

    #[test]
    fn duplicates_after_coercion_are_reported() {
        let schema = json!({
            "type": ["array", "null"],
            "uniqueItems": true,
            "items": { "type": "integer" }
        });
        let err = sanitize_value_from_schema(&json!(["1", 1]), &schema, "p").unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateItems);
        assert_eq!(err.message, "p has duplicate items.");
        assert_eq!(err.position, Some(1));
    }

    #[test]
    fn combinator_errors_in_items_are_reported() {
        let schema = json!({
            "type": ["array", "null"],
            "items": {
                "oneOf": [
                    { "type": "string" },
                    { "type": "string", "minLength": 0 }
                ]
            }
        });
        let err = sanitize_value_from_schema(&json!(["a"]), &schema, "p").unwrap_err();
        assert_eq!(err.code, ErrorCode::OneOfMultipleMatches);
        assert_eq!(err.positions, vec![0, 1]);
    }

    #[test]
    fn later_type_can_recover_from_structural_error() {
        let schema = json!({
            "type": ["array", "string"],
            "uniqueItems": true,
            "items": { "type": "integer" }
        });
        assert_eq!(clean(json!("1,1"), &schema), json!("1,1"));
    }

    #[test]
    fn empty_string_prefers_string() {
        let schema = json!({ "type": ["object", "string"] });
        assert_eq!(clean(json!(""), &schema), json!(""));
    }
}

mod combinators {
    use super::*;

    fn one_of() -> Value {
        json!({
            "oneOf": [
                { "type": "string", "maxLength": 1 },
                { "type": "integer", "multipleOf": 2 }
            ]
        })
    }

    #[test]
    fn one_of_coerces_through_matching_branch() {
        assert_eq!(clean(json!("44"), &one_of()), json!(44));
        assert_eq!(clean(json!(4), &one_of()), json!(4));
        assert_eq!(clean(json!("a"), &one_of()), json!("a"));
    }

    #[test]
    fn one_of_errors_are_structured() {
        let err = sanitize_value_from_schema(&json!("11"), &one_of(), "param").unwrap_err();
        assert_eq!(err.code, ErrorCode::NoMatchingSchema);

        let err = sanitize_value_from_schema(&json!("4"), &one_of(), "param").unwrap_err();
        assert_eq!(err.code, ErrorCode::OneOfMultipleMatches);
    }

    #[test]
    fn any_of_uses_first_match() {
        let schema = json!({ "anyOf": [{ "type": "integer" }, { "type": "string" }] });
        assert_eq!(clean(json!("5"), &schema), json!(5));
        assert_eq!(clean(json!("five"), &schema), json!("five"));

        let err = sanitize_value_from_schema(&json!([]), &schema, "param").unwrap_err();
        assert_eq!(err.code, ErrorCode::NoMatchingSchema);
    }
}

mod usage {
    use super::*;

    #[test]
    fn unknown_type_passes_value_through() {
        let report = sanitize_with(&json!("x"), &json!({ "type": "text" }), "p", &SchemaOptions::new());
        assert_eq!(report.result.unwrap(), json!("x"));
        assert_eq!(report.notices[0].kind, UsageKind::UnknownType);
        assert_eq!(report.notices[0].param, "p");
    }
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<f64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        ".{0,12}".prop_map(Value::from),
        "[+-]?[0-9]{1,6}(\\.[0-9]{0,4})?[a-z]{0,3}".prop_map(Value::from),
        Just(Value::Null),
    ]
}

proptest! {
    #[test]
    fn sanitized_integers_validate(value in scalar()) {
        let schema = json!({ "type": "integer" });
        let sanitized = sanitize_value_from_schema(&value, &schema, "n").unwrap();
        prop_assert!(validate_value_from_schema(&sanitized, &schema, "n").is_ok());
    }

    #[test]
    fn sanitized_numbers_validate(value in scalar()) {
        let schema = json!({ "type": "number" });
        let sanitized = sanitize_value_from_schema(&value, &schema, "n").unwrap();
        prop_assert!(validate_value_from_schema(&sanitized, &schema, "n").is_ok());
    }
}
