//! Tests for compiled schema output.

use oxide_rest_schema::{Numeric, Schema, SchemaBuilder, SchemaError};
use serde_json::{json, Value};

fn compiled(schema: &Schema) -> Value {
    Value::Object(schema.compile())
}

#[test]
fn string_with_length_bounds() {
    let mut schema = Schema::new();
    schema.is_string().min(10).unwrap().max(20).unwrap();

    assert_eq!(
        compiled(&schema),
        json!({"type": "string", "minLength": 10, "maxLength": 20})
    );
}

#[test]
fn string_with_format() {
    let mut schema = Schema::new();
    schema.is_string_format("email");

    assert_eq!(compiled(&schema), json!({"type": "string", "format": "email"}));
}

#[test]
fn matches_regex() {
    let mut schema = Schema::new();
    schema.matches_regex("[0-9]+");

    assert_eq!(compiled(&schema), json!({"type": "string", "pattern": "[0-9]+"}));
}

#[test]
fn format_shortcuts() {
    let format_of = |schema: &Schema| schema.get("format").cloned();

    let mut schema = Schema::new();
    schema.is_email();
    assert_eq!(format_of(&schema), Some(json!("email")));

    let mut schema = Schema::new();
    schema.is_uri();
    assert_eq!(format_of(&schema), Some(json!("uri")));

    let mut schema = Schema::new();
    schema.is_ip();
    assert_eq!(format_of(&schema), Some(json!("ip")));

    let mut schema = Schema::new();
    schema.is_uuid();
    assert_eq!(format_of(&schema), Some(json!("uuid")));

    let mut schema = Schema::new();
    schema.is_hex_color();
    assert_eq!(format_of(&schema), Some(json!("hex-color")));

    let mut schema = Schema::new();
    schema.is_date_time();
    assert_eq!(
        compiled(&schema),
        json!({"type": "string", "format": "date-time"})
    );
}

#[test]
fn array_of_named_items() -> Result<(), SchemaError> {
    let mut schema = Schema::new();
    schema
        .is_array(|items| {
            items.where_("name").is_string();
            Ok(())
        })?
        .min(2)?
        .max(4)?
        .unique()?;

    assert_eq!(
        compiled(&schema),
        json!({
            "type": "array",
            "items": {"name": {"type": "string"}},
            "minItems": 2,
            "maxItems": 4,
            "uniqueItems": true,
        })
    );
    Ok(())
}

#[test]
fn array_of_one_of_objects() -> Result<(), SchemaError> {
    let mut schema = Schema::new();
    schema.is_array(|items| {
        items.one_of(|options| {
            options.item().title("Crop").is_object(|props| {
                props.where_("operation").is_string().enum_values(["crop"]);
                props.where_("x").is_integer();
                props.where_("y").is_integer();
                Ok(())
            })?;

            options.item().title("Rotation").is_object(|props| {
                props.where_("operation").is_string().enum_values(["rotate"]);
                props.where_("degrees").is_integer().min(0)?.max(360)?;
                Ok(())
            })?;
            Ok(())
        })?;
        Ok(())
    })?;

    assert_eq!(
        compiled(&schema),
        json!({
            "type": "array",
            "items": {
                "oneOf": [
                    {
                        "title": "Crop",
                        "type": "object",
                        "properties": {
                            "operation": {"type": "string", "enum": ["crop"]},
                            "x": {"type": "integer"},
                            "y": {"type": "integer"},
                        },
                    },
                    {
                        "title": "Rotation",
                        "type": "object",
                        "properties": {
                            "operation": {"type": "string", "enum": ["rotate"]},
                            "degrees": {"type": "integer", "minimum": 0, "maximum": 360},
                        },
                    },
                ],
            },
        })
    );
    Ok(())
}

#[test]
fn object_with_required_properties_keeps_declaration_order() -> Result<(), SchemaError> {
    let mut schema = Schema::new();
    schema
        .is_object(|props| {
            props.where_("name").is_string().required();
            props.where_("color").is_hex_color().required();
            Ok(())
        })?
        .min(1)?
        .max(3)?
        .additional_properties(false)?;

    assert_eq!(
        compiled(&schema),
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "required": true},
                "color": {"type": "string", "format": "hex-color", "required": true},
            },
            "minProperties": 1,
            "maxProperties": 3,
            "additionalProperties": false,
        })
    );

    let node = schema.compile();
    let properties = node["properties"].as_object().unwrap();
    assert_eq!(properties.keys().collect::<Vec<_>>(), vec!["name", "color"]);
    Ok(())
}

#[test]
fn object_with_additional_properties_schema() -> Result<(), SchemaError> {
    let mut schema = Schema::new();
    schema
        .is_object(|_| Ok(()))?
        .additional_properties_with(|extra| {
            extra.item().is_object(|props| {
                props.where_("name").is_string().required();
                props.where_("color").is_hex_color().required();
                Ok(())
            })?;
            Ok(())
        })?;

    assert_eq!(
        compiled(&schema),
        json!({
            "type": "object",
            "properties": {},
            "additionalProperties": {
                "type": "object",
                "properties": {
                    "name": {"type": "string", "required": true},
                    "color": {"type": "string", "format": "hex-color", "required": true},
                },
            },
        })
    );
    Ok(())
}

#[test]
fn additional_properties_callback_needs_one_schema() {
    let mut schema = Schema::new();
    schema.is_object(|_| Ok(())).unwrap();

    let err = schema
        .additional_properties_with(|extra| {
            extra.where_("name").is_string();
            Ok(())
        })
        .unwrap_err();
    assert_eq!(err, SchemaError::AdditionalPropertiesArity(0));
}

#[test]
fn number_and_integer_ranges() {
    let mut schema = Schema::new();
    schema.is_number_range(Some(10), Some(20));
    assert_eq!(
        compiled(&schema),
        json!({"type": "number", "minimum": 10, "maximum": 20})
    );

    let mut schema = Schema::new();
    schema.is_integer_range(Some(10), Some(20));
    assert_eq!(
        compiled(&schema),
        json!({"type": "integer", "minimum": 10, "maximum": 20})
    );
}

#[test]
fn multiple_of() {
    let mut schema = Schema::new();
    schema.multiple_of(2, Numeric::Number);
    assert_eq!(compiled(&schema), json!({"type": "number", "multipleOf": 2}));

    let mut schema = Schema::new();
    schema.multiple_of(2, Numeric::Integer);
    assert_eq!(compiled(&schema), json!({"type": "integer", "multipleOf": 2}));
}

#[test]
fn where_without_parent_context_fails() {
    let mut schema = Schema::new();
    assert_eq!(
        schema.where_("foo").unwrap_err(),
        SchemaError::NoParentContext
    );
    assert_eq!(
        schema.where_with("foo", "integer").unwrap_err(),
        SchemaError::NoParentContext
    );
}

#[test]
fn any_of_and_all_of() -> Result<(), SchemaError> {
    let mut schema = Schema::new();
    schema.is_array(|items| {
        items.any_of(|options| {
            options.item_with("string")?;
            options.item_with("integer")?;
            Ok(())
        })?;
        items.all_of_literal(vec![json!({"minimum": 0})]);
        Ok(())
    })?;

    assert_eq!(
        compiled(&schema),
        json!({
            "type": "array",
            "items": {
                "anyOf": [{"type": "string"}, {"type": "integer"}],
                "allOf": [{"minimum": 0}],
            },
        })
    );
    Ok(())
}

#[test]
fn literal_object_properties() {
    let mut schema = Schema::new();
    schema
        .is_object_literal(json!({"id": {"type": "integer"}}))
        .unwrap();
    assert_eq!(
        compiled(&schema),
        json!({"type": "object", "properties": {"id": {"type": "integer"}}})
    );

    let mut schema = Schema::new();
    assert!(matches!(
        schema.is_object_literal(json!(["id"])),
        Err(SchemaError::NotCompilable(_))
    ));
}

#[test]
fn schema_uri_and_default() {
    let mut schema = Schema::new();
    schema
        .schema_uri(oxide_rest_schema::DRAFT_04)
        .is_string()
        .default_value("draft");

    assert_eq!(
        compiled(&schema),
        json!({
            "$schema": "http://json-schema.org/draft-04/schema#",
            "type": "string",
            "default": "draft",
        })
    );
}
