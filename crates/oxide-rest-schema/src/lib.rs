//! # oxide-rest-schema
//!
//! Fluent builders for the JSON-Schema descriptors attached to REST route
//! arguments.
//!
//! This crate provides:
//! - [`Schema`], a builder for a single value's schema
//! - [`NestedBuilder`], for object properties, array items and
//!   `oneOf`/`anyOf`/`allOf` groups
//! - The [`SchemaBuilder`] trait carrying the fluent keyword API
//!
//! Schemas are only described here, never used to validate values.
//!
//! ## Quick Start
//!
//! ```
//! use oxide_rest_schema::{Schema, SchemaBuilder};
//! use serde_json::json;
//!
//! let mut color = Schema::new();
//! color
//!     .is_object(|props| {
//!         props.where_("name").is_string().required();
//!         props.where_("color").is_hex_color().required();
//!         Ok(())
//!     })?
//!     .min(1)?
//!     .max(3)?
//!     .additional_properties(false)?;
//!
//! assert_eq!(
//!     serde_json::Value::Object(color.compile()),
//!     json!({
//!         "type": "object",
//!         "properties": {
//!             "name": {"type": "string", "required": true},
//!             "color": {"type": "string", "format": "hex-color", "required": true},
//!         },
//!         "minProperties": 1,
//!         "maxProperties": 3,
//!         "additionalProperties": false,
//!     })
//! );
//! # Ok::<(), oxide_rest_schema::SchemaError>(())
//! ```
//!
//! ## Seeding
//!
//! A schema can be seeded from a type token, a list of types, or a regular
//! expression. Tokens that are not types become a string pattern:
//!
//! ```
//! use oxide_rest_schema::Schema;
//!
//! let digits = Schema::seeded("^[0-9]+$")?;
//! assert_eq!(digits.get("pattern").and_then(|p| p.as_str()), Some("^[0-9]+$"));
//! # Ok::<(), oxide_rest_schema::SchemaError>(())
//! ```

mod compile;
mod error;
mod nested;
mod primitive;
mod schema;

pub use compile::{Compile, Literal, SchemaNode};
pub use error::{Result, SchemaError};
pub use nested::{Compiled, NestedBuilder, Property};
pub use primitive::{Numeric, Primitive, TypeSpec, SUPPORTED_TYPES};
pub use schema::{AdditionalProperties, Schema, SchemaBuilder};

/// The JSON-Schema draft-04 dialect URI.
pub const DRAFT_04: &str = "http://json-schema.org/draft-04/schema#";
