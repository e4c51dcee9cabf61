//! The schema builder.
//!
//! A [`Schema`] accumulates JSON-Schema keywords for a single value. The
//! fluent API lives on the [`SchemaBuilder`] trait so the same chain works on
//! a standalone schema and on cursors handed out by parent builders (route
//! arguments, nested properties).

use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::compile::{Compile, Literal, SchemaNode};
use crate::error::{Result, SchemaError};
use crate::nested::{Compiled, NestedBuilder};
use crate::primitive::{Numeric, Primitive, TypeSpec};

/// Which end of a range a bound applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Min,
    Max,
}

impl Bound {
    const fn method(self, exclusive: bool) -> &'static str {
        match (self, exclusive) {
            (Self::Min, false) => "min",
            (Self::Max, false) => "max",
            (Self::Min, true) => "exclusive_min",
            (Self::Max, true) => "exclusive_max",
        }
    }
}

/// Value accepted by `additionalProperties`.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    /// Allow or forbid any extra property.
    Allowed(bool),
    /// Extra properties must match this schema.
    Schema(SchemaNode),
}

impl From<bool> for AdditionalProperties {
    fn from(allowed: bool) -> Self {
        Self::Allowed(allowed)
    }
}

impl From<SchemaNode> for AdditionalProperties {
    fn from(node: SchemaNode) -> Self {
        Self::Schema(node)
    }
}

impl From<Literal> for AdditionalProperties {
    fn from(literal: Literal) -> Self {
        Self::Schema(literal.into_inner())
    }
}

impl From<AdditionalProperties> for Value {
    fn from(value: AdditionalProperties) -> Self {
        match value {
            AdditionalProperties::Allowed(allowed) => Self::Bool(allowed),
            AdditionalProperties::Schema(node) => Self::Object(node),
        }
    }
}

/// A JSON-Schema descriptor for one value.
///
/// # Example
///
/// ```
/// use oxide_rest_schema::{Schema, SchemaBuilder};
/// use serde_json::json;
///
/// let mut schema = Schema::new();
/// schema.is_string().min(10)?.max(20)?;
///
/// assert_eq!(
///     serde_json::Value::Object(schema.compile()),
///     json!({"type": "string", "minLength": 10, "maxLength": 20})
/// );
/// # Ok::<(), oxide_rest_schema::SchemaError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    keywords: SchemaNode,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a schema seeded from a type, a list of types, or a pattern.
    ///
    /// A single token that is not a supported type is read as a regular
    /// expression: the schema becomes a string constrained by that pattern.
    /// Lists are always read as types.
    pub fn seeded(seed: impl Into<TypeSpec>) -> Result<Self> {
        let mut schema = Self::new();
        schema.seed(seed.into())?;
        Ok(schema)
    }

    pub(crate) fn seed(&mut self, seed: TypeSpec) -> Result<()> {
        if seed.is_empty() {
            return Ok(());
        }

        if let TypeSpec::One(token) = &seed {
            if token.parse::<Primitive>().is_err() {
                debug!(pattern = %token, "seed is not a type, using it as a pattern");
                self.set("type", Primitive::String.as_str());
                self.set("pattern", token.as_str());
                return Ok(());
            }
        }

        self.add_types(&seed.primitives()?);
        Ok(())
    }

    /// Returns the accumulated keywords.
    #[must_use]
    pub fn compile(&self) -> SchemaNode {
        self.keywords.clone()
    }

    /// Returns the value of a keyword.
    #[must_use]
    pub fn get(&self, keyword: &str) -> Option<&Value> {
        self.keywords.get(keyword)
    }

    /// Returns the declared types, in declaration order.
    #[must_use]
    pub fn types(&self) -> Vec<Primitive> {
        match self.keywords.get("type") {
            Some(Value::String(token)) => token.parse::<Primitive>().into_iter().collect(),
            Some(Value::Array(tokens)) => tokens
                .iter()
                .filter_map(|t| t.as_str()?.parse::<Primitive>().ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Root schemas have no parent builder, so sibling declarations fail.
    pub fn where_(&mut self, _name: &str) -> Result<&mut Self> {
        Err(SchemaError::NoParentContext)
    }

    /// Root schemas have no parent builder, so sibling declarations fail.
    pub fn where_with(&mut self, _name: &str, _seed: impl Into<TypeSpec>) -> Result<&mut Self> {
        Err(SchemaError::NoParentContext)
    }

    pub(crate) fn set(&mut self, keyword: &str, value: impl Into<Value>) {
        self.keywords.insert(keyword.to_string(), value.into());
    }

    pub(crate) fn add_types(&mut self, types: &[Primitive]) {
        let mut current = self.types();
        for primitive in types {
            if !current.contains(primitive) {
                current.push(*primitive);
            }
        }

        let value = match current.as_slice() {
            [single] => Value::from(single.as_str()),
            many => Value::Array(many.iter().map(|p| Value::from(p.as_str())).collect()),
        };
        self.set("type", value);
    }

    fn single_type(&self, method: &'static str, expected: &'static str) -> Result<Primitive> {
        match self.types().as_slice() {
            [] => Err(SchemaError::TypeNotSet { method }),
            [single] => Ok(*single),
            many => Err(SchemaError::IncompatibleType {
                method,
                expected,
                found: many
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    fn require_type(&self, method: &'static str, required: Primitive) -> Result<()> {
        let found = self.single_type(method, required.as_str())?;
        if found == required {
            Ok(())
        } else {
            Err(SchemaError::IncompatibleType {
                method,
                expected: required.as_str(),
                found: found.to_string(),
            })
        }
    }

    fn bound(&mut self, bound: Bound, value: i64, exclusive: bool) -> Result<()> {
        let method = bound.method(exclusive);
        let expected = if exclusive {
            "integer and number"
        } else {
            "integer, number, string, array and object"
        };

        let keyword = match (self.single_type(method, expected)?, bound, exclusive) {
            (Primitive::Integer | Primitive::Number, Bound::Min, _) => "minimum",
            (Primitive::Integer | Primitive::Number, Bound::Max, _) => "maximum",
            (Primitive::String, Bound::Min, false) => "minLength",
            (Primitive::String, Bound::Max, false) => "maxLength",
            (Primitive::Array, Bound::Min, false) => "minItems",
            (Primitive::Array, Bound::Max, false) => "maxItems",
            (Primitive::Object, Bound::Min, false) => "minProperties",
            (Primitive::Object, Bound::Max, false) => "maxProperties",
            (found, _, _) => {
                return Err(SchemaError::IncompatibleType {
                    method,
                    expected,
                    found: found.to_string(),
                })
            }
        };

        self.set(keyword, value);
        if exclusive {
            let flag = match bound {
                Bound::Min => "exclusiveMinimum",
                Bound::Max => "exclusiveMaximum",
            };
            self.set(flag, true);
        }

        Ok(())
    }

    fn range(&mut self, primitive: Primitive, min: Option<i64>, max: Option<i64>) {
        self.set("type", primitive.as_str());
        if let Some(min) = min {
            self.set("minimum", min);
        }
        if let Some(max) = max {
            self.set("maximum", max);
        }
    }
}

impl Compile for Schema {
    fn compile_value(&self) -> Value {
        Value::Object(self.keywords.clone())
    }
}

fn nested_value<F>(build: F) -> Result<Compiled>
where
    F: FnOnce(&mut NestedBuilder) -> Result<()>,
{
    let mut nested = NestedBuilder::new();
    build(&mut nested)?;
    Ok(nested.compile())
}

/// Fluent API shared by every schema builder.
///
/// Implementors only expose the [`Schema`] they edit; every keyword method is
/// provided and returns the implementor itself, so chains stay on the same
/// cursor and can continue with its sibling methods.
pub trait SchemaBuilder {
    /// Returns the schema being built.
    fn node(&self) -> &Schema;

    /// Returns the schema being built, mutably.
    fn node_mut(&mut self) -> &mut Schema;

    /// Sets the `$schema` dialect URI.
    fn schema_uri(&mut self, uri: impl Into<String>) -> &mut Self {
        self.node_mut().set("$schema", uri.into());
        self
    }

    /// Sets the contexts the value is exposed in.
    fn context<I, S>(&mut self, contexts: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let contexts: Vec<Value> = contexts.into_iter().map(|c| Value::String(c.into())).collect();
        self.node_mut().set("context", contexts);
        self
    }

    /// Marks the value as read-only.
    fn read_only(&mut self) -> &mut Self {
        self.node_mut().set("readonly", true);
        self
    }

    /// Sets the schema id.
    fn id(&mut self, id: impl Into<String>) -> &mut Self {
        self.node_mut().set("id", id.into());
        self
    }

    /// Sets the title.
    fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.node_mut().set("title", title.into());
        self
    }

    /// Sets the description.
    fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.node_mut().set("description", description.into());
        self
    }

    /// Marks the value as required.
    fn required(&mut self) -> &mut Self {
        self.node_mut().set("required", true);
        self
    }

    /// Marks the value as explicitly optional.
    fn optional(&mut self) -> &mut Self {
        self.node_mut().set("required", false);
        self
    }

    /// Adds one or more types; repeated calls accumulate.
    fn ty(&mut self, types: impl Into<TypeSpec>) -> Result<&mut Self> {
        let types = types.into().primitives()?;
        self.node_mut().add_types(&types);
        Ok(self)
    }

    /// Sets the type to `string`.
    fn is_string(&mut self) -> &mut Self {
        self.node_mut().set("type", Primitive::String.as_str());
        self
    }

    /// Sets the type to `string` with a format.
    fn is_string_format(&mut self, format: &str) -> &mut Self {
        self.is_string();
        if !format.is_empty() {
            self.node_mut().set("format", format);
        }
        self
    }

    /// Sets the type to `number`.
    fn is_number(&mut self) -> &mut Self {
        self.is_number_range(None, None)
    }

    /// Sets the type to `number` with optional inclusive bounds.
    fn is_number_range(&mut self, min: Option<i64>, max: Option<i64>) -> &mut Self {
        self.node_mut().range(Primitive::Number, min, max);
        self
    }

    /// Sets the type to `integer`.
    fn is_integer(&mut self) -> &mut Self {
        self.is_integer_range(None, None)
    }

    /// Sets the type to `integer` with optional inclusive bounds.
    fn is_integer_range(&mut self, min: Option<i64>, max: Option<i64>) -> &mut Self {
        self.node_mut().range(Primitive::Integer, min, max);
        self
    }

    /// Requires the value to be a multiple of `number`.
    fn multiple_of(&mut self, number: impl Into<Number>, kind: Numeric) -> &mut Self {
        match kind {
            Numeric::Integer => self.is_integer(),
            Numeric::Number => self.is_number(),
        };
        self.node_mut().set("multipleOf", Value::Number(number.into()));
        self
    }

    /// Adds the `boolean` type.
    fn is_bool(&mut self) -> &mut Self {
        self.node_mut().add_types(&[Primitive::Boolean]);
        self
    }

    /// A string in `email` format.
    fn is_email(&mut self) -> &mut Self {
        self.is_string_format("email")
    }

    /// A string in `date-time` format.
    fn is_date_time(&mut self) -> &mut Self {
        self.is_string_format("date-time")
    }

    /// A string in `uri` format.
    fn is_uri(&mut self) -> &mut Self {
        self.is_string_format("uri")
    }

    /// A string in `ip` format.
    fn is_ip(&mut self) -> &mut Self {
        self.is_string_format("ip")
    }

    /// A string in `uuid` format.
    fn is_uuid(&mut self) -> &mut Self {
        self.is_string_format("uuid")
    }

    /// A string in `hex-color` format.
    fn is_hex_color(&mut self) -> &mut Self {
        self.is_string_format("hex-color")
    }

    /// A string matching `pattern`.
    fn matches_regex(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.is_string();
        self.node_mut().set("pattern", pattern.into());
        self
    }

    /// Adds the `array` type with items declared by `build`.
    fn is_array<F>(&mut self, build: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut NestedBuilder) -> Result<()>,
    {
        self.node_mut().add_types(&[Primitive::Array]);
        let items = nested_value(build)?;
        self.node_mut().set("items", Value::from(items));
        Ok(self)
    }

    /// Adds the `array` type with a literal `items` value.
    fn is_array_literal(&mut self, items: Value) -> Result<&mut Self> {
        if !(items.is_object() || items.is_array()) {
            return Err(SchemaError::NotCompilable(items.to_string()));
        }
        self.node_mut().add_types(&[Primitive::Array]);
        self.node_mut().set("items", items);
        Ok(self)
    }

    /// Requires array items to be unique.
    fn unique(&mut self) -> Result<&mut Self> {
        self.node().require_type("unique", Primitive::Array)?;
        self.node_mut().set("uniqueItems", true);
        Ok(self)
    }

    /// Adds the `object` type with properties declared by `build`.
    fn is_object<F>(&mut self, build: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut NestedBuilder) -> Result<()>,
    {
        self.node_mut().add_types(&[Primitive::Object]);
        let properties = match nested_value(build)? {
            Compiled::List(items) if items.is_empty() => Value::Object(Map::new()),
            compiled => Value::from(compiled),
        };
        self.node_mut().set("properties", properties);
        Ok(self)
    }

    /// Adds the `object` type with a literal `properties` mapping.
    fn is_object_literal(&mut self, properties: Value) -> Result<&mut Self> {
        let properties = Literal::try_from(properties)?;
        self.node_mut().add_types(&[Primitive::Object]);
        self.node_mut()
            .set("properties", Value::Object(properties.into_inner()));
        Ok(self)
    }

    /// Sets `additionalProperties` to a flag or a schema mapping.
    fn additional_properties(&mut self, value: impl Into<AdditionalProperties>) -> Result<&mut Self> {
        self.node()
            .require_type("additional_properties", Primitive::Object)?;
        self.node_mut()
            .set("additionalProperties", Value::from(value.into()));
        Ok(self)
    }

    /// Sets `additionalProperties` to the single unnamed schema declared by
    /// `build`.
    fn additional_properties_with<F>(&mut self, build: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut NestedBuilder) -> Result<()>,
    {
        self.node()
            .require_type("additional_properties", Primitive::Object)?;
        let mut nested = NestedBuilder::new();
        build(&mut nested)?;
        let schema = nested.compile_single()?;
        self.node_mut().set("additionalProperties", schema);
        Ok(self)
    }

    /// Sets the lower bound for the current type.
    fn min(&mut self, min: i64) -> Result<&mut Self> {
        self.node_mut().bound(Bound::Min, min, false)?;
        Ok(self)
    }

    /// Sets the upper bound for the current type.
    fn max(&mut self, max: i64) -> Result<&mut Self> {
        self.node_mut().bound(Bound::Max, max, false)?;
        Ok(self)
    }

    /// Sets an exclusive lower bound on a numeric type.
    fn exclusive_min(&mut self, min: i64) -> Result<&mut Self> {
        self.node_mut().bound(Bound::Min, min, true)?;
        Ok(self)
    }

    /// Sets an exclusive upper bound on a numeric type.
    fn exclusive_max(&mut self, max: i64) -> Result<&mut Self> {
        self.node_mut().bound(Bound::Max, max, true)?;
        Ok(self)
    }

    /// Restricts the value to the given items.
    fn enum_values<I, V>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let items: Vec<Value> = items.into_iter().map(Into::into).collect();
        self.node_mut().set("enum", items);
        self
    }

    /// Sets a `$ref` pointer.
    fn reference(&mut self, reference: impl Into<String>) -> &mut Self {
        self.node_mut().set("$ref", reference.into());
        self
    }

    /// Sets the default value.
    fn default_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.node_mut().set("default", value);
        self
    }
}

impl SchemaBuilder for Schema {
    fn node(&self) -> &Schema {
        self
    }

    fn node_mut(&mut self) -> &mut Schema {
        self
    }
}
