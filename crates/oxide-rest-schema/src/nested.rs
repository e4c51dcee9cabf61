//! Builders for collections of schemas.
//!
//! A [`NestedBuilder`] collects the properties of an object, the items of an
//! array, or the alternatives of a `oneOf`/`anyOf`/`allOf` group. Entries are
//! either named or positional; positional entries compile into a list and
//! named entries into a mapping.

use serde_json::{Map, Value};

use crate::compile::{Compile, Literal};
use crate::error::{Result, SchemaError};
use crate::primitive::TypeSpec;
use crate::schema::{Schema, SchemaBuilder};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Key {
    Named(String),
    Positional(usize),
}

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    /// Index into `NestedBuilder::schemas`.
    Schema(usize),
    /// Already plain data; stored as is.
    Value(Value),
}

/// The compiled form of a [`NestedBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub enum Compiled {
    /// Only positional entries were declared.
    List(Vec<Value>),
    /// At least one named entry was declared. Positional entries are keyed by
    /// their position.
    Map(Map<String, Value>),
}

impl From<Compiled> for Value {
    fn from(compiled: Compiled) -> Self {
        match compiled {
            Compiled::List(items) => Self::Array(items),
            Compiled::Map(map) => Self::Object(map),
        }
    }
}

/// Collects named and positional schemas.
///
/// # Example
///
/// ```
/// use oxide_rest_schema::{NestedBuilder, SchemaBuilder};
/// use serde_json::json;
///
/// let mut props = NestedBuilder::new();
/// props.where_("name").is_string().required();
/// props.where_("age").is_integer().min(0)?;
///
/// assert_eq!(
///     serde_json::Value::from(props.compile()),
///     json!({
///         "name": {"type": "string", "required": true},
///         "age": {"type": "integer", "minimum": 0},
///     })
/// );
/// # Ok::<(), oxide_rest_schema::SchemaError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NestedBuilder {
    entries: Vec<(Key, Slot)>,
    schemas: Vec<Schema>,
    next_position: usize,
}

impl NestedBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a named schema and returns a cursor to it.
    ///
    /// Declaring the same name again replaces the earlier entry in place.
    pub fn where_(&mut self, key: &str) -> Property<'_> {
        let index = self.push_schema(Some(key), Schema::new());
        Property {
            builder: self,
            index,
        }
    }

    /// Declares a named schema seeded from a type, types, or a pattern.
    pub fn where_with(&mut self, key: &str, seed: impl Into<TypeSpec>) -> Result<Property<'_>> {
        let schema = Schema::seeded(seed)?;
        let index = self.push_schema(Some(key), schema);
        Ok(Property {
            builder: self,
            index,
        })
    }

    /// Declares a positional schema and returns a cursor to it.
    pub fn item(&mut self) -> Property<'_> {
        let index = self.push_schema(None, Schema::new());
        Property {
            builder: self,
            index,
        }
    }

    /// Declares a positional schema seeded from a type, types, or a pattern.
    pub fn item_with(&mut self, seed: impl Into<TypeSpec>) -> Result<Property<'_>> {
        let schema = Schema::seeded(seed)?;
        let index = self.push_schema(None, schema);
        Ok(Property {
            builder: self,
            index,
        })
    }

    /// Stores a literal `default` entry.
    pub fn default_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.insert(Some("default"), Slot::Value(value.into()));
        self
    }

    /// Declares `oneOf` alternatives with a fresh builder.
    pub fn one_of<F>(&mut self, build: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.some_of("oneOf", build)
    }

    /// Declares `anyOf` alternatives with a fresh builder.
    pub fn any_of<F>(&mut self, build: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.some_of("anyOf", build)
    }

    /// Declares `allOf` alternatives with a fresh builder.
    pub fn all_of<F>(&mut self, build: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.some_of("allOf", build)
    }

    /// Stores literal `oneOf` alternatives.
    pub fn one_of_literal(&mut self, options: Vec<Value>) -> &mut Self {
        self.insert(Some("oneOf"), Slot::Value(Value::Array(options)));
        self
    }

    /// Stores literal `anyOf` alternatives.
    pub fn any_of_literal(&mut self, options: Vec<Value>) -> &mut Self {
        self.insert(Some("anyOf"), Slot::Value(Value::Array(options)));
        self
    }

    /// Stores literal `allOf` alternatives.
    pub fn all_of_literal(&mut self, options: Vec<Value>) -> &mut Self {
        self.insert(Some("allOf"), Slot::Value(Value::Array(options)));
        self
    }

    /// Adds any compilable entry. It is compiled immediately.
    pub fn push(&mut self, key: Option<&str>, entry: &impl Compile) -> &mut Self {
        self.insert(key, Slot::Value(entry.compile_value()));
        self
    }

    /// Adds a literal schema mapping.
    ///
    /// Fails when `value` is not a mapping.
    pub fn push_literal(&mut self, key: Option<&str>, value: Value) -> Result<&mut Self> {
        let literal = Literal::try_from(value)?;
        Ok(self.push(key, &literal))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether nothing was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compiles every entry in declaration order.
    #[must_use]
    pub fn compile(&self) -> Compiled {
        let named = self
            .entries
            .iter()
            .any(|(key, _)| matches!(key, Key::Named(_)));

        if !named {
            return Compiled::List(
                self.entries
                    .iter()
                    .map(|(_, slot)| self.compile_slot(slot))
                    .collect(),
            );
        }

        let mut map = Map::new();
        for (key, slot) in &self.entries {
            let key = match key {
                Key::Named(name) => name.clone(),
                Key::Positional(position) => position.to_string(),
            };
            map.insert(key, self.compile_slot(slot));
        }
        Compiled::Map(map)
    }

    /// Compiles the single unnamed entry.
    pub(crate) fn compile_single(&self) -> Result<Value> {
        match self.compile() {
            Compiled::List(mut items) if items.len() == 1 => Ok(items.remove(0)),
            Compiled::List(items) => Err(SchemaError::AdditionalPropertiesArity(items.len())),
            Compiled::Map(_) => Err(SchemaError::AdditionalPropertiesArity(
                self.entries
                    .iter()
                    .filter(|(key, _)| matches!(key, Key::Positional(_)))
                    .count(),
            )),
        }
    }

    fn compile_slot(&self, slot: &Slot) -> Value {
        match slot {
            Slot::Schema(index) => self.schemas[*index].compile_value(),
            Slot::Value(value) => value.clone(),
        }
    }

    fn some_of<F>(&mut self, keyword: &str, build: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let mut nested = Self::new();
        build(&mut nested)?;
        self.insert(Some(keyword), Slot::Value(nested.compile().into()));
        Ok(self)
    }

    fn push_schema(&mut self, key: Option<&str>, schema: Schema) -> usize {
        if let Some(index) = key.and_then(|name| self.named_schema(name)) {
            self.schemas[index] = schema;
            return index;
        }

        let index = self.schemas.len();
        self.schemas.push(schema);
        self.insert(key, Slot::Schema(index));
        index
    }

    fn named_schema(&self, name: &str) -> Option<usize> {
        self.entries.iter().find_map(|(key, slot)| match (key, slot) {
            (Key::Named(n), Slot::Schema(index)) if n == name => Some(*index),
            _ => None,
        })
    }

    fn insert(&mut self, key: Option<&str>, slot: Slot) {
        match key.filter(|k| !k.is_empty()) {
            Some(name) => {
                let existing = self
                    .entries
                    .iter_mut()
                    .find(|(k, _)| matches!(k, Key::Named(n) if n == name));
                match existing {
                    Some((_, current)) => *current = slot,
                    None => self.entries.push((Key::Named(name.to_string()), slot)),
                }
            }
            None => {
                let position = self.next_position;
                self.next_position += 1;
                self.entries.push((Key::Positional(position), slot));
            }
        }
    }
}

impl Compile for NestedBuilder {
    fn compile_value(&self) -> Value {
        self.compile().into()
    }
}

/// Cursor to a schema declared inside a [`NestedBuilder`].
///
/// Keyword methods come from [`SchemaBuilder`]; `where_` and `item` start a
/// sibling declaration in the same builder.
#[derive(Debug)]
pub struct Property<'a> {
    builder: &'a mut NestedBuilder,
    index: usize,
}

impl Property<'_> {
    /// Declares a named sibling schema.
    pub fn where_(&mut self, key: &str) -> Property<'_> {
        self.builder.where_(key)
    }

    /// Declares a named sibling schema seeded from a type, types, or a pattern.
    pub fn where_with(&mut self, key: &str, seed: impl Into<TypeSpec>) -> Result<Property<'_>> {
        self.builder.where_with(key, seed)
    }

    /// Declares a positional sibling schema.
    pub fn item(&mut self) -> Property<'_> {
        self.builder.item()
    }

    /// Declares a positional sibling schema seeded from a type, types, or a
    /// pattern.
    pub fn item_with(&mut self, seed: impl Into<TypeSpec>) -> Result<Property<'_>> {
        self.builder.item_with(seed)
    }
}

impl SchemaBuilder for Property<'_> {
    fn node(&self) -> &Schema {
        &self.builder.schemas[self.index]
    }

    fn node_mut(&mut self) -> &mut Schema {
        &mut self.builder.schemas[self.index]
    }
}
