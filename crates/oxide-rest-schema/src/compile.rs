//! Conversion of builders into plain schema data.

use serde_json::{Map, Value};

use crate::error::SchemaError;

/// A compiled schema node: keyword to value, in declaration order.
pub type SchemaNode = Map<String, Value>;

/// Anything that can be compiled into plain schema data.
///
/// Implemented by every builder type and by [`Literal`], so nested
/// collections can hold either without inspecting values at runtime.
pub trait Compile {
    /// Compiles into a JSON value.
    fn compile_value(&self) -> Value;
}

impl<T: Compile + ?Sized> Compile for &T {
    fn compile_value(&self) -> Value {
        (**self).compile_value()
    }
}

/// A literal schema mapping supplied as plain data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Literal(SchemaNode);

impl Literal {
    /// Wraps an already-built mapping.
    #[must_use]
    pub const fn new(node: SchemaNode) -> Self {
        Self(node)
    }

    /// Returns the wrapped mapping.
    #[must_use]
    pub fn into_inner(self) -> SchemaNode {
        self.0
    }
}

impl TryFrom<Value> for Literal {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(SchemaError::NotCompilable(other.to_string())),
        }
    }
}

impl Compile for Literal {
    fn compile_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}
