//! Primitive JSON types and the values that seed a schema.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::SchemaError;

/// Supported type tokens, in the order they are reported in errors.
pub const SUPPORTED_TYPES: &str = "string, integer, number, boolean, array, object, null";

/// A JSON primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    /// `string`
    String,
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `array`
    Array,
    /// `object`
    Object,
    /// `null`
    Null,
}

impl Primitive {
    /// Returns the type token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
        }
    }
}

impl FromStr for Primitive {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "integer" => Ok(Self::Integer),
            "number" => Ok(Self::Number),
            "boolean" => Ok(Self::Boolean),
            "array" => Ok(Self::Array),
            "object" => Ok(Self::Object),
            "null" => Ok(Self::Null),
            other => Err(SchemaError::UnsupportedType {
                token: other.to_string(),
                supported: SUPPORTED_TYPES,
            }),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric types accepted by `multipleOf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numeric {
    /// Whole numbers.
    Integer,
    /// Any number.
    Number,
}

impl From<Numeric> for Primitive {
    fn from(numeric: Numeric) -> Self {
        match numeric {
            Numeric::Integer => Self::Integer,
            Numeric::Number => Self::Number,
        }
    }
}

/// One type token or a list of type tokens.
///
/// A single token seeding a schema may also be a regular expression; a list
/// is always read as types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    /// A single token.
    One(String),
    /// A list of type tokens.
    Many(Vec<String>),
}

impl TypeSpec {
    /// Parses every token as a primitive type.
    pub fn primitives(&self) -> Result<Vec<Primitive>, SchemaError> {
        match self {
            Self::One(token) => Ok(vec![token.parse()?]),
            Self::Many(tokens) => tokens.iter().map(|t| t.parse()).collect(),
        }
    }

    /// Returns whether the seed carries no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(token) => token.is_empty(),
            Self::Many(tokens) => tokens.is_empty(),
        }
    }
}

impl From<&str> for TypeSpec {
    fn from(token: &str) -> Self {
        Self::One(token.to_string())
    }
}

impl From<String> for TypeSpec {
    fn from(token: String) -> Self {
        Self::One(token)
    }
}

impl From<Primitive> for TypeSpec {
    fn from(primitive: Primitive) -> Self {
        Self::One(primitive.as_str().to_string())
    }
}

impl From<&[&str]> for TypeSpec {
    fn from(tokens: &[&str]) -> Self {
        Self::Many(tokens.iter().map(|t| (*t).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for TypeSpec {
    fn from(tokens: [&str; N]) -> Self {
        Self::Many(tokens.iter().map(|t| (*t).to_string()).collect())
    }
}

impl From<Vec<&str>> for TypeSpec {
    fn from(tokens: Vec<&str>) -> Self {
        Self::from(tokens.as_slice())
    }
}

impl From<Vec<String>> for TypeSpec {
    fn from(tokens: Vec<String>) -> Self {
        Self::Many(tokens)
    }
}

impl<const N: usize> From<[Primitive; N]> for TypeSpec {
    fn from(primitives: [Primitive; N]) -> Self {
        Self::Many(primitives.iter().map(|p| p.as_str().to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_primitives() {
        assert_eq!("integer".parse::<Primitive>(), Ok(Primitive::Integer));
        assert_eq!("null".parse::<Primitive>(), Ok(Primitive::Null));
        assert!(matches!(
            "int".parse::<Primitive>(),
            Err(SchemaError::UnsupportedType { ref token, .. }) if token == "int"
        ));
    }

    #[test]
    fn test_type_lists_are_strict() {
        let seed = TypeSpec::from(["string", "bogus"]);
        assert!(seed.primitives().is_err());

        let seed = TypeSpec::from(vec!["string", "null"]);
        assert_eq!(
            seed.primitives().unwrap(),
            vec![Primitive::String, Primitive::Null]
        );
    }

    #[test]
    fn test_serialize_lowercase() {
        let value = serde_json::to_value(Primitive::Boolean).unwrap();
        assert_eq!(value, serde_json::json!("boolean"));
    }
}
