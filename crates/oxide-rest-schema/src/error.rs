//! Error types for schema building.

use thiserror::Error;

/// Configuration errors raised while declaring a schema.
///
/// All of these are programmer mistakes in a route declaration and are
/// reported at the call that caused them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A type token outside the supported primitive set.
    #[error("property type \"{token}\" is not supported, supported types are: {supported}")]
    UnsupportedType {
        token: String,
        supported: &'static str,
    },

    /// A type-gated keyword was used before any type was set.
    #[error("{method}() can not be used before the argument type is set")]
    TypeNotSet { method: &'static str },

    /// A type-gated keyword was used with a type it does not apply to.
    #[error("{method}() can only be used with arguments of type {expected}, found {found}")]
    IncompatibleType {
        method: &'static str,
        expected: &'static str,
        found: String,
    },

    /// `where_()` was called on a schema that has no parent builder.
    #[error("parent context was not set")]
    NoParentContext,

    /// A literal entry that is not a schema mapping.
    #[error("provided properties item is not compilable: {0}")]
    NotCompilable(String),

    /// An `additionalProperties` callback must declare exactly one unnamed schema.
    #[error("additionalProperties() expects exactly one unnamed schema, found {0}")]
    AdditionalPropertiesArity(usize),
}

/// Result type alias for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
