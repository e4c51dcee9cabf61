//! Error types for routing.

use oxide_rest_schema::SchemaError;
use thiserror::Error;

/// Router-specific errors.
#[derive(Debug, Error)]
pub enum RouterError {
    /// No route with this name exists in the namespace.
    #[error("route \"{name}\" not found in namespace \"{namespace}\"")]
    RouteNotFound { name: String, namespace: String },

    /// A compiled pattern is not a valid regular expression.
    #[error("invalid path pattern {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An argument schema declaration was invalid.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
