//! Route handler references.

use std::fmt;
use std::sync::Arc;

use crate::container::{Callable, Container, ContainerError};
use crate::request::Params;
use crate::response::Reply;

/// Method invoked on controllers referenced by class only.
pub const DEFAULT_METHOD: &str = "run";

/// A handler function receiving the merged request parameters.
pub type HandlerFn = Arc<dyn Fn(&Params) -> Reply + Send + Sync>;

/// What a route calls once a request is permitted.
#[derive(Clone)]
pub enum Handler {
    /// A function called directly with the request parameters.
    Function(HandlerFn),
    /// A method on a controller resolved through the container.
    ClassMethod {
        /// Controller class name.
        class: String,
        /// Method name.
        method: String,
    },
    /// A controller resolved through the container; [`DEFAULT_METHOD`] is
    /// invoked.
    Class(String),
}

impl Handler {
    /// Wraps a function handler.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_rest_router::Handler;
    /// use serde_json::json;
    ///
    /// let handler = Handler::function(|params| json!({"id": params.get("id")}));
    /// assert!(handler.target().is_none());
    /// ```
    pub fn function<F, R>(function: F) -> Self
    where
        F: Fn(&Params) -> R + Send + Sync + 'static,
        R: Into<Reply>,
    {
        Self::Function(Arc::new(move |params: &Params| function(params).into()))
    }

    /// References a method on a controller class.
    pub fn class_method(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self::ClassMethod {
            class: class.into(),
            method: method.into(),
        }
    }

    /// References a controller class.
    pub fn class(class: impl Into<String>) -> Self {
        Self::Class(class.into())
    }

    /// Returns the controller class and method, or `None` for functions.
    #[must_use]
    pub fn target(&self) -> Option<(&str, &str)> {
        match self {
            Self::Function(_) => None,
            Self::ClassMethod { class, method } => Some((class, method)),
            Self::Class(class) => Some((class, DEFAULT_METHOD)),
        }
    }

    /// Resolves the handler through `container` and invokes it.
    pub fn invoke(&self, container: &dyn Container, params: &Params) -> Result<Reply, ContainerError> {
        match self {
            Self::Function(function) => container.call(Callable::Function(function), params),
            Self::ClassMethod { class, method } => invoke_method(container, class, method, params),
            Self::Class(class) => invoke_method(container, class, DEFAULT_METHOD, params),
        }
    }
}

fn invoke_method(
    container: &dyn Container,
    class: &str,
    method: &str,
    params: &Params,
) -> Result<Reply, ContainerError> {
    let controller = container.make(class)?;
    container.call(Callable::Method { controller, method }, params)
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("Function(..)"),
            Self::ClassMethod { class, method } => write!(f, "ClassMethod({class}::{method})"),
            Self::Class(class) => write!(f, "Class({class})"),
        }
    }
}

impl From<&str> for Handler {
    /// Parses `"Class::method"` or a bare `"Class"`.
    fn from(reference: &str) -> Self {
        match reference.split_once("::") {
            Some((class, method)) => Self::class_method(class, method),
            None => Self::class(reference),
        }
    }
}

impl From<String> for Handler {
    fn from(reference: String) -> Self {
        Self::from(reference.as_str())
    }
}

impl From<(&str, &str)> for Handler {
    fn from((class, method): (&str, &str)) -> Self {
        Self::class_method(class, method)
    }
}

impl From<HandlerFn> for Handler {
    fn from(function: HandlerFn) -> Self {
        Self::Function(function)
    }
}
