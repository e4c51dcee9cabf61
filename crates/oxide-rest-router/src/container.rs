//! Controller resolution.
//!
//! Routes never construct controllers themselves. A [`Container`] registers
//! the in-flight request, builds controllers by class name and invokes
//! callables. [`ServiceContainer`] is the built-in implementation used when a
//! router is created without a host container.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::handler::HandlerFn;
use crate::request::{Params, Request};
use crate::response::{reject_with, Reply, Response, RestError};

/// Errors raised while resolving or invoking a handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    /// No controller factory is bound to this class name.
    #[error("no controller bound for class \"{0}\"")]
    Unbound(String),

    /// The controller does not define this method.
    #[error("controller \"{class}\" has no method \"{method}\"")]
    UndefinedMethod { class: String, method: String },
}

impl ContainerError {
    /// Creates an [`ContainerError::UndefinedMethod`] error.
    pub fn undefined_method(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self::UndefinedMethod {
            class: class.into(),
            method: method.into(),
        }
    }
}

impl From<ContainerError> for RestError {
    fn from(error: ContainerError) -> Self {
        Self::new("rest_handler_unresolved", error.to_string(), 500)
    }
}

/// A controller exposing named methods.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
///
/// use oxide_rest_router::{ContainerError, Controller, Params, Reply};
/// use serde_json::{json, Map};
///
/// struct AuthorController;
///
/// impl Controller for AuthorController {
///     fn dispatch(&self, method: &str, params: &Params) -> Result<Reply, ContainerError> {
///         match method {
///             "run" => Ok(self.send_response(json!([]), 200, HashMap::new()).into()),
///             "show" if params.contains_key("id") => Ok(json!({"id": params["id"]}).into()),
///             "show" => Ok(self.send_error("missing_id", "Missing id", 400, Map::new()).into()),
///             _ => Err(ContainerError::undefined_method("AuthorController", method)),
///         }
///     }
/// }
/// ```
pub trait Controller: Send + Sync {
    /// Invokes `method` with the request parameters.
    fn dispatch(&self, method: &str, params: &Params) -> Result<Reply, ContainerError>;

    /// Builds a response.
    fn send_response(
        &self,
        data: impl Into<Value>,
        status: u16,
        headers: HashMap<String, String>,
    ) -> Response
    where
        Self: Sized,
    {
        Response::new(data).status(status).headers(headers)
    }

    /// Builds an error value. `status` is stored under `data.status`.
    fn send_error(
        &self,
        code: impl Into<String>,
        message: impl Into<String>,
        status: u16,
        data: Map<String, Value>,
    ) -> RestError
    where
        Self: Sized,
    {
        reject_with(code, message, status, data)
    }
}

/// Something a container can invoke.
pub enum Callable<'a> {
    /// A handler function.
    Function(&'a HandlerFn),
    /// A method on a resolved controller.
    Method {
        /// The controller instance.
        controller: Arc<dyn Controller>,
        /// The method to invoke.
        method: &'a str,
    },
}

/// Resolves controllers and invokes handlers for routes.
pub trait Container: Send + Sync {
    /// Registers the request being handled.
    fn instance(&self, request: &Request);

    /// Builds the controller bound to `class`.
    fn make(&self, class: &str) -> Result<Arc<dyn Controller>, ContainerError>;

    /// Invokes a callable with the request parameters.
    fn call(&self, callable: Callable<'_>, params: &Params) -> Result<Reply, ContainerError> {
        match callable {
            Callable::Function(function) => Ok(function(params)),
            Callable::Method { controller, method } => controller.dispatch(method, params),
        }
    }
}

/// Builds a controller instance.
pub type ControllerFactory = Arc<dyn Fn() -> Arc<dyn Controller> + Send + Sync>;

/// A container binding controller factories by class name.
#[derive(Default)]
pub struct ServiceContainer {
    bindings: HashMap<String, ControllerFactory>,
    request: Mutex<Option<Request>>,
}

impl ServiceContainer {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a controller factory to a class name.
    pub fn bind<F, C>(&mut self, class: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: Controller + 'static,
    {
        let factory: ControllerFactory = Arc::new(move || Arc::new(factory()) as Arc<dyn Controller>);
        self.bindings.insert(class.into(), factory);
        self
    }

    /// Returns whether a factory is bound to `class`.
    #[must_use]
    pub fn is_bound(&self, class: &str) -> bool {
        self.bindings.contains_key(class)
    }

    /// Returns the last registered request.
    #[must_use]
    pub fn current_request(&self) -> Option<Request> {
        self.request_slot().clone()
    }

    fn request_slot(&self) -> MutexGuard<'_, Option<Request>> {
        self.request.lock().unwrap_or_else(|poisoned| {
            warn!("request slot was poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }
}

impl Container for ServiceContainer {
    fn instance(&self, request: &Request) {
        *self.request_slot() = Some(request.clone());
    }

    fn make(&self, class: &str) -> Result<Arc<dyn Controller>, ContainerError> {
        self.bindings
            .get(class)
            .map(|factory| factory())
            .ok_or_else(|| ContainerError::Unbound(class.to_string()))
    }
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut classes: Vec<&String> = self.bindings.keys().collect();
        classes.sort();
        f.debug_struct("ServiceContainer")
            .field("bindings", &classes)
            .finish_non_exhaustive()
    }
}
