//! # oxide-rest-router
//!
//! Fluent declarations of REST routes, compiled into records for an external
//! route registry.
//!
//! This crate provides:
//! - Path templates with `{name}` / `{name:constraint}` placeholders
//! - Per-argument JSON-Schema builders (see `oxide-rest-schema`)
//! - Permission middleware run through a [`Pipeline`]
//! - Handler resolution through a [`Container`]
//! - A [`Router`] with route groups, shared middleware and named routes
//!
//! The crate never serves requests itself. [`Router::register`] hands every
//! route to a [`Registrar`], which owns matching and dispatch.
//!
//! ## Quick Start
//!
//! ```
//! use oxide_rest_router::{
//!     from_fn, reject, CompiledPattern, Handler, Registrar, Request, Routable, RouteRecord,
//!     Router, SchemaBuilder,
//! };
//! use serde_json::json;
//!
//! #[derive(Default)]
//! struct Registry(Vec<(String, String, RouteRecord)>);
//!
//! impl Registrar for Registry {
//!     fn register_route(&mut self, namespace: &str, pattern: &CompiledPattern, record: RouteRecord) {
//!         self.0.push((namespace.to_string(), pattern.to_string(), record));
//!     }
//! }
//!
//! let mut router = Router::new("devly/v1");
//! router
//!     .get("/author/{id:d}", Handler::function(|params| json!({"user_id": params.get("id")})))
//!     .middleware(from_fn(|request, next| {
//!         if request.get_header("Authorization").is_none() {
//!             return Err(reject());
//!         }
//!         next.run(request)
//!     }))
//!     .where_("id")
//!     .is_integer()
//!     .where_("secret")
//!     .matches_regex("^[0-9]+$")
//!     .required();
//!
//! let mut registry = Registry::default();
//! router.register(&mut registry);
//!
//! let (namespace, pattern, record) = &registry.0[0];
//! assert_eq!(namespace, "devly/v1");
//! assert_eq!(pattern, r"/author/(?P<id>\d+)");
//! assert_eq!(record.methods, "GET");
//!
//! let denied = record.permission_callback.check(&Request::get("/devly/v1/author/1"));
//! assert_eq!(denied.unwrap_err().status(), 401);
//! ```
//!
//! ## Path Templates
//!
//! | Constraint | Expands to       |
//! |------------|------------------|
//! | `i`, `d`   | `\d+`            |
//! | `a`        | `[A-Za-z]+`      |
//! | `alnum`    | `[A-Za-z0-9]+`   |
//! | `w`        | `\w+`            |
//! | none       | `[-\w]+`         |
//!
//! Any other constraint is used as a raw regular expression:
//!
//! ```
//! use oxide_rest_router::compile_pattern;
//!
//! assert_eq!(
//!     compile_pattern("/author/{username:@[a-zA-Z]+}"),
//!     "/author/(?P<username>@[a-zA-Z]+)"
//! );
//! ```
//!
//! ## Named Routes
//!
//! Routes without an explicit name get the first six hex characters of the
//! MD5 digest of their compiled pattern:
//!
//! ```
//! use oxide_rest_router::{Handler, Routable, Router};
//!
//! let mut router = Router::new("devly/v1");
//! router.post("/foo", Handler::from("FooController")).name("foo");
//!
//! assert!(router.has_route("foo"));
//! assert!(!router.has_route("bar"));
//! assert!(router.get_route("bar").is_err());
//! ```

mod collection;
mod container;
mod error;
mod handler;
mod middleware;
mod pattern;
mod request;
mod response;
mod route;
mod router;

pub use collection::RoutesCollection;
pub use container::{
    Callable, Container, ContainerError, Controller, ControllerFactory, ServiceContainer,
};
pub use error::{Result, RouterError};
pub use handler::{Handler, HandlerFn, DEFAULT_METHOD};
pub use middleware::{from_fn, IntoMiddleware, Middleware, MiddlewareRef, Next, Pipeline, Verdict};
pub use pattern::{compile_pattern, resolve_constraint, CompiledPattern, PathMatcher, SHORT_CODES};
pub use request::{join_methods, Method, Params, Request};
pub use response::{ensure_response, reject, reject_with, Outcome, Reply, Response, RestError};
pub use route::{
    Argument, ArgumentRecord, Callback, Permission, PermissionFn, Registrar, Route, RouteRecord,
    SanitizeFn, ValidateFn,
};
pub use router::{
    AlterRoutesHook, Group, Routable, Router, ALL_METHODS, CREATABLE_METHODS, DELETABLE_METHODS,
    EDITABLE_METHODS, READABLE_METHODS,
};

pub use oxide_rest_schema::{self as schema, Schema, SchemaBuilder, SchemaError};
