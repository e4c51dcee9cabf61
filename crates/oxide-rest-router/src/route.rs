//! Route declarations and the records they register.
//!
//! A [`Route`] is a pure builder until [`Route::register`] compiles it into a
//! [`RouteRecord`] and hands that to a [`Registrar`].

use std::fmt;
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use md5::{Digest, Md5};
use oxide_rest_schema::{Schema, SchemaBuilder, SchemaNode, TypeSpec, DRAFT_04};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::container::Container;
use crate::error::Result;
use crate::handler::Handler;
use crate::middleware::{IntoMiddleware, MiddlewareRef, Pipeline, Verdict};
use crate::pattern::CompiledPattern;
use crate::request::{join_methods, Method, Request};
use crate::response::{ensure_response, Outcome, RestError};

/// Length of derived route names, in hex characters.
const DERIVED_NAME_LEN: usize = 6;

/// Validates an argument value: `(value, request, key)`.
pub type ValidateFn = Arc<dyn Fn(&Value, &Request, &str) -> Verdict + Send + Sync>;

/// Sanitizes an argument value: `(value, request, key)`.
pub type SanitizeFn =
    Arc<dyn Fn(&Value, &Request, &str) -> std::result::Result<Value, RestError> + Send + Sync>;

/// Handles a permitted request.
pub type Callback = Arc<dyn Fn(&Request) -> Outcome + Send + Sync>;

/// Decides whether a request may reach the handler.
pub type PermissionFn = Arc<dyn Fn(&Request) -> Verdict + Send + Sync>;

#[derive(Clone, Default)]
struct DeclaredArgument {
    schema: Schema,
    validate: Option<ValidateFn>,
    sanitize: Option<SanitizeFn>,
}

/// A REST route declaration.
///
/// # Example
///
/// ```
/// use oxide_rest_router::{Handler, Method, Route, SchemaBuilder};
/// use serde_json::json;
///
/// let mut route = Route::new(&[Method::Get], "/author/{id:d}", Handler::function(|_| json!([])));
/// route
///     .where_("id")
///     .is_integer()
///     .where_("secret")
///     .matches_regex("^[0-9]+$")
///     .required();
///
/// assert_eq!(route.pattern().as_str(), r"/author/(?P<id>\d+)");
/// assert_eq!(
///     serde_json::Value::Object(route.compiled_args()),
///     json!({
///         "id": {"type": "integer"},
///         "secret": {"type": "string", "pattern": "^[0-9]+$", "required": true},
///     })
/// );
/// ```
pub struct Route {
    methods: Vec<Method>,
    pattern: CompiledPattern,
    handler: Handler,
    middleware: Vec<MiddlewareRef>,
    args: IndexMap<String, DeclaredArgument>,
    schema: Option<Schema>,
    name: Option<String>,
    derived_name: OnceLock<String>,
}

impl Route {
    /// Creates a route. The template is compiled immediately.
    pub fn new(methods: &[Method], template: &str, handler: impl Into<Handler>) -> Self {
        let mut unique = Vec::with_capacity(methods.len());
        for method in methods {
            if !unique.contains(method) {
                unique.push(*method);
            }
        }

        Self {
            methods: unique,
            pattern: CompiledPattern::new(template),
            handler: handler.into(),
            middleware: Vec::new(),
            args: IndexMap::new(),
            schema: None,
            name: None,
            derived_name: OnceLock::new(),
        }
    }

    /// Sets an explicit name.
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the explicit name, or one derived from the compiled pattern.
    ///
    /// The derived name is the first six hex characters of the pattern's MD5
    /// digest, so the same pattern always yields the same name.
    pub fn route_name(&self) -> &str {
        match &self.name {
            Some(name) => name,
            None => self
                .derived_name
                .get_or_init(|| derive_name(self.pattern.as_str())),
        }
    }

    /// Returns the accepted methods.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Returns the accepted methods joined as `"GET, POST"`.
    #[must_use]
    pub fn methods_string(&self) -> String {
        join_methods(&self.methods)
    }

    /// Returns the compiled pattern.
    #[must_use]
    pub const fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    /// Returns the handler reference.
    #[must_use]
    pub const fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Returns the number of middleware attached.
    #[must_use]
    pub fn middleware_count(&self) -> usize {
        self.middleware.len()
    }

    /// Declares an argument and returns a builder for its schema.
    ///
    /// Declaring the same argument again starts over with an empty schema.
    pub fn where_(&mut self, name: &str) -> Argument<'_> {
        let index = self.declare(name, Schema::new());
        Argument { route: self, index }
    }

    /// Declares an argument seeded from a type, a list of types, or a pattern.
    pub fn where_with(&mut self, name: &str, seed: impl Into<TypeSpec>) -> Result<Argument<'_>> {
        let schema = Schema::seeded(seed)?;
        let index = self.declare(name, schema);
        Ok(Argument { route: self, index })
    }

    /// Returns the schema of a declared argument.
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&Schema> {
        self.args.get(name).map(|declared| &declared.schema)
    }

    /// Attaches a whole-request schema tagged with a dialect URI.
    ///
    /// `None` or an empty version selects draft-04.
    pub fn schema(&mut self, version: Option<&str>) -> &mut Schema {
        let mut schema = Schema::new();
        schema.schema_uri(version.filter(|v| !v.is_empty()).unwrap_or(DRAFT_04));
        self.schema.insert(schema)
    }

    /// Appends middleware; lists are flattened.
    pub fn middleware(&mut self, middleware: impl IntoMiddleware) -> &mut Self {
        self.middleware.extend(middleware.into_middleware());
        self
    }

    /// Compiles every argument schema, in declaration order.
    #[must_use]
    pub fn compiled_args(&self) -> Map<String, Value> {
        self.args
            .iter()
            .map(|(name, declared)| (name.clone(), Value::Object(declared.schema.compile())))
            .collect()
    }

    /// Compiles the whole-request schema, if any.
    #[must_use]
    pub fn compiled_schema(&self) -> Option<SchemaNode> {
        self.schema.as_ref().map(Schema::compile)
    }

    /// Builds the registration record.
    ///
    /// The callback registers the request with `container`, resolves the
    /// handler through it and normalizes the reply. Without middleware the
    /// permission check always passes; otherwise the request goes through the
    /// middleware chain.
    #[must_use]
    pub fn record(&self, container: &Arc<dyn Container>) -> RouteRecord {
        let handler = self.handler.clone();
        let callback_container = Arc::clone(container);
        let callback: Callback = Arc::new(move |request: &Request| {
            callback_container.instance(request);
            match handler.invoke(&*callback_container, &request.params()) {
                Ok(reply) => ensure_response(reply),
                Err(error) => {
                    warn!(%error, path = %request.path, "failed to resolve route handler");
                    Err(error.into())
                }
            }
        });

        let permission_callback = if self.middleware.is_empty() {
            Permission::Public
        } else {
            let middleware = self.middleware.clone();
            let container = Arc::clone(container);
            let guard: PermissionFn = Arc::new(move |request: &Request| {
                container.instance(request);
                Pipeline::send(request).through(&middleware).then(|_| Ok(()))
            });
            Permission::Guarded(guard)
        };

        let args = self
            .args
            .iter()
            .map(|(name, declared)| {
                let record = ArgumentRecord {
                    schema: declared.schema.compile(),
                    validate_callback: declared.validate.clone(),
                    sanitize_callback: declared.sanitize.clone(),
                };
                (name.clone(), record)
            })
            .collect();

        RouteRecord {
            methods: self.methods_string(),
            callback,
            permission_callback,
            args,
            schema: self.compiled_schema(),
        }
    }

    /// Compiles the route and hands it to `registrar` under `namespace`.
    ///
    /// Registering twice registers twice.
    pub fn register(
        &self,
        namespace: &str,
        container: &Arc<dyn Container>,
        registrar: &mut dyn Registrar,
    ) {
        debug!(
            namespace,
            pattern = %self.pattern,
            methods = %self.methods_string(),
            name = self.route_name(),
            "registering route"
        );
        registrar.register_route(namespace, &self.pattern, self.record(container));
    }

    /// Returns a serializable summary of the route.
    #[must_use]
    pub fn describe(&self) -> Value {
        json!({
            "name": self.route_name(),
            "methods": self.methods,
            "template": self.pattern.template(),
            "pattern": self.pattern.as_str(),
            "args": self.compiled_args(),
            "schema": self.compiled_schema(),
        })
    }

    fn declare(&mut self, name: &str, schema: Schema) -> usize {
        let declared = DeclaredArgument {
            schema,
            ..DeclaredArgument::default()
        };
        self.args.insert_full(name.to_string(), declared).0
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("methods", &self.methods)
            .field("pattern", &self.pattern.as_str())
            .field("handler", &self.handler)
            .field("middleware", &self.middleware.len())
            .field("args", &self.args.keys().collect::<Vec<_>>())
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn derive_name(pattern: &str) -> String {
    let mut name = hex::encode(Md5::digest(pattern.as_bytes()));
    name.truncate(DERIVED_NAME_LEN);
    name
}

/// Builder for one route argument.
///
/// Schema keywords come from [`SchemaBuilder`]; `where_` declares the next
/// argument on the same route.
pub struct Argument<'a> {
    route: &'a mut Route,
    index: usize,
}

impl Argument<'_> {
    /// Returns the argument name.
    #[must_use]
    pub fn key(&self) -> &str {
        self.route
            .args
            .get_index(self.index)
            .map_or("", |(name, _)| name.as_str())
    }

    /// Declares another argument on the same route.
    pub fn where_(&mut self, name: &str) -> Argument<'_> {
        self.route.where_(name)
    }

    /// Declares another argument seeded from a type, types, or a pattern.
    pub fn where_with(&mut self, name: &str, seed: impl Into<TypeSpec>) -> Result<Argument<'_>> {
        self.route.where_with(name, seed)
    }

    /// Sets a callback that accepts or rejects the value.
    pub fn validate<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&Value, &Request, &str) -> Verdict + Send + Sync + 'static,
    {
        self.route.args[self.index].validate = Some(Arc::new(callback));
        self
    }

    /// Sets a callback that returns the sanitized value.
    pub fn sanitize<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&Value, &Request, &str) -> std::result::Result<Value, RestError> + Send + Sync + 'static,
    {
        self.route.args[self.index].sanitize = Some(Arc::new(callback));
        self
    }
}

impl SchemaBuilder for Argument<'_> {
    fn node(&self) -> &Schema {
        &self.route.args[self.index].schema
    }

    fn node_mut(&mut self) -> &mut Schema {
        &mut self.route.args[self.index].schema
    }
}

impl fmt::Debug for Argument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("key", &self.key())
            .field("schema", self.node())
            .finish()
    }
}

/// Permission check attached to a registered route.
#[derive(Clone)]
pub enum Permission {
    /// Every request is permitted.
    Public,
    /// Requests go through the route's middleware chain.
    Guarded(PermissionFn),
}

impl Permission {
    /// Checks a request.
    pub fn check(&self, request: &Request) -> Verdict {
        match self {
            Self::Public => Ok(()),
            Self::Guarded(guard) => guard(request),
        }
    }

    /// Returns whether every request is permitted.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }
}

impl fmt::Debug for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("Public"),
            Self::Guarded(_) => f.write_str("Guarded(..)"),
        }
    }
}

/// A compiled argument.
#[derive(Clone)]
pub struct ArgumentRecord {
    /// The compiled schema.
    pub schema: SchemaNode,
    /// Optional value validation.
    pub validate_callback: Option<ValidateFn>,
    /// Optional value sanitization.
    pub sanitize_callback: Option<SanitizeFn>,
}

impl ArgumentRecord {
    /// Runs the validate callback, passing when there is none.
    pub fn validate(&self, value: &Value, request: &Request, key: &str) -> Verdict {
        self.validate_callback
            .as_ref()
            .map_or(Ok(()), |validate| validate(value, request, key))
    }

    /// Runs the sanitize callback, returning the value unchanged when there
    /// is none.
    pub fn sanitize(
        &self,
        value: &Value,
        request: &Request,
        key: &str,
    ) -> std::result::Result<Value, RestError> {
        self.sanitize_callback
            .as_ref()
            .map_or_else(|| Ok(value.clone()), |sanitize| sanitize(value, request, key))
    }
}

impl fmt::Debug for ArgumentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentRecord")
            .field("schema", &self.schema)
            .field("validate_callback", &self.validate_callback.is_some())
            .field("sanitize_callback", &self.sanitize_callback.is_some())
            .finish()
    }
}

/// What a route hands to the registrar.
#[derive(Clone)]
pub struct RouteRecord {
    /// Accepted methods, e.g. `"GET, POST"`.
    pub methods: String,
    /// Handles permitted requests.
    pub callback: Callback,
    /// Decides whether requests are permitted.
    pub permission_callback: Permission,
    /// Compiled arguments in declaration order.
    pub args: IndexMap<String, ArgumentRecord>,
    /// Compiled whole-request schema.
    pub schema: Option<SchemaNode>,
}

impl RouteRecord {
    /// Returns whether the record accepts `method`.
    #[must_use]
    pub fn accepts(&self, method: Method) -> bool {
        Method::parse_list(&self.methods).contains(&method)
    }

    /// Returns the compiled argument schemas keyed by name.
    #[must_use]
    pub fn compiled_args(&self) -> Map<String, Value> {
        self.args
            .iter()
            .map(|(name, arg)| (name.clone(), Value::Object(arg.schema.clone())))
            .collect()
    }
}

impl fmt::Debug for RouteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRecord")
            .field("methods", &self.methods)
            .field("permission_callback", &self.permission_callback)
            .field("args", &self.args)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// The external route registry receiving compiled routes.
pub trait Registrar {
    /// Registers one route.
    fn register_route(&mut self, namespace: &str, pattern: &CompiledPattern, record: RouteRecord);
}
