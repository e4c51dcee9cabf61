//! Router and route groups.

use std::fmt;
use std::mem;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use crate::collection::RoutesCollection;
use crate::container::{Container, ServiceContainer};
use crate::error::Result;
use crate::handler::Handler;
use crate::middleware::{IntoMiddleware, MiddlewareRef};
use crate::request::Method;
use crate::route::{Registrar, Route};

/// Every method a route can answer.
pub const ALL_METHODS: &[Method] = &[
    Method::Get,
    Method::Post,
    Method::Put,
    Method::Patch,
    Method::Delete,
];

/// Methods that edit a resource.
pub const EDITABLE_METHODS: &[Method] = &[Method::Post, Method::Put, Method::Patch];

/// Methods that create a resource.
pub const CREATABLE_METHODS: &[Method] = &[Method::Post];

/// Methods that delete a resource.
pub const DELETABLE_METHODS: &[Method] = &[Method::Delete];

/// Methods that read a resource.
pub const READABLE_METHODS: &[Method] = &[Method::Get];

/// Runs right before routes are registered, with the namespace and router.
pub type AlterRoutesHook = Box<dyn FnMut(&str, &mut Router)>;

/// Route declaration verbs shared by [`Router`] and [`Group`].
pub trait Routable {
    /// Returns the collection routes are added to.
    fn collection(&mut self) -> &mut RoutesCollection;

    /// Returns the template prefix applied to new routes.
    fn prefix(&self) -> &str;

    /// Returns the middleware attached to new routes.
    fn shared_middleware(&self) -> &[MiddlewareRef];

    /// Adds a route with the prefix and shared middleware applied.
    ///
    /// A pattern of `/` maps to the bare prefix.
    fn add_route(
        &mut self,
        methods: &[Method],
        pattern: &str,
        handler: impl Into<Handler>,
    ) -> &mut Route {
        let pattern = if pattern == "/" { "" } else { pattern };
        let template = format!("{}{pattern}", self.prefix());
        let middleware = self.shared_middleware().to_vec();

        let route = self.collection().add_route(methods, &template, handler);
        route.middleware(middleware);
        route
    }

    /// Adds a route answering the given methods.
    fn match_methods(
        &mut self,
        methods: &[Method],
        pattern: &str,
        handler: impl Into<Handler>,
    ) -> &mut Route {
        self.add_route(methods, pattern, handler)
    }

    /// Adds a route answering every method in [`ALL_METHODS`].
    fn any(&mut self, pattern: &str, handler: impl Into<Handler>) -> &mut Route {
        self.add_route(ALL_METHODS, pattern, handler)
    }

    /// Adds a GET route.
    fn get(&mut self, pattern: &str, handler: impl Into<Handler>) -> &mut Route {
        self.add_route(&[Method::Get], pattern, handler)
    }

    /// Adds a POST route.
    fn post(&mut self, pattern: &str, handler: impl Into<Handler>) -> &mut Route {
        self.add_route(&[Method::Post], pattern, handler)
    }

    /// Adds a PUT route.
    fn put(&mut self, pattern: &str, handler: impl Into<Handler>) -> &mut Route {
        self.add_route(&[Method::Put], pattern, handler)
    }

    /// Adds a PATCH route.
    fn patch(&mut self, pattern: &str, handler: impl Into<Handler>) -> &mut Route {
        self.add_route(&[Method::Patch], pattern, handler)
    }

    /// Adds a DELETE route.
    fn delete(&mut self, pattern: &str, handler: impl Into<Handler>) -> &mut Route {
        self.add_route(&[Method::Delete], pattern, handler)
    }

    /// Returns whether a route with this name exists.
    fn has_route(&mut self, name: &str) -> bool {
        self.collection().has(name)
    }

    /// Returns the route with this name.
    fn get_route(&mut self, name: &str) -> Result<&mut Route> {
        self.collection().get(name)
    }
}

/// Routes sharing a template prefix and middleware.
pub struct Group<'r> {
    prefix: String,
    middleware: Vec<MiddlewareRef>,
    routes: &'r mut RoutesCollection,
}

impl Group<'_> {
    /// Adds middleware to routes declared afterwards in this group.
    pub fn middleware(&mut self, middleware: impl IntoMiddleware) -> &mut Self {
        self.middleware.extend(middleware.into_middleware());
        self
    }
}

impl Routable for Group<'_> {
    fn collection(&mut self) -> &mut RoutesCollection {
        &mut *self.routes
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn shared_middleware(&self) -> &[MiddlewareRef] {
        &self.middleware
    }
}

impl fmt::Debug for Group<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("prefix", &self.prefix)
            .field("middleware", &self.middleware.len())
            .finish_non_exhaustive()
    }
}

/// Declares the routes of one REST namespace.
///
/// # Example
///
/// ```
/// use oxide_rest_router::{Handler, Routable, Router};
/// use serde_json::json;
///
/// let mut router = Router::new("devly/v1");
/// router.get("/author/{username:@[\\w]+}", Handler::function(|_| json!([])));
/// router.group("/author", |group| {
///     group.post("/", Handler::function(|_| json!([])));
///     group.put("/{id:d}", Handler::function(|_| json!([])));
///     group.delete("/{id:d}", Handler::function(|_| json!([])));
/// });
///
/// let patterns: Vec<&str> = router.routes().iter().map(|r| r.pattern().as_str()).collect();
/// assert_eq!(
///     patterns,
///     [
///         r"/author/(?P<username>@[\w]+)",
///         "/author",
///         r"/author/(?P<id>\d+)",
///         r"/author/(?P<id>\d+)",
///     ]
/// );
/// ```
pub struct Router {
    namespace: String,
    container: Arc<dyn Container>,
    routes: RoutesCollection,
    middleware: Vec<MiddlewareRef>,
    hooks: Vec<AlterRoutesHook>,
}

impl Router {
    /// Creates a router backed by an empty [`ServiceContainer`].
    pub fn new(namespace: impl Into<String>) -> Self {
        Self::with_container(namespace, Arc::new(ServiceContainer::new()))
    }

    /// Creates a router resolving handlers through `container`.
    pub fn with_container(namespace: impl Into<String>, container: Arc<dyn Container>) -> Self {
        let namespace = namespace.into();
        Self {
            routes: RoutesCollection::new(namespace.clone()),
            namespace,
            container,
            middleware: Vec::new(),
            hooks: Vec::new(),
        }
    }

    /// Returns the namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the container handlers are resolved through.
    #[must_use]
    pub fn container(&self) -> &Arc<dyn Container> {
        &self.container
    }

    /// Returns the declared routes.
    #[must_use]
    pub const fn routes(&self) -> &RoutesCollection {
        &self.routes
    }

    /// Adds middleware to routes declared afterwards.
    pub fn middleware(&mut self, middleware: impl IntoMiddleware) -> &mut Self {
        self.middleware.extend(middleware.into_middleware());
        self
    }

    /// Declares routes sharing `prefix` and the router's current middleware.
    pub fn group<F>(&mut self, prefix: &str, routes: F) -> &mut Self
    where
        F: FnOnce(&mut Group<'_>),
    {
        let prefix = if prefix == "/" { "" } else { prefix };
        let mut group = Group {
            prefix: prefix.to_string(),
            middleware: self.middleware.clone(),
            routes: &mut self.routes,
        };
        routes(&mut group);
        self
    }

    /// Adds a hook run with the namespace and router right before
    /// registration.
    pub fn on_register<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnMut(&str, &mut Self) + 'static,
    {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Runs the alter-routes hooks, then registers every route in
    /// declaration order.
    pub fn register(&mut self, registrar: &mut dyn Registrar) {
        let mut hooks = mem::take(&mut self.hooks);
        let namespace = self.namespace.clone();
        for hook in &mut hooks {
            hook(&namespace, &mut *self);
        }
        hooks.append(&mut self.hooks);
        self.hooks = hooks;

        debug!(namespace = %self.namespace, routes = self.routes.len(), "registering routes");
        self.routes.register(&self.container, registrar);
    }

    /// Returns a serializable summary of every route.
    #[must_use]
    pub fn describe(&self) -> Value {
        json!({
            "namespace": self.namespace,
            "routes": self.routes.iter().map(Route::describe).collect::<Vec<_>>(),
        })
    }
}

impl Routable for Router {
    fn collection(&mut self) -> &mut RoutesCollection {
        &mut self.routes
    }

    fn prefix(&self) -> &str {
        ""
    }

    fn shared_middleware(&self) -> &[MiddlewareRef] {
        &self.middleware
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("namespace", &self.namespace)
            .field("routes", &self.routes)
            .field("middleware", &self.middleware.len())
            .field("hooks", &self.hooks.len())
            .finish_non_exhaustive()
    }
}
