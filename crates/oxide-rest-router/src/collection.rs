//! Ordered route storage with lazy name lookup.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::container::Container;
use crate::error::{Result, RouterError};
use crate::handler::Handler;
use crate::request::Method;
use crate::route::{Registrar, Route};

/// The routes of one namespace, in insertion order.
///
/// Names are resolved lazily. The first lookup indexes routes until it finds
/// the wanted name, so across the collection's lifetime every route is
/// indexed at most once. When two routes share a name the first one declared
/// wins.
#[derive(Debug)]
pub struct RoutesCollection {
    namespace: String,
    routes: Vec<Route>,
    named: HashMap<String, usize>,
    resolved: usize,
}

impl RoutesCollection {
    /// Creates an empty collection for `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            routes: Vec::new(),
            named: HashMap::new(),
            resolved: 0,
        }
    }

    /// Returns the namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Creates a route, appends it and returns it for further configuration.
    pub fn add_route(
        &mut self,
        methods: &[Method],
        template: &str,
        handler: impl Into<Handler>,
    ) -> &mut Route {
        let index = self.routes.len();
        self.routes.push(Route::new(methods, template, handler));
        &mut self.routes[index]
    }

    /// Returns whether a route with this name exists.
    pub fn has(&mut self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Returns the route with this name.
    pub fn get(&mut self, name: &str) -> Result<&mut Route> {
        match self.resolve(name) {
            Some(index) => Ok(&mut self.routes[index]),
            None => Err(RouterError::RouteNotFound {
                name: name.to_string(),
                namespace: self.namespace.clone(),
            }),
        }
    }

    /// Registers every route, in insertion order.
    pub fn register(&self, container: &Arc<dyn Container>, registrar: &mut dyn Registrar) {
        for route in &self.routes {
            route.register(&self.namespace, container, registrar);
        }
    }

    /// Returns an iterator over the routes.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Returns a mutable iterator over the routes.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Route> {
        self.routes.iter_mut()
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn resolve(&mut self, name: &str) -> Option<usize> {
        if let Some(index) = self.named.get(name) {
            return Some(*index);
        }

        while self.resolved < self.routes.len() {
            let index = self.resolved;
            self.resolved += 1;

            let route_name = self.routes[index].route_name().to_string();
            trace!(namespace = %self.namespace, name = %route_name, "indexed route name");
            let found = route_name == name;
            let stored = *self.named.entry(route_name).or_insert(index);

            if found {
                return Some(stored);
            }
        }

        None
    }
}
