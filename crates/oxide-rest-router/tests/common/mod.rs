#![allow(dead_code)]

use std::sync::Arc;

use oxide_rest_router::{
    from_fn, reject, CompiledPattern, Container, ContainerError, Controller, MiddlewareRef,
    Params, PathMatcher, Registrar, Reply, Request, Response, RestError, RouteRecord,
    ServiceContainer,
};
use regex::Regex;
use serde_json::{json, Value};

/// A route as the in-memory server stored it.
pub struct Registered {
    pub namespace: String,
    pub pattern: String,
    pub matcher: PathMatcher,
    pub record: RouteRecord,
}

/// Result of dispatching a request.
pub struct Dispatched {
    pub response: Response,
    pub matched_route: Option<String>,
}

/// An in-memory route registry dispatching requests the way a REST server
/// does: match, validate and sanitize arguments, check permission, call.
#[derive(Default)]
pub struct RestServer {
    routes: Vec<Registered>,
}

impl Registrar for RestServer {
    fn register_route(&mut self, namespace: &str, pattern: &CompiledPattern, record: RouteRecord) {
        let matcher = pattern
            .matcher(namespace)
            .unwrap_or_else(|e| panic!("Failed to build matcher for {pattern}: {e}"));
        self.routes.push(Registered {
            namespace: namespace.to_string(),
            pattern: pattern.as_str().to_string(),
            matcher,
            record,
        });
    }
}

impl RestServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> &[Registered] {
        &self.routes
    }

    pub fn matched_routes(&self) -> Vec<&str> {
        self.routes.iter().map(|r| r.matcher.route()).collect()
    }

    pub fn dispatch(&self, request: Request) -> Dispatched {
        for route in &self.routes {
            let Some(captured) = route.matcher.match_path(&request.path) else {
                continue;
            };
            if !route.record.accepts(request.method) {
                continue;
            }

            let request = request.clone().with_url_params(captured);
            let response = match respond(&route.record, request) {
                Ok(response) => response,
                Err(error) => Response::from(error),
            };
            return Dispatched {
                response,
                matched_route: Some(route.matcher.route().to_string()),
            };
        }

        Dispatched {
            response: Response::from(RestError::new(
                "rest_no_route",
                "No route was found matching the URL and request method.",
                404,
            )),
            matched_route: None,
        }
    }
}

fn respond(record: &RouteRecord, mut request: Request) -> Result<Response, RestError> {
    let params = request.params();
    for (key, arg) in &record.args {
        match params.get(key) {
            Some(value) => {
                check_schema(key, &arg.schema, value)?;
                arg.validate(value, &request, key)?;
                let value = coerce(&arg.schema, arg.sanitize(value, &request, key)?);
                request.url_params.insert(key.clone(), value);
            }
            None if arg.schema.get("required") == Some(&Value::Bool(true)) => {
                return Err(RestError::new(
                    "rest_missing_callback_param",
                    format!("Missing parameter(s): {key}"),
                    400,
                ));
            }
            None => {}
        }
    }

    record.permission_callback.check(&request)?;
    (record.callback)(&request)
}

fn check_schema(key: &str, schema: &serde_json::Map<String, Value>, value: &Value) -> Result<(), RestError> {
    let invalid = || RestError::new("rest_invalid_param", format!("Invalid parameter(s): {key}"), 400);

    if let (Some(pattern), Some(text)) = (schema.get("pattern").and_then(Value::as_str), value.as_str()) {
        let regex = Regex::new(pattern).map_err(|_| invalid())?;
        if !regex.is_match(text) {
            return Err(invalid());
        }
    }

    if schema.get("type") == Some(&json!("integer")) && as_integer(value).is_none() {
        return Err(invalid());
    }

    Ok(())
}

fn coerce(schema: &serde_json::Map<String, Value>, value: Value) -> Value {
    if schema.get("type") == Some(&json!("integer")) {
        if let Some(number) = as_integer(&value) {
            return json!(number);
        }
    }
    value
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Rejects requests without an `Authorization` header.
pub fn require_user() -> MiddlewareRef {
    from_fn(|request, next| {
        if request.get_header("Authorization").is_none() {
            return Err(reject());
        }
        next.run(request)
    })
}

/// Marks a request as coming from a logged in user.
pub fn logged_in(request: Request) -> Request {
    request.header("Authorization", "Bearer user-1")
}

/// A controller exposing `run`, `show` and `update`.
pub struct AuthorController;

impl Controller for AuthorController {
    fn dispatch(&self, method: &str, params: &Params) -> Result<Reply, ContainerError> {
        match method {
            "run" => Ok(json!({"authors": []}).into()),
            "show" => Ok(json!({"author": params.get("id")}).into()),
            "update" => Ok(self
                .send_error("rest_forbidden", "Authors are read-only", 403, Default::default())
                .into()),
            _ => Err(ContainerError::undefined_method("AuthorController", method)),
        }
    }
}

/// A container with `AuthorController` bound.
pub fn container() -> Arc<dyn Container> {
    let mut container = ServiceContainer::new();
    container.bind("AuthorController", || AuthorController);
    Arc::new(container)
}
