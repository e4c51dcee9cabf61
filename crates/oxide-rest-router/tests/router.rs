//! Tests for routers, groups and named routes.

use oxide_rest_router::{
    Handler, Method, Request, Routable, Router, RouterError, SchemaBuilder, ALL_METHODS,
};
use serde_json::json;

mod common;
use common::*;

fn empty() -> Handler {
    Handler::function(|_| json!([]))
}

fn author_router() -> RestServer {
    let mut router = Router::new("devly/v1");

    router.get("/author/{username:\\@[\\w]+}", empty());
    router.group("/author", |group| {
        group.post("/", empty());
        group.put("/{id:d}", empty());
        group.delete("/{id:d}", empty());
    });

    let mut server = RestServer::new();
    router.register(&mut server);
    server
}

#[test]
fn post_endpoint() {
    let dispatched = author_router().dispatch(Request::post("/devly/v1/author"));
    assert_eq!(dispatched.response.status, 200);
}

#[test]
fn get_endpoint() {
    let dispatched = author_router().dispatch(Request::get("/devly/v1/author/@john_doe"));
    assert_eq!(dispatched.response.status, 200);
}

#[test]
fn delete_endpoint() {
    let dispatched =
        author_router().dispatch(Request::new(Method::Delete, "/devly/v1/author/1"));
    assert_eq!(dispatched.response.status, 200);
}

#[test]
fn put_endpoint() {
    let dispatched = author_router().dispatch(Request::new(Method::Put, "/devly/v1/author/1"));
    assert_eq!(dispatched.response.status, 200);
}

#[test]
fn unknown_endpoint() {
    let server = author_router();

    let dispatched = server.dispatch(Request::new(Method::Patch, "/devly/v1/author/1"));
    assert_eq!(dispatched.response.status, 404);
    assert!(dispatched.matched_route.is_none());

    let dispatched = server.dispatch(Request::get("/devly/v1/author/john"));
    assert_eq!(dispatched.response.status, 404);
}

#[test]
fn group_routes_register_in_declaration_order() {
    let server = author_router();
    assert_eq!(
        server.matched_routes(),
        [
            r"/devly/v1/author/(?P<username>\@[\w]+)",
            "/devly/v1/author",
            r"/devly/v1/author/(?P<id>\d+)",
            r"/devly/v1/author/(?P<id>\d+)",
        ]
    );

    let methods: Vec<&str> = server
        .routes()
        .iter()
        .map(|r| r.record.methods.as_str())
        .collect();
    assert_eq!(methods, ["GET", "POST", "PUT", "DELETE"]);
}

#[test]
fn router_middleware_guards_later_routes() {
    let mut router = Router::new("devly/v1");
    router.get("/public", empty());
    router.middleware(require_user());
    router.group("/private", |group| {
        group.get("/", empty());
    });

    let mut server = RestServer::new();
    router.register(&mut server);

    let open = server.dispatch(Request::get("/devly/v1/public"));
    assert_eq!(open.response.status, 200);

    let denied = server.dispatch(Request::get("/devly/v1/private"));
    assert_eq!(denied.response.status, 401);
    assert_eq!(denied.response.data["code"], json!("unauthorized"));

    let allowed = server.dispatch(logged_in(Request::get("/devly/v1/private")));
    assert_eq!(allowed.response.status, 200);
}

#[test]
fn any_route_answers_every_method() {
    let mut router = Router::new("devly/v1");
    router.any("/ping", Handler::function(|_| json!("pong")));

    let mut server = RestServer::new();
    router.register(&mut server);

    for method in ALL_METHODS {
        let dispatched = server.dispatch(Request::new(*method, "/devly/v1/ping"));
        assert_eq!(dispatched.response.data, json!("pong"), "{method}");
    }
}

#[test]
fn named_routes() {
    let mut router = Router::new("devly/v1");
    router.post("/foo", empty()).name("foo");
    router.get("/author/{id:d}", empty());

    assert!(router.has_route("foo"));
    assert!(!router.has_route("bar"));
    assert_eq!(router.get_route("foo").unwrap().pattern().as_str(), "/foo");
    assert_eq!(
        router.get_route("110f45").unwrap().pattern().template(),
        "/author/{id:d}"
    );

    let err = router.get_route("bar").unwrap_err();
    assert!(matches!(
        err,
        RouterError::RouteNotFound { ref name, ref namespace }
            if name == "bar" && namespace == "devly/v1"
    ));
}

#[test]
fn named_route_can_be_altered_after_declaration() {
    let mut router = Router::new("devly/v1");
    router.get("/author/{id}", empty()).name("author");

    router
        .get_route("author")
        .unwrap()
        .where_("id")
        .is_integer()
        .required();

    let mut server = RestServer::new();
    router.register(&mut server);
    assert_eq!(
        server.routes()[0].record.args["id"].schema.get("type"),
        Some(&json!("integer"))
    );
}

#[test]
fn alter_routes_hook_runs_before_registration() {
    let mut router = Router::new("devly/v1");
    router.get("/author", empty()).name("author.index");
    router.on_register(|namespace, router| {
        assert_eq!(namespace, "devly/v1");
        if let Ok(route) = router.get_route("author.index") {
            route.middleware(require_user());
        }
    });

    let mut server = RestServer::new();
    router.register(&mut server);

    let denied = server.dispatch(Request::get("/devly/v1/author"));
    assert_eq!(denied.response.status, 401);
}

#[test]
fn controller_routes_through_custom_container() {
    let mut router = Router::with_container("devly/v1", container());
    router.get("/authors", "AuthorController");
    router.get("/authors/{id:d}", "AuthorController::show");

    let mut server = RestServer::new();
    router.register(&mut server);

    let shown = server.dispatch(Request::get("/devly/v1/authors/3"));
    assert_eq!(shown.response.data, json!({"author": "3"}));
}

#[test]
fn describe_lists_routes() {
    let mut router = Router::new("devly/v1");
    router
        .match_methods(&[Method::Get, Method::Post], "/author/{id:d}", empty())
        .name("author")
        .where_("id")
        .is_integer();

    let description = router.describe();
    assert_eq!(description["namespace"], json!("devly/v1"));
    assert_eq!(description["routes"][0]["name"], json!("author"));
    assert_eq!(description["routes"][0]["methods"], json!(["GET", "POST"]));
    assert_eq!(
        description["routes"][0]["args"],
        json!({"id": {"type": "integer"}})
    );
}
