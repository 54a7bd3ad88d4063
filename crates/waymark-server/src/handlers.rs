//! Request handlers for the Waymark dispatcher.
//!
//! Every request that is not `/health` falls through to the dispatcher,
//! which looks the path up in the route table and answers with the
//! configured status and a JSON description of the match.

use crate::config::{Config, RouteConfig};
use crate::metrics::{self, RequestMetricsGuard};
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json,
};
use percent_encoding::percent_decode_str;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};
use waymark_core::Router as WaymarkRouter;

/// What to do when a route matches.
#[derive(Debug, Clone)]
pub struct RouteAction {
    /// Allowed methods. Empty allows any method.
    pub methods: Vec<Method>,
    /// Status code to answer with.
    pub status: StatusCode,
    /// Payload echoed back in the response.
    pub body: Option<Value>,
}

impl RouteAction {
    /// Build an action from a route table entry.
    ///
    /// # Errors
    ///
    /// Returns an error if a method name or the status code is invalid.
    pub fn from_config(route: &RouteConfig) -> Result<Self> {
        let methods = route
            .methods
            .iter()
            .map(|m| {
                Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                    .with_context(|| format!("Route {}: invalid method {:?}", route.name, m))
            })
            .collect::<Result<Vec<_>>>()?;

        let status = StatusCode::from_u16(route.status)
            .with_context(|| format!("Route {}: invalid status {}", route.name, route.status))?;

        Ok(Self {
            methods,
            status,
            body: route.body.clone(),
        })
    }

    fn allows(&self, method: &Method) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }

    fn allow_header(&self) -> String {
        self.methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Build the route table.
///
/// # Errors
///
/// Returns an error if any entry is invalid or the set of patterns is
/// ambiguous. All registration failures are reported together.
pub fn build_router(routes: &[RouteConfig]) -> Result<WaymarkRouter<RouteAction>> {
    let mut builder = WaymarkRouter::builder();
    for route in routes {
        let action = RouteAction::from_config(route)?;
        // Failures are collected by the builder and surface from build().
        let _ = builder.register(route.name.clone(), &route.pattern, action);
    }
    builder.build().context("Invalid route table")
}

/// Shared server state.
pub struct AppState {
    /// The route table.
    pub router: WaymarkRouter<RouteAction>,
    /// Server configuration.
    pub config: Config,
}

impl AppState {
    /// Create new app state.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured routes do not form a valid table.
    pub fn new(config: Config) -> Result<Self> {
        let router = build_router(&config.routes)?;
        metrics::set_routes_registered(router.len());
        Ok(Self { router, config })
    }
}

/// Run the HTTP server.
///
/// # Errors
///
/// Returns an error if the route table is invalid or the server fails to start.
pub async fn run_server(config: Config) -> Result<()> {
    let state = Arc::new(AppState::new(config.clone())?);

    // Start metrics server if enabled
    if config.metrics.enabled {
        if let Err(e) = metrics::start_metrics_server(config.metrics.port) {
            error!("Failed to start metrics server: {}", e);
        }
    }

    let app = axum::Router::new()
        .route("/health", get(health_handler))
        .fallback(dispatch_handler)
        .with_state(state.clone());

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(routes = state.router.len(), "Waymark listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check handler.
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Fallback handler: route every other request through the table.
async fn dispatch_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
) -> Response {
    let _metrics_guard = RequestMetricsGuard::new();
    dispatch(&state.router, &method, uri.path()).into_response()
}

/// Outcome of dispatching one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// A route matched and allows the method.
    Matched {
        /// Configured status.
        status: StatusCode,
        /// Response payload. Capture values are percent-decoded.
        body: Value,
    },
    /// A route matched but does not allow the method.
    MethodNotAllowed {
        /// Name of the matched route.
        route: String,
        /// Value for the `Allow` header.
        allow: String,
    },
    /// No route matched the path.
    NotFound {
        /// The request path.
        path: String,
    },
}

/// Look `path` up and decide the response.
///
/// `path` is matched still percent-encoded, so `%2F` never splits a segment.
/// Captured values are decoded afterwards.
pub fn dispatch(router: &WaymarkRouter<RouteAction>, method: &Method, path: &str) -> Dispatch {
    let Some(m) = router.at(path) else {
        debug!(%method, path, "No route matched");
        metrics::record_unmatched();
        return Dispatch::NotFound {
            path: path.to_string(),
        };
    };

    let route = m.route();
    let action = m.action();
    if !action.allows(method) {
        debug!(%method, route = route.name(), "Method not allowed");
        metrics::record_method_not_allowed(route.name());
        return Dispatch::MethodNotAllowed {
            route: route.name().to_string(),
            allow: action.allow_header(),
        };
    }

    metrics::record_match(route.name());

    let captures: Map<String, Value> = m
        .captures()
        .iter()
        .map(|(name, value)| {
            let decoded = percent_decode_str(value).decode_utf8_lossy();
            (name.unwrap_or("...").to_string(), Value::from(decoded.as_ref()))
        })
        .collect();

    Dispatch::Matched {
        status: action.status,
        body: json!({
            "route": route.name(),
            "pattern": route.pattern().to_string(),
            "captures": captures,
            "body": action.body.clone().unwrap_or(Value::Null),
        }),
    }
}

impl IntoResponse for Dispatch {
    fn into_response(self) -> Response {
        match self {
            Dispatch::Matched { status, body } => (status, Json(body)).into_response(),
            Dispatch::MethodNotAllowed { route, allow } => (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, allow)],
                Json(json!({ "error": "method not allowed", "route": route })),
            )
                .into_response(),
            Dispatch::NotFound { path } => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "not found", "path": path })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(name: &str, pattern: &str, methods: &[&str]) -> RouteConfig {
        RouteConfig {
            name: name.to_string(),
            pattern: pattern.to_string(),
            methods: methods.iter().map(ToString::to_string).collect(),
            status: 200,
            body: None,
        }
    }

    fn table() -> WaymarkRouter<RouteAction> {
        let mut files = route("files", "/files/{path...}", &[]);
        files.status = 202;
        files.body = Some(json!({ "kind": "file" }));

        build_router(&[
            route("home", "/", &["GET"]),
            route("user", "/users/{id}", &["get", "DELETE"]),
            route("me", "/users/me", &["GET"]),
            files,
        ])
        .unwrap()
    }

    #[test]
    fn test_dispatch_match() {
        let router = table();
        let outcome = dispatch(&router, &Method::GET, "/users/42");
        assert_eq!(
            outcome,
            Dispatch::Matched {
                status: StatusCode::OK,
                body: json!({
                    "route": "user",
                    "pattern": "/users/{id}",
                    "captures": { "id": "42" },
                    "body": null,
                }),
            }
        );
    }

    #[test]
    fn test_dispatch_prefers_literal() {
        let router = table();
        match dispatch(&router, &Method::GET, "/users/me") {
            Dispatch::Matched { body, .. } => assert_eq!(body["route"], "me"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_configured_status_and_body() {
        let router = table();
        match dispatch(&router, &Method::PUT, "/files/a/b.txt") {
            Dispatch::Matched { status, body } => {
                assert_eq!(status, StatusCode::ACCEPTED);
                assert_eq!(body["captures"]["path"], "a/b.txt");
                assert_eq!(body["body"]["kind"], "file");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_decodes_captures() {
        let router = table();
        match dispatch(&router, &Method::GET, "/users/jane%20doe") {
            Dispatch::Matched { body, .. } => {
                assert_eq!(body["route"], "user");
                assert_eq!(body["captures"]["id"], "jane doe");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        match dispatch(&router, &Method::GET, "/users/a%2Fb") {
            Dispatch::Matched { body, .. } => assert_eq!(body["captures"]["id"], "a/b"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        match dispatch(&router, &Method::GET, "/files/my%20docs/a.txt") {
            Dispatch::Matched { body, .. } => {
                assert_eq!(body["captures"]["path"], "my docs/a.txt");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_method_not_allowed() {
        let router = table();
        assert_eq!(
            dispatch(&router, &Method::POST, "/users/42"),
            Dispatch::MethodNotAllowed {
                route: "user".to_string(),
                allow: "GET, DELETE".to_string(),
            }
        );
    }

    #[test]
    fn test_dispatch_not_found() {
        let router = table();
        assert_eq!(
            dispatch(&router, &Method::GET, "/nothing"),
            Dispatch::NotFound {
                path: "/nothing".to_string()
            }
        );
        assert!(matches!(
            dispatch(&router, &Method::GET, "/users/"),
            Dispatch::NotFound { .. }
        ));
    }

    #[test]
    fn test_build_router_rejects_conflicts() {
        let err = build_router(&[
            route("a", "/a/{x}", &[]),
            route("b", "/a/{y}", &[]),
        ])
        .unwrap_err();
        assert!(format!("{:#}", err).contains("match the same paths"));
    }

    #[test]
    fn test_build_router_rejects_bad_method() {
        assert!(build_router(&[route("a", "/a", &["NOT A METHOD"])]).is_err());

        let mut bad_status = route("a", "/a", &[]);
        bad_status.status = 1000;
        assert!(build_router(&[bad_status]).is_err());
    }

    #[tokio::test]
    async fn test_dispatch_handler_responses() {
        let config = Config {
            routes: vec![route("user", "/users/{id}", &["GET"])],
            ..Config::default()
        };
        let state = Arc::new(AppState::new(config).unwrap());

        let ok = dispatch_handler(
            State(state.clone()),
            Method::GET,
            Uri::from_static("/users/7"),
        )
        .await;
        assert_eq!(ok.status(), StatusCode::OK);

        let not_allowed = dispatch_handler(
            State(state.clone()),
            Method::POST,
            Uri::from_static("/users/7"),
        )
        .await;
        assert_eq!(not_allowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(not_allowed.headers()[header::ALLOW], "GET");

        let missing =
            dispatch_handler(State(state), Method::GET, Uri::from_static("/posts/7")).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
