//! Router builder for the Shelf HTTP server

use axum::routing::{get, MethodRouter};
use axum::Router;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use crate::routes::{books, health};
use crate::state::AppState;

/// Builder for the main HTTP router.
///
/// Layers only wrap routes added before them, so register routes first.
pub struct RouterBuilder {
    router: Router<AppState>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a single route
    pub fn route(mut self, path: &str, route: MethodRouter<AppState>) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount the book routes under `/api/v1/books`
    pub fn with_books(mut self) -> Self {
        self.router = self.router.nest(books::BASE_PATH, books::router());
        self
    }

    /// Add `/healthz`
    pub fn with_health(self) -> Self {
        self.route("/healthz", get(health::healthz))
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Assign an `x-request-id` to each request and echo it on the response
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
        self
    }

    /// Add timeout middleware
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.router = self.router.layer(TimeoutLayer::new(timeout));
        self
    }

    /// Attach state and build the final router
    pub fn build(self, state: AppState) -> Router {
        self.router.with_state(state)
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The full application: book routes, health probe and middleware.
pub fn app(state: AppState, timeout: Duration) -> Router {
    RouterBuilder::new()
        .with_books()
        .with_health()
        .with_tracing()
        .with_cors()
        .with_request_id()
        .with_timeout(timeout)
        .build(state)
}
