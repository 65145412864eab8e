//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request id, tracing, timeout, limits, CORS)
//! - Bind server to listener and drain on shutdown

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::bank::BankService;
use crate::config::{RateLimitConfig, ServerConfig};
use crate::http::handlers;
use crate::http::request::{RequestIdExt, UuidRequestId};
use crate::observability::metrics;
use crate::security::{rate_limit_middleware, RateLimiterState};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub bank: Arc<BankService>,
}

/// HTTP server for the bank API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(bank: Arc<BankService>) -> Self {
        let server = bank.config().server.clone();
        let rate_limit = bank.config().rate_limit.clone();
        let router = build_router(AppState { bank }, &server, &rate_limit);
        Self { router }
    }

    /// Run the server until a shutdown signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState, server: &ServerConfig, rate_limit: &RateLimitConfig) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::health))
        .route("/health", get(handlers::health))
        .route("/create_account", post(handlers::create_account))
        .route("/get_balance", get(handlers::get_balance))
        .route("/transfer", post(handlers::transfer))
        .route("/get_initial_fund", post(handlers::get_initial_fund))
        .with_state(state)
        .route_layer(middleware::from_fn(track_metrics));

    if rate_limit.enabled {
        let limiter = Arc::new(RateLimiterState::new(rate_limit));
        router = router.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
    }

    router
        .layer(RequestBodyLimitLayer::new(server.max_body_size))
        .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs)))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request.request_id(),
            )
        }))
        .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
}

async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_request(&method, &path, response.status().as_u16(), start);
    response
}
