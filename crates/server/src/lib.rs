//! salu-server library crate
//!
//! Exposes `build_state`, `build_app` and `config` for integration tests.
//! The actual binary entrypoint is in `main.rs`.

mod ai;
pub mod channel;
pub mod config;
pub mod db;
mod error;
mod middleware;
mod routes;
pub mod runtime;
pub mod upstream;

use axum::{Extension, Router, middleware as axum_mw, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use channel::{LogChannel, WebhookChannel};
use config::Config;
use db::ConversationStore;
use middleware::ApiKeyAuth;
use runtime::{Channel, Collaborators, FlowRuntime};
use upstream::{BookingClient, CatalogClient, ClientError};

/// Shared state for every handler
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<FlowRuntime>,
    pub store: Arc<dyn ConversationStore>,
}

/// Wire the flow runtime to the configured upstreams and session store
pub fn build_state(
    config: &Config,
    store: Arc<dyn ConversationStore>,
) -> Result<AppState, ClientError> {
    let http = upstream::http_client(config.http_timeout)?;

    let outbound: Arc<dyn Channel> = match &config.outbound_webhook_url {
        Some(url) => Arc::new(WebhookChannel::new(http.clone(), url)),
        None => Arc::new(LogChannel),
    };
    let extractor = ai::LlmExtractor::new(ai::OllamaClient::new(
        http.clone(),
        &config.inference_url,
        &config.inference_model,
    ));

    let runtime = FlowRuntime::new(
        config.flow_context(),
        ai::INSTRUCTIONS,
        Collaborators {
            store: Arc::clone(&store),
            catalog: Arc::new(CatalogClient::new(http.clone(), &config.specialties_url)),
            extractor: Arc::new(extractor),
            booking: Arc::new(BookingClient::new(http, &config.booking_url)),
            outbound,
        },
    );

    Ok(AppState {
        runtime: Arc::new(runtime),
        store,
    })
}

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a TCP port.
pub fn build_app(state: AppState, config: &Config) -> Router {
    let auth = ApiKeyAuth::new(config.api_key.clone());
    let rate_limiter = middleware::create_rate_limiter(config.rate_limit_rps);

    // Protected routes (require auth)
    let protected_routes = routes::conversation_routes()
        .layer(axum_mw::from_fn(middleware::auth_middleware))
        .layer(Extension(auth))
        .layer(axum_mw::from_fn(middleware::rate_limit_middleware))
        .layer(Extension(rate_limiter));

    // Repeated installs (integration tests) are ignored; the handle still
    // renders whatever recorder won.
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    let prometheus_handle = recorder.handle();
    let _ = metrics::set_global_recorder(recorder);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/flow", get(routes::flow::get))
        .route("/health", get(routes::health::check))
        .route("/metrics", get(routes::metrics::get))
        .layer(Extension(prometheus_handle));

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}
