//! HTTP API
//!
//! Provides REST endpoints for:
//! - Public feeds (market quotes and series, news, jobs, certifications)
//! - Account registration and login
//! - Authenticated community feed and session

pub mod auth;
pub mod communities;
pub mod extract;
pub mod feeds;
pub mod middleware;
pub mod session;
pub mod state;

use axum::{Router, extract::DefaultBodyLimit, middleware as axum_middleware, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use extract::AuthenticatedUser;
pub use middleware::{
    MiddlewareConfig, body_size_middleware, logging_middleware, security_headers_middleware,
};
pub use state::AppState;

pub const ROOT_BANNER: &str = "Financegram Backend API";

/// Assemble the full router.
pub fn create_app(state: AppState, config: MiddlewareConfig, enable_cors: bool) -> Router {
    let app = Router::new()
        .route("/", get(|| async { ROOT_BANNER }))
        .route("/health", get(|| async { "OK" }))
        .merge(feeds::create_router())
        .nest("/auth", auth::create_router())
        .nest("/communities", communities::create_router())
        .nest("/session", session::create_router())
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_request_size))
        .layer(axum_middleware::from_fn_with_state(
            config.clone(),
            body_size_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            config,
            logging_middleware,
        ))
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}
