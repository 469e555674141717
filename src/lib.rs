pub mod auth;
pub mod cart;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod filter;
pub mod models;
pub mod pagination;
pub mod relations;
pub mod routes;
pub mod views;

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::{routing::get, Router};
use sqlx::SqlitePool;
use time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tower_sessions::{cookie::SameSite, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;
use tracing::Level;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<Config>,
}

async fn health() -> &'static str {
    "ok"
}

/// Build the full Axum application router.
///
/// Caller is responsible for running database migrations on `pool` beforehand.
/// This function sets up the session store (and migrates its table), then
/// assembles all route modules, middleware, and state.
pub async fn build_app(pool: SqlitePool, config: Config) -> Result<Router, sqlx::Error> {
    let session_store = SqliteStore::new(pool.clone());
    session_store.migrate().await?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_expiry(Expiry::OnInactivity(Duration::days(30)))
        .with_secure(config.secure_cookies)
        .with_http_only(true)
        .with_same_site(SameSite::Lax);

    let media = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=86400"),
        ))
        .service(ServeDir::new(&config.media_dir));

    let state = AppState {
        db: pool,
        config: Arc::new(config),
    };

    Ok(Router::new()
        .route("/health", get(health))
        .merge(routes::auth::router())
        .merge(routes::users::router())
        .merge(routes::tags::router())
        .merge(routes::ingredients::router())
        .merge(routes::recipes::router())
        .nest_service("/media", media)
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state))
}
