use std::path::Path;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config;
use crate::handlers;
use crate::middleware::identity_middleware;
use crate::store::DocumentStore;
use crate::users::UserStore;

/// Shared application state: the two file-backed stores plus the outbound
/// HTTP client for the image proxy.
#[derive(Clone)]
pub struct AppState {
    pub store: DocumentStore,
    pub users: UserStore,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(data_dir: &Path) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config::config().proxy.timeout_secs))
            .build()?;

        Ok(Self {
            store: DocumentStore::new(data_dir),
            users: UserStore::new(data_dir),
            http,
        })
    }
}

pub fn app(state: AppState) -> Router {
    let config = config::config();

    let mut router = Router::new()
        .route("/api/health", get(health))
        // Auth
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route(
            "/api/auth/me",
            get(handlers::auth::me_get).put(handlers::auth::me_put),
        )
        // Shortcuts document store
        .route("/api/shortcuts", get(handlers::data::shortcuts_get))
        .route("/api/shortcuts/:type", post(handlers::data::shortcuts_post))
        .route(
            "/api/shortcuts/:type/:id",
            axum::routing::put(handlers::data::shortcuts_put)
                .delete(handlers::data::shortcuts_delete),
        )
        // Image proxy
        .route("/api/proxy-image", get(handlers::proxy::proxy_image))
        // Global middleware
        .layer(middleware::from_fn(identity_middleware))
        .layer(DefaultBodyLimit::max(config.server.max_request_size_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if config.server.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}
