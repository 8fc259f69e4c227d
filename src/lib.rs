/*!
Storefront API: product catalog, categories, search, a session-scoped
shopping cart, and a checkout that turns the cart into an order.

The HTTP layer (axum) sits on top of a small services layer, which talks to
storage through the [`storage::Storage`] trait. Two backends implement it:
an in-memory store for development and tests, and a SeaORM-backed relational
store for real deployments.
*/

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod storage;

use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub storage: Arc<dyn storage::Storage>,
    pub services: handlers::AppServices,
}

impl AppState {
    /// Wires the services layer on top of one storage backend.
    pub fn new(config: config::AppConfig, storage: Arc<dyn storage::Storage>) -> Self {
        Self {
            services: handlers::AppServices::new(storage.clone()),
            storage,
            config,
        }
    }
}

/// All JSON API routes; mounted under `/api` by the binary.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .nest("/products", handlers::products::products_routes())
        .nest("/categories", handlers::categories::categories_routes())
        .nest("/cart", handlers::cart::cart_routes())
        .nest("/checkout", handlers::checkout::checkout_routes())
        .nest("/contact", handlers::contact::contact_routes())
}

/// Liveness plus storage reachability. Always answers 200; the body reports
/// whether the storage backend is reachable.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let storage_status = match state.storage.ping().await {
        Ok(_) => "healthy",
        Err(err) => {
            tracing::warn!("Health check storage ping failed: {}", err);
            "unhealthy"
        }
    };

    Json(json!({
        "status": if storage_status == "healthy" { "healthy" } else { "unhealthy" },
        "checks": {
            "storage": storage_status,
        },
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
