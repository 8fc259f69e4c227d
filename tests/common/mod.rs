// Each integration test binary compiles this module and uses its own subset
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    middleware,
    response::Response,
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use storefront_api::{
    config::AppConfig,
    db::{self, DbConfig},
    entities::ProductModel,
    handlers::AppServices,
    middleware_helpers::{
        request_id::request_id_middleware,
        session::{session_middleware, SessionConfig},
    },
    services::CreateProductInput,
    storage::{DatabaseStorage, MemoryStorage, Storage},
    AppState,
};
use tower::ServiceExt;

pub const SESSION_COOKIE: &str = "storefront_session";

/// Helper harness that assembles the full router (session + request-id
/// middleware included) on top of a chosen storage backend.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// In-memory storage flavor; needs nothing external.
    pub fn with_memory_storage() -> Self {
        Self::from_storage(Arc::new(MemoryStorage::new()))
    }

    /// SQLite-backed flavor exercising the SeaORM storage implementation.
    /// One pooled connection keeps the in-memory database alive and shared
    /// for the whole test.
    pub async fn with_database_storage() -> Self {
        let db_cfg = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(5),
        };
        let pool = db::establish_connection_with_config(&db_cfg)
            .await
            .expect("failed to open sqlite test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        Self::from_storage(Arc::new(DatabaseStorage::new(pool)))
    }

    fn from_storage(storage: Arc<dyn Storage>) -> Self {
        let config = AppConfig::new("sqlite::memory:", "127.0.0.1", 0, "test");
        let state = AppState::new(config.clone(), storage);

        let router = Router::new()
            .nest("/api", storefront_api::api_routes())
            .layer(middleware::from_fn_with_state(
                SessionConfig {
                    cookie_name: config.session_cookie_name.clone(),
                },
                session_middleware,
            ))
            .layer(middleware::from_fn(request_id_middleware))
            .with_state(state.clone());

        Self { router, state }
    }

    pub fn services(&self) -> &AppServices {
        &self.state.services
    }

    pub fn storage(&self) -> Arc<dyn Storage> {
        self.state.storage.clone()
    }

    /// Send a request without a session cookie; the middleware mints one.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request_with_session(method, uri, body, None).await
    }

    /// Send a request carrying the session id of an earlier response, so a
    /// sequence of calls acts as one shopper.
    pub async fn request_with_session(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        session: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(session_id) = session {
            builder = builder.header(
                header::COOKIE,
                format!("{}={}", SESSION_COOKIE, session_id),
            );
        }

        let body = if let Some(json) = body {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Seed a catalog product through the service layer.
    pub async fn seed_product(&self, name: &str, price: Decimal) -> ProductModel {
        self.seed_product_with(CreateProductInput {
            name: name.to_string(),
            description: format!("{} seeded for integration tests", name),
            price,
            category: "electronics".to_string(),
            image_url: "/images/test.jpg".to_string(),
            ..Default::default()
        })
        .await
    }

    pub async fn seed_product_with(&self, input: CreateProductInput) -> ProductModel {
        self.state
            .services
            .catalog
            .create_product(input)
            .await
            .expect("seed product for tests")
    }
}

/// Extract the minted session id from a response's Set-Cookie header.
pub fn session_cookie_from(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.split(';').next())
        .and_then(|pair| pair.trim().strip_prefix(&format!("{}=", SESSION_COOKIE)).map(str::to_string))
}

pub async fn response_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
