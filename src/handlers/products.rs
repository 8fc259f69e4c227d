use crate::handlers::common::{map_service_error, success_response};
use crate::handlers::AppState;
use crate::errors::ApiError;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

/// Creates the router for product catalog endpoints.
/// Literal routes are registered ahead of `/:id` so `featured`, `new` and
/// `search` never parse as product ids.
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/featured", get(list_featured_products))
        .route("/new", get(list_new_products))
        .route("/search", get(search_products))
        .route("/category/:category", get(list_products_by_category))
        .route("/:id", get(get_product))
}

/// List all products
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All catalog products", body = Vec<crate::entities::ProductModel>),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .catalog
        .list_products()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

/// List featured products
#[utoipa::path(
    get,
    path = "/api/products/featured",
    responses(
        (status = 200, description = "Products flagged as featured", body = Vec<crate::entities::ProductModel>),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn list_featured_products(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .catalog
        .list_featured()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

/// List new-arrival products
#[utoipa::path(
    get,
    path = "/api/products/new",
    responses(
        (status = 200, description = "Products flagged as new arrivals", body = Vec<crate::entities::ProductModel>),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn list_new_products(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .catalog
        .list_new()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

/// Search products by name or description
#[utoipa::path(
    get,
    path = "/api/products/search",
    params(ProductSearchParams),
    responses(
        (status = 200, description = "Case-insensitive substring matches", body = Vec<crate::entities::ProductModel>),
        (status = 400, description = "Missing or blank search term", body = crate::errors::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<ProductSearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    // An absent term flows through as blank and is rejected by the service
    let term = params.term.unwrap_or_default();
    let products = state
        .services
        .catalog
        .search(&term)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

/// List products in a category
#[utoipa::path(
    get,
    path = "/api/products/category/{category}",
    params(("category" = String, Path, description = "Category slug, e.g. electronics")),
    responses(
        (status = 200, description = "Products in the category", body = Vec<crate::entities::ProductModel>),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn list_products_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .catalog
        .list_by_category(&category)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

/// Get a single product
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "The product", body = crate::entities::ProductModel),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .catalog
        .get_product(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(product))
}

// Request DTOs

#[derive(Debug, Deserialize, IntoParams)]
pub struct ProductSearchParams {
    /// Substring matched against product name and description
    pub term: Option<String>,
}
