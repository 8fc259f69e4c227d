use crate::handlers::common::{map_service_error, success_response};
use crate::handlers::AppState;
use crate::errors::ApiError;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};

/// Creates the router for category endpoints
pub fn categories_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/:name", get(get_category))
}

/// List all categories
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "All categories", body = Vec<crate::entities::CategoryModel>),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let categories = state
        .services
        .catalog
        .list_categories()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(categories))
}

/// Get a category by its slug
#[utoipa::path(
    get,
    path = "/api/categories/{name}",
    params(("name" = String, Path, description = "Category slug, e.g. electronics")),
    responses(
        (status = 200, description = "The category", body = crate::entities::CategoryModel),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .services
        .catalog
        .get_category(&name)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(category))
}
