use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::handlers::AppState;
use crate::entities::Identity;
use crate::errors::ApiError;
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for cart endpoints.
/// Every route is scoped to the caller's identity (authenticated user id, or
/// the anonymous session minted by the session middleware).
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart))
        .route("/", post(add_to_cart))
        .route("/", delete(clear_cart))
        .route("/:id", put(update_cart_item))
        .route("/:id", delete(remove_cart_item))
}

/// Get the current cart with product detail and totals
#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart lines joined with products, plus total and line count", body = crate::services::CartView),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<impl IntoResponse, ApiError> {
    let cart = state
        .services
        .cart
        .get_cart(&identity)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(cart))
}

/// Add a product to the cart
#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 201, description = "Created or incremented cart line", body = crate::entities::CartItemModel),
        (status = 400, description = "Quantity below 1 or unknown product", body = crate::errors::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<AddToCartRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let quantity = payload.quantity.unwrap_or(1);
    let item = state
        .services
        .cart
        .add_item(&identity, payload.product_id, quantity)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(item))
}

/// Set the quantity of a cart line
#[utoipa::path(
    put,
    path = "/api/cart/{id}",
    params(("id" = Uuid, Path, description = "Cart item ID")),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Updated cart line", body = crate::entities::CartItemModel),
        (status = 400, description = "Quantity below 1; the line is left unchanged", body = crate::errors::ErrorResponse),
        (status = 404, description = "Cart item not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Cart"
)]
pub async fn update_cart_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let item = state
        .services
        .cart
        .update_item_quantity(id, payload.quantity)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(item))
}

/// Remove a cart line
#[utoipa::path(
    delete,
    path = "/api/cart/{id}",
    params(("id" = Uuid, Path, description = "Cart item ID")),
    responses(
        (status = 204, description = "Line removed"),
        (status = 404, description = "Cart item not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Cart"
)]
pub async fn remove_cart_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .cart
        .remove_item(id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// Clear the whole cart
#[utoipa::path(
    delete,
    path = "/api/cart",
    responses(
        (status = 204, description = "Cart cleared; clearing an empty cart also succeeds"),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .cart
        .clear(&identity)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

// Request DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "productId": "550e8400-e29b-41d4-a716-446655440000",
    "quantity": 2
}))]
pub struct AddToCartRequest {
    /// Product to add
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub product_id: Uuid,
    /// Units to add; defaults to 1 when omitted
    #[validate(range(min = 1, message = "must be at least 1"))]
    #[schema(example = 2)]
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({ "quantity": 3 }))]
pub struct UpdateCartItemRequest {
    /// New absolute quantity for the line; must stay at or above 1.
    /// Removal is an explicit DELETE, never an implicit side effect.
    #[validate(range(min = 1, message = "must be at least 1"))]
    #[schema(example = 3)]
    pub quantity: i32,
}
