use crate::handlers::common::{created_response, map_service_error, validate_input};
use crate::handlers::AppState;
use crate::entities::{Identity, PaymentMethod};
use crate::errors::ApiError;
use crate::services::ShippingInfo;
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for checkout
pub fn checkout_routes() -> Router<AppState> {
    Router::new().route("/", post(checkout))
}

/// Place an order from the caller's cart
#[utoipa::path(
    post,
    path = "/api/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed; the cart is now empty", body = CheckoutResponse),
        (status = 400, description = "Empty cart or validation failure", body = crate::errors::ErrorResponse),
        (status = 500, description = "Storage failure; no partial order is left behind", body = crate::errors::ErrorResponse)
    ),
    tag = "Checkout"
)]
pub async fn checkout(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let payment_method = match payload.payment_method.to_lowercase().as_str() {
        "credit_card" => PaymentMethod::CreditCard,
        "paypal" => PaymentMethod::Paypal,
        other => {
            return Err(ApiError::Validation {
                message: "Validation failed".to_string(),
                details: Some(format!(
                    "paymentMethod: '{}' is not one of credit_card, paypal",
                    other
                )),
            });
        }
    };

    let shipping = ShippingInfo {
        full_name: payload.full_name,
        email: payload.email,
        address: payload.address,
        city: payload.city,
        zip_code: payload.zip_code,
        country: payload.country,
    };

    let order = state
        .services
        .checkout
        .checkout(&identity, &shipping, payment_method)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(CheckoutResponse {
        order_id: order.id,
        message: "Order placed successfully".to_string(),
    }))
}

// Request/Response DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "fullName": "Jamie Doe",
    "email": "jamie@example.com",
    "address": "1 Main St",
    "city": "Springfield",
    "zipCode": "12345",
    "country": "USA",
    "paymentMethod": "credit_card"
}))]
pub struct CheckoutRequest {
    /// Recipient name
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub full_name: String,
    /// Contact email for the order
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    /// Street address
    #[validate(length(min = 5, message = "must be at least 5 characters"))]
    pub address: String,
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub city: String,
    #[validate(length(min = 3, message = "must be at least 3 characters"))]
    pub zip_code: String,
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub country: String,
    /// Payment method type (credit_card, paypal)
    #[schema(example = "credit_card")]
    pub payment_method: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    /// ID of the order that was just placed
    pub order_id: Uuid,
    pub message: String,
}
