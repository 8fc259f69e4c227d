use crate::handlers::common::{success_response, validate_input};
use crate::handlers::AppState;
use crate::errors::ApiError;
use axum::{
    extract::Json,
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

/// Creates the router for the contact form
pub fn contact_routes() -> Router<AppState> {
    Router::new().route("/", post(submit_contact))
}

/// Accept a contact form submission.
/// Submissions are acknowledged and logged; nothing is persisted.
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Message received", body = ContactResponse),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Contact"
)]
pub async fn submit_contact(
    Json(payload): Json<ContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    info!(
        name = %payload.name,
        email = %payload.email,
        "Contact form submission received"
    );

    Ok(success_response(ContactResponse {
        message: "Thank you for your message. We will get back to you soon.".to_string(),
    }))
}

// Request/Response DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "Jamie Doe",
    "email": "jamie@example.com",
    "message": "Is the walnut desk available in a left-hand configuration?"
}))]
pub struct ContactRequest {
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 10, message = "must be at least 10 characters"))]
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactResponse {
    pub message: String,
}
