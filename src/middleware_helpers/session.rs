use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::entities::Identity;
use crate::errors::{ApiError, ServiceError};

/// Anonymous session identifier minted on first contact and carried in a cookie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Authenticated user id injected into request extensions by an upstream auth
/// layer. This crate never validates credentials itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

/// An authenticated user always wins over the anonymous session.
#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(Identity::User(user.0));
        }
        if let Some(session) = parts.extensions.get::<SessionId>() {
            return Ok(Identity::Session(session.0.clone()));
        }
        Err(ApiError::ServiceError(ServiceError::InternalError(
            "session middleware not installed".to_string(),
        )))
    }
}

/// Configuration handed to the session middleware.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub cookie_name: String,
}

/// Middleware that guarantees every request carries a session identity.
/// An existing cookie is reused; otherwise a fresh id is minted and the
/// cookie is set on the response.
pub async fn session_middleware(
    State(config): State<SessionConfig>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = session_cookie(request.headers(), &config.cookie_name);
    let minted = existing.is_none();
    let session_id = existing.unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(SessionId(session_id.clone()));

    let mut response = next.run(request).await;

    if minted {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            config.cookie_name, session_id
        );
        // Minted ids are UUIDs; only an exotic configured cookie name can fail here
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}

fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request as HttpRequest, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn identity_handler(identity: Identity) -> (StatusCode, String) {
        (StatusCode::OK, identity.to_string())
    }

    fn test_app() -> Router {
        Router::new()
            .route("/", get(identity_handler))
            .layer(axum::middleware::from_fn_with_state(
                SessionConfig {
                    cookie_name: "storefront_session".to_string(),
                },
                session_middleware,
            ))
    }

    #[test]
    fn cookie_parsing_picks_the_named_pair() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; storefront_session=abc-123; lang=en"),
        );
        assert_eq!(
            session_cookie(&headers, "storefront_session").as_deref(),
            Some("abc-123")
        );
        assert_eq!(session_cookie(&headers, "missing"), None);
    }

    #[tokio::test]
    async fn first_contact_mints_a_session_cookie() {
        let response = test_app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert!(set_cookie.starts_with("storefront_session="));
        assert!(set_cookie.contains("HttpOnly"));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();
        assert!(body_str.starts_with("session:"));
    }

    #[tokio::test]
    async fn existing_cookie_is_reused_without_a_new_set_cookie() {
        let response = test_app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/")
                    .header(header::COOKIE, "storefront_session=fixed-session-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, "session:fixed-session-id");
    }

    #[tokio::test]
    async fn authenticated_user_takes_precedence_over_session() {
        let user_id = Uuid::new_v4();
        let response = test_app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/")
                    .header(header::COOKIE, "storefront_session=ignored")
                    .extension(CurrentUser(user_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, format!("user:{}", user_id));
    }
}
