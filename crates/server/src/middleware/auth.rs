use axum::{
    Json,
    body::Body,
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ErrorBody;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// API Key authentication state
#[derive(Clone)]
pub struct ApiKeyAuth {
    api_key: Option<String>,
}

impl ApiKeyAuth {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }

    /// With no key configured every request is allowed
    fn allows(&self, headers: &HeaderMap) -> bool {
        match &self.api_key {
            None => true,
            Some(expected) => headers
                .get(API_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|given| given == expected),
        }
    }
}

/// Reject requests without a matching `X-API-Key` header
pub async fn auth_middleware(request: Request<Body>, next: Next) -> Response {
    let allowed = request
        .extensions()
        .get::<ApiKeyAuth>()
        .is_none_or(|auth| auth.allows(request.headers()));

    if !allowed {
        tracing::warn!(path = %request.uri().path(), "Rejected request with missing or invalid API key");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody::new("unauthorized", "Missing or invalid API key")),
        )
            .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn open_when_no_key_configured() {
        assert!(ApiKeyAuth::new(None).allows(&HeaderMap::new()));
    }

    #[test]
    fn requires_exact_key() {
        let auth = ApiKeyAuth::new(Some("secret".into()));
        let mut headers = HeaderMap::new();
        assert!(!auth.allows(&headers));

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("wrong"));
        assert!(!auth.allows(&headers));

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("secret"));
        assert!(auth.allows(&headers));
    }
}
