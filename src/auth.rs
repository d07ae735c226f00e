use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};

use crate::{error::ApiError, sessions::SessionState};

const BEARER: &str = "bearer";

/// bearer_token
///
/// Strips an optional, case-insensitive `Bearer` scheme and the whitespace after it.
/// A value without the scheme is returned as-is (trimmed), so raw tokens are
/// accepted too.
pub fn bearer_token(value: &str) -> &str {
    let value = value.trim();
    match value.get(..BEARER.len()) {
        Some(scheme) if scheme.eq_ignore_ascii_case(BEARER) => {
            let rest = &value[BEARER.len()..];
            // "Bearerabc" is a token that happens to start with "Bearer", not a scheme.
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                rest.trim_start()
            } else {
                value
            }
        }
        _ => value,
    }
}

/// Token from the `Authorization` header, or `None` when the header is missing,
/// not valid UTF-8, or empty after stripping the scheme.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(bearer_token)
        .filter(|token| !token.is_empty())
}

/// SessionToken
///
/// The resolved bearer token of an authenticated request.
///
/// Implements Axum's `FromRequestParts`, so any handler (or the auth middleware) that
/// takes a `SessionToken` argument is only reached with a token the session registry
/// knows. Rejection is `ApiError::Unauthorized` (401).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(pub String);

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
    SessionState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = SessionState::from_ref(state);

        let token = token_from_headers(&parts.headers).ok_or(ApiError::Unauthorized)?;

        if !sessions.exists(token) {
            tracing::debug!("rejected unknown bearer token");
            return Err(ApiError::Unauthorized);
        }

        Ok(SessionToken(token.to_string()))
    }
}
