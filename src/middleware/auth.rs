use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Caller identity taken from a verified bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub username: String,
}

/// Bearer token middleware: verifies the token and injects [`AuthUser`]
/// into the request extensions.
pub async fn require_bearer(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers).map_err(ApiError::unauthorized)?;

    let username = state.tokens.verify(token).map_err(|e| {
        tracing::warn!("Rejected bearer token: {}", e);
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(AuthUser { username });
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, &'static str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    // The scheme name is case-insensitive (RFC 7235)
    let (scheme, token) = value.trim_start().split_once(' ').unwrap_or((value.trim(), ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err("Authorization header must use Bearer token format");
    }

    match token.trim() {
        "" => Err("Empty bearer token"),
        token => Ok(token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(extract_bearer(&HeaderMap::new()), Err("Missing Authorization header"));
        assert_eq!(extract_bearer(&headers("Bearer ")), Err("Empty bearer token"));
        assert!(extract_bearer(&headers("Basic dXNlcjpwdw==")).is_err());
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        assert_eq!(extract_bearer(&headers("bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(extract_bearer(&headers("BEARER abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(extract_bearer(&headers("Bearer")), Err("Empty bearer token"));
        assert!(extract_bearer(&headers("Bearerabc")).is_err());
    }
}
