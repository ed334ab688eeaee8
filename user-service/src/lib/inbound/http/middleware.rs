use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use super::handlers::INVALID_TOKEN_MESSAGE;
use crate::domain::authentication::ports::AuthenticationServicePort;
use crate::domain::user::models::User;
use crate::inbound::http::router::AppState;

/// Extension holding the user a validated bearer token resolved to
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware that resolves `Authorization: Bearer <token>` to a user and
/// adds it to the request extensions.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&req)?.to_string();

    let user = state
        .authentication_service
        .resolve_current_user(&token)
        .await?;

    tracing::debug!(user_id = %user.id, "Bearer token accepted");
    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

fn extract_bearer_token(req: &Request) -> Result<&str, ApiError> {
    let rejected = |reason: &str| {
        tracing::warn!(reason, "Bearer token rejected");
        ApiError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string())
    };

    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| rejected("missing_header"))?
        .to_str()
        .map_err(|_| rejected("non_ascii_header"))?;

    parse_bearer(value).ok_or_else(|| rejected("not_bearer"))
}

/// Scheme is case-insensitive; the token must be non-empty.
fn parse_bearer(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(parse_bearer("bearer abc"), Some("abc"));
        assert_eq!(parse_bearer("BEARER  abc "), Some("abc"));
    }

    #[test]
    fn test_parse_bearer_rejects_other_schemes() {
        assert_eq!(parse_bearer("Basic dXNlcjpwYXNz"), None);
        assert_eq!(parse_bearer("Bearer"), None);
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer("abc.def.ghi"), None);
    }
}
