use axum::extract::State;
use axum::Form;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use crate::domain::authentication::models::AccessToken;
use crate::domain::authentication::ports::AuthenticationServicePort;
use crate::inbound::http::router::AppState;

/// OAuth2 password-grant token endpoint.
///
/// The body is returned bare rather than in the `{status_code, data}`
/// envelope so standard OAuth2 clients can read it.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    state
        .authentication_service
        .login(&form.username, &form.password)
        .await
        .map_err(ApiError::from)
        .map(|token| Json(token.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl From<AccessToken> for TokenResponse {
    fn from(token: AccessToken) -> Self {
        Self {
            access_token: token.access_token,
            token_type: token.token_type.to_string(),
            expires_in: token.expires_in,
        }
    }
}
