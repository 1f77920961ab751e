use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use super::INVALID_CREDENTIALS_MESSAGE;
use crate::domain::user::models::Cpf;
use crate::inbound::http::router::AppState;

/// Exchange a CPF and password for a bearer token.
///
/// Every credential failure yields the same 401 body.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequestBody>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let cpf = Cpf::new(body.cpf)
        .map_err(|_| ApiError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string()))?;

    let user = state
        .user_service
        .verify_credentials(&cpf, &body.password)
        .await
        .map_err(|e| {
            tracing::info!("Login rejected");
            ApiError::from(e)
        })?;

    let token = state
        .authenticator
        .issue_token(user.id)
        .map_err(|e| ApiError::InternalServerError(format!("Token generation failed: {}", e)))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(ApiSuccess::new(StatusCode::OK, LoginResponseData { token }))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    cpf: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub token: String,
}
