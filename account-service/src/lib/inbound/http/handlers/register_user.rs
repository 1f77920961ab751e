use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Deserialize;

use super::AddressRequest;
use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use super::UserResponseData;
use crate::domain::user::models::parse_birthdate;
use crate::domain::user::models::Address;
use crate::domain::user::models::Cpf;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::PlainPassword;
use crate::domain::user::models::RegisterUserCommand;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn register_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    JsonBody(body): JsonBody<RegisterUserRequest>,
) -> Result<ApiSuccess<UserResponseData>, ApiError> {
    state
        .user_service
        .register_user(body.try_into_command()?, &actor.user_id)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

/// HTTP request body for registering a user (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterUserRequest {
    name: String,
    cpf: String,
    birthdate: String,
    password: String,
    address: AddressRequest,
}

impl RegisterUserRequest {
    fn try_into_command(self) -> Result<RegisterUserCommand, UserError> {
        Ok(RegisterUserCommand {
            cpf: Cpf::new(self.cpf)?,
            name: PersonName::new(self.name)?,
            birthdate: parse_birthdate(&self.birthdate)?,
            password: PlainPassword::new(self.password)?,
            address: Some(Address::try_from(self.address)?),
        })
    }
}
