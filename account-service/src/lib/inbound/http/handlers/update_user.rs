use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Deserialize;

use super::AddressRequest;
use super::UserResponseData;
use crate::domain::user::models::parse_birthdate;
use crate::domain::user::models::Address;
use crate::domain::user::models::Cpf;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::PlainPassword;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::JsonBody;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// HTTP request body for updating a user (raw JSON)
///
/// Audit fields are not accepted; unknown keys such as `updatedAt` are
/// ignored and the service stamps them.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub birthdate: Option<String>,
    pub password: Option<String>,
    pub address: Option<AddressRequest>,
}

impl UpdateUserRequest {
    fn try_into_command(self) -> Result<UpdateUserCommand, UserError> {
        // Validation happens here - errors are automatically converted via #[from]
        Ok(UpdateUserCommand {
            cpf: self.cpf.map(Cpf::new).transpose()?,
            name: self.name.map(PersonName::new).transpose()?,
            birthdate: self
                .birthdate
                .as_deref()
                .map(parse_birthdate)
                .transpose()?,
            password: self.password.map(PlainPassword::new).transpose()?,
            address: self.address.map(Address::try_from).transpose()?,
        })
    }
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateUserRequest>,
) -> Result<ApiSuccess<UserResponseData>, ApiError> {
    // Parse user ID and request at HTTP boundary - errors automatically converted
    let user_id = UserId::from_string(&id).map_err(UserError::from)?;
    let command = req.try_into_command()?;

    state
        .user_service
        .update_user(&user_id, command, &actor.user_id)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
