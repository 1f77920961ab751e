use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeZone;
use chrono::Utc;

use crate::domain::user::models::Cpf;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::PlainPassword;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserStatus;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

const ADMIN_NAME: &str = "Admin";
const SYSTEM_ACTOR: &str = "system";

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: auth::PasswordHasher,
    /// Verified against when a login CPF is unknown, so both failure paths
    /// cost one Argon2 run.
    dummy_hash: String,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `password_hasher` - Hasher configured with the deployment's work factor
    ///
    /// # Returns
    /// Configured user service instance
    pub fn new(repository: Arc<UR>, password_hasher: auth::PasswordHasher) -> Self {
        // An empty dummy hash only loses the timing equalization.
        let dummy_hash = password_hasher
            .hash("account-service-dummy-password")
            .unwrap_or_default();

        Self {
            repository,
            password_hasher,
            dummy_hash,
        }
    }

    /// Create the bootstrap administrator unless a user with its CPF exists.
    ///
    /// # Returns
    /// The created admin, or `None` when the CPF was already registered
    ///
    /// # Errors
    /// * `Password` - Hashing failed
    /// * `DatabaseError` - Database operation failed
    pub async fn ensure_admin(
        &self,
        cpf: Cpf,
        password: PlainPassword,
    ) -> Result<Option<User>, UserError> {
        if self.repository.find_by_cpf(&cpf).await?.is_some() {
            tracing::info!("Admin user already exists");
            return Ok(None);
        }

        let now = Utc::now();
        let birthdate = Utc
            .with_ymd_and_hms(1999, 6, 28, 0, 0, 0)
            .single()
            .ok_or_else(|| UserError::Unknown("Invalid admin birthdate".to_string()))?;
        let name = PersonName::new(ADMIN_NAME.to_string())?;

        let admin = User {
            id: UserId::new(),
            cpf,
            name,
            birthdate,
            password_hash: self.password_hasher.hash(password.expose())?,
            status: UserStatus::Active,
            created_at: now,
            created_by: SYSTEM_ACTOR.to_string(),
            updated_at: now,
            updated_by: None,
            removed_at: None,
            removed_by: None,
            address: None,
        };

        let admin = self.repository.create(admin).await?;
        tracing::info!(user_id = %admin.id, "Admin user created");

        Ok(Some(admin))
    }

    /// Resolve the acting user; mutations abort here before any write.
    async fn resolve_actor(&self, actor: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(actor)
            .await?
            .ok_or_else(|| {
                tracing::warn!(actor = %actor, "Actor does not resolve to a stored user");
                UserError::ActorNotFound(actor.to_string())
            })
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register_user(
        &self,
        command: RegisterUserCommand,
        actor: &UserId,
    ) -> Result<User, UserError> {
        let actor = self.resolve_actor(actor).await?;

        let password_hash = self.password_hasher.hash(command.password.expose())?;
        let now = Utc::now();

        let user = User {
            id: UserId::new(),
            cpf: command.cpf,
            name: command.name,
            birthdate: command.birthdate,
            password_hash,
            status: UserStatus::Active,
            created_at: now,
            created_by: actor.name.to_string(),
            updated_at: now,
            updated_by: None,
            removed_at: None,
            removed_by: None,
            address: command.address,
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(user_id = %created_user.id, actor = %actor.id, "User registered");

        Ok(created_user)
    }

    async fn find_user(&self, id: &UserId) -> Result<Option<User>, UserError> {
        self.repository.find_by_id(id).await
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
        actor: &UserId,
    ) -> Result<User, UserError> {
        let actor = self.resolve_actor(actor).await?;

        let password_hash = command
            .password
            .map(|password| self.password_hasher.hash(password.expose()))
            .transpose()?;

        let changes = UserChanges {
            cpf: command.cpf,
            name: command.name,
            birthdate: command.birthdate,
            password_hash,
            address: command.address,
            updated_at: Some(Utc::now()),
            updated_by: Some(actor.name.to_string()),
            ..UserChanges::default()
        };

        let updated_user = self.repository.update(id, changes).await?;
        tracing::info!(user_id = %updated_user.id, actor = %actor.id, "User updated");

        Ok(updated_user)
    }

    async fn remove_user(&self, id: &UserId, actor: &UserId) -> Result<User, UserError> {
        let actor = self.resolve_actor(actor).await?;

        let changes = UserChanges {
            status: Some(UserStatus::Removed),
            removed_at: Some(Utc::now()),
            removed_by: Some(actor.name.to_string()),
            ..UserChanges::default()
        };

        let removed_user = self.repository.update(id, changes).await?;
        tracing::info!(user_id = %removed_user.id, actor = %actor.id, "User removed");

        Ok(removed_user)
    }

    async fn verify_credentials(&self, cpf: &Cpf, password: &str) -> Result<User, UserError> {
        let Some(user) = self.repository.find_by_cpf(cpf).await? else {
            let _ = self.password_hasher.verify(password, &self.dummy_hash);
            return Err(UserError::NotFoundByCpf(cpf.to_string()));
        };

        if !self.password_hasher.verify(password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }
}
