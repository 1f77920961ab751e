use async_trait::async_trait;

use crate::domain::user::models::Cpf;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Port for user domain service operations.
///
/// Every mutation takes the id of the authenticated actor; the actor must
/// resolve to a stored user before anything is written.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user on behalf of an actor.
    ///
    /// # Arguments
    /// * `command` - Validated registration fields with plaintext password
    /// * `actor` - Id of the authenticated user performing the registration
    ///
    /// # Returns
    /// Created user entity (`createdBy` is the actor's name)
    ///
    /// # Errors
    /// * `ActorNotFound` - Actor does not resolve to a stored user
    /// * `CpfAlreadyExists` - CPF is already registered
    /// * `Password` - Hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn register_user(
        &self,
        command: RegisterUserCommand,
        actor: &UserId,
    ) -> Result<User, UserError>;

    /// Look up a user by identifier.
    ///
    /// # Returns
    /// `None` when no such user exists; removed users are returned
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// List every user, removed ones included.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    /// Update an existing user with optional fields.
    ///
    /// # Arguments
    /// * `id` - User ID to update
    /// * `command` - Command with optional fields
    /// * `actor` - Id of the authenticated user performing the update
    ///
    /// # Returns
    /// Updated user entity with fresh `updatedAt` and `updatedBy`
    ///
    /// # Errors
    /// * `ActorNotFound` - Actor does not resolve to a stored user
    /// * `NotFound` - User does not exist
    /// * `CpfAlreadyExists` - New CPF is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
        actor: &UserId,
    ) -> Result<User, UserError>;

    /// Soft-delete a user: mark it removed, keep the record.
    ///
    /// # Errors
    /// * `ActorNotFound` - Actor does not resolve to a stored user
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn remove_user(&self, id: &UserId, actor: &UserId) -> Result<User, UserError>;

    /// Check a CPF/password pair.
    ///
    /// # Returns
    /// The matching user, digest included
    ///
    /// # Errors
    /// * `NotFoundByCpf` - No user with this CPF
    /// * `InvalidCredentials` - Password does not match
    /// * `Password` - Stored digest is malformed
    /// * `DatabaseError` - Database operation failed
    async fn verify_credentials(&self, cpf: &Cpf, password: &str) -> Result<User, UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user (and its address) to storage.
    ///
    /// # Errors
    /// * `CpfAlreadyExists` - CPF is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by CPF.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_cpf(&self, cpf: &Cpf) -> Result<Option<User>, UserError>;

    /// Retrieve all users from storage.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_all(&self) -> Result<Vec<User>, UserError>;

    /// Merge partial fields into an existing user.
    ///
    /// `None` fields are left untouched; a provided address replaces the
    /// stored one.
    ///
    /// # Returns
    /// The user as stored after the write
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `CpfAlreadyExists` - New CPF is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, id: &UserId, changes: UserChanges) -> Result<User, UserError>;

    /// Physically remove user from storage.
    ///
    /// # Returns
    /// The deleted user
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &UserId) -> Result<User, UserError>;
}
