use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::Cpf;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local user store.
///
/// CPF uniqueness is checked under the same write lock as the insert, so
/// concurrent registrations of one CPF yield exactly one success.
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }
}

fn cpf_taken(users: &HashMap<UserId, User>, cpf: &Cpf, except: Option<&UserId>) -> bool {
    users
        .values()
        .any(|u| u.cpf == *cpf && Some(&u.id) != except)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if cpf_taken(&users, &user.cpf, None) {
            return Err(UserError::CpfAlreadyExists(user.cpf.to_string()));
        }

        users.insert(user.id, user.clone());
        tracing::debug!(user_id = %user.id, "Stored user in memory");

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }

    async fn find_by_cpf(&self, cpf: &Cpf) -> Result<Option<User>, UserError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.cpf == *cpf).cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users.values().cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(result)
    }

    async fn update(&self, id: &UserId, changes: UserChanges) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if let Some(cpf) = &changes.cpf {
            if cpf_taken(&users, cpf, Some(id)) {
                return Err(UserError::CpfAlreadyExists(cpf.to_string()));
            }
        }

        let user = users
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        user.apply(changes);

        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        users
            .remove(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }
}
