use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgConnection;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::models::Address;
use crate::domain::user::models::Cpf;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserStatus;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const CPF_UNIQUE_CONSTRAINT: &str = "users_cpf_key";

const SELECT_USER: &str = r#"
    SELECT u.id, u.cpf, u.name, u.birthdate, u.password_hash, u.status,
           u.created_at, u.created_by, u.updated_at, u.updated_by,
           u.removed_at, u.removed_by,
           a.street, a.number, a.complement, a.neighborhood, a.city, a.state, a.zip_code
    FROM users u
    LEFT JOIN addresses a ON a.user_id = u.id
"#;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    cpf: String,
    name: String,
    birthdate: DateTime<Utc>,
    password_hash: String,
    status: String,
    created_at: DateTime<Utc>,
    created_by: String,
    updated_at: DateTime<Utc>,
    updated_by: Option<String>,
    removed_at: Option<DateTime<Utc>>,
    removed_by: Option<String>,
    street: Option<String>,
    number: Option<String>,
    complement: Option<String>,
    neighborhood: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let address = match (r.street, r.number, r.neighborhood, r.city, r.state, r.zip_code) {
            (
                Some(street),
                Some(number),
                Some(neighborhood),
                Some(city),
                Some(state),
                Some(zip_code),
            ) => Some(Address {
                street,
                number,
                complement: r.complement,
                neighborhood,
                city,
                state,
                zip_code,
            }),
            _ => None,
        };

        Ok(User {
            id: UserId(r.id),
            cpf: Cpf::new(r.cpf)?,
            name: PersonName::new(r.name)?,
            birthdate: r.birthdate,
            password_hash: r.password_hash,
            status: status_from_db(&r.status)?,
            created_at: r.created_at,
            created_by: r.created_by,
            updated_at: r.updated_at,
            updated_by: r.updated_by,
            removed_at: r.removed_at,
            removed_by: r.removed_by,
            address,
        })
    }
}

fn status_to_db(status: UserStatus) -> &'static str {
    match status {
        UserStatus::Active => "active",
        UserStatus::Removed => "removed",
    }
}

fn status_from_db(status: &str) -> Result<UserStatus, UserError> {
    match status {
        "active" => Ok(UserStatus::Active),
        "removed" => Ok(UserStatus::Removed),
        other => Err(UserError::DatabaseError(format!(
            "Unknown user status in storage: {}",
            other
        ))),
    }
}

fn map_write_error(e: sqlx::Error, cpf: Option<&Cpf>) -> UserError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some(CPF_UNIQUE_CONSTRAINT) {
            return UserError::CpfAlreadyExists(
                cpf.map(|c| c.to_string()).unwrap_or_default(),
            );
        }
    }
    UserError::DatabaseError(e.to_string())
}

async fn fetch_by_id(conn: &mut PgConnection, id: &UserId) -> Result<Option<User>, UserError> {
    let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE u.id = $1", SELECT_USER))
        .bind(id.0)
        .fetch_optional(conn)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

    row.map(User::try_from).transpose()
}

async fn upsert_address(
    conn: &mut PgConnection,
    id: &UserId,
    address: &Address,
) -> Result<(), UserError> {
    sqlx::query(
        r#"
        INSERT INTO addresses (user_id, street, number, complement,
                               neighborhood, city, state, zip_code)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id) DO UPDATE
        SET street = EXCLUDED.street,
            number = EXCLUDED.number,
            complement = EXCLUDED.complement,
            neighborhood = EXCLUDED.neighborhood,
            city = EXCLUDED.city,
            state = EXCLUDED.state,
            zip_code = EXCLUDED.zip_code
        "#,
    )
    .bind(id.0)
    .bind(&address.street)
    .bind(&address.number)
    .bind(&address.complement)
    .bind(&address.neighborhood)
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.zip_code)
    .execute(conn)
    .await
    .map_err(|e| UserError::DatabaseError(e.to_string()))?;

    Ok(())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO users (id, cpf, name, birthdate, password_hash, status,
                               created_at, created_by, updated_at, updated_by,
                               removed_at, removed_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.id.0)
        .bind(user.cpf.as_str())
        .bind(user.name.as_str())
        .bind(user.birthdate)
        .bind(&user.password_hash)
        .bind(status_to_db(user.status))
        .bind(user.created_at)
        .bind(&user.created_by)
        .bind(user.updated_at)
        .bind(&user.updated_by)
        .bind(user.removed_at)
        .bind(&user.removed_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, Some(&user.cpf)))?;

        if let Some(address) = &user.address {
            upsert_address(&mut tx, &user.id, address).await?;
        }

        tx.commit()
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        fetch_by_id(&mut conn, id).await
    }

    async fn find_by_cpf(&self, cpf: &Cpf) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE u.cpf = $1", SELECT_USER))
            .bind(cpf.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let rows =
            sqlx::query_as::<_, UserRow>(&format!("{} ORDER BY u.created_at DESC", SELECT_USER))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn update(&self, id: &UserId, changes: UserChanges) -> Result<User, UserError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET cpf = COALESCE($2, cpf),
                name = COALESCE($3, name),
                birthdate = COALESCE($4, birthdate),
                password_hash = COALESCE($5, password_hash),
                status = COALESCE($6, status),
                updated_at = COALESCE($7, updated_at),
                updated_by = COALESCE($8, updated_by),
                removed_at = COALESCE($9, removed_at),
                removed_by = COALESCE($10, removed_by)
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(changes.cpf.as_ref().map(|c| c.as_str()))
        .bind(changes.name.as_ref().map(|n| n.as_str()))
        .bind(changes.birthdate)
        .bind(&changes.password_hash)
        .bind(changes.status.map(status_to_db))
        .bind(changes.updated_at)
        .bind(&changes.updated_by)
        .bind(changes.removed_at)
        .bind(&changes.removed_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, changes.cpf.as_ref()))?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        if let Some(address) = &changes.address {
            upsert_address(&mut tx, id, address).await?;
        }

        let user = fetch_by_id(&mut tx, id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(user)
    }

    async fn delete(&self, id: &UserId) -> Result<User, UserError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        let user = fetch_by_id(&mut tx, id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .execute(&mut *tx)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(user)
    }
}
