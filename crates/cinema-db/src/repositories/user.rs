//! PostgreSQL implementation of UserRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use cinema_core::traits::{RepoResult, UserRepository};
use cinema_core::{User, UserId};

use crate::mappers::UserWrite;
use crate::models::UserModel;

use super::error::{identity_conflict, map_db_error, map_unique_violation, user_not_found};

const USER_COLUMNS: &str = "id, name, phone_number, email, password_hash, external_id, \
                            role_id, is_verified, created_at, updated_at";

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one_by(&self, column: &'static str, value: &str) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        sqlx::query_as::<_, UserModel>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .map(User::try_from)
            .transpose()
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .map(User::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_phone(&self, phone: &str) -> RepoResult<Option<User>> {
        self.find_one_by("phone_number", phone).await
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.find_one_by("email", email).await
    }

    #[instrument(skip(self))]
    async fn find_by_external_id(&self, external_id: &str) -> RepoResult<Option<User>> {
        self.find_one_by("external_id", external_id).await
    }

    #[instrument(skip(self, user), fields(role = %user.role))]
    async fn insert(&self, user: &User) -> RepoResult<UserId> {
        let row = UserWrite::new(user);
        let id = sqlx::query_scalar::<_, i64>(
            r"
            INSERT INTO users (name, phone_number, email, password_hash, external_id,
                               role_id, is_verified, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            ",
        )
        .bind(row.name)
        .bind(row.phone_number)
        .bind(row.email)
        .bind(row.password_hash)
        .bind(row.external_id)
        .bind(row.role_id)
        .bind(row.is_verified)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, identity_conflict))?;

        Ok(UserId::new(id))
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, user: &User) -> RepoResult<()> {
        let row = UserWrite::new(user);
        let result = sqlx::query(
            r"
            UPDATE users
            SET name = $2, phone_number = $3, email = $4, password_hash = $5,
                external_id = $6, role_id = $7, is_verified = $8, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(user.id.into_inner())
        .bind(row.name)
        .bind(row.phone_number)
        .bind(row.email)
        .bind(row.password_hash)
        .bind(row.external_id)
        .bind(row.role_id)
        .bind(row.is_verified)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, identity_conflict))?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(user.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> RepoResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, UserModel>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?
            .into_iter()
            .map(User::try_from)
            .collect()
    }
}
