//! PostgreSQL implementation of RoleExtensionRepository
//!
//! `COALESCE($2, <default>)` on insert and `COALESCE($2, <stored>)` on
//! conflict: a missing attribute never overwrites what is already stored.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use cinema_core::traits::{RepoResult, RoleExtensionRepository};
use cinema_core::{
    DomainError, RoleExtension, UserId, DEFAULT_ADMIN_LEVEL, DEFAULT_LOYALTY_POINTS,
    DEFAULT_STAFF_DEPT,
};

use super::error::map_db_error;

/// PostgreSQL implementation of RoleExtensionRepository
#[derive(Clone)]
pub struct PgRoleExtensionRepository {
    pool: PgPool,
}

impl PgRoleExtensionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn points_from_db(points: i64) -> RepoResult<u32> {
    u32::try_from(points)
        .map_err(|_| DomainError::DatabaseError(format!("loyalty_points out of range: {points}")))
}

#[async_trait]
impl RoleExtensionRepository for PgRoleExtensionRepository {
    #[instrument(skip(self))]
    async fn upsert_admin(&self, user_id: UserId, level: Option<&str>) -> RepoResult<RoleExtension> {
        let level = sqlx::query_scalar::<_, String>(
            r"
            INSERT INTO admin_roles (user_id, level)
            VALUES ($1, COALESCE($2::TEXT, $3))
            ON CONFLICT (user_id) DO UPDATE SET level = COALESCE($2::TEXT, admin_roles.level)
            RETURNING level
            ",
        )
        .bind(user_id.into_inner())
        .bind(level)
        .bind(DEFAULT_ADMIN_LEVEL)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(RoleExtension::Admin { level })
    }

    #[instrument(skip(self))]
    async fn upsert_staff(&self, user_id: UserId, dept: Option<&str>) -> RepoResult<RoleExtension> {
        let dept = sqlx::query_scalar::<_, String>(
            r"
            INSERT INTO staff_roles (user_id, dept)
            VALUES ($1, COALESCE($2::TEXT, $3))
            ON CONFLICT (user_id) DO UPDATE SET dept = COALESCE($2::TEXT, staff_roles.dept)
            RETURNING dept
            ",
        )
        .bind(user_id.into_inner())
        .bind(dept)
        .bind(DEFAULT_STAFF_DEPT)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(RoleExtension::Staff { dept })
    }

    #[instrument(skip(self))]
    async fn upsert_customer(
        &self,
        user_id: UserId,
        loyalty_points: Option<u32>,
    ) -> RepoResult<RoleExtension> {
        let points = sqlx::query_scalar::<_, i64>(
            r"
            INSERT INTO customer_roles (user_id, loyalty_points)
            VALUES ($1, COALESCE($2::BIGINT, $3))
            ON CONFLICT (user_id)
                DO UPDATE SET loyalty_points = COALESCE($2::BIGINT, customer_roles.loyalty_points)
            RETURNING loyalty_points
            ",
        )
        .bind(user_id.into_inner())
        .bind(loyalty_points.map(i64::from))
        .bind(i64::from(DEFAULT_LOYALTY_POINTS))
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(RoleExtension::Customer {
            loyalty_points: points_from_db(points)?,
        })
    }

    #[instrument(skip(self))]
    async fn get_admin_level(&self, user_id: UserId) -> RepoResult<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT level FROM admin_roles WHERE user_id = $1")
            .bind(user_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn get_staff_dept(&self, user_id: UserId) -> RepoResult<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT dept FROM staff_roles WHERE user_id = $1")
            .bind(user_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn get_customer_points(&self, user_id: UserId) -> RepoResult<Option<u32>> {
        sqlx::query_scalar::<_, i64>("SELECT loyalty_points FROM customer_roles WHERE user_id = $1")
            .bind(user_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .map(points_from_db)
            .transpose()
    }
}
