use async_trait::async_trait;
use folio_application::GroupMembershipRepository;
use folio_core::{AppError, AppResult, UserId};
use folio_domain::{Group, GroupName};
use sqlx::{FromRow, PgPool};

use crate::sql::internal;

/// PostgreSQL-backed group and membership repository.
///
/// Memberships live in `_user_group`; `everyone` is never stored there.
#[derive(Clone)]
pub struct PostgresGroupMembershipRepository {
    pool: PgPool,
}

impl PostgresGroupMembershipRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct GroupRow {
    name: String,
    description: String,
}

fn persisted_group_name(name: String) -> AppResult<GroupName> {
    GroupName::new(name.as_str()).map_err(|error| {
        AppError::Internal(format!("persisted group name '{name}' is invalid: {error}"))
    })
}

#[async_trait]
impl GroupMembershipRepository for PostgresGroupMembershipRepository {
    async fn is_member(&self, user_id: UserId, group: &GroupName) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM "_user_group"
                WHERE user_id = $1 AND group_name = $2
            )
            "#,
        )
        .bind(user_id.as_i64())
        .bind(group.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(internal(format!(
            "failed to check membership of user {user_id} in group '{group}'"
        )))
    }

    async fn groups_for_user(&self, user_id: UserId) -> AppResult<Vec<GroupName>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT group_name FROM "_user_group"
            WHERE user_id = $1
            ORDER BY group_name
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(internal(format!("failed to list groups of user {user_id}")))?
        .into_iter()
        .map(persisted_group_name)
        .collect()
    }

    async fn list_groups(&self) -> AppResult<Vec<Group>> {
        sqlx::query_as::<_, GroupRow>(r#"SELECT name, description FROM "_group" ORDER BY name"#)
            .fetch_all(&self.pool)
            .await
            .map_err(internal("failed to list groups"))?
            .into_iter()
            .map(|row| Ok(Group::new(persisted_group_name(row.name)?, row.description)))
            .collect()
    }

    async fn add_member(&self, user_id: UserId, group: &GroupName) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO "_user_group" (user_id, group_name)
            VALUES ($1, $2)
            ON CONFLICT (user_id, group_name) DO NOTHING
            "#,
        )
        .bind(user_id.as_i64())
        .bind(group.as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(database_error))
                if database_error.is_foreign_key_violation() =>
            {
                Err(AppError::NotFound(format!(
                    "user {user_id} or group '{group}' does not exist"
                )))
            }
            Err(error) => Err(AppError::Internal(format!(
                "failed to add user {user_id} to group '{group}': {error}"
            ))),
        }
    }
}
