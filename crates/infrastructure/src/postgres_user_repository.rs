//! PostgreSQL-backed user repository.

use async_trait::async_trait;
use sqlx::PgPool;

use folio_application::UserRepository;
use folio_core::{AppResult, UserId};
use folio_domain::UserRecord;

use crate::sql::internal;

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    display_name: String,
    password_hash: String,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            username: row.username,
            display_name: row.display_name,
            password_hash: row.password_hash,
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, display_name, password_hash
            FROM "_user"
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal(format!("failed to find user '{username}'")))?;

        Ok(row.map(UserRecord::from))
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, display_name, password_hash
            FROM "_user"
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(internal(format!("failed to find user {user_id}")))?;

        Ok(row.map(UserRecord::from))
    }

    async fn upsert_user(
        &self,
        username: &str,
        display_name: &str,
        password_hash: &str,
    ) -> AppResult<UserId> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO "_user" (username, display_name, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (username) DO UPDATE
            SET password_hash = EXCLUDED.password_hash,
                modified = now()
            RETURNING id
            "#,
        )
        .bind(username)
        .bind(display_name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(internal(format!("failed to upsert user '{username}'")))?;

        Ok(UserId::new(id))
    }
}
