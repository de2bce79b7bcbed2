use async_trait::async_trait;
use folio_application::PageRepository;
use folio_core::{AppError, AppResult};
use folio_domain::{GroupSet, Page};
use sqlx::{FromRow, PgPool};

use crate::sql::internal;

/// PostgreSQL-backed content page repository.
#[derive(Clone)]
pub struct PostgresPageRepository {
    pool: PgPool,
}

impl PostgresPageRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PageRow {
    slug: String,
    title: String,
    body: String,
    read_groups: Option<String>,
}

#[async_trait]
impl PageRepository for PostgresPageRepository {
    async fn find_page(&self, slug: &str) -> AppResult<Option<Page>> {
        let row = sqlx::query_as::<_, PageRow>(
            r#"SELECT slug, title, body, read_groups FROM "_page" WHERE slug = $1"#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal(format!("failed to find page '{slug}'")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let read_groups = GroupSet::parse(row.read_groups.as_deref())?;
        Page::new(row.slug, row.title, row.body, read_groups)
            .map(Some)
            .map_err(|error| AppError::Internal(format!("persisted page '{slug}' is invalid: {error}")))
    }
}
