use async_trait::async_trait;
use folio_core::AppResult;
use folio_domain::{Page, Row, RowData, SqlIdentifier};

/// Repository port for generic row access on any managed table.
#[async_trait]
pub trait RowRepository: Send + Sync {
    /// Lists rows ordered by primary key.
    async fn list_rows(
        &self,
        table: &SqlIdentifier,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Row>>;

    /// Counts every row of the table.
    async fn count_rows(&self, table: &SqlIdentifier) -> AppResult<i64>;

    /// Finds a row by primary key.
    async fn find_row(&self, table: &SqlIdentifier, id: i64) -> AppResult<Option<Row>>;

    /// Inserts a row; keys map 1:1 to columns. Returns the stored row.
    async fn insert_row(&self, table: &SqlIdentifier, data: &RowData) -> AppResult<Row>;

    /// Updates the listed columns of a row. Returns `None` when the row does not exist.
    async fn update_row(
        &self,
        table: &SqlIdentifier,
        id: i64,
        data: &RowData,
    ) -> AppResult<Option<Row>>;

    /// Deletes a row. Returns whether a row matched.
    async fn delete_row(&self, table: &SqlIdentifier, id: i64) -> AppResult<bool>;
}

/// Repository port for content pages.
#[async_trait]
pub trait PageRepository: Send + Sync {
    /// Finds a page by slug.
    async fn find_page(&self, slug: &str) -> AppResult<Option<Page>>;
}
