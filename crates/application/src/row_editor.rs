use std::sync::Arc;

use chrono::{DateTime, Utc};
use folio_core::{AppError, AppResult};
use folio_domain::{
    CREATED_FIELD, CellValue, GroupSet, ID_FIELD, MODIFIED_FIELD, READ_GROUPS_FIELD, Row,
    RowData, RowPage, SqlIdentifier, WRITE_GROUPS_FIELD,
};

use crate::RowRepository;

/// Largest accepted page size for row listings.
pub const MAX_PAGE_SIZE: u32 = 500;

/// Metadata-agnostic CRUD over rows of any managed table.
///
/// Performs no permission checks; callers gate access first.
#[derive(Clone)]
pub struct RowEditor {
    repository: Arc<dyn RowRepository>,
}

impl RowEditor {
    /// Creates a row editor from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn RowRepository>) -> Self {
        Self { repository }
    }

    /// Lists one 1-based page of rows ordered by primary key.
    pub async fn list_rows(
        &self,
        table: &SqlIdentifier,
        page: u32,
        page_size: u32,
    ) -> AppResult<RowPage> {
        if page < 1 {
            return Err(AppError::Validation(
                "page index starts at 1".to_owned(),
            ));
        }
        if page_size < 1 {
            return Err(AppError::Validation(
                "page size must be at least 1".to_owned(),
            ));
        }

        let page_size = page_size.min(MAX_PAGE_SIZE);
        let offset = i64::from(page - 1) * i64::from(page_size);
        let rows = self
            .repository
            .list_rows(table, i64::from(page_size), offset)
            .await?;
        let total = self.repository.count_rows(table).await?;

        Ok(RowPage {
            rows,
            total,
            page,
            page_size,
        })
    }

    /// Returns one row.
    pub async fn get_row(&self, table: &SqlIdentifier, id: i64) -> AppResult<Row> {
        self.repository
            .find_row(table, id)
            .await?
            .ok_or_else(|| row_not_found(table, id))
    }

    /// Inserts a row. Any `id` key is ignored; storage assigns it.
    pub async fn create_row(&self, table: &SqlIdentifier, data: RowData) -> AppResult<Row> {
        let data = prepare_insert(data)?;
        self.repository.insert_row(table, &data).await
    }

    /// Updates a row, forcing `modified` to the current time.
    pub async fn update_row(&self, table: &SqlIdentifier, id: i64, data: RowData) -> AppResult<Row> {
        let data = prepare_update(data, Utc::now())?;
        self.repository
            .update_row(table, id, &data)
            .await?
            .ok_or_else(|| row_not_found(table, id))
    }

    /// Deletes a row.
    pub async fn delete_row(&self, table: &SqlIdentifier, id: i64) -> AppResult<()> {
        if self.repository.delete_row(table, id).await? {
            return Ok(());
        }

        Err(row_not_found(table, id))
    }
}

/// Normalizes an insert payload: drops `id` and blank timestamps so storage
/// defaults apply, and stores group-sets in canonical form.
pub fn prepare_insert(mut data: RowData) -> AppResult<RowData> {
    data.remove(ID_FIELD);
    drop_blank(&mut data, CREATED_FIELD);
    drop_blank(&mut data, MODIFIED_FIELD);
    normalize_group_sets(&mut data)?;
    validate_columns(&data)?;
    Ok(data)
}

/// Normalizes an update payload: drops `id` and a blank `created`, and sets
/// `modified` to `now` whatever the caller supplied.
pub fn prepare_update(mut data: RowData, now: DateTime<Utc>) -> AppResult<RowData> {
    data.remove(ID_FIELD);
    drop_blank(&mut data, CREATED_FIELD);
    data.insert(MODIFIED_FIELD.to_owned(), CellValue::Timestamp(now));
    normalize_group_sets(&mut data)?;
    validate_columns(&data)?;
    Ok(data)
}

fn drop_blank(data: &mut RowData, column: &str) {
    if data.get(column).is_some_and(CellValue::is_blank) {
        data.remove(column);
    }
}

fn normalize_group_sets(data: &mut RowData) -> AppResult<()> {
    for column in [READ_GROUPS_FIELD, WRITE_GROUPS_FIELD] {
        let Some(value) = data.get_mut(column) else {
            continue;
        };

        let groups = match &*value {
            CellValue::Null => GroupSet::open(),
            CellValue::Text(serialized) => GroupSet::parse(Some(serialized.as_str()))?,
            other => {
                return Err(AppError::Validation(format!(
                    "'{column}' must be a JSON array of group names, got {}",
                    other.to_json()
                )));
            }
        };
        *value = groups
            .to_storage()
            .map_or(CellValue::Null, CellValue::Text);
    }

    Ok(())
}

fn validate_columns(data: &RowData) -> AppResult<()> {
    for column in data.keys() {
        SqlIdentifier::new(column.as_str())?;
    }

    Ok(())
}

fn row_not_found(table: &SqlIdentifier, id: i64) -> AppError {
    AppError::NotFound(format!("row {id} does not exist in table '{table}'"))
}
