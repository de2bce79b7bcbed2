mod transaction;

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_application::{MetadataRepository, MetadataTransaction};
use folio_core::{AppError, AppResult};
use folio_domain::{FieldMetadata, GroupSet, TableMetadata, Timestamps, WidgetKind};
use sqlx::{FromRow, PgPool};

use crate::sql::internal;

pub use transaction::PostgresMetadataTransaction;

const TABLE_COLUMNS: &str = "table_name, display_name, description, read_groups, write_groups, created, modified";

const FIELD_COLUMNS: &str = "table_name, field_name, display_name, description, db_type, widget, \
    form_position, list_position, is_required, is_read_only, default_value, validation_rule, \
    created, modified";

/// PostgreSQL-backed table and field metadata repository.
#[derive(Clone)]
pub struct PostgresMetadataRepository {
    pool: PgPool,
}

impl PostgresMetadataRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TableRow {
    table_name: String,
    display_name: String,
    description: String,
    read_groups: Option<String>,
    write_groups: Option<String>,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
}

impl TryFrom<TableRow> for TableMetadata {
    type Error = AppError;

    fn try_from(row: TableRow) -> Result<Self, Self::Error> {
        let read_groups = GroupSet::parse(row.read_groups.as_deref())?;
        let write_groups = GroupSet::parse(row.write_groups.as_deref())?;
        let table = TableMetadata::new(row.table_name.as_str(), row.display_name).map_err(|error| {
            AppError::Internal(format!(
                "persisted table metadata '{}' is invalid: {error}",
                row.table_name
            ))
        })?;

        Ok(table
            .with_description(row.description)
            .with_groups(read_groups, write_groups)
            .with_timestamps(Timestamps {
                created: row.created,
                modified: row.modified,
            }))
    }
}

#[derive(Debug, FromRow)]
struct FieldRow {
    table_name: String,
    field_name: String,
    display_name: String,
    description: String,
    db_type: String,
    widget: String,
    form_position: i32,
    list_position: i32,
    is_required: bool,
    is_read_only: bool,
    default_value: Option<String>,
    validation_rule: Option<String>,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
}

impl TryFrom<FieldRow> for FieldMetadata {
    type Error = AppError;

    fn try_from(row: FieldRow) -> Result<Self, Self::Error> {
        let invalid = |error: AppError| {
            AppError::Internal(format!(
                "persisted field metadata '{}.{}' is invalid: {error}",
                row.table_name, row.field_name
            ))
        };

        let widget = WidgetKind::from_str(row.widget.as_str()).map_err(invalid)?;
        let field = FieldMetadata::new(
            row.table_name.as_str(),
            row.field_name.as_str(),
            row.display_name.as_str(),
            row.db_type.as_str(),
        )
        .map_err(invalid)?;

        Ok(field
            .with_description(row.description)
            .with_widget(widget)
            .with_positions(row.form_position, row.list_position)
            .with_flags(row.is_required, row.is_read_only)
            .with_default_value(row.default_value)
            .with_validation_rule(row.validation_rule)
            .with_timestamps(Timestamps {
                created: row.created,
                modified: row.modified,
            }))
    }
}

#[async_trait]
impl MetadataRepository for PostgresMetadataRepository {
    async fn begin(&self) -> AppResult<Box<dyn MetadataTransaction>> {
        let transaction = self
            .pool
            .begin()
            .await
            .map_err(internal("failed to begin metadata transaction"))?;

        Ok(Box::new(PostgresMetadataTransaction::new(transaction)))
    }

    async fn find_table(&self, table_name: &str) -> AppResult<Option<TableMetadata>> {
        let statement = format!("SELECT {TABLE_COLUMNS} FROM \"_table\" WHERE table_name = $1");
        sqlx::query_as::<_, TableRow>(statement.as_str())
            .bind(table_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal(format!(
                "failed to find table metadata '{table_name}'"
            )))?
            .map(TableMetadata::try_from)
            .transpose()
    }

    async fn list_tables(&self) -> AppResult<Vec<TableMetadata>> {
        let statement = format!("SELECT {TABLE_COLUMNS} FROM \"_table\" ORDER BY table_name");
        sqlx::query_as::<_, TableRow>(statement.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(internal("failed to list table metadata"))?
            .into_iter()
            .map(TableMetadata::try_from)
            .collect()
    }

    async fn find_field(
        &self,
        table_name: &str,
        field_name: &str,
    ) -> AppResult<Option<FieldMetadata>> {
        let statement = format!(
            "SELECT {FIELD_COLUMNS} FROM \"_field\" WHERE table_name = $1 AND field_name = $2"
        );
        sqlx::query_as::<_, FieldRow>(statement.as_str())
            .bind(table_name)
            .bind(field_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal(format!(
                "failed to find field metadata '{table_name}.{field_name}'"
            )))?
            .map(FieldMetadata::try_from)
            .transpose()
    }

    async fn list_fields(&self, table_name: &str) -> AppResult<Vec<FieldMetadata>> {
        let statement = format!(
            "SELECT {FIELD_COLUMNS} FROM \"_field\" WHERE table_name = $1 \
             ORDER BY form_position, field_name"
        );
        sqlx::query_as::<_, FieldRow>(statement.as_str())
            .bind(table_name)
            .fetch_all(&self.pool)
            .await
            .map_err(internal(format!(
                "failed to list field metadata for table '{table_name}'"
            )))?
            .into_iter()
            .map(FieldMetadata::try_from)
            .collect()
    }
}
