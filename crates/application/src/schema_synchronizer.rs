use folio_core::AppResult;
use folio_domain::{FieldMetadata, SqlIdentifier, is_management_field};
use tracing::{debug, info};

use crate::{ColumnSpec, SchemaTransaction};

/// Keeps storage column definitions in line with field metadata.
///
/// Every operation runs inside the caller's transaction and skips the
/// management columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaSynchronizer;

impl SchemaSynchronizer {
    /// Creates a synchronizer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Creates the storage table for a newly registered table.
    pub async fn create_table<T>(&self, transaction: &mut T, table: &SqlIdentifier) -> AppResult<()>
    where
        T: SchemaTransaction + ?Sized,
    {
        info!(table = %table, "creating storage table");
        transaction.create_table(table).await
    }

    /// Drops the storage table of a deleted table.
    pub async fn drop_table<T>(&self, transaction: &mut T, table: &SqlIdentifier) -> AppResult<()>
    where
        T: SchemaTransaction + ?Sized,
    {
        info!(table = %table, "dropping storage table");
        transaction.drop_table(table).await
    }

    /// Adds the column described by the field metadata.
    pub async fn add_column<T>(&self, transaction: &mut T, field: &FieldMetadata) -> AppResult<()>
    where
        T: SchemaTransaction + ?Sized,
    {
        if skip_management_field(field.table_name(), field.field_name()) {
            return Ok(());
        }

        info!(
            table = %field.table_name(),
            column = %field.field_name(),
            db_type = %field.db_type(),
            "adding column"
        );
        transaction
            .add_column(field.table_name(), field.field_name(), &ColumnSpec::from(field))
            .await
    }

    /// Moves a column from the `previous` definition to the `next` one.
    ///
    /// On a type change, indexes on the column are dropped first and recreated
    /// afterward, unless the new type is large-text/blob class, in which case
    /// they stay dropped.
    pub async fn alter_column<T>(
        &self,
        transaction: &mut T,
        previous: &FieldMetadata,
        next: &FieldMetadata,
    ) -> AppResult<()>
    where
        T: SchemaTransaction + ?Sized,
    {
        let table = next.table_name();
        let column = next.field_name();
        if skip_management_field(table, column) {
            return Ok(());
        }

        let type_changed = previous.db_type() != next.db_type();
        let default_dropped = type_changed && previous.default_value().is_some();

        if type_changed {
            if default_dropped {
                transaction.set_column_default(table, column, None).await?;
            }

            let indexes = transaction.column_indexes(table, column).await?;
            for index in &indexes {
                info!(table = %table, column = %column, index = %index.name, "dropping index before type change");
                transaction.drop_index(index).await?;
            }

            info!(
                table = %table,
                column = %column,
                from = %previous.db_type(),
                to = %next.db_type(),
                "changing column type"
            );
            transaction
                .alter_column_type(table, column, next.db_type())
                .await?;

            if next.db_type().is_large_text() {
                for index in &indexes {
                    info!(index = %index.name, db_type = %next.db_type(), "index not recreated on large-text column");
                }
            } else {
                for index in &indexes {
                    info!(table = %table, column = %column, index = %index.name, "recreating index");
                    transaction.create_index(index).await?;
                }
            }
        }

        if default_dropped || previous.default_value() != next.default_value() {
            transaction
                .set_column_default(table, column, next.default_value())
                .await?;
        }

        if previous.is_required() != next.is_required() {
            transaction
                .set_column_required(table, column, next.is_required())
                .await?;
        }

        Ok(())
    }

    /// Drops a column. Indexes on it are removed by storage.
    pub async fn drop_column<T>(
        &self,
        transaction: &mut T,
        table: &SqlIdentifier,
        column: &SqlIdentifier,
    ) -> AppResult<()>
    where
        T: SchemaTransaction + ?Sized,
    {
        if skip_management_field(table, column) {
            return Ok(());
        }

        info!(table = %table, column = %column, "dropping column");
        transaction.drop_column(table, column).await
    }
}

fn skip_management_field(table: &SqlIdentifier, column: &SqlIdentifier) -> bool {
    let skip = is_management_field(column.as_str());
    if skip {
        debug!(table = %table, column = %column, "management column left untouched");
    }

    skip
}
