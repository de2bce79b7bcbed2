use async_trait::async_trait;
use folio_application::{ColumnIndex, ColumnSpec, MetadataTransaction, SchemaTransaction};
use folio_core::{AppError, AppResult};
use folio_domain::{DbType, FieldMetadata, SqlIdentifier, TableMetadata};
use sqlx::{FromRow, Postgres, Transaction};
use tracing::info;

use super::{FIELD_COLUMNS, FieldRow, TABLE_COLUMNS, TableRow};
use crate::sql::{internal, is_unique_violation, quote_identifier, quote_literal, schema_conflict};

/// Metadata and DDL work scoped to one PostgreSQL transaction.
///
/// Dropping it without [`MetadataTransaction::commit`] rolls everything back.
pub struct PostgresMetadataTransaction {
    transaction: Transaction<'static, Postgres>,
}

impl PostgresMetadataTransaction {
    pub(super) fn new(transaction: Transaction<'static, Postgres>) -> Self {
        Self { transaction }
    }

    async fn execute_ddl(&mut self, statement: &str, context: &str) -> AppResult<()> {
        info!(statement, "executing schema change");
        sqlx::query(statement)
            .execute(&mut *self.transaction)
            .await
            .map_err(schema_conflict(context))?;
        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct IndexRow {
    name: String,
    definition: String,
}

fn column_definition(column: &SqlIdentifier, spec: &ColumnSpec) -> String {
    let mut definition = format!("{} {}", column.quoted(), spec.db_type);
    if spec.required {
        definition.push_str(" NOT NULL");
    }
    if let Some(default_value) = &spec.default_value {
        definition.push_str(" DEFAULT ");
        definition.push_str(quote_literal(default_value).as_str());
    }

    definition
}

#[async_trait]
impl SchemaTransaction for PostgresMetadataTransaction {
    async fn create_table(&mut self, table: &SqlIdentifier) -> AppResult<()> {
        let statement = format!(
            "CREATE TABLE {} (\
                id BIGSERIAL PRIMARY KEY, \
                created TIMESTAMPTZ NOT NULL DEFAULT now(), \
                modified TIMESTAMPTZ NOT NULL DEFAULT now(), \
                read_groups TEXT NULL, \
                write_groups TEXT NULL\
            )",
            table.quoted()
        );
        self.execute_ddl(&statement, &format!("failed to create table '{table}'"))
            .await
    }

    async fn drop_table(&mut self, table: &SqlIdentifier) -> AppResult<()> {
        let statement = format!("DROP TABLE {}", table.quoted());
        self.execute_ddl(&statement, &format!("failed to drop table '{table}'"))
            .await
    }

    async fn add_column(
        &mut self,
        table: &SqlIdentifier,
        column: &SqlIdentifier,
        spec: &ColumnSpec,
    ) -> AppResult<()> {
        let statement = format!(
            "ALTER TABLE {} ADD COLUMN {}",
            table.quoted(),
            column_definition(column, spec)
        );
        self.execute_ddl(
            &statement,
            &format!("failed to add column '{column}' to table '{table}'"),
        )
        .await
    }

    async fn drop_column(&mut self, table: &SqlIdentifier, column: &SqlIdentifier) -> AppResult<()> {
        let statement = format!(
            "ALTER TABLE {} DROP COLUMN {}",
            table.quoted(),
            column.quoted()
        );
        self.execute_ddl(
            &statement,
            &format!("failed to drop column '{column}' from table '{table}'"),
        )
        .await
    }

    async fn alter_column_type(
        &mut self,
        table: &SqlIdentifier,
        column: &SqlIdentifier,
        db_type: &DbType,
    ) -> AppResult<()> {
        let statement = format!(
            "ALTER TABLE {table_name} ALTER COLUMN {column_name} TYPE {db_type} USING {column_name}::{db_type}",
            table_name = table.quoted(),
            column_name = column.quoted(),
        );
        self.execute_ddl(
            &statement,
            &format!("failed to change type of column '{column}' in table '{table}' to {db_type}"),
        )
        .await
    }

    async fn set_column_required(
        &mut self,
        table: &SqlIdentifier,
        column: &SqlIdentifier,
        required: bool,
    ) -> AppResult<()> {
        let action = if required { "SET NOT NULL" } else { "DROP NOT NULL" };
        let statement = format!(
            "ALTER TABLE {} ALTER COLUMN {} {action}",
            table.quoted(),
            column.quoted()
        );
        self.execute_ddl(
            &statement,
            &format!("failed to change nullability of column '{column}' in table '{table}'"),
        )
        .await
    }

    async fn set_column_default(
        &mut self,
        table: &SqlIdentifier,
        column: &SqlIdentifier,
        default_value: Option<&str>,
    ) -> AppResult<()> {
        let action = match default_value {
            Some(value) => format!("SET DEFAULT {}", quote_literal(value)),
            None => "DROP DEFAULT".to_owned(),
        };
        let statement = format!(
            "ALTER TABLE {} ALTER COLUMN {} {action}",
            table.quoted(),
            column.quoted()
        );
        self.execute_ddl(
            &statement,
            &format!("failed to change default of column '{column}' in table '{table}'"),
        )
        .await
    }

    async fn column_indexes(
        &mut self,
        table: &SqlIdentifier,
        column: &SqlIdentifier,
    ) -> AppResult<Vec<ColumnIndex>> {
        // Constraint-backed indexes are rebuilt by the type change itself.
        let rows = sqlx::query_as::<_, IndexRow>(
            r#"
            SELECT index_class.relname::text AS name, pg_get_indexdef(idx.indexrelid) AS definition
            FROM pg_index idx
            JOIN pg_class index_class ON index_class.oid = idx.indexrelid
            JOIN pg_class table_class ON table_class.oid = idx.indrelid
            JOIN pg_namespace table_namespace ON table_namespace.oid = table_class.relnamespace
            JOIN pg_attribute attribute
                ON attribute.attrelid = table_class.oid
                AND attribute.attnum = ANY (idx.indkey)
            WHERE table_namespace.nspname = current_schema()
              AND table_class.relname = $1
              AND attribute.attname = $2
              AND NOT idx.indisprimary
              AND NOT EXISTS (
                  SELECT 1 FROM pg_constraint constraint_entry
                  WHERE constraint_entry.conindid = idx.indexrelid
              )
            ORDER BY index_class.relname
            "#,
        )
        .bind(table.as_str())
        .bind(column.as_str())
        .fetch_all(&mut *self.transaction)
        .await
        .map_err(internal(format!(
            "failed to list indexes on column '{column}' of table '{table}'"
        )))?;

        Ok(rows
            .into_iter()
            .map(|row| ColumnIndex {
                name: row.name,
                definition: row.definition,
            })
            .collect())
    }

    async fn drop_index(&mut self, index: &ColumnIndex) -> AppResult<()> {
        let statement = format!("DROP INDEX {}", quote_identifier(index.name.as_str()));
        self.execute_ddl(&statement, &format!("failed to drop index '{}'", index.name))
            .await
    }

    async fn create_index(&mut self, index: &ColumnIndex) -> AppResult<()> {
        self.execute_ddl(
            index.definition.as_str(),
            &format!("failed to recreate index '{}'", index.name),
        )
        .await
    }
}

#[async_trait]
impl MetadataTransaction for PostgresMetadataTransaction {
    async fn find_table(&mut self, table_name: &str) -> AppResult<Option<TableMetadata>> {
        let statement = format!(
            "SELECT {TABLE_COLUMNS} FROM \"_table\" WHERE table_name = $1 FOR UPDATE"
        );
        sqlx::query_as::<_, TableRow>(statement.as_str())
            .bind(table_name)
            .fetch_optional(&mut *self.transaction)
            .await
            .map_err(internal(format!(
                "failed to find table metadata '{table_name}'"
            )))?
            .map(TableMetadata::try_from)
            .transpose()
    }

    async fn insert_table(&mut self, table: &TableMetadata) -> AppResult<()> {
        let table_name = table.table_name().as_str();
        let result = sqlx::query(
            r#"
            INSERT INTO "_table" (table_name, display_name, description, read_groups, write_groups)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(table_name)
        .bind(table.display_name().as_str())
        .bind(table.description())
        .bind(table.read_groups().to_storage())
        .bind(table.write_groups().to_storage())
        .execute(&mut *self.transaction)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(error) if is_unique_violation(&error) => Err(AppError::Conflict(format!(
                "table '{table_name}' already exists"
            ))),
            Err(error) => Err(AppError::Internal(format!(
                "failed to insert table metadata '{table_name}': {error}"
            ))),
        }
    }

    async fn update_table(&mut self, table: &TableMetadata) -> AppResult<bool> {
        let table_name = table.table_name().as_str();
        let result = sqlx::query(
            r#"
            UPDATE "_table"
            SET display_name = $2,
                description = $3,
                read_groups = $4,
                write_groups = $5,
                modified = now()
            WHERE table_name = $1
            "#,
        )
        .bind(table_name)
        .bind(table.display_name().as_str())
        .bind(table.description())
        .bind(table.read_groups().to_storage())
        .bind(table.write_groups().to_storage())
        .execute(&mut *self.transaction)
        .await
        .map_err(internal(format!(
            "failed to update table metadata '{table_name}'"
        )))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_table(&mut self, table_name: &str) -> AppResult<bool> {
        let result = sqlx::query(r#"DELETE FROM "_table" WHERE table_name = $1"#)
            .bind(table_name)
            .execute(&mut *self.transaction)
            .await
            .map_err(internal(format!(
                "failed to delete table metadata '{table_name}'"
            )))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_field(
        &mut self,
        table_name: &str,
        field_name: &str,
    ) -> AppResult<Option<FieldMetadata>> {
        let statement = format!(
            "SELECT {FIELD_COLUMNS} FROM \"_field\" \
             WHERE table_name = $1 AND field_name = $2 FOR UPDATE"
        );
        sqlx::query_as::<_, FieldRow>(statement.as_str())
            .bind(table_name)
            .bind(field_name)
            .fetch_optional(&mut *self.transaction)
            .await
            .map_err(internal(format!(
                "failed to find field metadata '{table_name}.{field_name}'"
            )))?
            .map(FieldMetadata::try_from)
            .transpose()
    }

    async fn insert_field(&mut self, field: &FieldMetadata) -> AppResult<()> {
        let table_name = field.table_name().as_str();
        let field_name = field.field_name().as_str();
        let result = sqlx::query(
            r#"
            INSERT INTO "_field" (
                table_name, field_name, display_name, description, db_type, widget,
                form_position, list_position, is_required, is_read_only,
                default_value, validation_rule
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(table_name)
        .bind(field_name)
        .bind(field.display_name().as_str())
        .bind(field.description())
        .bind(field.db_type().as_str())
        .bind(field.widget().as_str())
        .bind(field.form_position())
        .bind(field.list_position())
        .bind(field.is_required())
        .bind(field.is_read_only())
        .bind(field.default_value())
        .bind(field.validation_rule())
        .execute(&mut *self.transaction)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(error) if is_unique_violation(&error) => Err(AppError::Conflict(format!(
                "field '{field_name}' already exists on table '{table_name}'"
            ))),
            Err(error) => Err(AppError::Internal(format!(
                "failed to insert field metadata '{table_name}.{field_name}': {error}"
            ))),
        }
    }

    async fn update_field(&mut self, field: &FieldMetadata) -> AppResult<bool> {
        let table_name = field.table_name().as_str();
        let field_name = field.field_name().as_str();
        let result = sqlx::query(
            r#"
            UPDATE "_field"
            SET display_name = $3,
                description = $4,
                db_type = $5,
                widget = $6,
                form_position = $7,
                list_position = $8,
                is_required = $9,
                is_read_only = $10,
                default_value = $11,
                validation_rule = $12,
                modified = now()
            WHERE table_name = $1 AND field_name = $2
            "#,
        )
        .bind(table_name)
        .bind(field_name)
        .bind(field.display_name().as_str())
        .bind(field.description())
        .bind(field.db_type().as_str())
        .bind(field.widget().as_str())
        .bind(field.form_position())
        .bind(field.list_position())
        .bind(field.is_required())
        .bind(field.is_read_only())
        .bind(field.default_value())
        .bind(field.validation_rule())
        .execute(&mut *self.transaction)
        .await
        .map_err(internal(format!(
            "failed to update field metadata '{table_name}.{field_name}'"
        )))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_field(&mut self, table_name: &str, field_name: &str) -> AppResult<bool> {
        let result =
            sqlx::query(r#"DELETE FROM "_field" WHERE table_name = $1 AND field_name = $2"#)
                .bind(table_name)
                .bind(field_name)
                .execute(&mut *self.transaction)
                .await
                .map_err(internal(format!(
                    "failed to delete field metadata '{table_name}.{field_name}'"
                )))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_fields_for_table(&mut self, table_name: &str) -> AppResult<u64> {
        let result = sqlx::query(r#"DELETE FROM "_field" WHERE table_name = $1"#)
            .bind(table_name)
            .execute(&mut *self.transaction)
            .await
            .map_err(internal(format!(
                "failed to delete field metadata of table '{table_name}'"
            )))?;

        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.transaction
            .commit()
            .await
            .map_err(internal("failed to commit metadata transaction"))
    }
}
