use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_application::RowRepository;
use folio_core::{AppError, AppResult};
use folio_domain::{CellValue, ID_FIELD, Row, RowData, SqlIdentifier};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row as _};
use tracing::warn;

use crate::sql::{internal, is_unique_violation, quote_identifier};

/// PostgreSQL-backed generic row repository.
///
/// Column names and types come from the catalog on every call, so rows of
/// any managed table can be read and written without compiled-in schemas.
///
/// Values are cast to the unsized column type and then assigned, so length and
/// precision limits are enforced by the column instead of silently truncating.
#[derive(Clone)]
pub struct PostgresRowRepository {
    pool: PgPool,
}

impl PostgresRowRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn columns(&self, table: &SqlIdentifier) -> AppResult<Vec<ColumnRow>> {
        let columns = sqlx::query_as::<_, ColumnRow>(
            r#"
            SELECT attribute.attname::text AS name,
                   format_type(attribute.atttypid, NULL) AS sql_type
            FROM pg_attribute attribute
            JOIN pg_class table_class ON table_class.oid = attribute.attrelid
            JOIN pg_namespace table_namespace ON table_namespace.oid = table_class.relnamespace
            WHERE table_namespace.nspname = current_schema()
              AND table_class.relname = $1
              AND table_class.relkind = 'r'
              AND attribute.attnum > 0
              AND NOT attribute.attisdropped
            ORDER BY attribute.attnum
            "#,
        )
        .bind(table.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(internal(format!("failed to read columns of table '{table}'")))?;

        if columns.is_empty() {
            return Err(AppError::NotFound(format!(
                "table '{table}' does not exist"
            )));
        }

        Ok(columns)
    }

    fn push_select(builder: &mut QueryBuilder<'_, Postgres>, table: &SqlIdentifier, columns: &[ColumnRow]) {
        builder.push("SELECT ");
        for (index, column) in columns.iter().enumerate() {
            if index > 0 {
                builder.push(", ");
            }
            builder.push(ColumnKind::of(column).select_expression(column.name.as_str()));
        }
        builder.push(" FROM ");
        builder.push(table.quoted());
    }

    async fn fetch_rows(
        &self,
        mut builder: QueryBuilder<'_, Postgres>,
        table: &SqlIdentifier,
        columns: &[ColumnRow],
    ) -> AppResult<Vec<Row>> {
        builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(internal(format!("failed to read rows of table '{table}'")))?
            .iter()
            .map(|row| decode_row(row, table, columns))
            .collect()
    }
}

#[derive(Debug, FromRow)]
struct ColumnRow {
    name: String,
    sql_type: String,
}

/// How a column is projected and decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Bool,
    Float,
    Timestamp,
    LocalTimestamp,
    Text,
}

impl ColumnKind {
    fn of(column: &ColumnRow) -> Self {
        match column.sql_type.as_str() {
            "bigint" | "integer" | "smallint" => Self::Int,
            "boolean" => Self::Bool,
            "double precision" | "real" => Self::Float,
            "timestamp with time zone" => Self::Timestamp,
            sql_type if sql_type.starts_with("timestamp") => Self::LocalTimestamp,
            _ => Self::Text,
        }
    }

    fn select_expression(self, column: &str) -> String {
        let quoted = quote_identifier(column);
        match self {
            Self::Int => format!("{quoted}::bigint AS {quoted}"),
            Self::Bool => quoted,
            Self::Float => format!("{quoted}::float8 AS {quoted}"),
            Self::Timestamp => quoted,
            Self::LocalTimestamp => format!("({quoted} AT TIME ZONE 'UTC') AS {quoted}"),
            Self::Text => format!("{quoted}::text AS {quoted}"),
        }
    }

    fn decode(self, row: &PgRow, column: &str) -> Result<CellValue, sqlx::Error> {
        let value = match self {
            Self::Int => row.try_get::<Option<i64>, _>(column)?.map(CellValue::Int),
            Self::Bool => row.try_get::<Option<bool>, _>(column)?.map(CellValue::Bool),
            Self::Float => row.try_get::<Option<f64>, _>(column)?.map(CellValue::Float),
            Self::Timestamp | Self::LocalTimestamp => row
                .try_get::<Option<DateTime<Utc>>, _>(column)?
                .map(CellValue::Timestamp),
            Self::Text => row.try_get::<Option<String>, _>(column)?.map(CellValue::Text),
        };

        Ok(value.unwrap_or(CellValue::Null))
    }
}

fn decode_row(row: &PgRow, table: &SqlIdentifier, columns: &[ColumnRow]) -> AppResult<Row> {
    let mut values = RowData::new();
    for column in columns {
        let value = ColumnKind::of(column)
            .decode(row, column.name.as_str())
            .map_err(internal(format!(
                "failed to decode column '{}' of table '{table}'",
                column.name
            )))?;
        values.insert(column.name.clone(), value);
    }

    let Some(CellValue::Int(id)) = values.get(ID_FIELD).cloned() else {
        return Err(AppError::Internal(format!(
            "table '{table}' has no integer primary key column"
        )));
    };

    Ok(Row::new(id, values))
}

fn column_type<'a>(
    columns: &'a [ColumnRow],
    table: &SqlIdentifier,
    name: &str,
) -> AppResult<&'a str> {
    columns
        .iter()
        .find(|column| column.name == name)
        .map(|column| column.sql_type.as_str())
        .ok_or_else(|| AppError::Validation(format!("table '{table}' has no column '{name}'")))
}

fn write_error(table: &SqlIdentifier) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |error| {
        if is_unique_violation(&error) {
            warn!(table = %table, error = %error, "row write hit a unique constraint");
            return AppError::Conflict(format!(
                "row violates a unique constraint of table '{table}'"
            ));
        }

        let rejected_value = matches!(&error, sqlx::Error::Database(database_error)
            if database_error.code().is_some_and(|code| code.starts_with("22") || code == "23502"));
        if rejected_value {
            warn!(table = %table, error = %error, "row write rejected by storage");
            return AppError::Validation(format!("value rejected by table '{table}'"));
        }

        AppError::Internal(format!("failed to write row of table '{table}': {error}"))
    }
}

#[async_trait]
impl RowRepository for PostgresRowRepository {
    async fn list_rows(
        &self,
        table: &SqlIdentifier,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Row>> {
        let columns = self.columns(table).await?;
        let mut builder = QueryBuilder::new("");
        Self::push_select(&mut builder, table, &columns);
        builder.push(" ORDER BY id LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        self.fetch_rows(builder, table, &columns).await
    }

    async fn count_rows(&self, table: &SqlIdentifier) -> AppResult<i64> {
        self.columns(table).await?;
        let statement = format!("SELECT COUNT(*) FROM {}", table.quoted());
        sqlx::query_scalar::<_, i64>(statement.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(internal(format!("failed to count rows of table '{table}'")))
    }

    async fn find_row(&self, table: &SqlIdentifier, id: i64) -> AppResult<Option<Row>> {
        let columns = self.columns(table).await?;
        let mut builder = QueryBuilder::new("");
        Self::push_select(&mut builder, table, &columns);
        builder.push(" WHERE id = ");
        builder.push_bind(id);

        Ok(self.fetch_rows(builder, table, &columns).await?.into_iter().next())
    }

    async fn insert_row(&self, table: &SqlIdentifier, data: &RowData) -> AppResult<Row> {
        let columns = self.columns(table).await?;
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("INSERT INTO ");
        builder.push(table.quoted());

        if data.is_empty() {
            builder.push(" DEFAULT VALUES");
        } else {
            builder.push(" (");
            for (index, name) in data.keys().enumerate() {
                column_type(&columns, table, name)?;
                if index > 0 {
                    builder.push(", ");
                }
                builder.push(quote_identifier(name));
            }
            builder.push(") VALUES (");
            for (index, (name, value)) in data.iter().enumerate() {
                if index > 0 {
                    builder.push(", ");
                }
                builder.push("CAST(");
                builder.push_bind(value.to_storage_text());
                builder.push(format!(" AS {})", column_type(&columns, table, name)?));
            }
            builder.push(")");
        }
        builder.push(" RETURNING id");

        let id = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(write_error(table))?;

        self.find_row(table, id).await?.ok_or_else(|| {
            AppError::Internal(format!("inserted row {id} of table '{table}' vanished"))
        })
    }

    async fn update_row(
        &self,
        table: &SqlIdentifier,
        id: i64,
        data: &RowData,
    ) -> AppResult<Option<Row>> {
        if data.is_empty() {
            return self.find_row(table, id).await;
        }

        let columns = self.columns(table).await?;
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("UPDATE ");
        builder.push(table.quoted());
        builder.push(" SET ");
        for (index, (name, value)) in data.iter().enumerate() {
            let sql_type = column_type(&columns, table, name)?;
            if index > 0 {
                builder.push(", ");
            }
            builder.push(quote_identifier(name));
            builder.push(" = CAST(");
            builder.push_bind(value.to_storage_text());
            builder.push(format!(" AS {sql_type})"));
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING id");

        let updated = builder
            .build_query_scalar::<i64>()
            .fetch_optional(&self.pool)
            .await
            .map_err(write_error(table))?;

        match updated {
            Some(id) => self.find_row(table, id).await,
            None => Ok(None),
        }
    }

    async fn delete_row(&self, table: &SqlIdentifier, id: i64) -> AppResult<bool> {
        let statement = format!("DELETE FROM {} WHERE id = $1", table.quoted());
        let result = sqlx::query(statement.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(internal(format!("failed to delete row {id} of table '{table}'")))?;

        Ok(result.rows_affected() > 0)
    }
}
