use async_trait::async_trait;
use folio_core::AppResult;
use folio_domain::{DbType, FieldMetadata, SqlIdentifier, TableMetadata};

/// Column definition applied by schema DDL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Declared storage type.
    pub db_type: DbType,
    /// Whether the column is `NOT NULL`.
    pub required: bool,
    /// Literal column default.
    pub default_value: Option<String>,
}

impl From<&FieldMetadata> for ColumnSpec {
    fn from(field: &FieldMetadata) -> Self {
        Self {
            db_type: field.db_type().clone(),
            required: field.is_required(),
            default_value: field.default_value().map(ToOwned::to_owned),
        }
    }
}

/// Secondary index that references a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndex {
    /// Index name.
    pub name: String,
    /// Full `CREATE INDEX` statement used to recreate the index.
    pub definition: String,
}

/// DDL primitives executed inside an open storage transaction.
#[async_trait]
pub trait SchemaTransaction: Send {
    /// Creates a storage table carrying only the management columns.
    async fn create_table(&mut self, table: &SqlIdentifier) -> AppResult<()>;

    /// Drops a storage table.
    async fn drop_table(&mut self, table: &SqlIdentifier) -> AppResult<()>;

    /// Adds a column.
    async fn add_column(
        &mut self,
        table: &SqlIdentifier,
        column: &SqlIdentifier,
        spec: &ColumnSpec,
    ) -> AppResult<()>;

    /// Drops a column; indexes on it go with it.
    async fn drop_column(&mut self, table: &SqlIdentifier, column: &SqlIdentifier)
    -> AppResult<()>;

    /// Changes the declared type of a column, converting existing values.
    async fn alter_column_type(
        &mut self,
        table: &SqlIdentifier,
        column: &SqlIdentifier,
        db_type: &DbType,
    ) -> AppResult<()>;

    /// Sets or clears `NOT NULL`.
    async fn set_column_required(
        &mut self,
        table: &SqlIdentifier,
        column: &SqlIdentifier,
        required: bool,
    ) -> AppResult<()>;

    /// Sets or drops the column default.
    async fn set_column_default(
        &mut self,
        table: &SqlIdentifier,
        column: &SqlIdentifier,
        default_value: Option<&str>,
    ) -> AppResult<()>;

    /// Lists non-primary-key indexes that reference the column.
    async fn column_indexes(
        &mut self,
        table: &SqlIdentifier,
        column: &SqlIdentifier,
    ) -> AppResult<Vec<ColumnIndex>>;

    /// Drops an index.
    async fn drop_index(&mut self, index: &ColumnIndex) -> AppResult<()>;

    /// Recreates a previously dropped index from its definition.
    async fn create_index(&mut self, index: &ColumnIndex) -> AppResult<()>;
}

/// Metadata writes, only reachable inside a transaction.
///
/// Dropping the transaction without calling [`MetadataTransaction::commit`]
/// rolls back every metadata write and every DDL statement issued through it.
#[async_trait]
pub trait MetadataTransaction: SchemaTransaction {
    /// Loads table metadata, locking the row for the rest of the transaction.
    async fn find_table(&mut self, table_name: &str) -> AppResult<Option<TableMetadata>>;

    /// Inserts table metadata.
    async fn insert_table(&mut self, table: &TableMetadata) -> AppResult<()>;

    /// Updates display name, description and group-sets. Returns whether a row matched.
    async fn update_table(&mut self, table: &TableMetadata) -> AppResult<bool>;

    /// Deletes table metadata. Returns whether a row matched.
    async fn delete_table(&mut self, table_name: &str) -> AppResult<bool>;

    /// Loads field metadata, locking the row for the rest of the transaction.
    async fn find_field(
        &mut self,
        table_name: &str,
        field_name: &str,
    ) -> AppResult<Option<FieldMetadata>>;

    /// Inserts field metadata.
    async fn insert_field(&mut self, field: &FieldMetadata) -> AppResult<()>;

    /// Updates field metadata. Returns whether a row matched.
    async fn update_field(&mut self, field: &FieldMetadata) -> AppResult<bool>;

    /// Deletes field metadata. Returns whether a row matched.
    async fn delete_field(&mut self, table_name: &str, field_name: &str) -> AppResult<bool>;

    /// Deletes every field metadata row of a table. Returns the number removed.
    async fn delete_fields_for_table(&mut self, table_name: &str) -> AppResult<u64>;

    /// Commits every write issued through this transaction.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// Repository port for table and field metadata.
#[async_trait]
pub trait MetadataRepository: Send + Sync {
    /// Opens a transaction for metadata writes and schema changes.
    async fn begin(&self) -> AppResult<Box<dyn MetadataTransaction>>;

    /// Finds table metadata by table name.
    async fn find_table(&self, table_name: &str) -> AppResult<Option<TableMetadata>>;

    /// Lists all table metadata ordered by table name.
    async fn list_tables(&self) -> AppResult<Vec<TableMetadata>>;

    /// Finds field metadata.
    async fn find_field(
        &self,
        table_name: &str,
        field_name: &str,
    ) -> AppResult<Option<FieldMetadata>>;

    /// Lists field metadata of a table ordered by form position, then field name.
    async fn list_fields(&self, table_name: &str) -> AppResult<Vec<FieldMetadata>>;
}
