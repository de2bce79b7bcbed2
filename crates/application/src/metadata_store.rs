use std::sync::Arc;

use folio_core::{AppError, AppResult};
use folio_domain::{FieldMetadata, SqlIdentifier, TableMetadata, is_management_field, is_system_table};
use tracing::debug;

use crate::{MetadataRepository, SchemaSynchronizer};

/// CRUD over table and field metadata.
///
/// Writes that affect storage columns run the schema synchronizer in the
/// same transaction as the metadata write, so both land or neither does.
#[derive(Clone)]
pub struct MetadataStore {
    repository: Arc<dyn MetadataRepository>,
    synchronizer: SchemaSynchronizer,
}

impl MetadataStore {
    /// Creates a metadata store from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn MetadataRepository>) -> Self {
        Self {
            repository,
            synchronizer: SchemaSynchronizer::new(),
        }
    }

    /// Returns metadata for one table.
    pub async fn get_table_metadata(&self, table_name: &str) -> AppResult<TableMetadata> {
        self.repository
            .find_table(table_name)
            .await?
            .ok_or_else(|| table_not_found(table_name))
    }

    /// Lists metadata for every managed table.
    pub async fn list_table_metadata(&self) -> AppResult<Vec<TableMetadata>> {
        self.repository.list_tables().await
    }

    /// Returns metadata for one field.
    pub async fn get_field_metadata(
        &self,
        table_name: &str,
        field_name: &str,
    ) -> AppResult<FieldMetadata> {
        self.repository
            .find_field(table_name, field_name)
            .await?
            .ok_or_else(|| field_not_found(table_name, field_name))
    }

    /// Lists field metadata of an existing table.
    pub async fn list_field_metadata(&self, table_name: &str) -> AppResult<Vec<FieldMetadata>> {
        self.get_table_metadata(table_name).await?;
        self.repository.list_fields(table_name).await
    }

    /// Registers a table and creates its storage table.
    pub async fn create_table(&self, table: TableMetadata) -> AppResult<TableMetadata> {
        let table_name = table.table_name().as_str();
        if is_system_table(table_name) {
            return Err(AppError::Validation(format!(
                "table name '{table_name}' is reserved"
            )));
        }

        let mut transaction = self.repository.begin().await?;
        if transaction.find_table(table_name).await?.is_some() {
            return Err(AppError::Conflict(format!("table '{table_name}' already exists")));
        }

        transaction.insert_table(&table).await?;
        self.synchronizer
            .create_table(transaction.as_mut(), table.table_name())
            .await?;
        transaction.commit().await?;

        self.get_table_metadata(table_name).await
    }

    /// Updates display name, description and group-sets. Never touches schema.
    pub async fn update_table_metadata(&self, table: TableMetadata) -> AppResult<TableMetadata> {
        let table_name = table.table_name().as_str();
        let mut transaction = self.repository.begin().await?;
        if !transaction.update_table(&table).await? {
            return Err(table_not_found(table_name));
        }
        transaction.commit().await?;

        self.get_table_metadata(table_name).await
    }

    /// Deletes a table's field metadata, table metadata and storage table.
    pub async fn delete_table_metadata(&self, table_name: &str) -> AppResult<()> {
        if is_system_table(table_name) {
            return Err(AppError::Validation(format!(
                "system table '{table_name}' cannot be deleted"
            )));
        }

        let table = SqlIdentifier::new(table_name)?;
        let mut transaction = self.repository.begin().await?;
        if transaction.find_table(table_name).await?.is_none() {
            return Err(table_not_found(table_name));
        }

        transaction.delete_fields_for_table(table_name).await?;
        transaction.delete_table(table_name).await?;
        self.synchronizer
            .drop_table(transaction.as_mut(), &table)
            .await?;
        transaction.commit().await
    }

    /// Persists field metadata and adds the storage column.
    ///
    /// Management fields are skipped without error.
    pub async fn create_field_metadata(&self, field: FieldMetadata) -> AppResult<()> {
        if skip_management_field(&field) {
            return Ok(());
        }

        let table_name = field.table_name().as_str();
        let mut transaction = self.repository.begin().await?;
        if transaction.find_table(table_name).await?.is_none() {
            return Err(table_not_found(table_name));
        }

        transaction.insert_field(&field).await?;
        self.synchronizer
            .add_column(transaction.as_mut(), &field)
            .await?;
        transaction.commit().await
    }

    /// Updates field metadata and alters the storage column when its type,
    /// required flag or default changed.
    ///
    /// Management fields are skipped without error.
    pub async fn update_field_metadata(&self, field: FieldMetadata) -> AppResult<()> {
        if skip_management_field(&field) {
            return Ok(());
        }

        let table_name = field.table_name().as_str();
        let field_name = field.field_name().as_str();
        let mut transaction = self.repository.begin().await?;
        let previous = transaction
            .find_field(table_name, field_name)
            .await?
            .ok_or_else(|| field_not_found(table_name, field_name))?;

        transaction.update_field(&field).await?;
        if field.schema_differs_from(&previous) {
            self.synchronizer
                .alter_column(transaction.as_mut(), &previous, &field)
                .await?;
        }
        transaction.commit().await
    }

    /// Deletes field metadata and drops the storage column.
    ///
    /// Management fields are skipped without error.
    pub async fn delete_field_metadata(&self, table_name: &str, field_name: &str) -> AppResult<()> {
        if is_management_field(field_name) {
            debug!(table = table_name, field = field_name, "management field delete skipped");
            return Ok(());
        }

        let table = SqlIdentifier::new(table_name)?;
        let column = SqlIdentifier::new(field_name)?;
        let mut transaction = self.repository.begin().await?;
        if !transaction.delete_field(table_name, field_name).await? {
            return Err(field_not_found(table_name, field_name));
        }

        self.synchronizer
            .drop_column(transaction.as_mut(), &table, &column)
            .await?;
        transaction.commit().await
    }
}

fn skip_management_field(field: &FieldMetadata) -> bool {
    let skip = is_management_field(field.field_name().as_str());
    if skip {
        debug!(
            table = %field.table_name(),
            field = %field.field_name(),
            "management field metadata write skipped"
        );
    }

    skip
}

fn table_not_found(table_name: &str) -> AppError {
    AppError::NotFound(format!("table '{table_name}' does not exist"))
}

fn field_not_found(table_name: &str, field_name: &str) -> AppError {
    AppError::NotFound(format!(
        "field '{field_name}' does not exist on table '{table_name}'"
    ))
}
