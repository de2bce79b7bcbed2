mod forms;

use folio_core::{AppError, AppResult, Identity};
use folio_domain::{
    EditForm, FIELD_METADATA_TABLE, FieldMetadata, FormMode, ListView, Row, RowData, RowPage,
    RowSelector, SqlIdentifier, TABLE_METADATA_TABLE, TableMetadata, is_metadata_table,
};

use crate::{Access, MetadataStore, PermissionEvaluator, RowEditor};

pub use forms::{build_edit_form, build_list_columns};

/// Access-gated entry point for table, field and row operations.
///
/// Every call checks the caller's identity against table and row group-sets
/// before delegating to the metadata store or the row editor.
#[derive(Clone)]
pub struct ContentService {
    metadata: MetadataStore,
    rows: RowEditor,
    permissions: PermissionEvaluator,
}

impl ContentService {
    /// Creates the content service.
    #[must_use]
    pub fn new(metadata: MetadataStore, rows: RowEditor, permissions: PermissionEvaluator) -> Self {
        Self {
            metadata,
            rows,
            permissions,
        }
    }

    /// Returns the permission evaluator used by this service.
    #[must_use]
    pub fn permissions(&self) -> &PermissionEvaluator {
        &self.permissions
    }

    /// Lists the tables the identity may read. Unreadable tables are omitted.
    pub async fn list_tables(&self, identity: &Identity) -> AppResult<Vec<TableMetadata>> {
        let mut visible = Vec::new();
        for table in self.metadata.list_table_metadata().await? {
            if self.permissions.can_read(identity, table.read_groups()).await? {
                visible.push(table);
            }
        }

        Ok(visible)
    }

    /// Returns table metadata the identity may read.
    pub async fn table(&self, identity: &Identity, table_name: &str) -> AppResult<TableMetadata> {
        self.readable_table(identity, table_name).await
    }

    /// Lists field metadata of a table the identity may read.
    pub async fn list_fields(
        &self,
        identity: &Identity,
        table_name: &str,
    ) -> AppResult<Vec<FieldMetadata>> {
        self.readable_table(identity, table_name).await?;
        self.metadata.list_field_metadata(table_name).await
    }

    /// Returns field metadata of a table the identity may read.
    pub async fn field(
        &self,
        identity: &Identity,
        table_name: &str,
        field_name: &str,
    ) -> AppResult<FieldMetadata> {
        self.readable_table(identity, table_name).await?;
        self.metadata.get_field_metadata(table_name, field_name).await
    }

    /// Registers a new table.
    pub async fn create_table(
        &self,
        identity: &Identity,
        table: TableMetadata,
    ) -> AppResult<TableMetadata> {
        self.require_metadata_write(identity, TABLE_METADATA_TABLE).await?;
        self.metadata.create_table(table).await
    }

    /// Updates table display metadata and group-sets.
    pub async fn update_table(
        &self,
        identity: &Identity,
        table: TableMetadata,
    ) -> AppResult<TableMetadata> {
        self.require_metadata_write(identity, TABLE_METADATA_TABLE).await?;
        self.metadata.update_table_metadata(table).await
    }

    /// Deletes a table together with its fields and storage.
    pub async fn delete_table(&self, identity: &Identity, table_name: &str) -> AppResult<()> {
        self.require_metadata_write(identity, TABLE_METADATA_TABLE).await?;
        self.metadata.delete_table_metadata(table_name).await
    }

    /// Creates field metadata and its storage column.
    pub async fn create_field(&self, identity: &Identity, field: FieldMetadata) -> AppResult<()> {
        self.require_metadata_write(identity, FIELD_METADATA_TABLE).await?;
        self.metadata.create_field_metadata(field).await
    }

    /// Updates field metadata, altering the storage column when needed.
    pub async fn update_field(&self, identity: &Identity, field: FieldMetadata) -> AppResult<()> {
        self.require_metadata_write(identity, FIELD_METADATA_TABLE).await?;
        self.metadata.update_field_metadata(field).await
    }

    /// Deletes field metadata and its storage column.
    pub async fn delete_field(
        &self,
        identity: &Identity,
        table_name: &str,
        field_name: &str,
    ) -> AppResult<()> {
        self.require_metadata_write(identity, FIELD_METADATA_TABLE).await?;
        self.metadata
            .delete_field_metadata(table_name, field_name)
            .await
    }

    /// Lists a page of rows, omitting rows whose own read groups deny the identity.
    ///
    /// `total` keeps reporting the unfiltered row count of the table.
    pub async fn list_rows(
        &self,
        identity: &Identity,
        table_name: &str,
        page: u32,
        page_size: u32,
    ) -> AppResult<RowPage> {
        let table = row_table(table_name)?;
        self.readable_table(identity, table_name).await?;

        let mut listed = self.rows.list_rows(&table, page, page_size).await?;
        let mut visible = Vec::with_capacity(listed.rows.len());
        for row in listed.rows {
            if self.permissions.can_read(identity, &row.read_groups()?).await? {
                visible.push(row);
            }
        }
        listed.rows = visible;

        Ok(listed)
    }

    /// Returns one row when both table and row are readable.
    pub async fn get_row(&self, identity: &Identity, table_name: &str, id: i64) -> AppResult<Row> {
        let table = row_table(table_name)?;
        self.readable_table(identity, table_name).await?;

        let row = self.rows.get_row(&table, id).await?;
        self.permissions
            .require(identity, Access::Read, &row.read_groups()?, &row_resource(&table, id))
            .await?;

        Ok(row)
    }

    /// Inserts a row into a writable table.
    pub async fn create_row(
        &self,
        identity: &Identity,
        table_name: &str,
        data: RowData,
    ) -> AppResult<Row> {
        let table = row_table(table_name)?;
        self.writable_table(identity, table_name).await?;
        self.rows.create_row(&table, data).await
    }

    /// Updates a row when both table and row are writable.
    ///
    /// Supplying a value for a read-only field is rejected.
    pub async fn update_row(
        &self,
        identity: &Identity,
        table_name: &str,
        id: i64,
        data: RowData,
    ) -> AppResult<Row> {
        let table = row_table(table_name)?;
        self.writable_table(identity, table_name).await?;
        self.writable_row(identity, &table, id).await?;

        let fields = self.metadata.list_field_metadata(table_name).await?;
        if let Some(field) = fields
            .iter()
            .find(|field| field.is_read_only() && data.contains_key(field.field_name().as_str()))
        {
            return Err(AppError::Validation(format!(
                "field '{}' of table '{table_name}' is read-only",
                field.field_name()
            )));
        }

        self.rows.update_row(&table, id, data).await
    }

    /// Deletes a row when both table and row are writable.
    pub async fn delete_row(&self, identity: &Identity, table_name: &str, id: i64) -> AppResult<()> {
        let table = row_table(table_name)?;
        self.writable_table(identity, table_name).await?;
        self.writable_row(identity, &table, id).await?;
        self.rows.delete_row(&table, id).await
    }

    /// Builds the edit form for a new or existing row.
    ///
    /// A blank form requires table write access; an existing row requires read
    /// access to the table and the row.
    pub async fn edit_form(
        &self,
        identity: &Identity,
        table_name: &str,
        selector: RowSelector,
        mode: FormMode,
    ) -> AppResult<EditForm> {
        let row = match selector {
            RowSelector::New => {
                row_table(table_name)?;
                self.writable_table(identity, table_name).await?;
                None
            }
            RowSelector::Existing(id) => Some(self.get_row(identity, table_name, id).await?),
        };

        let fields = self.metadata.list_field_metadata(table_name).await?;
        Ok(build_edit_form(table_name, &fields, row.as_ref(), mode))
    }

    /// Builds the tabular listing of a table.
    pub async fn list_view(
        &self,
        identity: &Identity,
        table_name: &str,
        page: u32,
        page_size: u32,
    ) -> AppResult<ListView> {
        let page = self.list_rows(identity, table_name, page, page_size).await?;
        let fields = self.metadata.list_field_metadata(table_name).await?;

        Ok(ListView {
            table_name: table_name.to_owned(),
            columns: build_list_columns(&fields),
            page,
        })
    }

    async fn readable_table(&self, identity: &Identity, table_name: &str) -> AppResult<TableMetadata> {
        let table = self.metadata.get_table_metadata(table_name).await?;
        self.permissions
            .require(identity, Access::Read, table.read_groups(), table_name)
            .await?;
        Ok(table)
    }

    async fn writable_table(&self, identity: &Identity, table_name: &str) -> AppResult<TableMetadata> {
        let table = self.metadata.get_table_metadata(table_name).await?;
        self.permissions
            .require(identity, Access::Write, table.write_groups(), table_name)
            .await?;
        Ok(table)
    }

    async fn writable_row(&self, identity: &Identity, table: &SqlIdentifier, id: i64) -> AppResult<()> {
        let row = self.rows.get_row(table, id).await?;
        self.permissions
            .require(identity, Access::Write, &row.write_groups()?, &row_resource(table, id))
            .await
    }

    async fn require_metadata_write(&self, identity: &Identity, metadata_table: &str) -> AppResult<()> {
        self.writable_table(identity, metadata_table).await.map(|_| ())
    }
}

fn row_table(table_name: &str) -> AppResult<SqlIdentifier> {
    if is_metadata_table(table_name) {
        return Err(AppError::Validation(format!(
            "rows of '{table_name}' are managed through table and field metadata"
        )));
    }

    SqlIdentifier::new(table_name)
}

fn row_resource(table: &SqlIdentifier, id: i64) -> String {
    format!("{table}#{id}")
}
