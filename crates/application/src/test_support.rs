//! In-memory fakes shared by application service tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use folio_core::{AppError, AppResult, UserId};
use folio_domain::{
    CellValue, DbType, FieldMetadata, Group, GroupName, Row, RowData, SqlIdentifier,
    TableMetadata, is_management_field,
};
use tokio::sync::Mutex;

use crate::{
    ColumnIndex, ColumnSpec, GroupMembershipRepository, MetadataRepository, MetadataTransaction,
    RowRepository, SchemaTransaction,
};

const KNOWN_TYPES: [&str; 16] = [
    "VARCHAR", "CHAR", "TEXT", "INT", "INTEGER", "BIGINT", "SMALLINT", "BOOLEAN", "TIMESTAMP",
    "TIMESTAMPTZ", "DATE", "NUMERIC", "BYTEA", "LONGTEXT", "BLOB", "REAL",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FakeIndex {
    pub table: String,
    pub column: String,
    pub definition: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeState {
    pub tables: BTreeMap<String, TableMetadata>,
    pub fields: BTreeMap<(String, String), FieldMetadata>,
    pub columns: BTreeMap<String, BTreeMap<String, ColumnSpec>>,
    pub indexes: BTreeMap<String, FakeIndex>,
    pub rows: BTreeMap<String, BTreeMap<i64, RowData>>,
    pub ddl_log: Vec<String>,
}

impl FakeState {
    pub fn column(&self, table: &str, column: &str) -> Option<&ColumnSpec> {
        self.columns.get(table).and_then(|columns| columns.get(column))
    }

    fn columns_mut(&mut self, table: &SqlIdentifier) -> AppResult<&mut BTreeMap<String, ColumnSpec>> {
        self.columns.get_mut(table.as_str()).ok_or_else(|| {
            AppError::SchemaConflict(format!("relation '{table}' does not exist"))
        })
    }

    fn column_mut(&mut self, table: &SqlIdentifier, column: &SqlIdentifier) -> AppResult<&mut ColumnSpec> {
        self.columns_mut(table)?.get_mut(column.as_str()).ok_or_else(|| {
            AppError::SchemaConflict(format!("column '{column}' of '{table}' does not exist"))
        })
    }
}

fn management_columns() -> BTreeMap<String, ColumnSpec> {
    let spec = |db_type: &str, required: bool, default_value: Option<&str>| ColumnSpec {
        db_type: DbType::new(db_type).unwrap_or_else(|_| unreachable!()),
        required,
        default_value: default_value.map(ToOwned::to_owned),
    };

    BTreeMap::from([
        ("id".to_owned(), spec("BIGINT", true, None)),
        ("created".to_owned(), spec("TIMESTAMPTZ", true, Some("now()"))),
        ("modified".to_owned(), spec("TIMESTAMPTZ", true, Some("now()"))),
        ("read_groups".to_owned(), spec("TEXT", false, None)),
        ("write_groups".to_owned(), spec("TEXT", false, None)),
    ])
}

/// Shared in-memory storage exposing every repository port.
#[derive(Clone, Default)]
pub(crate) struct FakeStorage {
    pub state: Arc<Mutex<FakeState>>,
    pub memberships: Arc<Mutex<HashMap<i64, Vec<String>>>>,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers table metadata and a storage table without going through a service.
    pub async fn seed_table(&self, table: TableMetadata) {
        let mut state = self.state.lock().await;
        let name = table.table_name().as_str().to_owned();
        state.columns.insert(name.clone(), management_columns());
        state.rows.insert(name.clone(), BTreeMap::new());
        state.tables.insert(name, table);
    }

    /// Adds a secondary index on one column.
    pub async fn seed_index(&self, name: &str, table: &str, column: &str) {
        self.state.lock().await.indexes.insert(
            name.to_owned(),
            FakeIndex {
                table: table.to_owned(),
                column: column.to_owned(),
                definition: format!("CREATE INDEX {name} ON {table} ({column})"),
            },
        );
    }

    pub async fn grant(&self, user_id: i64, group: &str) {
        self.memberships
            .lock()
            .await
            .entry(user_id)
            .or_default()
            .push(group.to_owned());
    }

    pub async fn snapshot(&self) -> FakeState {
        self.state.lock().await.clone()
    }
}

pub(crate) struct FakeTransaction {
    staged: FakeState,
    target: Arc<Mutex<FakeState>>,
}

#[async_trait]
impl SchemaTransaction for FakeTransaction {
    async fn create_table(&mut self, table: &SqlIdentifier) -> AppResult<()> {
        self.staged.ddl_log.push(format!("create_table {table}"));
        if self.staged.columns.contains_key(table.as_str()) {
            return Err(AppError::SchemaConflict(format!("relation '{table}' already exists")));
        }
        self.staged.columns.insert(table.as_str().to_owned(), management_columns());
        self.staged.rows.insert(table.as_str().to_owned(), BTreeMap::new());
        Ok(())
    }

    async fn drop_table(&mut self, table: &SqlIdentifier) -> AppResult<()> {
        self.staged.ddl_log.push(format!("drop_table {table}"));
        self.staged.columns_mut(table)?;
        self.staged.columns.remove(table.as_str());
        self.staged.rows.remove(table.as_str());
        self.staged.indexes.retain(|_, index| index.table != table.as_str());
        Ok(())
    }

    async fn add_column(
        &mut self,
        table: &SqlIdentifier,
        column: &SqlIdentifier,
        spec: &ColumnSpec,
    ) -> AppResult<()> {
        self.staged.ddl_log.push(format!("add_column {table}.{column} {}", spec.db_type));
        ensure_known_type(&spec.db_type)?;
        let columns = self.staged.columns_mut(table)?;
        if columns.contains_key(column.as_str()) {
            return Err(AppError::SchemaConflict(format!("column '{column}' already exists")));
        }
        columns.insert(column.as_str().to_owned(), spec.clone());
        Ok(())
    }

    async fn drop_column(&mut self, table: &SqlIdentifier, column: &SqlIdentifier) -> AppResult<()> {
        self.staged.ddl_log.push(format!("drop_column {table}.{column}"));
        if self.staged.columns_mut(table)?.remove(column.as_str()).is_none() {
            return Err(AppError::SchemaConflict(format!("column '{column}' does not exist")));
        }
        self.staged
            .indexes
            .retain(|_, index| !(index.table == table.as_str() && index.column == column.as_str()));
        Ok(())
    }

    async fn alter_column_type(
        &mut self,
        table: &SqlIdentifier,
        column: &SqlIdentifier,
        db_type: &DbType,
    ) -> AppResult<()> {
        self.staged.ddl_log.push(format!("alter_type {table}.{column} {db_type}"));
        ensure_known_type(db_type)?;
        self.staged.column_mut(table, column)?.db_type = db_type.clone();
        Ok(())
    }

    async fn set_column_required(
        &mut self,
        table: &SqlIdentifier,
        column: &SqlIdentifier,
        required: bool,
    ) -> AppResult<()> {
        self.staged.ddl_log.push(format!("set_required {table}.{column} {required}"));
        self.staged.column_mut(table, column)?.required = required;
        Ok(())
    }

    async fn set_column_default(
        &mut self,
        table: &SqlIdentifier,
        column: &SqlIdentifier,
        default_value: Option<&str>,
    ) -> AppResult<()> {
        self.staged
            .ddl_log
            .push(format!("set_default {table}.{column} {default_value:?}"));
        self.staged.column_mut(table, column)?.default_value = default_value.map(ToOwned::to_owned);
        Ok(())
    }

    async fn column_indexes(
        &mut self,
        table: &SqlIdentifier,
        column: &SqlIdentifier,
    ) -> AppResult<Vec<ColumnIndex>> {
        Ok(self
            .staged
            .indexes
            .iter()
            .filter(|(_, index)| index.table == table.as_str() && index.column == column.as_str())
            .map(|(name, index)| ColumnIndex {
                name: name.clone(),
                definition: index.definition.clone(),
            })
            .collect())
    }

    async fn drop_index(&mut self, index: &ColumnIndex) -> AppResult<()> {
        self.staged.ddl_log.push(format!("drop_index {}", index.name));
        self.staged.indexes.remove(&index.name).map(|_| ()).ok_or_else(|| {
            AppError::SchemaConflict(format!("index '{}' does not exist", index.name))
        })
    }

    async fn create_index(&mut self, index: &ColumnIndex) -> AppResult<()> {
        self.staged.ddl_log.push(format!("create_index {}", index.name));
        let (table, column) = index
            .definition
            .rsplit_once(" ON ")
            .and_then(|(_, target)| target.split_once(" ("))
            .map(|(table, column)| (table.to_owned(), column.trim_end_matches(')').to_owned()))
            .ok_or_else(|| AppError::SchemaConflict("unparsable index definition".to_owned()))?;

        let is_large_text = self
            .staged
            .column(&table, &column)
            .is_some_and(|spec| spec.db_type.is_large_text());
        if is_large_text {
            return Err(AppError::SchemaConflict(format!(
                "column '{column}' used in key specification without a key length"
            )));
        }

        self.staged.indexes.insert(
            index.name.clone(),
            FakeIndex {
                table,
                column,
                definition: index.definition.clone(),
            },
        );
        Ok(())
    }
}

#[async_trait]
impl MetadataTransaction for FakeTransaction {
    async fn find_table(&mut self, table_name: &str) -> AppResult<Option<TableMetadata>> {
        Ok(self.staged.tables.get(table_name).cloned())
    }

    async fn insert_table(&mut self, table: &TableMetadata) -> AppResult<()> {
        let name = table.table_name().as_str().to_owned();
        if self.staged.tables.contains_key(&name) {
            return Err(AppError::Conflict(format!("table '{name}' already exists")));
        }
        self.staged.tables.insert(name, table.clone());
        Ok(())
    }

    async fn update_table(&mut self, table: &TableMetadata) -> AppResult<bool> {
        let name = table.table_name().as_str();
        Ok(match self.staged.tables.get_mut(name) {
            Some(stored) => {
                *stored = table.clone();
                true
            }
            None => false,
        })
    }

    async fn delete_table(&mut self, table_name: &str) -> AppResult<bool> {
        Ok(self.staged.tables.remove(table_name).is_some())
    }

    async fn find_field(
        &mut self,
        table_name: &str,
        field_name: &str,
    ) -> AppResult<Option<FieldMetadata>> {
        Ok(self
            .staged
            .fields
            .get(&(table_name.to_owned(), field_name.to_owned()))
            .cloned())
    }

    async fn insert_field(&mut self, field: &FieldMetadata) -> AppResult<()> {
        let key = field_key(field);
        if self.staged.fields.contains_key(&key) {
            return Err(AppError::Conflict(format!("field '{}' already exists", key.1)));
        }
        self.staged.fields.insert(key, field.clone());
        Ok(())
    }

    async fn update_field(&mut self, field: &FieldMetadata) -> AppResult<bool> {
        Ok(match self.staged.fields.get_mut(&field_key(field)) {
            Some(stored) => {
                *stored = field.clone();
                true
            }
            None => false,
        })
    }

    async fn delete_field(&mut self, table_name: &str, field_name: &str) -> AppResult<bool> {
        Ok(self
            .staged
            .fields
            .remove(&(table_name.to_owned(), field_name.to_owned()))
            .is_some())
    }

    async fn delete_fields_for_table(&mut self, table_name: &str) -> AppResult<u64> {
        let before = self.staged.fields.len();
        self.staged.fields.retain(|(table, _), _| table != table_name);
        Ok((before - self.staged.fields.len()) as u64)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        *self.target.lock().await = self.staged;
        Ok(())
    }
}

#[async_trait]
impl MetadataRepository for FakeStorage {
    async fn begin(&self) -> AppResult<Box<dyn MetadataTransaction>> {
        Ok(Box::new(FakeTransaction {
            staged: self.state.lock().await.clone(),
            target: self.state.clone(),
        }))
    }

    async fn find_table(&self, table_name: &str) -> AppResult<Option<TableMetadata>> {
        Ok(self.state.lock().await.tables.get(table_name).cloned())
    }

    async fn list_tables(&self) -> AppResult<Vec<TableMetadata>> {
        Ok(self.state.lock().await.tables.values().cloned().collect())
    }

    async fn find_field(
        &self,
        table_name: &str,
        field_name: &str,
    ) -> AppResult<Option<FieldMetadata>> {
        Ok(self
            .state
            .lock()
            .await
            .fields
            .get(&(table_name.to_owned(), field_name.to_owned()))
            .cloned())
    }

    async fn list_fields(&self, table_name: &str) -> AppResult<Vec<FieldMetadata>> {
        let mut fields: Vec<FieldMetadata> = self
            .state
            .lock()
            .await
            .fields
            .values()
            .filter(|field| field.table_name().as_str() == table_name)
            .cloned()
            .collect();
        fields.sort_by(|left, right| {
            left.form_position()
                .cmp(&right.form_position())
                .then_with(|| left.field_name().cmp(right.field_name()))
        });
        Ok(fields)
    }
}

#[async_trait]
impl RowRepository for FakeStorage {
    async fn list_rows(&self, table: &SqlIdentifier, limit: i64, offset: i64) -> AppResult<Vec<Row>> {
        let state = self.state.lock().await;
        let rows = rows_of(&state, table)?;
        Ok(rows
            .iter()
            .skip(usize::try_from(offset).unwrap_or_default())
            .take(usize::try_from(limit).unwrap_or_default())
            .map(|(id, data)| Row::new(*id, data.clone()))
            .collect())
    }

    async fn count_rows(&self, table: &SqlIdentifier) -> AppResult<i64> {
        let state = self.state.lock().await;
        Ok(rows_of(&state, table)?.len() as i64)
    }

    async fn find_row(&self, table: &SqlIdentifier, id: i64) -> AppResult<Option<Row>> {
        let state = self.state.lock().await;
        Ok(rows_of(&state, table)?
            .get(&id)
            .map(|data| Row::new(id, data.clone())))
    }

    async fn insert_row(&self, table: &SqlIdentifier, data: &RowData) -> AppResult<Row> {
        let mut state = self.state.lock().await;
        ensure_columns(&state, table, data)?;
        let rows = state
            .rows
            .get_mut(table.as_str())
            .ok_or_else(|| AppError::Internal(format!("relation '{table}' does not exist")))?;
        let id = rows.keys().next_back().copied().unwrap_or_default() + 1;

        let now = CellValue::Timestamp(Utc::now());
        let mut stored = RowData::from([
            ("created".to_owned(), now.clone()),
            ("modified".to_owned(), now),
            ("read_groups".to_owned(), CellValue::Null),
            ("write_groups".to_owned(), CellValue::Null),
        ]);
        stored.extend(data.clone());
        rows.insert(id, stored.clone());
        Ok(Row::new(id, stored))
    }

    async fn update_row(
        &self,
        table: &SqlIdentifier,
        id: i64,
        data: &RowData,
    ) -> AppResult<Option<Row>> {
        let mut state = self.state.lock().await;
        ensure_columns(&state, table, data)?;
        let Some(stored) = state
            .rows
            .get_mut(table.as_str())
            .and_then(|rows| rows.get_mut(&id))
        else {
            return Ok(None);
        };

        for (name, value) in data {
            if (name == "created" || name == "modified") && value.is_blank() {
                return Err(AppError::Internal(format!(
                    "invalid input syntax for type timestamp: '{}'",
                    value.to_json()
                )));
            }
            stored.insert(name.clone(), value.clone());
        }

        Ok(Some(Row::new(id, stored.clone())))
    }

    async fn delete_row(&self, table: &SqlIdentifier, id: i64) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        Ok(state
            .rows
            .get_mut(table.as_str())
            .is_some_and(|rows| rows.remove(&id).is_some()))
    }
}

#[async_trait]
impl GroupMembershipRepository for FakeStorage {
    async fn is_member(&self, user_id: UserId, group: &GroupName) -> AppResult<bool> {
        Ok(self
            .memberships
            .lock()
            .await
            .get(&user_id.as_i64())
            .is_some_and(|groups| groups.iter().any(|name| name == group.as_str())))
    }

    async fn groups_for_user(&self, user_id: UserId) -> AppResult<Vec<GroupName>> {
        self.memberships
            .lock()
            .await
            .get(&user_id.as_i64())
            .map(|groups| groups.iter().map(|name| GroupName::new(name.as_str())).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn list_groups(&self) -> AppResult<Vec<Group>> {
        Ok(Vec::new())
    }

    async fn add_member(&self, user_id: UserId, group: &GroupName) -> AppResult<()> {
        self.grant(user_id.as_i64(), group.as_str()).await;
        Ok(())
    }
}

fn field_key(field: &FieldMetadata) -> (String, String) {
    (
        field.table_name().as_str().to_owned(),
        field.field_name().as_str().to_owned(),
    )
}

fn ensure_known_type(db_type: &DbType) -> AppResult<()> {
    if KNOWN_TYPES.contains(&db_type.base_type()) {
        return Ok(());
    }

    Err(AppError::SchemaConflict(format!(
        "type '{}' does not exist",
        db_type.base_type()
    )))
}

fn rows_of<'a>(state: &'a FakeState, table: &SqlIdentifier) -> AppResult<&'a BTreeMap<i64, RowData>> {
    state
        .rows
        .get(table.as_str())
        .ok_or_else(|| AppError::Internal(format!("relation '{table}' does not exist")))
}

fn ensure_columns(state: &FakeState, table: &SqlIdentifier, data: &RowData) -> AppResult<()> {
    let columns = state
        .columns
        .get(table.as_str())
        .ok_or_else(|| AppError::Internal(format!("relation '{table}' does not exist")))?;
    for name in data.keys() {
        if !columns.contains_key(name) && !is_management_field(name) {
            return Err(AppError::Validation(format!(
                "table '{table}' has no column '{name}'"
            )));
        }
    }

    Ok(())
}
