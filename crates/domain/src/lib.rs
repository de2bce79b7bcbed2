//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod form;
mod metadata;
mod page;
mod row;
mod schema;
mod user;

pub use access::{EVERYONE_GROUP, Group, GroupName, GroupSet};
pub use form::{EditForm, FormField, FormMode, ListColumn, ListView, RowSelector};
pub use metadata::{FieldMetadata, TableMetadata, Timestamps};
pub use page::Page;
pub use row::{CellValue, Row, RowData, RowPage};
pub use schema::{
    CREATED_FIELD, DbType, FIELD_METADATA_TABLE, GROUP_TABLE, ID_FIELD, MANAGEMENT_FIELDS,
    MODIFIED_FIELD, PAGE_TABLE, READ_GROUPS_FIELD, SESSION_TABLE, SYSTEM_TABLES, SqlIdentifier,
    TABLE_METADATA_TABLE, USER_GROUP_TABLE, USER_TABLE, WRITE_GROUPS_FIELD, WidgetKind, is_management_field,
    is_metadata_table, is_system_table,
};
pub use user::{PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, UserRecord, validate_password};
