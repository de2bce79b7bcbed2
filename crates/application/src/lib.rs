//! Application services and ports.

#![forbid(unsafe_code)]

mod content_ports;
mod content_service;
mod group_membership_resolver;
mod metadata_ports;
mod metadata_store;
mod page_service;
mod permission_evaluator;
mod row_editor;
mod schema_synchronizer;
mod security_ports;
mod user_service;

#[cfg(test)]
mod test_support;

pub use content_ports::{PageRepository, RowRepository};
pub use content_service::{ContentService, build_edit_form, build_list_columns};
pub use group_membership_resolver::GroupMembershipResolver;
pub use metadata_ports::{
    ColumnIndex, ColumnSpec, MetadataRepository, MetadataTransaction, SchemaTransaction,
};
pub use metadata_store::MetadataStore;
pub use page_service::PageService;
pub use permission_evaluator::{Access, PermissionEvaluator};
pub use row_editor::{MAX_PAGE_SIZE, RowEditor, prepare_insert, prepare_update};
pub use schema_synchronizer::SchemaSynchronizer;
pub use security_ports::{GroupMembershipRepository, PasswordHasher, UserRepository};
pub use user_service::UserService;
