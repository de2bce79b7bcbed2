//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod postgres_group_membership_repository;
mod postgres_metadata_repository;
mod postgres_page_repository;
mod postgres_row_repository;
mod postgres_user_repository;
mod sql;

#[cfg(test)]
mod test_support;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use postgres_group_membership_repository::PostgresGroupMembershipRepository;
pub use postgres_metadata_repository::{PostgresMetadataRepository, PostgresMetadataTransaction};
pub use postgres_page_repository::PostgresPageRepository;
pub use postgres_row_repository::PostgresRowRepository;
pub use postgres_user_repository::PostgresUserRepository;

/// Migrations creating and seeding the system tables.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
