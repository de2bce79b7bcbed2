use std::sync::Arc;

use folio_application::{
    ContentService, GroupMembershipResolver, MetadataStore, PageService, PermissionEvaluator,
    RowEditor, UserService,
};
use folio_core::AppError;
use folio_infrastructure::{
    Argon2PasswordHasher, PostgresGroupMembershipRepository, PostgresMetadataRepository,
    PostgresPageRepository, PostgresRowRepository, PostgresUserRepository,
};
use sqlx::PgPool;
use tracing::info;

use crate::api_config::BootstrapAdmin;
use crate::state::AppState;

pub fn build_app_state(pool: PgPool) -> AppState {
    let group_resolver = GroupMembershipResolver::new(Arc::new(
        PostgresGroupMembershipRepository::new(pool.clone()),
    ));
    let permissions = PermissionEvaluator::new(group_resolver.clone());

    let metadata_store =
        MetadataStore::new(Arc::new(PostgresMetadataRepository::new(pool.clone())));
    let row_editor = RowEditor::new(Arc::new(PostgresRowRepository::new(pool.clone())));
    let content_service = ContentService::new(metadata_store, row_editor, permissions.clone());

    let page_service =
        PageService::new(Arc::new(PostgresPageRepository::new(pool.clone())), permissions);

    let user_service = UserService::new(
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(Argon2PasswordHasher::new()),
        group_resolver.clone(),
    );

    AppState {
        content_service,
        page_service,
        user_service,
        group_resolver,
        postgres_pool: pool,
    }
}

pub async fn ensure_bootstrap_admin(
    state: &AppState,
    admin: Option<&BootstrapAdmin>,
) -> Result<(), AppError> {
    let Some(admin) = admin else {
        return Ok(());
    };

    let user_id = state
        .user_service
        .ensure_admin(&admin.username, &admin.password)
        .await?;
    info!(%user_id, username = %admin.username, "bootstrap admin ready");
    Ok(())
}
