use folio_application::{ContentService, GroupMembershipResolver, PageService, UserService};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub content_service: ContentService,
    pub page_service: PageService,
    pub user_service: UserService,
    pub group_resolver: GroupMembershipResolver,
    pub postgres_pool: PgPool,
}
