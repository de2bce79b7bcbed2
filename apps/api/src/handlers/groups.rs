use axum::Json;
use axum::extract::{Extension, State};
use folio_core::Identity;
use folio_domain::GROUP_TABLE;

use crate::dto::GroupResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_groups_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<GroupResponse>>> {
    // Reading the `_group` table metadata enforces its read groups.
    state.content_service.table(&identity, GROUP_TABLE).await?;

    let groups = state
        .group_resolver
        .list_groups()
        .await?
        .into_iter()
        .map(GroupResponse::from)
        .collect();

    Ok(Json(groups))
}
