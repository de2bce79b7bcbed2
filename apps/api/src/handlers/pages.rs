use axum::Json;
use axum::extract::{Extension, Path, State};
use folio_core::Identity;

use crate::dto::PageResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn get_page_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(slug): Path<String>,
) -> ApiResult<Json<PageResponse>> {
    let page = state
        .page_service
        .get_page(&identity, slug.as_str())
        .await?;

    Ok(Json(PageResponse::from(page)))
}
