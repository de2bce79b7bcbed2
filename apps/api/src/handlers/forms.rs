use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use folio_core::Identity;
use folio_domain::RowSelector;

use crate::dto::{EditFormResponse, FormQuery};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/tables/{table}/form/{id-or-new}
pub async fn edit_form_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((table_name, selector)): Path<(String, String)>,
    Query(query): Query<FormQuery>,
) -> ApiResult<Json<EditFormResponse>> {
    let selector = RowSelector::from_str(selector.as_str())?;
    let form = state
        .content_service
        .edit_form(&identity, table_name.as_str(), selector, query.mode()?)
        .await?;

    Ok(Json(EditFormResponse::from(form)))
}
