use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use folio_core::Identity;
use folio_domain::RowData;
use serde_json::Value;

use crate::dto::{ListViewResponse, PageQuery, row_to_json};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_rows_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(table_name): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<ListViewResponse>> {
    let view = state
        .content_service
        .list_view(&identity, table_name.as_str(), query.page(), query.page_size())
        .await?;

    Ok(Json(ListViewResponse::from(view)))
}

pub async fn create_row_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(table_name): Path<String>,
    Json(payload): Json<RowData>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let row = state
        .content_service
        .create_row(&identity, table_name.as_str(), payload)
        .await?;

    Ok((StatusCode::CREATED, Json(row_to_json(&row))))
}

pub async fn get_row_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((table_name, row_id)): Path<(String, i64)>,
) -> ApiResult<Json<Value>> {
    let row = state
        .content_service
        .get_row(&identity, table_name.as_str(), row_id)
        .await?;

    Ok(Json(row_to_json(&row)))
}

pub async fn update_row_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((table_name, row_id)): Path<(String, i64)>,
    Json(payload): Json<RowData>,
) -> ApiResult<Json<Value>> {
    let row = state
        .content_service
        .update_row(&identity, table_name.as_str(), row_id, payload)
        .await?;

    Ok(Json(row_to_json(&row)))
}

pub async fn delete_row_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((table_name, row_id)): Path<(String, i64)>,
) -> ApiResult<StatusCode> {
    state
        .content_service
        .delete_row(&identity, table_name.as_str(), row_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
