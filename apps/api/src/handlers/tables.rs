use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use folio_core::Identity;

use crate::dto::{
    CreateFieldRequest, CreateTableRequest, FieldAttributesRequest, FieldResponse,
    TableResponse, UpdateTableRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_tables_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<TableResponse>>> {
    let tables = state
        .content_service
        .list_tables(&identity)
        .await?
        .into_iter()
        .map(TableResponse::from)
        .collect();

    Ok(Json(tables))
}

pub async fn create_table_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateTableRequest>,
) -> ApiResult<(StatusCode, Json<TableResponse>)> {
    let table = state
        .content_service
        .create_table(&identity, payload.into_table_metadata()?)
        .await?;

    Ok((StatusCode::CREATED, Json(TableResponse::from(table))))
}

pub async fn get_table_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(table_name): Path<String>,
) -> ApiResult<Json<TableResponse>> {
    let table = state
        .content_service
        .table(&identity, table_name.as_str())
        .await?;

    Ok(Json(TableResponse::from(table)))
}

pub async fn update_table_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(table_name): Path<String>,
    Json(payload): Json<UpdateTableRequest>,
) -> ApiResult<Json<TableResponse>> {
    let table = state
        .content_service
        .update_table(&identity, payload.into_table_metadata(table_name)?)
        .await?;

    Ok(Json(TableResponse::from(table)))
}

pub async fn delete_table_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(table_name): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .content_service
        .delete_table(&identity, table_name.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_fields_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(table_name): Path<String>,
) -> ApiResult<Json<Vec<FieldResponse>>> {
    let fields = state
        .content_service
        .list_fields(&identity, table_name.as_str())
        .await?
        .into_iter()
        .map(FieldResponse::from)
        .collect();

    Ok(Json(fields))
}

pub async fn create_field_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(table_name): Path<String>,
    Json(payload): Json<CreateFieldRequest>,
) -> ApiResult<(StatusCode, Json<FieldResponse>)> {
    let field = payload.into_field_metadata(table_name)?;
    let (table_name, field_name) = (
        field.table_name().as_str().to_owned(),
        field.field_name().as_str().to_owned(),
    );
    state.content_service.create_field(&identity, field).await?;

    let created = state
        .content_service
        .field(&identity, table_name.as_str(), field_name.as_str())
        .await?;
    Ok((StatusCode::CREATED, Json(FieldResponse::from(created))))
}

pub async fn get_field_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((table_name, field_name)): Path<(String, String)>,
) -> ApiResult<Json<FieldResponse>> {
    let field = state
        .content_service
        .field(&identity, table_name.as_str(), field_name.as_str())
        .await?;

    Ok(Json(FieldResponse::from(field)))
}

pub async fn update_field_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((table_name, field_name)): Path<(String, String)>,
    Json(payload): Json<FieldAttributesRequest>,
) -> ApiResult<Json<FieldResponse>> {
    let field = payload.into_field_metadata(table_name.clone(), field_name.clone())?;
    state.content_service.update_field(&identity, field).await?;

    let updated = state
        .content_service
        .field(&identity, table_name.as_str(), field_name.as_str())
        .await?;
    Ok(Json(FieldResponse::from(updated)))
}

pub async fn delete_field_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path((table_name, field_name)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .content_service
        .delete_field(&identity, table_name.as_str(), field_name.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
