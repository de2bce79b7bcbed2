mod auth;
mod content;
mod metadata;

pub use auth::{AuthLoginRequest, CurrentUserResponse, GroupResponse};
pub use content::{
    EditFormResponse, FormQuery, ListViewResponse, PageQuery, PageResponse, row_to_json,
};
pub use metadata::{
    CreateFieldRequest, CreateTableRequest, FieldAttributesRequest, FieldResponse,
    TableResponse, UpdateTableRequest,
};

use serde::Serialize;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

#[cfg(test)]
mod tests;
