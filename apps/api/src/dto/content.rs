use std::str::FromStr;

use folio_core::AppResult;
use folio_domain::{EditForm, FormField, FormMode, ListColumn, ListView, Page, Row};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

/// Page size used when a listing request does not name one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Pagination query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

/// Edit form query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct FormQuery {
    pub mode: Option<String>,
}

impl FormQuery {
    pub fn mode(&self) -> AppResult<FormMode> {
        match self.mode.as_deref() {
            Some(mode) => FormMode::from_str(mode),
            None => Ok(FormMode::Normal),
        }
    }
}

/// Converts a row into a flat JSON object keyed by column name.
pub fn row_to_json(row: &Row) -> Value {
    let mut object = Map::new();
    object.insert("id".to_owned(), Value::from(row.id()));
    for (name, value) in row.values() {
        object.insert(name.clone(), value.to_json());
    }

    Value::Object(object)
}

/// API representation of a listing column.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/list-column-response.ts"
)]
pub struct ListColumnResponse {
    pub name: String,
    pub label: String,
}

impl From<ListColumn> for ListColumnResponse {
    fn from(value: ListColumn) -> Self {
        Self {
            name: value.name,
            label: value.label,
        }
    }
}

/// API representation of a paginated table listing.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/list-view-response.ts"
)]
pub struct ListViewResponse {
    pub table_name: String,
    pub columns: Vec<ListColumnResponse>,
    #[ts(type = "Array<Record<string, unknown>>")]
    pub rows: Vec<Value>,
    #[ts(type = "number")]
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

impl From<ListView> for ListViewResponse {
    fn from(value: ListView) -> Self {
        Self {
            table_name: value.table_name,
            columns: value
                .columns
                .into_iter()
                .map(ListColumnResponse::from)
                .collect(),
            rows: value.page.rows.iter().map(row_to_json).collect(),
            total: value.page.total,
            page: value.page.page,
            page_size: value.page.page_size,
        }
    }
}

/// API representation of one edit form input.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/form-field-response.ts"
)]
pub struct FormFieldResponse {
    pub name: String,
    pub label: String,
    pub description: String,
    pub widget: String,
    pub required: bool,
    pub read_only: bool,
    #[ts(type = "unknown")]
    pub value: Value,
}

impl From<FormField> for FormFieldResponse {
    fn from(value: FormField) -> Self {
        Self {
            widget: value.widget.as_str().to_owned(),
            value: value.value.to_json(),
            name: value.name,
            label: value.label,
            description: value.description,
            required: value.required,
            read_only: value.read_only,
        }
    }
}

/// API representation of an edit form.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/edit-form-response.ts"
)]
pub struct EditFormResponse {
    pub table_name: String,
    #[ts(type = "number | null")]
    pub row_id: Option<i64>,
    pub mode: String,
    pub fields: Vec<FormFieldResponse>,
}

impl From<EditForm> for EditFormResponse {
    fn from(value: EditForm) -> Self {
        let mode = match value.mode {
            FormMode::Normal => "normal",
            FormMode::Engineer => "engineer",
        };

        Self {
            table_name: value.table_name,
            row_id: value.row_id,
            mode: mode.to_owned(),
            fields: value
                .fields
                .into_iter()
                .map(FormFieldResponse::from)
                .collect(),
        }
    }
}

/// API representation of a content page.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/page-response.ts"
)]
pub struct PageResponse {
    pub slug: String,
    pub title: String,
    pub body: String,
}

impl From<Page> for PageResponse {
    fn from(value: Page) -> Self {
        Self {
            slug: value.slug().to_owned(),
            title: value.title().to_owned(),
            body: value.body().to_owned(),
        }
    }
}
