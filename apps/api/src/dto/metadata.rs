use std::str::FromStr;

use folio_core::AppResult;
use folio_domain::{FieldMetadata, GroupSet, TableMetadata, WidgetKind};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for table registration.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-table-request.ts"
)]
pub struct CreateTableRequest {
    pub table_name: String,
    #[serde(flatten)]
    pub attributes: UpdateTableRequest,
}

/// Incoming payload for table metadata updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-table-request.ts"
)]
pub struct UpdateTableRequest {
    pub display_name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub read_groups: Vec<String>,
    #[serde(default)]
    pub write_groups: Vec<String>,
}

impl CreateTableRequest {
    pub fn into_table_metadata(self) -> AppResult<TableMetadata> {
        self.attributes.into_table_metadata(self.table_name)
    }
}

impl UpdateTableRequest {
    pub fn into_table_metadata(self, table_name: String) -> AppResult<TableMetadata> {
        Ok(TableMetadata::new(table_name, self.display_name)?
            .with_description(self.description.unwrap_or_default())
            .with_groups(
                GroupSet::from_names(self.read_groups)?,
                GroupSet::from_names(self.write_groups)?,
            ))
    }
}

/// API representation of table metadata.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/table-response.ts"
)]
pub struct TableResponse {
    pub table_name: String,
    pub display_name: String,
    pub description: String,
    pub read_groups: Vec<String>,
    pub write_groups: Vec<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
}

impl From<TableMetadata> for TableResponse {
    fn from(value: TableMetadata) -> Self {
        let timestamps = value.timestamps();
        Self {
            table_name: value.table_name().as_str().to_owned(),
            display_name: value.display_name().as_str().to_owned(),
            description: value.description().to_owned(),
            read_groups: owned_names(value.read_groups()),
            write_groups: owned_names(value.write_groups()),
            created: timestamps.map(|stamps| stamps.created.to_rfc3339()),
            modified: timestamps.map(|stamps| stamps.modified.to_rfc3339()),
        }
    }
}

/// Incoming payload for field creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-field-request.ts"
)]
pub struct CreateFieldRequest {
    pub field_name: String,
    #[serde(flatten)]
    pub attributes: FieldAttributesRequest,
}

/// Incoming payload for field updates; also the body of field creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/field-attributes-request.ts"
)]
pub struct FieldAttributesRequest {
    pub display_name: String,
    pub description: Option<String>,
    pub db_type: String,
    pub widget: Option<String>,
    pub form_position: Option<i32>,
    pub list_position: Option<i32>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_read_only: bool,
    pub default_value: Option<String>,
    pub validation_rule: Option<String>,
}

impl CreateFieldRequest {
    pub fn into_field_metadata(self, table_name: String) -> AppResult<FieldMetadata> {
        self.attributes.into_field_metadata(table_name, self.field_name)
    }
}

impl FieldAttributesRequest {
    pub fn into_field_metadata(
        self,
        table_name: String,
        field_name: String,
    ) -> AppResult<FieldMetadata> {
        let widget = match self.widget.as_deref() {
            Some(widget) => WidgetKind::from_str(widget)?,
            None => WidgetKind::default(),
        };

        Ok(
            FieldMetadata::new(table_name, field_name, self.display_name, self.db_type)?
                .with_description(self.description.unwrap_or_default())
                .with_widget(widget)
                .with_positions(
                    self.form_position.unwrap_or(0),
                    self.list_position.unwrap_or(0),
                )
                .with_flags(self.is_required, self.is_read_only)
                .with_default_value(self.default_value)
                .with_validation_rule(self.validation_rule),
        )
    }
}

/// API representation of field metadata.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/field-response.ts"
)]
pub struct FieldResponse {
    pub table_name: String,
    pub field_name: String,
    pub display_name: String,
    pub description: String,
    pub db_type: String,
    pub widget: String,
    pub form_position: i32,
    pub list_position: i32,
    pub is_required: bool,
    pub is_read_only: bool,
    pub default_value: Option<String>,
    pub validation_rule: Option<String>,
}

impl From<FieldMetadata> for FieldResponse {
    fn from(value: FieldMetadata) -> Self {
        Self {
            table_name: value.table_name().as_str().to_owned(),
            field_name: value.field_name().as_str().to_owned(),
            display_name: value.display_name().as_str().to_owned(),
            description: value.description().to_owned(),
            db_type: value.db_type().as_str().to_owned(),
            widget: value.widget().as_str().to_owned(),
            form_position: value.form_position(),
            list_position: value.list_position(),
            is_required: value.is_required(),
            is_read_only: value.is_read_only(),
            default_value: value.default_value().map(ToOwned::to_owned),
            validation_rule: value.validation_rule().map(ToOwned::to_owned),
        }
    }
}

fn owned_names(groups: &GroupSet) -> Vec<String> {
    groups.names().into_iter().map(ToOwned::to_owned).collect()
}
