use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use folio_core::{AppError, AppResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

use crate::GroupSet;

/// One cell of a generic row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// SQL `NULL`.
    Null,
    /// Boolean column value.
    Bool(bool),
    /// Integer column value.
    Int(i64),
    /// Floating point column value.
    Float(f64),
    /// Textual value, also used for types without a dedicated variant.
    Text(String),
    /// Timestamp column value.
    Timestamp(DateTime<Utc>),
}

impl CellValue {
    /// Converts a JSON scalar into a cell value. Arrays and objects are rejected.
    pub fn from_json(value: &Value) -> AppResult<Self> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(value) => Ok(Self::Bool(*value)),
            Value::Number(number) => Ok(number
                .as_i64()
                .map(Self::Int)
                .or_else(|| number.as_f64().map(Self::Float))
                .unwrap_or(Self::Null)),
            Value::String(value) => Ok(Self::Text(value.clone())),
            Value::Array(_) | Value::Object(_) => Err(AppError::Validation(
                "row values must be JSON scalars".to_owned(),
            )),
        }
    }

    /// Converts the cell into its JSON representation.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(value) => Value::Bool(*value),
            Self::Int(value) => Value::Number((*value).into()),
            Self::Float(value) => Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Text(value) => Value::String(value.clone()),
            Self::Timestamp(value) => Value::String(value.to_rfc3339()),
        }
    }

    /// Returns whether the value is `NULL` or blank text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(value) => value.trim().is_empty(),
            _ => false,
        }
    }

    /// Returns the textual storage form; `NULL` has none.
    #[must_use]
    pub fn to_storage_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(value) => Some(value.to_string()),
            Self::Int(value) => Some(value.to_string()),
            Self::Float(value) => Some(value.to_string()),
            Self::Text(value) => Some(value.clone()),
            Self::Timestamp(value) => Some(value.to_rfc3339()),
        }
    }

    /// Returns the text payload when the cell is textual.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}

/// Field name to value mapping used for row writes.
pub type RowData = BTreeMap<String, CellValue>;

/// One record of any managed table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    id: i64,
    #[serde(flatten)]
    values: RowData,
}

impl Row {
    /// Creates a row from its primary key and remaining columns.
    #[must_use]
    pub fn new(id: i64, mut values: RowData) -> Self {
        values.remove(crate::ID_FIELD);
        Self { id, values }
    }

    /// Returns the primary key.
    #[must_use]
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Returns a column value.
    #[must_use]
    pub fn get(&self, field_name: &str) -> Option<&CellValue> {
        self.values.get(field_name)
    }

    /// Returns all non-key column values.
    #[must_use]
    pub fn values(&self) -> &RowData {
        &self.values
    }

    /// Parses the row-level read group-set.
    pub fn read_groups(&self) -> AppResult<GroupSet> {
        self.group_set(crate::READ_GROUPS_FIELD)
    }

    /// Parses the row-level write group-set.
    pub fn write_groups(&self) -> AppResult<GroupSet> {
        self.group_set(crate::WRITE_GROUPS_FIELD)
    }

    fn group_set(&self, column: &str) -> AppResult<GroupSet> {
        match self.values.get(column) {
            None | Some(CellValue::Null) => Ok(GroupSet::open()),
            Some(CellValue::Text(serialized)) => GroupSet::parse(Some(serialized.as_str())),
            Some(other) => Err(AppError::Validation(format!(
                "row {} has a non-text '{column}' value: {}",
                self.id,
                other.to_json()
            ))),
        }
    }
}

/// One page of rows plus the unpaginated row count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowPage {
    /// Rows on this page, ordered by primary key.
    pub rows: Vec<Row>,
    /// Number of rows in the whole table.
    pub total: i64,
    /// 1-based page index.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
}
