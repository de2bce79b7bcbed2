use std::str::FromStr;

use folio_core::AppError;
use serde::{Deserialize, Serialize};

use crate::{CellValue, RowPage, WidgetKind};

/// Presentation mode for edit forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    /// Display names and metadata-driven widgets.
    #[default]
    Normal,
    /// Raw field names, view-only.
    ///
    /// A blank form in this mode only describes the table's columns and
    /// their defaults; rows are still created through normal-mode input.
    Engineer,
}

impl FromStr for FormMode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "normal" => Ok(Self::Normal),
            "engineer" => Ok(Self::Engineer),
            _ => Err(AppError::Validation(format!("unknown form mode '{value}'"))),
        }
    }
}

/// Which row an edit form targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSelector {
    /// Blank form for a new row.
    New,
    /// Existing row by primary key.
    Existing(i64),
}

impl FromStr for RowSelector {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == "new" {
            return Ok(Self::New);
        }

        value
            .parse::<i64>()
            .map(Self::Existing)
            .map_err(|_| AppError::Validation(format!("'{value}' is neither 'new' nor a row id")))
    }
}

/// One rendered input of an edit form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    /// Column name submitted with the form.
    pub name: String,
    /// Label shown to the user.
    pub label: String,
    /// Help text.
    pub description: String,
    /// Widget to render.
    pub widget: WidgetKind,
    /// Whether a value must be supplied.
    pub required: bool,
    /// Whether the value may be edited.
    pub read_only: bool,
    /// Current value, or the column default for new rows.
    pub value: CellValue,
}

/// Edit form for one row of a table.
///
/// Engineer-mode forms mark every field read-only, including blank forms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditForm {
    /// Table being edited.
    pub table_name: String,
    /// Row being edited; `None` for a new row.
    pub row_id: Option<i64>,
    /// Presentation mode.
    pub mode: FormMode,
    /// Ordered inputs.
    pub fields: Vec<FormField>,
}

/// One column of a tabular listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListColumn {
    /// Column name.
    pub name: String,
    /// Header label.
    pub label: String,
}

/// Tabular listing of one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView {
    /// Table being listed.
    pub table_name: String,
    /// Visible columns in order.
    pub columns: Vec<ListColumn>,
    /// Rows visible to the caller.
    pub page: RowPage,
}
