use chrono::{DateTime, Utc};
use folio_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{DbType, GroupSet, SqlIdentifier, WidgetKind};

/// Creation and modification timestamps assigned by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    /// Row creation time.
    pub created: DateTime<Utc>,
    /// Last modification time.
    pub modified: DateTime<Utc>,
}

/// Display and permission configuration for one managed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    table_name: SqlIdentifier,
    display_name: NonEmptyString,
    description: String,
    read_groups: GroupSet,
    write_groups: GroupSet,
    timestamps: Option<Timestamps>,
}

impl TableMetadata {
    /// Creates table metadata with open read and write access.
    pub fn new(
        table_name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            table_name: SqlIdentifier::new(table_name)?,
            display_name: NonEmptyString::new(display_name)?,
            description: String::new(),
            read_groups: GroupSet::open(),
            write_groups: GroupSet::open(),
            timestamps: None,
        })
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the read and write group-sets.
    #[must_use]
    pub fn with_groups(mut self, read_groups: GroupSet, write_groups: GroupSet) -> Self {
        self.read_groups = read_groups;
        self.write_groups = write_groups;
        self
    }

    /// Attaches storage timestamps.
    #[must_use]
    pub fn with_timestamps(mut self, timestamps: Timestamps) -> Self {
        self.timestamps = Some(timestamps);
        self
    }

    /// Returns the storage table name.
    #[must_use]
    pub fn table_name(&self) -> &SqlIdentifier {
        &self.table_name
    }

    /// Returns the human-friendly name.
    #[must_use]
    pub fn display_name(&self) -> &NonEmptyString {
        &self.display_name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the groups allowed to read the table.
    #[must_use]
    pub fn read_groups(&self) -> &GroupSet {
        &self.read_groups
    }

    /// Returns the groups allowed to write the table.
    #[must_use]
    pub fn write_groups(&self) -> &GroupSet {
        &self.write_groups
    }

    /// Returns storage timestamps once persisted.
    #[must_use]
    pub fn timestamps(&self) -> Option<Timestamps> {
        self.timestamps
    }
}

/// Editing and display configuration for one column of a managed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    table_name: SqlIdentifier,
    field_name: SqlIdentifier,
    display_name: NonEmptyString,
    description: String,
    db_type: DbType,
    widget: WidgetKind,
    form_position: i32,
    list_position: i32,
    is_required: bool,
    is_read_only: bool,
    default_value: Option<String>,
    validation_rule: Option<String>,
    timestamps: Option<Timestamps>,
}

impl FieldMetadata {
    /// Creates field metadata with a text widget, visible at position zero.
    pub fn new(
        table_name: impl Into<String>,
        field_name: impl Into<String>,
        display_name: impl Into<String>,
        db_type: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            table_name: SqlIdentifier::new(table_name)?,
            field_name: SqlIdentifier::new(field_name)?,
            display_name: NonEmptyString::new(display_name)?,
            description: String::new(),
            db_type: DbType::new(db_type)?,
            widget: WidgetKind::Text,
            form_position: 0,
            list_position: 0,
            is_required: false,
            is_read_only: false,
            default_value: None,
            validation_rule: None,
            timestamps: None,
        })
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the input widget.
    #[must_use]
    pub fn with_widget(mut self, widget: WidgetKind) -> Self {
        self.widget = widget;
        self
    }

    /// Sets form and list ordering. Negative positions hide the field.
    #[must_use]
    pub fn with_positions(mut self, form_position: i32, list_position: i32) -> Self {
        self.form_position = form_position;
        self.list_position = list_position;
        self
    }

    /// Sets the required and read-only flags.
    #[must_use]
    pub fn with_flags(mut self, is_required: bool, is_read_only: bool) -> Self {
        self.is_required = is_required;
        self.is_read_only = is_read_only;
        self
    }

    /// Sets the column default value.
    #[must_use]
    pub fn with_default_value(mut self, default_value: Option<String>) -> Self {
        self.default_value = default_value;
        self
    }

    /// Sets the opaque validation-rule descriptor.
    #[must_use]
    pub fn with_validation_rule(mut self, validation_rule: Option<String>) -> Self {
        self.validation_rule = validation_rule.filter(|rule| !rule.trim().is_empty());
        self
    }

    /// Attaches storage timestamps.
    #[must_use]
    pub fn with_timestamps(mut self, timestamps: Timestamps) -> Self {
        self.timestamps = Some(timestamps);
        self
    }

    /// Returns the parent table name.
    #[must_use]
    pub fn table_name(&self) -> &SqlIdentifier {
        &self.table_name
    }

    /// Returns the column name.
    #[must_use]
    pub fn field_name(&self) -> &SqlIdentifier {
        &self.field_name
    }

    /// Returns the label shown in normal mode.
    #[must_use]
    pub fn display_name(&self) -> &NonEmptyString {
        &self.display_name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the storage type.
    #[must_use]
    pub fn db_type(&self) -> &DbType {
        &self.db_type
    }

    /// Returns the input widget.
    #[must_use]
    pub fn widget(&self) -> WidgetKind {
        self.widget
    }

    /// Returns the edit-form position.
    #[must_use]
    pub fn form_position(&self) -> i32 {
        self.form_position
    }

    /// Returns the listing position.
    #[must_use]
    pub fn list_position(&self) -> i32 {
        self.list_position
    }

    /// Returns whether the field is shown in edit forms.
    #[must_use]
    pub fn is_in_form(&self) -> bool {
        self.form_position >= 0
    }

    /// Returns whether the field is shown in listings.
    #[must_use]
    pub fn is_in_list(&self) -> bool {
        self.list_position >= 0
    }

    /// Returns whether the column is `NOT NULL`.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.is_required
    }

    /// Returns whether the field is read-only for updates.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.is_read_only
    }

    /// Returns the column default.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Returns the validation-rule descriptor.
    #[must_use]
    pub fn validation_rule(&self) -> Option<&str> {
        self.validation_rule.as_deref()
    }

    /// Returns storage timestamps once persisted.
    #[must_use]
    pub fn timestamps(&self) -> Option<Timestamps> {
        self.timestamps
    }

    /// Returns whether moving from `previous` to `self` changes the column definition.
    #[must_use]
    pub fn schema_differs_from(&self, previous: &Self) -> bool {
        self.db_type != previous.db_type
            || self.is_required != previous.is_required
            || self.default_value != previous.default_value
    }
}
