use std::fmt::{Display, Formatter};
use std::str::FromStr;

use folio_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Structural columns present on every managed table.
///
/// They never appear as editable field metadata and are excluded from every
/// schema synchronization step.
pub const MANAGEMENT_FIELDS: [&str; 5] = ["id", "created", "modified", "read_groups", "write_groups"];

/// Column holding the creation timestamp.
pub const CREATED_FIELD: &str = "created";

/// Column holding the last-modification timestamp.
pub const MODIFIED_FIELD: &str = "modified";

/// Primary key column.
pub const ID_FIELD: &str = "id";

/// Column holding the row-level read group-set.
pub const READ_GROUPS_FIELD: &str = "read_groups";

/// Column holding the row-level write group-set.
pub const WRITE_GROUPS_FIELD: &str = "write_groups";

/// Identity table.
pub const USER_TABLE: &str = "_user";
/// Group table.
pub const GROUP_TABLE: &str = "_group";
/// User-to-group membership table.
pub const USER_GROUP_TABLE: &str = "_user_group";
/// Session table owned by the session store.
pub const SESSION_TABLE: &str = "_session";
/// Table metadata table.
pub const TABLE_METADATA_TABLE: &str = "_table";
/// Field metadata table.
pub const FIELD_METADATA_TABLE: &str = "_field";
/// Page table.
pub const PAGE_TABLE: &str = "_page";

/// Reserved tables that can never be deleted through the metadata store.
pub const SYSTEM_TABLES: [&str; 7] = [
    USER_TABLE,
    GROUP_TABLE,
    USER_GROUP_TABLE,
    SESSION_TABLE,
    TABLE_METADATA_TABLE,
    FIELD_METADATA_TABLE,
    PAGE_TABLE,
];

/// Returns whether the column is a structural management column.
#[must_use]
pub fn is_management_field(field_name: &str) -> bool {
    MANAGEMENT_FIELDS.contains(&field_name)
}

/// Returns whether the table is reserved.
#[must_use]
pub fn is_system_table(table_name: &str) -> bool {
    SYSTEM_TABLES.contains(&table_name)
}

/// Returns whether the table stores metadata that must only change through the metadata store.
#[must_use]
pub fn is_metadata_table(table_name: &str) -> bool {
    table_name == TABLE_METADATA_TABLE || table_name == FIELD_METADATA_TABLE
}

const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Table or column name that is safe to interpolate into quoted DDL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SqlIdentifier(String);

impl SqlIdentifier {
    /// Validates an identifier against `[A-Za-z_][A-Za-z0-9_]*` (max 63 bytes).
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let mut characters = value.chars();
        let starts_well = characters
            .next()
            .is_some_and(|first| first.is_ascii_alphabetic() || first == '_');
        let rest_valid = characters.all(|character| character.is_ascii_alphanumeric() || character == '_');

        if !starts_well || !rest_valid || value.len() > MAX_IDENTIFIER_LENGTH {
            return Err(AppError::Validation(format!(
                "'{value}' is not a valid table or column identifier"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the identifier wrapped in double quotes.
    #[must_use]
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl TryFrom<String> for SqlIdentifier {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SqlIdentifier> for String {
    fn from(value: SqlIdentifier) -> Self {
        value.0
    }
}

impl Display for SqlIdentifier {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

const LARGE_TEXT_TYPES: [&str; 9] = [
    "TEXT",
    "TINYTEXT",
    "MEDIUMTEXT",
    "LONGTEXT",
    "BLOB",
    "TINYBLOB",
    "MEDIUMBLOB",
    "LONGBLOB",
    "BYTEA",
];

/// Words that would turn a type descriptor into a column constraint.
const CONSTRAINT_KEYWORDS: [&str; 16] = [
    "NOT",
    "NULL",
    "DEFAULT",
    "UNIQUE",
    "PRIMARY",
    "KEY",
    "REFERENCES",
    "CHECK",
    "COLLATE",
    "GENERATED",
    "CONSTRAINT",
    "ALWAYS",
    "IDENTITY",
    "STORED",
    "AS",
    "ON",
];

/// Storage type descriptor such as `VARCHAR(255)`, `INT` or `TIMESTAMP`.
///
/// Normalized to upper case. Only words optionally followed by `(n)` or `(n,m)`
/// are accepted, and none of them may be a constraint keyword; whether the
/// engine knows the type is decided by storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DbType(String);

impl DbType {
    /// Parses and normalizes a descriptor.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_uppercase();
        let invalid = || AppError::Validation(format!("'{value}' is not a valid storage type"));

        let (base, arguments) = match normalized.split_once('(') {
            Some((base, rest)) => {
                let arguments = rest.strip_suffix(')').ok_or_else(invalid)?;
                (base.trim_end(), Some(arguments))
            }
            None => (normalized.as_str(), None),
        };

        let base_valid = !base.is_empty()
            && base.starts_with(|character: char| character.is_ascii_alphabetic())
            && base
                .chars()
                .all(|character| character.is_ascii_alphanumeric() || character == ' ' || character == '_');
        if !base_valid || base.split(' ').any(|word| CONSTRAINT_KEYWORDS.contains(&word)) {
            return Err(invalid());
        }

        let base = base.to_owned();
        let normalized = match arguments {
            None => base,
            Some(arguments) => {
                let parts = arguments
                    .split(',')
                    .map(str::trim)
                    .collect::<Vec<_>>();
                let parts_valid = !parts.is_empty()
                    && parts.len() <= 2
                    && parts
                        .iter()
                        .all(|part| !part.is_empty() && part.chars().all(|digit| digit.is_ascii_digit()));
                if !parts_valid {
                    return Err(invalid());
                }
                format!("{base}({})", parts.join(","))
            }
        };

        Ok(Self(normalized))
    }

    /// Returns the normalized descriptor.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the descriptor without size arguments.
    #[must_use]
    pub fn base_type(&self) -> &str {
        self.0
            .split_once('(')
            .map(|(base, _)| base)
            .unwrap_or(self.0.as_str())
    }

    /// Returns whether the type belongs to the large-text/blob class that
    /// cannot carry a full-column index.
    #[must_use]
    pub fn is_large_text(&self) -> bool {
        LARGE_TEXT_TYPES.contains(&self.base_type())
    }
}

impl TryFrom<String> for DbType {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DbType> for String {
    fn from(value: DbType) -> Self {
        value.0
    }
}

impl Display for DbType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Input widget rendered for a field in edit forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    /// Single-line text input.
    #[default]
    Text,
    /// Masked password input.
    Password,
    /// Drop-down selection.
    Select,
    /// Multi-line text input.
    Textarea,
    /// Boolean checkbox.
    Checkbox,
    /// Date picker.
    Date,
    /// Date and time picker.
    DateTime,
    /// Numeric input.
    Number,
    /// Email address input.
    Email,
    /// Not rendered but submitted.
    Hidden,
}

impl WidgetKind {
    /// Returns a stable storage value for the widget.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Password => "password",
            Self::Select => "select",
            Self::Textarea => "textarea",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Number => "number",
            Self::Email => "email",
            Self::Hidden => "hidden",
        }
    }
}

impl FromStr for WidgetKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "text" => Ok(Self::Text),
            "password" => Ok(Self::Password),
            "select" => Ok(Self::Select),
            "textarea" => Ok(Self::Textarea),
            "checkbox" => Ok(Self::Checkbox),
            "date" => Ok(Self::Date),
            "datetime" => Ok(Self::DateTime),
            "number" => Ok(Self::Number),
            "email" => Ok(Self::Email),
            "hidden" => Ok(Self::Hidden),
            _ => Err(AppError::Validation(format!("unknown widget kind '{value}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{DbType, SqlIdentifier, WidgetKind, is_management_field, is_system_table};

    #[test]
    fn identifiers_reject_quotes_and_spaces() {
        assert!(SqlIdentifier::new("widgets").is_ok());
        assert!(SqlIdentifier::new("_field").is_ok());
        assert!(SqlIdentifier::new("price2").is_ok());
        assert!(SqlIdentifier::new("2price").is_err());
        assert!(SqlIdentifier::new("a\"; DROP TABLE x; --").is_err());
        assert!(SqlIdentifier::new("with space").is_err());
        assert!(SqlIdentifier::new("").is_err());
        assert!(SqlIdentifier::new("x".repeat(64)).is_err());
    }

    #[test]
    fn db_type_is_normalized() {
        let parsed = DbType::new(" varchar( 255 ) ");
        assert!(parsed.is_ok());
        let parsed = parsed.unwrap_or_else(|_| unreachable!());
        assert_eq!(parsed.as_str(), "VARCHAR(255)");
        assert_eq!(parsed.base_type(), "VARCHAR");

        let numeric = DbType::new("numeric(10, 2)");
        assert_eq!(
            numeric.map(|value| value.as_str().to_owned()).unwrap_or_default(),
            "NUMERIC(10,2)"
        );

        let spaced = DbType::new("double   precision");
        assert_eq!(
            spaced.map(|value| value.as_str().to_owned()).unwrap_or_default(),
            "DOUBLE PRECISION"
        );
    }

    #[test]
    fn db_type_rejects_injection_shapes() {
        for value in ["", "INT; DROP TABLE x", "VARCHAR(abc)", "VARCHAR(1,2,3)", "INT)", "(5)", "TEXT'"] {
            assert!(DbType::new(value).is_err(), "{value} should be rejected");
        }
    }

    #[test]
    fn db_type_rejects_column_constraints() {
        for value in [
            "INT NOT NULL",
            "INT UNIQUE",
            "INT DEFAULT 5",
            "INT REFERENCES _USER",
            "INT PRIMARY KEY",
            "text collate c",
            "INT GENERATED ALWAYS AS IDENTITY",
        ] {
            assert!(DbType::new(value).is_err(), "{value} should be rejected");
        }
        for value in ["DOUBLE PRECISION", "CHARACTER VARYING(40)", "TIMESTAMP WITH TIME ZONE"] {
            assert!(DbType::new(value).is_ok(), "{value} should be accepted");
        }
    }

    #[test]
    fn large_text_classification() {
        for value in ["TEXT", "longtext", "BLOB", "bytea"] {
            assert!(DbType::new(value).is_ok_and(|value| value.is_large_text()));
        }
        for value in ["VARCHAR(255)", "INT", "TIMESTAMP", "TEXTUAL"] {
            assert!(DbType::new(value).is_ok_and(|value| !value.is_large_text()));
        }
    }

    #[test]
    fn reserved_names() {
        assert!(is_management_field("read_groups"));
        assert!(!is_management_field("price"));
        assert!(is_system_table("_user"));
        assert!(!is_system_table("widgets"));
    }

    #[test]
    fn widget_round_trip_storage_value() {
        let restored = WidgetKind::from_str(WidgetKind::Textarea.as_str());
        assert!(matches!(restored, Ok(WidgetKind::Textarea)));
        assert!(WidgetKind::from_str("slider").is_err());
    }
}
