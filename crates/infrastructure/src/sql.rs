use std::fmt::Display;

use folio_core::AppError;

const UNIQUE_VIOLATION: &str = "23505";

/// Renders a string as a single-quoted SQL literal.
pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Double-quotes a catalog-provided identifier.
pub(crate) fn quote_identifier(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(database_error)
        if database_error.code().as_deref() == Some(UNIQUE_VIOLATION))
}

/// Maps a storage failure to [`AppError::Internal`] with context.
pub(crate) fn internal(context: impl Display) -> impl FnOnce(sqlx::Error) -> AppError {
    move |error| AppError::Internal(format!("{context}: {error}"))
}

/// Maps a rejected DDL statement to [`AppError::SchemaConflict`] with context.
pub(crate) fn schema_conflict(context: impl Display) -> impl FnOnce(sqlx::Error) -> AppError {
    move |error| AppError::SchemaConflict(format!("{context}: {error}"))
}

#[cfg(test)]
mod tests {
    use super::{quote_identifier, quote_literal};

    #[test]
    fn literals_escape_single_quotes() {
        assert_eq!(quote_literal("it's"), "'it''s'");
        assert_eq!(quote_literal(""), "''");
    }

    #[test]
    fn identifiers_escape_double_quotes() {
        assert_eq!(quote_identifier("widgets_sku_idx"), "\"widgets_sku_idx\"");
        assert_eq!(quote_identifier("odd\"name"), "\"odd\"\"name\"");
    }
}
