//! Error types for Tabula
//!
//! Every failure the engine can report is a variant here. The engine boundary
//! turns these into failed `ExecutionResult`s, so nothing escapes to callers.

use thiserror::Error;

/// The main error type for Tabula
#[derive(Error, Debug)]
pub enum Error {
    // ========== Lexer Errors ==========
    #[error("Syntax error: unexpected character '{0}' at position {1}")]
    UnexpectedCharacter(char, usize),

    #[error("Syntax error: unterminated string literal starting at position {0}")]
    UnterminatedString(usize),

    // ========== Classifier / Parser Errors ==========
    #[error("Empty statement")]
    EmptyStatement,

    #[error("Unsupported statement type. Supported statements: {0}")]
    UnsupportedStatementType(String),

    #[error("Syntax error: {0}")]
    InvalidSyntax(String),

    // ========== Catalog Errors ==========
    #[error("Table '{0}' doesn't exist")]
    TableNotFound(String),

    #[error("Table '{0}' already exists")]
    TableAlreadyExists(String),

    #[error("Database '{0}' doesn't exist")]
    DatabaseNotFound(String),

    #[error("Database '{0}' already exists")]
    DatabaseAlreadyExists(String),

    #[error("No database selected")]
    NoDatabaseSelected,

    #[error("No valid column definitions found for table '{0}'")]
    NoColumnsParsed(String),

    #[error("Unknown column '{column}'. Valid columns: {valid}")]
    InvalidColumn { column: String, valid: String },

    #[error("Column count doesn't match value count: {columns} column(s), {values} value(s)")]
    ColumnCountMismatch { columns: usize, values: usize },

    #[error("Auto-increment column '{column}' of table '{table}' has reached its maximum value")]
    AutoIncrementOverflow { table: String, column: String },

    // ========== Persistence Errors ==========
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ========== Internal Errors ==========
    #[error("Internal execution error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable identifier for the error class, suitable for programmatic checks.
    pub fn code(&self) -> &'static str {
        match self {
            Error::UnexpectedCharacter(..) | Error::UnterminatedString(_) => "INVALID_SYNTAX",
            Error::EmptyStatement => "EMPTY_STATEMENT",
            Error::UnsupportedStatementType(_) => "UNSUPPORTED_STATEMENT_TYPE",
            Error::InvalidSyntax(_) => "INVALID_SYNTAX",
            Error::TableNotFound(_) => "TABLE_NOT_FOUND",
            Error::TableAlreadyExists(_) => "TABLE_ALREADY_EXISTS",
            Error::DatabaseNotFound(_) => "DATABASE_NOT_FOUND",
            Error::DatabaseAlreadyExists(_) => "DATABASE_ALREADY_EXISTS",
            Error::NoDatabaseSelected => "NO_DATABASE_SELECTED",
            Error::NoColumnsParsed(_) => "NO_COLUMNS_PARSED",
            Error::InvalidColumn { .. } => "INVALID_COLUMN",
            Error::ColumnCountMismatch { .. } => "INVALID_SYNTAX",
            Error::AutoIncrementOverflow { .. } => "AUTO_INCREMENT_OVERFLOW",
            Error::Serialization(_) | Error::Io(_) => "SERIALIZATION_ERROR",
            Error::Internal(_) => "INTERNAL_EXECUTION_ERROR",
        }
    }

    /// Shorthand for an `InvalidSyntax` error.
    pub fn syntax(message: impl Into<String>) -> Self {
        Error::InvalidSyntax(message.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type alias for Tabula operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::TableNotFound("users".to_string());
        assert_eq!(err.to_string(), "Table 'users' doesn't exist");

        let err = Error::UnexpectedCharacter('@', 5);
        assert_eq!(
            err.to_string(),
            "Syntax error: unexpected character '@' at position 5"
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::EmptyStatement.code(), "EMPTY_STATEMENT");
        assert_eq!(
            Error::InvalidColumn {
                column: "x".into(),
                valid: "id".into()
            }
            .code(),
            "INVALID_COLUMN"
        );
        assert_eq!(Error::UnterminatedString(0).code(), "INVALID_SYNTAX");
    }
}
