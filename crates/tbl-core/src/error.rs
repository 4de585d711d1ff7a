//! Error types for tbl-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tbl-core
///
/// The splitter and line reader never fail; everything here comes from the
/// list, struct cell, table and layout layers built on top of them.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The table text has no first line
    #[error("comment line is required")]
    MissingCommentLine,

    /// The table text has no second line
    #[error("name line is required")]
    MissingNameLine,

    /// A line does not have the required number of columns
    #[error("line {line} column count {found} is invalid, should be {expected}")]
    ColumnCount {
        line: usize,
        found: usize,
        expected: usize,
    },

    /// The name line does not match the expected column names
    #[error("column {index} should be named as `{expected}`, found `{found}`")]
    ColumnName {
        index: usize,
        expected: String,
        found: String,
    },

    /// A layout or lookup refers to a column the table does not have
    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    /// A key cell is empty where a key is required
    #[error("line {line} key `{column}` is empty")]
    EmptyKey { line: usize, column: String },

    /// A key value appears twice
    #[error("line {line} key `{column}` value {value} is duplicated")]
    DuplicateKey {
        line: usize,
        column: String,
        value: String,
    },

    /// A cell could not be converted to its column type
    #[error("line {line} column `{column}` value is invalid: {source}")]
    InvalidColumn {
        line: usize,
        column: String,
        #[source]
        source: Box<Error>,
    },

    /// One element of a `|` separated list could not be parsed
    #[error("list element {index} `{token}` is invalid: {source}")]
    ListElement {
        index: usize,
        token: String,
        #[source]
        source: Box<Error>,
    },

    /// A struct cell ran out of `;` separated fields
    #[error("struct field {index} is missing")]
    MissingField { index: usize },

    /// A struct cell has more fields than were read
    #[error("struct cell has more than {expected} fields")]
    TrailingField { expected: usize },

    /// Strict integer conversion rejected a token
    #[error("`{0}` is not a valid integer")]
    InvalidInteger(String),

    /// Custom cell parse failure reported by a `FromCell` implementation
    #[error("{0}")]
    Cell(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a custom cell error from any message
    pub fn cell(message: impl Into<String>) -> Self {
        Error::Cell(message.into())
    }

    pub(crate) fn invalid_column(line: usize, column: &str, source: Error) -> Self {
        Error::InvalidColumn {
            line,
            column: column.to_string(),
            source: Box::new(source),
        }
    }
}
