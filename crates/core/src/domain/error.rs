use thiserror::Error;

/// User-facing data errors: bad form input or a bad CSV file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("price is not a finite number: {input:?}")]
    InvalidPrice { input: String },

    #[error("{field} must be non-empty")]
    EmptyField { field: &'static str },

    #[error("unknown record field: {name:?}")]
    UnknownField { name: String },

    #[error("CSV header is missing the {column:?} column")]
    MissingColumn { column: &'static str },

    #[error("CSV header has an unknown column: {column:?}")]
    UnknownColumn { column: String },

    #[error("CSV header lists {column:?} twice")]
    DuplicateColumn { column: &'static str },

    #[error("timestamp is not an integer epoch value: {input:?}")]
    InvalidTimestamp { input: String },

    #[error("CSV line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },
}
