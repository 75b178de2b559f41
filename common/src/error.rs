use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqlGenError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// operator typed the quit sentinel
    #[error("aborted by user")]
    UserAborted,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("index {index} is out of range (expected 1..={count})")]
    OutOfRange { index: usize, count: usize },

    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("column already exists: {0}")]
    DuplicateColumn(String),

    #[error("schema already exists: {0}")]
    DuplicateSchema(String),

    #[error("generation service error: {0}")]
    Service(String),

    #[error("query extraction failed: {0}")]
    Extraction(String),

    #[error("missing credential: set {0}")]
    MissingCredential(String),

    #[error("tracing initialization failed: {0}")]
    Tracing(String),
}

impl SqlGenError {
    /// whether the session can re-offer the same decision point after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SqlGenError::UserAborted
                | SqlGenError::InvalidInput(_)
                | SqlGenError::OutOfRange { .. }
                | SqlGenError::SchemaNotFound(_)
                | SqlGenError::ColumnNotFound(_)
                | SqlGenError::DuplicateColumn(_)
                | SqlGenError::DuplicateSchema(_)
                | SqlGenError::Service(_)
                | SqlGenError::Extraction(_)
        )
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, SqlGenError::UserAborted)
    }
}

pub type Result<T> = std::result::Result<T, SqlGenError>;
