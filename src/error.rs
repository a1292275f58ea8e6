//! Error taxonomy for the ingestion pipeline.
//!
//! Everything except storage failures is scoped to a single unit of work
//! (one listing date or one document). The run loops log those, record them
//! in their report and move on. Storage failures abort the run.

use thiserror::Error;

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Errors that can occur while ingesting disclosure documents.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Timeout, connection failure or body read failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Registry answered with a non-2xx status
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// Registry answered 200 but reported an error in the payload metadata
    #[error("Registry returned status {status}: {message}")]
    Registry { status: String, message: String },

    /// Listing payload is not the expected JSON
    #[error("Malformed listing payload: {0}")]
    MalformedJson(#[from] serde_json::Error),

    /// Bundle is not a readable zip archive
    #[error("Malformed document bundle: {0}")]
    MalformedArchive(#[from] zip::result::ZipError),

    /// Structured document is not well-formed XML
    #[error("Malformed XBRL document: {0}")]
    MalformedXml(String),

    /// Period end cannot be turned into a fiscal year
    #[error("Cannot derive fiscal year from period end {0:?}")]
    InvalidPeriod(String),

    /// Document has no issuer code, so figures cannot be keyed
    #[error("Document {0} has no securities code")]
    MissingIssuer(String),

    /// Invalid registry base URL or endpoint
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Storage failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Local I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// Whether the current unit of work can be skipped and the run continued.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            IngestError::Database(_) | IngestError::Io(_) | IngestError::Url(_)
        )
    }
}

impl From<roxmltree::Error> for IngestError {
    fn from(err: roxmltree::Error) -> Self {
        IngestError::MalformedXml(err.to_string())
    }
}
