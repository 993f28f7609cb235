//! Error types for Dependency-Track API operations.

use thiserror::Error;

/// Errors that can occur during Dependency-Track API operations.
#[derive(Debug, Error)]
pub enum DtError {
    /// Configuration is missing or incomplete.
    #[error("Dependency-Track configuration required: {0}")]
    ConfigMissing(String),

    /// Configuration was found but is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The remote resource does not exist (HTTP 404).
    #[error("Resource not found: {url}")]
    NotFound { url: String },

    /// The remote service refused a duplicate (HTTP 409).
    #[error("Conflict at {url}: {detail}")]
    Conflict { url: String, detail: String },

    /// Malformed request or an operation the resource does not support.
    #[error("Bad request ({status}): {detail}")]
    BadRequest { status: u16, detail: String },

    /// The remote service failed (HTTP 5xx).
    #[error("Server error ({status}) at {url}: {detail}")]
    InternalServerError {
        status: u16,
        url: String,
        detail: String,
    },

    /// A success-range status other than the one the operation requires.
    #[error("Unexpected status {status}: {detail}")]
    UnexpectedStatus { status: u16, detail: String },

    /// A response or entity lacks the `uuid` identifier.
    #[error("Missing identifier: {0}")]
    MissingIdentifier(String),

    /// `delete` was called on a collection without an explicit identifier.
    #[error("No uuid provided for delete")]
    NoDeleteTarget,

    /// Relation name outside the supported set.
    #[error("Unsupported relation '{0}'")]
    UnsupportedRelation(String),

    /// Key absent from an entity snapshot.
    #[error("Key '{0}' not present in entity")]
    MissingKey(String),

    /// SBOM document without the expected structure.
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// Response body had an unexpected JSON shape.
    #[error("Unexpected payload: {0}")]
    UnexpectedPayload(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// Local file error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file parsing error.
    #[error("Failed to parse configuration: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// Report writing error.
    #[error("Failed to write report: {0}")]
    CsvError(#[from] csv::Error),
}

impl DtError {
    /// Whether this error reports an absent remote resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DtError::NotFound { .. })
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            DtError::NotFound { .. } => Some(404),
            DtError::Conflict { .. } => Some(409),
            DtError::BadRequest { status, .. }
            | DtError::InternalServerError { status, .. }
            | DtError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for Dependency-Track operations.
pub type Result<T> = core::result::Result<T, DtError>;
