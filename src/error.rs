//! Error types for the document-access layer

use thiserror::Error;

/// Result type alias for DAO operations
pub type Result<T> = std::result::Result<T, DaoError>;

/// Errors raised by the DAO facade.
///
/// Selector and shape problems are detected locally, before any request
/// reaches the server. Everything the driver reports is passed through
/// unchanged.
#[derive(Error, Debug)]
pub enum DaoError {
    /// No selector was supplied (a null / undefined value).
    #[error("the selector is null")]
    NullSelector,

    /// The selector was neither an ObjectId nor a filter document.
    #[error("unsupported selector type {0} (only ObjectId or a filter document)")]
    UnsupportedSelectorType(String),

    /// An id selector was built from something that is not a valid ObjectId.
    #[error("invalid id selector: {0}")]
    InvalidSelectorKind(String),

    /// A single-document query matched more than one document.
    #[error("ambiguous match: the filter matched more than one document in '{collection}'")]
    AmbiguousMatch { collection: String },

    /// The store reported no matching document.
    #[error("not found")]
    NotFound,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("BSON serialization error: {0}")]
    BsonSer(#[from] bson::ser::Error),

    #[error("BSON deserialization error: {0}")]
    BsonDe(#[from] bson::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl DaoError {
    /// Returns true for errors raised before any store call was issued.
    pub fn is_selector_error(&self) -> bool {
        matches!(
            self,
            DaoError::NullSelector
                | DaoError::UnsupportedSelectorType(_)
                | DaoError::InvalidSelectorKind(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DaoError::NotFound)
    }
}

impl From<bson::oid::Error> for DaoError {
    fn from(err: bson::oid::Error) -> Self {
        DaoError::InvalidSelectorKind(err.to_string())
    }
}
