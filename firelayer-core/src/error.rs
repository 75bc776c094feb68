//! Error types and result types for store and model operations.
//!
//! Every fallible operation in firelayer returns [`StoreResult<T>`]. Failures surface
//! synchronously to the immediate caller; nothing here retries or reconnects.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors raised while talking to a store or working with models.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A store operation was attempted before the process-wide connection was initialized.
    #[error("Not connected: initialize the connection before using the store")]
    NotConnected,
    /// The requested document does not exist.
    /// The first argument is the document ID, the second is the collection path.
    #[error("Document not found {0} in collection {1}")]
    DocumentNotFound(String, String),
    /// The operation needs a persisted entity (or an unsaved one) and got the other.
    #[error("Invalid state: {0}")]
    InvalidState(String),
    /// An argument was not recognized (ordering direction, operator, malformed path).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// A name given to `include` resolved to nothing on the model.
    /// The first argument is the model name, the second is the attribute.
    #[error("{0} has no attribute {1}")]
    AttributeNotFound(String, String),
    /// The store accepted a create or overwrite without handing back an identifier.
    #[error("Save failed: {0}")]
    SaveFailure(String),
    /// A type-erased entity or collection was downcast to the wrong model.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The model the caller asked for.
        expected: String,
        /// The model actually produced.
        found: String,
    },
    /// Serialization/deserialization error when converting between models and wire mappings.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during backend construction or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for store and model operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Returns `true` for [`StoreError::DocumentNotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::DocumentNotFound(..))
    }
}

impl From<BsonError> for StoreError {
    fn from(err: BsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
