use thiserror::Error;
use uuid::Uuid;

use crate::validation::ValidationError;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents a rejected field value. The message is the field rule's
    /// own wording.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Represents an attempt to add a second disc with the same ISBN.
    #[error("A Bluray with ISBN {isbn} already exists")]
    IsbnAlreadyExists { isbn: String },

    /// Represents a duplicate primary key.
    #[error("ID already exists")]
    IdAlreadyExists,

    /// Represents a path segment that is not a UUID.
    #[error("Invalid ID: {0}")]
    InvalidId(String),

    /// Represents a well-formed ID with no record behind it.
    #[error("No Bluray with ID {0}")]
    NonExistentId(Uuid),

    /// Represents a stored genre name that no longer parses.
    #[error("Unknown genre in database: {0}")]
    UnknownStoredGenre(String),

    /// Represents an SQL error.
    #[error("SQLx error")]
    Sqlx { source: sqlx::Error },
}
