use std::num::ParseIntError;

use thiserror::Error;

use crate::recipe::{RecipeId, REQUIRED_FIELDS};

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents a failure to reach the database at all.
    #[error("{source}")]
    Unavailable { source: sqlx::Error },

    /// Represents any other SQL error.
    #[error("{source}")]
    Sqlx { source: sqlx::Error },

    /// Represents an ID that matches no row.
    #[error("No recipe found")]
    NonExistentId(RecipeId),

    /// Represents an ID assigned by the database that doesn’t fit in a
    /// `RecipeId`.
    #[error("assigned ID {0} is out of range")]
    IdOutOfRange(u64),

    /// Represents a path segment that isn’t a valid ID.
    #[error("invalid recipe ID {id:?}: {source}")]
    InvalidId { id: String, source: ParseIntError },

    /// Represents a request body that couldn’t be decoded.
    #[error("{0}")]
    MalformedSubmission(#[source] serde_json::Error),

    /// Represents a submission lacking one or more required fields.
    #[error("missing one of the required fields ({})", REQUIRED_FIELDS)]
    MissingFields,
}
