use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::errors::BackendError;

/// The ID of a recipe in the database.
pub type RecipeId = i64;

/// The fields a client must supply, listed in the order they are
/// reported when missing.
pub const REQUIRED_FIELDS: &str = "title, preparation_time, serves, ingredients, cost";

/// A single recipe in the database.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recipe {
    /// The ID assigned by the database.
    id: RecipeId,

    /// The client-supplied fields.
    #[serde(flatten)]
    fields: RecipeFields,

    /// The times it was created and updated. Never sent to clients.
    #[serde(skip_serializing)]
    times: Times,
}

impl Recipe {
    pub fn new(id: RecipeId, fields: RecipeFields, times: Times) -> Self {
        Recipe { id, fields, times }
    }

    pub fn id(&self) -> RecipeId {
        self.id
    }

    pub fn fields(&self) -> &RecipeFields {
        &self.fields
    }

    pub fn times(&self) -> &Times {
        &self.times
    }
}

/// The client-writable part of a recipe. All of it is required on
/// both creation and update.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecipeFields {
    pub title: String,

    /// Free-form, e.g. “45 min”. Stored in the `making_time` column.
    pub preparation_time: String,

    pub serves: String,

    /// Free-form list, e.g. “onion, chicken, seasoning”.
    pub ingredients: String,

    pub cost: i32,
}

/// The times a recipe was created and last modified, as set by the
/// database.
#[derive(Clone, Debug, PartialEq)]
pub struct Times {
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A recipe as submitted in a request body. Omitted and `null` fields
/// both decode to `None`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RecipeSubmission {
    pub(crate) title: Option<String>,

    #[serde(alias = "making_time")]
    pub(crate) preparation_time: Option<String>,

    pub(crate) serves: Option<String>,

    pub(crate) ingredients: Option<String>,

    pub(crate) cost: Option<i32>,
}

impl RecipeSubmission {
    /// Decodes a request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, BackendError> {
        serde_json::from_slice(body).map_err(BackendError::MalformedSubmission)
    }

    /// Returns the complete set of fields, or `MissingFields` if any of
    /// them is absent. Empty strings count as present.
    pub fn into_fields(self) -> Result<RecipeFields, BackendError> {
        match self {
            RecipeSubmission {
                title: Some(title),
                preparation_time: Some(preparation_time),
                serves: Some(serves),
                ingredients: Some(ingredients),
                cost: Some(cost),
            } => Ok(RecipeFields {
                title,
                preparation_time,
                serves,
                ingredients,
                cost,
            }),
            _ => Err(BackendError::MissingFields),
        }
    }
}
