use serde::Serialize;
use warp::reject;

use super::response::{CREATION_FAILED, UPDATE_FAILED};
use crate::errors::BackendError;
use crate::recipe::REQUIRED_FIELDS;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BackendError,
}

impl Rejection {
    pub fn new(context: Context, error: BackendError) -> Self {
        Rejection { context, error }
    }

    /// Converts the error into the body sent to the client. Missing
    /// fields get an operation-specific message and a list of what is
    /// required; everything else is reported verbatim.
    pub fn flatten(&self) -> FlattenedRejection {
        match self.error {
            BackendError::MissingFields => FlattenedRejection {
                message: self.context.validation_message().to_owned(),
                required: Some(REQUIRED_FIELDS),
            },
            _ => FlattenedRejection {
                message: format!("{}", self.error),
                required: None,
            },
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    pub(crate) message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) required: Option<&'static str>,
}

/// The operation that failed, with whatever the client sent to
/// identify the recipe.
#[derive(Clone, Debug)]
pub enum Context {
    Create,
    Delete { id: String },
    List,
    Ping,
    Retrieve { id: String },
    Update { id: String },
}

impl Context {
    pub fn create() -> Context {
        Context::Create
    }

    pub fn delete(id: String) -> Context {
        Context::Delete { id }
    }

    pub fn list() -> Context {
        Context::List
    }

    pub fn ping() -> Context {
        Context::Ping
    }

    pub fn retrieve(id: String) -> Context {
        Context::Retrieve { id }
    }

    pub fn update(id: String) -> Context {
        Context::Update { id }
    }

    fn validation_message(&self) -> &'static str {
        match self {
            Context::Create => CREATION_FAILED,
            _ => UPDATE_FAILED,
        }
    }
}
