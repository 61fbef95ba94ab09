use std::time::{Duration, Instant};

use bytes::Bytes;
use log::debug;
use warp::{
    reject,
    reply::{json, with_header, Reply},
};

use crate::environment::Environment;
use crate::errors::BackendError;
use crate::recipe::{Recipe, RecipeFields, RecipeId, RecipeSubmission};
use crate::routes::{
    rejection::{Context, Rejection},
    response::{self, SuccessResponse},
};

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($body:tt)+) => {{
        let start = Instant::now();

        let result = { $($body)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    }};
}

pub async fn ping(environment: Environment) -> RouteResult {
    timed! {
        environment
            .db
            .ping()
            .await
            .map_err(|e: BackendError| Rejection::new(Context::ping(), e))?;

        json(&SuccessResponse::Message { message: response::PONG })
    }
}

pub async fn list(environment: Environment) -> RouteResult {
    timed! {
        debug!(environment.logger, "Listing recipes...");

        let recipes = environment
            .db
            .list()
            .await
            .map_err(|e: BackendError| Rejection::new(Context::list(), e))?;

        json(&SuccessResponse::List { recipes })
    }
}

pub async fn create(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::create(), e);

        let fields = parse_submission(&body).map_err(error_handler)?;

        debug!(environment.logger, "Creating recipe..."; "title" => &fields.title);
        let id = environment.db.insert(fields).await.map_err(error_handler)?;

        debug!(environment.logger, "Retrieving created recipe..."; "id" => id);
        let recipe = retrieve_existing(&environment, id).await.map_err(error_handler)?;

        json(&SuccessResponse::recipe(response::CREATED, recipe))
    }
}

pub async fn retrieve(environment: Environment, id: String) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::retrieve(id.clone()), e);

        let id = parse_id(&id).map_err(error_handler)?;
        debug!(environment.logger, "Retrieving recipe..."; "id" => id);

        let recipe = retrieve_existing(&environment, id).await.map_err(error_handler)?;

        json(&SuccessResponse::recipe(response::RETRIEVED, recipe))
    }
}

pub async fn update(environment: Environment, id: String, body: Bytes) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::update(id.clone()), e);

        let id = parse_id(&id).map_err(error_handler)?;
        let fields = parse_submission(&body).map_err(error_handler)?;

        debug!(environment.logger, "Updating recipe..."; "id" => id);
        environment.db.update(id, fields).await.map_err(error_handler)?;

        let recipe = retrieve_existing(&environment, id).await.map_err(error_handler)?;

        json(&SuccessResponse::recipe(response::UPDATED, recipe))
    }
}

pub async fn delete(environment: Environment, id: String) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::delete(id.clone()), e);

        let id = parse_id(&id).map_err(error_handler)?;
        debug!(environment.logger, "Deleting recipe..."; "id" => id);

        environment.db.delete(id).await.map_err(error_handler)?;

        json(&SuccessResponse::Message { message: response::DELETED })
    }
}

pub(crate) fn parse_id(id: &str) -> Result<RecipeId, BackendError> {
    id.parse().map_err(|source| BackendError::InvalidId {
        id: id.to_owned(),
        source,
    })
}

fn parse_submission(body: &[u8]) -> Result<RecipeFields, BackendError> {
    RecipeSubmission::from_slice(body)?.into_fields()
}

// a recipe that vanishes between writing and reading it back is
// reported the same way as one that never existed
async fn retrieve_existing(environment: &Environment, id: RecipeId) -> Result<Recipe, BackendError> {
    environment
        .db
        .retrieve(id)
        .await?
        .ok_or(BackendError::NonExistentId(id))
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
