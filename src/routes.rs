use std::sync::Arc;

use log::{error, warn, Logger};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, Reply, WithStatus};
use warp::Filter;

use crate::environment::Environment;
use crate::errors::BackendError;

mod handlers;
mod rejection;
mod response;

pub use internal::*;

/// Combines every route and turns rejections raised by the handlers
/// into JSON responses.
pub fn make_api(
    environment: Environment,
) -> impl Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone {
    let logger = environment.logger.clone();

    make_ping_route(environment.clone())
        .or(make_list_route(environment.clone()))
        .or(make_create_route(environment.clone()))
        .or(make_retrieve_route(environment.clone()))
        .or(make_update_route(environment.clone()))
        .or(make_delete_route(environment))
        .recover(move |r| format_rejection(logger.clone(), r))
}

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let status = status_code_for(r);

        if status.is_server_error() {
            error!(logger, "Backend error"; "context" => ?r.context, "error" => ?r.error, "status" => %status, "message" => %r.error);
        } else {
            warn!(logger, "Request rejected"; "context" => ?r.context, "status" => %status, "message" => %r.error);
        }

        return Ok(with_status(json(&r.flatten()), status));
    }

    Err(rej)
}

fn status_code_for(r: &rejection::Rejection) -> StatusCode {
    use rejection::Context;
    use BackendError::*;

    match (&r.context, &r.error) {
        // creation reports missing fields as a successful response
        (Context::Create, MissingFields) => StatusCode::OK,
        (_, MissingFields) => StatusCode::BAD_REQUEST,
        (_, NonExistentId(..)) => StatusCode::NOT_FOUND,
        (_, Unavailable { .. }) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

mod internal {
    use warp::body::bytes;
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{delete, get as g, patch, path as p, path::param as par, post};

    use super::handlers;
    use crate::environment::Environment;

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    macro_rules! route_filter {
        ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
        ($route_variable:ident; $first:expr, $($rest:expr),+) => (
            let $route_variable = $route_variable.and($first);
            route_filter!($route_variable; $($rest),+);
        )
    }

    macro_rules! route {
        ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
            pub fn $name(environment: Environment) -> Route {
                let $route_variable = warp::any()
                    .map(move || environment.clone());

                route_filter!($route_variable; $($filters),+);

                $route_variable.and_then(handlers::$handler)
                    .boxed()
            }
        );
    }

    route!(make_ping_route => ping, rt; p("ping"), end(), g());
    route!(make_list_route => list, rt; p("recipes"), end(), g());
    route!(make_create_route => create, rt; p("recipes"), end(), post(), bytes());
    route!(make_retrieve_route => retrieve, rt; p("recipes"), par::<String>(), end(), g());
    route!(make_update_route => update, rt; p("recipes"), par::<String>(), end(), patch(), bytes());
    route!(make_delete_route => delete, rt; p("recipes"), par::<String>(), end(), delete());
}
