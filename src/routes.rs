use std::sync::Arc;

use log::{error, warn, Logger};
use serde::Serialize;
use warp::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, WithStatus};
use warp::{Filter, Reply};

use crate::environment::Environment;
use crate::errors::BackendError;

pub mod admin;
mod handlers;
mod query;
mod rejection;
mod response;

pub use internal::*;

/// The largest request body to accept. A record with every field at its
/// maximum length is well under this.
const MAX_CONTENT_LENGTH: u64 = 16 * 1024;

#[derive(Debug, Serialize)]
struct MalformedBody {
    message: String,
}

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let status = status_code_for(&r.error);

        // client mistakes are routine; only failures on our side are errors
        if status.is_server_error() {
            error!(logger, "Backend error"; "context" => ?r.context, "error" => ?r.error, "status" => %status, "message" => %r.error);
        } else {
            warn!(logger, "Request rejected"; "context" => ?r.context, "error" => ?r.error, "status" => %status, "message" => %r.error);
        }

        let flattened = r.flatten();

        return Ok(with_status(json(&flattened), status));
    }

    if let Some(e) = rej.find::<BodyDeserializeError>() {
        warn!(logger, "Malformed request body"; "error" => %e);
        let body = MalformedBody {
            message: e.to_string(),
        };

        return Ok(with_status(json(&body), StatusCode::BAD_REQUEST));
    }

    Err(rej)
}

fn status_code_for(e: &BackendError) -> StatusCode {
    use BackendError::*;

    match e {
        Validation(..) | IsbnAlreadyExists { .. } | InvalidId(..) => StatusCode::BAD_REQUEST,
        NonExistentId(..) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Every catalog route, with failures rendered as JSON.
pub fn make_api(
    environment: Environment,
) -> impl Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone {
    let logger = environment.logger.clone();

    make_list_route(environment.clone())
        .or(make_search_route(environment.clone()))
        .or(make_create_route(environment.clone()))
        .or(make_retrieve_route(environment.clone()))
        .or(make_update_route(environment.clone()))
        .or(make_delete_route(environment))
        .recover(move |r| format_rejection(logger.clone(), r))
}

mod internal {
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{body, delete, get as g, path as p, path::param as par, post, put, query};

    use super::{handlers, query as q, MAX_CONTENT_LENGTH};
    use crate::bluray::{BlurayChanges, NewBluray};
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
            let r = environment.urls.blurays_path.clone();

            let $route_variable = warp::any()
                .map(move || environment.clone())
                .and(p(r));

            route_filter!($route_variable; $($filters),+);

            $route_variable.and_then(handlers::$handler)
                .boxed()
        }
    );
}

    route!(make_list_route => list, rt; end(), g());
    route!(make_search_route => search, rt; p("search"), end(), g(), query::<q::SearchQuery>());
    route!(make_create_route => create, rt; end(), post(), body::content_length_limit(MAX_CONTENT_LENGTH), body::json::<NewBluray>());
    route!(make_retrieve_route => retrieve, rt; p("id"), par::<String>(), end(), g());
    route!(make_update_route => update, rt; p("id"), par::<String>(), end(), put(), body::content_length_limit(MAX_CONTENT_LENGTH), body::json::<BlurayChanges>());
    route!(make_delete_route => delete, rt; p("id"), par::<String>(), end(), delete());
}
