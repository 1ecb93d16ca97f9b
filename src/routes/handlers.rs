use std::time::{Duration, Instant};

use log::debug;
use uuid::Uuid;
use warp::{
    http::StatusCode,
    reject,
    reply::{json, with_header, with_status, Reply},
};

use crate::bluray::{Bluray, BlurayChanges, NewBluray};
use crate::environment::Environment;
use crate::errors::BackendError;
use crate::routes::{
    query::SearchQuery,
    rejection::{Context, Rejection},
};
use crate::validation;

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($expression:stmt);+) => {
        let start = Instant::now();

        // errors leave through `?` without the header
        let result = { $($expression)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    };
}

pub async fn list(environment: Environment) -> RouteResult {
    timed! {
        debug!(environment.logger, "Listing all Blu-rays...");

        let blurays = environment
            .db
            .retrieve_all()
            .await
            .map_err(|e: BackendError| Rejection::new(Context::list(), e))?;

        json(&blurays)
    }
}

pub async fn search(environment: Environment, query: SearchQuery) -> RouteResult {
    timed! {
        let SearchQuery { term } = query;
        debug!(environment.logger, "Searching..."; "term" => &term);

        let blurays = environment
            .db
            .search(&term)
            .await
            .map_err(|e: BackendError| Rejection::new(Context::search(term.clone()), e))?;

        json(&blurays)
    }
}

pub async fn retrieve(environment: Environment, id: String) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::retrieve(id.clone()), e);

        let id = parse_id(&id).map_err(error_handler)?;
        debug!(environment.logger, "Retrieving Blu-ray..."; "id" => %id);

        let bluray = find(&environment, id).await.map_err(error_handler)?;

        json(&bluray)
    }
}

pub async fn create(environment: Environment, new: NewBluray) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::create(), e);

        let policy = environment.config.isbn_policy;

        // a duplicate ISBN is reported ahead of any other field's error
        if let Ok(isbn) = validation::isbn_with(policy, &new.isbn) {
            ensure_isbn_is_free(&environment, &isbn)
                .await
                .map_err(error_handler)?;
        };

        let bluray = Bluray::create_with(new, policy)
            .map_err(BackendError::from)
            .map_err(error_handler)?;
        debug!(environment.logger, "Creating Blu-ray..."; "id" => %bluray.id(), "isbn" => bluray.isbn());

        environment.db.insert(&bluray).await.map_err(error_handler)?;

        let location = environment.urls.bluray(&bluray.id());

        with_status(
            with_header(json(&bluray), "location", location.as_str()),
            StatusCode::CREATED,
        )
    }
}

pub async fn update(environment: Environment, id: String, changes: BlurayChanges) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::update(id.clone()), e);

        let id = parse_id(&id).map_err(error_handler)?;
        debug!(environment.logger, "Updating Blu-ray..."; "id" => %id);

        let mut bluray = find(&environment, id).await.map_err(error_handler)?;

        bluray
            .update(changes)
            .map_err(BackendError::from)
            .map_err(error_handler)?;

        environment.db.update(&bluray).await.map_err(error_handler)?;

        StatusCode::NO_CONTENT
    }
}

pub async fn delete(environment: Environment, id: String) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::delete(id.clone()), e);

        let id = parse_id(&id).map_err(error_handler)?;
        debug!(environment.logger, "Deleting Blu-ray..."; "id" => %id);

        environment.db.delete(&id).await.map_err(error_handler)?;

        StatusCode::NO_CONTENT
    }
}

fn parse_id(id: &str) -> Result<Uuid, BackendError> {
    Uuid::parse_str(id).map_err(|_| BackendError::InvalidId(id.to_owned()))
}

async fn ensure_isbn_is_free(environment: &Environment, isbn: &str) -> Result<(), BackendError> {
    if environment.db.isbn_exists(isbn).await? {
        return Err(BackendError::IsbnAlreadyExists {
            isbn: isbn.to_owned(),
        });
    }

    Ok(())
}

async fn find(environment: &Environment, id: Uuid) -> Result<Bluray, BackendError> {
    environment
        .db
        .retrieve(&id)
        .await?
        .ok_or(BackendError::NonExistentId(id))
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
