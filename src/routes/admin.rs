use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, Reply};
use warp::Filter;

use super::response::SuccessResponse;

pub fn make_healthz_route(
) -> impl warp::Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone {
    warp::path("healthz").and(warp::get()).map(move || {
        json(&SuccessResponse::Healthz {
            name: info::NAME,
            revision: info::REVISION,
            timestamp: info::BUILD_TIMESTAMP,
            version: info::VERSION,
        })
    })
}

type TerminationFuture<'a> = BoxFuture<'a, ()>;

pub type TerminationFunctionWrapper<'a> =
    Arc<dyn Fn() -> TerminationFuture<'a> + Send + Sync + 'a>;

pub fn make_termination_route<'a>(
    terminate: TerminationFunctionWrapper<'a>,
) -> impl warp::Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone + 'a {
    let handler = move || -> BoxFuture<Result<StatusCode, std::convert::Infallible>> {
        let terminate = terminate.clone();

        async move {
            terminate().await;
            Ok(StatusCode::NO_CONTENT)
        }
        .boxed()
    };

    warp::path("terminate").and(warp::post()).and_then(handler)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use futures::FutureExt;
    use warp::http::StatusCode;

    use super::{make_healthz_route, make_termination_route};

    #[tokio::test]
    async fn healthz_reports_the_version() {
        let response = warp::test::request()
            .path("/healthz")
            .reply(&make_healthz_route())
            .await;

        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["version"], info::VERSION);
        assert_eq!(body["name"], info::NAME);
    }

    #[tokio::test]
    async fn terminate_calls_the_callback() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();
        let route = make_termination_route(Arc::new(move || {
            let flag = flag.clone();
            async move { flag.store(true, Ordering::SeqCst) }.boxed()
        }));

        let response = warp::test::request()
            .method("POST")
            .path("/terminate")
            .reply(&route)
            .await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(called.load(Ordering::SeqCst));
    }
}
