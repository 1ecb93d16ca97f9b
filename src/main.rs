use std::error::Error;
use std::sync::Arc;

use futures::future::FutureExt;
use tokio::sync::mpsc;
use warp::Filter;

use backend::config::{get_isbn_policy, get_variable};
use backend::db::PgDb;
use backend::environment::{Config, Environment};
use backend::routes;
use backend::urls::Urls;
use log::{error, info, initialize_logger};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();

    let main_port: u16 = get_variable("BACKEND_PORT").parse()?;
    let admin_port: u16 = get_variable("BACKEND_ADMIN_PORT").parse()?;

    info!(logger, "Starting..."; "main_port" => main_port, "admin_port" => admin_port);
    let logger = Arc::new(logger);

    info!(logger, "Creating database pool...");
    let connection_string = get_variable("BACKEND_DB_CONNECTION_STRING");
    let pool = sqlx::Pool::connect(&connection_string).await?;
    let db = Arc::new(PgDb::new(pool));

    let urls = Arc::new(Urls::parse(
        get_variable("BACKEND_BASE_URL"),
        get_variable("BACKEND_BLURAYS_PATH"),
    )?);

    let isbn_policy = get_isbn_policy();
    info!(logger, "Configured ISBN check"; "policy" => ?isbn_policy);

    let environment = Environment::new(logger.clone(), db, urls, Config::new(isbn_policy));

    let (termination_sender, mut termination_receiver) = mpsc::channel::<()>(1);

    let terminate = {
        let logger = logger.clone();

        Arc::new(move || {
            let termination_sender = termination_sender.clone();
            let logger = logger.clone();

            async move {
                // the receiver only goes away once shutdown has begun
                if termination_sender.send(()).await.is_err() {
                    error!(logger, "Termination already in progress");
                }
            }
            .boxed()
        })
    };

    let should_terminate = async move {
        termination_receiver.recv().await;
    }
    .shared();

    let ctrlc = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let signal = tokio::signal::ctrl_c();

        async move {
            tokio::select! {
                _ = should_terminate => {},
                _ = signal => {
                    terminate().await;
                }
            }
        }
    };

    let main_server = {
        let should_terminate = should_terminate.clone();

        let routes = routes::make_api(environment);

        let (_, main_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], main_port), async {
                should_terminate.await;
            });

        main_server
    };

    let admin_server = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let routes = routes::admin::make_healthz_route()
            .or(routes::admin::make_termination_route(terminate));

        let (_, admin_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], admin_port), async {
                should_terminate.await;
            });

        admin_server
    };

    tokio::join!(ctrlc, main_server, admin_server);

    info!(logger, "Exiting gracefully...");

    Ok(())
}
