//! Applies the migrations in `./migrations` to the catalog database.

use std::env;
use std::error::Error;

use movine::Movine;
use postgres::{Client, NoTls};

use log::{debug, info, initialize_logger};

const MIGRATIONS_DIRECTORY: &str = "./migrations";

fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();
    let connection_string = env::var("BACKEND_DB_CONNECTION_STRING")
        .map_err(|_| "must define BACKEND_DB_CONNECTION_STRING environment variable")?;

    debug!(logger, "Connecting to database...");

    let client = Client::connect(&connection_string, NoTls)?;

    let mut movine = Movine::new(client);
    movine.set_migration_dir(MIGRATIONS_DIRECTORY);

    if movine.status().is_err() {
        debug!(logger, "Initializing movine...");
        movine
            .initialize()
            .map_err(|e| format!("failed to initialize movine: {:?}", e))?;
    }

    info!(logger, "Running migrations..."; "directory" => MIGRATIONS_DIRECTORY);
    movine
        .up()
        .map_err(|e| format!("failed to run migrations: {:?}", e))?;

    debug!(logger, "Completed initialization.");

    Ok(())
}
