use std::error::Error;
use std::sync::Arc;

use warp::Filter;

use log::{debug, info, initialize_logger};
use recipes::config::Config;
use recipes::db::MySqlDb;
use recipes::environment::Environment;
use recipes::routes;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();

    let config = Config::from_env()?;
    info!(logger, "Starting..."; "port" => config.port);
    let logger = Arc::new(logger);

    info!(logger, "Creating database pool..."; "max_connections" => config.db.max_connections);
    // the first connection is only made when a request needs it
    let options = config.db.connect_options()?;
    let pool = config.db.pool_options().connect_lazy_with(options.clone());
    let db = Arc::new(MySqlDb::new(pool, options));

    let environment = Environment::new(logger.clone(), db);

    let request_logger = logger.clone();
    let routes = routes::make_api(environment).with(warp::log::custom(move |request| {
        debug!(request_logger, "Handled request";
            "method" => %request.method(),
            "path" => request.path(),
            "status" => request.status().as_u16(),
            "elapsed_ms" => request.elapsed().as_millis() as u64);
    }));

    let (address, server) = warp::serve(routes).try_bind_with_graceful_shutdown(
        ([0, 0, 0, 0], config.port),
        async {
            tokio::signal::ctrl_c().await.ok();
        },
    )?;

    info!(logger, "Listening..."; "address" => %address);
    server.await;

    info!(logger, "Exiting gracefully...");

    Ok(())
}
