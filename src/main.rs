use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use students_api::config::{Cli, Config};
use students_api::storage::SqliteStorage;
use students_api::{Error, Server, app};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let config = Config::load(&cli)?;

    let storage = SqliteStorage::open(&config.storage_path).await?;
    info!(
        env = %config.env,
        version = env!("CARGO_PKG_VERSION"),
        "storage initialized"
    );

    Server::bind(config.http_server.address)
        .serve(app::router(Arc::new(storage)))
        .await
}
