use std::process::ExitCode;

use tracing::{error, info};

use studysync::{Config, Database, WebServer};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = studysync::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        studysync::logging::init_console_only(&config.logging.level);
    }

    info!("StudySync document library");

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database {}: {e}", config.database.path);
            return ExitCode::FAILURE;
        }
    };
    info!("Database opened at {}", config.database.path);

    let server = match WebServer::new(&config, db).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start web server: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.run().await {
        error!("Web server stopped: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
