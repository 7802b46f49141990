//! Pixelbin - Entry Point
//!
//! A multi-user image hosting server with account registration, signed-cookie
//! sessions, and per-user upload/list/view/delete backed by SQLite and a
//! local filesystem tree.

use log::{error, info};

use pixelbin::Server;
use pixelbin::config::AppConfig;
use pixelbin::utils::logging;

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    logging::setup_logging();

    info!("Launching pixelbin server...");

    // Startup is fail-fast: bad configuration or an unusable database aborts
    // the process instead of starting degraded.
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.serve().await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
