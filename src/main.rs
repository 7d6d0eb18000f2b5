//! RAX Media Server - Entry Point
//!
//! Exposes the directory named by `YMS_MEDIA_ROOT` over HTTP.

use log::{error, info};

use rax_media_server::Server;
use rax_media_server::config::ServerConfig;

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Launching media server...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    match Server::new(config).await {
        Ok(server) => server.start().await,
        Err(e) => {
            error!("Server startup failed: {}", e);
            std::process::exit(1);
        }
    }
}
