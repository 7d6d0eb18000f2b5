use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use log::{error, info, warn};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::config::ServerConfig;
use crate::error::StartupError;
use crate::middleware::log_request;
use crate::server::handlers::{
    handle_download, handle_favicon, handle_media, handle_root, handle_upload,
};
use crate::server::state::{AppState, SharedState};
use crate::settings::ConfigStore;
use crate::storage::PathResolver;

pub struct Server {
    listener: TcpListener,
    router: Router,
    config: ServerConfig,
}

impl Server {
    /// Resolves the media root, loads settings and binds the listener.
    pub async fn new(config: ServerConfig) -> Result<Self, StartupError> {
        let resolver = PathResolver::new(&config.media_root, config.symlink_policy).map_err(
            |e| StartupError::MediaRoot(config.media_root.display().to_string(), e),
        )?;
        info!("Root directory set to \"{}\"", resolver.media_root().display());

        let settings = ConfigStore::open(config.settings_path())?;

        let state = AppState::new(resolver, settings);
        let router = build_router(state, &config);

        let socket = config.listen_socket();
        let listener = TcpListener::bind(&socket)
            .await
            .map_err(|e| StartupError::Bind(socket.clone(), e))?;
        info!("Server bound to {}", socket);

        Ok(Self {
            listener,
            router,
            config,
        })
    }

    pub async fn start(self) {
        info!(
            "Starting RAX media server on {} (symlinks: {:?}, uploads up to {} MB)",
            self.config.listen_socket(),
            self.config.symlink_policy,
            self.config.max_upload_size_mb
        );

        if let Err(e) = axum::serve(self.listener, self.router).await {
            error!("Server error: {}", e);
        }
        warn!("Server stopped");
    }
}

/// Routes of the media server
pub fn build_router(state: SharedState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/favicon.ico", get(handle_favicon))
        .route("/download", get(handle_download))
        .route(
            "/upload",
            post(handle_upload).layer(DefaultBodyLimit::max(config.max_upload_size_bytes())),
        )
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .fallback(handle_media)
        .layer(from_fn(log_request))
        .with_state(state)
}
