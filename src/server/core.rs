use axum::Router;
use axum::extract::{DefaultBodyLimit, FromRef};
use axum::routing::{get, post};
use axum_extra::extract::cookie::Key;
use log::info;
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::db::Database;
use crate::error::ServerError;
use crate::handlers::{account, gallery};

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub upload_root: Arc<PathBuf>,
    cookie_key: Key,
}

/// Lets the signed-cookie jar extractor find the session signing key.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.cookie_key.clone()
    }
}

pub struct Server {
    listener: TcpListener,
    router: Router,
}

impl Server {
    /// Prepare the server: open and verify the database, ensure the upload
    /// root exists, build the router, and bind the listener. Any failure
    /// here is fatal to startup.
    pub async fn new(config: AppConfig) -> Result<Self, ServerError> {
        let db = Database::open(&config.database_url)?;
        db.verify_tables()?;
        info!("Database ready at {}", config.database_url);

        let upload_root = config.upload_root_path();
        fs::create_dir_all(&upload_root)?;
        info!("Upload root: {}", upload_root.display());

        let state = AppState {
            db: Arc::new(db),
            upload_root: Arc::new(upload_root),
            cookie_key: Key::derive_from(config.session_secret.as_bytes()),
        };

        let router = build_router(state, config.max_upload_bytes());

        let listener = TcpListener::bind(config.socket_addr()).await?;
        info!("Server bound to {}", listener.local_addr()?);

        Ok(Self { listener, router })
    }

    /// Address the listener actually bound (relevant with port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the accept loop until the process ends.
    pub async fn serve(self) -> io::Result<()> {
        info!("Starting pixelbin server");
        axum::serve(self.listener, self.router).await
    }
}

fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(account::index))
        .route(
            "/register",
            get(account::register_form).post(account::register_submit),
        )
        .route(
            "/login",
            get(account::login_form).post(account::login_submit),
        )
        .route("/logout", get(account::logout))
        .route("/profile", get(account::profile))
        .route("/images", get(gallery::gallery))
        .route("/images/upload", post(gallery::upload))
        .route("/images/{id}/file", get(gallery::image_file))
        .route("/images/{id}/delete", post(gallery::delete_image))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
