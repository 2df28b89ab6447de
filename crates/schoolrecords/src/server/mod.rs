//! HTTP server for the browser front end.
//!
//! Serves the JSON API under `/api` and, when configured, the static
//! front-end files for every other path. All handlers share one
//! [`SchoolDatabase`] behind an async mutex, so ID allocation and the
//! whole-file writes never interleave within the process.
//!
//! Mutations go through [`AppState::write`], which runs the file write on
//! the blocking pool while the lock is held. Reads only touch the
//! in-memory collections and stay on the async workers.

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, sync::Mutex};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::SchoolDatabase;

pub use error::{ApiError, ApiResult};

/// State shared by every request.
#[derive(Debug)]
pub struct AppState {
    /// The record store.
    pub db: Arc<Mutex<SchoolDatabase>>,
    /// Configuration the server was started with.
    pub config: Config,
}

impl AppState {
    /// Wrap a database and configuration for use as router state.
    #[must_use]
    pub fn new(db: SchoolDatabase, config: Config) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            config,
        })
    }

    /// Run a mutation on the blocking pool, holding the lock until the
    /// write has finished.
    ///
    /// # Errors
    ///
    /// Returns the mutation's error, or [`Error::Internal`] if the blocking
    /// task panicked.
    pub async fn write<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut SchoolDatabase) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut db = Arc::clone(&self.db).lock_owned().await;
        tokio::task::spawn_blocking(move || f(&mut *db))
            .await
            .map_err(|e| Error::internal(format!("write task failed: {e}")))?
    }
}

async fn api_not_found() -> ApiError {
    Error::not_found("route", "no such API endpoint").into()
}

/// Build the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(routes::health))
        .route(
            "/students",
            get(routes::list_students).post(routes::create_student),
        )
        .route(
            "/students/{id}",
            get(routes::get_student)
                .put(routes::update_student)
                .delete(routes::delete_student),
        )
        .route("/students/{id}/report", get(routes::student_report))
        .route(
            "/teachers",
            get(routes::list_teachers).post(routes::create_teacher),
        )
        .route(
            "/teachers/{id}",
            get(routes::get_teacher)
                .put(routes::update_teacher)
                .delete(routes::delete_teacher),
        )
        .route("/marks", get(routes::list_marks).post(routes::create_mark))
        .route(
            "/marks/{id}",
            get(routes::get_mark)
                .put(routes::update_mark)
                .delete(routes::delete_mark),
        )
        .route(
            "/settings",
            get(routes::get_settings).put(routes::update_settings),
        )
        .route("/dashboard", get(routes::dashboard))
        .route("/export", get(routes::export_bundle))
        .route("/import", post(routes::import_bundle))
        .route("/save", post(routes::save_file))
        .fallback(api_not_found);

    let server = &state.config.server;
    let mut app = Router::new().nest("/api", api);

    if let Some(dir) = &server.static_dir {
        info!("Serving static files from {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }

    app = app
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(TraceLayer::new_for_http());

    if server.cors_permissive {
        app = app.layer(CorsLayer::permissive());
    }

    app.with_state(state)
}

/// Open the database and serve until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the database cannot be opened, the address cannot
/// be bound, or the server fails while running.
pub async fn serve(config: Config) -> Result<()> {
    config.validate()?;
    let (host, port) = config.bind_addr();
    let listener = bind(host, port).await?;

    info!("Initializing state...");
    let db = SchoolDatabase::from_config(&config)?;
    let app = build_router(AppState::new(db, config));

    let addr = listener
        .local_addr()
        .map_err(|e| Error::server(e.to_string()))?;
    info!("Server running on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::server(e.to_string()))?;

    info!("Server shut down");
    Ok(())
}

/// Bind a listener, resolving `host` if it is a name.
async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .map_err(|e| Error::server(format!("failed to bind {host}:{port}: {e}")))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
