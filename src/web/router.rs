//! Router configuration.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    current_session, download_assignment, download_notes, download_question_paper,
    download_upload, list_assignments, list_notes, list_question_papers, list_uploads, login,
    logout, signup, upload_assignment, upload_general, upload_notes, upload_question_paper,
    AppState,
};
use super::middleware::{create_cors_layer, session_layer, SessionLookup};

/// Headroom for form fields and multipart framing on top of the file limit.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Create the main router.
pub fn create_router(
    app_state: Arc<AppState>,
    cors_origins: &[String],
    max_upload_bytes: u64,
) -> Router {
    let account_routes = Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/api/session", get(current_session));

    let upload_routes = Router::new()
        .route("/upload", post(upload_general))
        .route("/uploadAssignment", post(upload_assignment))
        .route("/uploadNotes", post(upload_notes))
        .route("/uploadQPaper", post(upload_question_paper))
        .layer(DefaultBodyLimit::max(
            usize::try_from(max_upload_bytes)
                .unwrap_or(usize::MAX)
                .saturating_add(FORM_OVERHEAD_BYTES),
        ));

    let library_routes = Router::new()
        .route("/api/uploads", get(list_uploads))
        .route("/api/assignments", get(list_assignments))
        .route("/api/notes", get(list_notes))
        .route("/api/qpapers", get(list_question_papers))
        .route("/downloadUpload/:filename", get(download_upload))
        .route("/downloadAssignment/:filename", get(download_assignment))
        .route("/downloadNotes/:filename", get(download_notes))
        .route("/downloadQPaper/:filename", get(download_question_paper));

    let lookup = Arc::new(SessionLookup::new(
        app_state.sessions.clone(),
        app_state.cookie_name.clone(),
    ));

    Router::new()
        .merge(account_routes)
        .merge(upload_routes)
        .merge(library_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let lookup = lookup.clone();
                    session_layer(lookup, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
