//! Test helpers for web API tests.
//!
//! Provides a TestServer over an in-memory database and a temporary blob
//! directory, plus helpers for forms and notice pages.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use tempfile::TempDir;

use studysync::config::Config;
use studysync::web::{create_router, AppState};
use studysync::{BlobStore, Database};

/// Name of the session cookie in tests.
pub const COOKIE_NAME: &str = "studysync_session";

/// A running test application.
pub struct TestApp {
    /// HTTP test server.
    pub server: TestServer,
    /// Database behind the server.
    pub db: Database,
    /// Blob store behind the server.
    pub storage: BlobStore,
    /// Keeps the blob directory alive.
    pub dir: TempDir,
}

/// Create a test configuration rooted at `dir`.
pub fn create_test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.auth.jwt_secret = "test-secret-key-for-testing-only".to_string();
    config.auth.cookie_name = COOKIE_NAME.to_string();
    config.storage.root = dir.path().join("files").to_string_lossy().into_owned();
    config
}

/// Create a test application with the default configuration.
pub async fn create_test_app() -> TestApp {
    create_test_app_with(|_| {}).await
}

/// Create a test application, adjusting the configuration first.
pub async fn create_test_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(&dir);
    configure(&mut config);

    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let storage = BlobStore::new(&config.storage.root)
        .await
        .expect("Failed to create blob store");

    let app_state = Arc::new(AppState::new(db.clone(), storage.clone(), &config));
    let router = create_router(
        app_state,
        &config.server.cors_origins,
        config.storage.max_upload_bytes(),
    );
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        db,
        storage,
        dir,
    }
}

/// Build an upload form with text fields and an optional file part.
pub fn upload_form(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> MultipartForm {
    let mut form = MultipartForm::new();
    for (name, value) in fields {
        form = form.add_text(name.to_string(), value.to_string());
    }
    if let Some((filename, bytes)) = file {
        form = form.add_part(
            "fileUpload",
            Part::bytes(bytes.to_vec())
                .file_name(filename.to_string())
                .mime_type("application/octet-stream"),
        );
    }
    form
}

/// Sign up an account through the form endpoint.
pub async fn signup(server: &TestServer, username: &str, email: &str, password: &str) -> TestResponse {
    server
        .post("/signup")
        .form(&[
            ("username", username),
            ("email", email),
            ("password", password),
        ])
        .await
}

/// Log in through the form endpoint.
pub async fn login(server: &TestServer, email: &str, password: &str) -> TestResponse {
    server
        .post("/login")
        .form(&[("email", email), ("password", password)])
        .await
}

/// Alert message and redirect target of a notice page.
pub fn notice(response: &TestResponse) -> (String, String) {
    let html = response.text();
    let message = between(&html, "alert(", "); window.location.href");
    let redirect = between(&html, "window.location.href = ", ";</script>");

    (
        serde_json::from_str(message).expect("alert message is a JSON string"),
        serde_json::from_str(redirect).expect("redirect is a JSON string"),
    )
}

fn between<'a>(haystack: &'a str, start: &str, end: &str) -> &'a str {
    let from = haystack.find(start).expect("start marker") + start.len();
    let to = from + haystack[from..].find(end).expect("end marker");
    &haystack[from..to]
}
