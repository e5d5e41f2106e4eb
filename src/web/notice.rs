//! Notice pages for form endpoints.
//!
//! Browser forms get a tiny HTML page that alerts a message and then moves
//! to another page. Both outcomes of a form post use it, so the status is
//! always 200.

use axum::response::{Html, IntoResponse, Response};

use crate::error::Rejection;

/// An alert message plus the page to go to afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    message: String,
    redirect: String,
}

/// Quote a string as a JavaScript literal that is safe inside `<script>`.
fn script_literal(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace("</", "<\\/")
}

impl Notice {
    /// Create a notice.
    pub fn new(message: impl Into<String>, redirect: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            redirect: redirect.into(),
        }
    }

    /// Notice for a refused request.
    pub fn rejected(rejection: Rejection, redirect: impl Into<String>) -> Self {
        Self::new(rejection.to_string(), redirect)
    }

    /// Alert message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Redirect target.
    pub fn redirect(&self) -> &str {
        &self.redirect
    }

    /// Render the page body.
    pub fn render(&self) -> String {
        format!(
            "<script>alert({}); window.location.href = {};</script>",
            script_literal(&self.message),
            script_literal(&self.redirect)
        )
    }
}

impl IntoResponse for Notice {
    fn into_response(self) -> Response {
        Html(self.render()).into_response()
    }
}
