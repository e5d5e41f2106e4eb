//! Per-request context passed explicitly into workflows.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// The authenticated user behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Identity {
    /// User ID.
    pub user_id: i64,
    /// Account email.
    pub email: String,
    /// Display name.
    pub username: String,
}

/// Context for a single request.
///
/// Built once per request by the session lookup and handed to workflow
/// functions; nothing about the caller is kept in global state.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlation ID for log lines of this request.
    pub request_id: Uuid,
    /// Session identity, if the request carried a valid session.
    pub identity: Option<Identity>,
}

impl RequestContext {
    /// Context for a request without a session.
    pub fn anonymous() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            identity: None,
        }
    }

    /// Email of the session user, for log fields.
    pub fn actor(&self) -> &str {
        self.identity
            .as_ref()
            .map(|i| i.email.as_str())
            .unwrap_or("anonymous")
    }
}
