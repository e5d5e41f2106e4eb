//! Session cookie middleware and extractors.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::auth::SessionManager;
use crate::context::{Identity, RequestContext};
use crate::web::error::ApiError;

/// Session verifier installed into request extensions.
#[derive(Debug, Clone)]
pub struct SessionLookup {
    /// Token verifier.
    pub manager: SessionManager,
    /// Name of the session cookie.
    pub cookie_name: String,
}

impl SessionLookup {
    /// Create a new session lookup.
    pub fn new(manager: SessionManager, cookie_name: impl Into<String>) -> Self {
        Self {
            manager,
            cookie_name: cookie_name.into(),
        }
    }

    /// Resolve the identity behind the session cookie, if any.
    ///
    /// A missing, malformed or expired token is an anonymous request.
    pub fn identify(&self, jar: &CookieJar) -> Option<Identity> {
        let cookie = jar.get(&self.cookie_name)?;
        match self.manager.verify(cookie.value()) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid session cookie");
                None
            }
        }
    }
}

/// Middleware function to inject the session lookup into request extensions.
pub async fn session_layer(
    lookup: Arc<SessionLookup>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(lookup);
    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<Arc<SessionLookup>>()
            .and_then(|lookup| lookup.identify(&CookieJar::from_headers(&parts.headers)));

        Ok(RequestContext {
            request_id: Uuid::new_v4(),
            identity,
        })
    }
}

/// Extractor that requires a valid session.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ctx = RequestContext::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|never| match never {});
        ctx.identity
            .map(CurrentUser)
            .ok_or_else(|| ApiError::unauthorized("Not logged in"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::User;
    use axum::http::header::COOKIE;
    use axum::http::HeaderMap;

    fn lookup() -> SessionLookup {
        SessionLookup::new(SessionManager::new("test-secret", 3600), "sid")
    }

    fn jar_with(cookie: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, cookie.parse().unwrap());
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn test_identify_valid_cookie() {
        let lookup = lookup();
        let token = lookup
            .manager
            .issue(&User {
                id: 7,
                username: "fay".into(),
                email: "fay@example.com".into(),
                password: "hash".into(),
                created_at: "2024-01-01 00:00:00".into(),
            })
            .unwrap();

        let identity = lookup.identify(&jar_with(&format!("sid={token}"))).unwrap();
        assert_eq!(identity.user_id, 7);
        assert_eq!(identity.email, "fay@example.com");
    }

    #[test]
    fn test_identify_without_cookie() {
        assert!(lookup().identify(&CookieJar::new()).is_none());
        assert!(lookup().identify(&jar_with("other=1")).is_none());
    }

    #[test]
    fn test_identify_garbage_token() {
        assert!(lookup().identify(&jar_with("sid=not-a-jwt")).is_none());
    }
}
