//! Account handlers: signup, login, logout and session lookup.

use std::sync::Arc;

use axum::{extract::State, Form, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration as CookieDuration;

use crate::auth::{self, SignupRequest};
use crate::context::{Identity, RequestContext};
use crate::error::Rejection;
use crate::web::dto::validation::check;
use crate::web::dto::{LoginForm, SignupForm};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::CurrentUser;
use crate::web::notice::Notice;
use crate::StudySyncError;

/// Page shown after a refused signup or login.
const ACCOUNT_PAGE: &str = "account.html";

/// Turn a workflow error into a notice if it is a refusal.
pub(crate) fn notice_or_error(err: StudySyncError, redirect: &str) -> Result<Notice, ApiError> {
    match err.rejection() {
        Some(rejection) => Ok(Notice::rejected(rejection, redirect)),
        None => Err(err.into()),
    }
}

/// POST /signup - Create an account.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Form(form): Form<SignupForm>,
) -> Result<Notice, ApiError> {
    if let Err(fields) = check(&form) {
        tracing::info!(request_id = %ctx.request_id, ?fields, "Signup refused: missing fields");
        return Ok(Notice::rejected(Rejection::MissingField, ACCOUNT_PAGE));
    }

    let req = SignupRequest::new(form.username, form.email, form.password);
    match auth::signup(state.db.pool(), &ctx, req).await {
        Ok(_) => Ok(Notice::new("Registration successful!", "signup.html")),
        Err(e) => notice_or_error(e, ACCOUNT_PAGE),
    }
}

/// POST /login - Check credentials and start a session.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Notice), ApiError> {
    if let Err(fields) = check(&form) {
        tracing::info!(request_id = %ctx.request_id, ?fields, "Login refused: missing fields");
        return Ok((jar, Notice::rejected(Rejection::MissingField, ACCOUNT_PAGE)));
    }

    let user = match auth::login(state.db.pool(), &ctx, &form.email, &form.password).await {
        Ok(user) => user,
        Err(e) => return notice_or_error(e, ACCOUNT_PAGE).map(|notice| (jar, notice)),
    };

    let token = state.sessions.issue(&user)?;
    let cookie = Cookie::build((state.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(state.sessions.ttl_secs() as i64))
        .build();

    Ok((
        jar.add(cookie),
        Notice::new("Login Successful!", "login.html"),
    ))
}

/// POST /logout - End the session.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    jar: CookieJar,
) -> (CookieJar, Notice) {
    tracing::info!(request_id = %ctx.request_id, actor = %ctx.actor(), "Logged out");
    let removal = Cookie::build((state.cookie_name.clone(), "")).path("/").build();
    (
        jar.remove(removal),
        Notice::new("Logged out.", ACCOUNT_PAGE),
    )
}

/// GET /api/session - Identity of the current session.
#[utoipa::path(
    get,
    path = "/api/session",
    tag = "account",
    responses(
        (status = 200, description = "Current identity", body = Identity),
        (status = 401, description = "No valid session")
    )
)]
pub async fn current_session(CurrentUser(identity): CurrentUser) -> Json<Identity> {
    Json(identity)
}
