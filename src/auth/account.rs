//! Account signup and login.

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, PasswordError};
use crate::context::RequestContext;
use crate::db::{NewUser, User, UserRepository};
use crate::error::Rejection;
use crate::{Result, StudySyncError};

/// Signup request data.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    /// Display name.
    pub username: String,
    /// Email address; must not be registered yet.
    pub email: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
}

impl SignupRequest {
    /// Create a new signup request.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Argon2 is CPU-bound; keep it off the async workers.
async fn hash_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| StudySyncError::Auth(format!("hashing task failed: {e}")))?
        .map_err(|e| StudySyncError::Auth(e.to_string()))
}

async fn verify_blocking(password: String, hash: String) -> Result<std::result::Result<(), PasswordError>> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| StudySyncError::Auth(format!("verification task failed: {e}")))
}

/// Register a new account.
///
/// An email that already has an account is refused with
/// [`Rejection::AlreadyRegistered`] and nothing is written.
pub async fn signup(pool: &SqlitePool, ctx: &RequestContext, req: SignupRequest) -> Result<User> {
    let repo = UserRepository::new(pool);

    if repo.email_exists(&req.email).await? {
        info!(request_id = %ctx.request_id, email = %req.email, "Signup refused: email already registered");
        return Err(Rejection::AlreadyRegistered.into());
    }

    let password_hash = hash_blocking(req.password).await?;
    let user = repo
        .create(&NewUser::new(req.username, req.email, password_hash))
        .await?;

    info!(request_id = %ctx.request_id, user_id = user.id, email = %user.email, "Account created");
    Ok(user)
}

/// Check credentials and return the matching account.
pub async fn login(
    pool: &SqlitePool,
    ctx: &RequestContext,
    email: &str,
    password: &str,
) -> Result<User> {
    let repo = UserRepository::new(pool);

    let user = repo
        .get_by_email(email)
        .await?
        .ok_or(Rejection::AccountNotFound)?;

    match verify_blocking(password.to_string(), user.password.clone()).await? {
        Ok(()) => {
            info!(request_id = %ctx.request_id, user_id = user.id, "Login succeeded");
            Ok(user)
        }
        Err(PasswordError::VerificationFailed) => {
            info!(request_id = %ctx.request_id, user_id = user.id, "Login refused: wrong password");
            Err(Rejection::InvalidCredentials.into())
        }
        Err(e) => {
            warn!(request_id = %ctx.request_id, user_id = user.id, error = %e, "Stored password hash is unusable");
            Err(StudySyncError::Auth(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let db = setup_db().await;
        let ctx = RequestContext::anonymous();

        let user = signup(
            db.pool(),
            &ctx,
            SignupRequest::new("erin", "erin@example.com", "s3cret"),
        )
        .await
        .unwrap();
        assert_ne!(user.password, "s3cret");
        assert!(user.password.starts_with("$argon2id$"));

        let logged_in = login(db.pool(), &ctx, "erin@example.com", "s3cret")
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_signup_duplicate_email() {
        let db = setup_db().await;
        let ctx = RequestContext::anonymous();
        signup(
            db.pool(),
            &ctx,
            SignupRequest::new("erin", "erin@example.com", "s3cret"),
        )
        .await
        .unwrap();

        let err = signup(
            db.pool(),
            &ctx,
            SignupRequest::new("other", "erin@example.com", "different"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::AlreadyRegistered));
        assert_eq!(UserRepository::new(db.pool()).count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let db = setup_db().await;
        let err = login(
            db.pool(),
            &RequestContext::anonymous(),
            "ghost@example.com",
            "whatever",
        )
        .await
        .unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::AccountNotFound));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let db = setup_db().await;
        let ctx = RequestContext::anonymous();
        signup(
            db.pool(),
            &ctx,
            SignupRequest::new("erin", "erin@example.com", "s3cret"),
        )
        .await
        .unwrap();

        let err = login(db.pool(), &ctx, "erin@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::InvalidCredentials));
    }
}
