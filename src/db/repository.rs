//! User repository for StudySync.

use sqlx::SqlitePool;

use super::user::{NewUser, User};
use crate::error::Rejection;
use crate::{Result, StudySyncError};

/// Repository for user records.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// A duplicate email is reported as [`Rejection::AlreadyRegistered`], which
    /// covers two signups racing past the existence check.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let result = sqlx::query("INSERT INTO users (username, email, password) VALUES (?, ?, ?)")
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&new_user.password)
            .execute(self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    StudySyncError::Rejected(Rejection::AlreadyRegistered)
                }
                other => StudySyncError::Database(other.to_string()),
            })?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| StudySyncError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by email (exact match).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Check whether an account exists for an email.
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
            .bind(email)
            .fetch_one(self.pool)
            .await?;
        Ok(exists.0)
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count.0)
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
    async fn test_create_and_get() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo
            .create(&NewUser::new("alice", "alice@example.com", "hash"))
            .await
            .unwrap();
        assert!(user.id > 0);
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert!(!user.created_at.is_empty());

        let by_id = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "alice@example.com");

        let by_email = repo.get_by_email("alice@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[tokio::test]
    async fn test_get_by_email_is_exact() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        repo.create(&NewUser::new("alice", "alice@example.com", "hash"))
            .await
            .unwrap();

        assert!(repo.get_by_email("ALICE@example.com").await.unwrap().is_none());
        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        repo.create(&NewUser::new("alice", "alice@example.com", "hash"))
            .await
            .unwrap();

        let result = repo
            .create(&NewUser::new("alice2", "alice@example.com", "hash2"))
            .await;
        assert!(matches!(
            result,
            Err(StudySyncError::Rejected(Rejection::AlreadyRegistered))
        ));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_email_exists() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        assert!(!repo.email_exists("bob@example.com").await.unwrap());
        repo.create(&NewUser::new("bob", "bob@example.com", "hash"))
            .await
            .unwrap();
        assert!(repo.email_exists("bob@example.com").await.unwrap());
    }
}
