//! User model for StudySync.

/// A registered account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Display name chosen at signup.
    pub username: String,
    /// Email address; the identity key for login and uploads.
    pub email: String,
    /// Password hash (Argon2 PHC string), never the plaintext.
    pub password: String,
    /// Account creation timestamp.
    pub created_at: String,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub username: String,
    /// Email address (unique).
    pub email: String,
    /// Password hash.
    pub password: String,
}

impl NewUser {
    /// Create a new user record from an already-hashed password.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password_hash.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user() {
        let user = NewUser::new("alice", "alice@example.com", "$argon2id$hash");
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.password, "$argon2id$hash");
    }
}
