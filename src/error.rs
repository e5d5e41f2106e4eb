//! Error types for StudySync.

use thiserror::Error;

/// An expected, user-facing refusal of a request.
///
/// These are business-rule outcomes rather than faults: the web layer shows
/// them to the end user as a notice instead of an error status.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The form carried no file.
    #[error("Please upload a file!")]
    FileMissing,

    /// The client filename is not a bare, safe name.
    #[error("Invalid file name!")]
    InvalidFilename,

    /// The file exceeds the configured upload size.
    #[error("File is too large!")]
    FileTooLarge,

    /// A file with the same name already exists and overwrites are disabled.
    #[error("A file with this name already exists!")]
    FileExists,

    /// The email given with a general upload belongs to no account.
    #[error("Email not registered!")]
    IdentityNotFound,

    /// Signup with an email that already has an account.
    #[error("Email is already registered!")]
    AlreadyRegistered,

    /// Login with an email that has no account.
    #[error("Email not found!")]
    AccountNotFound,

    /// Login with a wrong password.
    #[error("Invalid password!")]
    InvalidCredentials,

    /// A required form field was empty.
    #[error("Please fill in all required fields!")]
    MissingField,
}

/// Common error type for StudySync.
#[derive(Error, Debug)]
pub enum StudySyncError {
    /// Database error.
    ///
    /// Any failure of the metadata store ends up here and is reported to
    /// clients as a server error.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Expected refusal that is shown to the user.
    #[error("rejected: {0}")]
    Rejected(#[from] Rejection),
}

impl From<sqlx::Error> for StudySyncError {
    fn from(e: sqlx::Error) -> Self {
        StudySyncError::Database(e.to_string())
    }
}

impl StudySyncError {
    /// Returns the rejection if this error is a user-facing refusal.
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            StudySyncError::Rejected(r) => Some(*r),
            _ => None,
        }
    }
}

/// Result type alias for StudySync operations.
pub type Result<T> = std::result::Result<T, StudySyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let err = StudySyncError::Auth("invalid token".to_string());
        assert_eq!(err.to_string(), "authentication error: invalid token");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = StudySyncError::NotFound("blob".to_string());
        assert_eq!(err.to_string(), "blob not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: StudySyncError = io_err.into();
        assert!(matches!(err, StudySyncError::Io(_)));
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn test_rejection_conversion() {
        let err: StudySyncError = Rejection::FileMissing.into();
        assert_eq!(err.rejection(), Some(Rejection::FileMissing));
        assert_eq!(err.to_string(), "rejected: Please upload a file!");
    }

    #[test]
    fn test_rejection_absent_for_faults() {
        let err = StudySyncError::Database("locked".to_string());
        assert_eq!(err.rejection(), None);
    }
}
