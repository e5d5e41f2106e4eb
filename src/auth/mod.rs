//! Account module for StudySync.
//!
//! Password hashing, signup/login, and session tokens.

mod account;
mod password;
mod session;

pub use account::{login, signup, SignupRequest};
pub use password::{hash_password, verify_password, PasswordError};
pub use session::{SessionClaims, SessionManager};
