//! StudySync - a document library backend for students.
//!
//! Accounts sign up and log in; documents are uploaded into one of four
//! categories (general uploads, assignments, notes, question papers), listed
//! by their metadata and downloaded by filename.

pub mod auth;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod library;
pub mod logging;
pub mod web;

pub use auth::{hash_password, verify_password, PasswordError, SessionManager};
pub use config::Config;
pub use context::{Identity, RequestContext};
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{Rejection, Result, StudySyncError};
pub use library::{BlobStore, Category, Record, RecordFilter, UploadService};
pub use web::WebServer;
