//! Web layer for StudySync.
//!
//! Form endpoints answer with notice pages for browsers; listing, download
//! and session endpoints speak JSON and byte streams.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notice;
pub mod openapi;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use notice::Notice;
pub use router::{create_health_router, create_router};
pub use server::WebServer;
