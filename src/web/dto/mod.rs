//! Data Transfer Objects for the web layer.

pub mod request;
pub mod validation;

pub use request::*;
