//! Shared core for chirp modules: unified service error, id/time helpers,
//! JSON merge-patch, and host configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::ServiceConfig;
pub use error::{ServiceError, error_code};
pub use types::{merge_patch, new_id, now_rfc3339};
