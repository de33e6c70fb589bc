//! Shared utilities
//!
//! - [`AppError`] - application error type and HTTP mapping
//! - logger setup

pub mod error;
pub mod logger;

pub use error::{AppError, AppResult};
