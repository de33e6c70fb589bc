//! Server configuration, shared state and startup
//!
//! - [`Config`] - environment configuration
//! - [`ServerState`] - renderer, printer state and dispatcher shared by handlers
//! - [`Server`] - HTTP server
//! - [`ServerError`] - startup errors

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::{PrintOutcome, ServerState};
