//! Name tag label server
//!
//! Renders first/last name labels and sends them to a label printer.
//!
//! # Module layout
//!
//! ```text
//! nametag-server/src/
//! ├── label/      # measurement, sizing, layout, rendering
//! ├── printer/    # saved printer connection
//! ├── core/       # configuration, state, server
//! ├── api/        # HTTP routes and handlers
//! └── utils/      # errors, logging
//! ```

pub mod api;
pub mod core;
pub mod label;
pub mod printer;
pub mod utils;

pub use crate::core::{Config, Server, ServerState};
pub use utils::logger::init_logger_with_file;
pub use utils::{AppError, AppResult};

/// Load `.env` and install the logger
///
/// Returns the configuration read after `.env` was applied.
pub fn setup_environment() -> Config {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    config
}
