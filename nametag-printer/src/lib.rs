//! # nametag-printer
//!
//! Label printer plumbing - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - Platform print service (CUPS on macOS/Linux, wmic/PowerShell on Windows)
//! - Connection probing and printer discovery
//! - Label dispatch through an ordered command fallback chain
//! - Raw network printing (TCP port 9100)
//!
//! Rendering the label (WHAT to print) and connection state stay in the
//! application crate.
//!
//! ## Example
//!
//! ```ignore
//! use nametag_printer::{ConnectionMethod, ConnectionProbe, PrintDispatcher, PrintService, PrintTarget};
//!
//! let service = PrintService::system();
//! if service.probe("system", "Brother_QL_820NWB", "QL-820NWB").await {
//!     let dispatcher = PrintDispatcher::new(service);
//!     let target = PrintTarget::new(ConnectionMethod::System, "Brother_QL_820NWB");
//!     dispatcher.dispatch(Path::new("img/JoLi.png"), Some(&target)).await;
//! }
//! ```

mod command;
mod dispatch;
mod error;
mod platform;
mod printer;
mod probe;
mod scan;

#[cfg(test)]
mod test_support;

// Re-exports
pub use command::{CommandOutput, CommandRunner, PrintCommand, SystemRunner};
pub use dispatch::{DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_MEDIA, PrintDispatcher, PrintTarget};
pub use error::{PrintError, PrintResult};
pub use platform::{
    ConnectionMethod, DEFAULT_QUERY_TIMEOUT, PlatformFamily, PrintService, SubmitVariant,
};
pub use printer::{NetworkPrinter, Printer, RAW_PORT};
pub use probe::ConnectionProbe;
pub use scan::DiscoveredPrinter;
