//! Printer connection probe

use crate::platform::{ConnectionMethod, PrintService};
use crate::printer::{NetworkPrinter, Printer};
use async_trait::async_trait;
use tracing::{info, warn};

/// Read-only check whether a printer identity is reachable
///
/// Implementations never fail: anything that cannot be confirmed is `false`.
#[async_trait]
pub trait ConnectionProbe: Send + Sync {
    async fn probe(&self, method: &str, address: &str, model: &str) -> bool;
}

#[async_trait]
impl ConnectionProbe for PrintService {
    async fn probe(&self, method: &str, address: &str, model: &str) -> bool {
        info!(method, printer = address, model, "Testing printer connection");

        match ConnectionMethod::parse(method) {
            Some(ConnectionMethod::System) => self.is_registered(address).await,
            Some(ConnectionMethod::Network) => match NetworkPrinter::from_target(address) {
                Ok(printer) => printer.is_online().await,
                Err(e) => {
                    warn!(printer = address, error = %e, "Invalid network printer address");
                    false
                }
            },
            None => {
                warn!(method, "No valid connection method specified");
                false
            }
        }
    }
}
