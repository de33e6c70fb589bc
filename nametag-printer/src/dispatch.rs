//! Label dispatch with a command fallback chain
//!
//! Label printer drivers disagree on which submission options they accept,
//! so a system queue gets the chain plain → raw → media size and the first
//! command that succeeds wins. The image file is never removed, whatever the
//! outcome.

use crate::platform::{ConnectionMethod, PrintService};
use crate::printer::{NetworkPrinter, Printer};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Default per-attempt timeout
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default media option, 62 mm continuous tape cut at 100 mm
pub const DEFAULT_MEDIA: &str = "Custom.62x100mm";

/// Where a label goes: method plus address, read from the connection state at call time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintTarget {
    pub method: ConnectionMethod,
    pub address: String,
}

impl PrintTarget {
    pub fn new(method: ConnectionMethod, address: impl Into<String>) -> Self {
        Self {
            method,
            address: address.into(),
        }
    }
}

/// Sends rendered labels to printers
#[derive(Debug, Clone)]
pub struct PrintDispatcher {
    service: PrintService,
    media: String,
    attempt_timeout: Duration,
}

impl PrintDispatcher {
    pub fn new(service: PrintService) -> Self {
        Self {
            service,
            media: DEFAULT_MEDIA.to_string(),
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    /// Set the media option used by the last submission variant
    pub fn with_media(mut self, media: impl Into<String>) -> Self {
        self.media = media.into();
        self
    }

    /// Set the timeout applied to each submission attempt
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn service(&self) -> &PrintService {
        &self.service
    }

    /// Print `image` on `target`
    ///
    /// Returns `false` without issuing any command when no printer is
    /// connected, and `false` after every attempt failed.
    #[instrument(skip(self, image, target), fields(path = %image.display()))]
    pub async fn dispatch(&self, image: &Path, target: Option<&PrintTarget>) -> bool {
        let Some(target) = target else {
            info!("No printer connected, label kept");
            return false;
        };

        match target.method {
            ConnectionMethod::System => self.dispatch_system(image, &target.address).await,
            ConnectionMethod::Network => self.dispatch_network(image, &target.address).await,
        }
    }

    async fn dispatch_system(&self, image: &Path, address: &str) -> bool {
        let chain = self
            .service
            .submit_chain(image, address, &self.media, self.attempt_timeout);
        let runner = self.service.runner();

        for (index, command) in chain.iter().enumerate() {
            let attempt = index + 1;
            info!(printer = address, attempt, command = %command, "Submitting label");

            let result = runner
                .run(command)
                .await
                .and_then(|output| output.ensure_success(&command.program));
            match result {
                Ok(output) => {
                    info!(printer = address, attempt, stdout = %output.stdout.trim(), "Print successful");
                    return true;
                }
                Err(e) => {
                    warn!(printer = address, attempt, error = %e, "Print attempt failed");
                }
            }
        }

        error!(printer = address, attempts = chain.len(), "All print options failed, label kept");
        false
    }

    async fn dispatch_network(&self, image: &Path, address: &str) -> bool {
        let data = match tokio::fs::read(image).await {
            Ok(data) => data,
            Err(e) => {
                error!(error = %e, "Could not read label image");
                return false;
            }
        };

        let printer = match NetworkPrinter::from_target(address) {
            Ok(printer) => printer.with_timeout(self.attempt_timeout),
            Err(e) => {
                error!(printer = address, error = %e, "Invalid network printer address");
                return false;
            }
        };

        match printer.print(&data).await {
            Ok(()) => true,
            Err(e) => {
                error!(printer = address, error = %e, "Network print failed, label kept");
                false
            }
        }
    }
}
