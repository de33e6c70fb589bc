//! Platform print service
//!
//! Printer registration checks, enumeration and job submission differ per OS
//! family: CUPS tools (`lpstat`, `lp`, `lpinfo`) on macOS and Linux, `wmic`
//! and PowerShell on Windows. [`PrintService`] picks the family once and
//! exposes the same operations for all of them.

use crate::command::{CommandRunner, PrintCommand, SystemRunner};
use crate::error::PrintResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Default deadline for read-only print service queries
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Operating system family, decides which native tools are used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformFamily {
    MacOs,
    Linux,
    Windows,
}

impl PlatformFamily {
    /// Family of the host this binary was built for
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Linux
        }
    }

    /// Whether the family is driven through CUPS command line tools
    pub fn is_cups(self) -> bool {
        matches!(self, Self::MacOs | Self::Linux)
    }
}

/// How the printer is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMethod {
    /// A queue registered with the platform print service
    System,
    /// A raw TCP printer (`host[:port]`, port 9100 by default)
    Network,
}

impl ConnectionMethod {
    /// Parse a method name, case-insensitive. Unknown names yield `None`.
    pub fn parse(method: &str) -> Option<Self> {
        match method.trim().to_ascii_lowercase().as_str() {
            "system" => Some(Self::System),
            "network" => Some(Self::Network),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Network => "network",
        }
    }
}

impl fmt::Display for ConnectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Submission variants, tried in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitVariant {
    /// Default options
    Plain,
    /// Pass the data through unprocessed
    Raw,
    /// Explicit label media size
    MediaSize,
}

impl SubmitVariant {
    pub const CHAIN: [SubmitVariant; 3] = [Self::Plain, Self::Raw, Self::MediaSize];
}

/// Native print service of one platform family
#[derive(Clone)]
pub struct PrintService {
    family: PlatformFamily,
    runner: Arc<dyn CommandRunner>,
    query_timeout: Duration,
}

impl PrintService {
    pub fn new(family: PlatformFamily, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            family,
            runner,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Print service of the host, backed by real child processes
    pub fn system() -> Self {
        Self::new(PlatformFamily::current(), Arc::new(SystemRunner))
    }

    /// Set the deadline for probe and scan queries
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn family(&self) -> PlatformFamily {
        self.family
    }

    pub fn runner(&self) -> &Arc<dyn CommandRunner> {
        &self.runner
    }

    pub(crate) fn query<I, S>(&self, program: &str, args: I) -> PrintCommand
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PrintCommand::new(program, args, self.query_timeout)
    }

    /// Check whether `address` names a printer known to the print service
    ///
    /// The secondary check only runs when the primary query cannot be
    /// completed. Never fails; an unanswerable question is `false`.
    pub async fn is_registered(&self, address: &str) -> bool {
        match self.primary_check(address).await {
            Ok(found) => {
                info!(printer = address, found, "Primary printer check finished");
                found
            }
            Err(e) => {
                warn!(printer = address, error = %e, "Primary printer check failed, trying fallback");
                match self.fallback_check(address).await {
                    Ok(found) => {
                        info!(printer = address, found, "Fallback printer check finished");
                        found
                    }
                    Err(e) => {
                        warn!(printer = address, error = %e, "Fallback printer check failed");
                        false
                    }
                }
            }
        }
    }

    async fn primary_check(&self, address: &str) -> PrintResult<bool> {
        if self.family.is_cups() {
            let output = self.runner.run(&self.query("lpstat", ["-p", address])).await?;
            Ok(output.success())
        } else {
            let filter = format!("name='{}'", address);
            let cmd = self.query("wmic", ["printer", "where", filter.as_str(), "get", "name"]);
            let output = self.runner.run(&cmd).await?;
            Ok(output.stdout.contains(address))
        }
    }

    async fn fallback_check(&self, address: &str) -> PrintResult<bool> {
        if self.family.is_cups() {
            let cmd = self.query("lp", ["-d", address, "-o", "printer-info"]);
            let output = self.runner.run(&cmd).await?;
            Ok(!output.stderr.to_lowercase().contains("no such printer"))
        } else {
            let script = format!("Get-Printer -Name {}", ps_quote(address));
            let cmd = self.query("powershell", ["-Command", script.as_str()]);
            let output = self.runner.run(&cmd).await?;
            Ok(output.success())
        }
    }

    /// Ordered submission commands for `image` on the printer `address`
    ///
    /// Variants the family cannot express are left out of the chain.
    pub fn submit_chain(
        &self,
        image: &Path,
        address: &str,
        media: &str,
        timeout: Duration,
    ) -> Vec<PrintCommand> {
        SubmitVariant::CHAIN
            .iter()
            .filter_map(|variant| self.submit_command(*variant, image, address, media, timeout))
            .collect()
    }

    fn submit_command(
        &self,
        variant: SubmitVariant,
        image: &Path,
        address: &str,
        media: &str,
        timeout: Duration,
    ) -> Option<PrintCommand> {
        let path = image.display().to_string();

        if self.family.is_cups() {
            let mut args = vec!["-d".to_string(), address.to_string()];
            match variant {
                SubmitVariant::Plain => {}
                SubmitVariant::Raw => args.extend(["-o".to_string(), "raw".to_string()]),
                SubmitVariant::MediaSize => {
                    args.extend(["-o".to_string(), format!("media={}", media)])
                }
            }
            args.push(path);
            return Some(PrintCommand::new("lp", args, timeout));
        }

        match variant {
            SubmitVariant::Plain => {
                let script = format!(
                    "Start-Process -FilePath {} -Verb PrintTo -ArgumentList {} -Wait",
                    ps_quote(&path),
                    ps_quote(&format!("\"{}\"", address)),
                );
                Some(PrintCommand::new("powershell", ["-Command".to_string(), script], timeout))
            }
            SubmitVariant::Raw => Some(PrintCommand::new(
                "print",
                [format!("/D:{}", address), path],
                timeout,
            )),
            // The Windows tools have no per-job media option
            SubmitVariant::MediaSize => None,
        }
    }
}

impl fmt::Debug for PrintService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrintService")
            .field("family", &self.family)
            .field("query_timeout", &self.query_timeout)
            .finish_non_exhaustive()
    }
}

/// Single-quote a PowerShell string literal
fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
