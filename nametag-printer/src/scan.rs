//! Printer discovery through the platform print service

use crate::command::CommandOutput;
use crate::error::PrintResult;
use crate::platform::{PlatformFamily, PrintService};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A printer reported by the print service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredPrinter {
    /// Display name
    pub name: String,
    /// Value to pass as the connect address
    pub address: String,
    /// Connection method the address belongs to
    #[serde(rename = "type")]
    pub kind: String,
}

impl DiscoveredPrinter {
    fn system(queue: &str, suffix: &str) -> Self {
        Self {
            name: format!("System Printer: {}{}", queue, suffix),
            address: queue.to_string(),
            kind: "system".to_string(),
        }
    }
}

impl PrintService {
    /// List printers registered with the print service
    ///
    /// Never fails: query errors are logged and yield fewer (or no) entries.
    pub async fn enumerate(&self) -> Vec<DiscoveredPrinter> {
        let result = match self.family() {
            PlatformFamily::MacOs => self.enumerate_macos().await,
            PlatformFamily::Linux => self.enumerate_linux().await,
            PlatformFamily::Windows => self.enumerate_windows().await,
        };

        match result {
            Ok(printers) => {
                info!(count = printers.len(), "Printer scan finished");
                printers
            }
            Err(e) => {
                warn!(error = %e, "Error getting system printers");
                Vec::new()
            }
        }
    }

    async fn enumerate_macos(&self) -> PrintResult<Vec<DiscoveredPrinter>> {
        let output = self.runner().run(&self.query("lpstat", ["-p"])).await?;
        if !output.success() {
            return Ok(Vec::new());
        }

        let mut printers = Vec::new();
        for queue in parse_lpstat_printers(&output.stdout) {
            let cmd = self.query("lpoptions", ["-p", queue.as_str(), "-l"]);
            let is_brother = match self.runner().run(&cmd).await {
                Ok(options) => looks_like_brother(&options),
                Err(e) => {
                    warn!(printer = %queue, error = %e, "Could not read printer options");
                    false
                }
            };
            let suffix = if is_brother { " (Brother)" } else { "" };
            printers.push(DiscoveredPrinter::system(&queue, suffix));
        }
        Ok(printers)
    }

    async fn enumerate_linux(&self) -> PrintResult<Vec<DiscoveredPrinter>> {
        let output = self.runner().run(&self.query("lpstat", ["-a"])).await?;
        let mut printers: Vec<DiscoveredPrinter> = if output.success() {
            parse_lpstat_accepting(&output.stdout)
                .iter()
                .map(|queue| DiscoveredPrinter::system(queue, ""))
                .collect()
        } else {
            Vec::new()
        };

        if printers.is_empty() {
            match self.runner().run(&self.query("lpinfo", ["-v"])).await {
                Ok(devices) if devices.success() => {
                    printers = parse_lpinfo_devices(&devices.stdout)
                        .iter()
                        .map(|queue| DiscoveredPrinter::system(queue, ""))
                        .collect();
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "lpinfo device scan failed"),
            }
        }
        Ok(printers)
    }

    async fn enumerate_windows(&self) -> PrintResult<Vec<DiscoveredPrinter>> {
        let names = match self.runner().run(&self.query("wmic", ["printer", "get", "name"])).await {
            Ok(output) if output.success() => parse_wmic_names(&output.stdout),
            Ok(_) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "wmic printer scan failed, trying PowerShell");
                let cmd = self.query("powershell", ["-Command", "Get-Printer | Format-Table Name"]);
                let output = self.runner().run(&cmd).await?;
                if output.success() {
                    parse_powershell_names(&output.stdout)
                } else {
                    Vec::new()
                }
            }
        };

        Ok(names
            .iter()
            .map(|queue| DiscoveredPrinter::system(queue, ""))
            .collect())
    }
}

fn looks_like_brother(options: &CommandOutput) -> bool {
    let text = options.stdout.to_lowercase();
    text.contains("brother") || text.contains("ql")
}

/// Queue names from `lpstat -p` (`printer NAME is idle. ...`)
fn parse_lpstat_printers(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| line.starts_with("printer "))
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .collect()
}

/// Queue names from `lpstat -a` (`NAME accepting requests since ...`)
fn parse_lpstat_accepting(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| line.contains(" accepting requests") && !line.contains(" not accepting"))
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Device names from `lpinfo -v` (`direct usb://Brother/QL-820NWB?serial=...`)
fn parse_lpinfo_devices(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| line.contains("://"))
        .filter_map(|line| line.split_once(' '))
        .filter_map(|(_, uri)| uri.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Printer names from `wmic printer get name`, header skipped
fn parse_wmic_names(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Printer names from `Get-Printer | Format-Table Name`
fn parse_powershell_names(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip(3)
        .map(str::trim)
        .filter(|name| !name.is_empty() && !name.starts_with('-'))
        .map(str::to_string)
        .collect()
}
