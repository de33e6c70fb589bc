use crate::label::{RenderOptions, StackGap};
use nametag_printer::{DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_MEDIA, DEFAULT_QUERY_TIMEOUT};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
///
/// # Environment variables
///
/// Every field can be overridden from the environment (or `.env`):
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | HTTP_HOST | 0.0.0.0 | bind host |
/// | HTTP_PORT | 5555 | bind port |
/// | LABEL_DIR | img | label image directory |
/// | FONT_PATH | font/Dia-Black.ttf | bundled typeface |
/// | PRINTER_STATE_FILE | printer_state.json | saved printer connection |
/// | PRINTER_MODEL | QL-820NWB | model recorded in the printer state |
/// | LABEL_MEDIA | Custom.62x100mm | media option of the last print attempt |
/// | PRINT_TIMEOUT_SECS | 10 | timeout of each print attempt |
/// | PROBE_TIMEOUT_SECS | 5 | timeout of each probe/scan query |
/// | AUTO_FIT_MAX_FONT | 300 | first size tried by auto-fit |
/// | STACK_GAP | proportional | `proportional` (size / 10) or pixels |
/// | LOG_LEVEL | info | log level |
/// | LOG_DIR | - | daily rolling log directory |
///
/// # Example
///
/// ```ignore
/// HTTP_PORT=8080 LABEL_DIR=/tmp/labels cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub http_host: String,
    pub http_port: u16,
    /// Where rendered labels are kept
    pub label_dir: PathBuf,
    pub font_path: PathBuf,
    pub printer_state_file: PathBuf,
    pub printer_model: String,
    pub label_media: String,
    pub print_timeout: Duration,
    pub probe_timeout: Duration,
    pub auto_fit_max_font: u32,
    pub stack_gap: StackGap,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_host: "0.0.0.0".into(),
            http_port: 5555,
            label_dir: PathBuf::from("img"),
            font_path: PathBuf::from("font/Dia-Black.ttf"),
            printer_state_file: PathBuf::from("printer_state.json"),
            printer_model: "QL-820NWB".into(),
            label_media: DEFAULT_MEDIA.into(),
            print_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            probe_timeout: DEFAULT_QUERY_TIMEOUT,
            auto_fit_max_font: 300,
            stack_gap: StackGap::Proportional,
            log_level: "info".into(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from the environment
    ///
    /// Unset or unparseable variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        Self {
            http_host: lookup("HTTP_HOST").unwrap_or(defaults.http_host),
            http_port: lookup("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.http_port),
            label_dir: lookup("LABEL_DIR").map(PathBuf::from).unwrap_or(defaults.label_dir),
            font_path: lookup("FONT_PATH").map(PathBuf::from).unwrap_or(defaults.font_path),
            printer_state_file: lookup("PRINTER_STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.printer_state_file),
            printer_model: lookup("PRINTER_MODEL").unwrap_or(defaults.printer_model),
            label_media: lookup("LABEL_MEDIA").unwrap_or(defaults.label_media),
            print_timeout: secs("PRINT_TIMEOUT_SECS", defaults.print_timeout),
            probe_timeout: secs("PROBE_TIMEOUT_SECS", defaults.probe_timeout),
            auto_fit_max_font: lookup("AUTO_FIT_MAX_FONT")
                .and_then(|v| v.parse().ok())
                .filter(|size| *size > 0)
                .unwrap_or(defaults.auto_fit_max_font),
            stack_gap: lookup("STACK_GAP")
                .and_then(|v| StackGap::parse(&v))
                .unwrap_or(defaults.stack_gap),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: lookup("LOG_DIR").or(defaults.log_dir),
        }
    }

    /// `host:port` to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            auto_fit_max_font: self.auto_fit_max_font,
            stack_gap: self.stack_gap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.bind_addr(), "0.0.0.0:5555");
        assert_eq!(config.label_dir, PathBuf::from("img"));
        assert_eq!(config.printer_model, "QL-820NWB");
        assert_eq!(config.label_media, "Custom.62x100mm");
        assert_eq!(config.print_timeout, Duration::from_secs(10));
        assert_eq!(config.probe_timeout, Duration::from_secs(5));
        assert_eq!(config.stack_gap, StackGap::Proportional);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HTTP_PORT", "8080"),
            ("LABEL_DIR", "/tmp/labels"),
            ("PRINT_TIMEOUT_SECS", "3"),
            ("STACK_GAP", "12"),
            ("AUTO_FIT_MAX_FONT", "200"),
            ("LOG_DIR", "logs"),
        ]);
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.label_dir, PathBuf::from("/tmp/labels"));
        assert_eq!(config.print_timeout, Duration::from_secs(3));
        assert_eq!(config.stack_gap, StackGap::Fixed(12));
        assert_eq!(config.render_options().auto_fit_max_font, 200);
        assert_eq!(config.log_dir.as_deref(), Some("logs"));
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let config = config_from(&[
            ("HTTP_PORT", "http"),
            ("STACK_GAP", "wide"),
            ("AUTO_FIT_MAX_FONT", "0"),
        ]);
        assert_eq!(config.http_port, 5555);
        assert_eq!(config.stack_gap, StackGap::Proportional);
        assert_eq!(config.auto_fit_max_font, 300);
    }
}
