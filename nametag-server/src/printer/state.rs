//! Printer connection state
//!
//! One [`PrinterState`] document per process, persisted through a
//! [`StateStore`] after every change. [`PrinterManager`] owns it behind a
//! single mutex, so load, connect and status checks never interleave.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nametag_printer::{ConnectionMethod, ConnectionProbe, PrintTarget};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub const STATUS_NOT_CONNECTED: &str = "Not connected";
pub const STATUS_DISCONNECTED: &str = "Printer disconnected";

/// Last known printer connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterState {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub method: Option<ConnectionMethod>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub status: String,
    /// RFC 3339 on write; epoch seconds are accepted on read
    #[serde(default, deserialize_with = "deserialize_last_attempt")]
    pub last_attempt: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AttemptTime {
    EpochSeconds(f64),
    Timestamp(DateTime<Utc>),
}

/// Deserialize an RFC 3339 string or a number of epoch seconds
fn deserialize_last_attempt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<AttemptTime> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(AttemptTime::Timestamp(at)) => Ok(Some(at)),
        Some(AttemptTime::EpochSeconds(seconds)) => {
            let millis = (seconds * 1000.0).round();
            if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
                return Err(serde::de::Error::custom(format!("invalid epoch seconds: {seconds}")));
            }
            DateTime::from_timestamp_millis(millis as i64)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("epoch seconds out of range: {seconds}")))
        }
    }
}

impl PrinterState {
    /// Disconnected state for `model`
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            connected: false,
            method: None,
            address: None,
            model: model.into(),
            status: STATUS_NOT_CONNECTED.to_string(),
            last_attempt: None,
        }
    }

    /// Dispatch target, present only while connected
    pub fn target(&self) -> Option<PrintTarget> {
        if !self.connected {
            return None;
        }
        match (self.method, self.address.as_deref()) {
            (Some(method), Some(address)) if !address.is_empty() => Some(PrintTarget::new(method, address)),
            _ => None,
        }
    }

    fn invalidate(&mut self) {
        self.connected = false;
        self.status = STATUS_DISCONNECTED.to_string();
    }
}

#[derive(Debug, Error)]
pub enum StateStoreError {
    #[error("State file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("State file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistence port for [`PrinterState`]
#[async_trait]
pub trait StateStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet
    async fn load(&self) -> Result<Option<PrinterState>, StateStoreError>;

    /// Overwrite the stored document
    async fn save(&self, state: &PrinterState) -> Result<(), StateStoreError>;
}

/// JSON document on disk, plain overwrite
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load(&self) -> Result<Option<PrinterState>, StateStoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, state: &PrinterState) -> Result<(), StateStoreError> {
        let data = serde_json::to_vec_pretty(state)?;
        tokio::fs::write(&self.path, data).await?;
        Ok(())
    }
}

/// Owner of the process-wide printer state
pub struct PrinterManager {
    state: Mutex<PrinterState>,
    store: Arc<dyn StateStore>,
    probe: Arc<dyn ConnectionProbe>,
}

impl PrinterManager {
    /// Load the persisted state and revalidate it once
    ///
    /// A missing or unreadable document starts from the disconnected default.
    pub async fn load(store: Arc<dyn StateStore>, probe: Arc<dyn ConnectionProbe>, model: &str) -> Self {
        let state = match store.load().await {
            Ok(Some(state)) => state,
            Ok(None) => {
                info!("No saved printer state, starting disconnected");
                PrinterState::new(model)
            }
            Err(e) => {
                warn!(error = %e, "Could not load printer state, starting disconnected");
                PrinterState::new(model)
            }
        };

        let manager = Self {
            state: Mutex::new(state),
            store,
            probe,
        };

        {
            let mut state = manager.state.lock().await;
            if state.model.is_empty() {
                state.model = model.to_string();
            }
            manager.revalidate(&mut state).await;
            manager.persist(&state).await;
        }

        manager
    }

    /// Current state, revalidated with one probe when connected
    pub async fn status(&self) -> PrinterState {
        let mut state = self.state.lock().await;
        if self.revalidate(&mut state).await {
            self.persist(&state).await;
        }
        state.clone()
    }

    /// Probe `address` and record the outcome
    pub async fn connect(&self, method: &str, address: &str) -> PrinterState {
        let mut state = self.state.lock().await;

        let connected = self.probe.probe(method, address, &state.model).await;
        state.connected = connected;
        state.last_attempt = Some(Utc::now());

        // a failed attempt leaves the previous identity in place
        if connected {
            state.method = ConnectionMethod::parse(method);
            state.address = Some(address.to_string());
            state.status = format!("Connected via {}", method.trim().to_uppercase());
            info!(method, printer = address, "Printer connected");
        } else {
            state.status = format!("Failed to connect to {} printer at {}", method.trim(), address);
            warn!(method, printer = address, "Printer connection failed");
        }

        self.persist(&state).await;
        state.clone()
    }

    /// Dispatch target as of now, without probing
    pub async fn target(&self) -> Option<PrintTarget> {
        self.state.lock().await.target()
    }

    /// Copy of the state without probing
    pub async fn snapshot(&self) -> PrinterState {
        self.state.lock().await.clone()
    }

    /// Returns `true` when the state was invalidated
    async fn revalidate(&self, state: &mut PrinterState) -> bool {
        if !state.connected {
            return false;
        }

        let reachable = match (state.method, state.address.as_deref()) {
            (Some(method), Some(address)) => self.probe.probe(method.as_str(), address, &state.model).await,
            _ => false,
        };

        if reachable {
            false
        } else {
            warn!(printer = ?state.address, "Saved printer no longer reachable");
            state.invalidate();
            true
        }
    }

    async fn persist(&self, state: &PrinterState) {
        if let Err(e) = self.store.save(state).await {
            warn!(error = %e, "Failed to save printer state");
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{MemoryStore, StubProbe};
    use super::*;
    use std::sync::atomic::Ordering;

    fn connected_state() -> PrinterState {
        PrinterState {
            connected: true,
            method: Some(ConnectionMethod::System),
            address: Some("QL820".to_string()),
            model: "QL-820NWB".to_string(),
            status: "Connected via SYSTEM".to_string(),
            last_attempt: None,
        }
    }

    #[tokio::test]
    async fn test_first_run_defaults() {
        let store = Arc::new(MemoryStore::default());
        let probe = StubProbe::new(true);
        let manager = PrinterManager::load(store.clone(), probe.clone(), "QL-820NWB").await;

        let state = manager.snapshot().await;
        assert_eq!(state, PrinterState::new("QL-820NWB"));
        assert_eq!(probe.calls(), 0);
        assert_eq!(store.saved(), Some(state));
    }

    #[tokio::test]
    async fn test_load_keeps_valid_connection() {
        let store = MemoryStore::with(connected_state());
        let probe = StubProbe::new(true);
        let manager = PrinterManager::load(store, probe.clone(), "QL-820NWB").await;

        assert!(manager.snapshot().await.connected);
        assert_eq!(probe.calls(), 1);
        assert_eq!(
            manager.target().await,
            Some(PrintTarget::new(ConnectionMethod::System, "QL820"))
        );
    }

    #[tokio::test]
    async fn test_load_invalidates_and_persists() {
        let store = MemoryStore::with(connected_state());
        let probe = StubProbe::new(false);
        let manager = PrinterManager::load(store.clone(), probe, "QL-820NWB").await;

        let state = manager.snapshot().await;
        assert!(!state.connected);
        assert_eq!(state.status, STATUS_DISCONNECTED);
        assert_eq!(store.saved().unwrap().status, STATUS_DISCONNECTED);
        assert_eq!(manager.target().await, None);
    }

    #[tokio::test]
    async fn test_connect_unknown_printer() {
        let store = Arc::new(MemoryStore::default());
        let probe = StubProbe::new(false);
        let manager = PrinterManager::load(store.clone(), probe, "QL-820NWB").await;

        let state = manager.connect("system", "UNKNOWN_PRINTER").await;
        assert!(!state.connected);
        assert!(state.status.contains("UNKNOWN_PRINTER"));
        assert_eq!(state.status, "Failed to connect to system printer at UNKNOWN_PRINTER");
        assert!(state.last_attempt.is_some());
        assert_eq!(store.saved(), Some(state));
    }

    #[tokio::test]
    async fn test_connect_success() {
        let store = Arc::new(MemoryStore::default());
        let manager = PrinterManager::load(store.clone(), StubProbe::new(true), "QL-820NWB").await;

        let state = manager.connect("system", "QL820").await;
        assert!(state.connected);
        assert_eq!(state.status, "Connected via SYSTEM");
        assert_eq!(state.method, Some(ConnectionMethod::System));
        assert_eq!(store.saved().unwrap().address.as_deref(), Some("QL820"));
    }

    #[tokio::test]
    async fn test_connect_unknown_method() {
        let manager =
            PrinterManager::load(Arc::new(MemoryStore::default()), StubProbe::new(true), "QL-820NWB").await;

        let state = manager.connect("bluetooth", "QL820").await;
        assert!(!state.connected);
        assert_eq!(state.method, None);
        assert_eq!(manager.target().await, None);
    }

    #[tokio::test]
    async fn test_status_probes_every_call() {
        let store = MemoryStore::with(connected_state());
        let probe = StubProbe::new(true);
        let manager = PrinterManager::load(store.clone(), probe.clone(), "QL-820NWB").await;
        let saves_after_load = store.saves.load(Ordering::SeqCst);

        assert!(manager.status().await.connected);
        assert!(manager.status().await.connected);
        assert_eq!(probe.calls(), 3);
        // still valid, nothing to persist
        assert_eq!(store.saves.load(Ordering::SeqCst), saves_after_load);

        probe.set(false);
        let state = manager.status().await;
        assert!(!state.connected);
        assert_eq!(state.status, STATUS_DISCONNECTED);
        assert_eq!(store.saved().unwrap().status, STATUS_DISCONNECTED);

        // disconnected state is not probed again
        manager.status().await;
        assert_eq!(probe.calls(), 4);
    }

    #[tokio::test]
    async fn test_json_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("printer_state.json"));

        assert!(store.load().await.unwrap().is_none());
        store.save(&connected_state()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(connected_state()));
    }

    #[tokio::test]
    async fn test_corrupt_state_file_starts_disconnected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("printer_state.json");
        std::fs::write(&path, b"{\"connected\": tru").unwrap();

        let store = Arc::new(JsonFileStore::new(&path));
        let manager = PrinterManager::load(store, StubProbe::new(true), "QL-820NWB").await;

        assert_eq!(manager.snapshot().await, PrinterState::new("QL-820NWB"));
        // default written back over the corrupt document
        let saved: PrinterState = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(saved.status, STATUS_NOT_CONNECTED);
    }

    #[tokio::test]
    async fn test_load_epoch_seconds_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("printer_state.json");
        let document = r#"{
            "connected": true,
            "method": "system",
            "address": "QL820",
            "model": "QL-820NWB",
            "status": "Connected via SYSTEM",
            "last_attempt": 1712345678.123
        }"#;
        std::fs::write(&path, document).unwrap();

        let store = Arc::new(JsonFileStore::new(&path));
        let manager = PrinterManager::load(store.clone(), StubProbe::new(true), "QL-820NWB").await;

        let state = manager.snapshot().await;
        assert!(state.connected);
        assert_eq!(state.address.as_deref(), Some("QL820"));
        assert_eq!(state.status, "Connected via SYSTEM");
        assert_eq!(state.last_attempt, DateTime::from_timestamp_millis(1_712_345_678_123));

        // written back as RFC 3339 and still readable
        let reloaded = store.load().await.unwrap().unwrap();
        assert_eq!(reloaded, state);
        let raw: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert!(raw["last_attempt"].is_string());
    }

    #[test]
    fn test_last_attempt_forms() {
        let parse = |json: &str| serde_json::from_str::<PrinterState>(json).map(|s| s.last_attempt);

        assert_eq!(
            parse(r#"{"last_attempt": 1712345678}"#).unwrap(),
            DateTime::from_timestamp(1_712_345_678, 0)
        );
        assert_eq!(
            parse(r#"{"last_attempt": "2024-04-05T19:34:38Z"}"#).unwrap(),
            DateTime::from_timestamp(1_712_345_678, 0)
        );
        assert_eq!(parse(r#"{"last_attempt": null}"#).unwrap(), None);
        assert_eq!(parse(r#"{}"#).unwrap(), None);
        assert!(parse(r#"{"last_attempt": "yesterday"}"#).is_err());
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let state: PrinterState = serde_json::from_str(r#"{"connected": false}"#).unwrap();
        assert_eq!(state.method, None);
        assert!(state.model.is_empty());
    }
}
