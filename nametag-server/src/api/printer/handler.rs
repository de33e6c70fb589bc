//! Printer connection handlers

use axum::{Json, extract::State};
use nametag_printer::DiscoveredPrinter;
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::printer::PrinterState;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Default, Deserialize)]
pub struct ConnectPayload {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub devices: Vec<DiscoveredPrinter>,
}

/// GET /api/printer/status - current connection, probed on every call
pub async fn status(State(state): State<ServerState>) -> Json<PrinterState> {
    Json(state.printers.status().await)
}

/// POST /api/printer/connect - probe `address` with `method` and save the result
pub async fn connect(
    State(state): State<ServerState>,
    Json(payload): Json<ConnectPayload>,
) -> AppResult<Json<PrinterState>> {
    let method = payload.method.as_deref().map(str::trim).unwrap_or_default();
    let address = payload.address.as_deref().map(str::trim).unwrap_or_default();
    if method.is_empty() || address.is_empty() {
        return Err(AppError::validation("Missing address or method"));
    }

    Ok(Json(state.printers.connect(method, address).await))
}

/// POST /api/printer/scan/system - enumerate printers known to the print service
pub async fn scan_system(State(state): State<ServerState>) -> Json<ScanResponse> {
    Json(ScanResponse {
        devices: state.scan_printers().await,
    })
}

#[cfg(test)]
mod tests {
    use crate::api::{build_app, testing::call};
    use crate::core::state::testing::{FixedRunner, state_with};
    use crate::printer::state::testing::StubProbe;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_status_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(dir.path(), StubProbe::new(true), FixedRunner::exit(0, "")).await;

        let (status, body) = call(build_app().with_state(state), "GET", "/api/printer/status", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["connected"], false);
        assert_eq!(body["status"], "Not connected");
        assert_eq!(body["model"], "QL-820NWB");
        assert!(body["address"].is_null());
    }

    #[tokio::test]
    async fn test_connect_requires_method_and_address() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(dir.path(), StubProbe::new(true), FixedRunner::exit(0, "")).await;

        for payload in [json!({"address": "QL820"}), json!({"method": "system", "address": "  "})] {
            let (status, body) = call(
                build_app().with_state(state.clone()),
                "POST",
                "/api/printer/connect",
                Some(payload),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], "Missing address or method");
        }
    }

    #[tokio::test]
    async fn test_connect_unknown_printer() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(dir.path(), StubProbe::new(false), FixedRunner::exit(0, "")).await;

        let (status, body) = call(
            build_app().with_state(state),
            "POST",
            "/api/printer/connect",
            Some(json!({"method": "system", "address": "UNKNOWN_PRINTER"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["connected"], false);
        assert_eq!(body["status"], "Failed to connect to system printer at UNKNOWN_PRINTER");
    }

    #[tokio::test]
    async fn test_connect_then_status() {
        let dir = tempfile::tempdir().unwrap();
        let probe = StubProbe::new(true);
        let state = state_with(dir.path(), probe.clone(), FixedRunner::exit(0, "")).await;

        let (_, body) = call(
            build_app().with_state(state.clone()),
            "POST",
            "/api/printer/connect",
            Some(json!({"method": "system", "address": "QL820"})),
        )
        .await;
        assert_eq!(body["connected"], true);
        assert_eq!(body["method"], "system");
        assert_eq!(body["status"], "Connected via SYSTEM");

        probe.set(false);
        let (_, body) = call(build_app().with_state(state), "GET", "/api/printer/status", None).await;
        assert_eq!(body["connected"], false);
        assert_eq!(body["status"], "Printer disconnected");
    }

    #[tokio::test]
    async fn test_scan_system() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FixedRunner::exit(0, "QL820 accepting requests since Mon 01 Jan 2024\n");
        let state = state_with(dir.path(), StubProbe::new(true), runner).await;

        let (status, body) = call(build_app().with_state(state), "POST", "/api/printer/scan/system", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"devices": [{"name": "System Printer: QL820", "address": "QL820", "type": "system"}]})
        );
    }
}
