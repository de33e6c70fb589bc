//! Shared server state and the print flow

use crate::core::Config;
use crate::label::{LabelRenderer, LabelRequest, RenderedLabel, TextMeasurer, font_candidates};
use crate::printer::{JsonFileStore, PrinterManager};
use crate::utils::{AppError, AppResult};
use nametag_printer::{DiscoveredPrinter, PrintDispatcher, PrintService};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Result of one print request
#[derive(Debug, Clone, Serialize)]
pub struct PrintOutcome {
    /// Whether a printer accepted the label
    pub printed: bool,
    /// Address the label was sent to, `None` when no printer was connected
    pub printer: Option<String>,
    #[serde(flatten)]
    pub label: RenderedLabel,
}

/// State shared by every handler
///
/// Cheap to clone.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub renderer: LabelRenderer,
    pub printers: Arc<PrinterManager>,
    pub dispatcher: PrintDispatcher,
}

impl ServerState {
    pub fn new(
        config: Config,
        renderer: LabelRenderer,
        printers: Arc<PrinterManager>,
        dispatcher: PrintDispatcher,
    ) -> Self {
        Self {
            config,
            renderer,
            printers,
            dispatcher,
        }
    }

    /// Build the state from configuration
    ///
    /// Loads the typeface and the saved printer connection, revalidating it once.
    pub async fn initialize(config: &Config) -> Self {
        let service = PrintService::system().with_query_timeout(config.probe_timeout);
        info!(platform = ?service.family(), "Print service selected");

        let measurer = TextMeasurer::load(&font_candidates(&config.font_path));
        let renderer =
            LabelRenderer::new(measurer, &config.label_dir).with_options(config.render_options());

        let store = Arc::new(JsonFileStore::new(&config.printer_state_file));
        let printers =
            PrinterManager::load(store, Arc::new(service.clone()), &config.printer_model).await;

        let dispatcher = PrintDispatcher::new(service)
            .with_media(&config.label_media)
            .with_attempt_timeout(config.print_timeout);

        Self::new(config.clone(), renderer, Arc::new(printers), dispatcher)
    }

    /// Render a label and send it to the connected printer
    ///
    /// The image is kept whether or not printing succeeds.
    #[instrument(skip(self, request), fields(layout = ?request.layout, sizing = ?request.sizing_mode))]
    pub async fn print_label(&self, request: LabelRequest) -> AppResult<PrintOutcome> {
        let renderer = self.renderer.clone();
        let label = tokio::task::spawn_blocking(move || renderer.render(&request))
            .await
            .map_err(|e| AppError::internal(format!("render task failed: {}", e)))??;

        let target = self.printers.target().await;
        let printed = self.dispatcher.dispatch(&label.path, target.as_ref()).await;

        Ok(PrintOutcome {
            printed,
            printer: target.map(|t| t.address),
            label,
        })
    }

    /// Printers known to the platform print service
    pub async fn scan_printers(&self) -> Vec<DiscoveredPrinter> {
        self.dispatcher.service().enumerate().await
    }
}
