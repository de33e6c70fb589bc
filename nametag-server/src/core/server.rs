//! HTTP server startup

use crate::api;
use crate::core::{Config, Result, ServerError, ServerState};
use tracing::info;

/// HTTP Server
pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    pub async fn run(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.config.label_dir)
            .await
            .map_err(|source| ServerError::LabelDir {
                path: self.config.label_dir.display().to_string(),
                source,
            })?;

        let app = api::build_app().with_state(self.state.clone());

        let addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        info!("HTTP listening on {}", addr);

        axum::serve(listener, app).await?;
        Ok(())
    }
}
