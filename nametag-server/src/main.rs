use nametag_server::{Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. .env, configuration, logging
    let config = setup_environment();

    tracing::info!("Name tag server starting...");

    // 2. Typeface, saved printer connection, print service
    let state = ServerState::initialize(&config).await;

    // 3. HTTP
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
