use anyhow::Result;
use arena_tick_engine::{transport::inbound_channel, Engine, EngineConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = EngineConfig::from_env()?;
    tracing::info!(?config, "starting tick engine");

    let mut engine = Engine::new(config, 0);
    let (_handles, mut inbound) = inbound_channel();
    // `_handles` would be handed to the session gateway's transport layer
    // in a full deployment; this binary runs the engine standalone.

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = shutdown_tx.send(());
    });

    engine.run(&mut inbound, shutdown_rx).await;
    Ok(())
}
