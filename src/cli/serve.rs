use std::sync::Arc;

use tracing::info;

use crate::server::{AppState, create_router};

use super::Context;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

pub async fn run_serve(ctx: &Context, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let mut server = ctx.config.server.clone();
    if let Some(host) = host {
        server.host = host;
    }
    if let Some(port) = port {
        server.port = port;
    }

    let forum = ctx.open_forum()?;
    let state = Arc::new(AppState::new(forum.clone()));

    let app = create_router(state);
    let addr = server.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    forum.store().close()?;
    Ok(())
}
