use std::{net::SocketAddr, str::FromStr};

use axum::{Extension, Router, routing::get};

use crate::{Res, api, api::CallbackState};

pub fn router(state: CallbackState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)))
}

/// Serves the redirect target on `addr` until the process ends.
pub async fn start_api_server(addr: &str, state: CallbackState) -> Res<()> {
    let addr = SocketAddr::from_str(addr)
        .map_err(|e| format!("Failed to parse server address {addr}: {e}"))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::debug!(%addr, "callback server listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
