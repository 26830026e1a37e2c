use axum::response::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    /// Path the authorization redirect is expected on.
    pub callback: &'static str,
}

/// Liveness check for the callback server.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        callback: "/callback",
    })
}
