//! # Spotify Integration Module
//!
//! Authentication against the Spotify accounts service and the small part of
//! the Web API the logger needs, plus the normalization of its responses
//! into display-ready records.
//!
//! ## Architecture
//!
//! ```text
//! AuthFlow ──token──> ApiClient ──raw JSON──> normalize ──records──> links
//!    │                                                                │
//! TokenStore (management)                                  NoteStore (management)
//! ```
//!
//! - [`auth`] - OAuth 2.0 PKCE: authorization URL, code exchange, refresh and
//!   the `ensure_access_token` gate every request passes through
//! - [`client`] - Authenticated GETs with typed failures (`204` means nothing
//!   is playing, `401` means the account has to be reconnected)
//! - [`normalize`] - Track, album and search payloads to [`crate::types::FormattedRecord`]
//! - [`links`] - Decides how album tracks reference existing track notes
//!
//! ## Concurrency
//!
//! Every operation is an async task that only suspends on network or
//! persistence I/O. Token refreshes are serialised inside [`AuthFlow`] so two
//! commands racing on an expired token spend the refresh token once.

pub mod auth;
pub mod client;
pub mod links;
pub mod normalize;

pub use auth::AuthFlow;
pub use client::ApiClient;
pub use normalize::AlbumSource;

use reqwest::Client;

use crate::{
    config::Settings,
    error::{Error, Result},
};

/// HTTP client shared by the auth flow and the API client.
///
/// Carries the configured request timeout so no call can hang.
pub fn build_http_client(settings: &Settings) -> Result<Client> {
    Client::builder()
        .timeout(settings.timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::Upstream(format!("cannot build HTTP client: {e}")))
}
