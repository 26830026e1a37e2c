//! Spotify Listening Logger Library
//!
//! Connects to a Spotify account with OAuth 2.0 PKCE, reads the currently
//! playing and recently played tracks, normalizes them into display-ready
//! records and writes them into Markdown notes.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints for the local OAuth callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration from environment variables and `.env`
//! - `error` - Typed failures of the core
//! - `management` - Token, key-value and note storage
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Auth flow, Web API client, normalization and note links
//! - `types` - Data structures and type definitions
//! - `utils` - PKCE primitives and formatting helpers
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use spotlog::{config::Settings, management::*, spotify::*};
//!
//! let store = TokenStore::new(Arc::new(FileKeyValueStore::default_location()));
//! let auth = Arc::new(AuthFlow::new(store, Settings::from_env())?);
//! let state = ApiClient::new(auth).get_currently_playing().await?;
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Result alias for application glue (CLI, server) where any error is
/// printed rather than matched on. The core uses [`error::Result`].
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints a status line with a blue `o` marker.
///
/// ```
/// info!("Fetching currently playing track...");
/// info!("Found {} recently played tracks", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a green check mark line after an operation completed.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red `!` line and exits with status 1.
///
/// Only used at the command boundary: one failed command ends its own
/// invocation and nothing else.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a yellow `!` line for problems the command can live with.
///
/// ```
/// warning!("Failed to open browser");
/// warning!("Search for {} returned nothing", query);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
