//! Configuration management for the Spotify listening logger.
//!
//! Values come from environment variables, optionally populated from a
//! `.env` file in the local data directory. Every accessor falls back to a
//! sensible default so the logger works against the public Spotify
//! endpoints out of the box.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults

use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_CLIENT_ID: &str = "44e32ffa3b9c46398637431d6808481d";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_FOLDER: &str = "songs/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Permissions requested during authorization. Not configurable.
pub const SCOPE: &str = "user-read-currently-playing user-read-recently-played";

/// Loads environment variables from `spotlog/.env` in the local data directory.
///
/// The directory is created when missing. A missing `.env` file is not an
/// error; defaults apply in that case.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/spotlog/.env`
/// - macOS: `~/Library/Application Support/spotlog/.env`
/// - Windows: `%LOCALAPPDATA%/spotlog/.env`
///
/// # Errors
///
/// Returns an error string if the directory cannot be created or the file
/// exists but cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Base directory for everything the logger stores locally.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotlog");
    path
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Address the local OAuth callback server binds to, e.g. `127.0.0.1:8888`.
pub fn server_addr() -> String {
    var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Spotify application client ID (`SPOTIFY_API_AUTH_CLIENT_ID`).
pub fn spotify_client_id() -> String {
    var_or("SPOTIFY_API_AUTH_CLIENT_ID", DEFAULT_CLIENT_ID)
}

/// Redirect target registered with the Spotify application.
///
/// Must point at the `/callback` route of [`server_addr`].
pub fn spotify_redirect_uri() -> String {
    var_or("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

pub fn spotify_apiauth_url() -> String {
    var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

pub fn spotify_apitoken_url() -> String {
    var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// Base URL of the Web API, without a trailing slash.
pub fn spotify_apiurl() -> String {
    var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
        .trim_end_matches('/')
        .to_string()
}

/// Upper bound for a single upstream request.
pub fn request_timeout() -> Duration {
    let secs = env::var("SPOTIFY_REQUEST_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

/// Root directory notes are written under (`SPOTLOG_VAULT`, default `.`).
pub fn vault_root() -> PathBuf {
    PathBuf::from(var_or("SPOTLOG_VAULT", "."))
}

/// Folder, relative to [`vault_root`], holding track and album notes.
pub fn notes_folder() -> String {
    var_or("SPOTLOG_FOLDER", DEFAULT_FOLDER)
}

/// Whether logging an album creates notes for tracks never logged before.
pub fn always_create_track_files() -> bool {
    parse_flag(&var_or("SPOTLOG_ALWAYS_CREATE_TRACK_FILES", "false"))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Everything the auth flow and API client need to reach Spotify.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            client_id: spotify_client_id(),
            redirect_uri: spotify_redirect_uri(),
            scope: SCOPE.to_string(),
            auth_url: spotify_apiauth_url(),
            token_url: spotify_apitoken_url(),
            api_url: spotify_apiurl(),
            timeout: request_timeout(),
        }
    }

    /// Settings pointing every endpoint at `base`, used against local test servers.
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scope: SCOPE.to_string(),
            auth_url: format!("{base}/authorize"),
            token_url: format!("{base}/api/token"),
            api_url: format!("{base}/v1"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
