//! # CLI Module
//!
//! User-facing commands. Each command builds its collaborators from the
//! configuration, runs one operation of the core and reports the outcome
//! with the colored output macros.
//!
//! ## Commands
//!
//! - [`auth`] - Connects the Spotify account (PKCE flow with a local callback server)
//! - [`logout`] - Forgets every stored token
//! - [`log`] - Logs the currently playing (or a recently played) track or album
//! - [`recent`] - Lists recently played tracks
//! - [`search`] - Searches the Spotify catalogue
//!
//! ## Failure Reporting
//!
//! A failing command prints the error and exits with status 1. Errors that
//! a new authorization would fix also suggest running `spotlog auth`.

mod auth;
mod log;
mod prompt;
mod recent;
mod search;

pub use auth::auth;
pub use auth::logout;
pub use log::{log, write_log};
pub use prompt::{Prompt, StdinPrompt};
pub use recent::recent;
pub use search::search;

use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config::{self, Settings},
    error,
    error::Error,
    management::{FileKeyValueStore, MarkdownNoteStore, TokenStore},
    spotify::{ApiClient, AuthFlow},
};

/// Collaborators shared by the commands.
pub struct Context {
    pub auth: Arc<AuthFlow>,
    pub client: ApiClient,
    pub notes: MarkdownNoteStore,
    pub folder: String,
    pub always_create_track_files: bool,
}

impl Context {
    pub fn from_env() -> Result<Self, Error> {
        let store = TokenStore::new(Arc::new(FileKeyValueStore::default_location()));
        let auth = Arc::new(AuthFlow::new(store, Settings::from_env())?);
        let client = ApiClient::new(Arc::clone(&auth));

        Ok(Self {
            auth,
            client,
            notes: MarkdownNoteStore::new(config::vault_root()),
            folder: config::notes_folder(),
            always_create_track_files: config::always_create_track_files(),
        })
    }
}

fn context() -> Context {
    match Context::from_env() {
        Ok(ctx) => ctx,
        Err(e) => fail(e),
    }
}

/// Reports `err` and ends the command.
fn fail(err: Error) -> ! {
    if err.suggests_reconnect() {
        error!("{}\nRun `spotlog auth` to reconnect your Spotify account.", err);
    }
    error!("{}", err)
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
