//! # API Module
//!
//! Handlers of the short-lived local server that receives Spotify's
//! authorization redirect during `spotlog auth`.
//!
//! - [`callback`] - Takes `code` or `error` from the redirect query, runs
//!   [`crate::spotify::AuthFlow::handle_auth`] and records the outcome in
//!   [`CallbackState`] for the waiting command
//! - [`health`] - Reports status and version
//!
//! Routing lives in [`crate::server::router`].

mod callback;
mod health;

pub use callback::{AuthOutcome, CallbackState, callback};
pub use health::{Health, health};
