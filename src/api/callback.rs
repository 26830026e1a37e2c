use std::sync::Arc;

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::{spotify::AuthFlow, types::CallbackParams, warning};

/// Result of the redirect, `Err` carrying a printable reason.
pub type AuthOutcome = Result<(), String>;

/// Shared between the callback route and the command waiting for it.
#[derive(Clone)]
pub struct CallbackState {
    pub auth: Arc<AuthFlow>,
    pub outcome: Arc<Mutex<Option<AuthOutcome>>>,
}

impl CallbackState {
    pub fn new(auth: Arc<AuthFlow>) -> Self {
        Self {
            auth,
            outcome: Arc::new(Mutex::new(None)),
        }
    }
}

pub async fn callback(
    Query(params): Query<CallbackParams>,
    Extension(state): Extension<CallbackState>,
) -> Html<&'static str> {
    let (page, outcome) = match state.auth.handle_auth(&params).await {
        Ok(_) => (
            Html("<h2>Authentication successful.</h2><p>Close this browser window.</p>"),
            Ok(()),
        ),
        Err(e) => {
            warning!("Authorization failed: {}", e);
            (Html("<h4>Login failed.</h4>"), Err(e.to_string()))
        }
    };

    // a replayed redirect must not mask an earlier success
    let mut lock = state.outcome.lock().await;
    if !matches!(*lock, Some(Ok(()))) {
        *lock = Some(outcome);
    }
    page
}
