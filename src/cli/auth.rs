use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;

use crate::{
    api::{AuthOutcome, CallbackState},
    config, error, info,
    server::start_api_server,
    success, warning,
};

use super::{context, fail, spinner};

/// Seconds the command waits for the browser redirect.
const AUTH_TIMEOUT_SECS: u64 = 120;

/// Connects the Spotify account.
///
/// Starts the local callback server, opens the authorization URL in the
/// browser and waits for the redirect to complete the code exchange.
pub async fn auth() {
    let ctx = context();
    let state = CallbackState::new(Arc::clone(&ctx.auth));

    let auth_url = match ctx.auth.build_authorization_url().await {
        Ok(url) => url,
        Err(e) => fail(e),
    };

    let server_state = state.clone();
    tokio::spawn(async move {
        let addr = config::server_addr();
        if let Err(e) = start_api_server(&addr, server_state).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    } else {
        info!("Continue the authorization in your browser.");
    }

    let pb = spinner("Waiting for Spotify authorization...");
    let outcome = wait_for_outcome(Arc::clone(&state.outcome)).await;
    pb.finish_and_clear();

    match outcome {
        Some(Ok(())) => success!("Authentication successful!"),
        Some(Err(e)) => error!("Authentication failed: {}", e),
        None => error!("Authentication timed out."),
    }
}

/// Forgets stored tokens and any pending authorization.
pub async fn logout() {
    let ctx = context();
    if let Err(e) = ctx.auth.sign_out().await {
        fail(e);
    }
    success!("Disconnected Spotify account.");
}

async fn wait_for_outcome(outcome: Arc<Mutex<Option<AuthOutcome>>>) -> Option<AuthOutcome> {
    let max_wait = Duration::from_secs(AUTH_TIMEOUT_SECS);
    let start = std::time::Instant::now();

    while start.elapsed() < max_wait {
        if let Some(result) = outcome.lock().await.clone() {
            return Some(result);
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    None
}
