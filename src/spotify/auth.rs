use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    config::Settings,
    error::{Error, Result},
    management::TokenStore,
    spotify::build_http_client,
    types::{CallbackParams, TokenPair, TokenResponse},
    utils,
};

/// OAuth 2.0 authorization code flow with PKCE against the Spotify accounts
/// service.
///
/// All token state lives in the injected [`TokenStore`]. Every API call
/// obtains its bearer token through [`AuthFlow::ensure_access_token`].
pub struct AuthFlow {
    store: TokenStore,
    http: Client,
    settings: Settings,
    refresh_lock: Mutex<()>,
}

impl AuthFlow {
    pub fn new(store: TokenStore, settings: Settings) -> Result<Self> {
        let http = build_http_client(&settings)?;
        Ok(Self::with_client(store, settings, http))
    }

    pub fn with_client(store: TokenStore, settings: Settings, http: Client) -> Self {
        Self {
            store,
            http,
            settings,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Starts a new authorization attempt.
    ///
    /// Generates and persists a fresh code verifier, replacing any earlier
    /// one, and returns the URL the user has to open. The verifier is single
    /// use, so call this again for every attempt.
    pub async fn build_authorization_url(&self) -> Result<String> {
        let pkce = utils::generate_pkce_challenge();
        self.store.save_verifier(&pkce.code_verifier).await?;
        self.authorization_url(&pkce.code_challenge)
    }

    /// Authorization URL for an already derived S256 challenge.
    pub fn authorization_url(&self, code_challenge: &str) -> Result<String> {
        let url = Url::parse_with_params(
            &self.settings.auth_url,
            &[
                ("response_type", "code"),
                ("client_id", self.settings.client_id.as_str()),
                ("scope", self.settings.scope.as_str()),
                ("code_challenge_method", "S256"),
                ("code_challenge", code_challenge),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
            ],
        )
        .map_err(|e| Error::Upstream(format!("invalid authorization url: {e}")))?;
        Ok(url.to_string())
    }

    /// Dispatches the redirect delivered to the callback target.
    pub async fn handle_auth(&self, params: &CallbackParams) -> Result<TokenPair> {
        if let Some(error) = &params.error {
            return Err(Error::AuthorizationDenied(error.clone()));
        }
        match &params.code {
            Some(code) => self.exchange_code(code).await,
            None => Err(Error::MissingAuthorizationCode),
        }
    }

    /// Exchanges an authorization code for a token pair.
    ///
    /// Uses the verifier stored by [`AuthFlow::build_authorization_url`] and
    /// discards it once the exchange succeeded, so a replayed redirect fails
    /// with [`Error::MissingVerifier`].
    pub async fn exchange_code(&self, code: &str) -> Result<TokenPair> {
        let verifier = self.store.verifier().await?.ok_or(Error::MissingVerifier)?;

        let response = self
            .request_token(
                &[
                    ("client_id", self.settings.client_id.as_str()),
                    ("grant_type", "authorization_code"),
                    ("code", code),
                    ("redirect_uri", self.settings.redirect_uri.as_str()),
                    ("code_verifier", verifier.as_str()),
                ],
                Error::TokenExchange,
            )
            .await?;

        let pair = TokenPair {
            expires_at: expiry(response.expires_in, Error::TokenExchange)?,
            access_token: response.access_token,
            refresh_token: response.refresh_token,
        };
        self.store.save(&pair).await?;
        self.store.clear_verifier().await?;
        tracing::debug!("authorization code exchanged");
        Ok(pair)
    }

    /// Trades the stored refresh token for a new access token.
    ///
    /// Spotify may rotate the refresh token; when the response carries none
    /// the stored one is kept.
    pub async fn refresh(&self) -> Result<TokenPair> {
        let refresh_token = self
            .store
            .get()
            .await?
            .and_then(|pair| pair.refresh_token)
            .ok_or(Error::MissingRefreshToken)?;

        let response = self
            .request_token(
                &[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token.as_str()),
                    ("client_id", self.settings.client_id.as_str()),
                ],
                Error::TokenRefresh,
            )
            .await?;

        let pair = TokenPair {
            expires_at: expiry(response.expires_in, Error::TokenRefresh)?,
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(Some(refresh_token)),
        };
        self.store.save(&pair).await?;
        tracing::debug!(expires_at = %pair.expires_at, "access token refreshed");
        Ok(pair)
    }

    /// Returns a usable access token, refreshing it first when expired.
    ///
    /// Refreshes are serialised: a caller that waited for another caller's
    /// refresh re-reads the store and reuses its result instead of spending
    /// the refresh token a second time.
    pub async fn ensure_access_token(&self) -> Result<String> {
        let pair = self.store.get().await?.ok_or(Error::NotAuthenticated)?;
        if !TokenStore::is_expired(&pair, Utc::now()) {
            return Ok(pair.access_token);
        }

        let _guard = self.refresh_lock.lock().await;
        let pair = self.store.get().await?.ok_or(Error::NotAuthenticated)?;
        if !TokenStore::is_expired(&pair, Utc::now()) {
            return Ok(pair.access_token);
        }

        Ok(self.refresh().await?.access_token)
    }

    /// Local check that both tokens are stored.
    ///
    /// Nothing is verified upstream: after the user revokes access on
    /// Spotify's side this still reports `true` until a call fails with
    /// [`Error::AuthRequired`].
    pub async fn is_authenticated(&self) -> bool {
        matches!(
            self.store.get().await,
            Ok(Some(TokenPair {
                refresh_token: Some(_),
                ..
            }))
        )
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.store.clear().await
    }

    async fn request_token(
        &self,
        form: &[(&str, &str)],
        fail: fn(String) -> Error,
    ) -> Result<TokenResponse> {
        let res = self
            .http
            .post(&self.settings.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::UpstreamTimeout
                } else {
                    fail(e.to_string())
                }
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| fail(e.to_string()))?;
        if !status.is_success() {
            return Err(fail(describe_token_error(status, &body)));
        }

        serde_json::from_str::<TokenResponse>(&body)
            .map_err(|e| fail(format!("malformed token response: {e}")))
    }
}

/// Absolute expiry for a token living `expires_in` seconds from now.
fn expiry(expires_in: i64, fail: fn(String) -> Error) -> Result<DateTime<Utc>> {
    if expires_in < 0 {
        return Err(fail(format!("negative token lifetime: {expires_in}")));
    }
    Duration::try_seconds(expires_in)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        .ok_or_else(|| fail(format!("token lifetime out of range: {expires_in}")))
}

/// Picks the most useful message out of an OAuth error body.
fn describe_token_error(status: StatusCode, body: &str) -> String {
    let json: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let description = json["error_description"]
        .as_str()
        .or_else(|| json["error"].as_str());

    match description {
        Some(d) => format!("{} ({})", d, status.as_u16()),
        None => format!("HTTP {}", status.as_u16()),
    }
}
