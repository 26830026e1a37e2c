use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    error::{Error, Result},
    management::KeyValueStore,
    types::TokenPair,
};

pub const KEY_CODE_VERIFIER: &str = "code_verifier";
pub const KEY_ACCESS_TOKEN: &str = "access_token";
pub const KEY_REFRESH_TOKEN: &str = "refresh_token";
/// Holds the absolute expiry instant in epoch milliseconds despite its name.
pub const KEY_EXPIRES_IN: &str = "expires_in";

/// Owns the token pair and the pending PKCE verifier.
///
/// Everything is read from and written through the injected key-value
/// store, so several handles to the same store see the same state.
#[derive(Clone)]
pub struct TokenStore {
    kv: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        TokenStore { kv }
    }

    /// Current token pair, or `None` when no access token is stored.
    ///
    /// A missing or unreadable expiry is treated as already expired, which
    /// makes the next access go through a refresh.
    pub async fn get(&self) -> Result<Option<TokenPair>> {
        let Some(access_token) = self.read(KEY_ACCESS_TOKEN).await? else {
            return Ok(None);
        };
        let refresh_token = self.read(KEY_REFRESH_TOKEN).await?;
        let expires_at = self
            .read(KEY_EXPIRES_IN)
            .await?
            .and_then(|v| v.trim().parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or(DateTime::UNIX_EPOCH);

        Ok(Some(TokenPair {
            access_token,
            refresh_token,
            expires_at,
        }))
    }

    /// Persists the pair. A pair without a refresh token keeps the one
    /// already stored.
    pub async fn save(&self, pair: &TokenPair) -> Result<()> {
        self.write(KEY_ACCESS_TOKEN, &pair.access_token).await?;
        self.write(
            KEY_EXPIRES_IN,
            &pair.expires_at.timestamp_millis().to_string(),
        )
        .await?;
        if let Some(refresh_token) = &pair.refresh_token {
            self.write(KEY_REFRESH_TOKEN, refresh_token).await?;
        }
        tracing::debug!(expires_at = %pair.expires_at, "token pair saved");
        Ok(())
    }

    pub fn is_expired(pair: &TokenPair, now: DateTime<Utc>) -> bool {
        now >= pair.expires_at
    }

    pub async fn save_verifier(&self, verifier: &str) -> Result<()> {
        self.write(KEY_CODE_VERIFIER, verifier).await
    }

    pub async fn verifier(&self) -> Result<Option<String>> {
        self.read(KEY_CODE_VERIFIER).await
    }

    pub async fn clear_verifier(&self) -> Result<()> {
        self.kv
            .remove(KEY_CODE_VERIFIER)
            .await
            .map_err(Error::TokenPersistence)
    }

    /// Forgets tokens and any pending verifier (sign-out).
    pub async fn clear(&self) -> Result<()> {
        for key in [
            KEY_ACCESS_TOKEN,
            KEY_REFRESH_TOKEN,
            KEY_EXPIRES_IN,
            KEY_CODE_VERIFIER,
        ] {
            self.kv
                .remove(key)
                .await
                .map_err(Error::TokenPersistence)?;
        }
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<String>> {
        let value = self.kv.get(key).await.map_err(Error::TokenPersistence)?;
        Ok(value.filter(|v| !v.is_empty()))
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        self.kv
            .set(key, value)
            .await
            .map_err(Error::TokenPersistence)
    }
}
