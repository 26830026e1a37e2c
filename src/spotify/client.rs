use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::{Error, Result},
    spotify::{AlbumSource, AuthFlow},
    types::{PlaybackState, PlayingType, RawAlbum, RecentlyPlayedPage, SearchResponse},
};

/// Authenticated access to the Spotify Web API.
///
/// Cheap to clone; clones share the auth flow and its HTTP client.
#[derive(Clone)]
pub struct ApiClient {
    auth: Arc<AuthFlow>,
    base_url: String,
}

impl ApiClient {
    pub fn new(auth: Arc<AuthFlow>) -> Self {
        let base_url = auth.settings().api_url.trim_end_matches('/').to_string();
        Self { auth, base_url }
    }

    pub fn auth(&self) -> &AuthFlow {
        &self.auth
    }

    /// Authenticated GET of `url`, returning the JSON payload.
    ///
    /// # Errors
    ///
    /// - [`Error::NoActiveSession`] on HTTP 204
    /// - [`Error::AuthRequired`] on HTTP 401 or an `error.status` of 401
    /// - [`Error::Upstream`] for any other `error` object or failure status
    /// - [`Error::UpstreamTimeout`] when the request exceeds the timeout
    pub async fn call(&self, url: &str) -> Result<Value> {
        let token = self.auth.ensure_access_token().await?;

        tracing::debug!(%url, "GET");
        let res = self.auth.http().get(url).bearer_auth(token).send().await?;
        let status = res.status();
        let body = res.text().await?;

        interpret_response(status, &body)
    }

    pub async fn get_currently_playing(&self) -> Result<PlaybackState> {
        let url = format!("{}/me/player/currently-playing", self.base_url);
        decode(self.call(&url).await?)
    }

    pub async fn get_recently_played(&self) -> Result<RecentlyPlayedPage> {
        let url = format!("{}/me/player/recently-played", self.base_url);
        decode(self.call(&url).await?)
    }

    /// Searches the catalogue. A blank query performs no request and
    /// yields `None`.
    pub async fn search(&self, query: &str, kind: PlayingType) -> Result<Option<SearchResponse>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        let url = Url::parse_with_params(
            &format!("{}/search", self.base_url),
            &[("q", query), ("type", kind.as_str())],
        )
        .map_err(|e| Error::Upstream(format!("invalid search url: {e}")))?;

        decode(self.call(url.as_str()).await?).map(Some)
    }

    /// Follows a link handed out by Spotify itself, such as an album's `href`.
    pub async fn fetch(&self, href: &str) -> Result<Value> {
        self.call(href).await
    }
}

#[async_trait]
impl AlbumSource for ApiClient {
    async fn fetch_album(&self, href: &str) -> Result<RawAlbum> {
        decode(self.fetch(href).await?)
    }
}

/// Maps a raw upstream response onto the payload or a typed failure.
pub fn interpret_response(status: StatusCode, body: &str) -> Result<Value> {
    if status == StatusCode::NO_CONTENT {
        return Err(Error::NoActiveSession);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::AuthRequired);
    }

    let json = serde_json::from_str::<Value>(body);
    if let Ok(json) = &json {
        if let Some(error) = json.get("error") {
            if error["status"].as_u64() == Some(401) {
                return Err(Error::AuthRequired);
            }
            let message = error["message"]
                .as_str()
                .or_else(|| error.as_str())
                .unwrap_or("unknown error");
            return Err(Error::Upstream(message.to_string()));
        }
    }

    if !status.is_success() {
        return Err(Error::Upstream(format!("HTTP {}", status.as_u16())));
    }

    json.map_err(|e| Error::MalformedResponse(e.to_string()))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::MalformedResponse(e.to_string()))
}
