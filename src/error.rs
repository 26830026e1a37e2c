//! Error types for authentication, upstream calls, normalization and note
//! storage.
//!
//! Every failure is scoped to the command that triggered it; nothing here is
//! fatal to the process. [`Error::AuthRequired`] is kept distinct from
//! generic upstream failures so callers can suggest reconnecting the account.

/// Result type used across the core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No access token is stored.
    #[error("not authenticated, please connect your Spotify account")]
    NotAuthenticated,

    /// The code exchange found no stored PKCE verifier (stale or duplicate redirect).
    #[error("code verifier not found, start the authorization again")]
    MissingVerifier,

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("refresh token not found, please connect your Spotify account")]
    MissingRefreshToken,

    #[error("token refresh failed: {0}")]
    TokenRefresh(String),

    /// Upstream rejected the bearer token.
    #[error("authorization required, please connect your Spotify account")]
    AuthRequired,

    /// Upstream answered 204 for the playback endpoint.
    #[error("no currently playing track")]
    NoActiveSession,

    #[error("{0}")]
    Upstream(String),

    #[error("request to Spotify timed out")]
    UpstreamTimeout,

    #[error("upstream response did not match the expected shape: {0}")]
    MalformedResponse(String),

    #[error("{0}s not supported")]
    UnsupportedItemKind(String),

    #[error("no album href found")]
    MissingAlbumLink,

    #[error("current playback state not supported: {0}")]
    UnsupportedPlaybackState(String),

    #[error("failed to persist tokens: {0}")]
    TokenPersistence(String),

    /// The authorization redirect carried an `error` parameter.
    #[error("authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("authorization redirect carried neither a code nor an error")]
    MissingAuthorizationCode,

    #[error("note storage failed: {0}")]
    NoteStorage(String),

    #[error("reading input failed: {0}")]
    Prompt(String),

    /// `log --recent N` asked for an entry past the end of the history.
    #[error("no recently played track #{requested}, only {available} available")]
    RecentOutOfRange { requested: usize, available: usize },
}

impl Error {
    /// Whether reconnecting the Spotify account is the likely fix.
    pub fn suggests_reconnect(&self) -> bool {
        matches!(
            self,
            Error::AuthRequired
                | Error::NotAuthenticated
                | Error::MissingRefreshToken
                | Error::TokenRefresh(_)
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::UpstreamTimeout
        } else {
            Error::Upstream(err.to_string())
        }
    }
}
