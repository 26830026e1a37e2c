#![allow(dead_code)]

pub mod fixtures;

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use spotlog::{
    config::Settings,
    management::{MemoryKeyValueStore, TokenStore},
    spotify::{ApiClient, AuthFlow},
    types::TokenPair,
};

/// Recorded traffic and canned answers of the fake Spotify service.
#[derive(Default)]
pub struct MockState {
    pub base_url: Mutex<String>,
    pub code_grants: AtomicUsize,
    pub refresh_grants: AtomicUsize,
    pub last_verifier: Mutex<Option<String>>,
    pub last_search: Mutex<Option<HashMap<String, String>>>,
    pub last_bearer: Mutex<Option<String>>,
    pub api_requests: AtomicUsize,
    /// `None` answers the playback endpoint with 204.
    pub playing: Mutex<Option<(u16, Value)>>,
}

pub struct MockSpotify {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockSpotify {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/api/token", post(token))
            .route("/v1/me/player/currently-playing", get(currently_playing))
            .route("/v1/me/player/recently-played", get(recently_played))
            .route("/v1/albums/{id}", get(album))
            .route("/v1/search", get(search))
            .route("/v1/status/{code}", get(status))
            .route("/v1/slow", get(slow))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let base_url = format!("http://{}", listener.local_addr().expect("local addr"));
        *state.base_url.lock().unwrap() = base_url.clone();

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock");
        });

        Self { base_url, state }
    }

    pub fn settings(&self) -> Settings {
        Settings::with_base_url(&self.base_url)
    }

    pub fn set_playing(&self, playing: Option<(u16, Value)>) {
        *self.state.playing.lock().unwrap() = playing;
    }

    pub fn refresh_grants(&self) -> usize {
        self.state.refresh_grants.load(Ordering::SeqCst)
    }

    pub fn api_requests(&self) -> usize {
        self.state.api_requests.load(Ordering::SeqCst)
    }
}

/// Auth flow on a fresh in-memory store, pointed at the mock.
pub fn auth_flow(mock: &MockSpotify) -> (Arc<AuthFlow>, TokenStore) {
    auth_flow_with(mock.settings())
}

pub fn auth_flow_with(settings: Settings) -> (Arc<AuthFlow>, TokenStore) {
    let store = TokenStore::new(Arc::new(MemoryKeyValueStore::new()));
    let flow = AuthFlow::new(store.clone(), settings).expect("build auth flow");
    (Arc::new(flow), store)
}

/// API client whose store already holds a token pair.
pub async fn signed_in_client(
    mock: &MockSpotify,
    expires_at: DateTime<Utc>,
) -> (ApiClient, TokenStore) {
    let (flow, store) = auth_flow(mock);
    store
        .save(&TokenPair {
            access_token: "access-0".into(),
            refresh_token: Some("refresh-0".into()),
            expires_at,
        })
        .await
        .expect("seed tokens");
    (ApiClient::new(flow), store)
}

pub fn in_an_hour() -> DateTime<Utc> {
    Utc::now() + chrono::Duration::hours(1)
}

pub fn an_hour_ago() -> DateTime<Utc> {
    Utc::now() - chrono::Duration::hours(1)
}

async fn token(
    State(mock): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    match form.get("grant_type").map(String::as_str) {
        Some("authorization_code") => {
            mock.code_grants.fetch_add(1, Ordering::SeqCst);
            *mock.last_verifier.lock().unwrap() = form.get("code_verifier").cloned();
            match form.get("code").map(String::as_str) {
                Some("good-code") => Json(json!({
                    "access_token": "access-1",
                    "token_type": "Bearer",
                    "scope": "user-read-currently-playing user-read-recently-played",
                    "expires_in": 3600,
                    "refresh_token": "refresh-1"
                }))
                .into_response(),
                Some("empty-body") => Json(json!({})).into_response(),
                Some("not-json") => (StatusCode::OK, "<html>ok</html>").into_response(),
                Some("huge-expiry") => Json(json!({
                    "access_token": "access-1",
                    "token_type": "Bearer",
                    "expires_in": i64::MAX,
                    "refresh_token": "refresh-1"
                }))
                .into_response(),
                _ => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "invalid_grant", "error_description": "Invalid authorization code"})),
                )
                    .into_response(),
            }
        }
        Some("refresh_token") => {
            let n = mock.refresh_grants.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(Duration::from_millis(50)).await;

            let refresh_token = form.get("refresh_token").cloned().unwrap_or_default();
            match refresh_token.as_str() {
                "revoked" => {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"error": "invalid_grant", "error_description": "Refresh token revoked"})),
                    )
                        .into_response();
                }
                "empty-body" => return Json(json!({})).into_response(),
                "negative-expiry" => {
                    return Json(json!({"access_token": "refreshed", "expires_in": -5}))
                        .into_response();
                }
                _ => {}
            }

            let mut body = json!({
                "access_token": format!("refreshed-{n}"),
                "token_type": "Bearer",
                "expires_in": 3600
            });
            if refresh_token == "rotate-me" {
                body["refresh_token"] = json!("rotated");
            }
            Json(body).into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "unsupported_grant_type"})),
        )
            .into_response(),
    }
}

fn record_request(mock: &MockState, headers: &HeaderMap) {
    mock.api_requests.fetch_add(1, Ordering::SeqCst);
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    *mock.last_bearer.lock().unwrap() = bearer;
}

async fn currently_playing(State(mock): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    record_request(&mock, &headers);
    let playing = mock.playing.lock().unwrap().clone();
    match playing {
        None => StatusCode::NO_CONTENT.into_response(),
        Some((status, body)) => (
            StatusCode::from_u16(status).expect("valid status"),
            Json(body),
        )
            .into_response(),
    }
}

async fn recently_played(State(mock): State<Arc<MockState>>, headers: HeaderMap) -> Json<Value> {
    record_request(&mock, &headers);
    let base = mock.base_url.lock().unwrap().clone();
    Json(fixtures::recently_played_json(&base))
}

async fn album(
    State(mock): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    record_request(&mock, &headers);
    if id != fixtures::ALBUM_ID {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"status": 404, "message": "Resource not found"}})),
        )
            .into_response();
    }
    Json(fixtures::album_json()).into_response()
}

async fn search(
    State(mock): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    record_request(&mock, &headers);
    *mock.last_search.lock().unwrap() = Some(params);
    let base = mock.base_url.lock().unwrap().clone();
    Json(fixtures::search_json(&base))
}

async fn status(
    State(mock): State<Arc<MockState>>,
    Path(code): Path<u16>,
    headers: HeaderMap,
) -> Response {
    record_request(&mock, &headers);
    (
        StatusCode::from_u16(code).expect("valid status"),
        Json(json!({"error": {"status": code, "message": "x"}})),
    )
        .into_response()
}

async fn slow(State(mock): State<Arc<MockState>>, headers: HeaderMap) -> Json<Value> {
    record_request(&mock, &headers);
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({}))
}
