use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Access credentials owned by the token store.
///
/// An absent access token means "not authenticated"; in that case no pair
/// exists at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// PKCE values for one authorization attempt.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub code_verifier: String,
    pub code_challenge: String,
}

/// Body of a successful token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Query parameters delivered to the redirect target.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawArtist {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// The album object embedded in a full track.
///
/// Local files report a `null` id and href.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackAlbum {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTrack {
    /// `None` for tracks played from local files.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<RawArtist>,
    pub duration_ms: u64,
    pub album: TrackAlbum,
    #[serde(default)]
    pub is_local: bool,
}

impl RawTrack {
    /// Spotify id of a streamable track; local files have none.
    pub fn catalog_id(&self) -> Option<&str> {
        if self.is_local {
            return None;
        }
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// A track as listed inside an album, which carries no album object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifiedTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<RawArtist>,
    pub duration_ms: u64,
}

impl SimplifiedTrack {
    /// Completes the track with the album it was listed under.
    pub fn with_album(&self, album: TrackAlbum) -> RawTrack {
        RawTrack {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            artists: self.artists.clone(),
            duration_ms: self.duration_ms,
            album,
            is_local: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAlbum {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<RawArtist>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub release_date_precision: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    pub tracks: Page<SimplifiedTrack>,
}

/// Album as returned by search: no track listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifiedAlbum {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<RawArtist>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub href: Option<String>,
}

/// Episodes are never logged, so nothing of them is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEpisode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

/// The item of a playback state, tagged by Spotify's `type` field.
///
/// Decoding happens at the API client boundary, so the normalizer always
/// receives a known variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlayingItem {
    Track(RawTrack),
    Album(RawAlbum),
    Episode(RawEpisode),
}

impl PlayingItem {
    pub fn kind(&self) -> &'static str {
        match self {
            PlayingItem::Track(_) => "track",
            PlayingItem::Album(_) => "album",
            PlayingItem::Episode(_) => "episode",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackState {
    #[serde(default)]
    pub progress_ms: Option<u64>,
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub item: Option<PlayingItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayHistory {
    pub track: RawTrack,
    #[serde(default)]
    pub played_at: Option<String>,
}

pub type RecentlyPlayedPage = Page<PlayHistory>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchArtist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistOwner {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPlaylist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Option<Vec<Image>>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub owner: Option<PlaylistOwner>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub tracks: Option<Page<RawTrack>>,
    #[serde(default)]
    pub albums: Option<Page<SimplifiedAlbum>>,
    #[serde(default)]
    pub artists: Option<Page<SearchArtist>>,
    // Spotify pads playlist results with nulls.
    #[serde(default)]
    pub playlists: Option<Page<Option<SearchPlaylist>>>,
}

/// What the user asked to log or search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PlayingType {
    Track,
    Album,
    Artist,
    Playlist,
}

impl PlayingType {
    /// Lower-case name as used in Spotify query parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayingType::Track => "track",
            PlayingType::Album => "album",
            PlayingType::Artist => "artist",
            PlayingType::Playlist => "playlist",
        }
    }
}

impl fmt::Display for PlayingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Track,
    Album,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Track => f.write_str("Track"),
            RecordKind::Album => f.write_str("Album"),
        }
    }
}

/// Display-ready track or album.
///
/// `artists` is always a single joined string; `duration` and `progress`
/// are `mm:ss` renderings of millisecond values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedRecord {
    pub kind: RecordKind,
    pub id: String,
    pub name: String,
    pub artists: String,
    pub image: Option<Image>,
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tracks: Vec<FormattedRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date_precision: Option<String>,
}

/// Compact search hit; carries no track listing or duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimalItem {
    pub kind: String,
    pub id: String,
    pub name: String,
    pub artists: String,
    pub image: Option<Image>,
    pub href: Option<String>,
}

/// Value of one frontmatter key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterValue {
    Text(String),
    List(Vec<String>),
}

/// Ordered frontmatter of a note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    entries: Vec<(String, FrontmatterValue)>,
}

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: FrontmatterValue) -> &mut Self {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key.to_string(), value)),
        }
        self
    }

    pub fn set_text(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.set(key, FrontmatterValue::Text(value.into()))
    }

    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Adds `item` to the list under `key` unless already present.
    ///
    /// A text value under `key` is promoted to a one-element list first.
    /// Returns whether `item` was added.
    pub fn push_unique(&mut self, key: &str, item: &str) -> bool {
        let Some(index) = self.entries.iter().position(|(k, _)| k == key) else {
            self.entries
                .push((key.to_string(), FrontmatterValue::List(vec![item.to_string()])));
            return true;
        };

        let value = &mut self.entries[index].1;
        if let FrontmatterValue::Text(existing) = value {
            let existing = std::mem::take(existing);
            *value = FrontmatterValue::List(vec![existing]);
        }

        let FrontmatterValue::List(items) = value else {
            return false;
        };
        if items.iter().any(|i| i == item) {
            return false;
        }
        items.push(item.to_string());
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FrontmatterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A stored note as seen by the core: its identifier and parsed parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteReference {
    pub id: String,
    pub frontmatter: Frontmatter,
    pub content: String,
}

#[derive(Tabled)]
pub struct RecentTableRow {
    #[tabled(rename = "#")]
    pub index: usize,
    pub name: String,
    pub artists: String,
    pub album: String,
    pub duration: String,
}

#[derive(Tabled)]
pub struct SearchTableRow {
    pub name: String,
    pub artists: String,
    pub id: String,
}
