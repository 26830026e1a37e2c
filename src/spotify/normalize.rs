use async_trait::async_trait;

use crate::{
    error::{Error, Result},
    types::{
        FormattedRecord, MinimalItem, PlaybackState, PlayingItem, PlayingType, RawAlbum, RawTrack,
        PlayHistory, RecentlyPlayedPage, RecordKind, SearchResponse, SimplifiedAlbum, TrackAlbum,
    },
    utils::{format_artists, format_ms, select_image},
};

/// Resolves an album link found in a playback state to the full album.
#[async_trait]
pub trait AlbumSource: Send + Sync {
    async fn fetch_album(&self, href: &str) -> Result<RawAlbum>;
}

/// Item kind reported for tracks played from local files.
pub const LOCAL_TRACK: &str = "local track";

/// Track record for display. A local file gets an empty id; see
/// [`loggable_track`] before writing notes for it.
pub fn normalize_track(track: &RawTrack) -> FormattedRecord {
    FormattedRecord {
        kind: RecordKind::Track,
        id: track.id.clone().unwrap_or_default(),
        name: track.name.clone(),
        artists: format_artists(&track.artists),
        image: select_image(&track.album.images),
        duration: format_ms(track.duration_ms),
        album: Some(track.album.name.clone()),
        album_id: track.album.id.clone(),
        progress: None,
        tracks: Vec::new(),
        release_date: None,
        release_date_precision: None,
    }
}

/// Normalizes an album and its full track listing.
///
/// The album duration is the sum of the raw track durations, formatted once,
/// so per-track rounding never accumulates.
pub fn normalize_album(album: &RawAlbum) -> FormattedRecord {
    let listed_under = TrackAlbum {
        id: Some(album.id.clone()),
        name: album.name.clone(),
        images: album.images.clone(),
        href: album.href.clone(),
    };
    let total_ms: u64 = album.tracks.items.iter().map(|t| t.duration_ms).sum();

    FormattedRecord {
        kind: RecordKind::Album,
        id: album.id.clone(),
        name: album.name.clone(),
        artists: format_artists(&album.artists),
        image: select_image(&album.images),
        duration: format_ms(total_ms),
        album: None,
        album_id: None,
        progress: None,
        tracks: album
            .tracks
            .items
            .iter()
            .map(|t| normalize_track(&t.with_album(listed_under.clone())))
            .collect(),
        release_date: album.release_date.clone(),
        release_date_precision: album.release_date_precision.clone(),
    }
}

/// Turns the current playback state into a record of the requested kind.
///
/// Episodes are rejected before anything else is looked at. For
/// [`PlayingType::Album`] the full album is fetched through `source`.
pub async fn normalize_currently_playing(
    state: &PlaybackState,
    kind: PlayingType,
    source: &dyn AlbumSource,
) -> Result<FormattedRecord> {
    let track = match &state.item {
        Some(PlayingItem::Track(track)) => track,
        Some(other) => return Err(Error::UnsupportedItemKind(other.kind().to_string())),
        None => return Err(Error::NoActiveSession),
    };
    let track = loggable_track(track)?;

    match kind {
        PlayingType::Track => {
            let mut record = normalize_track(track);
            record.progress = Some(format_ms(state.progress_ms.unwrap_or(0)));
            Ok(record)
        }
        PlayingType::Album => {
            let href = track
                .album
                .href
                .as_deref()
                .filter(|h| !h.is_empty())
                .ok_or(Error::MissingAlbumLink)?;
            let album = source.fetch_album(href).await?;
            Ok(normalize_album(&album))
        }
        other => Err(Error::UnsupportedPlaybackState(other.to_string())),
    }
}

/// Rejects tracks without a Spotify id, which cannot back a note.
pub fn loggable_track(track: &RawTrack) -> Result<&RawTrack> {
    match track.catalog_id() {
        Some(_) => Ok(track),
        None => Err(Error::UnsupportedItemKind(LOCAL_TRACK.to_string())),
    }
}

/// The `position`-th (1-based) entry of the recently played list.
pub fn nth_recently_played(page: &RecentlyPlayedPage, position: usize) -> Result<&PlayHistory> {
    position
        .checked_sub(1)
        .and_then(|index| page.items.get(index))
        .ok_or(Error::RecentOutOfRange {
            requested: position,
            available: page.items.len(),
        })
}

/// One record per history entry, most recent first as delivered.
pub fn normalize_recently_played(page: &RecentlyPlayedPage) -> Vec<FormattedRecord> {
    page.items.iter().map(|h| normalize_track(&h.track)).collect()
}

pub fn normalize_simplified_album(album: &SimplifiedAlbum) -> MinimalItem {
    MinimalItem {
        kind: PlayingType::Album.to_string(),
        id: album.id.clone(),
        name: album.name.clone(),
        artists: format_artists(&album.artists),
        image: select_image(&album.images),
        href: album.href.clone(),
    }
}

/// Flattens the section of a search response matching `kind`.
pub fn normalize_search_results(response: &SearchResponse, kind: PlayingType) -> Vec<MinimalItem> {
    match kind {
        PlayingType::Track => response
            .tracks
            .iter()
            .flat_map(|page| page.items.iter())
            .map(|track| {
                let record = normalize_track(track);
                MinimalItem {
                    kind: kind.to_string(),
                    id: record.id,
                    name: record.name,
                    artists: record.artists,
                    image: record.image,
                    href: None,
                }
            })
            .collect(),
        PlayingType::Album => response
            .albums
            .iter()
            .flat_map(|page| page.items.iter())
            .map(normalize_simplified_album)
            .collect(),
        PlayingType::Artist => response
            .artists
            .iter()
            .flat_map(|page| page.items.iter())
            .map(|artist| MinimalItem {
                kind: kind.to_string(),
                id: artist.id.clone(),
                name: artist.name.clone(),
                artists: artist.name.clone(),
                image: select_image(&artist.images),
                href: artist.href.clone(),
            })
            .collect(),
        PlayingType::Playlist => response
            .playlists
            .iter()
            .flat_map(|page| page.items.iter().flatten())
            .map(|playlist| MinimalItem {
                kind: kind.to_string(),
                id: playlist.id.clone(),
                name: playlist.name.clone(),
                artists: playlist
                    .owner
                    .as_ref()
                    .and_then(|o| o.display_name.clone())
                    .unwrap_or_default(),
                image: playlist.images.as_deref().and_then(select_image),
                href: playlist.href.clone(),
            })
            .collect(),
    }
}
