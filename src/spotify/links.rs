use std::fmt;

use crate::{error::Result, management::NoteStore, types::FormattedRecord, utils};

/// One entry of an album note's tracklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackToken {
    /// Track without a note, written as its name.
    Plain(String),
    /// Link to the track note named after the track id.
    Link { id: String, name: String },
}

impl fmt::Display for TrackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackToken::Plain(name) => f.write_str(name),
            TrackToken::Link { id, name } => f.write_str(&utils::wikilink(id, name)),
        }
    }
}

/// Decides how each track of `album` appears in the album note.
///
/// A track already logged under `folder` gets `album` added to its note and
/// is linked. Any other track is linked only when
/// `always_create_track_files` is set (the caller then creates the note)
/// and written as its plain name otherwise. Output order matches `tracks`.
pub async fn resolve_tracklist(
    notes: &dyn NoteStore,
    folder: &str,
    tracks: &[FormattedRecord],
    album: &FormattedRecord,
    always_create_track_files: bool,
) -> Result<Vec<TrackToken>> {
    let mut tokens = Vec::with_capacity(tracks.len());

    for track in tracks {
        if notes.note_exists(folder, &track.id).await? {
            notes
                .append_album_reference(folder, &track.id, album)
                .await?;
        } else if !always_create_track_files {
            tokens.push(TrackToken::Plain(track.name.clone()));
            continue;
        }

        tokens.push(TrackToken::Link {
            id: track.id.clone(),
            name: track.name.clone(),
        });
    }

    Ok(tokens)
}
