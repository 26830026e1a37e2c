use chrono::NaiveDateTime;

use crate::{
    error::Result,
    management::{ALBUM_KEY, NoteStore},
    spotify::links::{TrackToken, resolve_tracklist},
    types::{FormattedRecord, Frontmatter, RecordKind},
    utils,
};

const LOG_HEADING: &str = "## Log\n";
const LOGGED_KEY: &str = "logged";

/// Writes listening entries into track and album notes.
pub struct Logbook<'a> {
    notes: &'a dyn NoteStore,
    folder: String,
    always_create_track_files: bool,
}

impl<'a> Logbook<'a> {
    pub fn new(notes: &'a dyn NoteStore, folder: &str, always_create_track_files: bool) -> Self {
        Self {
            notes,
            folder: folder.to_string(),
            always_create_track_files,
        }
    }

    /// Creates the track note or appends a dated entry to it.
    pub async fn log_track(
        &self,
        track: &FormattedRecord,
        thoughts: &str,
        logged_at: NaiveDateTime,
    ) -> Result<()> {
        let existing = self.notes.read_note(&self.folder, &track.id).await?;
        let (mut frontmatter, previous) = match existing {
            Some(note) => (note.frontmatter, note.content),
            None => (Frontmatter::new(), String::new()),
        };

        describe_track(&mut frontmatter, track);
        let stamp = stamp(logged_at);
        frontmatter.push_unique(LOGGED_KEY, &stamp);

        let content = format!("{previous}{}", entry(&stamp, track.progress.as_deref(), thoughts));
        self.notes
            .write_note(&self.folder, &track.id, &content, &frontmatter)
            .await
    }

    /// Writes the album note with its resolved tracklist and a dated entry.
    ///
    /// Tracks linked without an existing note get a fresh note pointing
    /// back at the album. Returns the tracklist tokens in album order.
    pub async fn log_album(
        &self,
        album: &FormattedRecord,
        thoughts: &str,
        logged_at: NaiveDateTime,
    ) -> Result<Vec<TrackToken>> {
        let tokens = resolve_tracklist(
            self.notes,
            &self.folder,
            &album.tracks,
            album,
            self.always_create_track_files,
        )
        .await?;

        for (token, track) in tokens.iter().zip(&album.tracks) {
            if matches!(token, TrackToken::Link { .. })
                && !self.notes.note_exists(&self.folder, &track.id).await?
            {
                let mut frontmatter = Frontmatter::new();
                describe_track(&mut frontmatter, track);
                self.notes
                    .write_note(&self.folder, &track.id, "", &frontmatter)
                    .await?;
            }
        }

        let existing = self.notes.read_note(&self.folder, &album.id).await?;
        let (mut frontmatter, previous_log) = match existing {
            Some(note) => {
                let log = match note.content.split_once(LOG_HEADING) {
                    Some((_, log)) => log.to_string(),
                    None => note.content,
                };
                (note.frontmatter, log)
            }
            None => (Frontmatter::new(), String::new()),
        };

        frontmatter
            .set_text("type", RecordKind::Album.to_string())
            .set_text("id", album.id.as_str())
            .set_text("name", album.name.as_str())
            .set_text("artists", album.artists.as_str())
            .set_text("duration", album.duration.as_str());
        if let Some(release_date) = &album.release_date {
            frontmatter.set_text("release_date", release_date.as_str());
        }
        if let Some(image) = &album.image {
            frontmatter.set_text("image", image.url.as_str());
        }
        let stamp = stamp(logged_at);
        frontmatter.push_unique(LOGGED_KEY, &stamp);

        let mut content = String::from("## Tracklist\n");
        for (position, token) in tokens.iter().enumerate() {
            content.push_str(&format!("{}. {}\n", position + 1, token));
        }
        content.push('\n');
        content.push_str(LOG_HEADING);
        content.push_str(&previous_log);
        content.push_str(&entry(&stamp, None, thoughts));

        self.notes
            .write_note(&self.folder, &album.id, &content, &frontmatter)
            .await?;
        Ok(tokens)
    }
}

fn describe_track(frontmatter: &mut Frontmatter, track: &FormattedRecord) {
    frontmatter
        .set_text("type", RecordKind::Track.to_string())
        .set_text("id", track.id.as_str())
        .set_text("name", track.name.as_str())
        .set_text("artists", track.artists.as_str())
        .set_text("duration", track.duration.as_str());
    if let Some(image) = &track.image {
        frontmatter.set_text("image", image.url.as_str());
    }
    if let (Some(album_id), Some(album)) = (&track.album_id, &track.album) {
        frontmatter.push_unique(ALBUM_KEY, &utils::wikilink(album_id, album));
    }
}

fn stamp(logged_at: NaiveDateTime) -> String {
    logged_at.format("%Y-%m-%d %H:%M").to_string()
}

fn entry(stamp: &str, progress: Option<&str>, thoughts: &str) -> String {
    let heading = match progress {
        Some(progress) => format!("### {stamp} (at {progress})"),
        None => format!("### {stamp}"),
    };
    format!("{heading}\n{}\n\n", thoughts.trim())
}
