use chrono::Local;

use crate::{
    error::{Error, Result},
    info,
    management::Logbook,
    spotify::{
        AlbumSource, ApiClient,
        normalize::{
            loggable_track, normalize_album, normalize_currently_playing, normalize_track,
            nth_recently_played,
        },
    },
    success,
    types::{FormattedRecord, PlayingType, RecordKind},
    warning,
};

use super::{Context, Prompt, StdinPrompt, context, fail, spinner};

const PROMPT_TITLE: &str = "Enter thoughts:";

/// Logs a track or its album into the notes folder.
///
/// Without `recent` the currently playing track is used; `recent` picks the
/// n-th entry (1-based) of the recently played list instead.
pub async fn log(kind: PlayingType, recent: Option<usize>) {
    let ctx = context();
    if !ctx.auth.is_authenticated().await {
        fail(Error::NotAuthenticated);
    }

    let pb = spinner("Fetching track from Spotify...");
    let record = match recent {
        Some(position) => recently_played_record(&ctx.client, kind, position).await,
        None => currently_playing_record(&ctx.client, kind).await,
    };
    pb.finish_and_clear();

    let record = match record {
        Ok(record) => record,
        Err(e) => fail(e),
    };

    match write_log(&ctx, &StdinPrompt, &record).await {
        Ok(true) => success!("Logged {} to {}", record.name, ctx.folder),
        Ok(false) => warning!("Cancelled, nothing was logged."),
        Err(e) => fail(e),
    }
}

async fn currently_playing_record(client: &ApiClient, kind: PlayingType) -> Result<FormattedRecord> {
    let state = client.get_currently_playing().await?;
    normalize_currently_playing(&state, kind, client).await
}

async fn recently_played_record(
    client: &ApiClient,
    kind: PlayingType,
    position: usize,
) -> Result<FormattedRecord> {
    let page = client.get_recently_played().await?;
    let history = nth_recently_played(&page, position)?;
    let track = loggable_track(&history.track)?;

    match kind {
        PlayingType::Track => Ok(normalize_track(track)),
        PlayingType::Album => {
            let href = track
                .album
                .href
                .as_deref()
                .ok_or(Error::MissingAlbumLink)?;
            Ok(normalize_album(&client.fetch_album(href).await?))
        }
        other => Err(Error::UnsupportedPlaybackState(other.to_string())),
    }
}

/// Prompts for thoughts and writes the note(s). `Ok(false)` when cancelled.
pub async fn write_log(ctx: &Context, prompt: &dyn Prompt, record: &FormattedRecord) -> Result<bool> {
    let song_info = match &record.progress {
        Some(progress) => format!(
            "{} - {} [{} / {}]",
            record.name, record.artists, progress, record.duration
        ),
        None => format!("{} - {} [{}]", record.name, record.artists, record.duration),
    };
    info!("{}", song_info);

    let Some(thoughts) = prompt.prompt_for_text(PROMPT_TITLE, &song_info).await? else {
        return Ok(false);
    };

    let logbook = Logbook::new(&ctx.notes, &ctx.folder, ctx.always_create_track_files);
    let now = Local::now().naive_local();
    match record.kind {
        RecordKind::Track => logbook.log_track(record, &thoughts, now).await?,
        RecordKind::Album => {
            let tokens = logbook.log_album(record, &thoughts, now).await?;
            info!("Album tracklist has {} entries", tokens.len());
        }
    }
    Ok(true)
}
