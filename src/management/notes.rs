use std::path::PathBuf;

use async_trait::async_trait;

use crate::{
    error::{Error, Result},
    types::{FormattedRecord, Frontmatter, FrontmatterValue, NoteReference},
    utils,
};

/// Frontmatter key listing the albums a track note belongs to.
pub const ALBUM_KEY: &str = "album";

/// Storage of user-editable notes, addressed by folder and Spotify id.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn note_exists(&self, folder: &str, id: &str) -> Result<bool>;

    async fn read_note(&self, folder: &str, id: &str) -> Result<Option<NoteReference>>;

    async fn write_note(
        &self,
        folder: &str,
        id: &str,
        content: &str,
        frontmatter: &Frontmatter,
    ) -> Result<()>;

    /// Links `album` from the track note's album list. Adding an album that
    /// is already listed leaves the note untouched.
    async fn append_album_reference(
        &self,
        folder: &str,
        track_id: &str,
        album: &FormattedRecord,
    ) -> Result<()>;
}

/// Markdown files with a YAML frontmatter block: `<root>/<folder>/<id>.md`.
pub struct MarkdownNoteStore {
    root: PathBuf,
}

impl MarkdownNoteStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn note_path(&self, folder: &str, id: &str) -> PathBuf {
        let mut path = self.root.clone();
        for part in folder.split('/').filter(|p| !p.is_empty() && *p != "..") {
            path.push(part);
        }
        let file: String = id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        path.push(format!("{file}.md"));
        path
    }
}

#[async_trait]
impl NoteStore for MarkdownNoteStore {
    async fn note_exists(&self, folder: &str, id: &str) -> Result<bool> {
        let path = self.note_path(folder, id);
        match async_fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::NoteStorage(format!("{}: {}", path.display(), e))),
        }
    }

    async fn read_note(&self, folder: &str, id: &str) -> Result<Option<NoteReference>> {
        let path = self.note_path(folder, id);
        let raw = match async_fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::NoteStorage(format!("{}: {}", path.display(), e))),
        };

        let (frontmatter, content) = parse_note(&raw);
        Ok(Some(NoteReference {
            id: id.to_string(),
            frontmatter,
            content,
        }))
    }

    async fn write_note(
        &self,
        folder: &str,
        id: &str,
        content: &str,
        frontmatter: &Frontmatter,
    ) -> Result<()> {
        let path = self.note_path(folder, id);
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::NoteStorage(format!("{}: {}", parent.display(), e)))?;
        }

        tracing::debug!(path = %path.display(), "writing note");
        async_fs::write(&path, render_note(frontmatter, content))
            .await
            .map_err(|e| Error::NoteStorage(format!("{}: {}", path.display(), e)))
    }

    async fn append_album_reference(
        &self,
        folder: &str,
        track_id: &str,
        album: &FormattedRecord,
    ) -> Result<()> {
        let Some(mut note) = self.read_note(folder, track_id).await? else {
            return Err(Error::NoteStorage(format!("no note for track {track_id}")));
        };

        let link = utils::wikilink(&album.id, &album.name);
        if note.frontmatter.push_unique(ALBUM_KEY, &link) {
            self.write_note(folder, track_id, &note.content, &note.frontmatter)
                .await?;
        }
        Ok(())
    }
}

/// Renders frontmatter and body into note text.
///
/// Scalars are written as double-quoted strings so wikilinks and colons
/// survive YAML parsing.
pub fn render_note(frontmatter: &Frontmatter, content: &str) -> String {
    if frontmatter.is_empty() {
        return content.to_string();
    }

    let mut out = String::from("---\n");
    for (key, value) in frontmatter.iter() {
        match value {
            FrontmatterValue::Text(text) => {
                out.push_str(&format!("{key}: {}\n", quote(text)));
            }
            FrontmatterValue::List(items) => {
                out.push_str(&format!("{key}:\n"));
                for item in items {
                    out.push_str(&format!("  - {}\n", quote(item)));
                }
            }
        }
    }
    out.push_str("---\n");
    out.push_str(content);
    out
}

/// Splits note text into frontmatter and body.
///
/// Understands the subset of YAML written by [`render_note`]: `key: value`
/// scalars and `key:` followed by `- item` lines. Text without a leading
/// `---` block is all body.
pub fn parse_note(raw: &str) -> (Frontmatter, String) {
    let mut frontmatter = Frontmatter::new();
    let Some(rest) = raw.strip_prefix("---\n") else {
        return (frontmatter, raw.to_string());
    };

    let (block, body) = match rest.find("\n---\n") {
        Some(end) => (&rest[..end], &rest[end + 5..]),
        None => match rest.strip_suffix("\n---") {
            Some(block) => (block, ""),
            None => return (frontmatter, raw.to_string()),
        },
    };

    let mut list_key: Option<String> = None;
    for line in block.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(item) = trimmed.strip_prefix("- ") {
            if let Some(key) = &list_key {
                frontmatter.push_unique(key, &unquote(item));
            }
            continue;
        }

        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if value.is_empty() {
            frontmatter.set(key, FrontmatterValue::List(Vec::new()));
            list_key = Some(key.to_string());
        } else {
            frontmatter.set_text(key, unquote(value));
            list_key = None;
        }
    }

    (frontmatter, body.to_string())
}

fn quote(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}

fn unquote(value: &str) -> String {
    if value.starts_with('"') {
        if let Ok(text) = serde_json::from_str::<String>(value) {
            return text;
        }
    }
    value.trim_matches('\'').to_string()
}
