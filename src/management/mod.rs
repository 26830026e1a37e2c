mod auth;
mod logbook;
mod notes;
mod store;

pub use auth::KEY_ACCESS_TOKEN;
pub use auth::KEY_CODE_VERIFIER;
pub use auth::KEY_EXPIRES_IN;
pub use auth::KEY_REFRESH_TOKEN;
pub use auth::TokenStore;
pub use logbook::Logbook;
pub use notes::ALBUM_KEY;
pub use notes::MarkdownNoteStore;
pub use notes::NoteStore;
pub use notes::{parse_note, render_note};
pub use store::FileKeyValueStore;
pub use store::KeyValueStore;
pub use store::MemoryKeyValueStore;
