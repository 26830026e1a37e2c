use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::{Image, PkceChallenge, RawArtist};

/// Length of a PKCE code verifier.
pub const CODE_VERIFIER_LEN: usize = 64;

/// Generates a random PKCE code verifier of [`CODE_VERIFIER_LEN`] ASCII
/// letters and digits. These are all unreserved URL characters, so the
/// verifier never needs escaping.
pub fn generate_code_verifier() -> String {
    generate_random_string(CODE_VERIFIER_LEN)
}

pub fn generate_random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub fn sha256(input: &str) -> [u8; 32] {
    Sha256::digest(input.as_bytes()).into()
}

/// base64url without padding: never contains `+`, `/` or `=`.
pub fn base64url_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// `base64url(SHA-256(verifier))`, the S256 challenge.
pub fn generate_code_challenge(verifier: &str) -> String {
    base64url_encode(&sha256(verifier))
}

/// Fresh verifier and its matching challenge for one authorization attempt.
pub fn generate_pkce_challenge() -> PkceChallenge {
    let code_verifier = generate_code_verifier();
    let code_challenge = generate_code_challenge(&code_verifier);
    PkceChallenge {
        code_verifier,
        code_challenge,
    }
}

/// Renders milliseconds as zero-padded `mm:ss`, e.g. `200000` → `03:20`.
///
/// Seconds are truncated. Minutes are not wrapped into hours, so an album
/// longer than 99 minutes renders as `104:05`.
pub fn format_ms(ms: u64) -> String {
    let total_seconds = ms / 1000;
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Joins artist names into one human readable string: `"A, B, C"`.
pub fn format_artists(artists: &[RawArtist]) -> String {
    artists
        .iter()
        .map(|artist| artist.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Picks the image shown for a track or album: the last element of the list.
///
/// Spotify documents image lists as widest first, so the last entry is the
/// smallest. The rule relies on that ordering rather than the reported
/// dimensions, which are sometimes null.
pub fn select_image(images: &[Image]) -> Option<Image> {
    images.last().cloned()
}

/// Obsidian link to the note named after `id`, shown as `name`.
pub fn wikilink(id: &str, name: &str) -> String {
    format!("[[{id}|{name}]]")
}
