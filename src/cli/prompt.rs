use std::io::{BufRead, Write};

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Asks the user for free text before a note is written.
#[async_trait]
pub trait Prompt: Send + Sync {
    /// `Ok(None)` means the user cancelled and nothing should be written.
    async fn prompt_for_text(&self, title: &str, song_info: &str) -> Result<Option<String>>;
}

/// Reads one line from the terminal. End of input cancels.
pub struct StdinPrompt;

#[async_trait]
impl Prompt for StdinPrompt {
    async fn prompt_for_text(&self, title: &str, song_info: &str) -> Result<Option<String>> {
        let header = format!("{song_info}\n{title} ");
        tokio::task::spawn_blocking(move || read_line(&header))
            .await
            .map_err(|e| Error::Prompt(e.to_string()))?
    }
}

fn read_line(header: &str) -> Result<Option<String>> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{header}").and_then(|_| stdout.flush()).ok();

    let mut line = String::new();
    let read = std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| Error::Prompt(e.to_string()))?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
