use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use spotlog::{cli, config, error, types::PlayingType};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Connect your Spotify account
    Auth,

    /// Forget the stored Spotify tokens
    Logout,

    /// Log the currently playing track or album into a note
    Log(LogOptions),

    /// List recently played tracks
    Recent,

    /// Search the Spotify catalogue
    Search(SearchOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct LogOptions {
    /// Log the album of the track instead of the track itself
    #[clap(long)]
    pub album: bool,

    /// Log the n-th recently played track (see `recent`) instead of the current one
    #[clap(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub recent: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// Search terms
    #[clap(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// What to search for
    #[clap(long = "type", value_enum, default_value = "track")]
    pub kind: PlayingType,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spotlog=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => cli::auth().await,
        Command::Logout => cli::logout().await,
        Command::Log(opt) => {
            let kind = if opt.album {
                PlayingType::Album
            } else {
                PlayingType::Track
            };
            cli::log(kind, opt.recent.map(|n| n as usize)).await
        }
        Command::Recent => cli::recent().await,
        Command::Search(opt) => cli::search(&opt.query.join(" "), opt.kind).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
