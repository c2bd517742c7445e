//! Main entry point for the animevsub CLI.

use animevsub_provider::config::Config;
use animevsub_provider::error::{AppError, Result};
use animevsub_provider::provider::{Provider, SearchOptions};
use clap::{Parser, Subcommand};
use log::{debug, warn};
use serde::Serialize;
use std::process::ExitCode;

/// Command-line arguments for the animevsub application.
#[derive(Parser, Debug)]
#[command(
    name = "animevsub",
    version,
    about = "Browse ANIMEVIETSUB episodes through the Hasukatsu catalog",
    long_about = "Search the Hasukatsu catalog, list the episodes of a title in release order, and resolve episode streams."
)]
struct Args {
    /// Log verbosity level: 0=error, 1=warn, 2=info, 3=debug, 4=trace
    #[arg(short, long, default_value_t = 1, global = true)]
    log: u8,

    /// Catalog base URL (overrides config)
    #[arg(short, long, global = true)]
    base_url: Option<String>,

    /// Print JSON instead of text
    #[arg(short, long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search titles
    Search {
        /// Title to search for
        query: String,
    },
    /// List the episodes of a media
    Episodes {
        /// AniList media id
        media_id: String,
    },
    /// Resolve the stream of one episode
    Source {
        /// AniList media id
        media_id: String,

        /// Episode label as listed, e.g. "12" or "12_END"
        label: String,

        /// Server to resolve on
        #[arg(short, long, default_value = "default")]
        server: String,
    },
    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a default config file unless one exists
    Init {
        /// Overwrite an existing file with defaults
        #[arg(short, long)]
        force: bool,
    },
    /// Print the config in effect
    Show,
}

fn run_config(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Init { force: true } => {
            Config::new().save()?;
            println!("Wrote {}", Config::get_config_path()?.display());
        }
        ConfigAction::Init { force: false } => {
            let path = Config::get_config_path()?;
            if Config::create_default_at(&path)? {
                println!("Wrote {}", path.display());
            } else {
                println!("{} already exists", path.display());
            }
        }
        ConfigAction::Show => print!("{}", config.to_toml()?),
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config: {}. Using defaults.", e);
        Config::new()
    });
    if let Some(base_url) = args.base_url {
        config.api_base_url = base_url;
    }
    debug!("Using catalog at {}", config.api_base_url);

    let provider = Provider::new(config)?;

    match args.command {
        Command::Search { query } => {
            let results = provider.search(&SearchOptions::query(query)).await;
            if args.json {
                return print_json(&results);
            }
            if results.is_empty() {
                println!("No results.");
            }
            for result in &results {
                println!("{}", result.to_display());
            }
        }
        Command::Episodes { media_id } => {
            let episodes = provider.find_episodes(&media_id).await?;
            if args.json {
                return print_json(&episodes);
            }
            for episode in &episodes {
                println!("{:>6}  {}", episode.canonical_key, episode.to_display());
            }
        }
        Command::Source {
            media_id,
            label,
            server,
        } => {
            let episodes = provider.find_episodes(&media_id).await?;
            let key = label.trim();
            let episode = episodes
                .iter()
                .find(|e| e.canonical_key == key)
                .ok_or_else(|| {
                    AppError::NotFound(format!("Episode {} of media {}", label, media_id))
                })?;

            let episode_server = provider.find_episode_server(episode, &server).await?;
            if args.json {
                return print_json(&episode_server);
            }
            println!("Server: {}", episode_server.server);
            for (name, value) in &episode_server.headers {
                println!("Header: {}: {}", name, value);
            }
            for source in &episode_server.video_sources {
                println!("{:?} {} {}", source.kind, source.quality, source.url);
            }
        }
        Command::Config { action } => return run_config(action, provider.config()),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.log {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    debug!("Log level set to {:?}", log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
