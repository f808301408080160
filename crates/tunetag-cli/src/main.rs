// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tunetag_application::{
    run_directory, AutoSelect, CoverArtFetcher, FileOutcome, FileState, Id3v2Opener, Operator,
    TagWriter, TaggingPipeline, TerminalPrompt,
};
use tunetag_config::{load as load_config, SpotifyConfig};
use tunetag_domain::ResolutionOptions;
use tunetag_spotify::{Credentials, SpotifyClient};

type Pipeline<'a> = TaggingPipeline<'a, SpotifyClient, Id3v2Opener>;

/// Tag MP3 files with track metadata from Spotify.
#[derive(Parser, Debug)]
#[command(name = "tunetag", version)]
struct Args {
    /// MP3 file, or directory whose MP3 files are tagged one after another
    path: PathBuf,
    /// Comma-separated genres used when the catalog lists none
    #[arg(long, default_value = "")]
    genre: String,
    /// Search term instead of the file name (single file only)
    #[arg(long)]
    search: Option<String>,
    /// Remove every existing frame before writing
    #[arg(long)]
    reset: bool,
    /// Rename tagged files to "Artist - Title.mp3"
    #[arg(long)]
    rename: bool,
    /// Take the first candidate without prompting
    #[arg(long)]
    auto: bool,
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn resolution_options(&self) -> ResolutionOptions {
        ResolutionOptions::new(self.search.clone(), &self.genre, self.reset, self.rename)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    init_tracing(&config.telemetry.log_level);
    info!(
        target: "config",
        source = %config_source(args.config.as_deref()),
        log_level = %config.telemetry.log_level,
        "configuration loaded"
    );

    let client = build_client(&config.spotify)?;
    let covers = CoverArtFetcher::new(config.spotify.timeout())?;
    let pipeline = TaggingPipeline::new(&client, TagWriter::new(Id3v2Opener, covers));
    let options = args.resolution_options();

    if args.auto {
        run(&pipeline, &args.path, &options, &mut AutoSelect).await
    } else {
        run(&pipeline, &args.path, &options, &mut TerminalPrompt::stdio()).await
    }
}

fn init_tracing(default_level: &str) {
    // Prompts own stdout.
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Where settings beyond the built-in defaults came from.
fn config_source(path: Option<&Path>) -> String {
    match path {
        Some(path) => format!("{} + environment", path.display()),
        None => "environment".to_string(),
    }
}

fn build_client(config: &SpotifyConfig) -> Result<SpotifyClient> {
    let (client_id, client_secret) = config.credentials()?;
    let client = SpotifyClient::builder(Credentials::new(client_id, client_secret))
        .base_url(config.api_base_url.clone())
        .accounts_base_url(config.accounts_base_url.clone())
        .timeout(config.timeout())
        .min_request_interval(config.min_request_interval())
        .build()
        .context("failed to build spotify client")?;
    Ok(client)
}

async fn run<P: Operator + ?Sized>(
    pipeline: &Pipeline<'_>,
    path: &Path,
    options: &ResolutionOptions,
    operator: &mut P,
) -> Result<()> {
    let metadata =
        std::fs::metadata(path).with_context(|| format!("cannot access {}", path.display()))?;

    if metadata.is_dir() {
        if options.term.is_some() {
            warn!(target: "cli", "--search is ignored when tagging a directory");
        }
        let report = run_directory(pipeline, path, options, operator)
            .await
            .with_context(|| format!("cannot read directory {}", path.display()))?;

        for file in report.files.iter().filter(|f| f.state == FileState::Failed) {
            warn!(
                target: "cli",
                path = %file.path.display(),
                error = file.error.as_deref().unwrap_or_default(),
                "not tagged"
            );
        }
        return Ok(());
    }

    match pipeline.process_file(path, options, operator).await? {
        FileOutcome::Tagged { path, renamed_to } => {
            let path = renamed_to.unwrap_or(path);
            info!(target: "cli", path = %path.display(), "tagged");
        }
        FileOutcome::Abandoned => {
            info!(target: "cli", path = %path.display(), "no track chosen, file left as is");
        }
    }
    Ok(())
}
