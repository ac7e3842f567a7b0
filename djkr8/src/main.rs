//! djkr8 - harmonic-mixing playlist optimizer
//!
//! **Usage:**
//! ```bash
//! djkr8 optimize tracks.json [--output result.json] [--harmonic-level moderate]
//! djkr8 playlists --db master.db
//! djkr8 rekordbox --db master.db "Warmup" [--time-limit 30]
//! ```
//!
//! Exit code 0 on a non-empty playlist, 1 on load errors or when no playlist
//! could be built.

use anyhow::{Context, Result};
use clap::Parser;
use djkr8::cli::{Cli, Command, OptimizeOptions};
use djkr8::io::{load_tracks_from_json, save_result_to_json};
use djkr8::report::{format_playlist, format_playlists, format_summary};
use djkr8_common::config::{load_config, TomlConfig};
use djkr8_common::{PlaylistOptimizer, Track};
use djkr8_rekordbox::RekordboxLibrary;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Config comes first so its log level can seed the subscriber
    let file_config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&file_config.logging.level, cli.verbose);

    match run(cli, file_config).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(config_level: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, file_config: TomlConfig) -> Result<ExitCode> {
    match cli.command {
        Command::Optimize { input, options } => {
            let tracks = load_tracks_from_json(&input)
                .with_context(|| format!("Error loading tracks from {}", input.display()))?;
            println!("Loaded {} tracks from {}", tracks.len(), input.display());
            optimize(tracks, &options, &file_config).await
        }
        Command::Playlists { db } => {
            let library = RekordboxLibrary::open(&db).await?;
            let playlists = library
                .list_playlists()
                .await
                .context("Failed to list Rekordbox playlists")?;
            print!("{}", format_playlists(&playlists));
            Ok(ExitCode::SUCCESS)
        }
        Command::Rekordbox {
            db,
            playlist,
            options,
        } => {
            let library = RekordboxLibrary::open(&db).await?;
            let tracks = library
                .get_tracks(&playlist)
                .await
                .with_context(|| format!("Failed to load playlist '{}'", playlist))?;
            println!("Loaded {} tracks from Rekordbox playlist '{}'", tracks.len(), playlist);
            optimize(tracks, &options, &file_config).await
        }
    }
}

async fn optimize(tracks: Vec<Track>, options: &OptimizeOptions, file_config: &TomlConfig) -> Result<ExitCode> {
    let config = options.apply_to(file_config.optimizer.clone());
    let optimizer = PlaylistOptimizer::new(config).context("Invalid optimizer settings")?;

    println!("Optimizing playlist...");
    // The solve blocks for up to the time limit; keep it off the async workers
    let result = tokio::task::spawn_blocking(move || optimizer.optimize(&tracks))
        .await
        .context("Optimizer task failed")??;

    let status = result.solver_status;
    let result = match result.ensure_playlist() {
        Ok(result) if !result.playlist.is_empty() => result,
        Ok(_) => {
            eprintln!("No solution found. Solver status: {}", status);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => {
            eprintln!("No solution found. Solver status: {} ({})", status, e);
            return Ok(ExitCode::FAILURE);
        }
    };

    println!();
    print!("{}", format_summary(&result));

    match &options.output {
        Some(path) => {
            save_result_to_json(&result, path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("\nResults saved to {}", path.display());
        }
        None => {
            println!();
            print!("{}", format_playlist(&result));
        }
    }

    Ok(ExitCode::SUCCESS)
}
