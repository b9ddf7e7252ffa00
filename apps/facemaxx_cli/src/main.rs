use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{load_settings, InMemoryPreviews, SessionController};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Rate a face photo with gentle, practical tips.
#[derive(Parser, Debug)]
#[command(name = "facemaxx", version)]
struct Args {
    /// Photo to analyze (PNG or JPG, front-facing, good lighting).
    file: PathBuf,
    /// Analysis service base URL; overrides BACKEND_URL and facemaxx.toml.
    #[arg(long)]
    backend_url: Option<String>,
    /// Request timeout in seconds; overrides APP__REQUEST_TIMEOUT_SECONDS.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Print the final session snapshot as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = &args.backend_url {
        settings.set_backend_url(url)?;
    }
    if let Some(seconds) = args.timeout_secs {
        settings.set_request_timeout_seconds(seconds);
    }
    info!(backend_url = %settings.backend_url, "facemaxx: settings resolved");

    let controller = SessionController::with_http(&settings, InMemoryPreviews::new())?;
    controller
        .select_path(&args.file)
        .await
        .with_context(|| format!("failed to load photo '{}'", args.file.display()))?;
    let snapshot = controller.analyze().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", result_view::render(&snapshot));
    }

    let failed = snapshot.error().is_some();
    controller.shutdown().await;
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
