// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagesnap: Capture rendered elements into PDF documents.
//
// Entry point. Initialises logging, parses the command line and runs the
// requested command.

mod cli;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use pagesnap_capture::{Delivery, HtmlBackend, RenderBackend, SystemViewer, Target, generate};
use pagesnap_core::config::ConvertConfig;
use pagesnap_core::error::{PagesnapError, Result};
use pagesnap_document::PdfReader;

use cli::{Cli, Command, RenderArgs};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::debug!(?cli, "Pagesnap starting");

    let result = match cli.command {
        Command::Render(args) => render(args).await,
        Command::Inspect { path } => inspect(&path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Pagesnap failed");
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn render(args: RenderArgs) -> Result<()> {
    let config = args.resolve_config().await?;

    let delivery = if args.chrome {
        render_with_chrome(&args, &config).await?
    } else {
        let backend = HtmlBackend::load(&args.source).await?;
        capture_with(&backend, &args.target, &config).await?
    };

    match delivery {
        Delivery::Built(document) => {
            println!("Built {} page(s)", document.page_count());
        }
        Delivery::Opened(path) => println!("Opened {}", path.display()),
        Delivery::Saved(path) => println!("Saved {}", path.display()),
    }
    Ok(())
}

async fn capture_with<B: RenderBackend>(
    backend: &B,
    selector: &str,
    config: &ConvertConfig,
) -> Result<Delivery> {
    let target = Target::from(backend.find(selector)?);
    generate(backend, target, config, &SystemViewer).await
}

#[cfg(feature = "chrome")]
async fn render_with_chrome(args: &RenderArgs, config: &ConvertConfig) -> Result<Delivery> {
    use pagesnap_capture::ChromeBackend;

    let url = source_url(&args.source)?;
    let backend = tokio::task::spawn_blocking(move || ChromeBackend::launch(&url))
        .await
        .map_err(|err| PagesnapError::Rasterize(format!("browser launch task failed: {}", err)))??;
    capture_with(&backend, &args.target, config).await
}

#[cfg(not(feature = "chrome"))]
async fn render_with_chrome(_args: &RenderArgs, _config: &ConvertConfig) -> Result<Delivery> {
    Err(PagesnapError::Unavailable(
        "headless Chrome rendering (rebuild with `--features chrome`)".into(),
    ))
}

/// URLs pass through; anything else is treated as a local file.
#[cfg_attr(not(feature = "chrome"), allow(dead_code))]
fn source_url(source: &str) -> Result<String> {
    if source.contains("://") {
        return Ok(source.to_string());
    }
    let path = std::fs::canonicalize(source)?;
    Ok(format!("file://{}", path.display()))
}

fn inspect(path: &Path) -> Result<()> {
    let reader = PdfReader::open(path)?;
    println!("{}: {} page(s)", path.display(), reader.page_count());
    for (index, (width, height)) in reader.page_sizes_mm()?.into_iter().enumerate() {
        println!("  page {}: {:.1} x {:.1} mm", index + 1, width, height);
    }
    Ok(())
}
