// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface and the options layering behind it.
//
// Precedence, lowest first: built-in defaults, the `--config` JSON file, then
// individual flags. Flags are turned into a sparse `Options` layer so they
// merge exactly like a config file would.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use pagesnap_core::config::{
    CanvasOptions, ConvertConfig, MarginOption, Options, PageOptions, PaperOption, RenderOptions,
};
use pagesnap_core::error::Result;
use pagesnap_core::types::{FitMode, ImageMime, Orientation, OutputMethod, Overflow, Resolution};
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "pagesnap")]
#[command(about = "Capture rendered HTML elements as PDF pages", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render an element of an HTML document into a PDF
    Render(RenderArgs),
    /// Print the page count and page sizes of a PDF
    Inspect {
        /// PDF file to inspect
        path: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// HTML file, or a URL when rendering with --chrome
    pub source: String,

    /// Selector of the element to capture
    #[arg(long, default_value = "body")]
    pub target: String,

    /// Capture each matching descendant of the target as its own page
    #[arg(long)]
    pub page_selector: Option<String>,

    /// JSON options file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Raster pixels per CSS pixel (1 low .. 12 extreme)
    #[arg(short, long)]
    pub resolution: Option<f32>,

    /// Paper size name (a3, a4, a5, letter, legal, tabloid)
    #[arg(long)]
    pub paper: Option<String>,

    /// Landscape orientation
    #[arg(long)]
    pub landscape: bool,

    /// Uniform page margin in millimetres
    #[arg(long)]
    pub margin: Option<f32>,

    /// none, fit-width, fit-height or shrink-to-width
    #[arg(long)]
    pub fit: Option<String>,

    /// Split captures taller than a page across several pages
    #[arg(long)]
    pub paginate: bool,

    /// Embedded image type (image/jpeg or image/png)
    #[arg(long)]
    pub mime: Option<String>,

    /// JPEG quality ratio between 0 and 1
    #[arg(long)]
    pub quality: Option<f32>,

    /// build, open or save
    #[arg(long)]
    pub method: Option<String>,

    /// Output file for `save` (defaults to <epoch-ms>.pdf)
    #[arg(short = 'o', long)]
    pub filename: Option<String>,

    /// Render with headless Chrome instead of the static HTML backend
    #[arg(long)]
    pub chrome: bool,
}

impl RenderArgs {
    /// The flags as a sparse override layer.
    pub fn overrides(&self) -> Options {
        let page = PageOptions {
            format: self.paper.clone().map(PaperOption::Named),
            orientation: self.landscape.then_some(Orientation::Landscape),
            margin: self.margin.map(MarginOption::Uniform),
            fit: self.fit.clone().map(FitMode::from),
            overflow: self.paginate.then_some(Overflow::Paginate),
        };
        let canvas = CanvasOptions {
            mime_type: self.mime.clone().map(ImageMime::from),
            quality_ratio: self.quality,
            ..CanvasOptions::default()
        };
        let render = self.page_selector.as_ref().map(|selector| RenderOptions {
            kind: Some("by_page".to_string()),
            page_selector: Some(selector.clone()),
        });

        Options {
            method: self.method.clone().map(OutputMethod::from),
            filename: self.filename.clone(),
            resolution: self.resolution.map(Resolution),
            page: (page != PageOptions::default()).then_some(page),
            canvas: (canvas != CanvasOptions::default()).then_some(canvas),
            overrides: None,
            render,
        }
    }

    /// Defaults, then the options file, then flags.
    pub async fn resolve_config(&self) -> Result<ConvertConfig> {
        let file = match &self.config {
            Some(path) => load_options(path).await?,
            None => Options::default(),
        };
        let config = ConvertConfig::from_options(Some(&file.layered(self.overrides())));
        debug!(?config, "Configuration resolved");
        Ok(config)
    }
}

/// Read a JSON options file.
pub async fn load_options(path: &Path) -> Result<Options> {
    let data = tokio::fs::read_to_string(path).await?;
    let options: Options = serde_json::from_str(&data)?;
    info!("Loaded options from {}", path.display());
    Ok(options)
}
