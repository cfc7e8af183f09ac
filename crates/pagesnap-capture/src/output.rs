// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output delivery: What happens to a finished document: hand it back, open
// it in the platform viewer, or save it to disk.

use std::path::{Path, PathBuf};

use pagesnap_core::config::ConvertConfig;
use pagesnap_core::error::{PagesnapError, Result};
use pagesnap_core::types::OutputMethod;
use pagesnap_document::Document;
use tracing::{info, instrument};

/// Shows a PDF file to the user.
pub trait Viewer: Send + Sync {
    fn open(&self, path: &Path) -> Result<()>;
}

/// Opens files with the desktop's default application.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemViewer;

impl Viewer for SystemViewer {
    fn open(&self, path: &Path) -> Result<()> {
        open::that(path)
            .map_err(|err| PagesnapError::Viewer(format!("{}: {}", path.display(), err)))
    }
}

/// The outcome of delivering a document.
#[derive(Debug)]
pub enum Delivery {
    /// `OutputMethod::Build`: the document itself.
    Built(Document),
    /// `OutputMethod::Open`: the temporary file handed to the viewer.
    Opened(PathBuf),
    /// `OutputMethod::Save`: where the file was written.
    Saved(PathBuf),
}

impl Delivery {
    /// The written file, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Built(_) => None,
            Self::Opened(path) | Self::Saved(path) => Some(path),
        }
    }

    pub fn into_document(self) -> Option<Document> {
        match self {
            Self::Built(document) => Some(document),
            _ => None,
        }
    }
}

/// Deliver `document` according to `config.method`.
#[instrument(skip_all, fields(method = config.method.as_str(), pages = document.page_count()))]
pub async fn deliver(
    document: Document,
    config: &ConvertConfig,
    viewer: &dyn Viewer,
) -> Result<Delivery> {
    match config.method {
        OutputMethod::Build => Ok(Delivery::Built(document)),
        OutputMethod::Open => {
            let path = std::env::temp_dir().join(config.filename_or_default());
            write_pdf(&document, &path).await?;
            viewer.open(&path)?;
            info!("Opened {}", path.display());
            Ok(Delivery::Opened(path))
        }
        OutputMethod::Save => {
            let path = PathBuf::from(config.filename_or_default());
            write_pdf(&document, &path).await?;
            Ok(Delivery::Saved(path))
        }
    }
}

async fn write_pdf(document: &Document, path: &Path) -> Result<()> {
    let bytes = document.to_pdf_bytes()?;
    tokio::fs::write(path, &bytes).await?;
    info!(bytes = bytes.len(), "Wrote PDF to {}", path.display());
    Ok(())
}
