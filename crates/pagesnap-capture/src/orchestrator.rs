// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture orchestrator.
//
// Resolves the target, expands it into regions (the target itself, or every
// descendant matching the page selector), rasterizes the regions one after
// another and assembles their pages into a single document. The first error
// aborts the whole conversion; nothing partial is returned.

use pagesnap_core::config::ConvertConfig;
use pagesnap_core::error::{PagesnapError, Result};
use pagesnap_core::types::RenderMode;
use pagesnap_document::{Capture, Document, PageConverter};
use tracing::{debug, info, instrument};

use crate::backend::{RenderBackend, RenderRequest};
use crate::output::{self, Delivery, Viewer};
use crate::target::Target;

/// Elements to rasterize, in output order.
#[instrument(skip_all, fields(render = ?config.render))]
pub fn regions<B: RenderBackend>(
    backend: &B,
    target: Target<B::Element>,
    config: &ConvertConfig,
) -> Result<Vec<B::Element>> {
    let element = target.resolve()?;
    match &config.render {
        RenderMode::Whole => Ok(vec![element]),
        RenderMode::ByPage { page_selector } => {
            let pages = backend.query_all(&element, page_selector)?;
            if pages.is_empty() {
                debug!(page_selector = %page_selector, "No page elements matched");
                return Err(PagesnapError::TargetNotFound);
            }
            Ok(pages)
        }
    }
}

/// Capture the target into a document without delivering it.
#[instrument(skip_all)]
pub async fn capture_document<B: RenderBackend>(
    backend: &B,
    target: Target<B::Element>,
    config: &ConvertConfig,
) -> Result<Document> {
    let regions = regions(backend, target, config)?;
    let request = RenderRequest::from_config(&config.page);
    info!(regions = regions.len(), scale = request.scale, "Capturing");

    let mut regions = regions.iter().enumerate();
    // `regions` never returns an empty list.
    let (_, first) = regions.next().ok_or(PagesnapError::TargetNotFound)?;
    let capture = backend.rasterize(first, &request).await?;
    log_capture(0, &capture);
    let mut document = PageConverter::new(&capture, &config.page).convert()?;

    for (index, region) in regions {
        let capture = backend.rasterize(region, &request).await?;
        log_capture(index, &capture);
        PageConverter::new(&capture, &config.page).append_to(&mut document)?;
    }

    info!(pages = document.page_count(), "Document assembled");
    Ok(document)
}

fn log_capture(region: usize, capture: &Capture) {
    debug!(
        region,
        width = capture.width(),
        height = capture.height(),
        "Region rasterized"
    );
}

/// Capture the target and deliver the result per `config.method`.
pub async fn generate<B: RenderBackend>(
    backend: &B,
    target: Target<B::Element>,
    config: &ConvertConfig,
    viewer: &dyn Viewer,
) -> Result<Delivery> {
    let document = capture_document(backend, target, config).await?;
    output::deliver(document, config, viewer).await
}
