// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page converter: Turn one capture into placed PDF page(s).
//
// The capture is placed once with the geometry calculator; with
// `Overflow::Paginate` it is additionally cut into bands of one printable page
// height each, and every band is placed at the same millimetres-per-pixel
// ratio as the whole capture so bands line up edge to edge.

use pagesnap_core::config::PageConfig;
use pagesnap_core::error::PagesnapError;
use pagesnap_core::types::{FitMode, Overflow};
use tracing::{debug, info, instrument};

use crate::capture::Capture;
use crate::geometry::{self, PlacedImage, PlacementInput};
use crate::pdf::document::{Document, PageImage};

/// Title given to documents created by the converter.
pub const DEFAULT_TITLE: &str = "Pagesnap Capture";

/// Places one capture onto pages according to a `PageConfig`.
pub struct PageConverter<'a> {
    capture: &'a Capture,
    config: &'a PageConfig,
}

impl<'a> PageConverter<'a> {
    pub fn new(capture: &'a Capture, config: &'a PageConfig) -> Self {
        Self { capture, config }
    }

    fn input(&self) -> PlacementInput {
        PlacementInput::for_page(self.capture.width(), self.capture.height(), self.config)
    }

    /// Placement of the whole capture.
    pub fn placement(&self) -> PlacedImage {
        geometry::place(&self.input())
    }

    /// Raster rows that fit on one page. Zero only for an empty capture.
    pub fn rows_per_page(&self) -> u32 {
        let height = self.capture.height();
        match self.config.fit {
            // A height fit scales the whole capture onto one page.
            FitMode::FitHeight => height,
            _ => geometry::rows_per_page(&self.input()).map_or(height, |rows| rows.min(height)),
        }
    }

    /// Number of pages this capture produces.
    pub fn page_count(&self) -> usize {
        match self.config.overflow {
            Overflow::Clip => 1,
            Overflow::Paginate => {
                let rows = self.rows_per_page();
                if rows == 0 {
                    1
                } else {
                    self.capture.height().div_ceil(rows).max(1) as usize
                }
            }
        }
    }

    /// The band of the capture shown on output page `page_index` (0-based).
    ///
    /// Bands are `rows_per_page` rows tall; the last one may be shorter. An
    /// index past the end of the capture yields an empty capture.
    pub fn crop_page(&self, page_index: usize) -> Capture {
        let rows = self.rows_per_page();
        let top = u32::try_from(page_index)
            .ok()
            .and_then(|index| index.checked_mul(rows));
        match top {
            Some(top) => self.capture.rows(top, rows),
            None => Capture::empty(),
        }
    }

    /// Placement of a band cut from this capture.
    pub fn band_placement(&self, band: &Capture) -> PlacedImage {
        let full = self.placement();
        if self.capture.height() == 0 || band.is_empty() {
            return PlacedImage {
                width: 0.0,
                height: 0.0,
                ..full
            };
        }
        let mm_per_row = full.height / self.capture.height() as f32;
        PlacedImage {
            height: band.height() as f32 * mm_per_row,
            ..full
        }
    }

    /// A new document holding this capture.
    ///
    /// One page with `Overflow::Clip`; one page per band with
    /// `Overflow::Paginate`.
    #[instrument(skip(self), fields(width = self.capture.width(), height = self.capture.height()))]
    pub fn convert(&self) -> Result<Document, PagesnapError> {
        let mut document = Document::new(DEFAULT_TITLE);
        self.append_to(&mut document)?;
        Ok(document)
    }

    /// Add this capture's page(s) to the end of an existing document.
    pub fn append_to(&self, document: &mut Document) -> Result<(), PagesnapError> {
        let (page_w, page_h) = self.config.page_size_mm();
        let canvas = &self.config.canvas;
        let pages = self.page_count();

        for page_index in 0..pages {
            let (band, placement) = match self.config.overflow {
                Overflow::Clip => (None, self.placement()),
                Overflow::Paginate => {
                    let band = self.crop_page(page_index);
                    let placement = self.band_placement(&band);
                    (Some(band), placement)
                }
            };
            let source = band.as_ref().unwrap_or(self.capture);
            let image = source.encode(canvas.mime_type, canvas.quality_ratio)?;

            let number = document.add_page(page_w, page_h);
            document.add_image(PageImage { placement, image })?;
            debug!(
                page = number,
                width_mm = placement.width,
                height_mm = placement.height,
                "Capture placed"
            );
        }

        info!(pages, total = document.page_count(), "Capture converted");
        Ok(())
    }
}
