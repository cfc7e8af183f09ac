// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory document model: an ordered list of pages, each holding placed,
// encoded images. Serialisation is delegated to `PdfWriter`.

use std::path::Path;

use pagesnap_core::error::PagesnapError;
use tracing::info;

use crate::capture::EncodedImage;
use crate::geometry::PlacedImage;
use crate::pdf::writer::PdfWriter;

/// One image drawn on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    pub placement: PlacedImage,
    pub image: EncodedImage,
}

/// One physical page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub width_mm: f32,
    pub height_mm: f32,
    pub images: Vec<PageImage>,
}

/// An ordered sequence of pages with a cursor, mirroring the usual
/// `add_page` / `set_page` / `add_image` PDF-builder workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    title: String,
    pages: Vec<Page>,
    /// Index into `pages` that `add_image` draws on.
    current: usize,
}

impl Document {
    /// An empty document with no pages.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pages: Vec::new(),
            current: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Append a blank page and make it current. Returns its 1-based number.
    pub fn add_page(&mut self, width_mm: f32, height_mm: f32) -> usize {
        self.pages.push(Page {
            width_mm,
            height_mm,
            images: Vec::new(),
        });
        self.current = self.pages.len() - 1;
        self.pages.len()
    }

    /// Make the page with the given 1-based number current.
    pub fn set_page(&mut self, number: usize) -> Result<(), PagesnapError> {
        if number == 0 || number > self.pages.len() {
            return Err(PagesnapError::PdfError(format!(
                "page {} out of range (document has {} pages)",
                number,
                self.pages.len()
            )));
        }
        self.current = number - 1;
        Ok(())
    }

    /// Draw an image on the current page.
    pub fn add_image(&mut self, image: PageImage) -> Result<(), PagesnapError> {
        let page = self
            .pages
            .get_mut(self.current)
            .ok_or_else(|| PagesnapError::PdfError("document has no pages".into()))?;
        page.images.push(image);
        Ok(())
    }

    /// Move every page of `other` to the end of this document.
    pub fn append(&mut self, other: Document) {
        self.pages.extend(other.pages);
        if !self.pages.is_empty() {
            self.current = self.pages.len() - 1;
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serialise to PDF bytes.
    pub fn to_pdf_bytes(&self) -> Result<Vec<u8>, PagesnapError> {
        PdfWriter::new().write(self)
    }

    /// Serialise and write to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PagesnapError> {
        let bytes = self.to_pdf_bytes()?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!(pages = self.page_count(), "Wrote PDF to {}", path.as_ref().display());
        Ok(())
    }
}
