// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagesnap-document: Turning raster captures into PDF pages.
//
// Provides the page geometry calculator (scaling, fitting, margins), the
// `Capture` raster wrapper (cropping, re-encoding), the page converter that
// combines the two, and the PDF document model with its `printpdf` writer and
// `lopdf` reader.

pub mod capture;
pub mod converter;
pub mod geometry;
pub mod pdf;

// Re-export the primary types so callers can use `pagesnap_document::Document` etc.
pub use capture::{Capture, EncodedImage};
pub use converter::PageConverter;
pub use geometry::{PlacedImage, PlacementInput};
pub use pdf::document::{Document, Page, PageImage};
pub use pdf::reader::{EmbeddedImage, PdfReader};
pub use pdf::writer::PdfWriter;
