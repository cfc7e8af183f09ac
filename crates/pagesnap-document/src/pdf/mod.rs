// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: The page/image document model, serialisation via `printpdf`,
// and inspection of written files via `lopdf`.

pub mod document;
pub mod reader;
pub mod writer;

pub use document::{Document, Page, PageImage};
pub use reader::{EmbeddedImage, PdfReader};
pub use writer::PdfWriter;
