// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: Inspect written PDF files (page count, page sizes) using the
// `lopdf` crate.

use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};
use pagesnap_core::error::PagesnapError;
use tracing::{debug, info, instrument};

/// Millimetres per PDF point.
const MM_PER_PT: f32 = 25.4 / 72.0;

/// Parent links followed when looking for an inherited MediaBox.
const MAX_INHERITANCE_DEPTH: usize = 16;

/// An image XObject as stored in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub width: u32,
    pub height: u32,
    /// Stream filters, outermost first (e.g. `FlateDecode`).
    pub filters: Vec<String>,
}

/// Reads existing PDF files.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl PdfReader {
    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PagesnapError> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            PagesnapError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.display().to_string()),
        })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, PagesnapError> {
        let document = Document::load_mem(data).map_err(|err| {
            PagesnapError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            source_path: None,
        })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Return the source path if the reader was created via [`PdfReader::open`].
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    /// Page sizes in millimetres (width, height), in page order.
    pub fn page_sizes_mm(&self) -> Result<Vec<(f32, f32)>, PagesnapError> {
        self.document
            .get_pages()
            .values()
            .map(|id| self.media_box(*id).map(|[x0, y0, x1, y1]| {
                ((x1 - x0).abs() * MM_PER_PT, (y1 - y0).abs() * MM_PER_PT)
            }))
            .collect()
    }

    /// Every image XObject in the file, in object order.
    ///
    /// Soft masks are image XObjects too and are included.
    pub fn images(&self) -> Result<Vec<EmbeddedImage>, PagesnapError> {
        let mut images = Vec::new();
        for (id, object) in &self.document.objects {
            let Object::Stream(stream) = object else {
                continue;
            };
            let dict = &stream.dict;
            if dict.get(b"Subtype").and_then(Object::as_name).ok() != Some(b"Image".as_slice()) {
                continue;
            }
            let dimension = |key: &[u8]| -> Result<u32, PagesnapError> {
                dict.get(key)
                    .and_then(Object::as_i64)
                    .ok()
                    .and_then(|value| u32::try_from(value).ok())
                    .ok_or_else(|| {
                        PagesnapError::PdfError(format!("image {:?} has a bad size entry", id))
                    })
            };
            let filters = match dict.get(b"Filter") {
                Ok(Object::Name(name)) => vec![String::from_utf8_lossy(name).into_owned()],
                Ok(Object::Array(names)) => names
                    .iter()
                    .filter_map(|name| name.as_name().ok())
                    .map(|name| String::from_utf8_lossy(name).into_owned())
                    .collect(),
                _ => Vec::new(),
            };
            images.push(EmbeddedImage {
                width: dimension(b"Width")?,
                height: dimension(b"Height")?,
                filters,
            });
        }
        debug!(images = images.len(), "Image XObjects listed");
        Ok(images)
    }

    /// MediaBox of a page, following `/Parent` for inherited values.
    fn media_box(&self, page_id: ObjectId) -> Result<[f32; 4], PagesnapError> {
        let mut current = self.dictionary(page_id)?;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(media_box) = current.get(b"MediaBox") {
                return parse_rect(self.resolve(media_box)?);
            }
            let parent = current
                .get(b"Parent")
                .and_then(Object::as_reference)
                .map_err(|_| PagesnapError::PdfError("page has no MediaBox".into()))?;
            current = self.dictionary(parent)?;
        }
        Err(PagesnapError::PdfError("MediaBox inheritance too deep".into()))
    }

    fn dictionary(&self, id: ObjectId) -> Result<&Dictionary, PagesnapError> {
        self.document
            .get_object(id)
            .and_then(Object::as_dict)
            .map_err(|err| PagesnapError::PdfError(format!("bad page object {:?}: {}", id, err)))
    }

    fn resolve<'a>(&'a self, object: &'a Object) -> Result<&'a Object, PagesnapError> {
        match object {
            Object::Reference(id) => self
                .document
                .get_object(*id)
                .map_err(|err| PagesnapError::PdfError(format!("dangling reference: {}", err))),
            other => Ok(other),
        }
    }
}

fn parse_rect(object: &Object) -> Result<[f32; 4], PagesnapError> {
    let values = object
        .as_array()
        .map_err(|err| PagesnapError::PdfError(format!("MediaBox is not an array: {}", err)))?;
    if values.len() != 4 {
        return Err(PagesnapError::PdfError(format!(
            "MediaBox has {} entries",
            values.len()
        )));
    }
    let mut rect = [0.0f32; 4];
    for (slot, value) in rect.iter_mut().zip(values) {
        *slot = match value {
            Object::Integer(i) => *i as f32,
            Object::Real(r) => *r as f32,
            other => {
                return Err(PagesnapError::PdfError(format!(
                    "MediaBox entry is not a number: {:?}",
                    other
                )));
            }
        };
    }
    Ok(rect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::document::Document as PageDocument;

    #[test]
    fn reads_back_page_sizes() {
        let mut doc = PageDocument::new("Sizes");
        doc.add_page(210.0, 297.0);
        doc.add_page(297.0, 210.0);
        let bytes = doc.to_pdf_bytes().unwrap();

        let reader = PdfReader::from_bytes(&bytes).unwrap();
        let sizes = reader.page_sizes_mm().unwrap();
        assert_eq!(sizes.len(), 2);
        assert!((sizes[0].0 - 210.0).abs() < 0.5 && (sizes[0].1 - 297.0).abs() < 0.5);
        assert!((sizes[1].0 - 297.0).abs() < 0.5 && (sizes[1].1 - 210.0).abs() < 0.5);
        assert!(reader.source_path().is_none());
    }

    #[test]
    fn opens_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.pdf");
        let mut doc = PageDocument::new("Disk");
        doc.add_page(148.0, 210.0);
        doc.save(&path).unwrap();

        let reader = PdfReader::open(&path).unwrap();
        assert_eq!(reader.page_count(), 1);
        assert!(reader.source_path().unwrap().ends_with("one.pdf"));
    }

    #[test]
    fn lists_embedded_images() {
        use crate::capture::Capture;
        use crate::geometry::PlacedImage;
        use crate::pdf::document::PageImage;
        use image::{Rgba, RgbaImage};
        use pagesnap_core::types::ImageMime;

        let capture = Capture::new(RgbaImage::from_pixel(64, 48, Rgba([0, 90, 0, 255])));
        let mut doc = PageDocument::new("Images");
        doc.add_page(210.0, 297.0);
        doc.add_image(PageImage {
            placement: PlacedImage {
                x: 0.0,
                y: 0.0,
                width: 64.0,
                height: 48.0,
            },
            image: capture.encode(ImageMime::Png, 1.0).unwrap(),
        })
        .unwrap();
        doc.add_page(210.0, 297.0);

        let reader = PdfReader::from_bytes(&doc.to_pdf_bytes().unwrap()).unwrap();
        let images = reader.images().unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!((images[0].width, images[0].height), (64, 48));
    }

    #[test]
    fn rejects_non_pdf_bytes() {
        assert!(matches!(
            PdfReader::from_bytes(b"hello"),
            Err(PagesnapError::PdfError(_))
        ));
    }
}
