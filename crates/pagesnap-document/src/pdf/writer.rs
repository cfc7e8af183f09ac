// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer: Serialise a `Document` using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use pagesnap_core::error::PagesnapError;
use printpdf::{
    ImageCompression, ImageOptimizationOptions, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions,
    PdfWarnMsg, Pt, RawImage, RawImageData, RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

use crate::capture::flatten_onto_white;
use crate::pdf::document::{Document, PageImage};

/// Images are embedded at 72 dpi so one raster pixel is one point before scaling.
const EMBED_DPI: f32 = 72.0;

/// Serialises documents to PDF bytes.
pub struct PdfWriter {
    options: PdfSaveOptions,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::with_options(PdfSaveOptions {
            image_optimization: Some(lossless_embedding()),
            ..PdfSaveOptions::default()
        })
    }
}

/// Flate-compress embedded rasters without resizing or recolouring them.
///
/// printpdf's own defaults downsample anything over 2 MB and may convert
/// images to greyscale; captures must land in the PDF pixel for pixel.
fn lossless_embedding() -> ImageOptimizationOptions {
    ImageOptimizationOptions {
        quality: None,
        max_image_size: None,
        dither_greyscale: None,
        convert_to_greyscale: None,
        auto_optimize: Some(false),
        format: Some(ImageCompression::Flate),
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom `printpdf` save options (compression, image optimisation).
    pub fn with_options(options: PdfSaveOptions) -> Self {
        Self { options }
    }

    /// Build the PDF for `document`.
    ///
    /// Images with an empty placement or no encoded bytes are skipped; their
    /// page is still emitted.
    #[instrument(skip_all, fields(pages = document.page_count()))]
    pub fn write(&self, document: &Document) -> Result<Vec<u8>, PagesnapError> {
        info!(title = document.title(), "Writing PDF");

        let mut doc = PdfDocument::new(document.title());
        let mut pages: Vec<PdfPage> = Vec::with_capacity(document.page_count());

        for (index, page) in document.pages().iter().enumerate() {
            let page_h_pt = Mm(page.height_mm).into_pt().0;
            let mut ops: Vec<Op> = Vec::new();

            for image in &page.images {
                if image.placement.is_empty() || image.image.is_empty() {
                    debug!(page = index + 1, "Skipping empty image");
                    continue;
                }
                let raw = decode_for_embedding(image)?;
                let (px_w, px_h) = (raw.width as f32, raw.height as f32);
                let xobject_id = doc.add_image(&raw);

                let placement = &image.placement;
                let width_pt = Mm(placement.width).into_pt().0;
                let height_pt = Mm(placement.height).into_pt().0;
                let x_pt = Mm(placement.x).into_pt().0;
                // PDF space starts at the bottom-left corner.
                let y_pt = page_h_pt - Mm(placement.y).into_pt().0 - height_pt;

                ops.push(Op::UseXobject {
                    id: xobject_id,
                    transform: XObjectTransform {
                        translate_x: Some(Pt(x_pt)),
                        translate_y: Some(Pt(y_pt)),
                        scale_x: Some(width_pt / px_w),
                        scale_y: Some(height_pt / px_h),
                        dpi: Some(EMBED_DPI),
                        rotate: None,
                    },
                });
                debug!(page = index + 1, width_pt, height_pt, x_pt, y_pt, "Image placed on page");
            }

            pages.push(PdfPage::new(Mm(page.width_mm), Mm(page.height_mm), ops));
        }

        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&self.options, &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "printpdf reported warnings while saving");
        }

        Ok(output)
    }
}

/// Decode an encoded page image into RGB pixels for `printpdf`.
fn decode_for_embedding(image: &PageImage) -> Result<RawImage, PagesnapError> {
    let decoded = ::image::load_from_memory(&image.image.bytes).map_err(|err| {
        PagesnapError::ImageError(format!(
            "failed to decode {} for PDF: {}",
            image.image.mime.mime_type(),
            err
        ))
    })?;

    let width = decoded.width() as usize;
    let height = decoded.height() as usize;
    let rgb = ::image::DynamicImage::ImageRgba8(flatten_onto_white(&decoded.to_rgba8())).to_rgb8();

    Ok(RawImage {
        pixels: RawImageData::U8(rgb.into_raw()),
        width,
        height,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Capture;
    use crate::geometry::PlacedImage;
    use crate::pdf::reader::PdfReader;
    use image::{Rgba, RgbaImage};
    use pagesnap_core::types::ImageMime;

    fn page_image(width: f32, height: f32) -> PageImage {
        let capture = Capture::new(RgbaImage::from_pixel(20, 10, Rgba([10, 120, 200, 255])));
        PageImage {
            placement: PlacedImage {
                width,
                height,
                x: 10.0,
                y: 10.0,
            },
            image: capture.encode(ImageMime::Png, 1.0).unwrap(),
        }
    }

    #[test]
    fn writes_one_pdf_page_per_document_page() {
        let mut doc = Document::new("Writer test");
        doc.add_page(210.0, 297.0);
        doc.add_image(page_image(100.0, 50.0)).unwrap();
        doc.add_page(210.0, 297.0);
        doc.add_image(page_image(100.0, 50.0)).unwrap();
        doc.add_page(297.0, 210.0);

        let bytes = PdfWriter::new().write(&doc).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let reader = PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.page_count(), 3);
    }

    #[test]
    fn empty_placements_are_skipped() {
        let mut doc = Document::new("Empty");
        doc.add_page(210.0, 297.0);
        doc.add_image(page_image(0.0, 0.0)).unwrap();

        let bytes = PdfWriter::new().write(&doc).unwrap();
        let reader = PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.page_count(), 1);
    }

    fn single_image_document(capture: &Capture, mime: ImageMime, quality: f32) -> Document {
        let mut doc = Document::new("Embedding");
        doc.add_page(210.0, 297.0);
        doc.add_image(PageImage {
            placement: PlacedImage {
                width: 190.0,
                height: 142.5,
                x: 10.0,
                y: 10.0,
            },
            image: capture.encode(mime, quality).unwrap(),
        })
        .unwrap();
        doc
    }

    #[test]
    fn large_captures_keep_their_pixel_size() {
        // 1200 x 900 RGB is over printpdf's 2 MB downsampling threshold.
        let capture = Capture::new(RgbaImage::from_fn(1200, 900, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 90, 255])
        }));
        let doc = single_image_document(&capture, ImageMime::Png, 1.0);

        let bytes = PdfWriter::new().write(&doc).unwrap();
        let images = PdfReader::from_bytes(&bytes).unwrap().images().unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!((images[0].width, images[0].height), (1200, 900));
        assert_eq!(images[0].filters, vec!["FlateDecode".to_string()]);
    }

    #[test]
    fn jpeg_captures_are_embedded_at_full_size() {
        let capture = Capture::new(RgbaImage::from_pixel(300, 200, Rgba([240, 240, 240, 255])));
        let doc = single_image_document(&capture, ImageMime::Jpeg, 0.4);

        let bytes = PdfWriter::new().write(&doc).unwrap();
        let images = PdfReader::from_bytes(&bytes).unwrap().images().unwrap();
        // light grey stays RGB; no greyscale conversion
        assert_eq!(images.len(), 1);
        assert_eq!((images[0].width, images[0].height), (300, 200));
    }

    #[test]
    fn corrupt_image_bytes_are_reported() {
        let mut image = page_image(10.0, 10.0);
        image.image.bytes = vec![1, 2, 3];
        let mut doc = Document::new("Corrupt");
        doc.add_page(210.0, 297.0);
        doc.add_image(image).unwrap();

        let err = PdfWriter::new().write(&doc).unwrap_err();
        assert!(matches!(err, PagesnapError::ImageError(_)));
    }
}
