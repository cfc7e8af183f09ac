// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture: The raster image produced for one rendered region, plus the
// re-encoding step that turns it into bytes embeddable in a PDF page.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use pagesnap_core::error::PagesnapError;
use pagesnap_core::types::ImageMime;
use tracing::{debug, instrument};

/// An immutable RGBA raster of one rendered region.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    image: RgbaImage,
}

impl Capture {
    /// Wrap an already-rendered RGBA buffer.
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// A 0 x 0 capture.
    pub fn empty() -> Self {
        Self {
            image: RgbaImage::new(0, 0),
        }
    }

    /// Decode an encoded raster (PNG, JPEG, ...) produced by a renderer.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, PagesnapError> {
        let img = image::load_from_memory(data).map_err(|err| {
            PagesnapError::ImageError(format!("failed to decode capture: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Capture decoded from bytes"
        );
        Ok(Self {
            image: img.to_rgba8(),
        })
    }

    /// Width in raster pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in raster pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// True when the capture has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Borrow the underlying pixels.
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    /// Copy out rows `[top, top + rows)`, clamped to the capture.
    ///
    /// A band starting at or below the bottom edge is empty.
    pub fn rows(&self, top: u32, rows: u32) -> Capture {
        if top >= self.height() || rows == 0 || self.width() == 0 {
            return Capture::empty();
        }
        let rows = rows.min(self.height() - top);
        let band = image::imageops::crop_imm(&self.image, 0, top, self.width(), rows).to_image();
        Capture { image: band }
    }

    /// Encode for embedding. `quality` is a ratio in `0.0..=1.0` and only
    /// affects JPEG. Transparent pixels are flattened onto white for JPEG.
    ///
    /// An empty capture encodes to an empty byte buffer.
    #[instrument(
        skip(self),
        fields(width = self.width(), height = self.height(), mime = mime.mime_type())
    )]
    pub fn encode(&self, mime: ImageMime, quality: f32) -> Result<EncodedImage, PagesnapError> {
        if self.is_empty() {
            return Ok(EncodedImage {
                mime,
                width: 0,
                height: 0,
                bytes: Vec::new(),
            });
        }

        let bytes = match mime {
            ImageMime::Png => {
                encode_to_format(&DynamicImage::ImageRgba8(self.image.clone()), ImageFormat::Png)?
            }
            ImageMime::Jpeg => {
                let mut buffer = Vec::new();
                let rgb = DynamicImage::ImageRgba8(flatten_onto_white(&self.image)).to_rgb8();
                let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                    &mut buffer,
                    jpeg_quality(quality),
                );
                rgb.write_with_encoder(encoder).map_err(|err| {
                    PagesnapError::ImageError(format!("JPEG encoding failed: {}", err))
                })?;
                buffer
            }
        };

        debug!(bytes = bytes.len(), "Capture encoded");
        Ok(EncodedImage {
            mime,
            width: self.width(),
            height: self.height(),
            bytes,
        })
    }
}

/// Encoded image bytes ready to be embedded in a page.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub mime: ImageMime,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Map a `0.0..=1.0` ratio onto the JPEG encoder's `1..=100` scale.
fn jpeg_quality(ratio: f32) -> u8 {
    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 1.0 };
    ((ratio * 100.0).round() as u8).max(1)
}

pub(crate) fn flatten_onto_white(image: &RgbaImage) -> RgbaImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;
        if a == 255 {
            continue;
        }
        let alpha = a as u32;
        let blend = |channel: u8| -> u8 {
            ((channel as u32 * alpha + 255 * (255 - alpha)) / 255) as u8
        };
        *pixel = Rgba([blend(r), blend(g), blend(b), 255]);
    }
    out
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, PagesnapError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image.write_to(&mut cursor, format).map_err(|err| {
        PagesnapError::ImageError(format!("image encoding failed: {}", err))
    })?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn striped(width: u32, height: u32) -> Capture {
        Capture::new(RgbaImage::from_fn(width, height, |_, y| {
            Rgba([(y % 256) as u8, 0, 0, 255])
        }))
    }

    #[test]
    fn rows_copies_the_requested_band() {
        let capture = striped(4, 10);
        let band = capture.rows(3, 4);
        assert_eq!((band.width(), band.height()), (4, 4));
        assert_eq!(band.as_rgba().get_pixel(0, 0), &Rgba([3, 0, 0, 255]));
    }

    #[test]
    fn rows_clamps_at_the_bottom_edge() {
        let band = striped(4, 10).rows(8, 5);
        assert_eq!(band.height(), 2);
    }

    #[test]
    fn rows_past_the_end_is_empty() {
        assert!(striped(4, 10).rows(10, 5).is_empty());
        assert!(striped(4, 10).rows(50, 5).is_empty());
    }

    #[test]
    fn png_round_trip_preserves_dimensions() {
        let encoded = striped(7, 5).encode(ImageMime::Png, 1.0).unwrap();
        assert_eq!(encoded.mime, ImageMime::Png);
        let decoded = Capture::from_bytes(&encoded.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (7, 5));
    }

    #[test]
    fn jpeg_flattens_transparency_onto_white() {
        let clear = Capture::new(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0])));
        let encoded = clear.encode(ImageMime::Jpeg, 1.0).unwrap();
        let decoded = Capture::from_bytes(&encoded.bytes).unwrap();
        let Rgba([r, g, b, _]) = *decoded.as_rgba().get_pixel(4, 4);
        assert!(r > 240 && g > 240 && b > 240);
    }

    #[test]
    fn empty_capture_encodes_to_nothing() {
        let encoded = Capture::empty().encode(ImageMime::Jpeg, 0.9).unwrap();
        assert!(encoded.is_empty());
        assert_eq!((encoded.width, encoded.height), (0, 0));
    }

    #[test]
    fn quality_ratio_maps_to_percent() {
        assert_eq!(jpeg_quality(1.0), 100);
        assert_eq!(jpeg_quality(0.92), 92);
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(f32::NAN), 100);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = Capture::from_bytes(b"not an image").unwrap_err();
        assert!(matches!(err, PagesnapError::ImageError(_)));
    }
}
