// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for page layout and capture output.
//
// The string-backed enums (`FitMode`, `Overflow`, `ImageMime`, `OutputMethod`)
// deserialize leniently: an unknown keyword falls back to the default variant
// instead of failing, so a typo in an options file never aborts a conversion.

use serde::{Deserialize, Serialize};

/// CSS pixels per millimetre (96 dpi reference pixel).
pub const PX_PER_MM: f32 = 96.0 / 25.4;

/// Capture resolution: how many raster pixels are produced per CSS pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resolution(pub f32);

impl Resolution {
    pub const LOW: Self = Self(1.0);
    pub const NORMAL: Self = Self(2.0);
    pub const MEDIUM: Self = Self(3.0);
    pub const HIGH: Self = Self(7.0);
    pub const EXTREME: Self = Self(12.0);

    /// Scale factor handed to the rasterizer.
    pub fn scale(&self) -> f32 {
        self.0
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::MEDIUM
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height), portrait.
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A3 => (297, 420),
            Self::A4 => (210, 297),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Tabloid => (279, 432),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Look up a named paper size (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "a3" => Some(Self::A3),
            "a4" => Some(Self::A4),
            "a5" => Some(Self::A5),
            "letter" => Some(Self::Letter),
            "legal" => Some(Self::Legal),
            "tabloid" | "ledger" => Some(Self::Tabloid),
            _ => None,
        }
    }
}

impl Default for PaperSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Orient a portrait (width, height) pair.
    pub fn apply(&self, width: f32, height: f32) -> (f32, f32) {
        match self {
            Self::Portrait => (width.min(height), width.max(height)),
            Self::Landscape => (width.max(height), width.min(height)),
        }
    }
}

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub const NONE: Self = Self::uniform(0.0);
    pub const SMALL: Self = Self::uniform(5.0);
    pub const MEDIUM: Self = Self::uniform(10.0);
    pub const LARGE: Self = Self::uniform(25.0);

    /// Same margin on all four sides.
    pub const fn uniform(mm: f32) -> Self {
        Self {
            top: mm,
            right: mm,
            bottom: mm,
            left: mm,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// How a capture is scaled onto the printable area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FitMode {
    /// Natural size; the image may overflow the page.
    None,
    /// Scale so the width equals the printable width.
    FitWidth,
    /// Scale so the height equals the printable height.
    FitHeight,
    /// Scale down to the printable width only when the capture is wider.
    #[default]
    ShrinkToWidth,
}

impl FitMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "fit-width" | "fit_width" | "width" => Some(Self::FitWidth),
            "fit-height" | "fit_height" | "height" => Some(Self::FitHeight),
            "shrink-to-width" | "shrink_to_width" | "shrink" => Some(Self::ShrinkToWidth),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::FitWidth => "fit-width",
            Self::FitHeight => "fit-height",
            Self::ShrinkToWidth => "shrink-to-width",
        }
    }
}

impl From<String> for FitMode {
    fn from(value: String) -> Self {
        Self::parse(&value).unwrap_or_default()
    }
}

impl From<FitMode> for String {
    fn from(value: FitMode) -> Self {
        value.as_str().to_string()
    }
}

/// What happens when a placed capture is taller than the printable area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Overflow {
    /// Keep one page per capture; content below the page edge is cut off.
    #[default]
    Clip,
    /// Split the capture into page-height bands, one page each.
    Paginate,
}

impl Overflow {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "clip" => Some(Self::Clip),
            "paginate" => Some(Self::Paginate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clip => "clip",
            Self::Paginate => "paginate",
        }
    }
}

impl From<String> for Overflow {
    fn from(value: String) -> Self {
        Self::parse(&value).unwrap_or_default()
    }
}

impl From<Overflow> for String {
    fn from(value: Overflow) -> Self {
        value.as_str().to_string()
    }
}

/// Image encoding used when a capture is embedded into a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageMime {
    #[default]
    Jpeg,
    Png,
}

impl ImageMime {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "jpeg" | "jpg" => Some(Self::Jpeg),
            "image/png" | "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// MIME type string.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

impl From<String> for ImageMime {
    fn from(value: String) -> Self {
        Self::parse(&value).unwrap_or_default()
    }
}

impl From<ImageMime> for String {
    fn from(value: ImageMime) -> Self {
        value.mime_type().to_string()
    }
}

/// What to do with the finished document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutputMethod {
    /// Return the document to the caller.
    Build,
    /// Write to a temporary file and show it in the system viewer.
    Open,
    /// Write to the configured (or timestamped) filename.
    #[default]
    Save,
}

impl OutputMethod {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "build" => Some(Self::Build),
            "open" => Some(Self::Open),
            "save" => Some(Self::Save),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Open => "open",
            Self::Save => "save",
        }
    }
}

impl From<String> for OutputMethod {
    fn from(value: String) -> Self {
        Self::parse(&value).unwrap_or_default()
    }
}

impl From<OutputMethod> for String {
    fn from(value: OutputMethod) -> Self {
        value.as_str().to_string()
    }
}

/// Which regions of the target are captured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderMode {
    /// Capture the whole target element as a single region.
    #[default]
    Whole,
    /// Capture each descendant matching `page_selector` as its own page.
    ByPage { page_selector: String },
}
