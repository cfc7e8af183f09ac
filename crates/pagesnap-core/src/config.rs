// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion configuration.
//
// `ConvertConfig` is the fully resolved configuration for one conversion.
// `Options` is the sparse, user-facing override layer (every field optional,
// camelCase JSON keys). Options are merged onto defaults field by field:
// a set field replaces the default, an unset field keeps it, nested page and
// canvas fields merge individually.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::types::{
    FitMode, ImageMime, Margins, Orientation, OutputMethod, Overflow, PaperSize, RenderMode,
    Resolution,
};

/// Rasterization and re-encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Encoding used for embedded page images.
    pub mime_type: ImageMime,
    /// Encoder quality in `0.0..=1.0` (JPEG only).
    pub quality_ratio: f32,
    /// Allow cross-origin images to be loaded by the rasterizer.
    pub use_cors: bool,
    /// Ask the rasterizer to log its own progress.
    pub logging: bool,
    /// Backend-specific passthrough options.
    pub overrides: BTreeMap<String, serde_json::Value>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            mime_type: ImageMime::Jpeg,
            quality_ratio: 1.0,
            use_cors: true,
            logging: false,
            overrides: BTreeMap::new(),
        }
    }
}

/// Page layout settings shared by every page of a conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub resolution: Resolution,
    pub paper: PaperSize,
    pub orientation: Orientation,
    pub margins: Margins,
    pub fit: FitMode,
    pub overflow: Overflow,
    pub canvas: CanvasConfig,
}

impl PageConfig {
    /// Physical page size in millimetres, orientation applied.
    pub fn page_size_mm(&self) -> (f32, f32) {
        let (w, h) = self.paper.dimensions_mm();
        self.orientation.apply(w as f32, h as f32)
    }

    /// Raster pixels per CSS pixel.
    pub fn scale(&self) -> f32 {
        self.resolution.scale()
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::MEDIUM,
            paper: PaperSize::A4,
            orientation: Orientation::Portrait,
            margins: Margins::NONE,
            fit: FitMode::ShrinkToWidth,
            overflow: Overflow::Clip,
            canvas: CanvasConfig::default(),
        }
    }
}

/// Fully resolved settings for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvertConfig {
    pub method: OutputMethod,
    /// Output filename for `save`; `None` means a timestamped name.
    pub filename: Option<String>,
    pub render: RenderMode,
    pub page: PageConfig,
}

impl ConvertConfig {
    /// Defaults overridden by `options`.
    pub fn from_options(options: Option<&Options>) -> Self {
        match options {
            Some(options) => Self::default().merged(options),
            None => Self::default(),
        }
    }

    /// Apply an override layer on top of this configuration.
    pub fn merged(mut self, options: &Options) -> Self {
        if let Some(method) = options.method {
            self.method = method;
        }
        if let Some(filename) = &options.filename {
            self.filename = Some(filename.clone());
        }
        if let Some(resolution) = options.resolution {
            self.page.resolution = resolution;
        }

        if let Some(page) = &options.page {
            if let Some(paper) = &page.format {
                if let Some(paper) = paper.resolve() {
                    self.page.paper = paper;
                }
            }
            if let Some(orientation) = page.orientation {
                self.page.orientation = orientation;
            }
            if let Some(margin) = &page.margin {
                self.page.margins = margin.apply_to(self.page.margins);
            }
            if let Some(fit) = page.fit {
                self.page.fit = fit;
            }
            if let Some(overflow) = page.overflow {
                self.page.overflow = overflow;
            }
        }

        if let Some(canvas) = &options.canvas {
            let target = &mut self.page.canvas;
            if let Some(mime_type) = canvas.mime_type {
                target.mime_type = mime_type;
            }
            if let Some(quality) = canvas.quality_ratio {
                target.quality_ratio = quality.clamp(0.0, 1.0);
            }
            if let Some(use_cors) = canvas.use_cors {
                target.use_cors = use_cors;
            }
            if let Some(logging) = canvas.logging {
                target.logging = logging;
            }
        }

        if let Some(extra) = options.overrides.as_ref().and_then(|o| o.canvas.as_ref()) {
            for (key, value) in extra {
                self.page.canvas.overrides.insert(key.clone(), value.clone());
            }
        }

        if let Some(render) = &options.render {
            self.render = render.resolve();
        }

        self
    }

    /// Configured filename, or `<epoch-ms>.pdf`.
    pub fn filename_or_default(&self) -> String {
        self.filename.clone().unwrap_or_else(default_filename)
    }
}

/// `<current epoch milliseconds>.pdf`
pub fn default_filename() -> String {
    format!("{}.pdf", Utc::now().timestamp_millis())
}

// -- Override layer -----------------------------------------------------------

/// Sparse user overrides. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    pub method: Option<OutputMethod>,
    pub filename: Option<String>,
    pub resolution: Option<Resolution>,
    pub page: Option<PageOptions>,
    pub canvas: Option<CanvasOptions>,
    pub overrides: Option<OverrideOptions>,
    pub render: Option<RenderOptions>,
}

impl Options {
    /// Stack `over` on top of `self`; fields set in `over` win.
    pub fn layered(self, over: Options) -> Options {
        Options {
            method: over.method.or(self.method),
            filename: over.filename.or(self.filename),
            resolution: over.resolution.or(self.resolution),
            page: merge_nested(self.page, over.page, PageOptions::layered),
            canvas: merge_nested(self.canvas, over.canvas, CanvasOptions::layered),
            overrides: merge_nested(self.overrides, over.overrides, OverrideOptions::layered),
            render: merge_nested(self.render, over.render, RenderOptions::layered),
        }
    }
}

fn merge_nested<T>(base: Option<T>, over: Option<T>, layer: fn(T, T) -> T) -> Option<T> {
    match (base, over) {
        (Some(base), Some(over)) => Some(layer(base, over)),
        (base, over) => over.or(base),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageOptions {
    #[serde(alias = "paper")]
    pub format: Option<PaperOption>,
    pub orientation: Option<Orientation>,
    pub margin: Option<MarginOption>,
    pub fit: Option<FitMode>,
    pub overflow: Option<Overflow>,
}

impl PageOptions {
    fn layered(self, over: PageOptions) -> PageOptions {
        PageOptions {
            format: over.format.or(self.format),
            orientation: over.orientation.or(self.orientation),
            margin: over.margin.or(self.margin),
            fit: over.fit.or(self.fit),
            overflow: over.overflow.or(self.overflow),
        }
    }
}

/// A paper size given either by name (`"a4"`) or explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaperOption {
    Named(String),
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperOption {
    fn resolve(&self) -> Option<PaperSize> {
        match self {
            Self::Named(name) => PaperSize::from_name(name),
            Self::Custom {
                width_mm,
                height_mm,
            } => Some(PaperSize::Custom {
                width_mm: *width_mm,
                height_mm: *height_mm,
            }),
        }
    }
}

/// A margin given either as one number for all sides or per side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarginOption {
    Uniform(f32),
    Sides(MarginSides),
}

impl MarginOption {
    fn apply_to(&self, base: Margins) -> Margins {
        match self {
            Self::Uniform(mm) => Margins::uniform(*mm),
            Self::Sides(sides) => Margins {
                top: sides.top.unwrap_or(base.top),
                right: sides.right.unwrap_or(base.right),
                bottom: sides.bottom.unwrap_or(base.bottom),
                left: sides.left.unwrap_or(base.left),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginSides {
    pub top: Option<f32>,
    pub right: Option<f32>,
    pub bottom: Option<f32>,
    pub left: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasOptions {
    pub mime_type: Option<ImageMime>,
    pub quality_ratio: Option<f32>,
    #[serde(rename = "useCORS", alias = "useCors")]
    pub use_cors: Option<bool>,
    pub logging: Option<bool>,
}

impl CanvasOptions {
    fn layered(self, over: CanvasOptions) -> CanvasOptions {
        CanvasOptions {
            mime_type: over.mime_type.or(self.mime_type),
            quality_ratio: over.quality_ratio.or(self.quality_ratio),
            use_cors: over.use_cors.or(self.use_cors),
            logging: over.logging.or(self.logging),
        }
    }
}

/// Raw passthrough options handed to the render backend untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideOptions {
    pub canvas: Option<BTreeMap<String, serde_json::Value>>,
}

impl OverrideOptions {
    fn layered(self, over: OverrideOptions) -> OverrideOptions {
        let canvas = match (self.canvas, over.canvas) {
            (Some(mut base), Some(over)) => {
                base.extend(over);
                Some(base)
            }
            (base, over) => over.or(base),
        };
        OverrideOptions { canvas }
    }
}

/// `{ "type": "by_page", "pageSelector": ".page" }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub page_selector: Option<String>,
}

impl RenderOptions {
    fn layered(self, over: RenderOptions) -> RenderOptions {
        RenderOptions {
            kind: over.kind.or(self.kind),
            page_selector: over.page_selector.or(self.page_selector),
        }
    }

    /// By-page mode needs both the `by_page` type and a non-empty selector;
    /// anything else captures the whole target.
    pub fn resolve(&self) -> RenderMode {
        match (self.kind.as_deref(), self.page_selector.as_deref()) {
            (Some("by_page"), Some(selector)) if !selector.trim().is_empty() => {
                RenderMode::ByPage {
                    page_selector: selector.to_string(),
                }
            }
            _ => RenderMode::Whole,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ConvertConfig::default();
        assert_eq!(config.method, OutputMethod::Save);
        assert_eq!(config.page.resolution, Resolution::MEDIUM);
        assert_eq!(config.page.page_size_mm(), (210.0, 297.0));
        assert_eq!(config.page.margins, Margins::NONE);
        assert_eq!(config.page.canvas.mime_type, ImageMime::Jpeg);
        assert!(config.page.canvas.use_cors);
        assert!(!config.page.canvas.logging);
        assert_eq!(config.render, RenderMode::Whole);
    }

    #[test]
    fn options_override_only_what_they_set() {
        let json = r#"{
            "method": "build",
            "resolution": 2,
            "page": { "margin": { "top": 12 }, "orientation": "landscape" },
            "canvas": { "mimeType": "image/png", "useCORS": false }
        }"#;
        let options: Options = serde_json::from_str(json).unwrap();
        let config = ConvertConfig::from_options(Some(&options));

        assert_eq!(config.method, OutputMethod::Build);
        assert_eq!(config.page.resolution, Resolution(2.0));
        assert_eq!(config.page.margins.top, 12.0);
        assert_eq!(config.page.margins.left, 0.0);
        assert_eq!(config.page.page_size_mm(), (297.0, 210.0));
        assert_eq!(config.page.canvas.mime_type, ImageMime::Png);
        assert!(!config.page.canvas.use_cors);
        // untouched
        assert_eq!(config.page.canvas.quality_ratio, 1.0);
        assert_eq!(config.page.paper, PaperSize::A4);
    }

    #[test]
    fn malformed_values_fall_back_silently() {
        let json = r#"{
            "method": "teleport",
            "page": { "fit": "squash", "format": "b99" },
            "render": { "type": "by_page" }
        }"#;
        let options: Options = serde_json::from_str(json).unwrap();
        let config = ConvertConfig::from_options(Some(&options));

        assert_eq!(config.method, OutputMethod::Save);
        assert_eq!(config.page.fit, FitMode::ShrinkToWidth);
        assert_eq!(config.page.paper, PaperSize::A4);
        assert_eq!(config.render, RenderMode::Whole);
    }

    #[test]
    fn by_page_render_resolves_with_selector() {
        let render = RenderOptions {
            kind: Some("by_page".into()),
            page_selector: Some(".page".into()),
        };
        assert_eq!(
            render.resolve(),
            RenderMode::ByPage {
                page_selector: ".page".into()
            }
        );
    }

    #[test]
    fn later_layers_win() {
        let file: Options = serde_json::from_str(
            r#"{ "filename": "report.pdf", "canvas": { "qualityRatio": 0.5, "logging": true } }"#,
        )
        .unwrap();
        let flags = Options {
            canvas: Some(CanvasOptions {
                quality_ratio: Some(0.8),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = ConvertConfig::from_options(Some(&file.layered(flags)));

        assert_eq!(config.filename.as_deref(), Some("report.pdf"));
        assert_eq!(config.page.canvas.quality_ratio, 0.8);
        assert!(config.page.canvas.logging);
    }

    #[test]
    fn canvas_overrides_pass_through() {
        let options: Options = serde_json::from_str(
            r##"{ "overrides": { "canvas": { "backgroundColor": "#000000" } } }"##,
        )
        .unwrap();
        let config = ConvertConfig::from_options(Some(&options));
        assert_eq!(
            config.page.canvas.overrides.get("backgroundColor"),
            Some(&serde_json::Value::String("#000000".into()))
        );
    }

    #[test]
    fn default_filename_is_epoch_millis() {
        let name = ConvertConfig::default().filename_or_default();
        let stem = name.strip_suffix(".pdf").unwrap();
        assert!(!stem.is_empty());
        assert!(stem.chars().all(|c| c.is_ascii_digit()));
    }
}
