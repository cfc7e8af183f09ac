// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page geometry: Where a capture lands on a page and how large it is.
//
// All lengths are in physical page units (millimetres in practice). A capture
// of `w x h` raster pixels taken at `scale` raster pixels per CSS pixel has a
// natural size of `w / (scale * pixels_per_unit)` by `h / (scale * pixels_per_unit)`.
// The fit mode then optionally rescales that size onto the printable area.
// Degenerate inputs produce a zero-size placement rather than an error.

use pagesnap_core::config::PageConfig;
use pagesnap_core::types::{FitMode, Margins, PX_PER_MM};

/// Everything the calculator needs for one placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementInput {
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Raster pixels per CSS pixel.
    pub scale: f32,
    /// CSS pixels per physical unit.
    pub pixels_per_unit: f32,
    pub page_width: f32,
    pub page_height: f32,
    pub margins: Margins,
    pub fit: FitMode,
}

impl PlacementInput {
    /// Placement input for a capture of the given pixel size on a configured page.
    pub fn for_page(pixel_width: u32, pixel_height: u32, config: &PageConfig) -> Self {
        let (page_width, page_height) = config.page_size_mm();
        Self {
            pixel_width,
            pixel_height,
            scale: config.scale(),
            pixels_per_unit: PX_PER_MM,
            page_width,
            page_height,
            margins: config.margins,
            fit: config.fit,
        }
    }

    /// Raster pixels per physical unit before any fitting, if usable.
    fn density(&self) -> Option<f32> {
        let density = self.scale * self.pixels_per_unit;
        (density.is_finite() && density > 0.0).then_some(density)
    }
}

/// Position and size of one image on a page, in physical units.
///
/// `x`/`y` are measured from the top-left corner of the page.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlacedImage {
    pub width: f32,
    pub height: f32,
    pub x: f32,
    pub y: f32,
}

impl PlacedImage {
    /// True when nothing would be visible.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Printable width and height (page minus margins), never negative.
pub fn printable_area(input: &PlacementInput) -> (f32, f32) {
    (
        (input.page_width - input.margins.horizontal()).max(0.0),
        (input.page_height - input.margins.vertical()).max(0.0),
    )
}

/// Natural physical size of the capture, or `None` for degenerate input.
pub fn natural_size(input: &PlacementInput) -> Option<(f32, f32)> {
    let density = input.density()?;
    if input.pixel_width == 0 || input.pixel_height == 0 {
        return None;
    }
    Some((
        input.pixel_width as f32 / density,
        input.pixel_height as f32 / density,
    ))
}

/// Multiplier the fit mode applies to the natural size.
///
/// `1.0` means natural size. Degenerate input yields `1.0`; the placement is
/// zero-sized anyway.
pub fn fit_factor(input: &PlacementInput) -> f32 {
    let Some((natural_w, natural_h)) = natural_size(input) else {
        return 1.0;
    };
    let (printable_w, printable_h) = printable_area(input);

    match input.fit {
        FitMode::None => 1.0,
        FitMode::FitWidth => printable_w / natural_w,
        FitMode::FitHeight => printable_h / natural_h,
        FitMode::ShrinkToWidth if natural_w > printable_w => printable_w / natural_w,
        FitMode::ShrinkToWidth => 1.0,
    }
}

/// Compute where and how large the capture is drawn.
pub fn place(input: &PlacementInput) -> PlacedImage {
    let x = input.margins.left;
    let y = input.margins.top;

    let Some((natural_w, natural_h)) = natural_size(input) else {
        return PlacedImage {
            width: 0.0,
            height: 0.0,
            x,
            y,
        };
    };

    let factor = fit_factor(input);
    let (width, height) = match input.fit {
        // Pin the fitted edge exactly instead of trusting `natural * (printable / natural)`.
        FitMode::FitWidth => (printable_area(input).0, natural_h * factor),
        FitMode::FitHeight => (natural_w * factor, printable_area(input).1),
        _ => (natural_w * factor, natural_h * factor),
    };

    PlacedImage {
        width: width.max(0.0),
        height: height.max(0.0),
        x,
        y,
    }
}

/// Raster rows that fill one printable page height at this scale and fit.
///
/// `None` when a page cannot hold any rows (degenerate input or no printable
/// height); callers then treat the whole capture as one band.
pub fn rows_per_page(input: &PlacementInput) -> Option<u32> {
    let density = input.density()?;
    let factor = fit_factor(input);
    let (_, printable_h) = printable_area(input);
    if !(factor.is_finite() && factor > 0.0) || printable_h <= 0.0 {
        return None;
    }
    let rows = (printable_h * density / factor).floor();
    (rows >= 1.0).then(|| rows.min(u32::MAX as f32) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn a4(pixel_width: u32, pixel_height: u32, scale: f32, fit: FitMode) -> PlacementInput {
        PlacementInput {
            pixel_width,
            pixel_height,
            scale,
            pixels_per_unit: PX_PER_MM,
            page_width: 210.0,
            page_height: 297.0,
            margins: Margins::NONE,
            fit,
        }
    }

    #[test]
    fn natural_size_divides_by_scale_and_density() {
        let placed = place(&a4(400, 300, 2.0, FitMode::None));
        assert!((placed.width - 400.0 / (2.0 * PX_PER_MM)).abs() < EPS);
        assert!((placed.height - 300.0 / (2.0 * PX_PER_MM)).abs() < EPS);
        assert!(placed.width > 0.0 && placed.height > 0.0);
    }

    #[test]
    fn size_is_proportional_to_pixels() {
        let small = place(&a4(100, 50, 3.0, FitMode::None));
        let large = place(&a4(200, 100, 3.0, FitMode::None));
        assert!((large.width - 2.0 * small.width).abs() < EPS);
        assert!((large.height - 2.0 * small.height).abs() < EPS);
    }

    #[test]
    fn fit_width_fills_printable_width_and_keeps_aspect() {
        let mut input = a4(1000, 2500, 1.0, FitMode::FitWidth);
        input.margins = Margins {
            top: 5.0,
            right: 15.0,
            bottom: 5.0,
            left: 10.0,
        };
        let placed = place(&input);
        assert_eq!(placed.width, 210.0 - 10.0 - 15.0);
        assert!((placed.height / placed.width - 2.5).abs() < EPS);
        assert_eq!((placed.x, placed.y), (10.0, 5.0));
    }

    #[test]
    fn fit_height_fills_printable_height() {
        let mut input = a4(300, 600, 2.0, FitMode::FitHeight);
        input.margins = Margins::MEDIUM;
        let placed = place(&input);
        assert_eq!(placed.height, 297.0 - 20.0);
        assert!((placed.width / placed.height - 0.5).abs() < EPS);
    }

    #[test]
    fn shrink_only_applies_to_wide_captures() {
        let narrow = place(&a4(300, 300, 1.0, FitMode::ShrinkToWidth));
        assert!((narrow.width - 300.0 / PX_PER_MM).abs() < EPS);

        let wide = place(&a4(3000, 1500, 1.0, FitMode::ShrinkToWidth));
        assert!((wide.width - 210.0).abs() < EPS);
        assert!((wide.height - 105.0).abs() < EPS);
    }

    #[test]
    fn none_mode_may_overflow() {
        let placed = place(&a4(10_000, 10_000, 1.0, FitMode::None));
        assert!(placed.width > 210.0);
        assert!(placed.height > 297.0);
    }

    #[test]
    fn zero_size_capture_gives_zero_placement() {
        for fit in [
            FitMode::None,
            FitMode::FitWidth,
            FitMode::FitHeight,
            FitMode::ShrinkToWidth,
        ] {
            let placed = place(&a4(0, 0, 2.0, fit));
            assert!(placed.is_empty());
            assert_eq!((placed.width, placed.height), (0.0, 0.0));
        }
    }

    #[test]
    fn unusable_scale_gives_zero_placement() {
        assert!(place(&a4(100, 100, 0.0, FitMode::None)).is_empty());
        assert!(place(&a4(100, 100, f32::NAN, FitMode::FitWidth)).is_empty());
    }

    #[test]
    fn margins_wider_than_page_never_go_negative() {
        let mut input = a4(100, 100, 1.0, FitMode::FitWidth);
        input.margins = Margins::uniform(200.0);
        let placed = place(&input);
        assert_eq!(placed.width, 0.0);
        assert_eq!(placed.height, 0.0);
    }

    fn one_px_per_mm(pixel_width: u32, pixel_height: u32, fit: FitMode) -> PlacementInput {
        PlacementInput {
            pixels_per_unit: 1.0,
            ..a4(pixel_width, pixel_height, 1.0, fit)
        }
    }

    #[test]
    fn rows_per_page_matches_printable_height() {
        let input = one_px_per_mm(210, 1000, FitMode::None);
        assert_eq!(rows_per_page(&input), Some(297));
    }

    #[test]
    fn rows_per_page_accounts_for_shrinking() {
        // 420 px wide shrinks by half, so a page holds twice the rows.
        let input = one_px_per_mm(420, 2000, FitMode::ShrinkToWidth);
        assert_eq!(rows_per_page(&input), Some(594));
    }

    #[test]
    fn rows_per_page_is_none_without_printable_height() {
        let mut input = one_px_per_mm(100, 100, FitMode::None);
        input.margins = Margins::uniform(150.0);
        assert_eq!(rows_per_page(&input), None);
    }
}
