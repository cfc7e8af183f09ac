// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Render backend abstraction.
//
// A backend owns a rendered page, hands out opaque element handles, answers
// selector queries against them and rasterizes one element at a time. The
// orchestrator only ever talks to this trait.

use std::collections::BTreeMap;
use std::future::Future;

use pagesnap_core::config::PageConfig;
use pagesnap_core::error::Result;
use pagesnap_document::Capture;

/// Per-rasterization settings derived from the page configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    /// Raster pixels per CSS pixel.
    pub scale: f32,
    /// Allow cross-origin resources while rendering.
    pub use_cors: bool,
    /// Let the backend log its own progress at `info`.
    pub logging: bool,
    /// Backend-specific options, passed through untouched.
    pub overrides: BTreeMap<String, serde_json::Value>,
}

impl RenderRequest {
    pub fn from_config(config: &PageConfig) -> Self {
        Self {
            scale: config.scale(),
            use_cors: config.canvas.use_cors,
            logging: config.canvas.logging,
            overrides: config.canvas.overrides.clone(),
        }
    }

    /// A string-valued override, if present.
    pub fn override_str(&self, key: &str) -> Option<&str> {
        self.overrides.get(key).and_then(serde_json::Value::as_str)
    }
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self::from_config(&PageConfig::default())
    }
}

/// Something that can locate elements and rasterize them.
pub trait RenderBackend: Send + Sync {
    /// Opaque handle to one element of the rendered page.
    type Element: Clone + Send + Sync;

    /// First element in document order matching `selector`, if any.
    fn find(&self, selector: &str) -> Result<Option<Self::Element>>;

    /// Descendants of `root` matching `selector`, in document order.
    ///
    /// `root` itself is never part of the result. An invalid selector is a
    /// `PagesnapError::Query`.
    fn query_all(&self, root: &Self::Element, selector: &str) -> Result<Vec<Self::Element>>;

    /// Rasterize one element at `request.scale`.
    fn rasterize(
        &self,
        element: &Self::Element,
        request: &RenderRequest,
    ) -> impl Future<Output = Result<Capture>> + Send;
}
