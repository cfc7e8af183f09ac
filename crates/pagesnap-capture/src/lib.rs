// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagesnap-capture: From a rendered element to a delivered PDF.
//
// Render backends locate and rasterize elements; the orchestrator turns the
// captures into pages; output delivery builds, opens or saves the result.

pub mod backend;
#[cfg(feature = "chrome")]
pub mod chrome;
pub mod html;
pub mod orchestrator;
pub mod output;
mod style;
pub mod target;

pub use backend::{RenderBackend, RenderRequest};
#[cfg(feature = "chrome")]
pub use chrome::{ChromeBackend, ChromeElement};
pub use html::{HtmlBackend, HtmlElement};
pub use orchestrator::{capture_document, generate, regions};
pub use output::{Delivery, SystemViewer, Viewer, deliver};
pub use target::Target;
