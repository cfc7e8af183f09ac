// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Headless Chrome backend (feature `chrome`).
//
// Launches a headless browser through `headless_chrome`, loads one URL into a
// single tab and rasterizes elements with a clipped screenshot of their border
// box. Element handles are selector paths re-resolved on every use, so they
// stay `Send` and survive across the blocking worker threads.

use std::future::Future;
use std::sync::Arc;

use headless_chrome::browser::tab::{Element, Tab};
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use pagesnap_core::error::{PagesnapError, Result};
use pagesnap_document::Capture;
use tracing::{debug, info, instrument};

use crate::backend::{RenderBackend, RenderRequest};

/// One step of a selector path: the `nth` match of `selector` below the
/// previous step.
type Step = (String, usize);

/// Handle to an element of the page loaded in a `ChromeBackend`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromeElement {
    path: Vec<Step>,
}

impl ChromeElement {
    fn child(&self, selector: &str, nth: usize) -> Self {
        let mut path = self.path.clone();
        path.push((selector.to_string(), nth));
        Self { path }
    }
}

/// Renders through a real browser.
pub struct ChromeBackend {
    // Keeps the browser process alive for as long as the tab is used.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeBackend {
    /// Launch headless Chrome and navigate to `url` (`file://`, `http(s)://`).
    #[instrument]
    pub fn launch(url: &str) -> Result<Self> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .map_err(|err| PagesnapError::Rasterize(format!("bad launch options: {}", err)))?;
        let browser = Browser::new(options)
            .map_err(|err| PagesnapError::Rasterize(format!("failed to launch Chrome: {}", err)))?;
        let tab = browser
            .new_tab()
            .map_err(|err| PagesnapError::Rasterize(format!("failed to open tab: {}", err)))?;

        tab.navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|err| {
                PagesnapError::Rasterize(format!("navigation to {} failed: {}", url, err))
            })?;

        info!(url, "Page loaded in headless Chrome");
        Ok(Self {
            _browser: browser,
            tab,
        })
    }
}

/// Walk a selector path from the document.
///
/// `Ok(None)` when any step no longer matches.
fn resolve<'a>(tab: &'a Tab, path: &[Step]) -> Result<Option<Element<'a>>> {
    let Some(((first, nth), rest)) = path.split_first() else {
        return Ok(None);
    };
    let mut current = match tab.find_elements(first) {
        Ok(found) => found.into_iter().nth(*nth),
        Err(err) => {
            debug!(selector = %first, error = %err, "Selector matched nothing");
            None
        }
    };
    for (selector, nth) in rest {
        let Some(element) = current else {
            return Ok(None);
        };
        current = match element.find_elements(selector) {
            Ok(found) => found.into_iter().nth(*nth),
            Err(err) => {
                debug!(selector = %selector, error = %err, "Selector matched nothing");
                None
            }
        };
    }
    Ok(current)
}

fn screenshot(tab: &Tab, path: &[Step], scale: f32) -> Result<Capture> {
    let element = resolve(tab, path)?
        .ok_or_else(|| PagesnapError::Rasterize("element is no longer in the page".into()))?;
    element
        .scroll_into_view()
        .map_err(|err| PagesnapError::Rasterize(format!("scroll failed: {}", err)))?;

    let mut clip = element
        .get_box_model()
        .map_err(|err| PagesnapError::Rasterize(format!("no box model: {}", err)))?
        .border_viewport();
    clip.scale = scale as f64;

    let png = tab
        .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, Some(clip), true)
        .map_err(|err| PagesnapError::Rasterize(format!("screenshot failed: {}", err)))?;
    Capture::from_bytes(&png)
}

impl RenderBackend for ChromeBackend {
    type Element = ChromeElement;

    fn find(&self, selector: &str) -> Result<Option<ChromeElement>> {
        let element = ChromeElement {
            path: vec![(selector.to_string(), 0)],
        };
        Ok(resolve(&self.tab, &element.path)?.map(|_| element))
    }

    fn query_all(&self, root: &ChromeElement, selector: &str) -> Result<Vec<ChromeElement>> {
        let Some(parent) = resolve(&self.tab, &root.path)? else {
            return Err(PagesnapError::Query("root element is no longer in the page".into()));
        };
        // querySelectorAll on an element only matches its descendants.
        let count = match parent.find_elements(selector) {
            Ok(found) => found.len(),
            Err(err) => {
                debug!(selector, error = %err, "Selector matched nothing");
                0
            }
        };
        Ok((0..count).map(|nth| root.child(selector, nth)).collect())
    }

    fn rasterize(
        &self,
        element: &ChromeElement,
        request: &RenderRequest,
    ) -> impl Future<Output = Result<Capture>> + Send {
        let tab = Arc::clone(&self.tab);
        let path = element.path.clone();
        let scale = request.scale;
        let logging = request.logging;

        async move {
            let capture = tokio::task::spawn_blocking(move || screenshot(&tab, &path, scale))
                .await
                .map_err(|err| {
                    PagesnapError::Rasterize(format!("screenshot task failed: {}", err))
                })??;
            if logging {
                info!(width = capture.width(), height = capture.height(), "Element captured");
            }
            Ok(capture)
        }
    }
}
