// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Static HTML backend.
//
// Parses a document with `scraper` and lays every element out as a block box:
// children stack vertically from the parent's top-left corner, an explicit
// `width`/`height` (inline style or attribute, CSS pixels) wins, otherwise the
// box shrink-wraps its children. Rasterizing paints each visible box's
// background colour, parents first, onto a canvas filled with the
// `backgroundColor` override.
//
// No text, images or stylesheets are rendered. Element handles are indices in
// document (pre-)order, which is also the order the layout pass visits them.

use std::future::Future;
use std::path::Path;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{Blend, draw_filled_rect_mut};
use imageproc::rect::Rect;
use pagesnap_core::error::{PagesnapError, Result};
use pagesnap_document::Capture;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};

use crate::backend::{RenderBackend, RenderRequest};
use crate::style;

/// Elements that never generate a box.
const HIDDEN_TAGS: &[&str] = &[
    "head", "script", "style", "title", "meta", "link", "template", "noscript",
];

/// Largest canvas side, in raster pixels, the backend will allocate.
pub const MAX_CANVAS_SIDE: u32 = 32_767;

/// Canvas colour when no `backgroundColor` override is given.
const DEFAULT_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Handle to one element of an `HtmlBackend` document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HtmlElement {
    index: usize,
}

impl HtmlElement {
    /// Position in document order (0 is the `<html>` element).
    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct LayoutBox {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    background: Option<Rgba<u8>>,
    hidden: bool,
    /// Number of element descendants; they follow this box in `boxes`.
    descendants: usize,
}

/// Renders static HTML as stacked coloured blocks.
#[derive(Debug, Clone)]
pub struct HtmlBackend {
    source: String,
    boxes: Vec<LayoutBox>,
}

impl HtmlBackend {
    /// Parse and lay out a document. Malformed markup is repaired by the
    /// HTML parser, so this never fails.
    #[instrument(skip_all, fields(source_len = source.as_ref().len()))]
    pub fn parse(source: impl AsRef<str>) -> Self {
        let source = source.as_ref().to_owned();
        let html = Html::parse_document(&source);
        let mut boxes = Vec::new();
        layout(html.root_element(), &mut boxes);
        debug!(elements = boxes.len(), "HTML laid out");
        Self { source, boxes }
    }

    /// Read and parse an HTML file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = tokio::fs::read_to_string(path).await?;
        info!("Loaded HTML from {}", path.display());
        Ok(Self::parse(source))
    }

    /// The `<html>` element.
    pub fn root(&self) -> HtmlElement {
        HtmlElement { index: 0 }
    }

    /// Number of elements in the document.
    pub fn element_count(&self) -> usize {
        self.boxes.len()
    }

    /// Laid-out size of an element in CSS pixels.
    pub fn size_of(&self, element: &HtmlElement) -> Option<(f32, f32)> {
        self.boxes
            .get(element.index)
            .map(|layout| (layout.width, layout.height))
    }

    /// Document-order indices of every element matching `selector`.
    fn matches(&self, selector: &str) -> Result<Vec<usize>> {
        let compiled = Selector::parse(selector).map_err(|err| {
            PagesnapError::Query(format!("invalid selector {:?}: {:?}", selector, err))
        })?;
        let html = Html::parse_document(&self.source);
        let matched: Vec<_> = html.select(&compiled).map(|element| element.id()).collect();

        Ok(html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .enumerate()
            .filter(|(_, element)| matched.contains(&element.id()))
            .map(|(index, _)| index)
            .collect())
    }

    fn layout_of(&self, element: &HtmlElement) -> Result<&LayoutBox> {
        self.boxes.get(element.index).ok_or_else(|| {
            PagesnapError::Query(format!("element {} is not in this document", element.index))
        })
    }

    #[instrument(
        skip(self, request),
        fields(index = element.index, scale = request.scale, cors = request.use_cors)
    )]
    fn paint(&self, element: &HtmlElement, request: &RenderRequest) -> Result<Capture> {
        let root = self
            .boxes
            .get(element.index)
            .ok_or_else(|| PagesnapError::Rasterize(format!("unknown element {}", element.index)))?;

        let scale = request.scale;
        if !(scale.is_finite() && scale > 0.0) {
            warn!(scale, "Unusable scale, producing an empty capture");
            return Ok(Capture::empty());
        }
        if root.hidden {
            return Ok(Capture::empty());
        }

        let width = (root.width * scale).round();
        let height = (root.height * scale).round();
        if width > MAX_CANVAS_SIDE as f32 || height > MAX_CANVAS_SIDE as f32 {
            return Err(PagesnapError::Rasterize(format!(
                "canvas {}x{} exceeds the {} px limit",
                width, height, MAX_CANVAS_SIDE
            )));
        }
        let (width, height) = (width as u32, height as u32);
        if width == 0 || height == 0 {
            return Ok(Capture::empty());
        }

        let fill = background_override(request);
        let mut canvas = Blend(RgbaImage::from_pixel(width, height, fill));
        let subtree = &self.boxes[element.index..=element.index + root.descendants];
        for layout in subtree.iter().filter(|layout| !layout.hidden) {
            let Some(color) = layout.background else {
                continue;
            };
            let Some(rect) = pixel_rect(
                (layout.x - root.x) * scale,
                (layout.y - root.y) * scale,
                layout.width * scale,
                layout.height * scale,
            ) else {
                continue;
            };
            // opaque fills overwrite, translucent ones composite source-over
            if color.0[3] == 255 {
                draw_filled_rect_mut(&mut canvas.0, rect, color);
            } else {
                draw_filled_rect_mut(&mut canvas, rect, color);
            }
        }

        if request.logging {
            info!(width, height, boxes = subtree.len(), "Element rasterized");
        } else {
            debug!(width, height, boxes = subtree.len(), "Element rasterized");
        }
        Ok(Capture::new(canvas.0))
    }
}

impl RenderBackend for HtmlBackend {
    type Element = HtmlElement;

    fn find(&self, selector: &str) -> Result<Option<HtmlElement>> {
        Ok(self
            .matches(selector)?
            .first()
            .map(|&index| HtmlElement { index }))
    }

    fn query_all(&self, root: &HtmlElement, selector: &str) -> Result<Vec<HtmlElement>> {
        let layout = self.layout_of(root)?;
        let first = root.index + 1;
        let last = root.index + layout.descendants;
        Ok(self
            .matches(selector)?
            .into_iter()
            .filter(|index| (first..=last).contains(index))
            .map(|index| HtmlElement { index })
            .collect())
    }

    fn rasterize(
        &self,
        element: &HtmlElement,
        request: &RenderRequest,
    ) -> impl Future<Output = Result<Capture>> + Send {
        std::future::ready(self.paint(element, request))
    }
}

/// An element whose children are still being laid out.
struct Frame<'a> {
    element: ElementRef<'a>,
    decls: Vec<(String, String)>,
    /// Slot reserved in `boxes`, filled once the children are done.
    index: usize,
    x: f32,
    y: f32,
    hidden: bool,
    cursor: f32,
    content_width: f32,
    children: std::vec::IntoIter<ElementRef<'a>>,
}

impl<'a> Frame<'a> {
    fn open(
        element: ElementRef<'a>,
        x: f32,
        y: f32,
        hidden: bool,
        boxes: &mut Vec<LayoutBox>,
    ) -> Self {
        let index = boxes.len();
        boxes.push(LayoutBox::default());

        let node = element.value();
        let decls = node.attr("style").map(style::declarations).unwrap_or_default();
        let hidden = hidden
            || HIDDEN_TAGS.contains(&node.name())
            || style::property(&decls, "display") == Some("none");
        let children: Vec<_> = element.children().filter_map(ElementRef::wrap).collect();

        Self {
            element,
            decls,
            index,
            x,
            y,
            hidden,
            cursor: y,
            content_width: 0.0,
            children: children.into_iter(),
        }
    }

    /// Size the box from its children and store it. Returns `(width, height)`.
    fn close(self, boxes: &mut [LayoutBox]) -> (f32, f32) {
        let (width, height, background) = if self.hidden {
            (0.0, 0.0, None)
        } else {
            (
                dimension(self.element, &self.decls, "width").unwrap_or(self.content_width),
                dimension(self.element, &self.decls, "height").unwrap_or(self.cursor - self.y),
                background(self.element, &self.decls),
            )
        };

        let descendants = boxes.len() - self.index - 1;
        boxes[self.index] = LayoutBox {
            x: self.x,
            y: self.y,
            width,
            height,
            background,
            hidden: self.hidden,
            descendants,
        };
        (width, height)
    }
}

/// Lay out the tree under `root` in document order.
///
/// Children stack from their parent's top-left corner. The walk keeps its
/// own stack so nesting depth is bounded by memory, not the thread stack.
fn layout(root: ElementRef<'_>, boxes: &mut Vec<LayoutBox>) {
    let mut stack = vec![Frame::open(root, 0.0, 0.0, false, boxes)];
    while let Some(frame) = stack.last_mut() {
        let child = frame.children.next();
        match child {
            Some(child) => {
                let next = Frame::open(child, frame.x, frame.cursor, frame.hidden, boxes);
                stack.push(next);
            }
            None => {
                let Some(done) = stack.pop() else { break };
                let (width, height) = done.close(boxes);
                if let Some(parent) = stack.last_mut() {
                    parent.cursor += height;
                    parent.content_width = parent.content_width.max(width);
                }
            }
        }
    }
}

fn dimension(element: ElementRef<'_>, decls: &[(String, String)], key: &str) -> Option<f32> {
    style::property(decls, key)
        .and_then(style::parse_length)
        .or_else(|| element.value().attr(key).and_then(style::parse_length))
}

fn background(element: ElementRef<'_>, decls: &[(String, String)]) -> Option<Rgba<u8>> {
    if let Some(value) = style::property(decls, "background-color") {
        return style::parse_color(value);
    }
    if let Some(value) = style::property(decls, "background") {
        return value.split_whitespace().find_map(style::parse_color);
    }
    element.value().attr("bgcolor").and_then(style::parse_color)
}

/// Canvas fill: `null` means transparent, an unparsable colour falls back to white.
fn background_override(request: &RenderRequest) -> Rgba<u8> {
    match request.overrides.get("backgroundColor") {
        Some(serde_json::Value::Null) => Rgba([0, 0, 0, 0]),
        Some(serde_json::Value::String(value)) => style::parse_color(value).unwrap_or_else(|| {
            warn!(value = %value, "Unrecognised backgroundColor override");
            DEFAULT_BACKGROUND
        }),
        _ => DEFAULT_BACKGROUND,
    }
}

/// Pixel rectangle covered by a box, or `None` when it rounds to nothing.
fn pixel_rect(left: f32, top: f32, width: f32, height: f32) -> Option<Rect> {
    let (x0, y0) = (left.round(), top.round());
    let (x1, y1) = ((left + width).round(), (top + height).round());
    let (w, h) = (x1 - x0, y1 - y0);
    if w < 1.0 || h < 1.0 {
        return None;
    }
    Some(Rect::at(x0 as i32, y0 as i32).of_size(w as u32, h as u32))
}
