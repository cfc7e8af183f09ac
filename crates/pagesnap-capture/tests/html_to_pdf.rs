// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end: static HTML in, PDF file out, read back with lopdf.

use pagesnap_capture::{Delivery, HtmlBackend, RenderBackend, SystemViewer, Target, generate};
use pagesnap_core::config::{ConvertConfig, Options};
use pagesnap_core::error::PagesnapError;
use pagesnap_core::types::OutputMethod;
use pagesnap_document::PdfReader;

const REPORT: &str = r#"<!doctype html>
<html>
  <head><title>Quarterly report</title></head>
  <body>
    <main id="report">
      <section class="page" style="width: 794px; height: 1123px; background-color: #fafafa">
        <div style="height: 120px; background-color: #1f3a93"></div>
      </section>
      <section class="page" style="width: 794px; height: 1123px; background-color: #ffffff">
        <div style="height: 400px; background-color: #e74c3c"></div>
      </section>
      <section class="page" style="width: 794px; height: 600px; background-color: #ffffff"></section>
    </main>
  </body>
</html>"#;

fn options(json: &str) -> ConvertConfig {
    let options: Options = serde_json::from_str(json).expect("valid options");
    ConvertConfig::from_options(Some(&options))
}

#[tokio::test]
async fn by_page_report_becomes_three_a4_pages() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    let mut config = options(
        r#"{ "resolution": 1, "render": { "type": "by_page", "pageSelector": ".page" } }"#,
    );
    config.filename = Some(path.display().to_string());

    let backend = HtmlBackend::parse(REPORT);
    let target = Target::from(backend.find("#report").unwrap());
    let delivery = generate(&backend, target, &config, &SystemViewer)
        .await
        .unwrap();

    assert!(matches!(delivery, Delivery::Saved(_)));
    let reader = PdfReader::open(&path).unwrap();
    assert_eq!(reader.page_count(), 3);
    for (width, height) in reader.page_sizes_mm().unwrap() {
        assert!((width - 210.0).abs() < 0.5);
        assert!((height - 297.0).abs() < 0.5);
    }
}

#[tokio::test]
async fn whole_body_is_one_page_unless_paginated() {
    let backend = HtmlBackend::parse(REPORT);

    let clipped = options(r#"{ "method": "build", "resolution": 1 }"#);
    let target = Target::from(backend.find("body").unwrap());
    let document = generate(&backend, target, &clipped, &SystemViewer)
        .await
        .unwrap()
        .into_document()
        .unwrap();
    assert_eq!(document.page_count(), 1);

    // 2846 CSS px tall at natural size is a little over 2.5 A4 pages.
    let paginated = options(
        r#"{ "method": "build", "resolution": 1, "page": { "overflow": "paginate" } }"#,
    );
    let target = Target::from(backend.find("body").unwrap());
    let document = generate(&backend, target, &paginated, &SystemViewer)
        .await
        .unwrap()
        .into_document()
        .unwrap();
    assert_eq!(document.page_count(), 3);
}

#[tokio::test]
async fn embedded_image_matches_the_rendered_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("card.pdf");
    // default resolution renders at three raster pixels per CSS pixel
    let mut config = ConvertConfig::default();
    config.filename = Some(path.display().to_string());

    let backend = HtmlBackend::parse(
        r#"<div id="card" style="width: 400px; height: 300px; background: #336699"></div>"#,
    );
    let target = Target::from(backend.find("#card").unwrap());
    generate(&backend, target, &config, &SystemViewer)
        .await
        .unwrap();

    let images = PdfReader::open(&path).unwrap().images().unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!((images[0].width, images[0].height), (1200, 900));
    assert_eq!(images[0].filters, vec!["FlateDecode".to_string()]);
}

#[tokio::test]
async fn unknown_target_is_reported_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never.pdf");
    let mut config = ConvertConfig::default();
    config.method = OutputMethod::Save;
    config.filename = Some(path.display().to_string());

    let backend = HtmlBackend::parse(REPORT);
    let target = Target::from(backend.find("#does-not-exist").unwrap());
    let err = generate(&backend, target, &config, &SystemViewer)
        .await
        .unwrap_err();

    assert!(matches!(err, PagesnapError::TargetNotFound));
    assert!(!path.exists());
}
