// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pagesnap.

use thiserror::Error;

/// Top-level error type for all Pagesnap operations.
#[derive(Debug, Error)]
pub enum PagesnapError {
    // -- Target resolution --
    #[error("unable to get the target element")]
    TargetNotFound,

    #[error("element query failed: {0}")]
    Query(String),

    // -- Rendering --
    #[error("rasterization failed: {0}")]
    Rasterize(String),

    // -- Document errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Output --
    #[error("could not open viewer: {0}")]
    Viewer(String),

    #[error("not available in this build: {0}")]
    Unavailable(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PagesnapError>;
