// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Where a conversion starts: an element handle the caller already holds, or a
// finder invoked once when the conversion begins.

use std::fmt;

use pagesnap_core::error::{PagesnapError, Result};

/// Lazily located element.
pub type Finder<E> = Box<dyn FnOnce() -> Option<E> + Send>;

/// The element a conversion captures.
pub enum Target<E> {
    /// A handle obtained beforehand; `None` when the lookup already failed.
    Element(Option<E>),
    /// Called exactly once, before anything is rasterized.
    Finder(Finder<E>),
}

impl<E> Target<E> {
    pub fn element(element: E) -> Self {
        Self::Element(Some(element))
    }

    pub fn finder(find: impl FnOnce() -> Option<E> + Send + 'static) -> Self {
        Self::Finder(Box::new(find))
    }

    /// The element, or `TargetNotFound`.
    pub fn resolve(self) -> Result<E> {
        match self {
            Self::Element(element) => element,
            Self::Finder(find) => find(),
        }
        .ok_or(PagesnapError::TargetNotFound)
    }
}

impl<E> From<Option<E>> for Target<E> {
    fn from(element: Option<E>) -> Self {
        Self::Element(element)
    }
}

impl<E: fmt::Debug> fmt::Debug for Target<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(element) => f.debug_tuple("Element").field(element).finish(),
            Self::Finder(_) => f.write_str("Finder(..)"),
        }
    }
}
