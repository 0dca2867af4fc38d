// Copyright 2025 the Wattring Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendered images.

use kurbo::Size;

use crate::canvas::DisplayList;

/// A rendered chart: its drawing surface together with its logical size.
///
/// Images are produced by a renderer and then moved into a row or a tile; they are never
/// drawn into again.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    surface: DisplayList,
    size: Size,
}

impl Image {
    pub(crate) fn new(surface: DisplayList, size: Size) -> Self {
        Self { surface, size }
    }

    /// Returns the drawing commands making up the image.
    pub fn surface(&self) -> &DisplayList {
        &self.surface
    }

    /// Returns the logical size of the image.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns the logical width of the image.
    pub fn width(&self) -> f64 {
        self.size.width
    }

    /// Returns the logical height of the image.
    pub fn height(&self) -> f64 {
        self.size.height
    }
}
