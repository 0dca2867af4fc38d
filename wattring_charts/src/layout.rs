// Copyright 2025 the Wattring Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row layout and tile composition.
//!
//! A [`Row`] spreads its images horizontally with [`layout_row`]. A [`Tile`] stacks rows from
//! the top and flattens the result onto a single [`Canvas`].

extern crate alloc;

use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};
use peniko::Color;

use crate::canvas::{Canvas, DrawContext};
use crate::image::Image;

/// Horizontal position of one image in a row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement<'a> {
    /// Left edge of the image.
    pub x: f64,
    /// The placed image.
    pub image: &'a Image,
}

/// Places images left to right within `available_width`.
///
/// `None` entries are skipped. The space left after both side margins and all image widths is
/// split into `count` gaps, where `count` is the number of images rounded down to an even
/// number (at least one). With an odd number of images the first image is shifted right by
/// half a gap, which centers a single image; with an even number it starts at the margin.
///
/// ```
/// # use wattring_charts::layout_row;
/// let xs: Vec<f64> = layout_row([None::<&wattring_charts::Image>], 200.0, 10.0)
///     .iter()
///     .map(|p| p.x)
///     .collect();
/// assert!(xs.is_empty());
/// ```
pub fn layout_row<'a, I>(images: I, available_width: f64, side_margin: f64) -> Vec<Placement<'a>>
where
    I: IntoIterator<Item = Option<&'a Image>>,
{
    let images: Vec<&Image> = images.into_iter().flatten().collect();
    if images.is_empty() {
        return Vec::new();
    }

    let n = images.len();
    let widths: f64 = images.iter().map(|image| image.width()).sum();
    let leftover = available_width - 2.0 * side_margin - widths;
    let count = (n - n % 2).max(1) as f64;
    let gap = leftover / count;

    let mut x = if n % 2 == 1 {
        side_margin + gap / 2.0
    } else {
        side_margin
    };
    let mut placements = Vec::with_capacity(n);
    for (i, image) in images.into_iter().enumerate() {
        if i > 0 {
            x += gap;
        }
        placements.push(Placement { x, image });
        x += image.width();
    }
    placements
}

/// A horizontal group of images.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    images: Vec<Image>,
    available_width: f64,
    side_margin: f64,
}

impl Row {
    /// Creates an empty row.
    pub fn new(available_width: f64, side_margin: f64) -> Self {
        Self {
            images: Vec::new(),
            available_width,
            side_margin,
        }
    }

    /// Appends an image; `None` is ignored.
    pub fn push(&mut self, image: Option<Image>) {
        if let Some(image) = image {
            self.images.push(image);
        }
    }

    /// Appends an image; `None` is ignored.
    #[must_use]
    pub fn with_image(mut self, image: Option<Image>) -> Self {
        self.push(image);
        self
    }

    /// The images of this row, in order.
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Height of the tallest image, or 0 for an empty row.
    pub fn height(&self) -> f64 {
        self.images.iter().map(Image::height).fold(0.0, f64::max)
    }

    /// Horizontal placements of the images.
    pub fn layout(&self) -> Vec<Placement<'_>> {
        layout_row(
            self.images.iter().map(Some),
            self.available_width,
            self.side_margin,
        )
    }
}

/// An image at its final position in a tile.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedImage {
    /// Top-left corner in tile coordinates.
    pub origin: Point,
    /// The image.
    pub image: Image,
}

/// A laid-out row of a composed tile.
#[derive(Clone, Debug, PartialEq)]
pub struct RowPlacement {
    /// Top edge of the row.
    pub y: f64,
    /// Height of the row.
    pub height: f64,
    /// Images in row order.
    pub images: Vec<PlacedImage>,
}

/// A finished tile: the placement tree and its flattened rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct ComposedTile {
    /// Rows from top to bottom.
    pub rows: Vec<RowPlacement>,
    /// Everything drawn onto one surface.
    pub image: Image,
}

/// Vertical stack of rows on a fixed-size surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    size: Size,
    background: Option<Color>,
    top_margin: f64,
    row_spacing: f64,
    rows: Vec<Row>,
}

impl Tile {
    /// Creates an empty, transparent tile.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            background: None,
            top_margin: 0.0,
            row_spacing: 0.0,
            rows: Vec::new(),
        }
    }

    /// Fills the whole tile with `color` before drawing rows.
    #[must_use]
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Offset of the first row from the top edge.
    #[must_use]
    pub fn with_top_margin(mut self, top_margin: f64) -> Self {
        self.top_margin = top_margin;
        self
    }

    /// Vertical space between consecutive rows.
    #[must_use]
    pub fn with_row_spacing(mut self, row_spacing: f64) -> Self {
        self.row_spacing = row_spacing;
        self
    }

    /// Appends a row below the existing ones.
    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Lays out every row and draws the result.
    pub fn compose(self) -> ComposedTile {
        let mut canvas = Canvas::new(self.size);
        if let Some(background) = self.background {
            canvas.set_fill_color(background);
            canvas.fill_rect(Rect::from_origin_size(Point::ORIGIN, self.size));
        }

        let mut placed = Vec::with_capacity(self.rows.len());
        let mut y = self.top_margin;
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                y += self.row_spacing;
            }
            let height = row.height();
            let images: Vec<PlacedImage> = row
                .layout()
                .into_iter()
                .map(|p| PlacedImage {
                    origin: Point::new(p.x, y),
                    image: p.image.clone(),
                })
                .collect();
            for image in &images {
                canvas.draw_image(&image.image, image.origin);
            }
            log::trace!("row {i}: {} images at y={y}", images.len());
            placed.push(RowPlacement { y, height, images });
            y += height;
        }

        ComposedTile {
            rows: placed,
            image: canvas.into_image(),
        }
    }
}
