// Copyright 2025 the Wattring Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font descriptors and text measurement for chart labels.
//!
//! Chart renderers only ever place a single short label (a total such as `12.4` or a
//! percentage) inside a known rectangle. They describe the label with a [`Font`] and leave
//! glyph shaping to whichever drawing surface finally encodes the image. Surfaces that need
//! to center text ask a [`TextMeasurer`] for the advance width.
//!
//! This crate is `no_std` and only needs `alloc` for owned family names.

#![no_std]

extern crate alloc;

use alloc::sync::Arc;

/// A font descriptor: family, size and weight.
///
/// Sizes are in the logical coordinate system of the chart, never device pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    /// The preferred font family.
    pub family: FontFamily,
    /// Font size in logical units.
    pub size: f64,
    /// Font weight (e.g. `400` for normal, `700` for bold).
    pub weight: FontWeight,
    /// Font style (normal/italic/oblique).
    pub style: FontStyle,
}

impl Font {
    /// Creates a system UI font of normal weight at the given size.
    #[must_use]
    pub fn new(size: f64) -> Self {
        Self {
            family: FontFamily::System,
            size,
            weight: FontWeight::NORMAL,
            style: FontStyle::Normal,
        }
    }

    /// The platform UI font at the given size.
    #[must_use]
    pub fn system(size: f64) -> Self {
        Self::new(size)
    }

    /// Sets the font family.
    #[must_use]
    pub fn with_family(mut self, family: FontFamily) -> Self {
        self.family = family;
        self
    }

    /// Sets the font weight.
    #[must_use]
    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the font style.
    #[must_use]
    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new(12.0)
    }
}

/// Font family selection.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FontFamily {
    /// The platform UI font (`system-ui`, falling back to sans-serif).
    System,
    /// A generic sans-serif family (CSS `sans-serif`).
    SansSerif,
    /// A generic monospace family (CSS `monospace`).
    Monospace,
    /// A named family (e.g. `"SF Pro"`, `"Inter"`).
    Named(Arc<str>),
}

impl FontFamily {
    /// Returns the family list for CSS-style font declarations.
    #[must_use]
    pub fn as_css_family(&self) -> &str {
        match self {
            Self::System => "system-ui, sans-serif",
            Self::SansSerif => "sans-serif",
            Self::Monospace => "monospace",
            Self::Named(name) => name,
        }
    }
}

/// CSS-style font weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// Normal weight (`400`).
    pub const NORMAL: Self = Self(400);
    /// Bold weight (`700`).
    pub const BOLD: Self = Self(700);
}

/// CSS-style font styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontStyle {
    /// Normal style.
    Normal,
    /// Italic style.
    Italic,
    /// Oblique style.
    Oblique,
}

impl FontStyle {
    /// Returns the CSS keyword for this style.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Italic => "italic",
            Self::Oblique => "oblique",
        }
    }
}

/// Measured metrics for a single line of text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextMetrics {
    /// The advance width (used for horizontal centering).
    pub advance_width: f64,
    /// Distance from baseline to the top of typical glyphs.
    pub ascent: f64,
    /// Distance from baseline to the bottom of typical glyphs.
    pub descent: f64,
}

impl TextMetrics {
    /// Returns `ascent + descent`.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.ascent + self.descent
    }
}

/// Measures single-line text for a drawing surface.
///
/// Implementations can be heuristic, backed by a shaping engine, or by a platform text API.
pub trait TextMeasurer {
    /// Measure `text` as a single line set in `font`.
    fn measure(&self, text: &str, font: &Font) -> TextMetrics;
}

/// A heuristic text measurer for surfaces without font metrics.
///
/// Digits and most Latin glyphs in UI fonts average a little over half an em, so it assumes
/// ~0.6em per glyph, with the baseline at ~0.8em.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicTextMeasurer;

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure(&self, text: &str, font: &Font) -> TextMetrics {
        let advance_width = 0.6 * font.size * text.chars().count() as f64;
        TextMetrics {
            advance_width,
            ascent: 0.8 * font.size,
            descent: 0.2 * font.size,
        }
    }
}
