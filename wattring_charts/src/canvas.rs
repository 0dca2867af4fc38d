// Copyright 2025 the Wattring Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing surface that all renderers target.
//!
//! [`DrawContext`] is a deliberately small, stateful 2D capability: colors and line width are
//! set first, then shapes are drawn with them. It has no paths and no arc primitive, so
//! renderers express everything with ellipses, rectangles and aligned text. Any backend that
//! can do those three things can host the charts.
//!
//! [`Canvas`] is the in-memory implementation. It records every call as a resolved
//! [`DrawCommand`] (state already applied), which makes images cheap to compose into tiles and
//! easy to inspect in tests. Export backends receive the commands through
//! [`DisplayList::replay`].

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;
use wattring_text::Font;

use crate::image::Image;

/// Distance between the top of a text rect and the top of the text itself.
pub const TEXT_TOP_INSET: f64 = 3.0;

/// Horizontal placement of text inside its rect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlignment {
    /// Text starts at the left edge of the rect.
    #[default]
    Left,
    /// Text is centered on the rect using its measured advance width.
    Center,
}

/// A minimal stateful 2D drawing capability.
///
/// All coordinates are logical units. Implementations apply any device scale themselves.
pub trait DrawContext {
    /// Sets the color used by [`DrawContext::stroke_ellipse`].
    fn set_stroke_color(&mut self, color: Color);
    /// Sets the color used by [`DrawContext::fill_ellipse`] and [`DrawContext::fill_rect`].
    fn set_fill_color(&mut self, color: Color);
    /// Sets the stroke width used by [`DrawContext::stroke_ellipse`].
    fn set_line_width(&mut self, width: f64);
    /// Strokes the ellipse inscribed in `rect`.
    fn stroke_ellipse(&mut self, rect: Rect);
    /// Fills the ellipse inscribed in `rect`.
    fn fill_ellipse(&mut self, rect: Rect);
    /// Fills `rect`.
    fn fill_rect(&mut self, rect: Rect);
    /// Sets the font used by [`DrawContext::draw_text_in_rect`].
    fn set_font(&mut self, font: Font);
    /// Sets the color used by [`DrawContext::draw_text_in_rect`].
    fn set_text_color(&mut self, color: Color);
    /// Draws a single line of text inside `rect`.
    ///
    /// Placement follows [`text_origin`].
    fn draw_text_in_rect(&mut self, text: &str, rect: Rect, alignment: TextAlignment);
}

/// Returns the top-left point at which text of the given advance width is drawn.
///
/// Centered text is offset by half the horizontal slack of `rect`; all text sits
/// [`TEXT_TOP_INSET`] below the top of `rect`.
pub fn text_origin(rect: Rect, alignment: TextAlignment, advance_width: f64) -> Point {
    let x = match alignment {
        TextAlignment::Left => rect.x0,
        TextAlignment::Center => rect.x0 + (rect.width() - advance_width) / 2.0,
    };
    Point::new(x, rect.y0 + TEXT_TOP_INSET)
}

/// One recorded drawing operation, with the drawing state it was issued under.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// A stroked ellipse.
    StrokeEllipse {
        /// Bounding rect of the ellipse.
        rect: Rect,
        /// Stroke color.
        color: Color,
        /// Stroke width.
        line_width: f64,
    },
    /// A filled ellipse.
    FillEllipse {
        /// Bounding rect of the ellipse.
        rect: Rect,
        /// Fill color.
        color: Color,
    },
    /// A filled rectangle.
    FillRect {
        /// The rectangle.
        rect: Rect,
        /// Fill color.
        color: Color,
    },
    /// A single line of text.
    Text {
        /// Text content.
        text: String,
        /// Rect the text is placed in.
        rect: Rect,
        /// Horizontal alignment within `rect`.
        alignment: TextAlignment,
        /// Font.
        font: Font,
        /// Text color.
        color: Color,
    },
}

impl DrawCommand {
    /// Returns this command moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        let mut out = self.clone();
        match &mut out {
            Self::StrokeEllipse { rect, .. }
            | Self::FillEllipse { rect, .. }
            | Self::FillRect { rect, .. }
            | Self::Text { rect, .. } => *rect = *rect + offset,
        }
        out
    }
}

/// An ordered list of drawing commands: the rendered content of an [`Image`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    /// Returns the recorded commands in drawing order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Returns the number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing was drawn.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Re-issues every command on `ctx`, moved by `offset`.
    ///
    /// State setters are issued before each shape, so `ctx` ends up with the state of the
    /// last command.
    pub fn replay<C: DrawContext + ?Sized>(&self, ctx: &mut C, offset: Vec2) {
        for command in &self.commands {
            match command.translated(offset) {
                DrawCommand::StrokeEllipse {
                    rect,
                    color,
                    line_width,
                } => {
                    ctx.set_stroke_color(color);
                    ctx.set_line_width(line_width);
                    ctx.stroke_ellipse(rect);
                }
                DrawCommand::FillEllipse { rect, color } => {
                    ctx.set_fill_color(color);
                    ctx.fill_ellipse(rect);
                }
                DrawCommand::FillRect { rect, color } => {
                    ctx.set_fill_color(color);
                    ctx.fill_rect(rect);
                }
                DrawCommand::Text {
                    text,
                    rect,
                    alignment,
                    font,
                    color,
                } => {
                    ctx.set_font(font);
                    ctx.set_text_color(color);
                    ctx.draw_text_in_rect(&text, rect, alignment);
                }
            }
        }
    }
}

/// A recording drawing surface of a fixed logical size.
///
/// The canvas owns its display list until [`Canvas::into_image`] hands it off.
#[derive(Clone, Debug)]
pub struct Canvas {
    size: Size,
    stroke_color: Color,
    fill_color: Color,
    line_width: f64,
    font: Font,
    text_color: Color,
    list: DisplayList,
}

impl Canvas {
    /// Creates an empty, transparent canvas.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            stroke_color: Color::BLACK,
            fill_color: Color::BLACK,
            line_width: 1.0,
            font: Font::default(),
            text_color: Color::BLACK,
            list: DisplayList::default(),
        }
    }

    /// Returns the logical size of the canvas.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns what has been drawn so far.
    pub fn display_list(&self) -> &DisplayList {
        &self.list
    }

    /// Draws another image with its top-left corner at `origin`.
    pub fn draw_image(&mut self, image: &Image, origin: Point) {
        let offset = origin.to_vec2();
        self.list.commands.extend(
            image
                .surface()
                .commands()
                .iter()
                .map(|c| c.translated(offset)),
        );
    }

    /// Finishes drawing and returns the result as an image.
    pub fn into_image(self) -> Image {
        Image::new(self.list, self.size)
    }
}

impl DrawContext for Canvas {
    fn set_stroke_color(&mut self, color: Color) {
        self.stroke_color = color;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn stroke_ellipse(&mut self, rect: Rect) {
        self.list.commands.push(DrawCommand::StrokeEllipse {
            rect,
            color: self.stroke_color,
            line_width: self.line_width,
        });
    }

    fn fill_ellipse(&mut self, rect: Rect) {
        self.list.commands.push(DrawCommand::FillEllipse {
            rect,
            color: self.fill_color,
        });
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.list.commands.push(DrawCommand::FillRect {
            rect,
            color: self.fill_color,
        });
    }

    fn set_font(&mut self, font: Font) {
        self.font = font;
    }

    fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
    }

    fn draw_text_in_rect(&mut self, text: &str, rect: Rect, alignment: TextAlignment) {
        self.list.commands.push(DrawCommand::Text {
            text: String::from(text),
            rect,
            alignment,
            font: self.font.clone(),
            color: self.text_color,
        });
    }
}
