// Copyright 2025 the Wattring Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A [`DrawContext`] that writes SVG markup.

use std::fmt::Write as _;

use kurbo::{Rect, Size};
use peniko::Color;
use wattring_charts::{DrawContext, TextAlignment, text_origin};
use wattring_text::{Font, HeuristicTextMeasurer, TextMeasurer};

#[derive(Debug)]
pub(crate) struct SvgCanvas {
    size: Size,
    scale: f64,
    stroke_color: Color,
    fill_color: Color,
    line_width: f64,
    font: Font,
    text_color: Color,
    measurer: HeuristicTextMeasurer,
    body: String,
}

impl SvgCanvas {
    /// `size` is logical; the document is `scale` times larger in device pixels.
    pub(crate) fn new(size: Size, scale: f64) -> Self {
        Self {
            size,
            scale,
            stroke_color: Color::BLACK,
            fill_color: Color::BLACK,
            line_width: 1.0,
            font: Font::default(),
            text_color: Color::BLACK,
            measurer: HeuristicTextMeasurer,
            body: String::new(),
        }
    }

    pub(crate) fn finish(self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" width="{}" height="{}">"#,
            self.size.width,
            self.size.height,
            self.size.width * self.scale,
            self.size.height * self.scale,
        );
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out
    }

    fn ellipse(&mut self, rect: Rect) {
        let center = rect.center();
        let _ = write!(
            self.body,
            r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}""#,
            center.x,
            center.y,
            rect.width() / 2.0,
            rect.height() / 2.0,
        );
    }
}

impl DrawContext for SvgCanvas {
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
        self.ellipse(rect);
        self.body.push_str(r#" fill="none""#);
        write_paint_attr(&mut self.body, "stroke", self.stroke_color);
        let _ = writeln!(self.body, r#" stroke-width="{}"/>"#, self.line_width);
    }

    fn fill_ellipse(&mut self, rect: Rect) {
        self.ellipse(rect);
        write_paint_attr(&mut self.body, "fill", self.fill_color);
        self.body.push_str("/>\n");
    }

    fn fill_rect(&mut self, rect: Rect) {
        let rect = rect.abs();
        let _ = write!(
            self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}""#,
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height(),
        );
        write_paint_attr(&mut self.body, "fill", self.fill_color);
        self.body.push_str("/>\n");
    }

    fn set_font(&mut self, font: Font) {
        self.font = font;
    }

    fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
    }

    fn draw_text_in_rect(&mut self, text: &str, rect: Rect, alignment: TextAlignment) {
        let metrics = self.measurer.measure(text, &self.font);
        let origin = text_origin(rect, alignment, metrics.advance_width);
        let _ = write!(
            self.body,
            r#"<text x="{}" y="{}" font-family="{}" font-size="{}" font-weight="{}" font-style="{}""#,
            origin.x,
            origin.y + metrics.ascent,
            escape_xml(self.font.family.as_css_family()),
            self.font.size,
            self.font.weight.0,
            self.font.style.as_css(),
        );
        write_paint_attr(&mut self.body, "fill", self.text_color);
        let _ = writeln!(self.body, ">{}</text>", escape_xml(text));
    }
}

fn write_paint_attr(out: &mut String, name: &str, color: Color) {
    let rgba = color.to_rgba8();
    let _ = write!(out, r##" {name}="#{:02x}{:02x}{:02x}""##, rgba.r, rgba.g, rgba.b);
    if rgba.a != 255 {
        let _ = write!(out, r#" {name}-opacity="{}""#, f64::from(rgba.a) / 255.0);
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
