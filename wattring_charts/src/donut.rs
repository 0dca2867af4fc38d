// Copyright 2025 the Wattring Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Donut (ring) charts with proportional, stacked segments.
//!
//! Segments are laid end to end clockwise from 12 o'clock, each covering
//! `value / max_value` of the ring. [`DrawContext`] has no arc primitive, so a partial arc is
//! stamped as a run of small disks along the circumference, four per percent of the circle.
//! A segment spanning the whole ring is stroked as a single ellipse instead, which gives a
//! seamless ring.

extern crate alloc;

use alloc::string::String;

use kurbo::{Point, Rect, Size};
use peniko::Color;
use smallvec::SmallVec;
use wattring_text::Font;

use crate::canvas::{Canvas, DrawContext, TextAlignment};
use crate::error::{ChartError, positive_max};
#[cfg(not(feature = "std"))]
use crate::float::FloatExt;
use crate::image::Image;

/// Disks stamped per percentage point of the circle.
pub const ARC_STEPS_PER_PERCENT: f64 = 4.0;

/// Height of the label rect as a multiple of the font size.
pub const TEXT_LINE_HEIGHT: f64 = 1.2;

/// Ring geometry and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DonutCircle {
    /// Center of the ring.
    pub center: Point,
    /// Radius of the ring's center line.
    pub radius: f64,
    /// Thickness of the ring.
    pub line_width: f64,
    /// The value that fills the whole ring. Must be positive.
    pub max_value: f64,
    /// Optional color of the full-circle track drawn beneath the segments.
    pub track_color: Option<Color>,
}

impl DonutCircle {
    /// Creates a ring without a track.
    pub fn new(center: Point, radius: f64, line_width: f64, max_value: f64) -> Self {
        Self {
            center,
            radius,
            line_width,
            max_value,
            track_color: None,
        }
    }

    /// Sets the track color.
    pub fn with_track_color(mut self, color: Color) -> Self {
        self.track_color = Some(color);
        self
    }

    /// The square the ring's center line is inscribed in.
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.center, (2.0 * self.radius, 2.0 * self.radius))
    }
}

/// One proportional slice of the ring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DonutSegment {
    /// Value of the slice, in the same unit as [`DonutCircle::max_value`].
    pub value: f64,
    /// Slice color.
    pub color: Color,
}

/// Label drawn in the middle of the ring.
#[derive(Clone, Debug, PartialEq)]
pub struct DonutText {
    /// Label content.
    pub text: String,
    /// Label font.
    pub font: Font,
    /// Label color.
    pub color: Color,
}

/// A complete donut chart description.
///
/// The sum of segment values is expected not to exceed `circle.max_value`; anything beyond
/// the full circle is not drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct DonutSpec {
    /// Ring geometry and scale.
    pub circle: DonutCircle,
    /// Segments in clockwise order.
    pub segments: SmallVec<[DonutSegment; 4]>,
    /// Optional centered label.
    pub text: Option<DonutText>,
}

impl DonutSpec {
    /// Creates a spec with no segments and no label.
    pub fn new(circle: DonutCircle) -> Self {
        Self {
            circle,
            segments: SmallVec::new(),
            text: None,
        }
    }

    /// Appends a segment.
    pub fn with_segment(mut self, value: f64, color: Color) -> Self {
        self.segments.push(DonutSegment { value, color });
        self
    }

    /// Sets the centered label.
    pub fn with_text(mut self, text: impl Into<String>, font: Font, color: Color) -> Self {
        self.text = Some(DonutText {
            text: text.into(),
            font,
            color,
        });
        self
    }

    /// Sum of all segment values.
    pub fn total(&self) -> f64 {
        self.segments.iter().map(|s| s.value).sum()
    }
}

/// Draws `spec` onto `ctx`.
///
/// Fails if `spec.circle.max_value` is not a positive, finite number.
pub fn draw_donut<C: DrawContext + ?Sized>(ctx: &mut C, spec: &DonutSpec) -> Result<(), ChartError> {
    let circle = &spec.circle;
    positive_max(circle.max_value)?;

    if let Some(track) = circle.track_color {
        draw_arc(ctx, circle, 0.0, circle.max_value, track);
    }

    let mut base = 0.0;
    for segment in &spec.segments {
        draw_arc(ctx, circle, base, base + segment.value, segment.color);
        base += segment.value;
    }

    // Stamping leaves a ragged edge where one segment meets the next; cover each internal
    // seam with one disk of the earlier segment. The open end of the last segment is left.
    let mut base = 0.0;
    for segment in spec.segments.iter().take(spec.segments.len().saturating_sub(1)) {
        base += segment.value;
        draw_arc(ctx, circle, base, base, segment.color);
    }

    if let Some(text) = &spec.text {
        let height = text.font.size * TEXT_LINE_HEIGHT;
        let bounds = circle.bounds();
        let rect = Rect::new(
            bounds.x0,
            circle.center.y - height / 2.0,
            bounds.x1,
            circle.center.y + height / 2.0,
        );
        ctx.set_font(text.font.clone());
        ctx.set_text_color(text.color);
        ctx.draw_text_in_rect(&text.text, rect, TextAlignment::Center);
    }

    Ok(())
}

/// Renders `spec` onto a fresh transparent surface of `size`.
pub fn image_with_donut(size: Size, spec: &DonutSpec) -> Result<Image, ChartError> {
    let mut canvas = Canvas::new(size);
    draw_donut(&mut canvas, spec)?;
    Ok(canvas.into_image())
}

/// Draws the part of the ring between two values.
fn draw_arc<C: DrawContext + ?Sized>(
    ctx: &mut C,
    circle: &DonutCircle,
    start_value: f64,
    end_value: f64,
    color: Color,
) {
    ctx.set_stroke_color(color);
    ctx.set_fill_color(color);
    ctx.set_line_width(circle.line_width);

    if start_value == 0.0 && end_value == circle.max_value {
        ctx.stroke_ellipse(circle.bounds());
        return;
    }

    let start = start_value / circle.max_value * 100.0;
    let end = end_value / circle.max_value * 100.0;
    let last = end.min(100.0) * ARC_STEPS_PER_PERCENT;
    let half = circle.line_width / 2.0;

    let mut step = start.max(0.0) * ARC_STEPS_PER_PERCENT;
    while step <= last {
        let angle = step / (ARC_STEPS_PER_PERCENT * 50.0) * core::f64::consts::PI;
        let x = circle.center.x + angle.sin() * circle.radius;
        let y = circle.center.y - angle.cos() * circle.radius;
        ctx.fill_ellipse(Rect::new(x - half, y - half, x + half, y + half));
        step += 1.0;
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use peniko::color::palette::css;

    use super::*;
    use crate::canvas::DrawCommand;

    fn circle(max_value: f64) -> DonutCircle {
        DonutCircle::new(Point::new(70.0, 70.0), 63.0, 13.0, max_value)
    }

    fn render(spec: &DonutSpec) -> Vec<DrawCommand> {
        let image = image_with_donut(Size::new(140.0, 140.0), spec).expect("valid spec");
        image.surface().commands().to_vec()
    }

    fn dots(commands: &[DrawCommand]) -> Vec<(Point, Color)> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillEllipse { rect, color } => Some((rect.center(), *color)),
                _ => None,
            })
            .collect()
    }

    fn assert_near(a: Point, b: Point) {
        assert!((a - b).hypot() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn single_full_segment_takes_the_ring_branch() {
        let spec = DonutSpec::new(circle(25.0)).with_segment(25.0, css::LIME);
        let commands = render(&spec);
        assert_eq!(
            commands,
            [DrawCommand::StrokeEllipse {
                rect: Rect::new(7.0, 7.0, 133.0, 133.0),
                color: css::LIME,
                line_width: 13.0,
            }]
        );
    }

    #[test]
    fn track_is_drawn_first_as_a_full_ring() {
        let track = Color::from_rgba8(0x44, 0x44, 0x44, 0x80);
        let spec = DonutSpec::new(circle(100.0).with_track_color(track)).with_segment(10.0, css::RED);
        let commands = render(&spec);
        let DrawCommand::StrokeEllipse { color, .. } = &commands[0] else {
            panic!("expected the track first, got {:?}", commands[0]);
        };
        assert_eq!(*color, track);
        assert!(
            commands[1..]
                .iter()
                .all(|c| matches!(c, DrawCommand::FillEllipse { .. })),
            "segment must be stamped"
        );
    }

    #[test]
    fn partial_arc_runs_clockwise_from_the_top() {
        let spec = DonutSpec::new(circle(100.0)).with_segment(25.0, css::RED);
        let dots = dots(&render(&spec));

        // 0..=25% at four disks per percent.
        assert_eq!(dots.len(), 101);
        assert_near(dots[0].0, Point::new(70.0, 7.0));
        assert_near(dots[100].0, Point::new(133.0, 70.0));
        assert!(dots[50].0.x > 70.0 && dots[50].0.y < 70.0, "{:?}", dots[50]);
    }

    #[test]
    fn disks_have_the_ring_thickness() {
        let spec = DonutSpec::new(circle(100.0)).with_segment(1.0, css::RED);
        for c in render(&spec) {
            let DrawCommand::FillEllipse { rect, .. } = c else {
                panic!("unexpected {c:?}");
            };
            assert!((rect.width() - 13.0).abs() < 1e-9);
            assert!((rect.height() - 13.0).abs() < 1e-9);
        }
    }

    #[test]
    fn internal_seams_are_covered_with_the_earlier_color() {
        let spec = DonutSpec::new(circle(100.0))
            .with_segment(30.0, css::RED)
            .with_segment(20.0, css::BLUE);
        let dots = dots(&render(&spec));

        // red 0..=120, blue 120..=200, then one seam disk at 120.
        assert_eq!(dots.len(), 121 + 81 + 1);
        let (seam, color) = dots[dots.len() - 1];
        assert_eq!(color, css::RED);
        assert_near(seam, dots[120].0);
        assert_eq!(dots[121].1, css::BLUE);
    }

    #[test]
    fn no_seam_after_the_last_segment() {
        let spec = DonutSpec::new(circle(100.0))
            .with_segment(10.0, css::RED)
            .with_segment(10.0, css::BLUE)
            .with_segment(10.0, css::LIME);
        let dots = dots(&render(&spec));
        let seams = &dots[dots.len() - 2..];
        assert_eq!(seams[0].1, css::RED);
        assert_eq!(seams[1].1, css::BLUE);
        assert_eq!(dots.len(), 41 + 41 + 41 + 2);
    }

    #[test]
    fn arcs_past_the_maximum_stop_at_the_full_circle() {
        let spec = DonutSpec::new(circle(100.0)).with_segment(150.0, css::RED);
        let dots = dots(&render(&spec));
        assert_eq!(dots.len(), 401);
        assert_near(dots[400].0, dots[0].0);
    }

    #[test]
    fn label_is_centered_in_the_ring() {
        let spec = DonutSpec::new(circle(15.0))
            .with_segment(3.0, css::YELLOW)
            .with_text("3.0", Font::system(35.0), css::WHITE);
        let commands = render(&spec);
        let Some(DrawCommand::Text {
            text,
            rect,
            alignment,
            font,
            color,
        }) = commands.last()
        else {
            panic!("expected the label last");
        };
        assert_eq!(text, "3.0");
        assert_eq!(*alignment, TextAlignment::Center);
        assert_eq!(font.size, 35.0);
        assert_eq!(*color, css::WHITE);
        assert!((rect.x0 - 7.0).abs() < 1e-9 && (rect.x1 - 133.0).abs() < 1e-9);
        assert!((rect.y0 - 49.0).abs() < 1e-9 && (rect.y1 - 91.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_maximum_is_rejected() {
        let spec = DonutSpec::new(circle(0.0)).with_segment(0.0, css::RED);
        assert_eq!(
            image_with_donut(Size::new(140.0, 140.0), &spec),
            Err(ChartError::InvalidMaxValue(0.0))
        );
        let spec = DonutSpec::new(circle(f64::NAN));
        assert!(image_with_donut(Size::new(140.0, 140.0), &spec).is_err());
    }

    #[test]
    fn total_sums_segments() {
        let spec = DonutSpec::new(circle(10.0))
            .with_segment(1.5, css::RED)
            .with_segment(2.5, css::BLUE);
        assert_eq!(spec.total(), 4.0);
    }
}
