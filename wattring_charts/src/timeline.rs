// Copyright 2025 the Wattring Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stacked bar timelines across the bucket ring.

extern crate alloc;

use alloc::vec::Vec;

use kurbo::{Rect, Size};
use peniko::Color;

use crate::bucket::BucketedSeries;
use crate::canvas::{Canvas, DrawContext};
use crate::error::{ChartError, positive_max};
use crate::image::Image;

/// One stacked series of a timeline.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineSegment {
    /// One value per column.
    pub values: Vec<f64>,
    /// Slice color.
    pub color: Color,
}

impl TimelineSegment {
    /// Creates a segment.
    pub fn new(values: impl Into<Vec<f64>>, color: Color) -> Self {
        Self {
            values: values.into(),
            color,
        }
    }
}

impl From<&BucketedSeries> for TimelineSegment {
    fn from(series: &BucketedSeries) -> Self {
        Self::new(series.values().all.to_vec(), series.color())
    }
}

/// A stacked timeline: segments sharing one vertical scale and one rotation offset.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineSpec {
    /// Area the bars are drawn in.
    pub rect: Rect,
    /// Series in declaration order; the last one sits at the bottom of each bar.
    pub segments: Vec<TimelineSegment>,
    /// Column total that fills the full height of `rect`.
    pub max_sum: f64,
    /// Bucket index drawn in the first column.
    pub index0: usize,
}

impl TimelineSpec {
    /// Creates a spec with no segments and no rotation.
    pub fn new(rect: Rect, max_sum: f64) -> Self {
        Self {
            rect,
            segments: Vec::new(),
            max_sum,
            index0: 0,
        }
    }

    /// Appends a segment.
    pub fn with_segment(mut self, segment: impl Into<TimelineSegment>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Sets the rotation offset.
    pub fn with_index0(mut self, index0: usize) -> Self {
        self.index0 = index0;
        self
    }

    /// Number of columns, taken from the first segment.
    pub fn columns(&self) -> usize {
        self.segments.first().map_or(0, |s| s.values.len())
    }
}

/// Draws `spec` onto `ctx`.
///
/// Column `i` reads bucket `(i + index0) % n`. Each column keeps a quarter of its width as a
/// gap on the left. Slice heights are `value / max_sum * rect.height()` and are not clamped.
pub fn draw_timeline<C: DrawContext + ?Sized>(
    ctx: &mut C,
    spec: &TimelineSpec,
) -> Result<(), ChartError> {
    let max_sum = positive_max(spec.max_sum)?;
    let n = spec.columns();
    for (series, segment) in spec.segments.iter().enumerate() {
        if segment.values.len() != n {
            return Err(ChartError::MismatchedSeriesLength {
                series,
                expected: n,
                found: segment.values.len(),
            });
        }
    }
    if n == 0 {
        return Ok(());
    }

    let rect = spec.rect;
    let width = rect.width() / n as f64;
    let gutter = width / 4.0;
    let index0 = spec.index0 % n;
    for column in 0..n {
        let index = (column + index0) % n;
        let x = rect.x0 + column as f64 * width;
        let mut base = rect.height();
        for segment in spec.segments.iter().rev() {
            let height = segment.values[index] / max_sum * rect.height();
            base -= height;
            ctx.set_fill_color(segment.color);
            ctx.fill_rect(Rect::new(
                x + gutter,
                rect.y0 + base,
                x + width,
                rect.y0 + base + height,
            ));
        }
    }
    Ok(())
}

/// Renders `spec` onto a fresh transparent surface of `size`.
pub fn image_with_timeline(size: Size, spec: &TimelineSpec) -> Result<Image, ChartError> {
    let mut canvas = Canvas::new(size);
    draw_timeline(&mut canvas, spec)?;
    Ok(canvas.into_image())
}

#[cfg(test)]
mod tests {
    extern crate std;

    use peniko::color::palette::css;

    use super::*;
    use crate::canvas::DrawCommand;

    fn rects(image: &Image) -> Vec<(Rect, Color)> {
        image
            .surface()
            .commands()
            .iter()
            .map(|c| match c {
                DrawCommand::FillRect { rect, color } => (*rect, *color),
                other => panic!("unexpected {other:?}"),
            })
            .collect()
    }

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn rotation_starts_at_index0() {
        let spec = TimelineSpec::new(Rect::new(0.0, 0.0, 960.0, 100.0), 100.0)
            .with_segment(TimelineSegment::new(ramp(96), css::RED))
            .with_index0(4);
        let image = image_with_timeline(Size::new(960.0, 100.0), &spec).unwrap();
        let rects = rects(&image);
        assert_eq!(rects.len(), 96);

        // Heights equal the bucket value since max_sum matches the rect height.
        assert!((rects[0].0.height() - 4.0).abs() < 1e-9);
        assert!((rects[95].0.height() - 3.0).abs() < 1e-9);
        assert!((rects[92].0.height() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn rotation_wraps_large_offsets() {
        let spec = TimelineSpec::new(Rect::new(0.0, 0.0, 8.0, 10.0), 1.0)
            .with_segment(TimelineSegment::new([1.0, 0.5], css::RED))
            .with_index0(usize::MAX);
        let image = image_with_timeline(Size::new(8.0, 10.0), &spec).unwrap();
        let rects = rects(&image);
        // usize::MAX is odd, so column 0 shows bucket 1.
        assert!((rects[0].0.height() - 5.0).abs() < 1e-9);
        assert!((rects[1].0.height() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn columns_keep_a_quarter_gutter() {
        let spec = TimelineSpec::new(Rect::new(10.0, 20.0, 90.0, 60.0), 1.0)
            .with_segment(TimelineSegment::new([1.0, 0.5], css::LIME));
        let image = image_with_timeline(Size::new(100.0, 80.0), &spec).unwrap();
        let rects = rects(&image);
        assert_eq!(rects[0].0, Rect::new(20.0, 20.0, 50.0, 60.0));
        assert_eq!(rects[1].0, Rect::new(60.0, 40.0, 90.0, 60.0));
    }

    #[test]
    fn later_segments_sit_at_the_bottom() {
        let spec = TimelineSpec::new(Rect::new(0.0, 0.0, 4.0, 100.0), 1.0)
            .with_segment(TimelineSegment::new([0.25], css::RED))
            .with_segment(TimelineSegment::new([0.5], css::BLUE));
        let image = image_with_timeline(Size::new(4.0, 100.0), &spec).unwrap();
        let rects = rects(&image);
        assert_eq!(rects[0], (Rect::new(1.0, 50.0, 4.0, 100.0), css::BLUE));
        assert_eq!(rects[1], (Rect::new(1.0, 25.0, 4.0, 50.0), css::RED));
    }

    #[test]
    fn unequal_segments_are_rejected() {
        let spec = TimelineSpec::new(Rect::new(0.0, 0.0, 4.0, 4.0), 1.0)
            .with_segment(TimelineSegment::new([1.0, 2.0], css::RED))
            .with_segment(TimelineSegment::new([1.0], css::BLUE));
        assert_eq!(
            draw_timeline(&mut Canvas::new(Size::new(4.0, 4.0)), &spec),
            Err(ChartError::MismatchedSeriesLength {
                series: 1,
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn zero_max_sum_is_rejected() {
        let spec = TimelineSpec::new(Rect::new(0.0, 0.0, 4.0, 4.0), 0.0)
            .with_segment(TimelineSegment::new([1.0], css::RED));
        assert_eq!(
            image_with_timeline(Size::new(4.0, 4.0), &spec),
            Err(ChartError::InvalidMaxValue(0.0))
        );
    }

    #[test]
    fn empty_spec_draws_nothing() {
        let spec = TimelineSpec::new(Rect::new(0.0, 0.0, 4.0, 4.0), 1.0);
        let image = image_with_timeline(Size::new(4.0, 4.0), &spec).unwrap();
        assert!(image.surface().is_empty());
    }
}
