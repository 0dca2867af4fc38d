// Copyright 2025 the Wattring Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Energy-flow chart builders.
//!
//! Each builder reads the series it needs from a [`SeriesSet`] and returns a chart spec, or
//! `None` when one of those series is not in the set.

extern crate alloc;

use alloc::string::String;

use kurbo::{Point, Rect, Size};
use peniko::Color;
use smallvec::SmallVec;
use wattring_text::Font;

use crate::bucket::{BUCKET_COUNT, BucketedSeries, TimeGrid};
use crate::donut::{DonutCircle, DonutSpec};
use crate::series::{SeriesKey, SeriesSet};
use crate::timeline::{TimelineSegment, TimelineSpec};

/// How a donut's full-circle value is chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DonutScale {
    /// Configured maximum.
    pub max: f64,
    /// Grow the maximum to the segment total when the total exceeds it.
    pub clamp_to_actual: bool,
}

impl DonutScale {
    /// A fixed maximum; totals past it are cut off at the full circle.
    pub const fn fixed(max: f64) -> Self {
        Self {
            max,
            clamp_to_actual: false,
        }
    }

    /// A maximum that is at least the segment total.
    pub const fn at_least(max: f64) -> Self {
        Self {
            max,
            clamp_to_actual: true,
        }
    }

    /// The segment total always fills the circle.
    pub const fn fit_to_sum() -> Self {
        Self::at_least(0.0)
    }

    /// Resolves the maximum for a segment total.
    pub fn resolve(&self, sum: f64) -> f64 {
        if self.clamp_to_actual {
            self.max.max(sum)
        } else {
            self.max
        }
    }
}

/// Which bucket the timeline's first column shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimelineOrigin {
    /// The oldest bucket, `now - 24h`.
    #[default]
    Rolling,
    /// The first bucket of today.
    Midnight,
}

impl TimelineOrigin {
    /// The rotation offset for `grid`.
    pub fn index0(self, grid: &TimeGrid) -> usize {
        match self {
            Self::Rolling => 0,
            Self::Midnight => grid.midnight_index() % BUCKET_COUNT,
        }
    }
}

/// Geometry and styling shared by all donuts.
#[derive(Clone, Debug, PartialEq)]
pub struct DonutStyle {
    /// Image size.
    pub size: Size,
    /// Ring center within the image.
    pub center: Point,
    /// Ring radius.
    pub radius: f64,
    /// Ring thickness.
    pub line_width: f64,
    /// Track drawn under the segments.
    pub track_color: Option<Color>,
    /// Label font.
    pub font: Font,
    /// Label color for donuts without a series-colored label.
    pub text_color: Color,
}

impl Default for DonutStyle {
    fn default() -> Self {
        Self {
            size: Size::new(140.0, 140.0),
            center: Point::new(70.0, 70.0),
            radius: 63.0,
            line_width: 13.0,
            track_color: Some(Color::from_rgba8(0x44, 0x44, 0x44, 0x80)),
            font: Font::system(35.0),
            text_color: Color::WHITE,
        }
    }
}

/// Scales and styling for the energy charts.
#[derive(Clone, Debug, PartialEq)]
pub struct EnergyChartConfig {
    /// Donut geometry.
    pub donut: DonutStyle,
    /// Consumption mix scale, in kWh.
    pub consumption: DonutScale,
    /// Grid feed scale, in kWh.
    pub feed: DonutScale,
    /// Production mix scale, in kWh.
    pub production: DonutScale,
    /// Battery level scale, in percent.
    pub battery_level: DonutScale,
    /// Bucket total that fills the timeline height, in kWh.
    pub sum_per_segment: f64,
    /// First column of the timeline.
    pub timeline_origin: TimelineOrigin,
}

impl Default for EnergyChartConfig {
    fn default() -> Self {
        Self {
            donut: DonutStyle::default(),
            consumption: DonutScale::fixed(15.0),
            feed: DonutScale::fixed(25.0),
            production: DonutScale::fit_to_sum(),
            battery_level: DonutScale::fixed(100.0),
            sum_per_segment: 1.0,
            timeline_origin: TimelineOrigin::Rolling,
        }
    }
}

/// Where the day's energy came from: PV, battery and grid consumption.
pub fn consumption_mix(series: &SeriesSet, config: &EnergyChartConfig) -> Option<DonutSpec> {
    let parts = [
        series.get(SeriesKey::PV_CONSUME)?,
        series.get(SeriesKey::BATTERY_CONSUME)?,
        series.get(SeriesKey::GRID_CONSUME)?,
    ];
    Some(sum_donut(&parts, config.consumption, config, config.donut.text_color))
}

/// Energy fed into the grid, labelled in the feed color.
pub fn grid_feed(series: &SeriesSet, config: &EnergyChartConfig) -> Option<DonutSpec> {
    let feed = series.get(SeriesKey::GRID_FEED)?;
    Some(sum_donut(&[feed], config.feed, config, feed.color()))
}

/// Where the day's production went: PV consumption, battery charge and grid feed.
pub fn production_mix(series: &SeriesSet, config: &EnergyChartConfig) -> Option<DonutSpec> {
    let parts = [
        series.get(SeriesKey::PV_CONSUME)?,
        series.get(SeriesKey::BATTERY_CHARGE)?,
        series.get(SeriesKey::GRID_FEED)?,
    ];
    Some(sum_donut(&parts, config.production, config, config.donut.text_color))
}

/// The most recent battery charge level.
pub fn battery_level(series: &SeriesSet, config: &EnergyChartConfig) -> Option<DonutSpec> {
    let level = series.get(SeriesKey::BATTERY_LEVEL)?;
    let value = level.values_last();
    let text = alloc::format!("{value:.0}%");
    Some(donut(
        &[(value, level.color())],
        config.battery_level.resolve(value),
        text,
        level.color(),
        config,
    ))
}

/// Stacked per-bucket energy flows filling `size`.
///
/// From the bottom: PV consumption, battery consumption, grid consumption, battery charge,
/// grid feed.
pub fn energy_timeline(
    series: &SeriesSet,
    config: &EnergyChartConfig,
    size: Size,
) -> Option<TimelineSpec> {
    let order = [
        SeriesKey::GRID_FEED,
        SeriesKey::BATTERY_CHARGE,
        SeriesKey::GRID_CONSUME,
        SeriesKey::BATTERY_CONSUME,
        SeriesKey::PV_CONSUME,
    ];
    let index0 = config.timeline_origin.index0(series.grid());
    let rect = Rect::from_origin_size(Point::ORIGIN, size);
    let mut spec = TimelineSpec::new(rect, config.sum_per_segment).with_index0(index0);
    for key in order {
        spec.segments.push(TimelineSegment::from(series.get(key)?));
    }
    Some(spec)
}

fn sum_donut(
    parts: &[&BucketedSeries],
    scale: DonutScale,
    config: &EnergyChartConfig,
    text_color: Color,
) -> DonutSpec {
    let sum: f64 = parts.iter().map(|s| s.values_sum()).sum();
    let segments: SmallVec<[(f64, Color); 4]> =
        parts.iter().map(|s| (s.values_sum(), s.color())).collect();
    donut(
        &segments,
        scale.resolve(sum),
        alloc::format!("{sum:.1}"),
        text_color,
        config,
    )
}

fn donut(
    segments: &[(f64, Color)],
    max_value: f64,
    text: String,
    text_color: Color,
    config: &EnergyChartConfig,
) -> DonutSpec {
    let style = &config.donut;
    let mut circle = DonutCircle::new(style.center, style.radius, style.line_width, max_value);
    circle.track_color = style.track_color;

    let spec = if max_value > 0.0 {
        segments
            .iter()
            .fold(DonutSpec::new(circle), |spec, &(value, color)| {
                spec.with_segment(value, color)
            })
    } else {
        // Nothing to scale against: keep the ring empty.
        log::trace!("donut '{text}' has no data, drawing track only");
        circle.max_value = 1.0;
        DonutSpec::new(circle)
    };
    spec.with_text(text, style.font.clone(), text_color)
}
