// Copyright 2025 the Wattring Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Assembly of the energy charts into a finished tile.

use kurbo::Size;
use peniko::Color;

use crate::donut::{DonutSpec, image_with_donut};
use crate::energy::{
    EnergyChartConfig, battery_level, consumption_mix, energy_timeline, grid_feed, production_mix,
};
use crate::error::ChartError;
use crate::image::Image;
use crate::layout::{ComposedTile, Row, Tile};
use crate::series::SeriesSet;
use crate::timeline::image_with_timeline;

/// Size class of the tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WidgetFamily {
    /// Square tile: four donuts in two rows.
    #[default]
    Small,
    /// Wide tile; content depends on [`TileStyle`].
    Medium,
}

/// Content of a medium tile. Small tiles ignore it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TileStyle {
    /// Four donuts above the timeline.
    #[default]
    Overview,
    /// Four donuts only.
    Donuts,
    /// A double-height timeline only.
    Timeline,
}

/// Margins, spacing and background of a tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGeometry {
    /// Left and right margin of every row.
    pub side_margin: f64,
    /// Space above the first row and below the last.
    pub top_margin: f64,
    /// Space between rows.
    ///
    /// Donut rows are also sized with one `spacing` of leftover width per adjacent pair, which
    /// [`layout_row`] spreads into gaps. Small tiles place their two donuts `spacing / 2`
    /// apart; the donuts style places its four `spacing * 3 / 4` apart.
    ///
    /// [`layout_row`]: crate::layout_row
    pub spacing: f64,
    /// Timeline size in the overview style; the timeline style doubles the height.
    pub timeline: Size,
    /// Tile background.
    pub background: Option<Color>,
}

impl Default for TileGeometry {
    fn default() -> Self {
        Self {
            side_margin: 16.0,
            top_margin: 16.0,
            spacing: 14.0,
            timeline: Size::new(660.0, 140.0),
            background: Some(Color::from_rgb8(0x18, 0x18, 0x18)),
        }
    }
}

impl TileGeometry {
    /// The tile size for a family and style, given the donut image size.
    pub fn tile_size(&self, family: WidgetFamily, style: TileStyle, donut: Size) -> Size {
        let donut_row = |n: f64| n * donut.width + (n - 1.0) * self.spacing;
        let (content_width, content_height) = match (family, style) {
            (WidgetFamily::Small, _) => (donut_row(2.0), 2.0 * donut.height + self.spacing),
            (WidgetFamily::Medium, TileStyle::Overview) => (
                donut_row(4.0).max(self.timeline.width),
                donut.height + self.spacing + self.timeline.height,
            ),
            (WidgetFamily::Medium, TileStyle::Donuts) => (donut_row(4.0), donut.height),
            (WidgetFamily::Medium, TileStyle::Timeline) => {
                (self.timeline.width, 2.0 * self.timeline.height)
            }
        };
        Size::new(
            content_width + 2.0 * self.side_margin,
            content_height + 2.0 * self.top_margin,
        )
    }
}

/// Renders the energy tile for `family` and `style`.
///
/// `series` is `None` when the data was unavailable; the tile then carries only its
/// background. Charts whose series are not configured are left out of their row.
pub fn build_tile(
    series: Option<&SeriesSet>,
    config: &EnergyChartConfig,
    geometry: &TileGeometry,
    family: WidgetFamily,
    style: TileStyle,
) -> Result<ComposedTile, ChartError> {
    let size = geometry.tile_size(family, style, config.donut.size);
    let mut tile = Tile::new(size)
        .with_top_margin(geometry.top_margin)
        .with_row_spacing(geometry.spacing);
    if let Some(background) = geometry.background {
        tile = tile.with_background(background);
    }

    let Some(series) = series else {
        log::debug!("no series data, composing an empty {family:?} tile");
        return Ok(tile.compose());
    };

    let row = || Row::new(size.width, geometry.side_margin);
    let donut = |spec: Option<DonutSpec>| -> Result<Option<Image>, ChartError> {
        spec.map(|spec| image_with_donut(config.donut.size, &spec))
            .transpose()
    };
    let timeline = |height: f64| -> Result<Option<Image>, ChartError> {
        let size = Size::new(geometry.timeline.width, height);
        energy_timeline(series, config, size)
            .map(|spec| image_with_timeline(size, &spec))
            .transpose()
    };

    match (family, style) {
        (WidgetFamily::Small, _) => {
            tile.push_row(
                row()
                    .with_image(donut(consumption_mix(series, config))?)
                    .with_image(donut(grid_feed(series, config))?),
            );
            tile.push_row(
                row()
                    .with_image(donut(production_mix(series, config))?)
                    .with_image(donut(battery_level(series, config))?),
            );
        }
        (WidgetFamily::Medium, TileStyle::Overview | TileStyle::Donuts) => {
            tile.push_row(
                row()
                    .with_image(donut(consumption_mix(series, config))?)
                    .with_image(donut(grid_feed(series, config))?)
                    .with_image(donut(production_mix(series, config))?)
                    .with_image(donut(battery_level(series, config))?),
            );
            if style == TileStyle::Overview {
                tile.push_row(row().with_image(timeline(geometry.timeline.height)?));
            }
        }
        (WidgetFamily::Medium, TileStyle::Timeline) => {
            tile.push_row(row().with_image(timeline(2.0 * geometry.timeline.height)?));
        }
    }

    log::debug!(
        "composing {family:?}/{style:?} tile of {}x{} with {} rows",
        size.width,
        size.height,
        tile.row_count()
    );
    Ok(tile.compose())
}
