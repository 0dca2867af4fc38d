// Copyright 2025 the Wattring Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Energy-flow charts for small dashboard tiles.
//!
//! The pipeline runs once per render, single-threaded:
//! - a [`TimeGrid`] is captured from an injected "now",
//! - a [`SeriesSource`] supplies raw samples, which [`load_series`] buckets into 96 slots of
//!   15 minutes per measurement,
//! - the energy builders turn the bucketed series into [`DonutSpec`]s and [`TimelineSpec`]s,
//! - the renderers draw those onto a [`Canvas`] and yield [`Image`]s,
//! - a [`Tile`] lays the images out in rows with [`layout_row`] and flattens them.
//!
//! Drawing goes through the small [`DrawContext`] capability. [`Canvas`] records it; export
//! backends replay the recorded [`DisplayList`] onto their own surface.
//!
//! Fetching data and encoding images are left to the caller.

#![no_std]

extern crate alloc;

mod bucket;
mod canvas;
mod donut;
mod energy;
mod error;
#[cfg(not(feature = "std"))]
mod float;
mod image;
mod layout;
mod series;
mod source;
mod tile;
mod timeline;

pub use bucket::{
    BUCKET_COUNT, BUCKET_MINUTES, BUCKET_MS, BucketValues, BucketedSeries, DAY_MS, RawSamples,
    TimeGrid, WindowStart,
};
pub use canvas::{
    Canvas, DisplayList, DrawCommand, DrawContext, TEXT_TOP_INSET, TextAlignment, text_origin,
};
pub use donut::{
    ARC_STEPS_PER_PERCENT, DonutCircle, DonutSegment, DonutSpec, DonutText, TEXT_LINE_HEIGHT,
    draw_donut, image_with_donut,
};
pub use energy::{
    DonutScale, DonutStyle, EnergyChartConfig, TimelineOrigin, battery_level, consumption_mix,
    energy_timeline, grid_feed, production_mix,
};
pub use error::ChartError;
pub use image::Image;
pub use layout::{ComposedTile, PlacedImage, Placement, Row, RowPlacement, Tile, layout_row};
pub use series::{CatalogEntry, SeriesCatalog, SeriesKey, SeriesSet, TimeSeriesDefinition};
pub use source::{
    QueryWindow, SeriesSource, SourceError, TIME_INTERVAL_PLACEHOLDER, TIME_RANGE_PLACEHOLDER,
    load_series,
};
pub use tile::{TileGeometry, TileStyle, WidgetFamily, build_tile};
pub use timeline::{TimelineSegment, TimelineSpec, draw_timeline, image_with_timeline};
