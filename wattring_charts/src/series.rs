// Copyright 2025 the Wattring Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Measurement catalog and the bucketed series of one render.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use peniko::Color;
use peniko::color::palette::css;

use crate::bucket::{BucketedSeries, TimeGrid, WindowStart};

/// Names one measurement of one device, e.g. `grid` / `feed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SeriesKey<'a> {
    /// Device group.
    pub device: &'a str,
    /// Measurement within the device.
    pub measurement: &'a str,
}

impl SeriesKey<'static> {
    /// Photovoltaic energy consumed on site.
    pub const PV_CONSUME: Self = Self::new("photovoltaics", "consume");
    /// Energy charged into the battery.
    pub const BATTERY_CHARGE: Self = Self::new("battery", "charge");
    /// Energy drawn from the battery.
    pub const BATTERY_CONSUME: Self = Self::new("battery", "consume");
    /// Battery charge level in percent.
    pub const BATTERY_LEVEL: Self = Self::new("battery", "level");
    /// Energy fed into the grid.
    pub const GRID_FEED: Self = Self::new("grid", "feed");
    /// Energy drawn from the grid.
    pub const GRID_CONSUME: Self = Self::new("grid", "consume");
}

impl<'a> SeriesKey<'a> {
    /// Creates a key.
    pub const fn new(device: &'a str, measurement: &'a str) -> Self {
        Self {
            device,
            measurement,
        }
    }
}

/// How to fetch one measurement and how to draw it.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSeriesDefinition {
    /// Query text; may contain `${time-range}` and `${time-interval}` placeholders.
    pub query: String,
    /// Display color.
    pub color: Color,
}

impl TimeSeriesDefinition {
    /// Creates a definition.
    pub fn new(query: impl Into<String>, color: Color) -> Self {
        Self {
            query: query.into(),
            color,
        }
    }
}

/// One row of a [`SeriesCatalog`].
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogEntry {
    /// Device group.
    pub device: String,
    /// Measurement within the device.
    pub measurement: String,
    /// Query and color.
    pub definition: TimeSeriesDefinition,
}

impl CatalogEntry {
    /// The entry's key.
    pub fn key(&self) -> SeriesKey<'_> {
        SeriesKey::new(&self.device, &self.measurement)
    }
}

/// An ordered list of measurements.
///
/// Queries are issued in catalog order and results are matched back by position, so the
/// order is significant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeriesCatalog {
    entries: Vec<CatalogEntry>,
}

impl SeriesCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The six energy-flow measurements, as counters differenced per 15-minute slot in kWh
    /// (the battery level is a percentage carried forward).
    pub fn energy_default() -> Self {
        let counter = |name: &str| {
            alloc::format!(
                "SELECT difference(last(\"value\")) / 1000 FROM \"{name}\" WHERE ${{time-range}} GROUP BY ${{time-interval}} fill(0)"
            )
        };
        Self::new()
            .with_entry(
                SeriesKey::PV_CONSUME,
                TimeSeriesDefinition::new(
                    counter("photovoltaics-energy-counter-consumption"),
                    css::YELLOW,
                ),
            )
            .with_entry(
                SeriesKey::BATTERY_CHARGE,
                TimeSeriesDefinition::new(
                    counter("battery-energy-counter-charge"),
                    Color::from_rgb8(0x00, 0xaa, 0xee),
                ),
            )
            .with_entry(
                SeriesKey::BATTERY_CONSUME,
                TimeSeriesDefinition::new(counter("battery-energy-counter-discharge"), css::ORANGE),
            )
            .with_entry(
                SeriesKey::BATTERY_LEVEL,
                TimeSeriesDefinition::new(
                    "SELECT last(\"value\") FROM \"battery-charge-level\" WHERE ${time-range} GROUP BY ${time-interval} fill(previous)",
                    css::ORANGE,
                ),
            )
            .with_entry(
                SeriesKey::GRID_FEED,
                TimeSeriesDefinition::new(counter("grid-energy-counter-out"), css::LIME),
            )
            .with_entry(
                SeriesKey::GRID_CONSUME,
                TimeSeriesDefinition::new(counter("grid-energy-counter-in"), css::RED),
            )
    }

    /// Appends a measurement.
    pub fn push(&mut self, key: SeriesKey<'_>, definition: TimeSeriesDefinition) {
        self.entries.push(CatalogEntry {
            device: key.device.into(),
            measurement: key.measurement.into(),
            definition,
        });
    }

    /// Appends a measurement.
    #[must_use]
    pub fn with_entry(mut self, key: SeriesKey<'_>, definition: TimeSeriesDefinition) -> Self {
        self.push(key, definition);
        self
    }

    /// Entries in query order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an entry.
    pub fn get(&self, key: SeriesKey<'_>) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.key() == key)
    }

    /// Changes the color of an entry. Returns `false` if there is no such entry.
    pub fn set_color(&mut self, key: SeriesKey<'_>, color: Color) -> bool {
        match self.entries.iter_mut().find(|e| e.key() == key) {
            Some(entry) => {
                entry.definition.color = color;
                true
            }
            None => false,
        }
    }
}

/// The bucketed series of one render, in catalog order.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesSet {
    grid: TimeGrid,
    window: WindowStart,
    entries: Vec<(SeriesKeyBuf, BucketedSeries)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct SeriesKeyBuf {
    device: String,
    measurement: String,
}

impl SeriesSet {
    /// Starts an empty set bucketed against `grid`.
    pub fn new(grid: TimeGrid, window: WindowStart) -> Self {
        Self {
            grid,
            window,
            entries: Vec::new(),
        }
    }

    /// Appends a series.
    pub fn push(&mut self, key: SeriesKey<'_>, series: BucketedSeries) {
        self.entries.push((
            SeriesKeyBuf {
                device: key.device.into(),
                measurement: key.measurement.into(),
            },
            series,
        ));
    }

    /// The grid every series was bucketed against.
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// The window the series were bucketed with.
    pub fn window(&self) -> WindowStart {
        self.window
    }

    /// Looks up a series by key.
    pub fn get(&self, key: SeriesKey<'_>) -> Option<&BucketedSeries> {
        self.entries
            .iter()
            .find(|(k, _)| k.device == key.device && k.measurement == key.measurement)
            .map(|(_, series)| series)
    }

    /// Iterates over the series in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (SeriesKey<'_>, &BucketedSeries)> {
        self.entries
            .iter()
            .map(|(k, series)| (SeriesKey::new(&k.device, &k.measurement), series))
    }

    /// Number of series.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the set has no series.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use chrono::{FixedOffset, TimeZone};

    use super::*;
    use crate::bucket::BucketValues;

    #[test]
    fn energy_catalog_order_is_stable() {
        let catalog = SeriesCatalog::energy_default();
        let keys: Vec<_> = catalog.entries().iter().map(CatalogEntry::key).collect();
        assert_eq!(
            keys,
            [
                SeriesKey::PV_CONSUME,
                SeriesKey::BATTERY_CHARGE,
                SeriesKey::BATTERY_CONSUME,
                SeriesKey::BATTERY_LEVEL,
                SeriesKey::GRID_FEED,
                SeriesKey::GRID_CONSUME,
            ]
        );
        let feed = catalog.get(SeriesKey::GRID_FEED).unwrap();
        assert!(feed.definition.query.contains("\"grid-energy-counter-out\""));
        assert!(feed.definition.query.contains("WHERE ${time-range} GROUP BY ${time-interval}"));
    }

    #[test]
    fn set_color_updates_only_known_entries() {
        let mut catalog = SeriesCatalog::energy_default();
        assert!(catalog.set_color(SeriesKey::GRID_CONSUME, css::PURPLE));
        assert_eq!(
            catalog.get(SeriesKey::GRID_CONSUME).unwrap().definition.color,
            css::PURPLE
        );
        assert!(!catalog.set_color(SeriesKey::new("heat-pump", "consume"), css::PURPLE));
    }

    #[test]
    fn series_set_looks_up_by_key() {
        let now = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
            .unwrap();
        let mut set = SeriesSet::new(TimeGrid::new(&now), WindowStart::Today);
        let mut values = BucketValues::zeroed();
        values.all[95] = 2.0;
        set.push(SeriesKey::GRID_FEED, BucketedSeries::new(values, css::LIME));

        assert_eq!(set.len(), 1);
        assert_eq!(set.window(), WindowStart::Today);
        assert_eq!(set.get(SeriesKey::GRID_FEED).unwrap().values_last(), 2.0);
        assert!(set.get(SeriesKey::GRID_CONSUME).is_none());
        let (key, _) = set.iter().next().unwrap();
        assert_eq!(key, SeriesKey::GRID_FEED);
    }
}
