// Copyright 2025 the Wattring Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Demo settings: an optional `wattring.toml` overridden by `WATTRING__*` variables.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, bail};
use peniko::Color;
use serde::Deserialize;
use wattring_charts::{
    DonutScale, EnergyChartConfig, SeriesCatalog, SeriesKey, TileStyle, TimelineOrigin,
    WidgetFamily, WindowStart,
};

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Family {
    #[default]
    Small,
    Medium,
}

impl From<Family> for WidgetFamily {
    fn from(family: Family) -> Self {
        match family {
            Family::Small => Self::Small,
            Family::Medium => Self::Medium,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Style {
    #[default]
    Overview,
    Donuts,
    Timeline,
}

impl From<Style> for TileStyle {
    fn from(style: Style) -> Self {
        match style {
            Style::Overview => Self::Overview,
            Style::Donuts => Self::Donuts,
            Style::Timeline => Self::Timeline,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Origin {
    #[default]
    Rolling,
    Midnight,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Window {
    #[default]
    Rolling,
    Today,
}

impl From<Window> for WindowStart {
    fn from(window: Window) -> Self {
        match window {
            Window::Rolling => Self::Rolling24h,
            Window::Today => Self::Today,
        }
    }
}

/// Ring and bar maxima, in kWh.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct Maxima {
    pub(crate) consumption: f64,
    pub(crate) feed: f64,
    pub(crate) sum_per_segment: f64,
}

impl Default for Maxima {
    fn default() -> Self {
        Self {
            consumption: 15.0,
            feed: 25.0,
            sum_per_segment: 1.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct DemoConfig {
    pub(crate) family: Family,
    pub(crate) style: Style,
    /// Device pixels per logical unit in the written SVG.
    pub(crate) scale: f64,
    pub(crate) output: PathBuf,
    pub(crate) timeline_origin: Origin,
    pub(crate) window_start: Window,
    /// Render with an unreachable data source.
    pub(crate) simulate_outage: bool,
    pub(crate) maxima: Maxima,
    /// `device -> measurement -> "#rrggbb"` overrides of the catalog colors.
    pub(crate) colors: HashMap<String, HashMap<String, String>>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            family: Family::default(),
            style: Style::default(),
            scale: 2.0,
            output: PathBuf::from("wattring_tile.svg"),
            timeline_origin: Origin::default(),
            window_start: Window::default(),
            simulate_outage: false,
            maxima: Maxima::default(),
            colors: HashMap::new(),
        }
    }
}

impl DemoConfig {
    /// Reads `{name}.toml` (if present) and the `WATTRING__` environment.
    pub(crate) fn load(name: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(name).required(false))
            .add_source(
                config::Environment::with_prefix("WATTRING")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let config: Self = settings.try_deserialize()?;
        if !(config.scale.is_finite() && config.scale > 0.0) {
            bail!("scale must be positive, got {}", config.scale);
        }
        Ok(config)
    }

    pub(crate) fn chart_config(&self) -> EnergyChartConfig {
        EnergyChartConfig {
            consumption: DonutScale::fixed(self.maxima.consumption),
            feed: DonutScale::fixed(self.maxima.feed),
            sum_per_segment: self.maxima.sum_per_segment,
            timeline_origin: match self.timeline_origin {
                Origin::Rolling => TimelineOrigin::Rolling,
                Origin::Midnight => TimelineOrigin::Midnight,
            },
            ..EnergyChartConfig::default()
        }
    }

    /// Applies the color overrides; unknown measurements are an error.
    pub(crate) fn apply_colors(&self, catalog: &mut SeriesCatalog) -> anyhow::Result<()> {
        for (device, measurements) in &self.colors {
            for (measurement, value) in measurements {
                let color = parse_hex_color(value)
                    .with_context(|| format!("color of {device}/{measurement}"))?;
                if !catalog.set_color(SeriesKey::new(device, measurement), color) {
                    bail!("no series {device}/{measurement} to color");
                }
            }
        }
        Ok(())
    }
}

/// Parses `#rrggbb` or `#rrggbbaa`.
pub(crate) fn parse_hex_color(value: &str) -> anyhow::Result<Color> {
    let Some(hex) = value.strip_prefix('#') else {
        bail!("expected '#rrggbb', got {value:?}");
    };
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        bail!("expected '#rrggbb' or '#rrggbbaa', got {value:?}");
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
    let alpha = if hex.len() == 8 { channel(6)? } else { 0xff };
    Ok(Color::from_rgba8(channel(0)?, channel(2)?, channel(4)?, alpha))
}
