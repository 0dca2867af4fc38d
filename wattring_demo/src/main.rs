// Copyright 2025 the Wattring Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renders an energy tile from simulated data and writes it as SVG.
//!
//! Settings come from an optional `wattring.toml` in the working directory and
//! `WATTRING__*` environment variables, e.g. `WATTRING__FAMILY=medium
//! WATTRING__STYLE=timeline`. Set `RUST_LOG=debug` to see the pipeline.

mod settings;
mod simulate;
mod svg;

use anyhow::Context;
use chrono::Local;
use kurbo::Vec2;
use log::info;
use wattring_charts::{SeriesCatalog, TileGeometry, TimeGrid, build_tile, load_series};

use crate::settings::DemoConfig;
use crate::simulate::SimulatedSource;
use crate::svg::SvgCanvas;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = DemoConfig::load("wattring")?;
    info!(
        "rendering {:?}/{:?} tile to {}",
        config.family,
        config.style,
        config.output.display()
    );

    let grid = TimeGrid::new(&Local::now());
    let mut catalog = SeriesCatalog::energy_default();
    config.apply_colors(&mut catalog)?;

    let source = SimulatedSource::new(grid).with_outage(config.simulate_outage);
    let series = load_series(&source, &catalog, grid, config.window_start.into());
    let tile = build_tile(
        series.as_ref(),
        &config.chart_config(),
        &TileGeometry::default(),
        config.family.into(),
        config.style.into(),
    )?;

    let mut svg = SvgCanvas::new(tile.image.size(), config.scale);
    tile.image.surface().replay(&mut svg, Vec2::ZERO);
    std::fs::write(&config.output, svg.finish())
        .with_context(|| format!("writing {}", config.output.display()))?;

    info!(
        "wrote {} ({} rows, {} drawing commands)",
        config.output.display(),
        tile.rows.len(),
        tile.image.surface().len()
    );
    Ok(())
}
