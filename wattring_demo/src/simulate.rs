// Copyright 2025 the Wattring Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A deterministic stand-in for the measurement database.
//!
//! One household day is simulated slot by slot: a PV bell curve between 06:00 and 20:00, a
//! base load with morning and evening peaks, and a 10 kWh battery that absorbs surplus and
//! covers deficits within its power limits. Whatever is left over is fed to or drawn from
//! the grid.

use std::f64::consts::PI;

use wattring_charts::{BUCKET_MS, DAY_MS, RawSamples, SeriesSource, SourceError, TimeGrid};

const HOUR_MS: f64 = 3_600_000.0;
const BATTERY_CAPACITY_KWH: f64 = 10.0;
/// Per-slot charge and discharge limits.
const BATTERY_CHARGE_KWH: f64 = 0.5;
const BATTERY_DISCHARGE_KWH: f64 = 0.4;
const BATTERY_RESERVE: f64 = 10.0;
const PV_PEAK_KWH: f64 = 1.1;

/// The measurement names matched in incoming queries, in slot-record order.
const MEASUREMENTS: [&str; 6] = [
    "photovoltaics-energy-counter-consumption",
    "battery-energy-counter-charge",
    "battery-energy-counter-discharge",
    "battery-charge-level",
    "grid-energy-counter-out",
    "grid-energy-counter-in",
];

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Slot {
    pv_consume: f64,
    battery_charge: f64,
    battery_consume: f64,
    battery_level: f64,
    grid_feed: f64,
    grid_consume: f64,
}

impl Slot {
    fn value(&self, measurement: usize) -> f64 {
        match measurement {
            0 => self.pv_consume,
            1 => self.battery_charge,
            2 => self.battery_consume,
            3 => self.battery_level,
            4 => self.grid_feed,
            _ => self.grid_consume,
        }
    }
}

#[derive(Debug)]
pub(crate) struct SimulatedSource {
    grid: TimeGrid,
    outage: bool,
}

impl SimulatedSource {
    pub(crate) fn new(grid: TimeGrid) -> Self {
        Self {
            grid,
            outage: false,
        }
    }

    /// Makes every fetch fail.
    pub(crate) fn with_outage(mut self, outage: bool) -> Self {
        self.outage = outage;
        self
    }

    fn simulate(&self) -> Vec<(i64, Slot)> {
        let mut level: f64 = 40.0;
        self.grid
            .timestamps()
            .map(|t| {
                let hour = (t - self.grid.midnight_ms()).rem_euclid(DAY_MS) as f64 / HOUR_MS;
                let production = pv_production(hour);
                let load = household_load(hour);

                let pv_consume = production.min(load);
                let surplus = production - pv_consume;
                let deficit = load - pv_consume;

                let room = (100.0 - level) / 100.0 * BATTERY_CAPACITY_KWH;
                let battery_charge = surplus.min(BATTERY_CHARGE_KWH).min(room);
                let available = ((level - BATTERY_RESERVE) / 100.0 * BATTERY_CAPACITY_KWH).max(0.0);
                let battery_consume = deficit.min(BATTERY_DISCHARGE_KWH).min(available);
                level = (level + (battery_charge - battery_consume) / BATTERY_CAPACITY_KWH * 100.0)
                    .clamp(0.0, 100.0);

                let slot = Slot {
                    pv_consume,
                    battery_charge,
                    battery_consume,
                    battery_level: level,
                    grid_feed: surplus - battery_charge,
                    grid_consume: deficit - battery_consume,
                };
                (t, slot)
            })
            .collect()
    }
}

impl SeriesSource for SimulatedSource {
    fn fetch(&self, queries: &[String]) -> Result<Vec<RawSamples>, SourceError> {
        if self.outage {
            return Err(SourceError::Unavailable("simulated outage".into()));
        }
        let slots = self.simulate();
        let results = queries
            .iter()
            .map(|query| {
                let Some(measurement) = MEASUREMENTS.iter().position(|m| query.contains(m)) else {
                    log::warn!("no simulated data for query {query:?}");
                    return RawSamples::default();
                };
                // The database also answers for the two slots before the grid.
                let lead = (1..=2).map(|k| (self.grid.start_ms() - k * BUCKET_MS, 0.0));
                lead.chain(slots.iter().map(|(t, slot)| (*t, slot.value(measurement))))
                    .collect()
            })
            .collect();
        Ok(results)
    }
}

/// PV output per slot in kWh.
fn pv_production(hour: f64) -> f64 {
    if (6.0..20.0).contains(&hour) {
        PV_PEAK_KWH * (PI * (hour - 6.0) / 14.0).sin().powi(2)
    } else {
        0.0
    }
}

/// Household consumption per slot in kWh.
fn household_load(hour: f64) -> f64 {
    let peak = |center: f64, width: f64, height: f64| {
        let d = (hour - center) / width;
        height * (-d * d).exp()
    };
    0.12 + peak(7.5, 1.0, 0.35) + peak(12.5, 0.8, 0.25) + peak(19.0, 1.5, 0.45)
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use wattring_charts::{BUCKET_COUNT, SeriesCatalog, WindowStart, load_series};

    use super::*;

    fn grid() -> TimeGrid {
        let now = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 1, 21, 3, 0)
            .unwrap();
        TimeGrid::new(&now)
    }

    #[test]
    fn energy_balances_per_slot() {
        let source = SimulatedSource::new(grid());
        for (_, slot) in source.simulate() {
            let supply = slot.pv_consume + slot.battery_consume + slot.grid_consume;
            assert!(supply > 0.0, "{slot:?}");
            assert!(slot.grid_feed >= 0.0 && slot.grid_consume >= 0.0, "{slot:?}");
            assert!((0.0..=100.0).contains(&slot.battery_level), "{slot:?}");
        }
    }

    #[test]
    fn answers_every_catalog_query() {
        let catalog = SeriesCatalog::energy_default();
        let set = load_series(
            &SimulatedSource::new(grid()),
            &catalog,
            grid(),
            WindowStart::Rolling24h,
        )
        .unwrap();
        assert_eq!(set.len(), catalog.len());
        let (_, pv) = set.iter().next().unwrap();
        assert!(pv.values_sum() > 1.0, "{}", pv.values_sum());
        assert_eq!(pv.values().all.len(), BUCKET_COUNT);
    }

    #[test]
    fn unknown_queries_get_no_samples() {
        let source = SimulatedSource::new(grid());
        let results = source.fetch(&["SELECT 1".to_string()]).unwrap();
        assert!(results[0].is_empty());
    }

    #[test]
    fn outage_fails_the_fetch() {
        let source = SimulatedSource::new(grid()).with_outage(true);
        assert!(source.fetch(&[]).is_err());
    }

    #[test]
    fn no_sun_at_night() {
        assert_eq!(pv_production(3.0), 0.0);
        assert_eq!(pv_production(21.0), 0.0);
        assert!(pv_production(13.0) > 1.0);
    }
}
