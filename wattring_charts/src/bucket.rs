// Copyright 2025 the Wattring Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bucketing of sparse samples onto a rolling 24-hour grid of 15-minute slots.
//!
//! A [`TimeGrid`] is captured once per render from an injected "now". It fixes the 96 grid
//! instants `now - 24h, now - 23h45, ..., now - 15min` and the local midnight that splits
//! them into "yesterday" and "today". Every series of one render is bucketed against the same
//! grid, so their slots line up index by index.

use chrono::{DateTime, NaiveTime, TimeDelta, TimeZone, Timelike};
use hashbrown::HashMap;
use peniko::Color;

/// Number of slots in a bucketed day.
pub const BUCKET_COUNT: usize = 96;

/// Width of one slot in minutes.
pub const BUCKET_MINUTES: i64 = 15;

/// Width of one slot in milliseconds.
pub const BUCKET_MS: i64 = BUCKET_MINUTES * 60 * 1000;

/// Length of the rolling window in milliseconds.
pub const DAY_MS: i64 = BUCKET_COUNT as i64 * BUCKET_MS;

/// Raw samples for one query: millisecond timestamp to value.
///
/// Timestamps are expected on the 15-minute grid; values may be negative or missing.
pub type RawSamples = HashMap<i64, f64>;

/// Which leading part of the 24-hour window contributes to [`BucketValues::all`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WindowStart {
    /// The full rolling window, starting at `now - 24h`.
    #[default]
    Rolling24h,
    /// Only today, starting at local midnight.
    Today,
}

/// The 96 grid instants of one render, plus the local midnight splitting them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeGrid {
    now_ms: i64,
    midnight_ms: i64,
}

impl TimeGrid {
    /// Captures a grid from a wall-clock reading.
    ///
    /// `now` is truncated to the 15-minute grid in its own local time, and midnight is the
    /// start of that local day.
    pub fn new<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let aligned = align_to_grid(now);
        let midnight = local_midnight(&aligned);
        Self {
            now_ms: aligned.timestamp_millis(),
            midnight_ms: midnight.timestamp_millis(),
        }
    }

    /// The aligned "now" in milliseconds. It is one slot past the last grid instant.
    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }

    /// The first grid instant, `now - 24h`, in milliseconds.
    pub fn start_ms(&self) -> i64 {
        self.now_ms - DAY_MS
    }

    /// Local midnight of the current day in milliseconds.
    pub fn midnight_ms(&self) -> i64 {
        self.midnight_ms
    }

    /// The first instant that contributes to [`BucketValues::all`] for `window`.
    pub fn window_start_ms(&self, window: WindowStart) -> i64 {
        match window {
            WindowStart::Rolling24h => self.start_ms(),
            WindowStart::Today => self.midnight_ms,
        }
    }

    /// The 96 grid instants in ascending order.
    pub fn timestamps(&self) -> impl Iterator<Item = i64> + use<> {
        let start = self.start_ms();
        (0..BUCKET_COUNT as i64).map(move |i| start + i * BUCKET_MS)
    }

    /// Number of grid instants before local midnight.
    ///
    /// This is also the slot index at which today begins.
    pub fn midnight_index(&self) -> usize {
        let midnight = self.midnight_ms;
        self.timestamps().filter(|&t| t < midnight).count()
    }

    /// Places `raw` onto the grid.
    ///
    /// Missing samples read as 0 and negative (or NaN) samples are clamped to 0. The
    /// today/yesterday split depends only on midnight; `window` only blanks the leading slots
    /// of [`BucketValues::all`].
    pub fn bucketize(&self, raw: &RawSamples, window: WindowStart) -> BucketValues {
        let window_start = self.window_start_ms(window);
        let mut out = BucketValues::zeroed();
        for (i, timestamp) in self.timestamps().enumerate() {
            let value = raw.get(&timestamp).copied().map_or(0.0, clamp_sample);
            if timestamp >= self.midnight_ms {
                out.today[i] = value;
            } else {
                out.yesterday[i] = value;
            }
            if timestamp >= window_start {
                out.all[i] = value;
            }
        }
        out
    }
}

fn clamp_sample(value: f64) -> f64 {
    if value > 0.0 { value } else { 0.0 }
}

fn align_to_grid<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let local = now.naive_local();
    let excess = TimeDelta::minutes(i64::from(local.minute()) % BUCKET_MINUTES)
        + TimeDelta::seconds(i64::from(local.second()))
        + TimeDelta::nanoseconds(i64::from(local.nanosecond()));
    now.clone() - excess
}

/// The first instant of `now`'s local day.
fn local_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let local = now.naive_local();
    let tz = now.timezone();
    // Zones that skip midnight on a DST change start the day at the end of the gap.
    let mut candidate = local.date().and_time(NaiveTime::MIN);
    while candidate < local {
        if let Some(midnight) = tz.from_local_datetime(&candidate).earliest() {
            return midnight;
        }
        candidate += TimeDelta::minutes(BUCKET_MINUTES);
    }
    now.clone()
}

/// One series on the grid, in three day-relative views.
///
/// All three arrays are indexed by grid slot: slot `i` is the instant `start + i * 15min`.
#[derive(Clone, Debug, PartialEq)]
pub struct BucketValues {
    /// Every slot at or after the window start.
    pub all: [f64; BUCKET_COUNT],
    /// Slots at or after local midnight; zero elsewhere.
    pub today: [f64; BUCKET_COUNT],
    /// Slots before local midnight; zero elsewhere.
    pub yesterday: [f64; BUCKET_COUNT],
}

impl BucketValues {
    /// All slots zero, as produced for a query with no data.
    pub fn zeroed() -> Self {
        Self {
            all: [0.0; BUCKET_COUNT],
            today: [0.0; BUCKET_COUNT],
            yesterday: [0.0; BUCKET_COUNT],
        }
    }
}

/// A bucketed series together with its display color and summary values.
#[derive(Clone, Debug, PartialEq)]
pub struct BucketedSeries {
    values: BucketValues,
    color: Color,
    values_last: f64,
    values_sum: f64,
}

impl BucketedSeries {
    /// Wraps bucketed values, deriving the sum and the most recent value from `values.all`.
    pub fn new(values: BucketValues, color: Color) -> Self {
        let values_sum = values.all.iter().sum();
        let values_last = values.all[BUCKET_COUNT - 1];
        Self {
            values,
            color,
            values_last,
            values_sum,
        }
    }

    /// The bucketed values.
    pub fn values(&self) -> &BucketValues {
        &self.values
    }

    /// The display color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// The value of the most recent slot.
    pub fn values_last(&self) -> f64 {
        self.values_last
    }

    /// The sum over [`BucketValues::all`].
    pub fn values_sum(&self) -> f64 {
        self.values_sum
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use chrono::FixedOffset;
    use peniko::color::palette::css;

    use super::*;

    fn cet() -> FixedOffset {
        FixedOffset::east_opt(3600).expect("valid offset")
    }

    /// 14:07:30 local on 2024-06-01, which aligns to 14:00.
    fn afternoon_grid() -> TimeGrid {
        let now = cet()
            .with_ymd_and_hms(2024, 6, 1, 14, 7, 30)
            .single()
            .expect("unambiguous");
        TimeGrid::new(&now)
    }

    fn ms(h: u32, m: u32, day: u32) -> i64 {
        cet()
            .with_ymd_and_hms(2024, 6, day, h, m, 0)
            .single()
            .expect("unambiguous")
            .timestamp_millis()
    }

    #[test]
    fn now_is_truncated_to_the_quarter_hour() {
        let grid = afternoon_grid();
        assert_eq!(grid.now_ms(), ms(14, 0, 1));
        assert_eq!(grid.start_ms(), ms(14, 0, 1) - DAY_MS);
        assert_eq!(grid.midnight_ms(), ms(0, 0, 1));

        let on_grid = cet()
            .with_ymd_and_hms(2024, 6, 1, 14, 45, 0)
            .single()
            .expect("unambiguous");
        assert_eq!(TimeGrid::new(&on_grid).now_ms(), ms(14, 45, 1));
    }

    #[test]
    fn grid_has_96_ascending_instants_before_now() {
        let grid = afternoon_grid();
        let ts: std::vec::Vec<i64> = grid.timestamps().collect();
        assert_eq!(ts.len(), BUCKET_COUNT);
        assert_eq!(ts[0], grid.start_ms());
        assert_eq!(ts[95], grid.now_ms() - BUCKET_MS);
        assert!(ts.windows(2).all(|w| w[1] - w[0] == BUCKET_MS));
    }

    #[test]
    fn midnight_index_counts_yesterday_slots() {
        // 14:00 now: yesterday covers 14:00..23:45, i.e. 40 slots.
        assert_eq!(afternoon_grid().midnight_index(), 40);
    }

    #[test]
    fn missing_and_negative_samples_become_zero() {
        let grid = afternoon_grid();
        let mut raw = RawSamples::new();
        raw.insert(grid.start_ms(), -3.0);
        raw.insert(grid.start_ms() + BUCKET_MS, f64::NAN);
        raw.insert(grid.start_ms() + 2 * BUCKET_MS, 1.5);

        let values = grid.bucketize(&raw, WindowStart::Rolling24h);
        assert_eq!(values.all[0], 0.0);
        assert_eq!(values.all[1], 0.0);
        assert_eq!(values.all[2], 1.5);
        assert!(values.all[3..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn samples_off_the_grid_or_outside_the_window_are_ignored() {
        let grid = afternoon_grid();
        let mut raw = RawSamples::new();
        raw.insert(grid.now_ms(), 9.0);
        raw.insert(grid.start_ms() - BUCKET_MS, 9.0);
        raw.insert(grid.start_ms() + 1, 9.0);

        let values = grid.bucketize(&raw, WindowStart::Rolling24h);
        assert_eq!(values, BucketValues::zeroed());
    }

    #[test]
    fn today_and_yesterday_partition_the_rolling_window() {
        let grid = afternoon_grid();
        let raw: RawSamples = grid
            .timestamps()
            .enumerate()
            .map(|(i, t)| (t, 1.0 + i as f64))
            .collect();

        let values = grid.bucketize(&raw, WindowStart::Rolling24h);
        let split = grid.midnight_index();
        for i in 0..BUCKET_COUNT {
            assert!(values.today[i] == 0.0 || values.yesterday[i] == 0.0, "slot {i}");
            assert_eq!(values.today[i] + values.yesterday[i], values.all[i], "slot {i}");
            if i < split {
                assert_eq!(values.today[i], 0.0, "slot {i}");
            } else {
                assert_eq!(values.yesterday[i], 0.0, "slot {i}");
            }
        }
    }

    #[test]
    fn today_window_blanks_only_the_all_view() {
        let grid = afternoon_grid();
        let raw: RawSamples = grid.timestamps().map(|t| (t, 2.0)).collect();

        let rolling = grid.bucketize(&raw, WindowStart::Rolling24h);
        let today = grid.bucketize(&raw, WindowStart::Today);
        let split = grid.midnight_index();

        assert!(today.all[..split].iter().all(|&v| v == 0.0));
        assert!(today.all[split..].iter().all(|&v| v == 2.0));
        assert_eq!(today.today, rolling.today);
        assert_eq!(today.yesterday, rolling.yesterday);
    }

    #[test]
    fn series_summaries_follow_the_all_view() {
        let grid = afternoon_grid();
        let raw: RawSamples = grid
            .timestamps()
            .enumerate()
            .map(|(i, t)| (t, if i % 2 == 0 { 0.25 } else { -1.0 }))
            .collect();

        let series = BucketedSeries::new(grid.bucketize(&raw, WindowStart::Rolling24h), css::RED);
        assert_eq!(series.values_sum(), series.values().all.iter().sum::<f64>());
        assert_eq!(series.values_sum(), 12.0);
        assert_eq!(series.values_last(), series.values().all[BUCKET_COUNT - 1]);
        assert_eq!(series.values_last(), 0.0);
        assert_eq!(series.color(), css::RED);
    }

    #[test]
    fn empty_samples_produce_an_all_zero_series() {
        let grid = afternoon_grid();
        let series = BucketedSeries::new(
            grid.bucketize(&RawSamples::new(), WindowStart::Today),
            css::ORANGE,
        );
        assert_eq!(series.values(), &BucketValues::zeroed());
        assert_eq!(series.values_sum(), 0.0);
        assert_eq!(series.values_last(), 0.0);
    }

    #[test]
    fn skipped_midnight_starts_the_day_after_the_gap() {
        // Santiago moves from 00:00 -04 to 01:00 -03 on 2024-09-08.
        let tz = chrono_tz::America::Santiago;
        let now = tz
            .with_ymd_and_hms(2024, 9, 8, 14, 0, 0)
            .single()
            .expect("unambiguous");
        let day_start = tz
            .with_ymd_and_hms(2024, 9, 8, 1, 0, 0)
            .single()
            .expect("unambiguous");
        let late_yesterday = tz
            .with_ymd_and_hms(2024, 9, 7, 23, 0, 0)
            .single()
            .expect("unambiguous");

        let grid = TimeGrid::new(&now);
        assert_eq!(grid.midnight_ms(), day_start.timestamp_millis());
        // 13:00 -04 up to 01:00 -03 is eleven real hours.
        assert_eq!(grid.midnight_index(), 44);

        let mut raw = RawSamples::new();
        raw.insert(late_yesterday.timestamp_millis(), 5.0);
        let values = grid.bucketize(&raw, WindowStart::Rolling24h);
        assert_eq!(values.yesterday.iter().sum::<f64>(), 5.0);
        assert_eq!(values.today.iter().sum::<f64>(), 0.0);
    }

    #[test]
    fn grid_shortly_after_midnight_is_mostly_yesterday() {
        let now = cet()
            .with_ymd_and_hms(2024, 6, 2, 0, 20, 0)
            .single()
            .expect("unambiguous");
        let grid = TimeGrid::new(&now);
        assert_eq!(grid.now_ms(), ms(0, 15, 2));
        assert_eq!(grid.midnight_ms(), ms(0, 0, 2));
        assert_eq!(grid.midnight_index(), 95);
    }
}
