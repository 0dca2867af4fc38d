// Copyright 2025 the Wattring Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The boundary to whatever supplies raw samples.
//!
//! Fetching is not done here. A [`SeriesSource`] receives the catalog's queries with their
//! placeholders already expanded and hands back one [`RawSamples`] per query.
//! [`load_series`] turns that into a [`SeriesSet`], degrading to "unavailable" instead of
//! failing when the source does.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::bucket::{BUCKET_MINUTES, BUCKET_MS, BucketedSeries, RawSamples, TimeGrid, WindowStart};
use crate::series::{SeriesCatalog, SeriesSet};

/// Placeholder replaced with the queried time range.
pub const TIME_RANGE_PLACEHOLDER: &str = "${time-range}";

/// Placeholder replaced with the grouping interval.
pub const TIME_INTERVAL_PLACEHOLDER: &str = "${time-interval}";

/// Why a source could not deliver samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceError {
    /// The source could not be reached or refused the request.
    Unavailable(String),
    /// The source answered with something that is not a result set.
    Malformed(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "series source unavailable: {reason}"),
            Self::Malformed(reason) => write!(f, "malformed series response: {reason}"),
        }
    }
}

impl core::error::Error for SourceError {}

/// Supplies raw samples for a batch of queries.
pub trait SeriesSource {
    /// Runs `queries` and returns one sample map per query, in the same order.
    ///
    /// A query without data should yield an empty map rather than an error.
    fn fetch(&self, queries: &[String]) -> Result<Vec<RawSamples>, SourceError>;
}

/// The instant range queried for one render.
///
/// It starts two slots before the grid so differencing queries have a value to subtract from
/// for the first slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryWindow {
    /// Inclusive start in milliseconds.
    pub start_ms: i64,
    /// Inclusive end in milliseconds.
    pub end_ms: i64,
}

impl QueryWindow {
    /// The window covering `grid`.
    pub fn from_grid(grid: &TimeGrid) -> Self {
        Self {
            start_ms: grid.start_ms() - 2 * BUCKET_MS,
            end_ms: grid.now_ms(),
        }
    }

    /// Replaces the time placeholders in `query`.
    ///
    /// Placeholders are matched ignoring ASCII case.
    pub fn expand(&self, query: &str) -> String {
        let range = alloc::format!(
            " (time >= {}ms AND time <= {}ms) ",
            self.start_ms, self.end_ms
        );
        let interval = alloc::format!(" time({BUCKET_MINUTES}m) ");
        let query = replace_ignore_ascii_case(query, TIME_RANGE_PLACEHOLDER, &range);
        replace_ignore_ascii_case(&query, TIME_INTERVAL_PLACEHOLDER, &interval)
    }
}

/// Replaces every occurrence of the ASCII `needle` in `haystack`, ignoring ASCII case.
fn replace_ignore_ascii_case(haystack: &str, needle: &str, with: &str) -> String {
    let bytes = haystack.as_bytes();
    let needle = needle.as_bytes();
    let mut out = String::with_capacity(haystack.len());
    let mut copied = 0;
    let mut i = 0;
    while i + needle.len() <= bytes.len() {
        // A match is all ASCII, so both ends sit on char boundaries.
        if bytes[i..i + needle.len()].eq_ignore_ascii_case(needle) {
            out.push_str(&haystack[copied..i]);
            out.push_str(with);
            i += needle.len();
            copied = i;
        } else {
            i += 1;
        }
    }
    out.push_str(&haystack[copied..]);
    out
}

/// Fetches and buckets every series of `catalog`.
///
/// Returns `None` if the source fails as a whole. Results are matched to catalog entries by
/// position; missing trailing results read as empty, extra ones are ignored.
pub fn load_series<S: SeriesSource + ?Sized>(
    source: &S,
    catalog: &SeriesCatalog,
    grid: TimeGrid,
    window: WindowStart,
) -> Option<SeriesSet> {
    let query_window = QueryWindow::from_grid(&grid);
    let queries: Vec<String> = catalog
        .entries()
        .iter()
        .map(|entry| query_window.expand(&entry.definition.query))
        .collect();

    let mut results = match source.fetch(&queries) {
        Ok(results) => results,
        Err(err) => {
            log::warn!("{err}");
            return None;
        }
    };
    if results.len() < queries.len() {
        log::warn!(
            "series source returned {} results for {} queries; treating the rest as empty",
            results.len(),
            queries.len()
        );
        results.resize_with(queries.len(), RawSamples::default);
    }

    let mut set = SeriesSet::new(grid, window);
    for (entry, raw) in catalog.entries().iter().zip(&results) {
        let series = BucketedSeries::new(grid.bucketize(raw, window), entry.definition.color);
        log::debug!(
            "{}/{}: {} samples, sum {:.3}, last {:.3}",
            entry.device,
            entry.measurement,
            raw.len(),
            series.values_sum(),
            series.values_last()
        );
        set.push(entry.key(), series);
    }
    Some(set)
}
