// Copyright 2025 the Wattring Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported for chart specs that break a renderer precondition.

use core::fmt;

/// A chart spec that cannot be rendered.
///
/// These are programmer errors: callers are expected to build specs that satisfy the
/// documented preconditions. Renderers report them instead of drawing garbage.
#[derive(Clone, Debug, PartialEq)]
pub enum ChartError {
    /// A donut `max_value` or timeline `max_sum` that is zero, negative or not finite.
    InvalidMaxValue(f64),
    /// A timeline series whose value count differs from the first series.
    MismatchedSeriesLength {
        /// Position of the offending series in declaration order.
        series: usize,
        /// Value count of the first series.
        expected: usize,
        /// Value count of the offending series.
        found: usize,
    },
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMaxValue(v) => write!(f, "chart maximum must be positive, got {v}"),
            Self::MismatchedSeriesLength {
                series,
                expected,
                found,
            } => write!(
                f,
                "timeline series {series} has {found} values, expected {expected}"
            ),
        }
    }
}

impl core::error::Error for ChartError {}

/// Returns `value` if it can scale a chart, otherwise [`ChartError::InvalidMaxValue`].
pub(crate) fn positive_max(value: f64) -> Result<f64, ChartError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ChartError::InvalidMaxValue(value))
    }
}
