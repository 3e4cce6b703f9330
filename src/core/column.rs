use std::hash::Hasher;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::extra_store::ExtraStore;
use crate::core::primitives::{
    datetime_to_unix_seconds, decimal_to_f64, ensure_finite, hash_values,
};
use crate::core::series::{self, SeriesCollector, SeriesEntry};
use crate::error::ChartResult;

/// Single column value at `x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnEntry {
    pub x: f64,
    pub y: f64,
}

impl ColumnEntry {
    pub fn new(x: f64, y: f64) -> ChartResult<Self> {
        Ok(Self {
            x: ensure_finite(x, "column x")?,
            y: ensure_finite(y, "column y")?,
        })
    }

    pub fn from_decimal_time(time: DateTime<Utc>, value: Decimal) -> ChartResult<Self> {
        Self::new(
            datetime_to_unix_seconds(time),
            decimal_to_f64(value, "column value")?,
        )
    }
}

impl SeriesEntry for ColumnEntry {
    fn x(&self) -> f64 {
        self.x
    }

    fn hash_content<H: Hasher>(&self, state: &mut H) {
        hash_values(state, [self.x, self.y]);
    }
}

/// Raw column series, validated and sorted but without computed statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPartial {
    series: Vec<Vec<ColumnEntry>>,
}

impl ColumnPartial {
    #[must_use]
    pub fn builder() -> ColumnPartialBuilder {
        ColumnPartialBuilder {
            collector: SeriesCollector::new(),
        }
    }

    #[must_use]
    pub fn series(&self) -> &[Vec<ColumnEntry>] {
        &self.series
    }

    #[must_use]
    pub fn content_hash(&self) -> u64 {
        series::content_hash("column", &self.series)
    }

    /// Computes bounds, stacking aggregates and the x-step.
    #[must_use]
    pub fn complete(&self, extras: ExtraStore) -> ColumnLayerModel {
        let (min_x, max_x) = series::x_bounds(&self.series);
        let (min_y, max_y) = self
            .series
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), entry| {
                (min.min(entry.y), max.max(entry.y))
            });
        let (min_aggregate_y, max_aggregate_y) = stacked_bounds(&self.series);

        ColumnLayerModel {
            data: Arc::new(ColumnModelData {
                id: self.content_hash(),
                series: self.series.clone(),
                min_x,
                max_x,
                min_y,
                max_y,
                min_aggregate_y,
                max_aggregate_y,
                x_delta_gcd: series::x_delta_gcd(&self.series),
            }),
            extras,
        }
    }
}

/// Builder returned by [`ColumnPartial::builder`].
#[derive(Debug)]
pub struct ColumnPartialBuilder {
    collector: SeriesCollector<ColumnEntry>,
}

impl ColumnPartialBuilder {
    /// Adds a series whose x values are the indices of `ys`.
    #[must_use]
    pub fn series(mut self, ys: impl IntoIterator<Item = f64>) -> Self {
        self.collector
            .push(series::indexed(ys.into_iter().collect(), ColumnEntry::new));
        self
    }

    #[must_use]
    pub fn series_xy(
        mut self,
        xs: impl IntoIterator<Item = f64>,
        ys: impl IntoIterator<Item = f64>,
    ) -> Self {
        self.collector.push(series::zip_xy(
            xs.into_iter().collect(),
            ys.into_iter().collect(),
            ColumnEntry::new,
        ));
        self
    }

    #[must_use]
    pub fn series_entries(mut self, entries: Vec<ColumnEntry>) -> Self {
        self.collector.push(
            entries
                .into_iter()
                .map(|entry| ColumnEntry::new(entry.x, entry.y))
                .collect(),
        );
        self
    }

    pub fn build(self) -> ChartResult<ColumnPartial> {
        Ok(ColumnPartial {
            series: self.collector.finish()?,
        })
    }
}

/// Per-x signed running sums.
///
/// Positive values stack upward into one bucket total, negative values
/// downward into another. The result is `(min negative total, max positive
/// total)`. Entries sharing an x inside a single series are summed like any
/// other same-x contribution.
fn stacked_bounds(series: &[Vec<ColumnEntry>]) -> (f64, f64) {
    let mut buckets: IndexMap<OrderedFloat<f64>, (f64, f64)> = IndexMap::new();
    for entry in series.iter().flatten() {
        let (negative, positive) = buckets.entry(OrderedFloat(entry.x)).or_default();
        if entry.y < 0.0 {
            *negative += entry.y;
        } else {
            *positive += entry.y;
        }
    }
    buckets
        .values()
        .fold((0.0_f64, 0.0_f64), |(min, max), (negative, positive)| {
            (min.min(*negative), max.max(*positive))
        })
}

#[derive(Debug, PartialEq)]
struct ColumnModelData {
    id: u64,
    series: Vec<Vec<ColumnEntry>>,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
    min_aggregate_y: f64,
    max_aggregate_y: f64,
    x_delta_gcd: Option<f64>,
}

/// Completed column layer. Statistics are shared between copies.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayerModel {
    data: Arc<ColumnModelData>,
    extras: ExtraStore,
}

impl ColumnLayerModel {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.data.id
    }

    #[must_use]
    pub fn series(&self) -> &[Vec<ColumnEntry>] {
        &self.data.series
    }

    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.data.min_x
    }

    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.data.max_x
    }

    #[must_use]
    pub fn min_y(&self) -> f64 {
        self.data.min_y
    }

    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.data.max_y
    }

    /// Lowest per-x sum of negative values (`<= 0`).
    #[must_use]
    pub fn min_aggregate_y(&self) -> f64 {
        self.data.min_aggregate_y
    }

    /// Highest per-x sum of non-negative values (`>= 0`).
    #[must_use]
    pub fn max_aggregate_y(&self) -> f64 {
        self.data.max_aggregate_y
    }

    #[must_use]
    pub fn x_delta_gcd(&self) -> Option<f64> {
        self.data.x_delta_gcd
    }

    #[must_use]
    pub fn extras(&self) -> &ExtraStore {
        &self.extras
    }

    #[must_use]
    pub fn with_extras(&self, extras: ExtraStore) -> Self {
        Self {
            data: Arc::clone(&self.data),
            extras,
        }
    }
}
