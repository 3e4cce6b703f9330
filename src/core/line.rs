use std::hash::Hasher;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::extra_store::ExtraStore;
use crate::core::primitives::{
    datetime_to_unix_seconds, decimal_to_f64, ensure_finite, hash_values,
};
use crate::core::series::{self, SeriesCollector, SeriesEntry};
use crate::error::ChartResult;

/// Single line point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineEntry {
    pub x: f64,
    pub y: f64,
}

impl LineEntry {
    pub fn new(x: f64, y: f64) -> ChartResult<Self> {
        Ok(Self {
            x: ensure_finite(x, "line x")?,
            y: ensure_finite(y, "line y")?,
        })
    }

    pub fn from_decimal_time(time: DateTime<Utc>, value: Decimal) -> ChartResult<Self> {
        Self::new(
            datetime_to_unix_seconds(time),
            decimal_to_f64(value, "line value")?,
        )
    }
}

impl SeriesEntry for LineEntry {
    fn x(&self) -> f64 {
        self.x
    }

    fn hash_content<H: Hasher>(&self, state: &mut H) {
        hash_values(state, [self.x, self.y]);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinePartial {
    series: Vec<Vec<LineEntry>>,
}

impl LinePartial {
    #[must_use]
    pub fn builder() -> LinePartialBuilder {
        LinePartialBuilder {
            collector: SeriesCollector::new(),
        }
    }

    #[must_use]
    pub fn series(&self) -> &[Vec<LineEntry>] {
        &self.series
    }

    #[must_use]
    pub fn content_hash(&self) -> u64 {
        series::content_hash("line", &self.series)
    }

    #[must_use]
    pub fn complete(&self, extras: ExtraStore) -> LineLayerModel {
        let (min_x, max_x) = series::x_bounds(&self.series);
        let (min_y, max_y) = self
            .series
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), entry| {
                (min.min(entry.y), max.max(entry.y))
            });

        LineLayerModel {
            data: Arc::new(LineModelData {
                id: self.content_hash(),
                series: self.series.clone(),
                min_x,
                max_x,
                min_y,
                max_y,
                x_delta_gcd: series::x_delta_gcd(&self.series),
            }),
            extras,
        }
    }
}

#[derive(Debug)]
pub struct LinePartialBuilder {
    collector: SeriesCollector<LineEntry>,
}

impl LinePartialBuilder {
    /// Adds a series whose x values are the indices of `ys`.
    #[must_use]
    pub fn series(mut self, ys: impl IntoIterator<Item = f64>) -> Self {
        self.collector
            .push(series::indexed(ys.into_iter().collect(), LineEntry::new));
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
            LineEntry::new,
        ));
        self
    }

    #[must_use]
    pub fn series_entries(mut self, entries: Vec<LineEntry>) -> Self {
        self.collector.push(
            entries
                .into_iter()
                .map(|entry| LineEntry::new(entry.x, entry.y))
                .collect(),
        );
        self
    }

    pub fn build(self) -> ChartResult<LinePartial> {
        Ok(LinePartial {
            series: self.collector.finish()?,
        })
    }
}

#[derive(Debug, PartialEq)]
struct LineModelData {
    id: u64,
    series: Vec<Vec<LineEntry>>,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
    x_delta_gcd: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineLayerModel {
    data: Arc<LineModelData>,
    extras: ExtraStore,
}

impl LineLayerModel {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.data.id
    }

    #[must_use]
    pub fn series(&self) -> &[Vec<LineEntry>] {
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
