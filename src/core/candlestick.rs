use std::hash::Hasher;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::extra_store::ExtraStore;
use crate::core::primitives::{datetime_to_unix_seconds, decimal_to_f64, hash_values};
use crate::core::series::{self, SeriesCollector, SeriesEntry};
use crate::error::{ChartError, ChartResult};

/// Direction of a price move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandleChange {
    Increase,
    Decrease,
    Zero,
}

impl CandleChange {
    #[must_use]
    pub fn between(from: f64, to: f64) -> Self {
        if to > from {
            Self::Increase
        } else if to < from {
            Self::Decrease
        } else {
            Self::Zero
        }
    }
}

/// Canonical OHLC candle.
///
/// `absolute_change` compares `closing` with `opening`. `relative_change`
/// compares `closing` with the previous candle's `closing` in the same series
/// and is filled in when the series is built; a standalone entry (or the first
/// of a series) uses its own `opening`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandlestickEntry {
    pub x: f64,
    pub opening: f64,
    pub closing: f64,
    pub low: f64,
    pub high: f64,
    pub absolute_change: CandleChange,
    pub relative_change: CandleChange,
}

impl CandlestickEntry {
    /// Builds a validated candle.
    ///
    /// Invariants:
    /// - all values are finite
    /// - `low <= min(opening, closing)`
    /// - `high >= max(opening, closing)`
    pub fn new(x: f64, opening: f64, closing: f64, low: f64, high: f64) -> ChartResult<Self> {
        if !x.is_finite()
            || !opening.is_finite()
            || !closing.is_finite()
            || !low.is_finite()
            || !high.is_finite()
        {
            return Err(ChartError::InvalidData(
                "candlestick values must be finite".to_owned(),
            ));
        }

        if low > opening.min(closing) || high < opening.max(closing) {
            return Err(ChartError::InvalidData(
                "candlestick low/high must enclose opening and closing".to_owned(),
            ));
        }

        let absolute_change = CandleChange::between(opening, closing);
        Ok(Self {
            x,
            opening,
            closing,
            low,
            high,
            absolute_change,
            relative_change: absolute_change,
        })
    }

    pub fn from_decimal_time(
        time: DateTime<Utc>,
        opening: Decimal,
        closing: Decimal,
        low: Decimal,
        high: Decimal,
    ) -> ChartResult<Self> {
        Self::new(
            datetime_to_unix_seconds(time),
            decimal_to_f64(opening, "opening")?,
            decimal_to_f64(closing, "closing")?,
            decimal_to_f64(low, "low")?,
            decimal_to_f64(high, "high")?,
        )
    }
}

impl SeriesEntry for CandlestickEntry {
    fn x(&self) -> f64 {
        self.x
    }

    fn hash_content<H: Hasher>(&self, state: &mut H) {
        hash_values(state, [self.x, self.opening, self.closing, self.low, self.high]);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandlestickPartial {
    series: Vec<Vec<CandlestickEntry>>,
}

impl CandlestickPartial {
    #[must_use]
    pub fn builder() -> CandlestickPartialBuilder {
        CandlestickPartialBuilder {
            collector: SeriesCollector::new(),
        }
    }

    #[must_use]
    pub fn series(&self) -> &[Vec<CandlestickEntry>] {
        &self.series
    }

    #[must_use]
    pub fn content_hash(&self) -> u64 {
        series::content_hash("candlestick", &self.series)
    }

    #[must_use]
    pub fn complete(&self, extras: ExtraStore) -> CandlestickLayerModel {
        let (min_x, max_x) = series::x_bounds(&self.series);
        let (min_y, max_y) = self
            .series
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), entry| {
                (min.min(entry.low), max.max(entry.high))
            });

        CandlestickLayerModel {
            data: Arc::new(CandlestickModelData {
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
pub struct CandlestickPartialBuilder {
    collector: SeriesCollector<CandlestickEntry>,
}

impl CandlestickPartialBuilder {
    /// Adds a series from parallel OHLC columns.
    #[must_use]
    pub fn series_ohlc(
        mut self,
        xs: &[f64],
        opening: &[f64],
        closing: &[f64],
        low: &[f64],
        high: &[f64],
    ) -> Self {
        let len = xs.len();
        let result = if [opening.len(), closing.len(), low.len(), high.len()]
            .iter()
            .any(|other| *other != len)
        {
            Err(ChartError::InvalidData(format!(
                "ohlc columns must share length {len}"
            )))
        } else {
            (0..len)
                .map(|index| {
                    CandlestickEntry::new(
                        xs[index],
                        opening[index],
                        closing[index],
                        low[index],
                        high[index],
                    )
                })
                .collect()
        };
        self.collector.push(result);
        self
    }

    #[must_use]
    /// Entries are revalidated and their `absolute_change` recomputed.
    pub fn series_entries(mut self, entries: Vec<CandlestickEntry>) -> Self {
        self.collector.push(
            entries
                .into_iter()
                .map(|entry| {
                    CandlestickEntry::new(
                        entry.x,
                        entry.opening,
                        entry.closing,
                        entry.low,
                        entry.high,
                    )
                })
                .collect(),
        );
        self
    }

    pub fn build(self) -> ChartResult<CandlestickPartial> {
        let mut series = self.collector.finish()?;
        for entries in &mut series {
            let mut previous_closing = None;
            for entry in entries.iter_mut() {
                let reference = previous_closing.unwrap_or(entry.opening);
                entry.relative_change = CandleChange::between(reference, entry.closing);
                previous_closing = Some(entry.closing);
            }
        }
        Ok(CandlestickPartial { series })
    }
}

#[derive(Debug, PartialEq)]
struct CandlestickModelData {
    id: u64,
    series: Vec<Vec<CandlestickEntry>>,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
    x_delta_gcd: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandlestickLayerModel {
    data: Arc<CandlestickModelData>,
    extras: ExtraStore,
}

impl CandlestickLayerModel {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.data.id
    }

    #[must_use]
    pub fn series(&self) -> &[Vec<CandlestickEntry>] {
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

    /// Lowest `low` across every candle.
    #[must_use]
    pub fn min_y(&self) -> f64 {
        self.data.min_y
    }

    /// Highest `high` across every candle.
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
