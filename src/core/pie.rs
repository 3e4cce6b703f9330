use std::hash::Hasher;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::extra_store::ExtraStore;
use crate::core::primitives::hash_values;
use crate::core::series::{self, SeriesCollector, SeriesEntry};
use crate::error::{ChartError, ChartResult};

/// Pie slice. `x` is the slice index inside its series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub x: f64,
    pub value: f64,
}

impl PieSlice {
    pub fn new(x: f64, value: f64) -> ChartResult<Self> {
        if !x.is_finite() || !value.is_finite() {
            return Err(ChartError::InvalidData(
                "pie slice values must be finite".to_owned(),
            ));
        }
        if value < 0.0 {
            return Err(ChartError::InvalidData(
                "pie slice value must be >= 0".to_owned(),
            ));
        }
        Ok(Self { x, value })
    }
}

impl SeriesEntry for PieSlice {
    fn x(&self) -> f64 {
        self.x
    }

    fn hash_content<H: Hasher>(&self, state: &mut H) {
        hash_values(state, [self.x, self.value]);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PiePartial {
    series: Vec<Vec<PieSlice>>,
}

impl PiePartial {
    #[must_use]
    pub fn builder() -> PiePartialBuilder {
        PiePartialBuilder {
            collector: SeriesCollector::new(),
        }
    }

    #[must_use]
    pub fn series(&self) -> &[Vec<PieSlice>] {
        &self.series
    }

    #[must_use]
    pub fn content_hash(&self) -> u64 {
        series::content_hash("pie", &self.series)
    }

    #[must_use]
    pub fn complete(&self, extras: ExtraStore) -> PieLayerModel {
        let (min_x, max_x) = series::x_bounds(&self.series);
        let (min_y, max_y, sum) = self.series.iter().flatten().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), slice| (min.min(slice.value), max.max(slice.value), sum + slice.value),
        );

        PieLayerModel {
            data: Arc::new(PieModelData {
                id: self.content_hash(),
                series: self.series.clone(),
                min_x,
                max_x,
                min_y,
                max_y,
                sum,
                x_delta_gcd: series::x_delta_gcd(&self.series),
            }),
            extras,
        }
    }
}

#[derive(Debug)]
pub struct PiePartialBuilder {
    collector: SeriesCollector<PieSlice>,
}

impl PiePartialBuilder {
    /// Adds a ring of slices indexed in the given order.
    #[must_use]
    pub fn series(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.collector
            .push(series::indexed(values.into_iter().collect(), PieSlice::new));
        self
    }

    pub fn build(self) -> ChartResult<PiePartial> {
        Ok(PiePartial {
            series: self.collector.finish()?,
        })
    }
}

#[derive(Debug, PartialEq)]
struct PieModelData {
    id: u64,
    series: Vec<Vec<PieSlice>>,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
    sum: f64,
    x_delta_gcd: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieLayerModel {
    data: Arc<PieModelData>,
    extras: ExtraStore,
}

impl PieLayerModel {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.data.id
    }

    #[must_use]
    pub fn series(&self) -> &[Vec<PieSlice>] {
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

    /// Total of every slice value across all series.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.data.sum
    }

    /// Total of the slice values in one series (ring).
    #[must_use]
    pub fn series_sum(&self, index: usize) -> f64 {
        self.data
            .series
            .get(index)
            .map_or(0.0, |slices| slices.iter().map(|slice| slice.value).sum())
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
