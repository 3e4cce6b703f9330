//! Randomized layer data for demos, tests and benchmarks.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::{CandlestickPartial, ColumnPartial, LayerPartial, LinePartial, PiePartial};
use crate::error::{ChartError, ChartResult};

/// Longest x progression a generator accepts.
pub const MAX_PROGRESSION_LEN: usize = 1_000_000;

/// Produces series with random y values over a fixed x progression.
///
/// Every series has one entry per x of the progression. Seeded generators are
/// reproducible.
#[derive(Debug, Clone)]
pub struct RandomEntriesGenerator {
    x_start: f64,
    x_end: f64,
    x_step: f64,
    y_min: f64,
    y_max: f64,
    rng: StdRng,
}

fn step_count(x_start: f64, x_end: f64, x_step: f64) -> f64 {
    ((x_end - x_start) / x_step + 1e-9).floor()
}

fn invalid(name: &'static str, value: f64) -> ChartError {
    ChartError::InvalidParameter { name, value }
}

impl RandomEntriesGenerator {
    /// `x_range` is walked from its start by `x_step`, including the end when
    /// it lands on a step.
    pub fn new(
        x_range: RangeInclusive<f64>,
        x_step: f64,
        y_range: RangeInclusive<f64>,
    ) -> ChartResult<Self> {
        let (x_start, x_end) = x_range.into_inner();
        let (y_min, y_max) = y_range.into_inner();
        if !x_step.is_finite() || x_step <= 0.0 {
            return Err(invalid("x step", x_step));
        }
        if !x_start.is_finite() || !x_end.is_finite() || x_end < x_start {
            return Err(invalid("x range end", x_end));
        }
        if !y_min.is_finite() || !y_max.is_finite() || y_max < y_min {
            return Err(invalid("y range max", y_max));
        }
        let len = step_count(x_start, x_end, x_step) + 1.0;
        if len > MAX_PROGRESSION_LEN as f64 {
            return Err(invalid("x progression length", len));
        }

        Ok(Self {
            x_start,
            x_end,
            x_step,
            y_min,
            y_max,
            rng: StdRng::from_rng(&mut rand::rng()),
        })
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn xs(&self) -> Vec<f64> {
        let steps = step_count(self.x_start, self.x_end, self.x_step) as usize;
        (0..=steps)
            .map(|index| self.x_start + index as f64 * self.x_step)
            .collect()
    }

    fn random_y(&mut self) -> f64 {
        self.rng.random_range(self.y_min..=self.y_max)
    }

    /// One random y per x.
    pub fn random_ys(&mut self) -> Vec<f64> {
        let len = self.xs().len();
        (0..len).map(|_| self.random_y()).collect()
    }

    pub fn column_partial(&mut self, series_count: usize) -> ChartResult<ColumnPartial> {
        let xs = self.xs();
        let mut builder = ColumnPartial::builder();
        for _ in 0..series_count {
            builder = builder.series_xy(xs.iter().copied(), self.random_ys());
        }
        builder.build()
    }

    pub fn line_partial(&mut self, series_count: usize) -> ChartResult<LinePartial> {
        let xs = self.xs();
        let mut builder = LinePartial::builder();
        for _ in 0..series_count {
            builder = builder.series_xy(xs.iter().copied(), self.random_ys());
        }
        builder.build()
    }

    /// Candles whose wicks stay inside the y-range and enclose the body.
    pub fn candlestick_partial(&mut self) -> ChartResult<CandlestickPartial> {
        let xs = self.xs();
        let len = xs.len();
        let mut opening = Vec::with_capacity(len);
        let mut closing = Vec::with_capacity(len);
        let mut low = Vec::with_capacity(len);
        let mut high = Vec::with_capacity(len);
        for _ in 0..len {
            let open = self.random_y();
            let close = self.random_y();
            opening.push(open);
            closing.push(close);
            low.push(self.rng.random_range(self.y_min..=open.min(close)));
            high.push(self.rng.random_range(open.max(close)..=self.y_max));
        }
        CandlestickPartial::builder()
            .series_ohlc(&xs, &opening, &closing, &low, &high)
            .build()
    }

    /// Slices with values drawn from the non-negative part of the y-range.
    pub fn pie_partial(&mut self, series_count: usize) -> ChartResult<PiePartial> {
        let (min, max) = (self.y_min.max(0.0), self.y_max.max(0.0));
        let len = self.xs().len();
        let mut builder = PiePartial::builder();
        for _ in 0..series_count {
            let values: Vec<f64> = (0..len).map(|_| self.rng.random_range(min..=max)).collect();
            builder = builder.series(values);
        }
        builder.build()
    }

    /// Column, line and candlestick layers over the same progression.
    pub fn random_chart_partials(&mut self) -> ChartResult<Vec<LayerPartial>> {
        Ok(vec![
            self.column_partial(2)?.into(),
            self.line_partial(1)?.into(),
            self.candlestick_partial()?.into(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::{MAX_PROGRESSION_LEN, RandomEntriesGenerator};

    #[test]
    fn progression_includes_end_on_step() {
        let generator = RandomEntriesGenerator::new(0.0..=1.0, 0.25, 0.0..=1.0).expect("valid");
        assert_eq!(generator.xs(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn same_seed_reproduces_values() {
        let make = || {
            RandomEntriesGenerator::new(0.0..=10.0, 1.0, -5.0..=5.0)
                .expect("valid")
                .with_seed(7)
        };
        assert_eq!(make().random_ys(), make().random_ys());
    }

    #[test]
    fn rejects_progressions_past_the_length_limit() {
        assert!(RandomEntriesGenerator::new(0.0..=1e12, 1e-3, 0.0..=1.0).is_err());
        let longest = (MAX_PROGRESSION_LEN - 1) as f64;
        let generator = RandomEntriesGenerator::new(0.0..=longest, 1.0, 0.0..=1.0).expect("valid");
        assert_eq!(generator.xs().len(), MAX_PROGRESSION_LEN);
    }

    #[test]
    fn rejects_non_positive_step() {
        assert!(RandomEntriesGenerator::new(0.0..=1.0, 0.0, 0.0..=1.0).is_err());
        assert!(RandomEntriesGenerator::new(1.0..=0.0, 1.0, 0.0..=1.0).is_err());
    }
}
