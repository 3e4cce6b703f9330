use std::hash::Hasher;

use crate::core::primitives::fold_gcd;
use crate::error::{ChartError, ChartResult};

/// Shared view of an entry positioned on the x axis.
pub trait SeriesEntry: Copy {
    fn x(&self) -> f64;

    /// Feeds every coordinate of the entry into a structural hash.
    fn hash_content<H: Hasher>(&self, state: &mut H);
}

/// Sorts a series by ascending `x`, keeping the relative order of equal xs.
pub(crate) fn sort_by_x<E: SeriesEntry>(entries: &mut [E]) {
    entries.sort_by(|left, right| left.x().total_cmp(&right.x()));
}

/// Checks the "at least one series, no empty series" invariant.
pub(crate) fn validate_series<E>(series: &[Vec<E>]) -> ChartResult<()> {
    if series.is_empty() {
        return Err(ChartError::NoSeries);
    }
    if let Some(index) = series.iter().position(Vec::is_empty) {
        return Err(ChartError::EmptySeries { index });
    }
    Ok(())
}

/// Inclusive x-bounds over all series. Callers guarantee a non-empty input.
pub(crate) fn x_bounds<E: SeriesEntry>(series: &[Vec<E>]) -> (f64, f64) {
    series
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), entry| {
            (min.min(entry.x()), max.max(entry.x()))
        })
}

/// GCD of consecutive x-deltas, folded across every series.
pub(crate) fn x_delta_gcd<E: SeriesEntry>(series: &[Vec<E>]) -> Option<f64> {
    series
        .iter()
        .flat_map(|entries| entries.windows(2).map(|pair| pair[1].x() - pair[0].x()))
        .fold(None, fold_gcd)
}

pub(crate) fn content_hash<E: SeriesEntry>(kind: &str, series: &[Vec<E>]) -> u64 {
    let mut hasher = std::hash::DefaultHasher::new();
    hasher.write(kind.as_bytes());
    for entries in series {
        hasher.write_usize(entries.len());
        for entry in entries {
            entry.hash_content(&mut hasher);
        }
    }
    hasher.finish()
}

/// Accumulates series for a partial builder.
///
/// The first error is kept and reported by `finish`, so builder calls can be
/// chained without intermediate `?`.
#[derive(Debug)]
pub(crate) struct SeriesCollector<E> {
    series: Vec<Vec<E>>,
    error: Option<ChartError>,
}

impl<E: SeriesEntry> SeriesCollector<E> {
    pub(crate) fn new() -> Self {
        Self {
            series: Vec::new(),
            error: None,
        }
    }

    pub(crate) fn push(&mut self, result: ChartResult<Vec<E>>) {
        if self.error.is_some() {
            return;
        }
        match result {
            Ok(mut entries) => {
                sort_by_x(&mut entries);
                self.series.push(entries);
            }
            Err(err) => self.error = Some(err),
        }
    }

    pub(crate) fn finish(self) -> ChartResult<Vec<Vec<E>>> {
        if let Some(err) = self.error {
            return Err(err);
        }
        validate_series(&self.series)?;
        Ok(self.series)
    }
}

/// Zips explicit xs with ys, enforcing equal lengths.
pub(crate) fn zip_xy<E>(
    xs: Vec<f64>,
    ys: Vec<f64>,
    make: impl Fn(f64, f64) -> ChartResult<E>,
) -> ChartResult<Vec<E>> {
    if xs.len() != ys.len() {
        return Err(ChartError::SeriesLengthMismatch {
            xs: xs.len(),
            ys: ys.len(),
        });
    }
    xs.into_iter().zip(ys).map(|(x, y)| make(x, y)).collect()
}

/// Pairs ys with their index as x.
pub(crate) fn indexed<E>(
    ys: Vec<f64>,
    make: impl Fn(f64, f64) -> ChartResult<E>,
) -> ChartResult<Vec<E>> {
    ys.into_iter()
        .enumerate()
        .map(|(index, y)| make(index as f64, y))
        .collect()
}
