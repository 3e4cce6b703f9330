use std::hash::{DefaultHasher, Hash, Hasher};

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{ChartError, ChartResult};

const GCD_EPSILON: f64 = 1e-8;

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

#[must_use]
pub fn datetime_to_unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0
}

pub(crate) fn ensure_finite(value: f64, field_name: &str) -> ChartResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ChartError::InvalidData(format!(
            "{field_name} must be finite"
        )))
    }
}

/// Euclid's algorithm on floats.
///
/// Remainders below `1e-8` count as zero, so `gcd_with(0.3, 0.1)` settles on
/// roughly `0.1` instead of chasing rounding noise.
#[must_use]
pub fn gcd_with(a: f64, b: f64) -> f64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    if a < b {
        std::mem::swap(&mut a, &mut b);
    }
    while b >= GCD_EPSILON {
        let remainder = a - b * (a / b).floor();
        a = b;
        b = remainder;
    }
    a
}

/// Folds a GCD over deltas, skipping zero deltas.
///
/// Returns `None` when every delta was zero (or there were none).
#[must_use]
pub fn fold_gcd(acc: Option<f64>, delta: f64) -> Option<f64> {
    if delta.abs() < GCD_EPSILON {
        return acc;
    }
    Some(acc.map_or(delta.abs(), |gcd| gcd_with(gcd, delta)))
}

#[must_use]
pub fn lerp(from: f32, to: f32, fraction: f32) -> f32 {
    from + (to - from) * fraction
}

/// Structural hash over a sequence of coordinates.
pub(crate) fn hash_values<H: Hasher>(state: &mut H, values: impl IntoIterator<Item = f64>) {
    for value in values {
        OrderedFloat(value).hash(state);
    }
}

pub(crate) fn finish_hash(seed: impl Hash) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    hasher.finish()
}
