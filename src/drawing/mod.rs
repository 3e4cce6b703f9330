//! Per-frame animation state.
//!
//! A drawing model holds, per series and per x, the normalized values a
//! renderer needs (column heights, point positions, candle edges, slice
//! sweeps). Animations interpolate between the drawing model of the previous
//! commit and the one of the new commit.

mod layers;

use std::collections::BTreeMap;
use std::fmt;

use ordered_float::OrderedFloat;

use crate::core::primitives::lerp;

pub use layers::{
    CandleInfo, ColumnInfo, LayerDrawingModel, LayerDrawingModelInterpolator, PointInfo,
    SliceInfo, candlestick_drawing_model, column_drawing_model, line_drawing_model,
    pie_drawing_model,
};

/// Normalized per-entry drawing value that can be interpolated.
pub trait DrawingInfo: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Value at `fraction` of the way from `from` to `self`.
    ///
    /// A missing `from` interpolates from the zero value.
    #[must_use]
    fn interpolate(&self, from: Option<&Self>, fraction: f32) -> Self;
}

/// Ordered drawing values for one layer, with a layer-wide opacity.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingModel<T> {
    series: Vec<BTreeMap<OrderedFloat<f64>, T>>,
    opacity: f32,
}

impl<T: DrawingInfo> DrawingModel<T> {
    #[must_use]
    pub fn new(series: Vec<BTreeMap<OrderedFloat<f64>, T>>, opacity: f32) -> Self {
        Self { series, opacity }
    }

    #[must_use]
    pub fn series(&self) -> &[BTreeMap<OrderedFloat<f64>, T>] {
        &self.series
    }

    #[must_use]
    pub fn get(&self, series_index: usize, x: f64) -> Option<&T> {
        self.series
            .get(series_index)
            .and_then(|entries| entries.get(&OrderedFloat(x)))
    }

    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Interpolates every entry of `self` against the same series index and x
    /// in `from`. Entries only present in `from` are dropped.
    #[must_use]
    pub fn transform(&self, from: Option<&Self>, fraction: f32) -> Self {
        let series = self
            .series
            .iter()
            .enumerate()
            .map(|(index, entries)| {
                let old_entries = from.and_then(|from| from.series.get(index));
                entries
                    .iter()
                    .map(|(x, info)| {
                        let old = old_entries.and_then(|old| old.get(x));
                        (*x, info.interpolate(old, fraction))
                    })
                    .collect()
            })
            .collect();
        let old_opacity = from.map_or(0.0, |from| from.opacity);

        Self {
            series,
            opacity: lerp(old_opacity, self.opacity, fraction),
        }
    }
}

/// Holds the old and new drawing models of one layer between frames.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingModelInterpolator<T> {
    old: Option<DrawingModel<T>>,
    new: Option<DrawingModel<T>>,
}

impl<T> Default for DrawingModelInterpolator<T> {
    fn default() -> Self {
        Self {
            old: None,
            new: None,
        }
    }
}

impl<T: DrawingInfo> DrawingModelInterpolator<T> {
    pub fn set_models(&mut self, old: Option<DrawingModel<T>>, new: Option<DrawingModel<T>>) {
        self.old = old;
        self.new = new;
    }

    /// Interpolated model at `fraction`; `None` once the layer has no target.
    #[must_use]
    pub fn transform(&self, fraction: f32) -> Option<DrawingModel<T>> {
        let fraction = fraction.clamp(0.0, 1.0);
        let new = self.new.as_ref()?;
        if fraction >= 1.0 {
            return Some(new.clone());
        }
        Some(new.transform(self.old.as_ref(), fraction))
    }
}
