use std::collections::BTreeMap;

use ordered_float::OrderedFloat;

use crate::core::primitives::lerp;
use crate::core::{
    CandlestickLayerModel, ColumnLayerModel, LayerKind, LayerModel, LineLayerModel,
    PieLayerModel, YRange,
};

use super::{DrawingInfo, DrawingModel, DrawingModelInterpolator};

fn normalized(value: f64, origin: f64, length: f64) -> f32 {
    if length == 0.0 {
        0.0
    } else {
        ((value - origin) / length) as f32
    }
}

/// Signed column height as a fraction of the y-range length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnInfo {
    pub height: f32,
}

impl DrawingInfo for ColumnInfo {
    fn interpolate(&self, from: Option<&Self>, fraction: f32) -> Self {
        Self {
            height: lerp(from.map_or(0.0, |from| from.height), self.height, fraction),
        }
    }
}

/// Point position as a fraction of the y-range above `min_y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointInfo {
    pub y: f32,
}

impl DrawingInfo for PointInfo {
    fn interpolate(&self, from: Option<&Self>, fraction: f32) -> Self {
        Self {
            y: lerp(from.map_or(0.0, |from| from.y), self.y, fraction),
        }
    }
}

/// Candle edges as fractions of the y-range above `min_y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleInfo {
    pub body_bottom_y: f32,
    pub body_top_y: f32,
    pub bottom_wick_y: f32,
    pub top_wick_y: f32,
}

impl DrawingInfo for CandleInfo {
    fn interpolate(&self, from: Option<&Self>, fraction: f32) -> Self {
        let step = |old: fn(&Self) -> f32, new: f32| lerp(from.map_or(0.0, old), new, fraction);
        Self {
            body_bottom_y: step(|info| info.body_bottom_y, self.body_bottom_y),
            body_top_y: step(|info| info.body_top_y, self.body_top_y),
            bottom_wick_y: step(|info| info.bottom_wick_y, self.bottom_wick_y),
            top_wick_y: step(|info| info.top_wick_y, self.top_wick_y),
        }
    }
}

/// Share of its ring a slice occupies, in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceInfo {
    pub sweep: f32,
}

impl DrawingInfo for SliceInfo {
    fn interpolate(&self, from: Option<&Self>, fraction: f32) -> Self {
        Self {
            sweep: lerp(from.map_or(0.0, |from| from.sweep), self.sweep, fraction),
        }
    }
}

fn build<E, T: DrawingInfo>(
    series: &[Vec<E>],
    x_of: impl Fn(&E) -> f64,
    info_of: impl Fn(usize, &E) -> T,
) -> DrawingModel<T> {
    let series = series
        .iter()
        .enumerate()
        .map(|(index, entries)| {
            entries
                .iter()
                .map(|entry| (OrderedFloat(x_of(entry)), info_of(index, entry)))
                .collect::<BTreeMap<_, _>>()
        })
        .collect();
    DrawingModel::new(series, 1.0)
}

#[must_use]
pub fn column_drawing_model(model: &ColumnLayerModel, y_range: YRange) -> DrawingModel<ColumnInfo> {
    let length = y_range.length();
    build(
        model.series(),
        |entry| entry.x,
        |_, entry| ColumnInfo {
            height: normalized(entry.y, 0.0, length),
        },
    )
}

#[must_use]
pub fn line_drawing_model(model: &LineLayerModel, y_range: YRange) -> DrawingModel<PointInfo> {
    let length = y_range.length();
    build(
        model.series(),
        |entry| entry.x,
        |_, entry| PointInfo {
            y: normalized(entry.y, y_range.min_y, length),
        },
    )
}

#[must_use]
pub fn candlestick_drawing_model(
    model: &CandlestickLayerModel,
    y_range: YRange,
) -> DrawingModel<CandleInfo> {
    let length = y_range.length();
    let at = |value: f64| normalized(value, y_range.min_y, length);
    build(
        model.series(),
        |entry| entry.x,
        |_, entry| CandleInfo {
            body_bottom_y: at(entry.opening.min(entry.closing)),
            body_top_y: at(entry.opening.max(entry.closing)),
            bottom_wick_y: at(entry.low),
            top_wick_y: at(entry.high),
        },
    )
}

#[must_use]
pub fn pie_drawing_model(model: &PieLayerModel) -> DrawingModel<SliceInfo> {
    build(
        model.series(),
        |slice| slice.x,
        |index, slice| SliceInfo {
            sweep: normalized(slice.value, 0.0, model.series_sum(index)),
        },
    )
}

/// Drawing model of any layer kind.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerDrawingModel {
    Column(DrawingModel<ColumnInfo>),
    Line(DrawingModel<PointInfo>),
    Candlestick(DrawingModel<CandleInfo>),
    Pie(DrawingModel<SliceInfo>),
}

impl LayerDrawingModel {
    /// Builds the target drawing model of `layer` against `y_range`.
    #[must_use]
    pub fn from_layer(layer: &LayerModel, y_range: YRange) -> Self {
        match layer {
            LayerModel::Column(model) => Self::Column(column_drawing_model(model, y_range)),
            LayerModel::Line(model) => Self::Line(line_drawing_model(model, y_range)),
            LayerModel::Candlestick(model) => {
                Self::Candlestick(candlestick_drawing_model(model, y_range))
            }
            LayerModel::Pie(model) => Self::Pie(pie_drawing_model(model)),
        }
    }

    #[must_use]
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Column(_) => LayerKind::Column,
            Self::Line(_) => LayerKind::Line,
            Self::Candlestick(_) => LayerKind::Candlestick,
            Self::Pie(_) => LayerKind::Pie,
        }
    }

    #[must_use]
    pub fn opacity(&self) -> f32 {
        match self {
            Self::Column(model) => model.opacity(),
            Self::Line(model) => model.opacity(),
            Self::Candlestick(model) => model.opacity(),
            Self::Pie(model) => model.opacity(),
        }
    }

    #[must_use]
    pub fn as_column(&self) -> Option<&DrawingModel<ColumnInfo>> {
        match self {
            Self::Column(model) => Some(model),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_line(&self) -> Option<&DrawingModel<PointInfo>> {
        match self {
            Self::Line(model) => Some(model),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_candlestick(&self) -> Option<&DrawingModel<CandleInfo>> {
        match self {
            Self::Candlestick(model) => Some(model),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_pie(&self) -> Option<&DrawingModel<SliceInfo>> {
        match self {
            Self::Pie(model) => Some(model),
            _ => None,
        }
    }
}

/// Interpolator for one layer slot, typed by the layer kind it animates.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerDrawingModelInterpolator {
    Column(DrawingModelInterpolator<ColumnInfo>),
    Line(DrawingModelInterpolator<PointInfo>),
    Candlestick(DrawingModelInterpolator<CandleInfo>),
    Pie(DrawingModelInterpolator<SliceInfo>),
}

impl LayerDrawingModelInterpolator {
    #[must_use]
    pub fn for_kind(kind: LayerKind) -> Self {
        match kind {
            LayerKind::Column => Self::Column(DrawingModelInterpolator::default()),
            LayerKind::Line => Self::Line(DrawingModelInterpolator::default()),
            LayerKind::Candlestick => Self::Candlestick(DrawingModelInterpolator::default()),
            LayerKind::Pie => Self::Pie(DrawingModelInterpolator::default()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Column(_) => LayerKind::Column,
            Self::Line(_) => LayerKind::Line,
            Self::Candlestick(_) => LayerKind::Candlestick,
            Self::Pie(_) => LayerKind::Pie,
        }
    }

    /// Seeds the interpolator. Models of another kind count as absent.
    pub fn set_models(&mut self, old: Option<LayerDrawingModel>, new: Option<LayerDrawingModel>) {
        match self {
            Self::Column(interpolator) => interpolator.set_models(
                old.and_then(|model| model.as_column().cloned()),
                new.and_then(|model| model.as_column().cloned()),
            ),
            Self::Line(interpolator) => interpolator.set_models(
                old.and_then(|model| model.as_line().cloned()),
                new.and_then(|model| model.as_line().cloned()),
            ),
            Self::Candlestick(interpolator) => interpolator.set_models(
                old.and_then(|model| model.as_candlestick().cloned()),
                new.and_then(|model| model.as_candlestick().cloned()),
            ),
            Self::Pie(interpolator) => interpolator.set_models(
                old.and_then(|model| model.as_pie().cloned()),
                new.and_then(|model| model.as_pie().cloned()),
            ),
        }
    }

    #[must_use]
    pub fn transform(&self, fraction: f32) -> Option<LayerDrawingModel> {
        match self {
            Self::Column(interpolator) => interpolator
                .transform(fraction)
                .map(LayerDrawingModel::Column),
            Self::Line(interpolator) => interpolator.transform(fraction).map(LayerDrawingModel::Line),
            Self::Candlestick(interpolator) => interpolator
                .transform(fraction)
                .map(LayerDrawingModel::Candlestick),
            Self::Pie(interpolator) => interpolator.transform(fraction).map(LayerDrawingModel::Pie),
        }
    }
}
