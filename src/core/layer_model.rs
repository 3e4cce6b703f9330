use serde::{Deserialize, Serialize};

use crate::core::candlestick::{CandlestickLayerModel, CandlestickPartial};
use crate::core::column::{ColumnLayerModel, ColumnPartial};
use crate::core::extra_store::ExtraStore;
use crate::core::line::{LineLayerModel, LinePartial};
use crate::core::pie::{PieLayerModel, PiePartial};

/// Layer family, used by hosts to match configuration with models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    Column,
    Line,
    Candlestick,
    Pie,
}

/// Raw layer data supplied to a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerPartial {
    Column(ColumnPartial),
    Line(LinePartial),
    Candlestick(CandlestickPartial),
    Pie(PiePartial),
}

impl LayerPartial {
    #[must_use]
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Column(_) => LayerKind::Column,
            Self::Line(_) => LayerKind::Line,
            Self::Candlestick(_) => LayerKind::Candlestick,
            Self::Pie(_) => LayerKind::Pie,
        }
    }

    /// Structural hash of the series content; equals the completed model's id.
    #[must_use]
    pub fn content_hash(&self) -> u64 {
        match self {
            Self::Column(partial) => partial.content_hash(),
            Self::Line(partial) => partial.content_hash(),
            Self::Candlestick(partial) => partial.content_hash(),
            Self::Pie(partial) => partial.content_hash(),
        }
    }

    #[must_use]
    pub fn complete(&self, extras: ExtraStore) -> LayerModel {
        match self {
            Self::Column(partial) => LayerModel::Column(partial.complete(extras)),
            Self::Line(partial) => LayerModel::Line(partial.complete(extras)),
            Self::Candlestick(partial) => LayerModel::Candlestick(partial.complete(extras)),
            Self::Pie(partial) => LayerModel::Pie(partial.complete(extras)),
        }
    }
}

impl From<ColumnPartial> for LayerPartial {
    fn from(partial: ColumnPartial) -> Self {
        Self::Column(partial)
    }
}

impl From<LinePartial> for LayerPartial {
    fn from(partial: LinePartial) -> Self {
        Self::Line(partial)
    }
}

impl From<CandlestickPartial> for LayerPartial {
    fn from(partial: CandlestickPartial) -> Self {
        Self::Candlestick(partial)
    }
}

impl From<PiePartial> for LayerPartial {
    fn from(partial: PiePartial) -> Self {
        Self::Pie(partial)
    }
}

/// Completed, immutable layer with computed statistics.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerModel {
    Column(ColumnLayerModel),
    Line(LineLayerModel),
    Candlestick(CandlestickLayerModel),
    Pie(PieLayerModel),
}

macro_rules! delegate {
    ($self:ident, $model:ident => $body:expr) => {
        match $self {
            LayerModel::Column($model) => $body,
            LayerModel::Line($model) => $body,
            LayerModel::Candlestick($model) => $body,
            LayerModel::Pie($model) => $body,
        }
    };
}

impl LayerModel {
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
    pub fn id(&self) -> u64 {
        delegate!(self, model => model.id())
    }

    #[must_use]
    pub fn min_x(&self) -> f64 {
        delegate!(self, model => model.min_x())
    }

    #[must_use]
    pub fn max_x(&self) -> f64 {
        delegate!(self, model => model.max_x())
    }

    #[must_use]
    pub fn min_y(&self) -> f64 {
        delegate!(self, model => model.min_y())
    }

    #[must_use]
    pub fn max_y(&self) -> f64 {
        delegate!(self, model => model.max_y())
    }

    #[must_use]
    pub fn x_delta_gcd(&self) -> Option<f64> {
        delegate!(self, model => model.x_delta_gcd())
    }

    #[must_use]
    pub fn extras(&self) -> &ExtraStore {
        delegate!(self, model => model.extras())
    }

    /// Copy sharing every statistic, carrying `extras` instead.
    #[must_use]
    pub fn with_extras(&self, extras: ExtraStore) -> Self {
        match self {
            Self::Column(model) => Self::Column(model.with_extras(extras)),
            Self::Line(model) => Self::Line(model.with_extras(extras)),
            Self::Candlestick(model) => Self::Candlestick(model.with_extras(extras)),
            Self::Pie(model) => Self::Pie(model.with_extras(extras)),
        }
    }

    #[must_use]
    pub fn as_column(&self) -> Option<&ColumnLayerModel> {
        match self {
            Self::Column(model) => Some(model),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_line(&self) -> Option<&LineLayerModel> {
        match self {
            Self::Line(model) => Some(model),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_candlestick(&self) -> Option<&CandlestickLayerModel> {
        match self {
            Self::Candlestick(model) => Some(model),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_pie(&self) -> Option<&PieLayerModel> {
        match self {
            Self::Pie(model) => Some(model),
            _ => None,
        }
    }
}

impl From<ColumnLayerModel> for LayerModel {
    fn from(model: ColumnLayerModel) -> Self {
        Self::Column(model)
    }
}

impl From<LineLayerModel> for LayerModel {
    fn from(model: LineLayerModel) -> Self {
        Self::Line(model)
    }
}

impl From<CandlestickLayerModel> for LayerModel {
    fn from(model: CandlestickLayerModel) -> Self {
        Self::Candlestick(model)
    }
}

impl From<PieLayerModel> for LayerModel {
    fn from(model: PieLayerModel) -> Self {
        Self::Pie(model)
    }
}
