pub mod candlestick;
pub mod chart_model;
pub mod column;
pub mod extra_store;
pub mod layer_model;
pub mod line;
pub mod pie;
pub mod primitives;
pub mod ranges;
pub mod series;

pub use candlestick::{
    CandleChange, CandlestickEntry, CandlestickLayerModel, CandlestickPartial,
    CandlestickPartialBuilder,
};
pub use chart_model::ChartModel;
pub use column::{ColumnEntry, ColumnLayerModel, ColumnPartial, ColumnPartialBuilder};
pub use extra_store::{ExtraKey, ExtraStore, ExtraValue, MutableExtraStore};
pub use layer_model::{LayerKind, LayerModel, LayerPartial};
pub use line::{LineEntry, LineLayerModel, LinePartial, LinePartialBuilder};
pub use pie::{PieLayerModel, PiePartial, PiePartialBuilder, PieSlice};
pub use ranges::{
    AdaptiveYRange, AxisPosition, ChartRanges, FixedRange, RangeAccumulator, RangeOverride,
    YRange,
};
pub use series::SeriesEntry;
