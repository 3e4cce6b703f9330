use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Vertical axis a layer is scaled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisPosition {
    Start,
    End,
}

/// Closed y interval.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct YRange {
    pub min_y: f64,
    pub max_y: f64,
}

impl YRange {
    #[must_use]
    pub fn new(min_y: f64, max_y: f64) -> Self {
        Self { min_y, max_y }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.max_y - self.min_y
    }

    fn widen(self, min_y: f64, max_y: f64) -> Self {
        Self {
            min_y: self.min_y.min(min_y),
            max_y: self.max_y.max(max_y),
        }
    }
}

/// Immutable ranges produced by one accumulation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRanges {
    min_x: f64,
    max_x: f64,
    x_step: f64,
    default_y: YRange,
    axis_y: IndexMap<AxisPosition, YRange>,
}

impl ChartRanges {
    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    #[must_use]
    pub fn x_step(&self) -> f64 {
        self.x_step
    }

    #[must_use]
    pub fn x_length(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Range for `axis`, falling back to the default range when the axis never
    /// received its own update.
    #[must_use]
    pub fn y_range(&self, axis: Option<AxisPosition>) -> YRange {
        axis.and_then(|axis| self.axis_y.get(&axis).copied())
            .unwrap_or(self.default_y)
    }
}

impl Default for ChartRanges {
    fn default() -> Self {
        RangeAccumulator::new().to_ranges()
    }
}

/// Monotonically widening accumulator of x/y bounds.
///
/// Within one pass `try_update` can only lower minima and raise maxima. The
/// engine calls `reset` once per commit before layers fold in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeAccumulator {
    min_x: Option<f64>,
    max_x: Option<f64>,
    x_step: Option<f64>,
    default_y: Option<YRange>,
    axis_y: IndexMap<AxisPosition, YRange>,
}

impl RangeAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.min_x = None;
        self.max_x = None;
        self.x_step = None;
        self.default_y = None;
        self.axis_y.clear();
    }

    /// Widens the x-range, the default y-range and, when `axis` is given, that
    /// axis' own y-range.
    pub fn try_update(
        &mut self,
        min_x: f64,
        max_x: f64,
        min_y: f64,
        max_y: f64,
        axis: Option<AxisPosition>,
    ) {
        self.min_x = Some(self.min_x.map_or(min_x, |current| current.min(min_x)));
        self.max_x = Some(self.max_x.map_or(max_x, |current| current.max(max_x)));
        self.default_y = Some(
            self.default_y
                .map_or(YRange::new(min_y, max_y), |range| range.widen(min_y, max_y)),
        );
        if let Some(axis) = axis {
            self.axis_y
                .entry(axis)
                .and_modify(|range| *range = range.widen(min_y, max_y))
                .or_insert(YRange::new(min_y, max_y));
        }
    }

    pub fn set_x_step(&mut self, x_step: f64) {
        self.x_step = Some(x_step);
    }

    /// Minimum x seen so far, `0.0` before any update.
    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.min_x.unwrap_or(0.0)
    }

    /// Maximum x seen so far, `0.0` before any update.
    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.max_x.unwrap_or(0.0)
    }

    /// Step between x ticks, `1.0` unless set.
    #[must_use]
    pub fn x_step(&self) -> f64 {
        self.x_step.unwrap_or(1.0)
    }

    #[must_use]
    pub fn y_range(&self, axis: Option<AxisPosition>) -> YRange {
        axis.and_then(|axis| self.axis_y.get(&axis).copied())
            .or(self.default_y)
            .unwrap_or_default()
    }

    /// Rewrites every accumulated bound through `range_override`.
    pub fn apply_override(&mut self, range_override: &dyn RangeOverride) {
        let (min_x, max_x) = (self.min_x(), self.max_x());
        self.min_x = Some(range_override.min_x(min_x, max_x));
        self.max_x = Some(range_override.max_x(min_x, max_x));

        let default_y = self.default_y.unwrap_or_default();
        self.default_y = Some(override_y(range_override, default_y));
        for range in self.axis_y.values_mut() {
            *range = override_y(range_override, *range);
        }
    }

    #[must_use]
    pub fn to_ranges(&self) -> ChartRanges {
        ChartRanges {
            min_x: self.min_x(),
            max_x: self.max_x(),
            x_step: self.x_step(),
            default_y: self.default_y.unwrap_or_default(),
            axis_y: self.axis_y.clone(),
        }
    }
}

fn override_y(range_override: &dyn RangeOverride, range: YRange) -> YRange {
    YRange::new(
        range_override.min_y(range.min_y, range.max_y),
        range_override.max_y(range.min_y, range.max_y),
    )
}

/// Maps computed bounds to the bounds a chart should display.
pub trait RangeOverride: Send + Sync + fmt::Debug {
    fn min_x(&self, min_x: f64, _max_x: f64) -> f64 {
        min_x
    }

    fn max_x(&self, _min_x: f64, max_x: f64) -> f64 {
        max_x
    }

    fn min_y(&self, min_y: f64, _max_y: f64) -> f64 {
        min_y
    }

    fn max_y(&self, _min_y: f64, max_y: f64) -> f64 {
        max_y
    }
}

/// Pins any subset of bounds to fixed values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FixedRange {
    #[serde(default)]
    pub min_x: Option<f64>,
    #[serde(default)]
    pub max_x: Option<f64>,
    #[serde(default)]
    pub min_y: Option<f64>,
    #[serde(default)]
    pub max_y: Option<f64>,
}

impl FixedRange {
    #[must_use]
    pub fn with_y(mut self, min_y: f64, max_y: f64) -> Self {
        self.min_y = Some(min_y);
        self.max_y = Some(max_y);
        self
    }

    #[must_use]
    pub fn with_x(mut self, min_x: f64, max_x: f64) -> Self {
        self.min_x = Some(min_x);
        self.max_x = Some(max_x);
        self
    }
}

impl RangeOverride for FixedRange {
    fn min_x(&self, min_x: f64, _max_x: f64) -> f64 {
        self.min_x.unwrap_or(min_x)
    }

    fn max_x(&self, _min_x: f64, max_x: f64) -> f64 {
        self.max_x.unwrap_or(max_x)
    }

    fn min_y(&self, min_y: f64, _max_y: f64) -> f64 {
        self.min_y.unwrap_or(min_y)
    }

    fn max_y(&self, _min_y: f64, max_y: f64) -> f64 {
        self.max_y.unwrap_or(max_y)
    }
}

/// Pads y-ranges symmetrically so their length becomes `fraction` times the
/// data length, optionally rounding outward to whole numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveYRange {
    fraction: f64,
    round: bool,
}

impl AdaptiveYRange {
    pub fn new(fraction: f64, round: bool) -> ChartResult<Self> {
        if !fraction.is_finite() || fraction < 1.0 {
            return Err(ChartError::InvalidParameter {
                name: "adaptive y fraction",
                value: fraction,
            });
        }
        Ok(Self { fraction, round })
    }

    #[must_use]
    pub fn fraction(self) -> f64 {
        self.fraction
    }

    #[must_use]
    pub fn round(self) -> bool {
        self.round
    }

    fn padding(self, min_y: f64, max_y: f64) -> f64 {
        (max_y - min_y).abs() * (self.fraction - 1.0) / 2.0
    }
}

impl RangeOverride for AdaptiveYRange {
    fn min_y(&self, min_y: f64, max_y: f64) -> f64 {
        let value = min_y - self.padding(min_y, max_y);
        if self.round { value.floor() } else { value }
    }

    fn max_y(&self, min_y: f64, max_y: f64) -> f64 {
        let value = max_y + self.padding(min_y, max_y);
        if self.round { value.ceil() } else { value }
    }
}
