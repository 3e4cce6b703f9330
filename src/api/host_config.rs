use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{AdaptiveYRange, AxisPosition, FixedRange};
use crate::error::{ChartError, ChartResult};

use super::animation::{AnimationConfig, MAX_FRAME_INTERVAL};

/// How the series of a column layer share an x slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColumnMergeMode {
    /// Side by side; the y-range covers individual values.
    #[default]
    Grouped,
    /// On top of each other; the y-range covers per-x stacked totals.
    Stacked,
}

/// Per-layer settings of a [`super::ChartHost`], matched to layers by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Vertical axis the layer scales against. `None` uses the shared default
    /// range.
    #[serde(default)]
    pub axis_position: Option<AxisPosition>,
    #[serde(default)]
    pub column_merge_mode: ColumnMergeMode,
}

impl LayerConfig {
    #[must_use]
    pub fn with_axis_position(mut self, axis_position: AxisPosition) -> Self {
        self.axis_position = Some(axis_position);
        self
    }

    #[must_use]
    pub fn with_column_merge_mode(mut self, mode: ColumnMergeMode) -> Self {
        self.column_merge_mode = mode;
        self
    }
}

/// Serializable setup of a [`super::ChartHost`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartHostConfig {
    #[serde(default)]
    pub layers: Vec<LayerConfig>,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    #[serde(default)]
    pub fixed_range: Option<FixedRange>,
    #[serde(default)]
    pub adaptive_y: Option<AdaptiveYRange>,
}

fn default_frame_interval_ms() -> u64 {
    16
}

impl Default for ChartHostConfig {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            animation: AnimationConfig::default(),
            frame_interval_ms: default_frame_interval_ms(),
            fixed_range: None,
            adaptive_y: None,
        }
    }
}

impl ChartHostConfig {
    #[must_use]
    pub fn with_layer(mut self, layer: LayerConfig) -> Self {
        self.layers.push(layer);
        self
    }

    #[must_use]
    pub fn with_animation(mut self, animation: AnimationConfig) -> Self {
        self.animation = animation;
        self
    }

    #[must_use]
    pub fn with_frame_interval_ms(mut self, frame_interval_ms: u64) -> Self {
        self.frame_interval_ms = frame_interval_ms;
        self
    }

    #[must_use]
    pub fn with_fixed_range(mut self, fixed_range: FixedRange) -> Self {
        self.fixed_range = Some(fixed_range);
        self
    }

    #[must_use]
    pub fn with_adaptive_y(mut self, adaptive_y: AdaptiveYRange) -> Self {
        self.adaptive_y = Some(adaptive_y);
        self
    }

    /// Settings of layer `index`, falling back to the defaults.
    #[must_use]
    pub fn layer(&self, index: usize) -> LayerConfig {
        self.layers.get(index).copied().unwrap_or_default()
    }

    /// Rejects values that deserialization alone cannot rule out. The frame
    /// interval must lie in `1..=1000` ms.
    pub fn validate(&self) -> ChartResult<()> {
        if self.frame_interval_ms == 0
            || Duration::from_millis(self.frame_interval_ms) > MAX_FRAME_INTERVAL
        {
            return Err(ChartError::InvalidParameter {
                name: "frame interval",
                value: self.frame_interval_ms as f64,
            });
        }
        if let Some(adaptive) = self.adaptive_y {
            AdaptiveYRange::new(adaptive.fraction(), adaptive.round())?;
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize host config: {e}")))
    }

    /// Parses and validates a config. Missing fields take their defaults.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse host config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}
