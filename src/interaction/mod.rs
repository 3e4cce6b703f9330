//! Horizontal scroll and zoom state of a chart viewport.
//!
//! The state only stores pixel offsets and the zoom factor; every query takes
//! the current [`ChartRanges`] so the answers follow model updates.

use serde::{Deserialize, Serialize};

use crate::core::ChartRanges;
use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionMode {
    Idle,
    Scrolling,
}

/// Tuning for [`ScrollZoomState`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollZoomConfig {
    /// Pixels between two x steps at zoom `1.0`.
    #[serde(default = "default_x_spacing_px")]
    pub x_spacing_px: f64,
    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: f64,
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,
}

fn default_x_spacing_px() -> f64 {
    32.0
}

fn default_initial_zoom() -> f64 {
    1.0
}

fn default_min_zoom() -> f64 {
    0.1
}

fn default_max_zoom() -> f64 {
    10.0
}

impl Default for ScrollZoomConfig {
    fn default() -> Self {
        Self {
            x_spacing_px: default_x_spacing_px(),
            initial_zoom: default_initial_zoom(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
        }
    }
}

impl ScrollZoomConfig {
    #[must_use]
    pub fn with_x_spacing_px(mut self, x_spacing_px: f64) -> Self {
        self.x_spacing_px = x_spacing_px;
        self
    }

    #[must_use]
    pub fn with_zoom_limits(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    #[must_use]
    pub fn with_initial_zoom(mut self, initial_zoom: f64) -> Self {
        self.initial_zoom = initial_zoom;
        self
    }
}

fn ensure_positive(value: f64, name: &'static str) -> ChartResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ChartError::InvalidParameter { name, value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollZoomState {
    config: ScrollZoomConfig,
    mode: InteractionMode,
    zoom: f64,
    scroll_px: f64,
}

impl ScrollZoomState {
    pub fn new(config: ScrollZoomConfig) -> ChartResult<Self> {
        ensure_positive(config.x_spacing_px, "x spacing")?;
        let min_zoom = ensure_positive(config.min_zoom, "min zoom")?;
        let max_zoom = ensure_positive(config.max_zoom, "max zoom")?;
        if max_zoom < min_zoom {
            return Err(ChartError::InvalidParameter {
                name: "max zoom",
                value: max_zoom,
            });
        }
        let zoom = ensure_positive(config.initial_zoom, "initial zoom")?.clamp(min_zoom, max_zoom);

        Ok(Self {
            config,
            mode: InteractionMode::Idle,
            zoom,
            scroll_px: 0.0,
        })
    }

    #[must_use]
    pub fn config(self) -> ScrollZoomConfig {
        self.config
    }

    #[must_use]
    pub fn mode(self) -> InteractionMode {
        self.mode
    }

    #[must_use]
    pub fn zoom(self) -> f64 {
        self.zoom
    }

    #[must_use]
    pub fn scroll_px(self) -> f64 {
        self.scroll_px
    }

    pub fn on_scroll_start(&mut self) {
        self.mode = InteractionMode::Scrolling;
    }

    pub fn on_scroll_end(&mut self) {
        self.mode = InteractionMode::Idle;
    }

    /// Pixels per x unit at the current zoom.
    #[must_use]
    pub fn px_per_x(self, ranges: &ChartRanges) -> f64 {
        let x_step = ranges.x_step();
        if x_step <= 0.0 {
            return 0.0;
        }
        self.config.x_spacing_px * self.zoom / x_step
    }

    /// Width of the whole x-range in pixels.
    #[must_use]
    pub fn content_width(self, ranges: &ChartRanges) -> f64 {
        ranges.x_length() * self.px_per_x(ranges)
    }

    pub fn max_scroll(self, ranges: &ChartRanges, viewport_width: f64) -> ChartResult<f64> {
        let viewport_width = ensure_positive(viewport_width, "viewport width")?;
        Ok((self.content_width(ranges) - viewport_width).max(0.0))
    }

    /// Scrolls by `delta_px` and clamps to the scrollable extent. Returns the
    /// distance actually scrolled.
    pub fn scroll_by(
        &mut self,
        delta_px: f64,
        ranges: &ChartRanges,
        viewport_width: f64,
    ) -> ChartResult<f64> {
        if !delta_px.is_finite() {
            return Err(ChartError::InvalidParameter {
                name: "scroll delta",
                value: delta_px,
            });
        }
        let max_scroll = self.max_scroll(ranges, viewport_width)?;
        let previous = self.scroll_px;
        self.scroll_px = (self.scroll_px + delta_px).clamp(0.0, max_scroll);
        Ok(self.scroll_px - previous)
    }

    /// Multiplies the zoom by `factor` within the configured limits, keeping
    /// the x under `centroid_px` (relative to the viewport) in place whenever
    /// the clamped scroll allows it.
    pub fn zoom_by(
        &mut self,
        factor: f64,
        centroid_px: f64,
        ranges: &ChartRanges,
        viewport_width: f64,
    ) -> ChartResult<()> {
        let factor = ensure_positive(factor, "zoom factor")?;
        if !centroid_px.is_finite() {
            return Err(ChartError::InvalidParameter {
                name: "zoom centroid",
                value: centroid_px,
            });
        }
        let zoom = (self.zoom * factor).clamp(self.config.min_zoom, self.config.max_zoom);
        let scale = zoom / self.zoom;
        self.zoom = zoom;

        let max_scroll = self.max_scroll(ranges, viewport_width)?;
        self.scroll_px = ((self.scroll_px + centroid_px) * scale - centroid_px).clamp(0.0, max_scroll);
        Ok(())
    }

    /// X interval currently inside the viewport.
    pub fn visible_x_range(self, ranges: &ChartRanges, viewport_width: f64) -> ChartResult<(f64, f64)> {
        let viewport_width = ensure_positive(viewport_width, "viewport width")?;
        let px_per_x = self.px_per_x(ranges);
        if px_per_x == 0.0 {
            return Ok((ranges.min_x(), ranges.max_x()));
        }
        let start = ranges.min_x() + self.scroll_px / px_per_x;
        Ok((start, start + viewport_width / px_per_x))
    }

    /// Viewport pixel of `x`.
    #[must_use]
    pub fn x_to_px(self, x: f64, ranges: &ChartRanges) -> f64 {
        (x - ranges.min_x()) * self.px_per_x(ranges) - self.scroll_px
    }
}
