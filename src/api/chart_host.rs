use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use smallvec::SmallVec;
use tracing::trace;

use crate::core::primitives::finish_hash;
use crate::core::{ChartModel, ChartRanges, ExtraKey, LayerModel, MutableExtraStore, RangeAccumulator};
use crate::drawing::{LayerDrawingModel, LayerDrawingModelInterpolator};
use crate::error::ChartResult;

use super::animation::{AnimationConfig, FrameClock, IntervalFrameClock};
use super::consumer::ModelConsumer;
use super::host_config::{ChartHostConfig, ColumnMergeMode};

/// Interpolated drawing models of every layer, indexed like the model layers.
/// `None` marks a layer without a drawable target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawingModels(pub Vec<Option<LayerDrawingModel>>);

static DRAWING_MODELS: LazyLock<ExtraKey<DrawingModels>> = LazyLock::new(ExtraKey::new);

/// Model and ranges most recently published to a [`ChartHost`].
#[derive(Debug, Clone, PartialEq)]
pub struct HostSnapshot {
    pub model: Option<ChartModel>,
    pub ranges: ChartRanges,
}

impl HostSnapshot {
    /// Drawing models carried by the snapshot's model extras.
    #[must_use]
    pub fn drawing_models(&self) -> Option<&DrawingModels> {
        self.model.as_ref().and_then(ChartHost::drawing_models_of)
    }
}

#[derive(Debug, Default)]
struct Frames {
    latest: Option<HostSnapshot>,
    pending_fraction: f32,
    final_frames: usize,
}

/// Reference [`ModelConsumer`]: computes ranges per the layer configuration,
/// animates drawing models between commits and keeps the last published
/// frame.
#[derive(Debug)]
pub struct ChartHost {
    config: ChartHostConfig,
    clock: Arc<dyn FrameClock>,
    interpolators: Mutex<SmallVec<[LayerDrawingModelInterpolator; 4]>>,
    frames: Mutex<Frames>,
    frame_signal: Condvar,
}

impl ChartHost {
    pub fn new(config: ChartHostConfig) -> ChartResult<Self> {
        config.validate()?;
        let clock = IntervalFrameClock::new(Duration::from_millis(config.frame_interval_ms))?;
        Ok(Self {
            config,
            clock: Arc::new(clock),
            interpolators: Mutex::new(SmallVec::new()),
            frames: Mutex::new(Frames::default()),
            frame_signal: Condvar::new(),
        })
    }

    /// Replaces the interval clock, e.g. with a display-synchronized one.
    #[must_use]
    pub fn with_frame_clock(mut self, clock: Arc<dyn FrameClock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ChartHostConfig {
        &self.config
    }

    /// Drawing models stored in `model`'s extras by a host.
    #[must_use]
    pub fn drawing_models_of(model: &ChartModel) -> Option<&DrawingModels> {
        model.extras().get(&DRAWING_MODELS)
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<HostSnapshot> {
        self.frames.lock().latest.clone()
    }

    /// Drawing models of the last published frame.
    #[must_use]
    pub fn drawing_models(&self) -> Option<DrawingModels> {
        self.frames
            .lock()
            .latest
            .as_ref()
            .and_then(HostSnapshot::drawing_models)
            .cloned()
    }

    /// Number of frames published with fraction `1.0` so far.
    #[must_use]
    pub fn final_frames(&self) -> usize {
        self.frames.lock().final_frames
    }

    /// Blocks until at least `count` final frames were published. Returns
    /// `false` on timeout.
    pub fn await_final_frames(&self, count: usize, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            let mut frames = self.frames.lock();
            while frames.final_frames < count {
                self.frame_signal.wait(&mut frames);
            }
            return true;
        };
        let mut frames = self.frames.lock();
        while frames.final_frames < count {
            if self
                .frame_signal
                .wait_until(&mut frames, deadline)
                .timed_out()
            {
                return frames.final_frames >= count;
            }
        }
        true
    }
}

impl ModelConsumer for ChartHost {
    fn identity(&self) -> u64 {
        finish_hash(&self.config.layers)
    }

    fn animation(&self) -> AnimationConfig {
        self.config.animation
    }

    fn frame_clock(&self) -> Arc<dyn FrameClock> {
        Arc::clone(&self.clock)
    }

    fn update_ranges(&self, model: Option<&ChartModel>, ranges: &mut RangeAccumulator) {
        let Some(model) = model else {
            return;
        };
        for (index, layer) in model.layers().iter().enumerate() {
            let layer_config = self.config.layer(index);
            let (min_y, max_y) = match layer {
                LayerModel::Pie(_) => continue,
                LayerModel::Column(column)
                    if layer_config.column_merge_mode == ColumnMergeMode::Stacked =>
                {
                    (column.min_aggregate_y(), column.max_aggregate_y())
                }
                _ => (layer.min_y(), layer.max_y()),
            };
            ranges.try_update(
                layer.min_x(),
                layer.max_x(),
                min_y,
                max_y,
                layer_config.axis_position,
            );
        }
        if let Some(fixed) = &self.config.fixed_range {
            ranges.apply_override(fixed);
        }
        if let Some(adaptive) = &self.config.adaptive_y {
            ranges.apply_override(adaptive);
        }
    }

    fn prepare_for_transformation(
        &self,
        model: Option<&ChartModel>,
        host_extras: &mut MutableExtraStore,
        ranges: &ChartRanges,
    ) {
        let retained = host_extras
            .get(&DRAWING_MODELS)
            .map(|models| models.0.clone())
            .unwrap_or_default();
        let mut interpolators = self.interpolators.lock();
        let Some(model) = model else {
            interpolators.clear();
            host_extras.remove(&DRAWING_MODELS);
            return;
        };

        interpolators.clear();
        for (index, layer) in model.layers().iter().enumerate() {
            let y_range = ranges.y_range(self.config.layer(index).axis_position);
            let target = LayerDrawingModel::from_layer(layer, y_range);
            // A retained model of another kind counts as absent.
            let mut interpolator = LayerDrawingModelInterpolator::for_kind(layer.kind());
            interpolator.set_models(retained.get(index).cloned().flatten(), Some(target));
            interpolators.push(interpolator);
        }
        trace!(layers = interpolators.len(), "drawing models prepared");
    }

    fn transform(&self, host_extras: &mut MutableExtraStore, fraction: f32) {
        let models = self
            .interpolators
            .lock()
            .iter()
            .map(|interpolator| interpolator.transform(fraction))
            .collect();
        host_extras.set(&DRAWING_MODELS, DrawingModels(models));
        self.frames.lock().pending_fraction = fraction;
    }

    fn on_model_created(&self, model: Option<ChartModel>, ranges: ChartRanges) {
        let mut frames = self.frames.lock();
        frames.latest = Some(HostSnapshot { model, ranges });
        if frames.pending_fraction >= 1.0 {
            frames.final_frames += 1;
            self.frame_signal.notify_all();
        }
    }
}
