use std::sync::Arc;

use crate::core::extra_store::ExtraStore;
use crate::core::layer_model::{LayerKind, LayerModel};
use crate::core::primitives::{finish_hash, fold_gcd};
use crate::error::{ChartError, ChartResult};

/// Immutable snapshot combining every layer of one commit.
///
/// A commit always produces a new `ChartModel`; consumers diff against the
/// previous instance they retained.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartModel {
    layers: Arc<[LayerModel]>,
    id: u64,
    min_x: f64,
    max_x: f64,
    x_delta_gcd: Option<f64>,
    extras: ExtraStore,
}

impl ChartModel {
    pub fn new(layers: Vec<LayerModel>, extras: ExtraStore) -> ChartResult<Self> {
        if layers.is_empty() {
            return Err(ChartError::NoLayers);
        }

        let id = finish_hash(layers.iter().map(LayerModel::id).collect::<Vec<_>>());

        // Pie xs are slice indices; they only span the chart when nothing
        // else does.
        let has_x_axis = layers.iter().any(|layer| layer.kind() != LayerKind::Pie);
        let on_x_axis = |layer: &&LayerModel| !has_x_axis || layer.kind() != LayerKind::Pie;

        let (min_x, max_x) = layers
            .iter()
            .filter(on_x_axis)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), layer| {
                (min.min(layer.min_x()), max.max(layer.max_x()))
            });
        let x_delta_gcd = layers
            .iter()
            .filter(on_x_axis)
            .filter_map(LayerModel::x_delta_gcd)
            .fold(None, fold_gcd);

        Ok(Self {
            layers: layers.into(),
            id,
            min_x,
            max_x,
            x_delta_gcd,
            extras,
        })
    }

    /// Hash of the constituent layer ids, in order.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn layers(&self) -> &[LayerModel] {
        &self.layers
    }

    #[must_use]
    pub fn layer(&self, index: usize) -> Option<&LayerModel> {
        self.layers.get(index)
    }

    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    /// `max(maxX) - min(minX)` across the layers placed on the x axis.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// GCD of x-deltas folded across the layers placed on the x axis; pie
    /// layers are skipped unless the chart holds nothing else. `None` when no
    /// such layer has two distinct xs.
    #[must_use]
    pub fn x_delta_gcd(&self) -> Option<f64> {
        self.x_delta_gcd
    }

    #[must_use]
    pub fn extras(&self) -> &ExtraStore {
        &self.extras
    }

    /// Copy carrying `extras` at chart level and on every layer.
    #[must_use]
    pub fn with_extras(&self, extras: ExtraStore) -> Self {
        Self {
            layers: self
                .layers
                .iter()
                .map(|layer| layer.with_extras(extras.clone()))
                .collect(),
            id: self.id,
            min_x: self.min_x,
            max_x: self.max_x,
            x_delta_gcd: self.x_delta_gcd,
            extras,
        }
    }
}
