use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::core::{ChartModel, ChartRanges, MutableExtraStore, RangeAccumulator};

use super::animation::{AnimationConfig, FrameClock, IntervalFrameClock};

static NEXT_CONSUMER_KEY: AtomicU64 = AtomicU64::new(1 << 32);

/// Opaque identity of a registration with a `ModelProducer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConsumerKey(u64);

impl ConsumerKey {
    /// Allocates a key no other `unique` call returns.
    #[must_use]
    pub fn unique() -> Self {
        Self(NEXT_CONSUMER_KEY.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for ConsumerKey {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ConsumerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Rendering-side collaborator driven by a `ModelProducer`.
///
/// For every commit the producer calls, in order and never concurrently for
/// the same registration:
/// 1. `update_ranges` with an accumulator already reset and seeded with the
///    model's x-step,
/// 2. `prepare_for_transformation` to diff the retained drawing state against
///    the new model,
/// 3. `transform` once per animation frame, followed by `on_model_created`
///    with the model carrying the host extras.
///
/// Callbacks run on producer and animation threads and must not call back
/// into the same producer synchronously.
pub trait ModelConsumer: Send + Sync {
    /// Structural fingerprint. Re-registering a key with a consumer of another
    /// fingerprint is rejected.
    fn identity(&self) -> u64 {
        0
    }

    fn animation(&self) -> AnimationConfig {
        AnimationConfig::default()
    }

    fn frame_clock(&self) -> Arc<dyn FrameClock> {
        Arc::new(IntervalFrameClock::default())
    }

    fn update_ranges(&self, model: Option<&ChartModel>, ranges: &mut RangeAccumulator);

    fn prepare_for_transformation(
        &self,
        model: Option<&ChartModel>,
        host_extras: &mut MutableExtraStore,
        ranges: &ChartRanges,
    );

    fn transform(&self, host_extras: &mut MutableExtraStore, fraction: f32);

    fn on_model_created(&self, model: Option<ChartModel>, ranges: ChartRanges);
}

/// Lifecycle position of one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsumerState {
    Idle,
    /// Ranges and drawing state are being prepared for a commit.
    Updating,
    /// Frames of an animation are still running.
    Animating,
}
