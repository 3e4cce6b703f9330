use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use indexmap::IndexMap;
use parking_lot::{FairMutex, FairMutexGuard, Mutex, RwLock};
use tracing::{debug, trace, warn};

#[cfg(feature = "parallel-completion")]
use rayon::prelude::*;

use crate::core::{
    ChartModel, ChartRanges, ExtraStore, LayerModel, LayerPartial, MutableExtraStore,
    RangeAccumulator,
};
use crate::error::{ChartError, ChartResult};

use super::animation::{AnimationHandle, CancellationToken, FrameCallback};
use super::consumer::{ConsumerKey, ConsumerState, ModelConsumer};

/// Batch of layer partials and extras applied atomically by a commit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    partials: Vec<LayerPartial>,
    extras: MutableExtraStore,
}

impl Transaction {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer; layers keep the order they were added in.
    pub fn add(&mut self, partial: impl Into<LayerPartial>) -> &mut Self {
        self.partials.push(partial.into());
        self
    }

    /// Edits the chart-level extras of this transaction.
    pub fn extras(&mut self, block: impl FnOnce(&mut MutableExtraStore)) -> &mut Self {
        block(&mut self.extras);
        self
    }

    #[must_use]
    pub fn partials(&self) -> &[LayerPartial] {
        &self.partials
    }
}

#[derive(Debug)]
struct CachedLayer {
    partial: LayerPartial,
    model: LayerModel,
}

/// Everything a commit reads and writes. Only reachable through the commit
/// mutex.
#[derive(Debug, Default)]
struct ProducerState {
    partials: Vec<LayerPartial>,
    extras: ExtraStore,
    cache: HashMap<u64, CachedLayer>,
    model: Option<ChartModel>,
    revision: u64,
}

impl ProducerState {
    fn is_unchanged(&self, partials: &[LayerPartial], extras: &ExtraStore) -> bool {
        self.partials == partials && self.extras == *extras
    }

    /// Rebuilds the chart model, reusing cached layer statistics for partials
    /// whose content is unchanged. The cache only keeps this commit's layers.
    fn apply(&mut self, partials: Vec<LayerPartial>, extras: ExtraStore) -> ChartResult<()> {
        #[cfg(feature = "parallel-completion")]
        let completed: Vec<(u64, LayerModel, bool)> = partials
            .par_iter()
            .map(|partial| complete_layer(partial, &self.cache, &extras))
            .collect();
        #[cfg(not(feature = "parallel-completion"))]
        let completed: Vec<(u64, LayerModel, bool)> = partials
            .iter()
            .map(|partial| complete_layer(partial, &self.cache, &extras))
            .collect();

        let reused = completed.iter().filter(|(_, _, reused)| *reused).count();
        let mut cache = HashMap::with_capacity(partials.len());
        let mut layers = Vec::with_capacity(partials.len());
        for (partial, (hash, model, _)) in partials.iter().zip(completed) {
            cache.insert(
                hash,
                CachedLayer {
                    partial: partial.clone(),
                    model: model.clone(),
                },
            );
            layers.push(model);
        }

        let model = if layers.is_empty() {
            None
        } else {
            Some(ChartModel::new(layers, extras.clone())?)
        };

        self.revision += 1;
        debug!(
            revision = self.revision,
            layers = partials.len(),
            reused,
            model_id = model.as_ref().map(ChartModel::id),
            "chart model committed"
        );
        self.partials = partials;
        self.extras = extras;
        self.cache = cache;
        self.model = model;
        Ok(())
    }
}

fn complete_layer(
    partial: &LayerPartial,
    cache: &HashMap<u64, CachedLayer>,
    extras: &ExtraStore,
) -> (u64, LayerModel, bool) {
    let hash = partial.content_hash();
    match cache.get(&hash) {
        Some(cached) if cached.partial == *partial => {
            (hash, cached.model.with_extras(extras.clone()), true)
        }
        _ => (hash, partial.complete(extras.clone()), false),
    }
}

/// Serializes transactions and fans every committed model out to the
/// registered consumers.
///
/// Commits are applied in the order they acquire the commit mutex, which hands
/// off in FIFO order. A commit whose partials and extras equal the previous
/// commit's is elided.
pub struct ModelProducer {
    state: FairMutex<ProducerState>,
    receivers: RwLock<IndexMap<ConsumerKey, Arc<UpdateReceiver>>>,
}

impl Default for ModelProducer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModelProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelProducer")
            .field("consumers", &self.receivers.read().len())
            .finish_non_exhaustive()
    }
}

impl ModelProducer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: FairMutex::new(ProducerState::default()),
            receivers: RwLock::new(IndexMap::new()),
        }
    }

    /// Builds a transaction with `block` and commits it, waiting for the
    /// commit mutex if another commit is running.
    pub fn run_transaction<F>(&self, block: F) -> ChartResult<()>
    where
        F: FnOnce(&mut Transaction) -> ChartResult<()>,
    {
        let mut transaction = Transaction::new();
        block(&mut transaction)?;
        self.commit(transaction)
    }

    /// Like [`ModelProducer::run_transaction`] but gives up with `Ok(false)`
    /// when another commit holds the mutex.
    pub fn try_run_transaction<F>(&self, block: F) -> ChartResult<bool>
    where
        F: FnOnce(&mut Transaction) -> ChartResult<()>,
    {
        let mut transaction = Transaction::new();
        block(&mut transaction)?;
        self.try_commit(transaction)
    }

    /// Applies `transaction`. Returns once every consumer has prepared the new
    /// model and started (not finished) its animation.
    pub fn commit(&self, transaction: Transaction) -> ChartResult<()> {
        let state = self.state.lock();
        self.apply(state, transaction)
    }

    pub fn try_commit(&self, transaction: Transaction) -> ChartResult<bool> {
        let Some(state) = self.state.try_lock() else {
            trace!("commit mutex busy, dropping transaction");
            return Ok(false);
        };
        self.apply(state, transaction)?;
        Ok(true)
    }

    fn apply(
        &self,
        mut state: FairMutexGuard<'_, ProducerState>,
        transaction: Transaction,
    ) -> ChartResult<()> {
        let Transaction { partials, extras } = transaction;
        let extras = extras.snapshot();
        if state.is_unchanged(&partials, &extras) {
            debug!(revision = state.revision, "commit unchanged, consumers not notified");
            return Ok(());
        }

        state.apply(partials, extras)?;
        let receivers: Vec<Arc<UpdateReceiver>> =
            self.receivers.read().values().cloned().collect();
        fan_out(&receivers, state.model.as_ref());
        FairMutexGuard::unlock_fair(state);
        Ok(())
    }

    /// Registers `consumer` under `key` and delivers the latest committed model
    /// to it before returning.
    ///
    /// Re-registering a key replaces the previous consumer, provided both
    /// report the same [`ModelConsumer::identity`].
    pub fn register_for_updates(
        &self,
        key: ConsumerKey,
        consumer: Arc<dyn ModelConsumer>,
        host_extras: MutableExtraStore,
    ) -> ChartResult<()> {
        let state = self.state.lock();
        let identity = consumer.identity();
        let previous = self.receivers.read().get(&key).cloned();
        if previous
            .as_ref()
            .is_some_and(|previous| previous.identity != identity)
        {
            warn!(%key, "consumer re-registered with a different structure");
            return Err(ChartError::InconsistentRegistration { key: key.raw() });
        }

        let receiver = Arc::new(UpdateReceiver::new(key, identity, consumer, host_extras));
        self.receivers.write().insert(key, Arc::clone(&receiver));
        let replaced = previous.is_some();
        if let Some(previous) = previous {
            previous.deactivate();
        }
        debug!(%key, replaced, "consumer registered");

        receiver.handle_update(state.model.as_ref());
        FairMutexGuard::unlock_fair(state);
        Ok(())
    }

    /// Removes the registration for `key`, stopping its animation. Calling it
    /// for an unknown key does nothing.
    pub fn unregister_from_updates(&self, key: ConsumerKey) {
        let removed = self.receivers.write().shift_remove(&key);
        if let Some(receiver) = removed {
            receiver.deactivate();
            debug!(%key, "consumer unregistered");
        }
    }

    #[must_use]
    pub fn is_registered(&self, key: ConsumerKey) -> bool {
        self.receivers.read().contains_key(&key)
    }

    #[must_use]
    pub fn consumer_state(&self, key: ConsumerKey) -> Option<ConsumerState> {
        let receiver = self.receivers.read().get(&key).cloned()?;
        Some(receiver.state())
    }

    /// Latest committed model, without host extras.
    #[must_use]
    pub fn latest_model(&self) -> Option<ChartModel> {
        self.state.lock().model.clone()
    }

    /// Number of commits that produced a new model.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.state.lock().revision
    }
}

/// Delivers `model` to every receiver, each on its own scoped thread.
fn fan_out(receivers: &[Arc<UpdateReceiver>], model: Option<&ChartModel>) {
    match receivers {
        [] => {}
        [receiver] => receiver.handle_update(model),
        _ => thread::scope(|scope| {
            for receiver in receivers {
                let spawned = thread::Builder::new()
                    .name("chart-flow-update".to_owned())
                    .spawn_scoped(scope, move || receiver.handle_update(model));
                if let Err(err) = spawned {
                    warn!(error = %err, key = %receiver.key, "update thread unavailable");
                    receiver.handle_update(model);
                }
            }
        }),
    }
}

#[derive(Debug, Default)]
struct AnimationSlot {
    running: Option<AnimationHandle>,
    had_model: bool,
}

/// Per-registration state. `animation` doubles as the lock that keeps the
/// `prepare -> transform* -> final frame` sequence of one consumer serial.
struct UpdateReceiver {
    key: ConsumerKey,
    identity: u64,
    consumer: Arc<dyn ModelConsumer>,
    host_extras: Arc<Mutex<MutableExtraStore>>,
    animation: Mutex<AnimationSlot>,
    active: AtomicBool,
}

impl UpdateReceiver {
    fn new(
        key: ConsumerKey,
        identity: u64,
        consumer: Arc<dyn ModelConsumer>,
        host_extras: MutableExtraStore,
    ) -> Self {
        Self {
            key,
            identity,
            consumer,
            host_extras: Arc::new(Mutex::new(host_extras)),
            animation: Mutex::new(AnimationSlot::default()),
            active: AtomicBool::new(true),
        }
    }

    fn handle_update(&self, model: Option<&ChartModel>) {
        let mut slot = self.animation.lock();
        if !self.active.load(Ordering::Acquire) {
            return;
        }
        if let Some(running) = slot.running.take() {
            let finished = running.is_finished();
            running.cancel_and_join();
            trace!(key = %self.key, finished, "previous animation stopped");
        }

        let mut accumulator = RangeAccumulator::new();
        if let Some(model) = model {
            accumulator.set_x_step(model.x_delta_gcd().unwrap_or(1.0));
        }
        self.consumer.update_ranges(model, &mut accumulator);
        let ranges = accumulator.to_ranges();
        self.consumer
            .prepare_for_transformation(model, &mut self.host_extras.lock(), &ranges);

        let on_frame = self.frame_callback(model.cloned(), ranges);
        let config = self.consumer.animation();
        if config.should_animate(slot.had_model) {
            trace!(key = %self.key, duration_ms = config.duration_ms, "animation started");
            slot.running = Some(AnimationHandle::spawn(
                self.consumer.frame_clock(),
                config.duration(),
                on_frame,
            ));
        } else {
            on_frame(1.0, &CancellationToken::new());
        }
        slot.had_model = model.is_some();
    }

    fn frame_callback(&self, model: Option<ChartModel>, ranges: ChartRanges) -> FrameCallback {
        let consumer = Arc::clone(&self.consumer);
        let host_extras = Arc::clone(&self.host_extras);
        Arc::new(move |fraction: f32, token: &CancellationToken| {
            let snapshot = {
                let mut extras = host_extras.lock();
                consumer.transform(&mut extras, fraction);
                extras.snapshot()
            };
            if token.is_cancelled() {
                return;
            }
            let model = model
                .as_ref()
                .map(|model| model.with_extras(model.extras().merged(&snapshot)));
            consumer.on_model_created(model, ranges.clone());
        })
    }

    fn state(&self) -> ConsumerState {
        match self.animation.try_lock() {
            None => ConsumerState::Updating,
            Some(slot) => {
                if slot
                    .running
                    .as_ref()
                    .is_some_and(|running| !running.is_finished())
                {
                    ConsumerState::Animating
                } else {
                    ConsumerState::Idle
                }
            }
        }
    }

    /// Stops delivering updates and cancels any running animation.
    fn deactivate(&self) {
        let mut slot = self.animation.lock();
        self.active.store(false, Ordering::Release);
        if let Some(running) = slot.running.take() {
            running.cancel_and_join();
        }
    }
}
