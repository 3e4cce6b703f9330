#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, LazyLock};
use std::thread;
use std::time::{Duration, Instant};

use chart_flow::api::{AnimationConfig, CancellationToken, FrameClock, ModelConsumer};
use chart_flow::core::{
    ChartModel, ChartRanges, ExtraKey, LayerPartial, LinePartial, MutableExtraStore,
    RangeAccumulator,
};
use parking_lot::{Condvar, Mutex};

/// Host extra written by [`Recorder::transform`]: number of transforms so far.
pub static TRANSFORMS: LazyLock<ExtraKey<u32>> = LazyLock::new(ExtraKey::new);

pub fn line(ys: &[f64]) -> LayerPartial {
    LinePartial::builder()
        .series(ys.iter().copied())
        .build()
        .expect("line partial")
        .into()
}

pub fn line_xy(xs: &[f64], ys: &[f64]) -> LayerPartial {
    LinePartial::builder()
        .series_xy(xs.iter().copied(), ys.iter().copied())
        .build()
        .expect("line partial")
        .into()
}

/// Frame clock on virtual time: every frame advances by `step` while the
/// thread only sleeps `pause`.
#[derive(Debug)]
pub struct SteppedClock {
    step: Duration,
    pause: Duration,
    now: Mutex<Option<Instant>>,
}

impl SteppedClock {
    pub fn new(step: Duration, pause: Duration) -> Arc<Self> {
        Arc::new(Self {
            step,
            pause,
            now: Mutex::new(None),
        })
    }
}

impl FrameClock for SteppedClock {
    fn await_frame(&self, token: &CancellationToken) -> Option<Instant> {
        if token.wait_timeout(self.pause) {
            return None;
        }
        let mut now = self.now.lock();
        let next = now.map_or_else(Instant::now, |last| last + self.step);
        *now = Some(next);
        Some(next)
    }
}

#[derive(Debug, Clone)]
pub struct Published {
    pub fraction: f32,
    pub model: Option<ChartModel>,
    pub ranges: ChartRanges,
}

#[derive(Debug, Default)]
struct Log {
    fractions: Vec<f32>,
    published: Vec<Published>,
    x_steps: Vec<f64>,
    pending: f32,
}

/// Consumer recording every callback.
#[derive(Debug)]
pub struct Recorder {
    identity: u64,
    animation: AnimationConfig,
    clock: Option<Arc<dyn FrameClock>>,
    transform_delay: Duration,
    log: Mutex<Log>,
    signal: Condvar,
    in_transform: AtomicBool,
    overlapped: AtomicBool,
    transforms: AtomicU32,
    gate_armed: AtomicBool,
    gate_entered: Mutex<Option<mpsc::Sender<()>>>,
    gate: Mutex<()>,
}

impl Default for Recorder {
    fn default() -> Self {
        Self {
            identity: 0,
            animation: AnimationConfig::disabled(),
            clock: None,
            transform_delay: Duration::ZERO,
            log: Mutex::new(Log::default()),
            signal: Condvar::new(),
            in_transform: AtomicBool::new(false),
            overlapped: AtomicBool::new(false),
            transforms: AtomicU32::new(0),
            gate_armed: AtomicBool::new(false),
            gate_entered: Mutex::new(None),
            gate: Mutex::new(()),
        }
    }
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, identity: u64) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_animation(mut self, animation: AnimationConfig, clock: Arc<dyn FrameClock>) -> Self {
        self.animation = animation;
        self.clock = Some(clock);
        self
    }

    pub fn with_transform_delay(mut self, delay: Duration) -> Self {
        self.transform_delay = delay;
        self
    }

    /// Makes the next `update_ranges` calls report on `entered` and then block
    /// until the returned guard's mutex is released.
    pub fn arm_gate(&self, entered: mpsc::Sender<()>) -> parking_lot::MutexGuard<'_, ()> {
        *self.gate_entered.lock() = Some(entered);
        let guard = self.gate.lock();
        self.gate_armed.store(true, Ordering::SeqCst);
        guard
    }

    pub fn published(&self) -> Vec<Published> {
        self.log.lock().published.clone()
    }

    pub fn published_count(&self) -> usize {
        self.log.lock().published.len()
    }

    pub fn last_published(&self) -> Option<Published> {
        self.log.lock().published.last().cloned()
    }

    pub fn fractions(&self) -> Vec<f32> {
        self.log.lock().fractions.clone()
    }

    pub fn x_steps(&self) -> Vec<f64> {
        self.log.lock().x_steps.clone()
    }

    pub fn final_count(&self) -> usize {
        self.log
            .lock()
            .published
            .iter()
            .filter(|published| published.fraction >= 1.0)
            .count()
    }

    pub fn overlapped(&self) -> bool {
        self.overlapped.load(Ordering::SeqCst)
    }

    /// Waits until at least `count` frames with fraction `1.0` were published.
    pub fn wait_for_finals(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now()
            .checked_add(timeout)
            .expect("test timeouts fit the clock");
        let mut log = self.log.lock();
        loop {
            let finals = log
                .published
                .iter()
                .filter(|published| published.fraction >= 1.0)
                .count();
            if finals >= count {
                return true;
            }
            if self.signal.wait_until(&mut log, deadline).timed_out() {
                return false;
            }
        }
    }
}

impl ModelConsumer for Recorder {
    fn identity(&self) -> u64 {
        self.identity
    }

    fn animation(&self) -> AnimationConfig {
        self.animation
    }

    fn frame_clock(&self) -> Arc<dyn FrameClock> {
        match &self.clock {
            Some(clock) => Arc::clone(clock),
            None => SteppedClock::new(Duration::from_millis(16), Duration::from_millis(1)),
        }
    }

    fn update_ranges(&self, model: Option<&ChartModel>, ranges: &mut RangeAccumulator) {
        if self.gate_armed.load(Ordering::SeqCst) {
            if let Some(entered) = self.gate_entered.lock().as_ref() {
                let _ = entered.send(());
            }
            drop(self.gate.lock());
        }
        self.log.lock().x_steps.push(ranges.x_step());
        if let Some(model) = model {
            for layer in model.layers() {
                ranges.try_update(layer.min_x(), layer.max_x(), layer.min_y(), layer.max_y(), None);
            }
        }
    }

    fn prepare_for_transformation(
        &self,
        _model: Option<&ChartModel>,
        _host_extras: &mut MutableExtraStore,
        _ranges: &ChartRanges,
    ) {
    }

    fn transform(&self, host_extras: &mut MutableExtraStore, fraction: f32) {
        if self.in_transform.swap(true, Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        if !self.transform_delay.is_zero() {
            thread::sleep(self.transform_delay);
        }
        let transforms = self.transforms.fetch_add(1, Ordering::SeqCst) + 1;
        host_extras.set(&TRANSFORMS, transforms);
        {
            let mut log = self.log.lock();
            log.fractions.push(fraction);
            log.pending = fraction;
        }
        self.in_transform.store(false, Ordering::SeqCst);
    }

    fn on_model_created(&self, model: Option<ChartModel>, ranges: ChartRanges) {
        let mut log = self.log.lock();
        let fraction = log.pending;
        log.published.push(Published {
            fraction,
            model,
            ranges,
        });
        self.signal.notify_all();
    }
}
