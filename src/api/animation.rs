use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::{self, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::error::{ChartError, ChartResult};

/// How a consumer animates from one model to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// When `false` every update jumps straight to its final frame (previews,
    /// snapshot tests).
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Animate the very first model a consumer receives.
    #[serde(default = "default_animate_in")]
    pub animate_in: bool,
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
}

const fn default_enabled() -> bool {
    true
}

const fn default_animate_in() -> bool {
    true
}

const fn default_duration_ms() -> u64 {
    500
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            animate_in: default_animate_in(),
            duration_ms: default_duration_ms(),
        }
    }
}

impl AnimationConfig {
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_animate_in(mut self, animate_in: bool) -> Self {
        self.animate_in = animate_in;
        self
    }

    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    #[must_use]
    pub fn duration(self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Whether an update should run frames, given whether the consumer has
    /// already shown a model.
    #[must_use]
    pub fn should_animate(self, had_model: bool) -> bool {
        self.enabled && self.duration_ms > 0 && (had_model || self.animate_in)
    }
}

#[derive(Debug, Default)]
struct TokenState {
    cancelled: Mutex<bool>,
    signal: Condvar,
}

/// Shared cancellation flag that sleeping frame clocks can wait on.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    state: Arc<TokenState>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        *self.state.cancelled.lock() = true;
        self.state.signal.notify_all();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.state.cancelled.lock()
    }

    /// Sleeps up to `timeout`; returns `true` if cancelled meanwhile.
    ///
    /// A timeout past the representable clock range waits for cancellation
    /// only.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut cancelled = self.state.cancelled.lock();
        while !*cancelled {
            match deadline {
                Some(deadline) => {
                    if self
                        .state
                        .signal
                        .wait_until(&mut cancelled, deadline)
                        .timed_out()
                    {
                        break;
                    }
                }
                None => self.state.signal.wait(&mut cancelled),
            }
        }
        *cancelled
    }
}

/// Host-provided frame pacing.
///
/// `await_frame` blocks until the next frame and returns its timestamp, or
/// `None` once `token` is cancelled.
pub trait FrameClock: Send + Sync + fmt::Debug {
    fn await_frame(&self, token: &CancellationToken) -> Option<Instant>;
}

/// Longest accepted frame interval.
pub const MAX_FRAME_INTERVAL: Duration = Duration::from_secs(1);

/// Frame clock ticking at a fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalFrameClock {
    interval: Duration,
}

impl IntervalFrameClock {
    /// `interval` must be non-zero and at most [`MAX_FRAME_INTERVAL`].
    pub fn new(interval: Duration) -> ChartResult<Self> {
        if interval.is_zero() || interval > MAX_FRAME_INTERVAL {
            return Err(ChartError::InvalidParameter {
                name: "frame interval",
                value: interval.as_secs_f64() * 1_000.0,
            });
        }
        Ok(Self { interval })
    }

    #[must_use]
    pub fn interval(self) -> Duration {
        self.interval
    }
}

impl Default for IntervalFrameClock {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(16),
        }
    }
}

impl FrameClock for IntervalFrameClock {
    fn await_frame(&self, token: &CancellationToken) -> Option<Instant> {
        if token.wait_timeout(self.interval) {
            None
        } else {
            Some(Instant::now())
        }
    }
}

/// Callback run for every frame with the animation fraction.
///
/// The token passed in is cancelled when the frame has been superseded; the
/// callback should check it before publishing results.
pub(crate) type FrameCallback = Arc<dyn Fn(f32, &CancellationToken) + Send + Sync>;

/// Running animation: a driver thread paced by the frame clock, plus a frame
/// worker that executes intermediate frames.
#[derive(Debug)]
pub(crate) struct AnimationHandle {
    token: CancellationToken,
    driver: Option<JoinHandle<()>>,
}

impl AnimationHandle {
    pub(crate) fn spawn(
        clock: Arc<dyn FrameClock>,
        duration: Duration,
        on_frame: FrameCallback,
    ) -> Self {
        let token = CancellationToken::new();
        let driver_token = token.clone();
        let driver_frame = Arc::clone(&on_frame);
        let driver = thread::Builder::new()
            .name("chart-flow-animation".to_owned())
            .spawn(move || drive(clock.as_ref(), duration, &driver_frame, &driver_token));

        match driver {
            Ok(driver) => Self {
                token,
                driver: Some(driver),
            },
            Err(err) => {
                warn!(error = %err, "animation thread unavailable, jumping to final frame");
                on_frame(1.0, &token);
                Self {
                    token,
                    driver: None,
                }
            }
        }
    }

    #[must_use]
    pub(crate) fn is_finished(&self) -> bool {
        self.driver.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancels the animation and waits until no frame of it is running.
    pub(crate) fn cancel_and_join(mut self) {
        self.token.cancel();
        if let Some(driver) = self.driver.take() {
            if driver.join().is_err() {
                warn!("animation driver panicked");
            }
        }
    }
}

fn drive(
    clock: &dyn FrameClock,
    duration: Duration,
    on_frame: &FrameCallback,
    token: &CancellationToken,
) {
    // Rendezvous channel: a frame is only handed over while the worker idles,
    // otherwise it is dropped.
    let (frames, frame_rx) = mpsc::sync_channel::<f32>(0);
    let frame_token = CancellationToken::new();
    let worker = {
        let on_frame = Arc::clone(on_frame);
        let frame_token = frame_token.clone();
        thread::Builder::new()
            .name("chart-flow-frame".to_owned())
            .spawn(move || {
                for fraction in frame_rx {
                    if frame_token.is_cancelled() {
                        break;
                    }
                    on_frame(fraction, &frame_token);
                }
            })
    };
    let worker = match worker {
        Ok(worker) => Some(worker),
        Err(err) => {
            warn!(error = %err, "frame worker unavailable, skipping intermediate frames");
            None
        }
    };

    let mut started_at = None;
    let mut dropped_frames = 0_u32;
    while let Some(now) = clock.await_frame(token) {
        let start = *started_at.get_or_insert(now);
        let fraction = fraction_at(now.saturating_duration_since(start), duration);
        if fraction >= 1.0 {
            break;
        }
        if worker.is_some() {
            match frames.try_send(fraction) {
                Ok(()) => trace!(fraction, "animation frame dispatched"),
                Err(TrySendError::Full(_)) => dropped_frames += 1,
                Err(TrySendError::Disconnected(_)) => break,
            }
        }
    }

    frame_token.cancel();
    drop(frames);
    if let Some(worker) = worker {
        if worker.join().is_err() {
            warn!("animation frame worker panicked");
        }
    }

    if token.is_cancelled() {
        trace!(dropped_frames, "animation cancelled");
        return;
    }
    trace!(dropped_frames, "animation final frame");
    on_frame(1.0, token);
}

fn fraction_at(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0) as f32
}
