//! Producer/consumer surface: transactions, registrations and the animation
//! engine, plus a reference consumer.

mod animation;
mod chart_host;
mod consumer;
mod host_config;
mod producer;

pub use animation::{
    AnimationConfig, CancellationToken, FrameClock, IntervalFrameClock, MAX_FRAME_INTERVAL,
};
pub use chart_host::{ChartHost, DrawingModels, HostSnapshot};
pub use consumer::{ConsumerKey, ConsumerState, ModelConsumer};
pub use host_config::{ChartHostConfig, ColumnMergeMode, LayerConfig};
pub use producer::{ModelProducer, Transaction};
