//! chart-flow: chart data engine with range computation and animated model
//! transitions.
//!
//! Data enters through [`api::ModelProducer`] transactions as layer partials,
//! is completed into immutable [`core::ChartModel`]s and fanned out to
//! registered [`api::ModelConsumer`]s, which compute ranges and interpolate
//! [`drawing`] models frame by frame.

pub mod api;
pub mod core;
pub mod drawing;
pub mod error;
pub mod interaction;
pub mod sample;
pub mod telemetry;

pub use api::{ChartHost, ChartHostConfig, ConsumerKey, ModelConsumer, ModelProducer, Transaction};
pub use error::{ChartError, ChartResult};
