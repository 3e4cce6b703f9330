use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("series at index {index} has no entries")]
    EmptySeries { index: usize },

    #[error("a layer partial needs at least one series")]
    NoSeries,

    #[error("a chart model needs at least one layer")]
    NoLayers,

    #[error("series length mismatch: xs={xs}, ys={ys}")]
    SeriesLengthMismatch { xs: usize, ys: usize },

    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("consumer {key} was re-registered with a different structure")]
    InconsistentRegistration { key: u64 },

    #[error("extra store has no value for key {key}")]
    MissingExtra { key: u64 },
}
