use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    /// The availability window of a representation is inverted, so none of its
    /// segments can be requested yet.
    #[error("Segments unavailable, availability delay: {availability_delay}s")]
    SegmentsUnavailable { availability_delay: f64 },

    #[error("Invalid byte range: {0}")]
    InvalidByteRange(String),

    #[error("Segment loader error: {0}")]
    Loader(String),

    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
