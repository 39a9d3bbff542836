use crate::distance::StopId;

/// Errors produced by the route optimizer and the seat recommender.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A chromosome was built from something that is not a permutation of the
    /// stop indices. Reaching this from the optimizer is a bug.
    #[error("InvalidPermutation: expected a permutation of 0..{expected}, got {found:?}")]
    InvalidPermutation { expected: usize, found: Vec<usize> },
    #[error("EmptyInput: at least one stop is required")]
    EmptyInput,
    #[error("InvalidConfiguration: {0}")]
    InvalidConfiguration(String),
    #[error("InvalidStop: id={id}, latitude={latitude}, longitude={longitude}")]
    InvalidStop {
        id: StopId,
        latitude: f64,
        longitude: f64,
    },
    #[error("DuplicateStopId: {0}")]
    DuplicateStopId(StopId),
    #[error("CsvError: {0}")]
    Csv(#[from] csv::Error),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("RenderError: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;
