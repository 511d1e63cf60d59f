//! Error types for campbell-mbc.

use std::path::PathBuf;

use num_complex::Complex;
use thiserror::Error;

/// Broad class of a failure, for callers deciding how to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed linearization file.
    Format,
    /// Samples or descriptors that cannot form a valid transform.
    Structural,
    /// Decomposition that did not converge or non-finite data.
    Numeric,
    /// Invalid configuration, worker pool or output setup.
    Config,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] campbell_lin::Error),

    #[error("blade group '{label}' has {count} members (rows {rows:?}), expected 3")]
    TripletSize {
        label: String,
        count: usize,
        rows: Vec<usize>,
    },

    #[error("blade triplets are not distinct indices below {len}")]
    InvalidTriplets { len: usize },

    #[error("no samples to transform")]
    EmptySampleSet,

    #[error("{file}: {what} is {actual}, first sample has {expected}")]
    InconsistentSamples {
        file: String,
        what: String,
        expected: String,
        actual: String,
    },

    #[error("{file}: {category} table has {actual} rows, expected {expected}")]
    TableLength {
        file: String,
        category: String,
        expected: usize,
        actual: usize,
    },

    #[error("{file}: {num_x2} second-order states do not split into positions and velocities")]
    OddSecondOrderStates { file: String, num_x2: usize },

    #[error("{file}: state {row} has derivative order 2 after first-order states")]
    StateOrdering { file: String, row: usize },

    #[error("{file}: missing matrix {matrix}")]
    MissingMatrix { file: String, matrix: &'static str },

    #[error("{file}: matrix {matrix} is {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        file: String,
        matrix: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("matrix {matrix} contains non-finite values")]
    NonFinite { matrix: &'static str },

    #[error("eigendecomposition of {size}x{size} state matrix did not converge")]
    EigenNotConverged { size: usize },

    #[error("eigenvector for eigenvalue {eigenvalue} did not converge")]
    EigenvectorNotConverged { eigenvalue: Complex<f64> },

    #[error("invalid blade pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Format(_) => ErrorKind::Format,
            Error::TripletSize { .. }
            | Error::InvalidTriplets { .. }
            | Error::EmptySampleSet
            | Error::InconsistentSamples { .. }
            | Error::TableLength { .. }
            | Error::OddSecondOrderStates { .. }
            | Error::StateOrdering { .. }
            | Error::MissingMatrix { .. }
            | Error::ShapeMismatch { .. } => ErrorKind::Structural,
            Error::NonFinite { .. }
            | Error::EigenNotConverged { .. }
            | Error::EigenvectorNotConverged { .. } => ErrorKind::Numeric,
            Error::InvalidPattern { .. }
            | Error::ConfigRead { .. }
            | Error::ConfigParse { .. }
            | Error::ThreadPool(_)
            | Error::Json(_) => ErrorKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
