use std::{error::Error, fmt, io};

use machine_learning::MlErr;

use crate::topology::LayerPosition;

/// The result type used across the crate.
pub type Result<T> = std::result::Result<T, NetworkError>;

/// Everything that can go wrong while building, using or persisting a network.
#[derive(Debug)]
pub enum NetworkError {
    /// A range has the same low and high bound, so nothing can be mapped into or out of it.
    RangeDegenerate { low: f64, high: f64 },
    /// A range has a NaN bound or a span too wide to be represented.
    RangeNotFinite { low: f64, high: f64 },
    /// Two sequences that should have the same length don't.
    DimensionMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// A replicator network was requested with a number of hidden layers other than three.
    WrongHiddenLayerCount { got: usize, expected: usize },
    /// A layer was declared with no units.
    NonPositiveLayerSize { layer: LayerPosition },
    /// The sample given to the network doesn't have one value per input unit.
    InputSizeMismatch { got: usize, expected: usize },
    /// The training error target must be strictly positive.
    InvalidMaxError(f64),
    /// An error was requested over empty vectors.
    EmptyInput,
    /// The stored training error could not be read back.
    MalformedTrainingError(String),
    /// A run configuration is well formed but inconsistent.
    InvalidConfig(String),
    /// The network engine failed.
    Engine(MlErr),
    Io(io::Error),
    Config(serde_json::Error),
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RangeDegenerate { low, high } => {
                write!(f, "degenerate range: low ({low}) and high ({high}) are equal")
            }
            Self::RangeNotFinite { low, high } => {
                write!(f, "range [{low}, {high}] does not have a finite span")
            }
            Self::DimensionMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "dimension mismatch for {what}: got {got}, expected {expected}"
            ),
            Self::WrongHiddenLayerCount { got, expected } => write!(
                f,
                "wrong number of hidden layers: got {got}, expected {expected}"
            ),
            Self::NonPositiveLayerSize { layer } => {
                write!(f, "{layer} must have more than 0 units")
            }
            Self::InputSizeMismatch { got, expected } => write!(
                f,
                "input size mismatch: got {got} values for {expected} input units"
            ),
            Self::InvalidMaxError(e) => write!(f, "max error must be greater than 0, got {e}"),
            Self::EmptyInput => write!(f, "cannot compute an error over empty vectors"),
            Self::MalformedTrainingError(s) => write!(f, "malformed training error: {s:?}"),
            Self::InvalidConfig(s) => write!(f, "invalid config: {s}"),
            Self::Engine(e) => write!(f, "network engine error: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Config(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl Error for NetworkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Engine(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MlErr> for NetworkError {
    fn from(e: MlErr) -> Self {
        Self::Engine(e)
    }
}

impl From<io::Error> for NetworkError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e)
    }
}
