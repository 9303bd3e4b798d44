use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    NotEnoughLayers {
        got: usize,
    },
    EmptyLayer {
        index: usize,
    },
    InvalidDataset(String),
    Io(io::Error),
    Serde(serde_json::Error),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch in {what}, got {got} and expected {expected}"
            ),
            MlErr::NotEnoughLayers { got } => write!(
                f,
                "A network needs at least an input and an output layer, got {got} layer(s)"
            ),
            MlErr::EmptyLayer { index } => {
                write!(f, "Layer {index} has no neurons")
            }
            MlErr::InvalidDataset(msg) => write!(f, "Invalid dataset: {msg}"),
            MlErr::Io(e) => write!(f, "io error: {e}"),
            MlErr::Serde(e) => write!(f, "failed to (de)serialize the network: {e}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Io(e) => Some(e),
            MlErr::Serde(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MlErr {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for MlErr {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e)
    }
}
