//! On-disk artifacts of a trained network.
//!
//! A network saved under a base path `p` is made of two files: `p.network`, written by the
//! engine, and `p.training`, holding the training error as a plain decimal number.

use std::{
    ffi::OsString,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::error::{NetworkError, Result};

pub const NETWORK_EXTENSION: &str = "network";
pub const TRAINING_EXTENSION: &str = "training";

/// The two files that make up a saved network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub network: PathBuf,
    pub training: PathBuf,
}

impl ArtifactPaths {
    /// Appends the artifact extensions to `base`. Any extension `base` already has is kept, so
    /// `model.v2` becomes `model.v2.network`.
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        let base = base.as_ref();
        Self {
            network: with_extension_appended(base, NETWORK_EXTENSION),
            training: with_extension_appended(base, TRAINING_EXTENSION),
        }
    }
}

fn with_extension_appended(base: &Path, extension: &str) -> PathBuf {
    let mut path = OsString::from(base.as_os_str());
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

/// Writes `error` with 20 fractional digits.
pub fn write_training_error<P: AsRef<Path>>(path: P, error: f64) -> Result<()> {
    let mut file = File::create(path)?;
    write!(file, "{error:.20}")?;
    file.flush()?;
    Ok(())
}

/// Parses the first whitespace separated token of `contents` as the training error.
pub fn parse_training_error(contents: &str) -> Result<f64> {
    let token = contents
        .split_whitespace()
        .next()
        .ok_or_else(|| NetworkError::MalformedTrainingError(contents.to_string()))?;

    token
        .parse()
        .map_err(|_| NetworkError::MalformedTrainingError(token.to_string()))
}

pub fn read_training_error<P: AsRef<Path>>(path: P) -> Result<f64> {
    parse_training_error(&fs::read_to_string(path)?)
}
