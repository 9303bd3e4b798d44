//! JSON description of a training run.
//!
//! ```json
//! {
//!     "topology": { "replicator": { "input_count": 17, "hidden": [10, 4, 10] } },
//!     "training": {
//!         "max_error": 0.01,
//!         "max_iterations": 5000,
//!         "optimizer": { "gradient_descent": { "learning_rate": 0.5 } }
//!     },
//!     "normalization": { "input": { "input_low": [..], "input_high": [..], .. } },
//!     "dataset": { "samples": [[..], [..]] },
//!     "seed": 42
//! }
//! ```
//!
//! When a dataset has no `targets`, every sample is its own target, which is what a replicator
//! network is trained on. Output ranges are rejected in that case since there is nothing for them
//! to rescale.

use std::{fs::File, io::BufReader, num::NonZeroUsize, path::Path};

use machine_learning::{
    arch::activations::ActFn,
    dataset::Dataset,
    optimization::{GradientDescent, GradientDescentWithMomentum},
    training::{Backpropagation, TrainStrategy},
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{NetworkError, Result},
    network::{DEFAULT_MAX_ERROR, NeuralNetwork, TrainingLimits},
    normalize::ColumnRanges,
    topology::TopologyPolicy,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyConfig {
    Standard {
        input_count: usize,
        hidden: Vec<usize>,
        output_count: usize,
        #[serde(default)]
        act_fn: ActFn,
        #[serde(default = "default_bias")]
        bias: bool,
    },
    Replicator {
        input_count: usize,
        hidden: Vec<usize>,
    },
}

fn default_bias() -> bool {
    true
}

impl TopologyConfig {
    pub fn input_count(&self) -> usize {
        match *self {
            Self::Standard { input_count, .. } | Self::Replicator { input_count, .. } => {
                input_count
            }
        }
    }

    pub fn output_count(&self) -> usize {
        match *self {
            Self::Standard { output_count, .. } => output_count,
            Self::Replicator { input_count, .. } => input_count,
        }
    }

    fn hidden(&self) -> &[usize] {
        match self {
            Self::Standard { hidden, .. } | Self::Replicator { hidden, .. } => hidden,
        }
    }

    fn policy(&self) -> TopologyPolicy {
        match *self {
            Self::Standard {
                output_count,
                act_fn,
                bias,
                ..
            } => TopologyPolicy::Standard {
                output_count,
                act_fn,
                bias,
            },
            Self::Replicator { .. } => TopologyPolicy::Replicator,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerConfig {
    GradientDescent { learning_rate: f64 },
    GradientDescentWithMomentum { learning_rate: f64, momentum: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_max_error")]
    pub max_error: f64,
    /// 0 means no cap.
    #[serde(default)]
    pub max_iterations: usize,
    pub optimizer: OptimizerConfig,
    /// The whole dataset is a single batch when missing.
    #[serde(default)]
    pub batch_size: Option<NonZeroUsize>,
}

fn default_max_error() -> f64 {
    DEFAULT_MAX_ERROR
}

/// Ranges used to rescale the samples and the targets before training.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationConfig {
    #[serde(default)]
    pub input: Option<ColumnRanges>,
    #[serde(default)]
    pub output: Option<ColumnRanges>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub samples: Vec<Vec<f64>>,
    #[serde(default)]
    pub targets: Option<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub topology: TopologyConfig,
    pub training: TrainingConfig,
    #[serde(default)]
    pub normalization: NormalizationConfig,
    pub dataset: DatasetConfig,
    /// Seeds the weight initialization, random when missing.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Reads and validates a `RunConfig` from a JSON file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RunConfig> {
    let reader = BufReader::new(File::open(path)?);
    let config: RunConfig = serde_json::from_reader(reader)?;
    config.validate()?;
    Ok(config)
}

impl RunConfig {
    /// Parses and validates a `RunConfig` from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks everything that can be checked without building the network.
    pub fn validate(&self) -> Result<()> {
        TrainingLimits::new(self.training.max_error, self.training.max_iterations)?;

        let inputs = self.topology.input_count();
        let outputs = self.topology.output_count();

        if let Some(ranges) = &self.normalization.input {
            check_ranges(ranges, "input ranges", inputs)?;
        }

        if let Some(ranges) = &self.normalization.output {
            if self.dataset.targets.is_none() {
                return Err(NetworkError::InvalidConfig(
                    "output ranges given for a dataset without targets".into(),
                ));
            }

            check_ranges(ranges, "output ranges", outputs)?;
        }

        let samples = &self.dataset.samples;
        if samples.is_empty() {
            return Err(NetworkError::EmptyInput);
        }

        check_rows(samples, "sample", inputs)?;

        match &self.dataset.targets {
            Some(targets) => {
                if targets.len() != samples.len() {
                    return Err(NetworkError::DimensionMismatch {
                        what: "targets",
                        got: targets.len(),
                        expected: samples.len(),
                    });
                }

                check_rows(targets, "target", outputs)
            }
            None if inputs != outputs => Err(NetworkError::DimensionMismatch {
                what: "targets",
                got: inputs,
                expected: outputs,
            }),
            None => Ok(()),
        }
    }

    /// Builds the network described by the topology, with the training limits applied.
    pub fn build_network(&self) -> Result<NeuralNetwork> {
        let input_count = self.topology.input_count();
        let hidden = self.topology.hidden();
        let policy = self.topology.policy();

        let mut network = match self.seed {
            Some(seed) => NeuralNetwork::with_seed(input_count, hidden, policy, seed)?,
            None => NeuralNetwork::new(input_count, hidden, policy)?,
        };

        network.set_limits(TrainingLimits::new(
            self.training.max_error,
            self.training.max_iterations,
        )?);
        Ok(network)
    }

    /// The normalized samples paired with their normalized targets.
    pub fn dataset(&self) -> Result<Dataset> {
        let samples = rescale(&self.dataset.samples, self.normalization.input.as_ref())?;

        let targets = match &self.dataset.targets {
            Some(targets) => rescale(targets, self.normalization.output.as_ref())?,
            None => samples.clone(),
        };

        Ok(Dataset::from_pairs(samples.as_slice(), targets.as_slice())?)
    }

    /// Backpropagation over `dataset` with the configured optimizer.
    pub fn strategy(&self, dataset: Dataset) -> Box<dyn TrainStrategy> {
        let batch_size = self
            .training
            .batch_size
            .or_else(|| NonZeroUsize::new(dataset.len()))
            .unwrap_or(NonZeroUsize::MIN);

        match self.training.optimizer {
            OptimizerConfig::GradientDescent { learning_rate } => Box::new(Backpropagation::new(
                dataset,
                GradientDescent::new(learning_rate),
                batch_size,
            )),
            OptimizerConfig::GradientDescentWithMomentum {
                learning_rate,
                momentum,
            } => Box::new(Backpropagation::new(
                dataset,
                GradientDescentWithMomentum::new(learning_rate, momentum),
                batch_size,
            )),
        }
    }
}

fn check_ranges(ranges: &ColumnRanges, what: &'static str, expected: usize) -> Result<()> {
    ranges.validate_normalize()?;

    if ranges.len() != expected {
        return Err(NetworkError::DimensionMismatch {
            what,
            got: ranges.len(),
            expected,
        });
    }

    Ok(())
}

fn check_rows(rows: &[Vec<f64>], what: &'static str, expected: usize) -> Result<()> {
    match rows.iter().find(|row| row.len() != expected) {
        Some(row) => Err(NetworkError::DimensionMismatch {
            what,
            got: row.len(),
            expected,
        }),
        None => Ok(()),
    }
}

fn rescale(rows: &[Vec<f64>], ranges: Option<&ColumnRanges>) -> Result<Vec<Vec<f64>>> {
    match ranges {
        Some(ranges) => rows.iter().map(|row| ranges.normalize_row(row)).collect(),
        None => Ok(rows.to_vec()),
    }
}
