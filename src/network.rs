use std::{fmt, path::Path};

use log::{debug, info, warn};
use machine_learning::{Network, training::TrainStrategy};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    error::{NetworkError, Result},
    persist::{self, ArtifactPaths},
    topology::{LayerSpec, TopologyKind, TopologyPolicy, TopologySpec},
};

/// Training stops once the error is at or below this value, unless told otherwise.
pub const DEFAULT_MAX_ERROR: f64 = 0.1;

/// When to stop training.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingLimits {
    max_error: f64,
    max_iterations: usize,
}

impl TrainingLimits {
    /// Creates new `TrainingLimits`. A `max_iterations` of 0 means no cap.
    ///
    /// # Errors
    /// `InvalidMaxError` unless `max_error > 0`.
    pub fn new(max_error: f64, max_iterations: usize) -> Result<Self> {
        if !(max_error > 0.0) {
            return Err(NetworkError::InvalidMaxError(max_error));
        }

        Ok(Self {
            max_error,
            max_iterations,
        })
    }

    pub fn max_error(&self) -> f64 {
        self.max_error
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }
}

impl Default for TrainingLimits {
    fn default() -> Self {
        Self {
            max_error: DEFAULT_MAX_ERROR,
            max_iterations: 0,
        }
    }
}

/// The outcome of a call to `NeuralNetwork::train`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainReport {
    pub iterations: usize,
    pub error: f64,
    /// Whether the error reached the max error before running out of iterations.
    pub converged: bool,
}

/// Mean squared error between the expected and the obtained values.
///
/// # Errors
/// `DimensionMismatch` if the slices have different lengths, `EmptyInput` if both are empty.
pub fn mean_squared_error(ideal: &[f64], output: &[f64]) -> Result<f64> {
    if ideal.len() != output.len() {
        return Err(NetworkError::DimensionMismatch {
            what: "output",
            got: output.len(),
            expected: ideal.len(),
        });
    }

    if ideal.is_empty() {
        return Err(NetworkError::EmptyInput);
    }

    let sum: f64 = ideal
        .iter()
        .zip(output)
        .map(|(i, o)| (i - o).powi(2))
        .sum();

    Ok(sum / ideal.len() as f64)
}

/// A feed-forward network together with the topology it was built from, the limits used to train
/// it and the error it reached.
#[derive(Debug, Clone)]
pub struct NeuralNetwork {
    topology: TopologySpec,
    network: Network,
    limits: TrainingLimits,
    train_error: f64,
    trained_with: Option<&'static str>,
}

impl NeuralNetwork {
    /// Builds a network with randomly initialized weights.
    ///
    /// # Arguments
    /// * `input_count` - Number of input units.
    /// * `hidden_sizes` - Number of units on each hidden layer, in order.
    /// * `policy` - How the layers are laid out.
    pub fn new(input_count: usize, hidden_sizes: &[usize], policy: TopologyPolicy) -> Result<Self> {
        let topology = policy.build(input_count, hidden_sizes)?;
        let network = Network::new(topology.to_basic_layers())?;
        Ok(Self::from_parts(topology, network))
    }

    /// Same as `new` with weights drawn from a generator seeded with `seed`.
    pub fn with_seed(
        input_count: usize,
        hidden_sizes: &[usize],
        policy: TopologyPolicy,
        seed: u64,
    ) -> Result<Self> {
        let topology = policy.build(input_count, hidden_sizes)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let network = Network::with_rng(topology.to_basic_layers(), &mut rng)?;
        Ok(Self::from_parts(topology, network))
    }

    /// A replicator network: as many outputs as inputs and three hidden layers.
    pub fn replicator(input_count: usize, hidden_sizes: &[usize]) -> Result<Self> {
        Self::new(input_count, hidden_sizes, TopologyPolicy::Replicator)
    }

    /// A standard network with sigmoid activations and bias units on every layer.
    pub fn standard(input_count: usize, hidden_sizes: &[usize], output_count: usize) -> Result<Self> {
        Self::new(
            input_count,
            hidden_sizes,
            TopologyPolicy::standard(output_count),
        )
    }

    fn from_parts(topology: TopologySpec, network: Network) -> Self {
        info!(
            "built {:?} network {topology} with {} parameters",
            topology.kind(),
            network.params().len()
        );

        Self {
            topology,
            network,
            limits: TrainingLimits::default(),
            train_error: 0.0,
            trained_with: None,
        }
    }

    pub fn num_inputs(&self) -> usize {
        self.topology.input_count()
    }

    pub fn num_outputs(&self) -> usize {
        self.topology.output_count()
    }

    pub fn hidden_layers(&self) -> Vec<usize> {
        self.topology.hidden_sizes()
    }

    pub fn topology(&self) -> &TopologySpec {
        &self.topology
    }

    pub fn kind(&self) -> TopologyKind {
        self.topology.kind()
    }

    /// The underlying engine network.
    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn limits(&self) -> TrainingLimits {
        self.limits
    }

    pub fn set_limits(&mut self, limits: TrainingLimits) {
        self.limits = limits;
    }

    /// # Errors
    /// `InvalidMaxError` unless `max_error > 0`.
    pub fn set_max_error(&mut self, max_error: f64) -> Result<()> {
        self.limits = TrainingLimits::new(max_error, self.limits.max_iterations)?;
        Ok(())
    }

    pub fn max_error(&self) -> f64 {
        self.limits.max_error
    }

    /// Caps the amount of iterations `train` runs, 0 removes the cap.
    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.limits.max_iterations = max_iterations;
    }

    pub fn max_iterations(&self) -> usize {
        self.limits.max_iterations
    }

    /// The error reached by the last training, or the one stored with a loaded network.
    pub fn train_error(&self) -> f64 {
        self.train_error
    }

    /// Feeds `input` to the network and returns the values of the output units.
    ///
    /// # Errors
    /// `InputSizeMismatch` unless there's exactly one value per input unit.
    pub fn compute(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.num_inputs() {
            return Err(NetworkError::InputSizeMismatch {
                got: input.len(),
                expected: self.num_inputs(),
            });
        }

        Ok(self.network.compute(input)?)
    }

    /// Mean squared error between `ideal` and `output`.
    pub fn calculate_error(&self, ideal: &[f64], output: &[f64]) -> Result<f64> {
        mean_squared_error(ideal, output)
    }

    /// Runs `strategy` until the error is at or below the max error or the max iterations are
    /// reached. The last error is recorded as the training error.
    pub fn train<S>(&mut self, strategy: &mut S) -> Result<TrainReport>
    where
        S: TrainStrategy + ?Sized,
    {
        let TrainingLimits {
            max_error,
            max_iterations,
        } = self.limits;

        info!(
            "training with {} until error <= {max_error} ({} iterations max)",
            strategy.name(),
            if max_iterations == 0 {
                "no".to_string()
            } else {
                max_iterations.to_string()
            }
        );

        let mut iterations = 0;
        let converged = loop {
            strategy.iteration(&mut self.network)?;
            iterations += 1;
            self.trained_with = Some(strategy.name());
            self.update_train_error(strategy);
            debug!("iteration {iterations}: error {}", self.train_error);

            if self.train_error <= max_error {
                break true;
            }

            if !self.train_error.is_finite() {
                warn!("training diverged at iteration {iterations}");
                break false;
            }

            if max_iterations != 0 && iterations >= max_iterations {
                break false;
            }
        };

        info!(
            "training stopped after {iterations} iteration(s) with error {} (converged: {converged})",
            self.train_error
        );

        Ok(TrainReport {
            iterations,
            error: self.train_error,
            converged,
        })
    }

    /// Records the last error measured by `strategy` as the training error.
    pub fn update_train_error<S>(&mut self, strategy: &S)
    where
        S: TrainStrategy + ?Sized,
    {
        self.train_error = strategy.error();
    }

    pub fn summary(&self) -> NetworkSummary {
        NetworkSummary {
            num_inputs: self.num_inputs(),
            hidden_layers: self.hidden_layers(),
            num_outputs: self.num_outputs(),
            max_error: self.max_error(),
            max_iterations: self.max_iterations(),
            train_error: self.train_error,
            trained_with: self.trained_with,
        }
    }

    /// Logs the current configuration.
    pub fn inspect(&self) {
        for line in self.summary().to_string().lines() {
            info!("{line}");
        }
    }

    /// Saves the network to `<base>.network` and the training error to `<base>.training`.
    pub fn save<P: AsRef<Path>>(&self, base: P) -> Result<()> {
        let paths = ArtifactPaths::new(base);
        self.network.save(&paths.network)?;
        persist::write_training_error(&paths.training, self.train_error)?;

        info!(
            "saved network to {} and {}",
            paths.network.display(),
            paths.training.display()
        );
        Ok(())
    }

    /// Loads a network saved with `save`. The training limits are reset to their defaults.
    pub fn load<P: AsRef<Path>>(base: P) -> Result<Self> {
        let paths = ArtifactPaths::new(base);
        let network = Network::load(&paths.network)?;
        let layers = network.layers().iter().map(LayerSpec::from).collect();
        let topology = TopologySpec::from_layers(layers)?;
        let train_error = persist::read_training_error(&paths.training)?;

        info!(
            "loaded {:?} network {topology} from {}",
            topology.kind(),
            paths.network.display()
        );

        Ok(Self {
            topology,
            network,
            limits: TrainingLimits::default(),
            train_error,
            trained_with: None,
        })
    }
}

/// A snapshot of a network's configuration, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSummary {
    pub num_inputs: usize,
    pub hidden_layers: Vec<usize>,
    pub num_outputs: usize,
    pub max_error: f64,
    pub max_iterations: usize,
    pub train_error: f64,
    pub trained_with: Option<&'static str>,
}

impl fmt::Display for NetworkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hidden: Vec<String> = self.hidden_layers.iter().map(|h| h.to_string()).collect();

        writeln!(f, "NumInputs = {}", self.num_inputs)?;
        writeln!(f, "Hidden layers = {}", hidden.join("-"))?;
        writeln!(f, "NumOutputs = {}", self.num_outputs)?;
        writeln!(f, "MaxError = {}", self.max_error)?;
        writeln!(f, "MaxIterations = {}", self.max_iterations)?;

        if self.train_error > 0.0 {
            writeln!(f, "TrainError = {}", self.train_error)?;
        }

        if let Some(name) = self.trained_with {
            writeln!(f, "Training = {name}")?;
        }

        Ok(())
    }
}
