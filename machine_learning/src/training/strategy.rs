use crate::{Result, network::Network};

/// A training algorithm that can be stepped over a network.
///
/// A strategy owns everything the algorithm needs (data, optimizer state, buffers) but not the
/// network itself, which is lent to it on every iteration.
pub trait TrainStrategy {
    /// Runs one training iteration over the network.
    ///
    /// # Errors
    /// Implementations should return `MlErr::SizeMismatch` when the network and the data they
    /// hold don't fit together.
    fn iteration(&mut self, network: &mut Network) -> Result<()>;

    /// The error measured during the last iteration, `0.0` before the first one.
    fn error(&self) -> f64;

    /// A short human readable name for the algorithm.
    fn name(&self) -> &'static str;
}
