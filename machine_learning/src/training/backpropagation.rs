use std::num::NonZeroUsize;

use crate::{
    MlErr, Result,
    arch::{Model, loss::Mse},
    dataset::Dataset,
    network::Network,
    optimization::Optimizer,
};

use super::TrainStrategy;

/// Mini-batch backpropagation of the mean squared error.
///
/// Every iteration is a full pass over the dataset.
pub struct Backpropagation<O: Optimizer> {
    dataset: Dataset,
    optimizer: O,
    batch_size: NonZeroUsize,
    grad: Vec<f64>,
    error: f64,
    iterations: usize,
}

impl<O: Optimizer> Backpropagation<O> {
    /// Creates a new `Backpropagation`.
    ///
    /// # Arguments
    /// * `dataset` - The samples to fit.
    /// * `optimizer` - How parameters are updated after each batch.
    /// * `batch_size` - Maximum amount of samples per batch.
    pub fn new(dataset: Dataset, optimizer: O, batch_size: NonZeroUsize) -> Self {
        Self {
            dataset,
            optimizer,
            batch_size,
            grad: Vec::new(),
            error: 0.0,
            iterations: 0,
        }
    }

    /// Creates a new `Backpropagation` that uses the whole dataset as a single batch.
    pub fn full_batch(dataset: Dataset, optimizer: O) -> Self {
        let batch_size = NonZeroUsize::new(dataset.len()).unwrap_or(NonZeroUsize::MIN);
        Self::new(dataset, optimizer, batch_size)
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl<O: Optimizer> TrainStrategy for Backpropagation<O> {
    fn iteration(&mut self, network: &mut Network) -> Result<()> {
        if self.dataset.x_size() != network.input_count() {
            return Err(MlErr::SizeMismatch {
                what: "dataset inputs",
                got: self.dataset.x_size(),
                expected: network.input_count(),
            });
        }

        if self.dataset.y_size() != network.output_count() {
            return Err(MlErr::SizeMismatch {
                what: "dataset outputs",
                got: self.dataset.y_size(),
                expected: network.output_count(),
            });
        }

        let (model, params) = network.parts_mut();
        self.grad.resize(model.size(), 0.0);

        self.error = model.backprop(
            params,
            &mut self.grad,
            &Mse,
            &mut self.optimizer,
            self.dataset.batches(self.batch_size),
        )?;
        self.iterations += 1;

        log::trace!("iteration {} error {}", self.iterations, self.error);
        Ok(())
    }

    fn error(&self) -> f64 {
        self.error
    }

    fn name(&self) -> &'static str {
        "backpropagation"
    }
}
