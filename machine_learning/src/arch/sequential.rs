use ndarray::{Array2, ArrayView2};

use super::{Model, layers::Dense, loss::LossFn};
use crate::{MlErr, Result, optimization::Optimizer};

/// A sequential model: information flows forward when computing an output and backward when
/// computing the *deltas* of its layers.
#[derive(Clone, Debug, PartialEq)]
pub struct Sequential {
    layers: Vec<Dense>,
}

impl Sequential {
    /// Creates a new `Sequential`.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    ///
    /// # Returns
    /// A new `Sequential` instance.
    pub fn new<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Dense>,
    {
        Self {
            layers: layers.into_iter().collect(),
        }
    }

    /// Offset of each layer's slice inside the flat parameter buffer.
    fn offsets(&self) -> Vec<usize> {
        self.layers
            .iter()
            .scan(0, |acc, layer| {
                let start = *acc;
                *acc += layer.size();
                Some(start)
            })
            .collect()
    }

    fn check_len(&self, what: &'static str, got: usize) -> Result<()> {
        let expected = self.size();
        if got != expected {
            return Err(MlErr::SizeMismatch {
                what,
                got,
                expected,
            });
        }

        Ok(())
    }
}

impl Model for Sequential {
    fn size(&self) -> usize {
        self.layers.iter().map(|layer| layer.size()).sum()
    }

    fn predict(&self, params: &[f64], x: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.check_len("model parameters", params.len())?;

        let mut rest = params;
        let mut a = x.to_owned();
        for layer in &self.layers {
            let (layer_params, tail) = rest.split_at(layer.size());
            rest = tail;
            (_, a) = layer.forward(layer_params, a.view())?;
        }

        Ok(a)
    }

    // NOTE: the returned loss is the average of the losses measured at each batch before its
    // update, not the loss of the final parameters over the whole dataset.
    fn backprop<'a, L, O, I>(
        &self,
        params: &mut [f64],
        grad: &mut [f64],
        loss_fn: &L,
        optimizer: &mut O,
        batches: I,
    ) -> Result<f64>
    where
        L: LossFn,
        O: Optimizer,
        I: Iterator<Item = (ArrayView2<'a, f64>, ArrayView2<'a, f64>)>,
    {
        self.check_len("model parameters", params.len())?;
        self.check_len("model gradient", grad.len())?;

        let offsets = self.offsets();
        let mut total_loss = 0.0;
        let mut num_batches = 0;

        for (x, y) in batches {
            let mut inputs = Vec::with_capacity(self.layers.len());
            let mut sums = Vec::with_capacity(self.layers.len());
            let mut a = x.to_owned();

            for (layer, &start) in self.layers.iter().zip(&offsets) {
                let (z, next) = layer.forward(&params[start..start + layer.size()], a.view())?;
                inputs.push(a);
                sums.push(z);
                a = next;
            }

            if a.dim() != y.dim() {
                return Err(MlErr::SizeMismatch {
                    what: "batch targets",
                    got: y.ncols(),
                    expected: a.ncols(),
                });
            }

            total_loss += loss_fn.loss(a.view(), y);
            num_batches += 1;

            let mut d = loss_fn.loss_prime(a.view(), y);
            for (i, layer) in self.layers.iter().enumerate().rev() {
                let range = offsets[i]..offsets[i] + layer.size();
                d = layer.backward(
                    &params[range.clone()],
                    &mut grad[range],
                    inputs[i].view(),
                    sums[i].view(),
                    d,
                )?;
            }

            optimizer.update_params(params, grad);
        }

        if num_batches == 0 {
            return Ok(0.0);
        }

        Ok(total_loss / num_batches as f64)
    }
}
