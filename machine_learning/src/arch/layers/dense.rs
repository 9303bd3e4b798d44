use ndarray::{linalg, prelude::*};

use crate::{MlErr, Result, arch::activations::ActFn};

/// A fully connected link between two consecutive layers.
///
/// The parameters of the link live outside of it, in a flat slice laid out as the `dim.0 *
/// dim.1` weights (row major) followed, when `bias` is set, by the `dim.1` biases.
#[derive(Clone, Debug, PartialEq)]
pub struct Dense {
    dim: (usize, usize),
    bias: bool,
    act_fn: Option<ActFn>,
}

impl Dense {
    /// Creates a new `Dense` link.
    ///
    /// # Arguments
    /// * `dim` - The amount of neurons in the source and destination layers.
    /// * `bias` - Whether the source layer has a bias unit.
    /// * `act_fn` - The activation of the destination layer, `None` for a linear output.
    pub fn new(dim: (usize, usize), bias: bool, act_fn: Option<ActFn>) -> Self {
        Self { dim, bias, act_fn }
    }

    /// Returns the size of this layer.
    ///
    /// # Returns
    /// The amount of parameters this layer has.
    pub fn size(&self) -> usize {
        let (n, m) = self.dim;
        n * m + if self.bias { m } else { 0 }
    }

    /// Computes the weighted sums and the activations of the destination layer.
    ///
    /// # Arguments
    /// * `params` - This layer's slice of parameters.
    /// * `x` - The activations of the source layer, one sample per row.
    ///
    /// # Returns
    /// A tuple with the weighted sums and the activations, or an error if the shapes don't match.
    pub fn forward(
        &self,
        params: &[f64],
        x: ArrayView2<f64>,
    ) -> Result<(Array2<f64>, Array2<f64>)> {
        if x.ncols() != self.dim.0 {
            return Err(MlErr::SizeMismatch {
                what: "layer input",
                got: x.ncols(),
                expected: self.dim.0,
            });
        }

        let (w, b) = self.view_params(params)?;
        let mut z = x.dot(&w);
        if let Some(b) = b {
            z += &b;
        }

        let a = match self.act_fn {
            Some(act_fn) => z.mapv(|z| act_fn.f(z)),
            None => z.clone(),
        };

        Ok((z, a))
    }

    /// Propagates the delta of the destination layer back to the source layer.
    ///
    /// # Arguments
    /// * `params` - This layer's slice of parameters.
    /// * `grad` - This layer's slice of the gradient, overwritten with the new gradient.
    /// * `x` - The input that was given to `forward`.
    /// * `z` - The weighted sums returned by `forward`.
    /// * `d` - The derivative of the loss with respect to this layer's activations.
    ///
    /// # Returns
    /// The derivative of the loss with respect to this layer's input.
    pub fn backward(
        &self,
        params: &[f64],
        grad: &mut [f64],
        x: ArrayView2<f64>,
        z: ArrayView2<f64>,
        mut d: Array2<f64>,
    ) -> Result<Array2<f64>> {
        if let Some(act_fn) = self.act_fn {
            d.zip_mut_with(&z, |d, &z| *d *= act_fn.df(z));
        }

        let (mut dw, db) = self.view_grad(grad)?;
        linalg::general_mat_mul(1.0, &x.t(), &d, 0.0, &mut dw);
        if let Some(mut db) = db {
            db.assign(&d.sum_axis(Axis(0)));
        }

        let (w, _) = self.view_params(params)?;
        Ok(d.dot(&w.t()))
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

    /// Gives a view of the raw gradient slice as the delta weights and delta biases of this layer.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f64],
    ) -> Result<(ArrayViewMut2<'a, f64>, Option<ArrayViewMut1<'a, f64>>)> {
        self.check_len("layer gradient", grad.len())?;

        let w_size = self.dim.0 * self.dim.1;
        let (dw_raw, db_raw) = grad.split_at_mut(w_size);
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw).map_err(|_| MlErr::SizeMismatch {
            what: "layer gradient",
            got: w_size,
            expected: self.dim.0 * self.dim.1,
        })?;
        let db = self.bias.then(|| ArrayViewMut1::from(db_raw));
        Ok((dw, db))
    }

    /// Gives a view of the raw parameter slice as the weights and biases of this layer.
    fn view_params<'a>(
        &self,
        params: &'a [f64],
    ) -> Result<(ArrayView2<'a, f64>, Option<ArrayView1<'a, f64>>)> {
        self.check_len("layer parameters", params.len())?;

        let w_size = self.dim.0 * self.dim.1;
        let (w_raw, b_raw) = params.split_at(w_size);
        let w = ArrayView2::from_shape(self.dim, w_raw).map_err(|_| MlErr::SizeMismatch {
            what: "layer parameters",
            got: w_size,
            expected: self.dim.0 * self.dim.1,
        })?;
        let b = self.bias.then(|| ArrayView1::from(b_raw));
        Ok((w, b))
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn size_counts_biases_only_when_enabled() {
        assert_eq!(Dense::new((3, 2), true, None).size(), 8);
        assert_eq!(Dense::new((3, 2), false, None).size(), 6);
    }

    #[test]
    fn forward_without_activation_is_affine() {
        let layer = Dense::new((2, 1), true, None);
        let params = [2., 3., 1.];
        let x = array![[1., 1.], [0., 2.]];

        let (z, a) = layer.forward(&params, x.view()).unwrap();
        assert_eq!(z, array![[6.], [7.]]);
        assert_eq!(z, a);
    }

    #[test]
    fn forward_rejects_wrong_parameter_count() {
        let layer = Dense::new((2, 1), true, None);
        let x = array![[1., 1.]];

        let err = layer.forward(&[1., 2.], x.view()).unwrap_err();
        assert!(matches!(
            err,
            MlErr::SizeMismatch {
                got: 2,
                expected: 3,
                ..
            }
        ));
    }

    #[test]
    fn backward_writes_weight_and_bias_gradients() {
        let layer = Dense::new((2, 1), true, None);
        let params = [2., 3., 1.];
        let x = array![[1., 2.]];
        let (z, _) = layer.forward(&params, x.view()).unwrap();

        let mut grad = [0.; 3];
        let dx = layer
            .backward(&params, &mut grad, x.view(), z.view(), array![[1.]])
            .unwrap();

        assert_eq!(grad, [1., 2., 1.]);
        assert_eq!(dx, array![[2., 3.]]);
    }
}
