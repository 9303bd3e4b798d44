use super::Optimizer;

/// Plain gradient descent: every parameter moves against its gradient, scaled by a fixed rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientDescent {
    learning_rate: f64,
}

impl GradientDescent {
    /// Creates a new `GradientDescent` taking steps of `learning_rate` times the gradient.
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for GradientDescent {
    fn update_params(&mut self, params: &mut [f64], grad: &[f64]) {
        let step = self.learning_rate;
        params
            .iter_mut()
            .zip(grad)
            .for_each(|(p, g)| *p -= step * g);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_against_the_gradient() {
        let mut optimizer = GradientDescent::new(0.25);
        let mut params = [1., -1., 0.];

        optimizer.update_params(&mut params, &[4., -2., 0.]);
        assert_eq!(params, [0., -0.5, 0.]);
    }
}
