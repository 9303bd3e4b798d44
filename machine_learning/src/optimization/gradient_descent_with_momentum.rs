use super::Optimizer;

#[derive(Debug, Clone)]
pub struct GradientDescentWithMomentum {
    learning_rate: f64,
    momentum: f64,
    velocity: Vec<f64>,
}

impl GradientDescentWithMomentum {
    /// Creates a new `GradientDescentWithMomentum` optimizer.
    ///
    /// The velocity buffer is sized on the first update.
    ///
    /// # Arguments
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `momentum` - Hyperparameter to the optimization algorithm.
    ///
    /// # Returns
    /// A new `GradientDescentWithMomentum` instance.
    pub fn new(learning_rate: f64, momentum: f64) -> Self {
        Self {
            learning_rate,
            momentum,
            velocity: Vec::new(),
        }
    }
}

impl Optimizer for GradientDescentWithMomentum {
    fn update_params(&mut self, params: &mut [f64], grad: &[f64]) {
        if self.velocity.len() != grad.len() {
            self.velocity = vec![0.; grad.len()];
        }

        let lr = self.learning_rate;
        let mu = self.momentum;

        params
            .iter_mut()
            .zip(grad)
            .zip(self.velocity.iter_mut())
            .for_each(|((p, g), v)| {
                *v = (mu * *v) + g;
                *p -= lr * *v;
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_accumulates_between_updates() {
        let mut optimizer = GradientDescentWithMomentum::new(0.5, 0.5);
        let mut params = [0., 0.];

        optimizer.update_params(&mut params, &[1., -2.]);
        assert_eq!(params, [-0.5, 1.]);

        // v = 0.5 * v + g = [1.5, -3.]
        optimizer.update_params(&mut params, &[1., -2.]);
        assert_eq!(params, [-1.25, 2.5]);
    }
}
