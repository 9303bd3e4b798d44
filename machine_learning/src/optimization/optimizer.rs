/// A rule for updating a flat parameter buffer from its gradient.
///
/// Optimizers may keep state between updates, sized after the first gradient they see.
pub trait Optimizer {
    /// Applies one update. `params` and `grad` have the same length.
    fn update_params(&mut self, params: &mut [f64], grad: &[f64]);
}
