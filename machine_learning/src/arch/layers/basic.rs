use serde::{Deserialize, Serialize};

use crate::arch::activations::ActFn;

/// A layer of a network as seen from the outside: how many neurons it has, which activation
/// they use and whether the layer feeds a bias unit into the next one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasicLayer {
    pub act_fn: ActFn,
    pub bias: bool,
    pub neurons: usize,
}

impl BasicLayer {
    pub fn new(act_fn: ActFn, bias: bool, neurons: usize) -> Self {
        Self {
            act_fn,
            bias,
            neurons,
        }
    }
}
