use serde::{Deserialize, Serialize};

use super::{Ramp, Sigmoid};

/// The activation applied to the weighted sums of a layer's neurons.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActFn {
    Sigmoid(Sigmoid),
    Ramp(Ramp),
}

impl ActFn {
    pub fn sigmoid(amp: f64) -> Self {
        Self::Sigmoid(Sigmoid::new(amp))
    }

    pub fn ramp(threshold_low: f64, threshold_high: f64, low: f64, high: f64) -> Self {
        Self::Ramp(Ramp::new(threshold_low, threshold_high, low, high))
    }

    pub fn f(&self, x: f64) -> f64 {
        match self {
            Self::Sigmoid(a) => a.f(x),
            Self::Ramp(a) => a.f(x),
        }
    }

    pub fn df(&self, x: f64) -> f64 {
        match self {
            Self::Sigmoid(a) => a.df(x),
            Self::Ramp(a) => a.df(x),
        }
    }
}

impl Default for ActFn {
    fn default() -> Self {
        Self::Sigmoid(Sigmoid::default())
    }
}
