use serde::{Deserialize, Serialize};

/// Piecewise linear activation.
///
/// Inputs between `threshold_low` and `threshold_high` are mapped linearly onto `[low, high]`,
/// anything outside is clamped to the nearest end.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    threshold_low: f64,
    threshold_high: f64,
    low: f64,
    high: f64,
}

impl Ramp {
    pub fn new(threshold_low: f64, threshold_high: f64, low: f64, high: f64) -> Self {
        Self {
            threshold_low,
            threshold_high,
            low,
            high,
        }
    }

    fn slope(&self) -> f64 {
        (self.high - self.low) / (self.threshold_high - self.threshold_low)
    }

    pub fn f(&self, z: f64) -> f64 {
        if z < self.threshold_low {
            self.low
        } else if z > self.threshold_high {
            self.high
        } else {
            (z - self.threshold_low) * self.slope() + self.low
        }
    }

    pub fn df(&self, z: f64) -> f64 {
        if z < self.threshold_low || z > self.threshold_high {
            0.
        } else {
            self.slope()
        }
    }
}

impl Default for Ramp {
    fn default() -> Self {
        Self::new(-1., 1., -1., 1.)
    }
}
