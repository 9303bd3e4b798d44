//! Feed-forward network models for the ILP lock pattern work: topology rules, range
//! normalization, training and persistence on top of the `machine_learning` engine.

pub mod config;
pub mod error;
pub mod network;
pub mod normalize;
pub mod persist;
pub mod topology;

pub use error::{NetworkError, Result};
pub use network::{NeuralNetwork, TrainReport, TrainingLimits, mean_squared_error};
pub use normalize::{ColumnRanges, Range, denormalize, normalize};
pub use topology::{LayerPosition, LayerSpec, TopologyKind, TopologyPolicy, TopologySpec};
