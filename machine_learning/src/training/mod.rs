mod backpropagation;
mod strategy;

pub use backpropagation::Backpropagation;
pub use strategy::TrainStrategy;
