pub mod arch;
pub mod dataset;
pub mod error;
pub mod network;
pub mod optimization;
mod test;
pub mod training;

pub use error::{MlErr, Result};
pub use network::Network;
