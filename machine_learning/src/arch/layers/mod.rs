mod basic;
mod dense;

pub use basic::BasicLayer;
pub use dense::Dense;
