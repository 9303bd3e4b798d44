mod act_fn;
mod ramp;
mod sigmoid;

pub use act_fn::ActFn;
pub use ramp::Ramp;
pub use sigmoid::Sigmoid;
