mod argmax;
mod sampler;

pub use argmax::simple_argmax;
pub use sampler::{ArgmaxSampler, LogitsSampler};
