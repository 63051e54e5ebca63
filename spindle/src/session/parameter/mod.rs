mod context_mode;
mod resolvable_value;
mod sampling_seed;

pub use context_mode::ContextMode;
pub use resolvable_value::ResolvableValue;
pub use sampling_seed::SamplingSeed;
