mod candle_backend;
mod memory_checker;

pub use candle_backend::{CandleBackend, CandleContext, CandleModel};
pub use memory_checker::is_file_fits_ram;
