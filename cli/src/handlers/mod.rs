mod generate;
mod run;

pub use generate::handle_generate;
pub use run::handle_run;
