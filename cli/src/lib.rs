pub mod handlers;
pub mod logger;
pub mod session_loader;
