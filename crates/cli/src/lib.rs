pub mod commands;
pub mod config;
pub mod http;
pub mod log_assembly;
pub mod log_window;
pub mod logging;
pub mod output;
