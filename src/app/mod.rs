pub mod api;
pub mod cli;
pub mod cluster;
pub mod commands;
pub mod config_bootstrap;
mod context;

pub use context::AppContext;
