//! CLI module containing argument parsing and configuration loading

pub mod args;
pub mod config;

pub use args::Args;
