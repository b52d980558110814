//! Application module: CLI, configuration and the load driver

pub mod cli;
pub mod driver;
pub mod startup;
