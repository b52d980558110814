//! Command-line arguments for the `topicq` load driver
//!
//! Values left unset here may be filled from the TOML configuration file
//! (see `config.rs`); anything given on the command line wins.

use crate::core::validation::validate_positive_int;
use crate::core::version::long_version;
use clap::{ArgAction, Parser};
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(name = "topicq")]
#[command(about = "Exercise an in-process topic queue with concurrent producers and consumers")]
#[command(version, long_version = long_version())]
#[command(after_help = " * can be specified multiple times or as a comma-separated list")]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Topics to publish to*
    #[arg(short = 't', long = "topics", value_name = "NAMES", action = ArgAction::Append)]
    pub topics: Vec<String>,

    /// Number of producer tasks
    #[arg(short = 'p', long = "producers", value_name = "COUNT", value_parser = validate_positive_int)]
    pub producers: Option<usize>,

    /// Number of consumer tasks (at least one per topic)
    #[arg(short = 'n', long = "consumers", value_name = "COUNT", value_parser = validate_positive_int)]
    pub consumers: Option<usize>,

    /// Messages published by each producer
    #[arg(short = 'm', long = "messages", value_name = "COUNT", value_parser = validate_positive_int)]
    pub messages: Option<usize>,

    /// Maximum queued messages per topic
    #[arg(short = 'C', long = "capacity", value_name = "COUNT", value_parser = validate_positive_int)]
    pub capacity: Option<usize>,

    /// Print the run summary as JSON
    #[arg(short = 'j', long = "json")]
    pub json: bool,

    /// Force coloured output
    #[arg(short = 'g', long = "color", conflicts_with = "no_color")]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color", conflicts_with = "color")]
    pub no_color: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve colour output: explicit flags first, then whether stdout is a terminal
    pub fn use_color(&self) -> bool {
        if self.no_color {
            false
        } else if self.color {
            true
        } else {
            std::io::stdout().is_terminal()
        }
    }

    /// Log file as a string, with `None` when file logging is disabled
    pub fn log_file_str(&self) -> Option<String> {
        self.log_file
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned())
            .filter(|path| !path.eq_ignore_ascii_case("none"))
    }
}
