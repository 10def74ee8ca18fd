//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
mod logging;

pub use commands::{
    OutputFormat, handle_classify, handle_query, handle_scan, handle_trace,
};
pub use logging::*;
