//! Platform logging initialization for qa_chat.
//!
//! The terminal belongs to the UI, so logs go to a file or nowhere.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use simplelog::{Config, ConfigBuilder, WriteLogger};

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogDestination {
    /// Write to the configured log file.
    #[default]
    File,
    /// Discard all log output.
    Off,
}

/// Initialize the logger with the specified destination.
///
/// For `LogDestination::File`, truncates `path` on startup.
pub fn initialize(destination: LogDestination, level: LevelFilter, path: &Path) {
    match destination {
        LogDestination::Off => {}
        LogDestination::File => match File::create(path) {
            Ok(file) => {
                let _ = WriteLogger::init(level, build_config(), file);
            }
            Err(err) => {
                eprintln!("Warning: Could not create log file at {:?}: {}", path, err);
            }
        },
    }
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .add_filter_ignore_str("reqwest")
        .add_filter_ignore_str("hyper")
        .build()
}
