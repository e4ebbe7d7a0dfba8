//! Logger set up for planner executables.
//!
//! Log lines are written both to stdout and to the session's log file, and are stamped with the
//! number of seconds elapsed since the session epoch. Noisy modules (the search loop logs every
//! popped node at `trace`) can be throttled individually through [`LoggerParams::module_levels`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::collections::BTreeMap;

use colored::{ColoredString, Colorize};
use log::{self, info};
use serde::Deserialize;
use thiserror::Error;

use crate::session;

pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters controlling the logger.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggerParams {
    /// Minimum level to record, must be `Info` or more verbose.
    #[serde(default = "default_min_level")]
    pub min_level: LevelFilter,

    /// Per-module level overrides, keyed by module path (e.g. `plan_lib::planner::search`).
    #[serde(default)]
    pub module_levels: BTreeMap<String, LevelFilter>,

    /// If false only the session log file receives messages.
    #[serde(default = "default_true")]
    pub to_stdout: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level less than `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for LoggerParams {
    fn default() -> Self {
        Self {
            min_level: default_min_level(),
            module_levels: BTreeMap::new(),
            to_stdout: true,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
/// 
/// # Notes
/// 
/// - `params.min_level` must be `Info` or more verbose.
/// 
/// # Safety
/// 
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    params: &LoggerParams,
    session: &session::Session
) -> Result<(), LoggerInitError> {

    if params.min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(params.min_level))
    }

    let log_file = fern::log_file(session.log_file_path.clone())
        .map_err(LoggerInitError::LogFileInitError)?;

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{:10.6} {}] {}",
                session::get_elapsed_seconds(),
                level_to_str(record.level()),
                format_body(record.level(), record.target(), message)
            ))
        })
        .level(params.min_level);

    for (module, level) in params.module_levels.iter() {
        dispatch = dispatch.level_for(module.clone(), *level);
    }

    if params.to_stdout {
        dispatch = dispatch.chain(std::io::stdout());
    }

    dispatch
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;
    
    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?}", params.min_level);
    for (module, level) in params.module_levels.iter() {
        info!("    Override: {} -> {:?}", module, level);
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Debug and trace lines carry their target module, others don't.
fn format_body(level: log::Level, target: &str, message: &std::fmt::Arguments) -> String {
    if level > log::Level::Info {
        format!("{}: {}", target, message)
    }
    else {
        format!("{}", message)
    }
}

/// Get the string representation of a log level
fn level_to_str(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info  => "INF".normal(),
        log::Level::Warn  => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold()
    }
}

fn default_min_level() -> LevelFilter {
    LevelFilter::Debug
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_logger_params_from_toml() {
        let params: LoggerParams = crate::params::from_toml_str(
            "min_level = \"Trace\"\n\n[module_levels]\n\"plan_lib::planner::search\" = \"Info\"\n"
        ).unwrap();

        assert_eq!(params.min_level, LevelFilter::Trace);
        assert_eq!(
            params.module_levels.get("plan_lib::planner::search"),
            Some(&LevelFilter::Info)
        );
        assert!(params.to_stdout);
    }

    #[test]
    fn test_format_body() {
        assert_eq!(
            format_body(log::Level::Debug, "plan_lib", &format_args!("hello {}", 1)),
            "plan_lib: hello 1"
        );
        assert_eq!(
            format_body(log::Level::Warn, "plan_lib", &format_args!("hello")),
            "hello"
        );
    }
}
