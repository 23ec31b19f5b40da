#![deny(missing_docs)]
//! Shared logging utilities for the mangashelf workspace.
//!
//! This crate provides the `shelf_*` logging macros used across the codebase,
//! a helper for picking the level from the verbose-logging preference, and a
//! minimal test initializer for the global logger.

use log::LevelFilter;

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! shelf_trace {
    ($($arg:tt)*) => {{
        log::trace!(target: "mangashelf", $($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! shelf_info {
    ($($arg:tt)*) => {{
        log::info!(target: "mangashelf", $($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! shelf_debug {
    ($($arg:tt)*) => {{
        log::debug!(target: "mangashelf", $($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! shelf_warn {
    ($($arg:tt)*) => {{
        log::warn!(target: "mangashelf", $($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! shelf_error {
    ($($arg:tt)*) => {{
        log::error!(target: "mangashelf", $($arg)*);
    }};
}

/// Level used by the application for a given verbose-logging preference.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Verbose in debug builds.
    let level = level_for(cfg!(debug_assertions));

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
