#![deny(missing_docs)]
//! Shared logging utilities for the listing synchronisation workspace.
//!
//! This crate provides the `sync_*` logging macros used across the codebase,
//! a host-side logger initializer and a minimal test initializer.
//!
//! Every message is prefixed with the request generation the current thread
//! is working on, so interleaved responses from overlapping fetches can be
//! told apart in the log.

use std::cell::Cell;

use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, ConfigBuilder, TermLogger, TerminalMode};

#[doc(hidden)]
pub use log;

thread_local! {
    /// Thread-local storage for the request generation being processed.
    static REQUEST_GENERATION: Cell<u64> = const { Cell::new(0) };
}

/// Sets the request generation for the current thread.
/// The coordinator calls this whenever it starts or finishes a fetch.
pub fn set_request_generation(generation: u64) {
    REQUEST_GENERATION.with(|v| v.set(generation));
}

/// Retrieves the request generation for the current thread.
/// Returns 0 before the first request was issued.
pub fn request_generation() -> u64 {
    REQUEST_GENERATION.with(|v| v.get())
}

/// Logs a trace-level message tagged with the current request generation.
#[macro_export]
macro_rules! sync_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("[gen {}] {}", $crate::request_generation(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message tagged with the current request generation.
#[macro_export]
macro_rules! sync_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("[gen {}] {}", $crate::request_generation(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with the current request generation.
#[macro_export]
macro_rules! sync_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("[gen {}] {}", $crate::request_generation(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with the current request generation.
#[macro_export]
macro_rules! sync_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("[gen {}] {}", $crate::request_generation(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message tagged with the current request generation.
#[macro_export]
macro_rules! sync_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("[gen {}] {}", $crate::request_generation(), format_args!($($arg)*));
    }};
}

/// Installs a terminal logger at `level` for a hosting process.
///
/// Returns `false` if a global logger was already installed.
pub fn initialize(level: LevelFilter) -> bool {
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build();

    CombinedLogger::init(vec![TermLogger::new(
        level,
        config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )])
    .is_ok()
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
