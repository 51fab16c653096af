//! Logger setup plus per-module switchable logging macros.
//!
//! A module opts into the macros by declaring the flag they read:
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_debug, log_info};
//!
//! log_info!("scan {} started", generation);
//! ```
//! Flip the flag to `false` to silence a chatty module without touching
//! `RUST_LOG`.

use log::LevelFilter;

/// Installs `env_logger`. `RUST_LOG` still wins over the default level.
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(debug: bool) {
    let default_level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .try_init();
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            ::log::debug!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            ::log::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            ::log::warn!($($arg)*);
        }
    };
}
