// src/lib.rs
//! Job discovery, matching and analytics backend

pub mod analytics;
pub mod cli;
pub mod core;
pub mod interview_prep;
pub mod job_discovery;
pub mod resume_analysis;
pub mod services;
pub mod types;
pub mod utils;
pub mod web;

#[cfg(test)]
pub(crate) mod test_support;

pub use cli::{handle_command, Cli, Command};
pub use services::AppServices;
pub use web::start_web_server;

/// Crate-wide logging entry point, `app_log!(info, "...", args)`
#[macro_export]
macro_rules! app_log {
    ($level:ident, $($arg:tt)+) => {
        ::tracing::$level!($($arg)+)
    };
}
