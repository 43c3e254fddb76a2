//! Logging infrastructure for ticketdesk.
//!
//! Structured logging on top of the `tracing` ecosystem:
//!
//! - JSON lines written to `~/.ticketdesk/logs/ticketdesk.log` (rotated daily)
//! - Compact human-readable output on stderr
//! - `RUST_LOG` overrides the default filter
//!
//! ## Example
//!
//! ```no_run
//! use ticketdesk_core::logging;
//!
//! let _guard = logging::init_logging(None, false).expect("logging init");
//!
//! tracing::info!("ticketdesk started");
//! tracing::debug!(tenant_id = 42u64, "session created");
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::{Result, TicketdeskError};

/// Guard that must be held to ensure log flushing on shutdown.
///
/// Keep this guard alive for the lifetime of the application.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the ticketdesk logging system.
///
/// # Arguments
///
/// * `log_dir` - Optional custom log directory. Defaults to `~/.ticketdesk/logs/`
/// * `verbose` - If true, sets log level to DEBUG. Otherwise uses INFO.
///
/// # Returns
///
/// A [`LogGuard`] that must be held for the application lifetime.
pub fn init_logging(log_dir: Option<PathBuf>, verbose: bool) -> Result<LogGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };

    std::fs::create_dir_all(&log_dir).map_err(|e| TicketdeskError::DirectoryCreation {
        path: log_dir.clone(),
        source: e,
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "ticketdesk.log");
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ticketdesk={default_level}")));

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_span_list(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::debug!(log_dir = %log_dir.display(), verbose, "logging initialized");

    Ok(LogGuard {
        _file_guard: Some(file_guard),
    })
}

/// Initialize minimal console-only logging for testing.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Base directory for ticketdesk state.
///
/// Returns `~/.ticketdesk/`
pub fn default_home_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").map_err(|_| TicketdeskError::Internal {
        message: "HOME environment variable not set".into(),
    })?;

    Ok(PathBuf::from(home).join(".ticketdesk"))
}

/// Get the default log directory path.
///
/// Returns `~/.ticketdesk/logs/`
pub fn default_log_dir() -> Result<PathBuf> {
    Ok(default_home_dir()?.join("logs"))
}

/// Convenience macro for logging wizard transitions.
///
/// # Example
///
/// ```ignore
/// log_wizard_event!(tenant_id, "advanced", step = %next);
/// log_wizard_event!(tenant_id, "published", channel = %channel);
/// ```
#[macro_export]
macro_rules! log_wizard_event {
    ($tenant_id:expr, $event:expr) => {
        tracing::info!(
            target: "ticketdesk::wizard",
            tenant_id = %$tenant_id,
            event = $event,
            "wizard event"
        )
    };
    ($tenant_id:expr, $event:expr, $($field:tt)*) => {
        tracing::info!(
            target: "ticketdesk::wizard",
            tenant_id = %$tenant_id,
            event = $event,
            $($field)*,
            "wizard event"
        )
    };
}
