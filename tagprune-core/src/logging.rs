//! Structured logging using **tracing**.
//!
//! Events go to stderr as JSON so stdout stays reserved for reports and
//! summaries. Dump-related events carry their counts as fields
//! (`table`, `kept`, `dropped`, `skipped`) rather than inside the message.

use std::path::Path;

use tracing::{error, info, warn};

/// Installs the JSON subscriber, filtered by `RUST_LOG`
/// (e.g. `RUST_LOG=tagprune_core=debug`).
///
/// Later calls are ignored once a subscriber is in place.
pub fn init_structured_logging() {
    let _ = tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn log_warn(message: &str) {
    warn!(detail = %message);
}

pub fn log_info(message: &str) {
    info!(detail = %message);
}

pub fn log_error(message: &str) {
    error!(detail = %message);
}

/// Rows of `table` that did not fit the expected shape and were left out.
pub fn log_rows_skipped(table: &str, skipped: usize) {
    if skipped > 0 {
        warn!(table, skipped, "rows skipped while parsing");
    }
}

/// Outcome of filtering one table during a prune.
pub fn log_table_pruned(table: &str, kept: usize, dropped: usize, skipped: usize) {
    if skipped > 0 {
        warn!(table, kept, dropped, skipped, "unreadable rows dropped while rebuilding");
    } else {
        info!(table, kept, dropped, "table filtered");
    }
}

/// A source file or directory the scan could not read.
pub fn log_scan_skipped(path: &Path, reason: &dyn std::fmt::Display) {
    warn!(path = %path.display(), reason = %reason, "skipped during scan");
}

/// The dump at `path` was replaced.
pub fn log_dump_written(path: &Path, bytes: usize) {
    info!(path = %path.display(), bytes, "dump rewritten");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init_structured_logging();
        init_structured_logging();
        log_rows_skipped("share_lang_tags", 0);
        log_table_pruned("share_lang_tags", 1, 2, 3);
        log_scan_skipped(Path::new("engine/private"), &"permission denied");
        log_dump_written(Path::new("database.sql"), 42);
    }
}
