//! Tracing/logging (shared setup).

/// Initialize process-wide tracing with the default `info` filter.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init("info");
}

/// Initialize tracing for a command-line process: logs go to stderr so that
/// stdout carries only command output.
pub fn init_for_cli(default_filter: &str) {
    tracing::init_with_writer(default_filter, std::io::stderr);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
