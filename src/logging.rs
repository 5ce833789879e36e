// src/logging.rs

use flexi_logger::{FileSpec, Logger, LoggerHandle};

/// Starts file-backed logging. The terminal itself belongs to the TUI, so
/// everything goes to `confidante.log` next to the binary's working
/// directory. The returned handle must stay alive for the program's
/// lifetime.
pub fn init(level: &str) -> anyhow::Result<LoggerHandle> {
    let handle = Logger::try_with_str(level)?
        .log_to_file(
            FileSpec::default()
                .basename("confidante")
                .suppress_timestamp(),
        )
        .start()?;

    Ok(handle)
}
