//! `env_logger` setup for binaries and scripts using this crate.
//!
//! The library itself only emits records through the `log` facade.
use std::fs::{self, OpenOptions};
use std::path::Path;

use env_logger::{Env, Target, WriteStyle};
use log::LevelFilter;

use crate::error::Result;

/// Environment variable holding the log filter, e.g. `dataramp=debug`.
pub const LOG_ENV: &str = "DATARAMP_LOG";

pub const DEFAULT_FILTER: &str = "error,dataramp=info";

/// Install the global logger.
///
/// Records go to stderr, or are appended to `log_file` when given (its parent
/// directories are created). Returns `Ok(false)` if a logger was already
/// installed.
pub fn init(default_filter: &str, log_file: Option<&Path>) -> Result<bool> {
    let mut builder = env_logger::Builder::default();
    builder
        .filter_level(LevelFilter::Error)
        .parse_env(Env::default().filter_or(LOG_ENV, default_filter));

    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder
            .target(Target::Pipe(Box::new(file)))
            .write_style(WriteStyle::Never);
    }

    Ok(builder.try_init().is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_records_messages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataramp_logs/logs.log");

        if init("dataramp=info", Some(&path)).unwrap() {
            log::info!("logging to file");
            log::logger().flush();
            let contents = fs::read_to_string(&path).unwrap();
            assert!(contents.contains("logging to file"));
        }
        assert!(path.exists());
    }
}
