//! Tracing subscriber setup

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use eyre::WrapErr;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log file name inside `agent.log_directory`
pub const LOG_FILE: &str = "hostagent.log";

/// Install the global subscriber
///
/// `RUST_LOG` overrides the level picked from `verbose`.
///
/// # Errors
/// Returns error if the log file cannot be opened or a subscriber is
/// already installed
pub fn init(verbose: bool, log_directory: Option<&Path>) -> eyre::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = match log_directory {
        Some(dir) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(dir)?)),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .wrap_err("can't install log subscriber")?;

    Ok(())
}

/// Open `<dir>/hostagent.log` for appending, creating `dir` if needed
fn open_log_file(dir: &Path) -> eyre::Result<File> {
    std::fs::create_dir_all(dir)
        .wrap_err_with(|| format!("can't create log directory {}", dir.display()))?;

    let path = dir.join(LOG_FILE);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .wrap_err_with(|| format!("can't open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_log_file_appends() {
        let dir = TempDir::new().unwrap();
        let logs = dir.path().join("logs");

        writeln!(open_log_file(&logs).unwrap(), "first").unwrap();
        writeln!(open_log_file(&logs).unwrap(), "second").unwrap();

        let content = std::fs::read_to_string(logs.join(LOG_FILE)).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_log_directory_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("logs");
        std::fs::write(&blocker, b"").unwrap();

        assert!(open_log_file(&blocker).is_err());
    }
}
