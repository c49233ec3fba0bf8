use crate::error::{CliError, Result};
use std::fs::File;
use std::path::Path;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let level_filter = match (quiet, verbosity) {
        (true, _) => LevelFilter::OFF,
        (_, 0) => LevelFilter::WARN,
        (_, 1) => LevelFilter::INFO,
        (_, 2) => LevelFilter::DEBUG,
        (_, _) => LevelFilter::TRACE,
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact();

    let registry = tracing_subscriber::registry()
        .with(level_filter)
        .with(stderr_layer);

    match log_file {
        Some(path) => {
            let file = File::create(path).map_err(CliError::Io)?;
            let file_layer = fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_thread_ids(true)
                .with_target(true);
            registry.with(file_layer).init();
        }
        None => registry.init(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::path::PathBuf;
    use std::sync::Once;
    use tracing::{debug, error, info, trace, warn};

    static INIT: Once = Once::new();

    fn init_global_logger() {
        INIT.call_once(|| {
            setup_logging(3, false, None).expect("global logger for tests");
        });
    }

    #[test]
    #[serial]
    fn macros_log_at_every_level() {
        init_global_logger();

        error!("error line");
        warn!("warn line");
        info!("info line");
        debug!("debug line");
        trace!("trace line");
    }

    #[test]
    #[serial]
    fn file_layer_records_thread_ids() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("run.log");

        let file = File::create(&log_path).unwrap();
        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true);
        let subscriber = tracing_subscriber::registry().with(file_layer);

        tracing::subscriber::with_default(subscriber, || {
            debug!("file-bound message");
        });

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("file-bound message"));
        assert!(content.contains("DEBUG"));
        assert!(content.contains("ThreadId"));
    }

    #[test]
    #[serial]
    fn unwritable_log_file_path_is_an_io_error() {
        let invalid_path = PathBuf::from("/");

        if cfg!(unix) && invalid_path.is_dir() {
            let result = setup_logging(0, false, Some(&invalid_path));
            assert!(matches!(result, Err(CliError::Io(_))));
        }
    }
}
