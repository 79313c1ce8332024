use flexi_logger::{
    Cleanup, Criterion, DeferredNow, Duplicate, FileSpec, Logger, LoggerHandle, Naming,
};
use log::Record;

/// One line per event: `[HH:MM:SS] LEVEL: message`.
fn solver_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    write!(
        w,
        "[{}] {}: {}",
        now.format("%H:%M:%S"),
        record.level(),
        record.args()
    )
}

/// Starts file logging under `log_dir`, duplicated to stdout. Keep the
/// returned handle alive for the lifetime of the run.
pub fn setup_logging(log_dir: &str, debug: bool) -> LoggerHandle {
    let spec = if debug { "debug" } else { "info" };
    Logger::try_with_env_or_str(spec)  // Use the log level from the environment or fall back
        .unwrap()
        .log_to_file(FileSpec::default().directory(log_dir).basename("threes_game"))
        .format(solver_format)
        .duplicate_to_stdout(if debug { Duplicate::Debug } else { Duplicate::Info })
        .rotate(
            Criterion::Size(10 * 1024 * 1024), // Rotate logs after they reach 10 MB
            Naming::Numbers,
            Cleanup::KeepLogFiles(7),
        )
        .start()
        .unwrap()
}
