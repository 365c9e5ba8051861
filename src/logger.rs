use std::io::Write;

use env_logger::{Builder, Env};

use crate::config::{LOG_DIR, LOG_FILE};

/// Initialize the process logger, piping timestamped records to the log
/// file so console reports stay clean. Safe to call more than once; later
/// calls are ignored.
pub fn init_logger() -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(LOG_DIR)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(LOG_FILE)?;

    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{:<5}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .try_init();

    Ok(())
}
