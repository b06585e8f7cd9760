use std::fs::File;

use env_logger::{Builder, Target, WriteStyle};

use crate::options::{LogFormat, RunOptions};
use crate::{Error, Result};

/// Wires the process logger to the run options. Formatting is
/// env_logger's own; the options only choose the level, whether the
/// module target is shown, millisecond timestamps, and the destination.
/// Per-solve diagnostics do not pass through here at all — they travel
/// in the `Diagnostics` value returned with each report.
pub fn init_logger(options: &RunOptions) -> Result<()> {
    let mut builder = Builder::new();
    builder
        .filter_level(options.log_level.to_filter())
        .write_style(WriteStyle::Never)
        .format_target(options.log_format == LogFormat::Pretty);
    if options.log_timestamp {
        builder.format_timestamp_millis();
    } else {
        builder.format_timestamp(None);
    }

    match options.log_output_path() {
        Some(log_path) => {
            let log_file = File::create(&log_path).map_err(|e| {
                Error::invalid_input(format!(
                    "failed to create log output file {}: {e}",
                    log_path.display()
                ))
            })?;
            builder.target(Target::Pipe(Box::new(log_file)));
        }
        None => {
            builder.target(Target::Stderr);
        }
    }

    builder
        .try_init()
        .map_err(|e| Error::invalid_input(format!("logger init failed: {e}")))
}
