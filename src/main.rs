use std::fs;
use std::io::Read;
use std::process::ExitCode;

use log::info;

use arcroute_core::{logging, CancelToken, Result, RunOptions, solve_instance_named};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run() -> Result<()> {
    let options = RunOptions::from_args()?;
    logging::init_logger(&options)?;

    let instance_text = if options.reads_stdin() {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        text
    } else {
        fs::read_to_string(&options.instance_path)?
    };
    info!(
        "main: solver={} instance={} bytes={}",
        options.solver_id,
        options.instance_name(),
        instance_text.len()
    );

    let report = solve_instance_named(
        options.solver_id,
        &instance_text,
        &options.instance_name(),
        &CancelToken::new(),
    )?;

    match options.output_path() {
        Some(path) => fs::write(path, report)?,
        None => print!("{report}"),
    }
    Ok(())
}
