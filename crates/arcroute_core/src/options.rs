//! Runtime options for the command-line front end.

use std::path::PathBuf;

use log::LevelFilter;

use crate::{Error, Result};

#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Solver id 1..=7 (6 is reserved).
    pub solver_id: u32,
    /// Instance file path; `-` reads stdin.
    pub instance_path: String,
    /// Structured logging level.
    pub log_level: LogLevel,
    /// Logging output format.
    pub log_format: LogFormat,
    /// Include timestamps in log lines.
    pub log_timestamp: bool,
    /// Optional output file path for logs. Empty means stderr.
    pub log_output: String,
    /// Optional output file path for the report. Empty means stdout.
    pub output: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            "off" => Ok(Self::Off),
            other => Err(Error::invalid_input(format!("Invalid log level: {other}"))),
        }
    }

    pub fn to_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
            Self::Off => LevelFilter::Off,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl LogFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            other => Err(Error::invalid_input(format!("Invalid log format: {other}"))),
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            solver_id: 0,
            instance_path: String::new(),
            log_level: LogLevel::Warn,
            log_format: LogFormat::Compact,
            log_timestamp: true,
            log_output: String::new(),
            output: String::new(),
        }
    }
}

impl RunOptions {
    pub fn from_args() -> Result<Self> {
        Self::parse_from_iter(std::env::args().skip(1))
    }

    pub fn parse_from_iter<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        let mut positionals: Vec<String> = Vec::new();
        let mut args = args
            .into_iter()
            .map(|arg| arg.as_ref().to_owned())
            .peekable();

        while let Some(arg) = args.next() {
            if arg == "--help" || arg == "-h" {
                return Err(Error::invalid_input(Self::usage()));
            }
            let Some(raw_name) = arg.strip_prefix("--") else {
                positionals.push(arg);
                continue;
            };

            let (name, value) = match raw_name.split_once('=') {
                Some((name, value)) => (name.to_owned(), Some(value.to_owned())),
                None => {
                    let value = args.next_if(|next| !next.starts_with("--"));
                    (raw_name.to_owned(), value)
                }
            };
            let require_value = || {
                value
                    .clone()
                    .ok_or_else(|| Error::invalid_input(format!("Missing value for --{name}")))
            };

            match name.as_str() {
                "log-level" => options.log_level = LogLevel::parse(&require_value()?)?,
                "log-format" => options.log_format = LogFormat::parse(&require_value()?)?,
                "log-timestamp" => {
                    options.log_timestamp = match value {
                        Some(v) => parse_bool(&name, &v)?,
                        None => true,
                    };
                }
                "no-log-timestamp" => {
                    if value.is_some() {
                        return Err(Error::invalid_input(format!(
                            "Flag --{name} does not take a value"
                        )));
                    }
                    options.log_timestamp = false;
                }
                "log-output" => options.log_output = require_value()?,
                "output" => options.output = require_value()?,
                _ => {
                    return Err(Error::invalid_input(format!(
                        "Unknown option: --{name}\n\n{}",
                        Self::usage()
                    )));
                }
            }
        }

        match positionals.len() {
            2 => {
                options.solver_id = positionals[0].parse().map_err(|_| {
                    Error::invalid_input(format!(
                        "Invalid solver id: {}\n\n{}",
                        positionals[0],
                        Self::usage()
                    ))
                })?;
                options.instance_path = positionals[1].clone();
                Ok(options)
            }
            _ => Err(Error::invalid_input(format!(
                "Expected <solverId> <instancePath>\n\n{}",
                Self::usage()
            ))),
        }
    }

    pub fn usage() -> &'static str {
        concat!(
            "Usage:\n",
            "  arcroute <solverId> <instancePath> [options]\n",
            "  arcroute <solverId> - < instance.txt\n\n",
            "Solvers:\n",
            "  1 - Directed Chinese Postman, exact\n",
            "  2 - Undirected Chinese Postman, exact\n",
            "  3 - Mixed Chinese Postman, Frederickson's heuristic\n",
            "  4 - Mixed Chinese Postman, Yaoyuenyong's heuristic\n",
            "  5 - Windy Chinese Postman, Win's heuristic\n",
            "  6 - reserved (directed rural postman is not supported)\n",
            "  7 - Windy Rural Postman, Benavent's H1 heuristic\n\n",
            "Options:\n",
            "  --log-level <error|warn|info|debug|trace|off>\n",
            "  --log-format <compact|pretty>\n",
            "  --log-timestamp[=<bool>]\n",
            "  --no-log-timestamp\n",
            "  --log-output <path>\n",
            "  --output <path>\n",
            "  --help\n",
        )
    }

    pub fn log_output_path(&self) -> Option<PathBuf> {
        check_path(&self.log_output)
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        check_path(&self.output)
    }

    pub fn reads_stdin(&self) -> bool {
        self.instance_path == "-"
    }

    /// Instance name for the report: the file stem, or "instance" for
    /// stdin input.
    pub fn instance_name(&self) -> String {
        if self.reads_stdin() {
            return "instance".to_owned();
        }
        PathBuf::from(&self.instance_path)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "instance".to_owned())
    }
}

fn check_path(path_str: &str) -> Option<PathBuf> {
    let path_str = path_str.trim();
    if path_str.is_empty() || path_str == "-" {
        None
    } else {
        Some(PathBuf::from(path_str))
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value {
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "on" | "ON" => Ok(true),
        "0" | "false" | "FALSE" | "False" | "no" | "NO" | "off" | "OFF" => Ok(false),
        _ => Err(Error::invalid_input(format!(
            "Invalid boolean for --{name}: {value} (expected true/false)"
        ))),
    }
}
