use std::fs::OpenOptions;
use std::path::PathBuf;

use crate::runtime::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogLevel(pub log::LevelFilter);
impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" | "warning" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            "off" | "none" => log::LevelFilter::Off,
            _ => return Err(format!("Invalid log level: {}", s)),
        };
        Ok(LogLevel(level))
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        level.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogMode {
    Path,
    Terminal,
    Discard,
}
impl std::str::FromStr for LogMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = match s.to_lowercase().as_str() {
            "path" | "file" => LogMode::Path,
            "terminal" | "term" | "cli" => LogMode::Terminal,
            "discard" | "none" => LogMode::Discard,
            _ => return Err(format!("Invalid log mode: {}", s)),
        };
        Ok(mode)
    }
}

///////////////////////////////
/// Install the global logger. RUST_LOG still overrides the level per module
pub fn setup_global_logger(
    log_level: LogLevel,
    log_output: LogMode,
    log_path: PathBuf,
) -> Result<(), Error> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log_level.into());
    builder.parse_default_env();

    match log_output {
        LogMode::Discard => {
            builder.filter_level(log::LevelFilter::Off);
        }
        LogMode::Terminal => {
            builder.target(env_logger::Target::Stderr);
        }
        LogMode::Path => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .map_err(|e| Error::file_not_valid(&log_path, Some(e.to_string())))?;

            // Same format as the terminal, no colors
            builder.target(env_logger::Target::Pipe(Box::new(file)));
            builder.write_style(env_logger::WriteStyle::Never);
        }
    }

    // A logger may already be set, e.g. by another test in the same process
    if let Err(e) = builder.try_init() {
        log::debug!("Keeping the logger already installed: {}", e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_levels_and_modes() {
        assert_eq!("INFO".parse::<LogLevel>().unwrap().0, log::LevelFilter::Info);
        assert_eq!("warning".parse::<LogLevel>().unwrap().0, log::LevelFilter::Warn);
        assert!("loud".parse::<LogLevel>().is_err());

        assert_eq!("file".parse::<LogMode>().unwrap(), LogMode::Path);
        assert_eq!("cli".parse::<LogMode>().unwrap(), LogMode::Terminal);
        assert!("syslog".parse::<LogMode>().is_err());
    }

    #[test]
    fn second_setup_keeps_the_first_logger() {
        let log_path = std::env::temp_dir().join(format!("dereplicate-log-{}.log", std::process::id()));
        assert!(setup_global_logger(LogLevel(log::LevelFilter::Info), LogMode::Discard, log_path.clone()).is_ok());
        assert!(setup_global_logger(LogLevel(log::LevelFilter::Debug), LogMode::Path, log_path).is_ok());
    }
}
