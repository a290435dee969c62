use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dereplicate::runtime::{self, Commands, Config, LogLevel, LogMode};
use log::{error, info};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long = "log-level", global = true, default_value = "info")]
    log_level: LogLevel,

    #[arg(long = "log-mode", global = true, default_value = "terminal")]
    log_mode: LogMode,

    #[arg(long = "log-path", global = true, default_value = "dereplicate.log")]
    log_path: PathBuf,
}

fn main() -> ExitCode {
    let mut cli = Cli::parse();

    let config = Config {
        log_level: cli.log_level,
        log_mode: cli.log_mode,
        log_path: cli.log_path.clone(),
    }
    .install();

    if let Err(e) = runtime::setup_global_logger(config.log_level, config.log_mode, config.log_path.clone()) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    info!("Starting {:?}", cli.command);

    if let Err(e) = cli.command.try_execute() {
        error!("{:?} failed: {}", cli.command, e);
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
