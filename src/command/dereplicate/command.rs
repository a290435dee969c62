use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use super::constants::{
    DEREPLICATE_DEFAULT_FORMAT, DEREPLICATE_DEFAULT_LINK_RADIUS, DEREPLICATE_DEFAULT_MAX_RADIUS,
    DEREPLICATE_DEFAULT_PATH_OUT, DEREPLICATE_DEFAULT_PATH_TMP, DEREPLICATE_DEFAULT_TASK_ATTEMPTS,
};
use super::core::{core::Dereplicate, params};
use crate::command::determine_thread_counts_1;
use crate::fileformat::StageFormat;

#[derive(Args)]
pub struct DereplicateCMD {
    // Input FASTA/FASTQ files, optionally compressed
    #[arg(short = 'i', value_parser = clap::value_parser!(PathBuf), num_args = 1.., required = true, value_delimiter = ',')]
    pub path_in: Vec<PathBuf>,

    #[arg(short = 'o', value_parser = clap::value_parser!(PathBuf), default_value = DEREPLICATE_DEFAULT_PATH_OUT)]
    pub path_out: PathBuf,

    // Stage checkpoints go here
    #[arg(short = 't', value_parser = clap::value_parser!(PathBuf), default_value = DEREPLICATE_DEFAULT_PATH_TMP)]
    pub path_tmp: PathBuf,

    // Longest chain of near-duplicates to resolve; sets the round count to R+1
    #[arg(long = "max-radius", value_parser = clap::value_parser!(usize), default_value_t = DEREPLICATE_DEFAULT_MAX_RADIUS)]
    pub max_radius: usize,

    #[arg(long = "rounds", value_parser = clap::value_parser!(usize), help = "Propagation rounds, overrides --max-radius")]
    pub rounds: Option<usize>,

    #[arg(long = "link-radius", value_parser = clap::value_parser!(usize), default_value_t = DEREPLICATE_DEFAULT_LINK_RADIUS)]
    pub link_radius: usize,

    #[arg(long = "window", value_parser = clap::value_parser!(usize), help = "Match reads on their first and last N bases only")]
    pub window: Option<usize>,

    #[arg(long = "join-mates", help = "Join <name>/1 and <name>/2 reads before clustering")]
    pub join_mates: bool,

    #[arg(long = "format", value_parser = clap::value_parser!(StageFormat), default_value = DEREPLICATE_DEFAULT_FORMAT)]
    pub format: StageFormat,

    #[arg(long = "force", help = "Recompute every stage, ignoring existing checkpoints")]
    pub force: bool,

    #[arg(long = "cleanup", help = "Remove the checkpoint directory when done")]
    pub cleanup: bool,

    #[arg(short = '@', value_parser = clap::value_parser!(usize))]
    pub threads_work: Option<usize>,

    #[arg(long = "task-attempts", value_parser = clap::value_parser!(usize), default_value_t = DEREPLICATE_DEFAULT_TASK_ATTEMPTS)]
    pub task_attempts: usize,
}

impl DereplicateCMD {
    pub fn try_execute(&mut self) -> Result<()> {
        let threads_work = determine_thread_counts_1(self.threads_work)?;

        let params_io = params::IO {
            path_in: self.path_in.clone(),
            path_out: self.path_out.clone(),
            path_tmp: self.path_tmp.clone(),
            format: self.format,
            force: self.force,
            cleanup: self.cleanup,
        };

        let params_runtime = params::Runtime::new(
            self.max_radius,
            self.rounds,
            self.link_radius,
            self.window,
            self.join_mates,
        )?;

        let params_threading = params::Threading {
            threads_work,
            task_attempts: self.task_attempts,
        };

        Dereplicate::run(
            Arc::new(params_io),
            Arc::new(params_runtime),
            Arc::new(params_threading),
        )
    }
}
