//! Command-line interface for ferry.
//!
//! All orchestration lives in `ferry-core`; this module parses arguments, loads
//! the YAML config and reports outcomes.
//!
//! - For command-line users: run the `ferry` binary with `--help`.
//! - For programmatic/integration use: call [`run`] with a constructed [`Cli`],
//!   or [`run_with`] to supply a different [`CommandRunner`].
use crate::load_config::{load_config, CliConfig};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use ferry_core::download::{check_exists, download};
use ferry_core::upload::upload;
use ferry_core::{CommandRunner, Job, ProcessRunner};
use std::path::PathBuf;

/// CLI for ferry: stage episodes from rclone sources and push results to destinations.
#[derive(Parser)]
#[clap(
    name = "ferry",
    version,
    about = "Find an episode across rclone sources, stage it locally and upload results"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct JobArgs {
    /// Path to the YAML config file
    #[clap(long)]
    pub config: PathBuf,
    /// Show (group) name, used as the directory under each location
    #[clap(long)]
    pub show: String,
    /// Episode file name, matched exactly against remote listings
    #[clap(long)]
    pub episode: String,
}

impl JobArgs {
    fn job(&self) -> Job {
        Job::new(self.show.clone(), self.episode.clone())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the episode from the first source that has it into the staging directory
    Download {
        #[clap(flatten)]
        job: JobArgs,
    },
    /// Upload a local file to every destination as <destination>/<show>/<episode>
    Upload {
        #[clap(flatten)]
        job: JobArgs,
        /// Local file to upload
        #[clap(long)]
        file: PathBuf,
    },
    /// Report which sources currently hold the episode
    Check {
        #[clap(flatten)]
        job: JobArgs,
    },
}

/// Async CLI entrypoint for main() and integration tests, using real processes.
pub async fn run(cli: Cli) -> Result<()> {
    run_with(cli, &ProcessRunner::new()).await
}

/// Same as [`run`] with the transfer commands executed by `runner`.
pub async fn run_with<R>(cli: Cli, runner: &R) -> Result<()>
where
    R: CommandRunner + ?Sized,
{
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Download { job } => {
            let config = load(&job)?;
            let transfer = config.transfer.to_transfer_config();
            let job = job.job();
            tracing::info!(command = "download", show = %job.show, episode = %job.episode, "Starting download");
            let staged = download(
                runner,
                &job,
                &config.download.sources,
                &config.download.staging_dir,
                &transfer,
            )
            .await?;
            match staged {
                Some(path) => {
                    tracing::info!(command = "download", path = %path.display(), "Download complete");
                    println!("{}", path.display());
                    Ok(())
                }
                None => {
                    tracing::error!(command = "download", episode = %job.episode, "No source contained the episode");
                    Err(anyhow::anyhow!(
                        "No source contained episode {:?} of show {:?}",
                        job.episode,
                        job.show
                    ))
                }
            }
        }
        Commands::Upload { job, file } => {
            let config = load(&job)?;
            let transfer = config.transfer.to_transfer_config();
            let job = job.job();
            tracing::info!(command = "upload", file = %file.display(), "Starting upload");
            upload(runner, &job, &config.upload.destinations, &file, &transfer).await?;
            println!(
                "Uploaded {} to {} destination(s).",
                file.display(),
                config.upload.destinations.len()
            );
            Ok(())
        }
        Commands::Check { job } => {
            let config = load(&job)?;
            let transfer = config.transfer.to_transfer_config();
            let job = job.job();
            for source in &config.download.sources {
                let found = check_exists(runner, &transfer, source, &job).await;
                println!("{source}\t{}", if found { "found" } else { "missing" });
            }
            Ok(())
        }
    }
}

fn load(job: &JobArgs) -> Result<CliConfig> {
    let config = load_config(&job.config)?;
    config.transfer.to_transfer_config().trace_loaded();
    Ok(config)
}
