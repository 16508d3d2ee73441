//! Locate an episode across prioritized sources and stage it locally.
//!
//! Sources are probed strictly in list order. The first source whose listing
//! contains the episode is copied from; the rest are never touched.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::command::{copy_command, listing_command};
use crate::config::TransferConfig;
use crate::contract::{CommandRunner, Job, ListingEntry, TransferError};
use crate::paths::{path_arg, remote_path, staging_path};

#[derive(Debug, thiserror::Error)]
enum ListingError {
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error("listing output is not valid lsjson: {0}")]
    Parse(#[from] serde_json::Error),
}

async fn list_show<R>(
    runner: &R,
    transfer: &TransferConfig,
    source: &str,
    job: &Job,
) -> Result<Vec<ListingEntry>, ListingError>
where
    R: CommandRunner + ?Sized,
{
    let command = listing_command(transfer, source, job);
    let output = runner.run(&command, transfer.timeout).await?;
    if output.stdout.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_slice(&output.stdout)?)
}

/// Whether `job.episode` appears anywhere under `<source>/<show>/`.
///
/// Never fails: an unreachable source, a failing or hanging listing, or output
/// that is not an lsjson array all count as "not there". Entries are scanned in
/// listing order and the scan stops at the first entry without a `Name`, so a
/// match listed before such an entry still counts.
pub async fn check_exists<R>(runner: &R, transfer: &TransferConfig, source: &str, job: &Job) -> bool
where
    R: CommandRunner + ?Sized,
{
    let entries = match list_show(runner, transfer, source, job).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(
                source = %source,
                show = %job.show,
                error = %e,
                "Error occurred while checking source, treating episode as absent"
            );
            return false;
        }
    };

    for entry in &entries {
        debug!(
            episode = %job.episode,
            candidate = ?entry.name,
            path = %entry.path,
            is_dir = entry.is_dir,
            "Checking listing entry"
        );
        let Some(name) = entry.name.as_deref() else {
            warn!(source = %source, path = %entry.path, "Listing entry has no Name, treating episode as absent");
            return false;
        };
        if name == job.episode {
            info!(
                source = %source,
                episode = %job.episode,
                path = %entry.path,
                size = entry.size,
                is_dir = entry.is_dir,
                "Found episode in source"
            );
            return true;
        }
    }

    info!(source = %source, episode = %job.episode, entries = entries.len(), "Episode not found in source");
    false
}

/// Download `job` from the first source that has it into `staging_dir`.
///
/// Returns the staged file path, or `Ok(None)` when no source holds the
/// episode. A failed copy is returned as-is and ends the search. A
/// `staging_dir` that is not valid UTF-8 is refused with `BadResponse` before
/// any source is listed.
pub async fn download<R>(
    runner: &R,
    job: &Job,
    sources: &[String],
    staging_dir: &Path,
    transfer: &TransferConfig,
) -> Result<Option<PathBuf>, TransferError>
where
    R: CommandRunner + ?Sized,
{
    let to = staging_path(path_arg(staging_dir)?);
    for source in sources {
        debug!(source = %source, "Checking for existence in source");
        if !check_exists(runner, transfer, source, job).await {
            debug!(source = %source, episode = %job.episode, "Requested episode does not exist under source");
            continue;
        }

        let from = remote_path(source, job);
        let command = copy_command(transfer, &from, &to);
        info!(
            source = %source,
            remote_path = %from,
            staging_path = %to,
            command = %command.join(" "),
            "Downloading episode from source"
        );

        if let Err(e) = runner.run(&command, transfer.timeout).await {
            match &e {
                TransferError::Timeout { .. } => {
                    error!(source = %source, error = %e, "Download timed out, are the sources reachable?")
                }
                TransferError::BadResponse { .. } => {
                    error!(source = %source, error = %e, "Download returned a bad exit status")
                }
            }
            return Err(e);
        }

        info!(staging_path = %to, "Completed downloading episode");
        return Ok(Some(PathBuf::from(to)));
    }

    warn!(show = %job.show, episode = %job.episode, sources = sources.len(), "No download source contained the episode");
    Ok(None)
}
