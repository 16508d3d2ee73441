//! Copy a produced file to every configured destination.

use std::path::Path;

use tracing::{debug, error, info};

use crate::command::copy_command;
use crate::config::TransferConfig;
use crate::contract::{CommandRunner, Job, TransferError};
use crate::paths::{path_arg, remote_path};

/// Copy `upload_file` to `<destination>/<show>/<episode>` for every destination.
///
/// `job` names the uploaded (output) file, not the file that was downloaded.
/// Destinations are written in list order without any existence check. The
/// first failure is returned immediately: later destinations are not attempted
/// and earlier ones are left in place. An `upload_file` path that is not valid
/// UTF-8 is refused with `BadResponse` before any destination is tried.
pub async fn upload<R>(
    runner: &R,
    job: &Job,
    destinations: &[String],
    upload_file: &Path,
    transfer: &TransferConfig,
) -> Result<(), TransferError>
where
    R: CommandRunner + ?Sized,
{
    let from = path_arg(upload_file)?;
    for destination in destinations {
        let to = remote_path(destination, job);
        let command = copy_command(transfer, from, &to);
        debug!(command = %command.join(" "), "Now running upload command");
        info!(destination = %destination, remote_path = %to, "Uploading file to destination");

        if let Err(e) = runner.run(&command, transfer.timeout).await {
            match &e {
                TransferError::Timeout { .. } => {
                    error!(destination = %destination, error = %e, "Upload timed out, is the destination reachable?")
                }
                TransferError::BadResponse { .. } => {
                    error!(destination = %destination, error = %e, "Upload returned a bad exit status")
                }
            }
            return Err(e);
        }
    }

    info!(
        show = %job.show,
        episode = %job.episode,
        destinations = destinations.len(),
        "Completed uploading file"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{MockCommandRunner, ProcessOutput};

    #[tokio::test]
    async fn no_destinations_issues_no_commands() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().never();
        let transfer = TransferConfig::new("rclone.conf");
        upload(&runner, &Job::new("Show", "01.mp4"), &[], Path::new("/tmp/out.mp4"), &transfer)
            .await
            .expect("nothing to upload is a success");
    }

    #[tokio::test]
    async fn every_destination_receives_a_copy() {
        let mut runner = MockCommandRunner::new();
        for dest in ["a:encoded/Show/01.mp4", "b:mirror/Show/01.mp4"] {
            runner
                .expect_run()
                .withf(move |command, _| command[3] == "/tmp/out.mp4" && command[4] == dest)
                .times(1)
                .returning(|_, _| Ok(ProcessOutput::success("")));
        }
        let transfer = TransferConfig::new("rclone.conf");
        let destinations = vec!["a:encoded/".to_string(), "b:mirror".to_string()];
        upload(&runner, &Job::new("Show", "01.mp4"), &destinations, Path::new("/tmp/out.mp4"), &transfer)
            .await
            .expect("both uploads succeed");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_utf8_upload_file_is_refused() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let mut runner = MockCommandRunner::new();
        runner.expect_run().never();
        let transfer = TransferConfig::new("rclone.conf");
        let destinations = vec!["a:encoded".to_string()];
        let upload_file = Path::new(OsStr::from_bytes(b"/tmp/\xffout.mp4"));
        let err = upload(&runner, &Job::new("Show", "01.mp4"), &destinations, upload_file, &transfer)
            .await
            .unwrap_err();
        assert!(err.is_bad_response(), "got {err:?}");
    }
}
