//! Remote and staging path composition.

use std::path::Path;

use crate::contract::{Job, TransferError};

/// Basename every download is staged under, whatever the remote file is called.
pub const STAGING_NAME: &str = "temp";

/// Strip exactly one trailing `/` from a location identifier.
pub fn clean(location: &str) -> &str {
    location.strip_suffix('/').unwrap_or(location)
}

/// `<location>/<show>/<episode>`
pub fn remote_path(location: &str, job: &Job) -> String {
    format!("{}/{}/{}", clean(location), job.show, job.episode)
}

/// `<location>/<show>/`, the root searched for the episode.
pub fn show_root(location: &str, job: &Job) -> String {
    format!("{}/{}/", clean(location), job.show)
}

/// Fixed local file a download is written to inside `staging_dir`.
pub fn staging_path(staging_dir: &str) -> String {
    format!("{}/{}", clean(staging_dir), STAGING_NAME)
}

/// A local path as a single argv token.
///
/// Paths that are not valid UTF-8 are refused instead of being lossily
/// converted, which would name a different file.
pub fn path_arg(path: &Path) -> Result<&str, TransferError> {
    path.to_str().ok_or_else(|| TransferError::BadResponse {
        code: None,
        reason: format!("local path is not valid UTF-8: {}", path.display()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> Job {
        Job::new("show", "episode")
    }

    #[test]
    fn trailing_separator_does_not_change_remote_path() {
        assert_eq!(remote_path("remote:bucket/", &job()), "remote:bucket/show/episode");
        assert_eq!(remote_path("remote:bucket", &job()), "remote:bucket/show/episode");
    }

    #[test]
    fn clean_strips_only_one_separator() {
        assert_eq!(clean("remote:bucket//"), "remote:bucket/");
        assert_eq!(clean("remote:"), "remote:");
        assert_eq!(clean(""), "");
    }

    #[test]
    fn show_root_keeps_trailing_separator() {
        assert_eq!(show_root("gdrive:airing/", &job()), "gdrive:airing/show/");
    }

    #[test]
    fn staging_path_uses_fixed_basename() {
        assert_eq!(staging_path("/var/tmp/ferry/"), "/var/tmp/ferry/temp");
        assert_eq!(staging_path("/var/tmp/ferry"), "/var/tmp/ferry/temp");
    }

    #[test]
    fn path_arg_passes_utf8_through() {
        assert_eq!(path_arg(Path::new("/var/tmp/ferry/out.mp4")).unwrap(), "/var/tmp/ferry/out.mp4");
    }

    #[cfg(unix)]
    #[test]
    fn path_arg_refuses_non_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"/var/tmp/\xffferry"));
        let err = path_arg(path).unwrap_err();
        assert!(err.is_bad_response(), "got {err:?}");
    }
}
