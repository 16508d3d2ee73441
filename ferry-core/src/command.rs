//! Argv construction for the transfer tool.
//!
//! Every command has the shape `<tool> --config=<path> <subcommand> <args...>`.
//! Paths are single argv tokens; nothing goes through a shell.

use crate::config::TransferConfig;
use crate::contract::Job;
use crate::paths::show_root;

/// `<tool> --config=<path> lsjson -R <source>/<show>/`
///
/// Listings never carry the user flags.
pub fn listing_command(transfer: &TransferConfig, source: &str, job: &Job) -> Vec<String> {
    vec![
        transfer.tool.clone(),
        transfer.config_arg(),
        "lsjson".to_string(),
        "-R".to_string(),
        show_root(source, job),
    ]
}

/// `<tool> --config=<path> copyto <from> <to> <flags...>`
pub fn copy_command(transfer: &TransferConfig, from: &str, to: &str) -> Vec<String> {
    let mut command = vec![
        transfer.tool.clone(),
        transfer.config_arg(),
        "copyto".to_string(),
        from.to_string(),
        to.to_string(),
    ];
    command.extend(transfer.flag_tokens().map(str::to_string));
    command
}
