#![doc = "ferry-core: orchestration library for ferry."]

//! Locates an episode across a prioritized list of rclone sources, stages it
//! locally, and pushes a processed result to every configured destination.
//! All data movement is delegated to the transfer tool through
//! [`contract::CommandRunner`].
//!
//! # Usage
//! Build a [`TransferConfig`], pick a runner ([`ProcessRunner`] in production)
//! and call [`download::download`] or [`upload::upload`].

pub mod command;
pub mod config;
pub mod contract;
pub mod download;
pub mod paths;
pub mod runner;
pub mod upload;

pub use config::TransferConfig;
pub use contract::{CommandRunner, Job, ProcessOutput, TransferError};
pub use runner::ProcessRunner;
