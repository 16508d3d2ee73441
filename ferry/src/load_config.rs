//! `load_config` module: reads the YAML run configuration and maps it onto the
//! core's [`TransferConfig`] plus the source and destination lists.
//!
//! This is the only place where user-supplied YAML is parsed.
//!
//! # Errors
//! All failures are `anyhow::Error`s whose messages say whether the file could
//! not be read or could not be parsed.
use anyhow::Result;
use ferry_core::config::{DEFAULT_TIMEOUT, DEFAULT_TOOL};
use ferry_core::TransferConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    pub transfer: TransferSection,
    #[serde(default)]
    pub download: DownloadSection,
    #[serde(default)]
    pub upload: UploadSection,
}

#[derive(Debug, Deserialize)]
pub struct TransferSection {
    #[serde(default = "default_tool")]
    pub tool: String,
    /// Path to the rclone config file.
    pub config: PathBuf,
    #[serde(default)]
    pub flags: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct DownloadSection {
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,
    /// Searched in this order; the first holding the episode wins.
    #[serde(default)]
    pub sources: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadSection {
    #[serde(default)]
    pub destinations: Vec<String>,
}

impl Default for DownloadSection {
    fn default() -> Self {
        Self {
            staging_dir: default_staging_dir(),
            sources: Vec::new(),
        }
    }
}

fn default_tool() -> String {
    DEFAULT_TOOL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_staging_dir() -> PathBuf {
    std::env::temp_dir()
}

impl TransferSection {
    pub fn to_transfer_config(&self) -> TransferConfig {
        TransferConfig::new(self.config.clone())
            .with_tool(self.tool.clone())
            .with_flags(self.flags.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

/// Loads the YAML config file at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => conf,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    info!(
        config_path = ?path_ref,
        sources = config.download.sources.len(),
        destinations = config.upload.destinations.len(),
        staging_dir = %config.download.staging_dir.display(),
        "Parsed config YAML successfully"
    );
    Ok(config)
}
